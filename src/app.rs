//! Composition root: wires config, sources, pipeline, and sinks together.

use crate::audio::capture::{CpalAudioSource, suppress_audio_warnings};
use crate::audio::wav::WavAudioSource;
use crate::config::Config;
use crate::error::Result;
use crate::pipeline::orchestrator::{Pipeline, PipelineConfig};
use crate::pipeline::sink::StdoutSink;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

/// Run the default command: listen on the microphone and print pitch updates.
///
/// # Arguments
/// * `config` - Base configuration (CLI overrides already applied on top)
/// * `device` - Optional device override from the CLI
/// * `duration` - Optional run time in seconds; None runs until interrupted
/// * `quiet` - Suppress per-chunk output
pub fn run_listen(
    config: Config,
    device: Option<String>,
    duration: Option<u64>,
    quiet: bool,
) -> Result<()> {
    suppress_audio_warnings();

    let device = device.or_else(|| config.audio.device.clone());
    let source = CpalAudioSource::new(device.as_deref(), config.audio.sample_rate)?;

    let pipeline = Pipeline::with_config(PipelineConfig::from_config(&config));
    let mut handle = pipeline.start(Box::new(source), Box::new(StdoutSink::new(quiet)))?;

    if !quiet {
        eprintln!("pitchline: listening (Ctrl+C to quit)");
    }

    match duration {
        Some(secs) => {
            let deadline = Instant::now() + Duration::from_secs(secs);
            while Instant::now() < deadline && !handle.is_finished() {
                thread::sleep(Duration::from_millis(100));
            }
            handle.stop();
        }
        None => {
            // Runs until Ctrl+C kills the process, or until the capture side
            // gives up after persistent device errors.
            while !handle.is_finished() {
                thread::sleep(Duration::from_millis(250));
            }
            handle.join();
        }
    }

    Ok(())
}

/// Run a WAV file through the same pipeline used for live capture.
pub fn run_analyze(config: Config, file: &Path, quiet: bool) -> Result<()> {
    let source = WavAudioSource::from_path(file, config.audio.sample_rate)?;

    if !quiet {
        eprintln!(
            "pitchline: analyzing {} ({} ms of audio)",
            file.display(),
            source.duration_ms(config.audio.sample_rate)
        );
    }

    let pipeline = Pipeline::with_config(PipelineConfig::from_config(&config));
    let mut handle = pipeline.start(Box::new(source), Box::new(StdoutSink::new(quiet)))?;

    // Finite source: wait for the file to drain through the pipeline.
    while !handle.is_finished() {
        thread::sleep(Duration::from_millis(50));
    }
    handle.join();

    Ok(())
}
