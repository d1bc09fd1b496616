//! WAV file audio source for offline analysis.

use crate::audio::source::AudioSource;
use crate::error::{PitchlineError, Result};
use std::io::Read;
use std::path::Path;

/// Finite audio source backed by decoded WAV data.
///
/// Accepts integer or float WAV files at any rate and channel count,
/// mixing down to mono and resampling to the pipeline's sample rate.
pub struct WavAudioSource {
    samples: Vec<f32>,
    position: usize,
    chunk_size: usize,
}

impl WavAudioSource {
    /// Open a WAV file from disk.
    pub fn from_path(path: &Path, target_rate: u32) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(Box::new(std::io::BufReader::new(file)), target_rate)
    }

    /// Create from any reader (for testing/flexibility).
    pub fn from_reader(reader: Box<dyn Read + Send>, target_rate: u32) -> Result<Self> {
        let mut wav_reader = hound::WavReader::new(reader).map_err(|e| PitchlineError::WavDecode {
            message: format!("failed to parse WAV header: {}", e),
        })?;

        let spec = wav_reader.spec();
        let source_rate = spec.sample_rate;
        let channels = spec.channels as usize;

        let raw_samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => wav_reader
                .samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| PitchlineError::WavDecode {
                    message: format!("failed to read float samples: {}", e),
                })?,
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                wav_reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| PitchlineError::WavDecode {
                        message: format!("failed to read integer samples: {}", e),
                    })?
            }
        };

        let mono = mixdown(&raw_samples, channels);
        let samples = if source_rate == target_rate {
            mono
        } else {
            resample(&mono, source_rate, target_rate)
        };

        // Serve the file in ~100ms reads so it flows through the pipeline
        // like live capture would.
        let chunk_size = (target_rate as usize / 10).max(1);

        Ok(Self {
            samples,
            position: 0,
            chunk_size,
        })
    }

    /// Total duration of the decoded audio in milliseconds.
    pub fn duration_ms(&self, sample_rate: u32) -> u64 {
        self.samples.len() as u64 * 1000 / sample_rate as u64
    }

    /// Consume the source and return all samples as a single buffer.
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}

impl AudioSource for WavAudioSource {
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<f32>> {
        if self.position >= self.samples.len() {
            return Ok(Vec::new());
        }

        let end = std::cmp::min(self.position + self.chunk_size, self.samples.len());
        let chunk = self.samples[self.position..end].to_vec();
        self.position = end;

        Ok(chunk)
    }

    fn is_finite(&self) -> bool {
        true
    }
}

/// Average interleaved channels down to mono.
fn mixdown(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Simple linear interpolation resampling.
pub(crate) fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[samples.len() - 1]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as f32
            }
        })
        .collect()
}
