//! Pitch pipeline orchestration: AudioSource → Chunker → Estimator → Sink.
//!
//! Two threads, one direction. The producer thread polls the audio source,
//! runs the chunker (whose residual buffer never leaves that thread), and
//! sends full chunks over an unbounded channel. The consumer thread receives
//! chunks in strict arrival order and runs estimate → note → history →
//! sink for each one. The producer never blocks on the consumer: the channel
//! is unbounded by design, so a stalled consumer grows the queue instead of
//! dropping or reordering chunks. That unbounded growth is an accepted,
//! documented limitation.

use crate::analysis::{EstimatorConfig, NoteLabel, PitchEstimator, PitchHistory};
use crate::audio::source::AudioSource;
use crate::config::Config;
use crate::defaults;
use crate::error::Result;
use crate::pipeline::chunker::Chunker;
use crate::pipeline::sink::PitchSink;
use crate::pipeline::types::{AudioFrame, PitchUpdate};
use crossbeam_channel::unbounded;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const STATE_IDLE: u8 = 0;
const STATE_RUNNING: u8 = 1;
const STATE_STOPPING: u8 = 2;

/// Lifecycle of a pipeline session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No session active; no capture resources held.
    Idle,
    /// Frames are being accepted and analyzed.
    Running,
    /// Teardown in progress: no new frames, in-flight chunks may finish.
    Stopping,
}

impl PipelineState {
    fn from_u8(value: u8) -> Self {
        match value {
            STATE_RUNNING => PipelineState::Running,
            STATE_STOPPING => PipelineState::Stopping,
            _ => PipelineState::Idle,
        }
    }
}

/// Configuration for the pipeline, fixed at construction.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Sample rate of the incoming audio.
    pub sample_rate: u32,
    /// Samples per analysis chunk.
    pub chunk_size: usize,
    /// Capacity of the pitch history window.
    pub history_capacity: usize,
    /// Estimator thresholds and frequency range.
    pub estimator: EstimatorConfig,
    /// Interval between polls of the audio source.
    pub poll_interval_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            chunk_size: defaults::CHUNK_SIZE,
            history_capacity: defaults::HISTORY_CAPACITY,
            estimator: EstimatorConfig::default(),
            poll_interval_ms: defaults::POLL_INTERVAL_MS,
        }
    }
}

impl PipelineConfig {
    /// Creates pipeline configuration from the app config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            sample_rate: config.audio.sample_rate,
            chunk_size: config.analysis.chunk_size,
            history_capacity: config.display.history_capacity,
            estimator: EstimatorConfig {
                min_frequency: config.analysis.min_frequency,
                max_frequency: config.analysis.max_frequency,
                clarity_threshold: config.analysis.clarity_threshold,
                rms_gate: config.analysis.rms_gate,
                ..EstimatorConfig::default()
            },
            poll_interval_ms: defaults::POLL_INTERVAL_MS,
        }
    }
}

/// Handle to a running pipeline session.
pub struct PipelineHandle {
    state: Arc<AtomicU8>,
    threads: Vec<JoinHandle<()>>,
}

impl PipelineHandle {
    /// Current lifecycle state.
    pub fn state(&self) -> PipelineState {
        PipelineState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Returns true while the session accepts frames.
    pub fn is_running(&self) -> bool {
        self.state() == PipelineState::Running
    }

    /// True once both worker threads have exited — the session ended on its
    /// own (source exhausted, or capture gave up after an error streak).
    pub fn is_finished(&self) -> bool {
        self.threads.iter().all(|t| t.is_finished())
    }

    /// Stops the session.
    ///
    /// Race-free: the producer observes Stopping before its next poll and
    /// accepts no further frames; chunks already emitted are drained by the
    /// consumer before it exits. Capture resources are released exactly once
    /// (on the producer thread). Stopping an already-stopped pipeline is a
    /// no-op.
    pub fn stop(&mut self) {
        if self
            .state
            .compare_exchange(STATE_RUNNING, STATE_STOPPING, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        self.join_with_deadline(Duration::from_secs(5));
        self.state.store(STATE_IDLE, Ordering::SeqCst);
    }

    /// Waits for the session to end on its own.
    ///
    /// Only meaningful for finite sources (WAV files, scripted mocks); a
    /// live microphone session never completes by itself.
    pub fn join(&mut self) {
        for handle in self.threads.drain(..) {
            if let Err(panic_info) = handle.join() {
                eprintln!("pitchline: {}", describe_panic(panic_info));
            }
        }
        self.state.store(STATE_IDLE, Ordering::SeqCst);
    }

    /// Joins worker threads, detaching any still running at the deadline.
    fn join_with_deadline(&mut self, deadline: Duration) {
        let give_up = Instant::now() + deadline;
        let poll_interval = Duration::from_millis(50);

        loop {
            let mut remaining = Vec::new();
            for handle in self.threads.drain(..) {
                if handle.is_finished() {
                    if let Err(panic_info) = handle.join() {
                        eprintln!("pitchline: {}", describe_panic(panic_info));
                    }
                } else {
                    remaining.push(handle);
                }
            }
            self.threads = remaining;

            if self.threads.is_empty() {
                break;
            }

            if Instant::now() >= give_up {
                eprintln!(
                    "pitchline: shutdown timeout — {} thread(s) still running, detaching",
                    self.threads.len()
                );
                // Dropping JoinHandles detaches threads; they die with the process.
                self.threads.clear();
                break;
            }

            thread::sleep(poll_interval);
        }
    }
}

impl Drop for PipelineHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn describe_panic(panic_info: Box<dyn std::any::Any + Send>) -> String {
    let msg = panic_info
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic_info.downcast_ref::<String>().map(|s| s.as_str()))
        .unwrap_or("unknown panic");
    format!("pipeline thread panicked: {msg}")
}

/// Pitch pipeline: owns construction and teardown of one session at a time.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Creates a pipeline with default configuration.
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Creates a pipeline with custom configuration.
    pub fn with_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Starts a session: Idle → Running.
    ///
    /// Capture is acquired first; if that fails the error is returned and no
    /// partial state exists — no threads, no history, nothing to tear down.
    /// Each session starts with a fresh, empty history window.
    pub fn start(
        self,
        mut audio_source: Box<dyn AudioSource>,
        mut sink: Box<dyn PitchSink>,
    ) -> Result<PipelineHandle> {
        audio_source.start()?;

        let state = Arc::new(AtomicU8::new(STATE_RUNNING));
        let (chunk_tx, chunk_rx) = unbounded();

        // Producer: poll source → chunker → channel. The chunker and its
        // residual buffer live and die on this thread.
        let producer_state = state.clone();
        let chunk_size = self.config.chunk_size;
        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);
        let producer = thread::spawn(move || {
            let mut chunker = Chunker::new(chunk_size);
            let mut sequence: u64 = 0;
            let mut consecutive_errors: u32 = 0;
            const MAX_CONSECUTIVE_ERRORS: u32 = 10;
            let source_is_finite = audio_source.is_finite();

            while producer_state.load(Ordering::SeqCst) == STATE_RUNNING {
                let samples = match audio_source.read_samples() {
                    Ok(samples) => {
                        consecutive_errors = 0;
                        samples
                    }
                    Err(e) => {
                        consecutive_errors += 1;
                        if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                            eprintln!(
                                "pitchline: audio capture failed {consecutive_errors} times in a row: {e}"
                            );
                            eprintln!("pitchline: check your microphone connection and try again");
                            break;
                        }
                        thread::sleep(poll_interval);
                        continue;
                    }
                };

                if samples.is_empty() {
                    if source_is_finite {
                        // File or scripted source exhausted.
                        break;
                    }
                    // Live microphone: empty reads are normal while the
                    // device initializes. Keep polling.
                    thread::sleep(poll_interval);
                    continue;
                }

                let frame = AudioFrame::new(samples, Instant::now(), sequence);
                sequence += 1;

                let mut receiver_gone = false;
                for chunk in chunker.ingest(&frame) {
                    // Unbounded channel: send never blocks, only fails when
                    // the consumer is gone.
                    if chunk_tx.send(chunk).is_err() {
                        receiver_gone = true;
                        break;
                    }
                }
                if receiver_gone {
                    break;
                }

                thread::sleep(poll_interval);
            }

            // A sub-chunk residual is discarded here, never flushed short —
            // a partial block would bias the correlation window.
            chunker.reset();

            if let Err(e) = audio_source.stop() {
                eprintln!("pitchline: failed to stop audio capture: {e}");
            }
            // chunk_tx drops with this thread; the consumer drains whatever
            // was already emitted, then exits.
        });

        // Consumer: strict arrival order, one chunk at a time. The history
        // window lives here and is the only mutable session state.
        let sample_rate = self.config.sample_rate;
        let estimator_config = self.config.estimator.clone();
        let history_capacity = self.config.history_capacity;
        let consumer = thread::spawn(move || {
            let estimator = PitchEstimator::with_config(sample_rate, estimator_config);
            let mut history = PitchHistory::new(history_capacity);

            for chunk in chunk_rx.iter() {
                let frequency = estimator.estimate(&chunk.samples);
                let note = frequency.map(NoteLabel::nearest);
                if let Some(hz) = frequency {
                    history.push(hz);
                }

                // Every chunk produces an update, voiced or not, so the
                // renderer can distinguish "no pitch" from "nothing yet".
                let update = PitchUpdate {
                    sequence: chunk.sequence,
                    frequency,
                    note,
                    history: history.snapshot(),
                };
                if let Err(e) = sink.publish(&update) {
                    eprintln!("pitchline: sink error: {e}");
                }
            }

            sink.finish();
        });

        Ok(PipelineHandle {
            state,
            threads: vec![producer, consumer],
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::source::{FramePhase, MockAudioSource};
    use crate::error::PitchlineError;
    use crate::pipeline::sink::CollectorSink;
    use std::f32::consts::TAU;
    use std::sync::Mutex;

    fn test_config() -> PipelineConfig {
        PipelineConfig {
            poll_interval_ms: 1,
            ..PipelineConfig::default()
        }
    }

    fn sine_frame(frequency: f32, offset: usize, len: usize) -> Vec<f32> {
        (offset..offset + len)
            .map(|i| 0.5 * (TAU * frequency * i as f32 / 44100.0).sin())
            .collect()
    }

    /// Polls until `predicate` holds or the timeout elapses.
    fn wait_until(predicate: impl Fn() -> bool, timeout: Duration) -> bool {
        let give_up = Instant::now() + timeout;
        while Instant::now() < give_up {
            if predicate() {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        predicate()
    }

    fn updates_len(updates: &Arc<Mutex<Vec<PitchUpdate>>>) -> usize {
        updates.lock().unwrap().len()
    }

    #[test]
    fn test_config_default() {
        let config = PipelineConfig::default();
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.chunk_size, 4096);
        assert_eq!(config.history_capacity, 100);
        assert_eq!(config.poll_interval_ms, 16);
    }

    #[test]
    fn test_config_from_app_config() {
        let mut app_config = Config::default();
        app_config.audio.sample_rate = 48000;
        app_config.analysis.chunk_size = 2048;
        app_config.analysis.min_frequency = 80.0;
        app_config.display.history_capacity = 25;

        let config = PipelineConfig::from_config(&app_config);
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.chunk_size, 2048);
        assert_eq!(config.estimator.min_frequency, 80.0);
        assert_eq!(config.history_capacity, 25);
    }

    #[test]
    fn start_failure_leaves_no_partial_state() {
        let pipeline = Pipeline::with_config(test_config());
        let sink = CollectorSink::new();
        let updates = sink.updates();

        let source = Box::new(
            MockAudioSource::new()
                .with_start_failure()
                .with_error_message("microphone unavailable"),
        );

        let result = pipeline.start(source, Box::new(sink));
        match result {
            Err(PitchlineError::AudioCapture { message }) => {
                assert_eq!(message, "microphone unavailable");
            }
            _ => panic!("expected AudioCapture error"),
        }

        // Nothing ran, nothing was published
        assert_eq!(updates_len(&updates), 0);
    }

    #[test]
    fn voiced_chunk_produces_one_update() {
        let pipeline = Pipeline::with_config(test_config());
        let sink = CollectorSink::new();
        let updates = sink.updates();

        // One frame carrying exactly one chunk of a 440 Hz sine
        let source = Box::new(MockAudioSource::new().with_frame_sequence(vec![FramePhase {
            samples: sine_frame(440.0, 0, 4096),
            count: 1,
        }]));

        let mut handle = pipeline.start(source, Box::new(sink)).unwrap();
        assert!(wait_until(
            || updates_len(&updates) == 1,
            Duration::from_secs(2)
        ));
        handle.join();

        let collected = updates.lock().unwrap();
        assert_eq!(collected.len(), 1);
        let update = &collected[0];
        assert_eq!(update.sequence, 0);
        let frequency = update.frequency.expect("sine chunk is voiced");
        assert!((frequency - 440.0).abs() < 1.0, "got {}", frequency);
        assert_eq!(update.note.unwrap().to_string(), "A4");
        assert_eq!(update.history.len(), 1);
    }

    #[test]
    fn silent_chunk_produces_unvoiced_update_with_empty_history() {
        let pipeline = Pipeline::with_config(test_config());
        let sink = CollectorSink::new();
        let updates = sink.updates();

        let source = Box::new(MockAudioSource::new().with_frame_sequence(vec![FramePhase {
            samples: vec![0.0; 4096],
            count: 1,
        }]));

        let mut handle = pipeline.start(source, Box::new(sink)).unwrap();
        assert!(wait_until(
            || updates_len(&updates) == 1,
            Duration::from_secs(2)
        ));
        handle.join();

        let collected = updates.lock().unwrap();
        assert_eq!(collected[0].frequency, None);
        assert_eq!(collected[0].note, None);
        assert!(collected[0].history.is_empty());
    }

    #[test]
    fn chunks_are_processed_in_arrival_order() {
        let pipeline = Pipeline::with_config(test_config());
        let sink = CollectorSink::new();
        let updates = sink.updates();

        // Six frames of 2048 samples → three chunks
        let source = Box::new(MockAudioSource::new().with_frame_sequence(vec![FramePhase {
            samples: vec![0.0; 2048],
            count: 6,
        }]));

        let mut handle = pipeline.start(source, Box::new(sink)).unwrap();
        assert!(wait_until(
            || updates_len(&updates) == 3,
            Duration::from_secs(2)
        ));
        handle.join();

        let collected = updates.lock().unwrap();
        let sequences: Vec<u64> = collected.iter().map(|u| u.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2]);
    }

    #[test]
    fn sub_chunk_residual_is_discarded_at_end() {
        let pipeline = Pipeline::with_config(test_config());
        let sink = CollectorSink::new();
        let updates = sink.updates();

        // 4096 + 904 samples: one chunk, the rest must never surface
        let source = Box::new(MockAudioSource::new().with_frame_sequence(vec![FramePhase {
            samples: vec![0.0; 1000],
            count: 5,
        }]));

        let mut handle = pipeline.start(source, Box::new(sink)).unwrap();
        assert!(wait_until(
            || updates_len(&updates) == 1,
            Duration::from_secs(2)
        ));
        handle.join();

        assert_eq!(updates_len(&updates), 1);
    }

    #[test]
    fn stop_is_idempotent() {
        let pipeline = Pipeline::with_config(test_config());
        let source = Box::new(MockAudioSource::new().as_live_source().with_samples(vec![0.0; 512]));

        let mut handle = pipeline
            .start(source, Box::new(CollectorSink::new()))
            .unwrap();
        assert!(handle.is_running());
        assert_eq!(handle.state(), PipelineState::Running);

        handle.stop();
        assert_eq!(handle.state(), PipelineState::Idle);

        // Second stop is a no-op, not an error
        handle.stop();
        assert_eq!(handle.state(), PipelineState::Idle);
    }

    #[test]
    fn persistent_read_errors_end_the_session() {
        let pipeline = Pipeline::with_config(test_config());
        let sink = CollectorSink::new();
        let updates = sink.updates();

        let source = Box::new(MockAudioSource::new().with_read_failure());

        let mut handle = pipeline.start(source, Box::new(sink)).unwrap();
        // Producer gives up after its error streak; both threads wind down
        assert!(wait_until(
            || handle.threads.iter().all(|t| t.is_finished()),
            Duration::from_secs(2)
        ));
        handle.join();

        assert_eq!(updates_len(&updates), 0);
    }

    #[test]
    fn dropping_the_handle_stops_the_session() {
        let pipeline = Pipeline::with_config(test_config());
        let source = Box::new(MockAudioSource::new().as_live_source().with_samples(vec![0.0; 512]));

        let handle = pipeline
            .start(source, Box::new(CollectorSink::new()))
            .unwrap();
        let state = handle.state.clone();

        drop(handle);
        assert_eq!(state.load(Ordering::SeqCst), STATE_IDLE);
    }

    #[test]
    fn sessions_start_with_fresh_history() {
        // First session records a voiced chunk; the second sees silence and
        // must start from an empty window.
        let sink1 = CollectorSink::new();
        let updates1 = sink1.updates();
        let source1 = Box::new(MockAudioSource::new().with_frame_sequence(vec![FramePhase {
            samples: sine_frame(440.0, 0, 4096),
            count: 1,
        }]));
        let mut handle = Pipeline::with_config(test_config())
            .start(source1, Box::new(sink1))
            .unwrap();
        assert!(wait_until(
            || updates_len(&updates1) == 1,
            Duration::from_secs(2)
        ));
        handle.join();
        assert_eq!(updates1.lock().unwrap()[0].history.len(), 1);

        let sink2 = CollectorSink::new();
        let updates2 = sink2.updates();
        let source2 = Box::new(MockAudioSource::new().with_frame_sequence(vec![FramePhase {
            samples: vec![0.0; 4096],
            count: 1,
        }]));
        let mut handle = Pipeline::with_config(test_config())
            .start(source2, Box::new(sink2))
            .unwrap();
        assert!(wait_until(
            || updates_len(&updates2) == 1,
            Duration::from_secs(2)
        ));
        handle.join();
        assert!(updates2.lock().unwrap()[0].history.is_empty());
    }
}
