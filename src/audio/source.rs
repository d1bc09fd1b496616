use crate::error::{PitchlineError, Result};

/// Trait for audio capture devices.
///
/// This is the capture-collaborator seam: the pipeline only polls samples
/// through it, so implementations can be a real microphone, a WAV file, or
/// a mock. Device permissions and selection live behind this boundary.
pub trait AudioSource: Send + Sync {
    /// Start capturing audio from the source.
    fn start(&mut self) -> Result<()>;

    /// Stop capturing audio from the source.
    ///
    /// Stopping an already-stopped source is a no-op, not an error.
    fn stop(&mut self) -> Result<()>;

    /// Read whatever samples have accumulated since the last read.
    ///
    /// Returns mono f32 samples in [-1.0, 1.0]. The returned length varies
    /// per call and may be zero.
    fn read_samples(&mut self) -> Result<Vec<f32>>;

    /// Whether an empty read means the source is exhausted (file) rather
    /// than momentarily idle (live microphone).
    fn is_finite(&self) -> bool {
        false
    }
}

/// One phase of a scripted mock capture: `samples` served `count` times.
#[derive(Debug, Clone)]
pub struct FramePhase {
    pub samples: Vec<f32>,
    pub count: u32,
}

/// Mock audio source for testing.
#[derive(Debug, Clone)]
pub struct MockAudioSource {
    is_started: bool,
    samples: Vec<f32>,
    phases: Vec<FramePhase>,
    phase_index: usize,
    phase_reads: u32,
    live: bool,
    should_fail_start: bool,
    should_fail_stop: bool,
    should_fail_read: bool,
    error_message: String,
}

impl MockAudioSource {
    /// Create a new mock audio source with default settings.
    pub fn new() -> Self {
        Self {
            is_started: false,
            samples: vec![0.0; 160],
            phases: Vec::new(),
            phase_index: 0,
            phase_reads: 0,
            live: false,
            should_fail_start: false,
            should_fail_stop: false,
            should_fail_read: false,
            error_message: "mock audio error".to_string(),
        }
    }

    /// Serve these samples on every read, indefinitely.
    pub fn with_samples(mut self, samples: Vec<f32>) -> Self {
        self.samples = samples;
        self
    }

    /// Serve a scripted sequence of frame phases, then read empty.
    pub fn with_frame_sequence(mut self, phases: Vec<FramePhase>) -> Self {
        self.phases = phases;
        self
    }

    /// Report as a live source: empty reads mean "not yet", not end-of-data.
    pub fn as_live_source(mut self) -> Self {
        self.live = true;
        self
    }

    /// Configure the mock to fail on start.
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    /// Configure the mock to fail on stop.
    pub fn with_stop_failure(mut self) -> Self {
        self.should_fail_stop = true;
        self
    }

    /// Configure the mock to fail on read.
    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    /// Configure the error message for failures.
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    /// Check if the audio source is started.
    pub fn is_started(&self) -> bool {
        self.is_started
    }

    fn next_phase_frame(&mut self) -> Vec<f32> {
        while self.phase_index < self.phases.len() {
            let phase = &self.phases[self.phase_index];
            if self.phase_reads < phase.count {
                self.phase_reads += 1;
                return phase.samples.clone();
            }
            self.phase_index += 1;
            self.phase_reads = 0;
        }
        Vec::new()
    }
}

impl Default for MockAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            Err(PitchlineError::AudioCapture {
                message: self.error_message.clone(),
            })
        } else {
            self.is_started = true;
            Ok(())
        }
    }

    fn stop(&mut self) -> Result<()> {
        if self.should_fail_stop {
            Err(PitchlineError::AudioCapture {
                message: self.error_message.clone(),
            })
        } else {
            self.is_started = false;
            Ok(())
        }
    }

    fn read_samples(&mut self) -> Result<Vec<f32>> {
        if self.should_fail_read {
            return Err(PitchlineError::AudioCapture {
                message: self.error_message.clone(),
            });
        }
        if self.phases.is_empty() {
            Ok(self.samples.clone())
        } else {
            Ok(self.next_phase_frame())
        }
    }

    fn is_finite(&self) -> bool {
        !self.live
    }
}
