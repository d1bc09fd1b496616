//! Data types flowing through the pitch pipeline.

use crate::analysis::NoteLabel;
use std::time::Instant;

/// A frame of raw audio samples as delivered by the capture side.
///
/// Frame length varies per poll and is not under the pipeline's control.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Mono samples in [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Timestamp when this frame was captured.
    pub timestamp: Instant,
    /// Sequence number for ordering and gap detection.
    pub sequence: u64,
}

impl AudioFrame {
    /// Creates a new audio frame.
    pub fn new(samples: Vec<f32>, timestamp: Instant, sequence: u64) -> Self {
        Self {
            samples,
            timestamp,
            sequence,
        }
    }

    /// Returns the duration of this frame in milliseconds.
    pub fn duration_ms(&self, sample_rate: u32) -> u32 {
        (self.samples.len() as u32 * 1000) / sample_rate
    }
}

/// A fixed-size block of audio, the unit of pitch analysis.
///
/// Every chunk the chunker emits holds exactly the configured chunk size.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Mono samples in [-1.0, 1.0]; length is always the chunk size.
    pub samples: Vec<f32>,
    /// Position of this chunk in the session, starting at 0.
    pub sequence: u64,
}

impl AudioChunk {
    /// Creates a new audio chunk.
    pub fn new(samples: Vec<f32>, sequence: u64) -> Self {
        Self { samples, sequence }
    }

    /// Returns the duration of this chunk in milliseconds.
    pub fn duration_ms(&self, sample_rate: u32) -> u32 {
        (self.samples.len() as u32 * 1000) / sample_rate
    }
}

/// What the renderer receives for each processed chunk.
#[derive(Debug, Clone)]
pub struct PitchUpdate {
    /// Sequence of the chunk this update was produced from.
    pub sequence: u64,
    /// Estimated fundamental in Hz, or `None` when no pitch was detected.
    pub frequency: Option<f32>,
    /// Nearest note, present exactly when `frequency` is.
    pub note: Option<NoteLabel>,
    /// Read-only snapshot of the history window, oldest first.
    pub history: Vec<f32>,
}
