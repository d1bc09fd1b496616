//! pitchline - Real-time monophonic pitch tracking
//!
//! Captures live audio, accumulates it into fixed-size chunks under the
//! real-time capture callback, estimates each chunk's fundamental frequency
//! by autocorrelation, quantizes it to the nearest equal-tempered note, and
//! keeps a bounded history of recent estimates for display.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod analysis;
pub mod app;
pub mod audio;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod pipeline;

// Core traits (source → analyze → sink)
pub use audio::source::AudioSource;
pub use pipeline::sink::{CollectorSink, PitchSink, StdoutSink};

// Pipeline
pub use pipeline::orchestrator::{Pipeline, PipelineConfig, PipelineHandle, PipelineState};
pub use pipeline::types::{AudioChunk, AudioFrame, PitchUpdate};

// Analysis
pub use analysis::{EstimatorConfig, NoteLabel, PitchEstimator, PitchHistory};

// Error handling
pub use error::{PitchlineError, Result};

// Config
pub use config::Config;
