//! Real-time pitch pipeline.
//!
//! A producer thread chunks captured audio; a consumer thread analyzes each
//! chunk and publishes pitch updates to a sink. The two sides are connected
//! by an ordered, unbounded crossbeam channel.

pub mod chunker;
pub mod orchestrator;
pub mod sink;
pub mod types;

pub use chunker::Chunker;
pub use orchestrator::{Pipeline, PipelineConfig, PipelineHandle, PipelineState};
pub use sink::{CollectorSink, PitchSink, StdoutSink};
pub use types::{AudioChunk, AudioFrame, PitchUpdate};
