//! Audio input: the capture seam and its implementations.

pub mod capture;
pub mod source;
pub mod wav;

pub use capture::CpalAudioSource;
pub use source::{AudioSource, MockAudioSource};
pub use wav::WavAudioSource;
