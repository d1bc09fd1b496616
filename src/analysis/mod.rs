//! Signal analysis: pitch estimation, note quantization, estimate history.

pub mod history;
pub mod note;
pub mod pitch;

pub use history::PitchHistory;
pub use note::{NOTE_NAMES, NoteLabel};
pub use pitch::{EstimatorConfig, PitchEstimator};
