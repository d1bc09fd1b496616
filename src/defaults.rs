//! Default configuration constants for pitchline.
//!
//! Shared across the config file, CLI defaults, and pipeline construction so
//! the three surfaces cannot drift apart.

/// Default audio sample rate in Hz.
///
/// 44.1 kHz is the common full-bandwidth capture rate and gives the
/// autocorrelation enough lag resolution across the whole musical range.
pub const SAMPLE_RATE: u32 = 44_100;

/// Number of samples in one analysis chunk.
///
/// 4096 samples (~93 ms at 44.1 kHz) is the unit the estimator consumes.
/// Larger chunks resolve lower fundamentals but add latency.
pub const CHUNK_SIZE: usize = 4096;

/// Number of pitch estimates kept in the sliding history window.
pub const HISTORY_CAPACITY: usize = 100;

/// Lowest fundamental frequency the estimator will report, in Hz.
///
/// 50 Hz sits below the cello/bass-voice range while keeping the
/// autocorrelation lag window (sample_rate / min_frequency) small enough to
/// stay cheap per chunk.
pub const MIN_FREQUENCY: f32 = 50.0;

/// Highest fundamental frequency the estimator will report, in Hz.
pub const MAX_FREQUENCY: f32 = 2000.0;

/// Minimum normalized autocorrelation peak (peak / energy) for a chunk to
/// count as voiced. Below this the chunk is reported as "no pitch".
pub const CLARITY_THRESHOLD: f32 = 0.3;

/// Minimum RMS amplitude for a chunk to be analyzed at all.
///
/// Chunks below this are silence or ambient noise; the estimator skips the
/// correlation entirely and reports "no pitch".
pub const RMS_GATE: f32 = 0.01;

/// Amplitude below which leading/trailing samples are trimmed before
/// correlation. Attack and decay transients at the chunk edges otherwise
/// bias the lag estimate.
pub const EDGE_TRIM_THRESHOLD: f32 = 0.2;

/// Reference tuning frequency: A4 in Hz.
pub const A4_FREQUENCY: f32 = 440.0;

/// Interval between polls of the audio source, in milliseconds.
///
/// ~60 Hz polling; at 44.1 kHz each poll drains roughly 700 samples from the
/// capture buffer, so a 4096-sample chunk completes every few polls.
pub const POLL_INTERVAL_MS: u64 = 16;
