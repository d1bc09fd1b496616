//! Renderer boundary for the pitch pipeline.
//!
//! The pipeline pushes one [`PitchUpdate`] per processed chunk into a sink;
//! rendering cadence is driven by pipeline output, never polled.

use crate::error::Result;
use crate::pipeline::types::PitchUpdate;
use owo_colors::OwoColorize;
use std::sync::{Arc, Mutex};

/// Pluggable renderer for pitch updates.
/// Pairs with AudioSource for input — this handles analysis output.
pub trait PitchSink: Send + 'static {
    /// Handle one update. Called for every processed chunk, voiced or not.
    fn publish(&mut self, update: &PitchUpdate) -> Result<()>;

    /// Called once on pipeline shutdown.
    fn finish(&mut self) {}

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// Terminal renderer: one line per chunk with frequency and note.
///
/// An unvoiced chunk renders as an explicit "no pitch" marker so silence is
/// distinguishable from output that has not arrived yet.
pub struct StdoutSink {
    quiet: bool,
}

impl StdoutSink {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl PitchSink for StdoutSink {
    fn publish(&mut self, update: &PitchUpdate) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        match (update.frequency, update.note) {
            (Some(frequency), Some(note)) => {
                println!(
                    "{:>9.2} Hz  {:<4}",
                    frequency,
                    note.to_string().green().bold()
                );
            }
            _ => {
                println!("{:>12}  {}", "—", "no pitch".dimmed());
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}

/// Test sink that records every update it receives.
///
/// Keep a clone of [`updates`](CollectorSink::updates) before handing the
/// sink to the pipeline; the shared vector stays readable afterwards.
pub struct CollectorSink {
    updates: Arc<Mutex<Vec<PitchUpdate>>>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self {
            updates: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the collected updates.
    pub fn updates(&self) -> Arc<Mutex<Vec<PitchUpdate>>> {
        Arc::clone(&self.updates)
    }
}

impl Default for CollectorSink {
    fn default() -> Self {
        Self::new()
    }
}

impl PitchSink for CollectorSink {
    fn publish(&mut self, update: &PitchUpdate) -> Result<()> {
        if let Ok(mut updates) = self.updates.lock() {
            updates.push(update.clone());
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}
