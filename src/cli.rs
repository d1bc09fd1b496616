//! Command-line interface for pitchline
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Real-time pitch tracking for the terminal
#[derive(Parser, Debug)]
#[command(
    name = "pitchline",
    version,
    about = "Real-time pitch tracking for the terminal"
)]
pub struct Cli {
    /// Subcommand to execute (default: listen on the microphone)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress per-chunk output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Audio input device (e.g., pipewire, hw:0)
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Stop after this many seconds (default: run until interrupted)
    #[arg(long, value_name = "SECONDS")]
    pub duration: Option<u64>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available audio input devices
    Devices,

    /// Run a WAV file through the pitch pipeline
    Analyze {
        /// WAV file to analyze
        file: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}
