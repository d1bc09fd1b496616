use anyhow::Result;
use clap::{CommandFactory, Parser};
use pitchline::app::{run_analyze, run_listen};
use pitchline::audio::capture::list_devices;
use pitchline::cli::{Cli, Commands};
use pitchline::config::Config;
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let config = load_config(cli.config.as_deref())?;
            run_listen(config, cli.device, cli.duration, cli.quiet)?;
        }
        Some(Commands::Devices) => {
            list_audio_devices()?;
        }
        Some(Commands::Analyze { file }) => {
            let config = load_config(cli.config.as_deref())?;
            run_analyze(config, &file, cli.quiet)?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "pitchline",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Load config from an explicit path (must exist) or the default location
/// (falls back to defaults when missing), then apply env overrides.
fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(p) => Config::load(p)?,
        None => Config::load_or_default(&Config::default_path()),
    };
    Ok(config.with_env_overrides())
}

fn list_audio_devices() -> Result<()> {
    let devices = list_devices()?;
    if devices.is_empty() {
        println!("No audio input devices found.");
    } else {
        println!("Available audio input devices:");
        for device in devices {
            println!("  {}", device);
        }
    }
    Ok(())
}
