use anyhow::Result;
use clap::{Parser, crate_version};
use reprise::{LoopHandle, Settings, app_core::Reprise, player::SimulatedClock};
use std::{path::PathBuf, time::Duration};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "reprise=info";

#[derive(Parser)]
#[clap(
    version = crate_version!(),
    about = "Loop named sections of an audio file."
)]
struct Cli {
    /// Audio file to open on startup.
    file: Option<PathBuf>,
    /// Config file to use instead of the default location.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Play against a silent clock of the given length in seconds instead of
    /// the audio device.
    #[arg(long, value_name = "SECONDS")]
    simulate: Option<f64>,
    /// Scan this directory for audio files before starting.
    #[arg(long, value_name = "DIR")]
    scan: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The configured filter is only known once the config is read
    let settings = {
        let bootstrap = tracing_subscriber::fmt()
            .with_env_filter(log_filter(None)?)
            .with_writer(std::io::stderr)
            .finish();
        let _guard = tracing::subscriber::set_default(bootstrap);
        Settings::load(cli.config.as_deref())?
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(settings.log_filter.as_deref())?)
        .with_writer(std::io::stderr)
        .init();

    let refresh_rate = settings.refresh_rate();
    let looper = match cli.simulate {
        Some(secs) => {
            let length = Duration::try_from_secs_f64(secs)?;
            tracing::info!(?length, "Using simulated clock");
            LoopHandle::spawn(
                move || Ok(SimulatedClock::new(length).with_auto_advance(refresh_rate)),
                refresh_rate,
            )?
        }
        None => spawn_audio(refresh_rate)?,
    };

    let mut app = Reprise::new(settings, looper);
    if let Some(dir) = cli.scan {
        app.scan_on_start(dir)?;
    }
    app.run(cli.file)
}

/// `RUST_LOG` wins over the configured filter, which wins over `reprise=info`.
fn log_filter(configured: Option<&str>) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(configured.unwrap_or(DEFAULT_LOG_FILTER))?),
    }
}

#[cfg(feature = "rodio")]
fn spawn_audio(refresh_rate: Duration) -> Result<LoopHandle> {
    LoopHandle::spawn(reprise::player::RodioBackend::new, refresh_rate)
}

#[cfg(not(feature = "rodio"))]
fn spawn_audio(_refresh_rate: Duration) -> Result<LoopHandle> {
    anyhow::bail!("Built without audio output, run with --simulate <SECONDS>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_simulate_and_file() {
        let cli = Cli::try_parse_from(["reprise", "--simulate", "90", "song.mp3"]).unwrap();
        assert_eq!(cli.simulate, Some(90.0));
        assert_eq!(cli.file, Some(PathBuf::from("song.mp3")));
        assert!(cli.config.is_none());
    }
}
