//! Event Horizon
//!
//! Usage:
//!
//! ```text
//! event-horizon [config.json]              open the window
//! event-horizon [config.json] --headless N  run N frames without a window
//! event-horizon --write-config PATH        write the default config and exit
//! ```

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};
use event_horizon::SimConfig;
use tracing_subscriber::EnvFilter;

enum Mode {
    Window,
    Headless(u64),
    WriteConfig(PathBuf),
}

struct Args {
    config_path: Option<PathBuf>,
    mode: Mode,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut config_path = None;
    let mut mode = Mode::Window;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--headless" => {
                let frames = args.next().context("--headless needs a frame count")?;
                let frames = frames
                    .parse::<u64>()
                    .with_context(|| format!("invalid frame count {frames:?}"))?;
                mode = Mode::Headless(frames);
            }
            "--write-config" => {
                let path = args.next().context("--write-config needs a path")?;
                mode = Mode::WriteConfig(PathBuf::from(path));
            }
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            path => config_path = Some(PathBuf::from(path)),
        }
    }

    Ok(Args { config_path, mode })
}

fn load_config(path: Option<&PathBuf>) -> SimConfig {
    let Some(path) = path else {
        return SimConfig::default();
    };
    match SimConfig::load(path) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "loaded config");
            config
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            SimConfig::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = parse_args()?;

    match args.mode {
        Mode::WriteConfig(path) => {
            SimConfig::default()
                .save(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote default config");
        }
        Mode::Headless(frames) => {
            let config = load_config(args.config_path.as_ref());
            event_horizon::run_headless(config, frames, None)?;
        }
        Mode::Window => {
            let config = load_config(args.config_path.as_ref());
            event_horizon::run(config)?;
        }
    }

    Ok(())
}
