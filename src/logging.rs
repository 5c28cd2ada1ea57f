use crate::error::Result;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_LOG_FILE: &str = "intake.log";

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Console plus append-mode file logging. `--verbose` overrides `RUST_LOG`.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let path = log_file.unwrap_or(Path::new(DEFAULT_LOG_FILE));
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(fmt::layer().compact().with_target(false))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .init();

    Ok(())
}
