//! Structured logging with tracing
//!
//! The TUI owns the terminal, so interactive sessions log to a daily-rolling
//! file under the platform data directory. Headless commands log to stderr.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const FALLBACK_LEVEL: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Daily-rolling file in [`log_dir`]
    File,
    Stderr,
}

/// `<data_dir>/bugpatch/logs`
pub fn log_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("bugpatch").join("logs"))
}

/// Filter for `level`, which may be a bare level or full directive syntax
/// (`bugpatch=debug,reqwest=warn`). Invalid input falls back to `info`.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level.trim()).unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}

/// Install the global subscriber. Returns the log directory for file output.
pub fn init(level: &str, target: LogTarget) -> Result<Option<PathBuf>> {
    let filter = build_filter(level);
    let registry = Registry::default().with(filter);

    match target {
        LogTarget::Stderr => {
            let layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
            registry
                .with(layer)
                .try_init()
                .context("Failed to install stderr logger")?;
            Ok(None)
        }
        LogTarget::File => {
            let dir = log_dir().context("Could not determine data directory for logs")?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(&dir, "bugpatch.log");
            let layer = fmt::layer()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(true);
            registry
                .with(layer)
                .try_init()
                .context("Failed to install file logger")?;
            tracing::info!(level, dir = %dir.display(), "logging initialized");
            Ok(Some(dir))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_accepts_directives() {
        assert_eq!(build_filter("debug").to_string(), "debug");
        assert_eq!(build_filter(" bugpatch=trace ").to_string(), "bugpatch=trace");
    }

    #[test]
    fn test_build_filter_falls_back() {
        assert_eq!(build_filter("bugpatch=verbose").to_string(), "info");
    }
}
