//! Tracing subscriber initialisation.

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt::writer::BoxMakeWriter, EnvFilter};

use crate::config::LogFormat;

/// Where log records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    /// Append to the file at this path, creating it if needed.
    File(String),
}

impl LogSink {
    pub fn from_path(path: Option<&str>) -> Self {
        match path {
            Some(p) => LogSink::File(p.to_owned()),
            None => LogSink::Stderr,
        }
    }

    fn make_writer(&self) -> Result<BoxMakeWriter> {
        Ok(match self {
            LogSink::Stderr => BoxMakeWriter::new(std::io::stderr),
            LogSink::File(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("failed to open log file {path}"))?;
                BoxMakeWriter::new(Mutex::new(file))
            }
        })
    }
}

/// Initialise the global tracing subscriber.
///
/// Records go to `sink` in the requested `format`, filtered at `log_level`
/// unless `RUST_LOG` is set. Stdout is left for comparison results.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or the subscriber has
/// already been set.
pub fn init(log_level: &str, format: LogFormat, sink: &LogSink) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let writer = sink.make_writer()?;
    let ansi = matches!(sink, LogSink::Stderr);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi);

    match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    }
    .map_err(|e| anyhow::anyhow!("failed to initialise tracing subscriber: {e}"))
}
