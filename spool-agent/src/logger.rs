//! Logging Infrastructure
//!
//! Console output is always on. When a log directory is configured two
//! daily rotating streams are written under it:
//! - `info.YYYY-MM-DD`: every event at or above the configured level
//! - `error.YYYY-MM-DD`: warnings and errors only

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::Filter;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over `level` when set.
///
/// # Examples
/// ```no_run
/// // Console only
/// spool_agent::init_logger("debug", false, None)?;
///
/// // Console plus info/error files
/// spool_agent::init_logger("info", true, Some(std::path::Path::new("./logs")))?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger(level: &str, json_format: bool, log_dir: Option<&Path>) -> anyhow::Result<()> {
    let env_filter =
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let mut layers = vec![format_layer(
        json_format,
        std::io::stdout,
        true,
        env_filter(),
    )];

    if let Some(dir) = log_dir {
        fs::create_dir_all(dir)?;

        let info_log = RollingFileAppender::new(Rotation::DAILY, dir, "info");
        layers.push(format_layer(
            json_format,
            Mutex::new(info_log),
            false,
            env_filter(),
        ));

        let error_log = RollingFileAppender::new(Rotation::DAILY, dir, "error");
        layers.push(format_layer(
            json_format,
            Mutex::new(error_log),
            false,
            LevelFilter::WARN,
        ));
    }

    tracing_subscriber::registry().with(layers).try_init()?;
    Ok(())
}

fn format_layer<W, F>(json: bool, writer: W, ansi: bool, filter: F) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    F: Filter<Registry> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_ansi(ansi)
        .with_writer(writer);

    if json {
        layer
            .json()
            .with_current_span(true)
            .with_filter(filter)
            .boxed()
    } else {
        layer.with_filter(filter).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");

        // Another test may already own the global subscriber
        let _ = init_logger("info", false, Some(&log_dir));

        assert!(log_dir.is_dir());
    }
}
