//! Logging initialisation.
//!
//! Logs always go to stderr, since stdout carries protocol messages in STDIO
//! mode. When a log directory is configured, a second plain-text layer appends
//! to `<dir>/mcp.log`. `RUST_LOG` directives are honored on top of the
//! configured level.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use super::config::LoggingConfig;
use super::error::{Error, Result};

/// File name used inside the log directory.
pub const LOG_FILE_NAME: &str = "mcp.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Parse a level name, defaulting to `INFO`.
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Create `dir` if needed and open the log file for appending.
pub fn open_log_file(dir: &Path) -> std::io::Result<(File, PathBuf)> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((file, path))
}

fn fmt_layer<W>(writer: W, ansi: bool, with_timestamps: bool) -> BoxedLayer
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if with_timestamps {
        layer.boxed()
    } else {
        layer.without_time().boxed()
    }
}

/// Install the global subscriber.
///
/// Returns the log file path when file logging is enabled.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<PathBuf>> {
    let filter = EnvFilter::from_default_env().add_directive(parse_level(&config.level).into());

    let mut layers: Vec<BoxedLayer> = vec![fmt_layer(std::io::stderr, true, config.with_timestamps)];

    let log_file = match &config.log_dir {
        Some(dir) => {
            let (file, path) = open_log_file(dir)?;
            layers.push(fmt_layer(Mutex::new(file), false, true));
            Some(path)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| Error::internal(format!("failed to install logger: {}", e)))?;

    Ok(log_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("warning"), Level::WARN);
        assert_eq!(parse_level("nonsense"), Level::INFO);
    }

    #[test]
    fn test_open_log_file_creates_directory_and_appends() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("nested").join("logs");

        let (mut file, path) = open_log_file(&dir).unwrap();
        assert_eq!(path, dir.join(LOG_FILE_NAME));
        writeln!(file, "first").unwrap();
        drop(file);

        let (mut file, _) = open_log_file(&dir).unwrap();
        writeln!(file, "second").unwrap();
        drop(file);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }
}
