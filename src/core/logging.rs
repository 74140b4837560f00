//! Structured logging system
//!
//! Sets up the global tracing subscriber from [`LoggingConfig`]: JSON or text
//! format, stdout or file output with size-based rotation.

use crate::core::config::LoggingConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Logger instance that manages the logging system
///
/// Keep the returned value alive for the lifetime of the process; dropping it
/// flushes and stops the background writer.
pub struct Logger {
    _guard: Option<WorkerGuard>,
}

impl Logger {
    /// Initialize the global tracing subscriber based on configuration
    pub fn init(config: &LoggingConfig) -> Result<Self> {
        let level = parse_log_level(&config.level)?;

        // RUST_LOG wins over the configured level when present
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.as_str()));

        let (writer, guard) = build_writer(config)?;

        let fmt_layer = match config.format.as_str() {
            "json" => fmt::layer()
                .json()
                .with_writer(writer)
                .with_span_events(FmtSpan::CLOSE)
                .with_current_span(true)
                .with_thread_ids(true)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
            "text" => fmt::layer()
                .with_writer(writer)
                .with_span_events(FmtSpan::CLOSE)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
            _ => {
                anyhow::bail!("Invalid format configuration: {}", config.format);
            }
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .context("Failed to initialize tracing subscriber")?;

        tracing::info!(
            level = %config.level,
            format = %config.format,
            output = %config.output,
            "Logging system initialized"
        );

        Ok(Logger { _guard: guard })
    }
}

/// Build the non-blocking writer for the configured output
fn build_writer(config: &LoggingConfig) -> Result<(NonBlocking, Option<WorkerGuard>)> {
    match config.output.as_str() {
        "stdout" => {
            let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());
            Ok((non_blocking, Some(guard)))
        }
        "file" => {
            let log_file = config
                .log_file
                .as_ref()
                .context("log_file must be specified when output is 'file'")?;

            if let Some(parent) = log_file.parent() {
                std::fs::create_dir_all(parent).context("Failed to create log directory")?;
            }

            let appender =
                SizeRotatingAppender::for_path(log_file, config.max_file_size, config.max_backups)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            Ok((non_blocking, Some(guard)))
        }
        _ => anyhow::bail!("Invalid output configuration: {}", config.output),
    }
}

/// Parse log level string to tracing Level
fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid log level: {}", level),
    }
}

/// File appender that rotates when the active file exceeds a size limit
///
/// Backups are shifted `log.1 -> log.2 -> ...` up to `max_backups`, the
/// oldest falling off the end.
pub struct SizeRotatingAppender {
    directory: PathBuf,
    filename: String,
    max_file_size: usize,
    max_backups: usize,
    active: std::sync::Mutex<Option<std::fs::File>>,
    written: std::sync::atomic::AtomicUsize,
}

impl SizeRotatingAppender {
    pub fn new(
        directory: PathBuf,
        filename: String,
        max_file_size: usize,
        max_backups: usize,
    ) -> Self {
        Self {
            directory,
            filename,
            max_file_size,
            max_backups,
            active: std::sync::Mutex::new(None),
            written: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Build an appender from a full log file path
    pub fn for_path(log_file: &Path, max_file_size: usize, max_backups: usize) -> Result<Self> {
        let directory = log_file
            .parent()
            .context("Log file must have a parent directory")?;

        let filename = log_file
            .file_name()
            .context("Log file must have a filename")?
            .to_str()
            .context("Log filename must be valid UTF-8")?;

        Ok(Self::new(
            directory.to_path_buf(),
            filename.to_string(),
            max_file_size,
            max_backups,
        ))
    }

    fn active_path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        self.directory.join(format!("{}.{}", self.filename, index))
    }

    fn rotate(&self) -> std::io::Result<()> {
        // Close the active file before renaming it
        let mut active = self.active.lock().unwrap();
        *active = None;
        drop(active);

        for i in (1..self.max_backups).rev() {
            let from = self.backup_path(i);
            let to = self.backup_path(i + 1);

            if from.exists() {
                if to.exists() {
                    std::fs::remove_file(&to)?;
                }
                std::fs::rename(&from, &to)?;
            }
        }

        let current = self.active_path();
        if current.exists() {
            let first_backup = self.backup_path(1);
            if first_backup.exists() {
                std::fs::remove_file(&first_backup)?;
            }
            std::fs::rename(&current, &first_backup)?;
        }

        self.written.store(0, std::sync::atomic::Ordering::SeqCst);

        Ok(())
    }

    fn open_active(&self) -> std::io::Result<std::sync::MutexGuard<'_, Option<std::fs::File>>> {
        let mut active = self.active.lock().unwrap();

        if active.is_none() {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.active_path())?;

            // Resume the size counter from whatever is already on disk
            let metadata = file.metadata()?;
            self.written
                .store(metadata.len() as usize, std::sync::atomic::Ordering::SeqCst);

            *active = Some(file);
        }

        Ok(active)
    }
}

impl std::io::Write for SizeRotatingAppender {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let written = self.written.load(std::sync::atomic::Ordering::SeqCst);
        if written + buf.len() > self.max_file_size {
            self.rotate()?;
        }

        let mut active = self.open_active()?;
        let file = active.as_mut().unwrap();
        let n = file.write(buf)?;

        self.written
            .fetch_add(n, std::sync::atomic::Ordering::SeqCst);

        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut active = self.open_active()?;
        if let Some(file) = active.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_parse_log_level() {
        assert!(matches!(parse_log_level("debug"), Ok(Level::DEBUG)));
        assert!(matches!(parse_log_level("info"), Ok(Level::INFO)));
        assert!(matches!(parse_log_level("WARN"), Ok(Level::WARN)));
        assert!(matches!(parse_log_level("error"), Ok(Level::ERROR)));
        assert!(parse_log_level("verbose").is_err());
    }

    #[test]
    fn test_appender_paths() {
        let appender = SizeRotatingAppender::new(
            PathBuf::from("/tmp/logs"),
            "portal.log".to_string(),
            1024,
            5,
        );

        assert_eq!(
            appender.active_path(),
            PathBuf::from("/tmp/logs/portal.log")
        );
        assert_eq!(
            appender.backup_path(1),
            PathBuf::from("/tmp/logs/portal.log.1")
        );
        assert_eq!(
            appender.backup_path(3),
            PathBuf::from("/tmp/logs/portal.log.3")
        );
    }

    #[test]
    fn test_rotation_creates_backup() {
        let dir = tempfile::tempdir().unwrap();
        let mut appender = SizeRotatingAppender::new(
            dir.path().to_path_buf(),
            "portal.log".to_string(),
            32,
            2,
        );

        // Two writes that together exceed the limit force a rotation
        appender.write_all(b"aaaaaaaaaaaaaaaaaaaaaaaa\n").unwrap();
        appender.flush().unwrap();
        appender.write_all(b"bbbbbbbbbbbbbbbbbbbbbbbb\n").unwrap();
        appender.flush().unwrap();

        let backup = dir.path().join("portal.log.1");
        assert!(backup.exists());
        let rotated = std::fs::read_to_string(&backup).unwrap();
        assert!(rotated.starts_with("aaaa"));
        let active = std::fs::read_to_string(dir.path().join("portal.log")).unwrap();
        assert!(active.starts_with("bbbb"));
    }
}
