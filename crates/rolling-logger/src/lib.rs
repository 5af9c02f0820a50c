//! Rolling Logger
//!
//! Installs a global `tracing` subscriber that writes to a size-rotated file
//! and mirrors every line into an in-memory circular buffer.
//! `log` records from library crates are bridged into the same output.

mod buffer;
mod rolling;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

pub use buffer::LineBuffer;
use rolling::RollingFile;

/// Logger tuning knobs
#[derive(Debug, Clone)]
pub struct LoggerOptions {
    /// Rotate the live file once it would exceed this size
    pub max_bytes: u64,
    /// Number of rotated files kept next to the live one
    pub max_files: usize,
    /// Lines kept in memory for `recent_lines`
    pub buffer_lines: usize,
    pub level: Level,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            max_bytes: 2 * 1024 * 1024,
            max_files: 3,
            buffer_lines: 500,
            level: Level::DEBUG,
        }
    }
}

#[derive(Debug)]
pub enum LoggerError {
    Io(io::Error),
    AlreadyInitialized,
    NotInitialized,
    Subscriber(String),
}

impl std::fmt::Display for LoggerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoggerError::Io(e) => write!(f, "log file error: {}", e),
            LoggerError::AlreadyInitialized => write!(f, "logger already initialized"),
            LoggerError::NotInitialized => write!(f, "logger not initialized"),
            LoggerError::Subscriber(msg) => write!(f, "failed to install subscriber: {}", msg),
        }
    }
}

impl std::error::Error for LoggerError {}

impl From<io::Error> for LoggerError {
    fn from(e: io::Error) -> Self {
        LoggerError::Io(e)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Writer handed to the fmt layer: file output plus line buffer
#[derive(Clone)]
pub struct RollingWriter {
    file: Arc<Mutex<RollingFile>>,
    buffer: Arc<Mutex<LineBuffer>>,
}

impl RollingWriter {
    pub fn open(log_dir: &Path, app_name: &str, options: &LoggerOptions) -> Result<Self, LoggerError> {
        let file = RollingFile::open(log_dir, app_name, options.max_bytes, options.max_files)?;
        Ok(Self {
            file: Arc::new(Mutex::new(file)),
            buffer: Arc::new(Mutex::new(LineBuffer::new(options.buffer_lines))),
        })
    }

    pub fn log_path(&self) -> PathBuf {
        lock(&self.file).current_path()
    }

    pub fn recent_lines(&self, n: usize) -> Vec<String> {
        lock(&self.buffer).recent(n)
    }
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = lock(&self.file).write(buf)?;
        lock(&self.buffer).feed(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        lock(&self.file).flush()
    }
}

impl<'a> MakeWriter<'a> for RollingWriter {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

static LOGGER: OnceLock<RollingWriter> = OnceLock::new();

/// Initialize the global logger with default options
pub fn init_logger(log_dir: impl AsRef<Path>, app_name: &str) -> Result<(), LoggerError> {
    init_logger_with(log_dir, app_name, LoggerOptions::default())
}

pub fn init_logger_with(
    log_dir: impl AsRef<Path>,
    app_name: &str,
    options: LoggerOptions,
) -> Result<(), LoggerError> {
    if LOGGER.get().is_some() {
        return Err(LoggerError::AlreadyInitialized);
    }
    let writer = RollingWriter::open(log_dir.as_ref(), app_name, &options)?;

    tracing_subscriber::fmt()
        .with_writer(writer.clone())
        .with_ansi(false)
        .with_max_level(options.level)
        .try_init()
        .map_err(|e| LoggerError::Subscriber(e.to_string()))?;

    LOGGER.set(writer).map_err(|_| LoggerError::AlreadyInitialized)?;
    tracing::info!("{} logger started", app_name);
    Ok(())
}

fn ensure_initialized() -> Result<(), LoggerError> {
    LOGGER.get().map(|_| ()).ok_or(LoggerError::NotInitialized)
}

/// Write one info line through the installed subscriber
pub fn info(msg: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    tracing::info!("{}", msg);
    Ok(())
}

/// Most recent `n` formatted lines (empty before init)
pub fn recent_lines(n: usize) -> Vec<String> {
    LOGGER.get().map(|w| w.recent_lines(n)).unwrap_or_default()
}

pub fn log_path() -> Option<PathBuf> {
    LOGGER.get().map(RollingWriter::log_path)
}
