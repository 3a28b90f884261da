//! # Logging Utilities
//!
//! Logging setup for gridscope binaries using `tracing`.
//!
//! Log lines go to stderr so they never mix with command output on stdout.
//! Optionally every line is mirrored to a file through `tracing-appender`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gridscope_utils::init_logging;
//!
//! // Keep the guard alive until exit so buffered file output is flushed
//! let _guard = init_logging().expect("Failed to initialize logging");
//!
//! tracing::warn!("descriptor could not be parsed");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Filter directives (e.g., `RUST_LOG=debug`, `RUST_LOG=gridscope_core=trace`)
//! - `GRIDSCOPE_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
//! - `GRIDSCOPE_LOG_FILE`: Optional log file path. A directory gets a dated
//!   `YYYY-MM-DD-gridscope.log` inside it

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, fmt};

use chrono::Utc;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format
pub const LOG_FORMAT_ENV: &str = "GRIDSCOPE_LOG_FORMAT";
/// Environment variable naming the log file or directory
pub const LOG_FILE_ENV: &str = "GRIDSCOPE_LOG_FILE";

/// Level used when neither `--log-level` nor `RUST_LOG` says otherwise
const DEFAULT_LEVEL: Level = Level::WARN;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    /// Human-readable lines, colored on a terminal
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(s.to_string())),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    Error,
    Warn,
    Info,
    /// Every decode fallback taken
    Debug,
    /// Every child materialized
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::InvalidLevel(s.to_string())),
        }
    }
}

/// Resolved logging settings
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoggingConfig
{
    /// Explicit level; overrides `RUST_LOG` when set
    pub level: Option<LogLevel>,
    pub format: LogFormat,
    /// Log file, already resolved to a file name
    pub file: Option<PathBuf>,
}

impl LoggingConfig
{
    /// Settings from `GRIDSCOPE_LOG_FORMAT` and `GRIDSCOPE_LOG_FILE`
    ///
    /// ## Errors
    ///
    /// `InvalidFormat` if `GRIDSCOPE_LOG_FORMAT` is set to an unknown format.
    pub fn from_env() -> Result<Self, LoggingError>
    {
        Self::from_values(env::var(LOG_FORMAT_ENV).ok().as_deref(), env::var_os(LOG_FILE_ENV).map(PathBuf::from))
    }

    /// Settings from raw variable values
    ///
    /// ## Errors
    ///
    /// `InvalidFormat` if `format` is set to an unknown format.
    pub fn from_values(format: Option<&str>, file: Option<PathBuf>) -> Result<Self, LoggingError>
    {
        let format = match format.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };
        Ok(Self {
            level: None,
            format,
            file: file.map(|path| resolve_log_file(&path)),
        })
    }

    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self
    {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self
    {
        self.format = format;
        self
    }

    /// Install the global subscriber
    ///
    /// ## Errors
    ///
    /// `InitializationFailed` if a global subscriber is already set, and
    /// `FileError` if the log file's directory cannot be created.
    pub fn init(self) -> Result<LoggingGuard, LoggingError>
    {
        let filter = self.filter();
        let mut layers: Vec<BoxedLayer> = vec![console_layer(self.format, filter.clone())];
        let mut worker = None;
        if let Some(path) = &self.file {
            let (layer, guard) = file_layer(self.format, path, filter)?;
            layers.push(layer);
            worker = Some(guard);
        }

        Registry::default()
            .with(layers)
            .try_init()
            .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;

        Ok(LoggingGuard {
            file: self.file,
            _worker: worker,
        })
    }

    /// Explicit level, else `RUST_LOG`, else warnings only
    fn filter(&self) -> EnvFilter
    {
        match self.level {
            Some(level) => EnvFilter::new(Level::from(level).to_string()),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL.to_string())),
        }
    }
}

/// Keeps the file writer alive; dropping it flushes pending lines
pub struct LoggingGuard
{
    file: Option<PathBuf>,
    _worker: Option<WorkerGuard>,
}

impl fmt::Debug for LoggingGuard
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("LoggingGuard").field("file", &self.file).finish_non_exhaustive()
    }
}

impl LoggingGuard
{
    /// Where file output goes, if file logging is on
    pub fn log_file(&self) -> Option<&Path>
    {
        self.file.as_deref()
    }
}

/// Initialize logging from the environment
///
/// ## Example
///
/// ```rust,no_run
/// use gridscope_utils::init_logging;
///
/// let _guard = init_logging().expect("Failed to initialize logging");
/// tracing::info!("ready");
/// ```
///
/// ## Errors
///
/// Returns an error if:
/// - Logging is already initialized
/// - `GRIDSCOPE_LOG_FORMAT` names an unknown format
/// - The directory for `GRIDSCOPE_LOG_FILE` cannot be created
pub fn init_logging() -> Result<LoggingGuard, LoggingError>
{
    LoggingConfig::from_env()?.init()
}

/// Initialize logging with an explicit level and format
///
/// `GRIDSCOPE_LOG_FILE` is still honored.
///
/// ## Errors
///
/// Returns an error if logging is already initialized or file logging fails.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<LoggingGuard, LoggingError>
{
    let file = env::var_os(LOG_FILE_ENV).map(PathBuf::from);
    LoggingConfig::from_values(None, file)?
        .with_level(level)
        .with_format(format)
        .init()
}

/// A directory becomes `<dir>/<today>-gridscope.log`; anything else is used as is
pub fn resolve_log_file(path: &Path) -> PathBuf
{
    if path.is_dir() {
        path.join(format!("{}-gridscope.log", Utc::now().format("%Y-%m-%d")))
    } else {
        path.to_path_buf()
    }
}

fn console_layer(format: LogFormat, filter: EnvFilter) -> BoxedLayer
{
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(io::stderr().is_terminal())
            .with_writer(io::stderr)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(io::stderr)
            .with_filter(filter)
            .boxed(),
    }
}

fn file_layer(format: LogFormat, path: &Path, filter: EnvFilter) -> Result<(BoxedLayer, WorkerGuard), LoggingError>
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(LoggingError::FileError)?;
    let file_name = path.file_name().unwrap_or_default();

    // The date is already part of the name when it was derived from a directory
    let appender = tracing_appender::rolling::never(&dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = match format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(false)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(filter)
            .boxed(),
    };
    Ok((layer, guard))
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Unknown log format: {0}. Use 'pretty' or 'json'")]
    InvalidFormat(String),

    /// Invalid log level
    #[error("Unknown log level: {0}. Use 'error', 'warn', 'info', 'debug', or 'trace'")]
    InvalidLevel(String),

    /// A global subscriber was already installed
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}
