//! # Logger
//!
//! Installs the process-wide `tracing` subscriber used by the `vtl` binary.
//!
//! Console output goes to **stderr** so that commands printing plans or
//! requirement lists keep stdout clean for piping. An optional rolling log file
//! (non-blocking writer) can be attached with [`LoggerBuilder::path`]; the
//! file-only knobs (rotation, retention, JSON) exist only after a path is set.
//!
//! Without an explicit filter, `RUST_LOG` wins over the programmatic level.
//! [`LoggerBuilder::env_filter`] replaces both: its directives (e.g.
//! `"vtl_launch=debug"`) are used as given and `RUST_LOG` is not read.
//!
//! ## Example
//!
//! ```rust
//! # use vtl_logger::{Logger, LevelFilter};
//! let _logger = Logger::builder()
//!     .name("vtl")
//!     .verbosity(1)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use private::Sealed;
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

#[derive(Debug)]
struct LoggerConfig {
    console: bool,
    targets: bool,
    path: Option<PathBuf>,
    level: LevelFilter,
    rotation: Rotation,
    max_files: usize,
    json: bool,
    env_filter: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: true,
            targets: false,
            path: None,
            level: LevelFilter::INFO,
            rotation: Rotation::NEVER,
            max_files: DEFAULT_MAX_FILES,
            json: false,
            env_filter: None,
        }
    }
}

#[derive(Debug)]
pub struct Unnamed;
#[derive(Debug)]
pub struct Named(String);
#[derive(Debug)]
pub struct ConsoleOnly;
#[derive(Debug)]
pub struct WithFile;

mod private {
    pub trait Sealed {}
}
impl Sealed for Unnamed {}
impl Sealed for Named {}
impl Sealed for ConsoleOnly {}
impl Sealed for WithFile {}

/// Maps a `-v` count onto a level: none is `INFO`, one is `DEBUG`, more is `TRACE`.
#[must_use]
pub const fn level_for_verbosity(count: u8) -> LevelFilter {
    match count {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// A builder for the global tracing subscriber.
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = Unnamed, F: Sealed = ConsoleOnly> {
    config: LoggerConfig,
    name: N,
    output: PhantomData<F>,
}

impl<F: Sealed> LoggerBuilder<Unnamed, F> {
    /// Sets the logger name, also used as the log file prefix.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<Named, F> {
        LoggerBuilder { config: self.config, name: Named(name.into()), output: PhantomData }
    }
}

impl LoggerBuilder<Named, ConsoleOnly> {
    /// Adds a log file under `dir`. The directory is created on [`init`](Self::init).
    pub fn path(self, dir: impl Into<PathBuf>) -> LoggerBuilder<Named, WithFile> {
        let mut config = self.config;
        config.path = Some(dir.into());
        LoggerBuilder { config, name: self.name, output: PhantomData }
    }
}

impl LoggerBuilder<Named, WithFile> {
    /// Keeps at most `max` rotated files.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.config.max_files = max;
        self
    }

    /// Sets the rotation period. Defaults to a single file per name.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.config.rotation = rotation;
        self
    }

    /// Writes the log file as JSON lines.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(mut self) -> Self {
        self.config.json = true;
        self
    }
}

impl<F: Sealed> LoggerBuilder<Named, F> {
    /// Sets the minimum level emitted when `RUST_LOG` is absent.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Sets the level from a `-v` count, see [`level_for_verbosity`].
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn verbosity(self, count: u8) -> Self {
        self.level(level_for_verbosity(count))
    }

    /// Adds an explicit filter directive (e.g., `vtl_launch=debug`).
    ///
    /// Takes precedence over `RUST_LOG`, which is then ignored.
    /// Invalid directives make [`LoggerBuilder::init`] fail.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    /// Enables or disables console output.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    /// Prints the event target (module path) on the console.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn targets(mut self, enabled: bool) -> Self {
        self.config.targets = enabled;
        self
    }

    /// Installs the subscriber.
    ///
    /// # Returns
    /// A [`Logger`] handle owning the file writer's [`WorkerGuard`]; keep it alive
    /// until the process exits or buffered lines may be lost.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, zero `max_files`,
    ///   a bad filter directive, or when no output is enabled.
    /// * [`LoggerError::Io`] / [`LoggerError::Appender`] if the log file cannot be set up.
    /// * [`LoggerError::Subscriber`] if a global subscriber already exists.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let name = self.name.0;
        validate(&self.config, &name)?;

        let filter = build_filter(&self.config)?;
        let mut layers = Vec::new();

        if self.config.console {
            layers.push(
                layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_target(self.config.targets)
                    .with_ansi(true)
                    .boxed(),
            );
        }

        let guard = match self.config.path {
            Some(dir) => {
                std::fs::create_dir_all(&dir)
                    .context(format!("Failed to create log directory {}", dir.display()))?;

                let appender = RollingFileAppender::builder()
                    .rotation(self.config.rotation)
                    .filename_prefix(&name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(self.config.max_files)
                    .build(&dir)
                    .context(format!("Failed to open log file in {}", dir.display()))?;

                let (writer, guard) = tracing_appender::non_blocking(appender);
                let file_layer = layer().with_writer(writer).with_ansi(false);
                layers.push(if self.config.json {
                    file_layer.json().boxed()
                } else {
                    file_layer.boxed()
                });
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "No logging output enabled. Enable the console or set a log path.".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(filter).with(layers).try_init()?;

        Ok(Logger { guard })
    }
}

/// Handle to the installed logging system.
#[must_use = "Dropping this handle stops the background log writer."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Returns a new [`LoggerBuilder`].
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { config: LoggerConfig::default(), name: Unnamed, output: PhantomData }
    }

    /// Whether a file writer is attached.
    #[must_use]
    pub const fn has_file(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::debug!("Flushing log file before exit");
        }
    }
}

fn validate(config: &LoggerConfig, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }

    if config.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }

    Ok(())
}

fn build_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(config.level.into());
    match &config.env_filter {
        None => Ok(builder.from_env_lossy()),
        Some(directives) => builder.parse(directives).map_err(|e| {
            LoggerError::InvalidConfiguration {
                message: format!("Invalid filter '{directives}': {e}").into(),
                context: None,
            }
        }),
    }
}
