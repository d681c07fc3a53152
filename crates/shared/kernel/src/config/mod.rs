use config::{Config, Environment, File, FileFormat};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use vtl_domain::constants::{CONFIG_ENV_PREFIX, DEFAULT_CONFIG_FILE};

/// Custom error type for config loading.
#[vtl_derive::vtl_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Layered configuration loader.
///
/// Layers, lowest precedence first:
/// 1. **File**: an explicit TOML file (must exist), or `vtl.toml` in the working
///    directory when present.
/// 2. **Environment**: variables prefixed with `VTL__`; nesting uses double
///    underscores, so `VTL__TRACKING__RUN_NAME` maps to `tracking.run_name`.
///    Values stay strings and are converted only where the target field is
///    numeric or boolean, so `VTL__TRACKING__RUN_NAME=001` keeps its zeros.
///
/// The environment layer reads the process environment unless
/// [`ConfigLoader::env_source`] supplies a fixed map.
#[must_use = "loaders do nothing until .load() is called"]
#[derive(Debug, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `path` as a required base file.
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Replaces the process environment with `vars` for the override layer.
    pub fn env_source(mut self, vars: HashMap<String, String>) -> Self {
        self.env = Some(vars);
        self
    }

    /// Builds and deserializes the configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError::Config`] if an explicit file is missing or malformed,
    /// or if the merged values do not fit `T`.
    pub fn load<T>(self) -> Result<T, ConfigError>
    where
        T: DeserializeOwned,
    {
        let file = match &self.file {
            Some(path) => {
                info!("Loading config from {}", path.display());
                File::from(path.as_path()).format(FileFormat::Toml).required(true)
            },
            None => {
                debug!("No config file given, probing {DEFAULT_CONFIG_FILE}");
                File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false)
            },
        };

        let env = Environment::with_prefix(CONFIG_ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .source(self.env);

        let config = Config::builder()
            .add_source(file)
            .add_source(env)
            .build()
            .context("Failed to build config")?
            .try_deserialize::<T>()
            .context("Failed to deserialize config")?;

        Ok(config)
    }
}

/// Loads `T` from an optional file plus `VTL__` environment overrides.
///
/// Shorthand for [`ConfigLoader`] reading the process environment.
///
/// # Errors
/// See [`ConfigLoader::load`].
///
/// # Example
/// ```rust,no_run
/// use vtl_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct Tracking {
///     run_name: String,
/// }
///
/// let cfg: Tracking = load_config(Some("configs/ablation.toml")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let loader = ConfigLoader::new();
    match path {
        Some(path) => loader.file(path).load(),
        None => loader.load(),
    }
}
