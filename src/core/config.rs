//! Configuration management

use clap::Parser;
use config::{
    builder::DefaultState, Config as RawConfig, ConfigBuilder, ConfigError as BuilderError,
    Environment, File,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Prefix for environment overrides, e.g. `CATALOG_SERVER__PORT=8080`
pub const ENV_PREFIX: &str = "CATALOG";

/// Default Google Books volumes endpoint used for cover lookups
pub const DEFAULT_COVER_LOOKUP_URL: &str = "https://www.googleapis.com/books/v1/volumes";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid server configuration: {0}")]
    InvalidServer(String),

    #[error("Invalid database configuration: {0}")]
    InvalidDatabase(String),

    #[error("Invalid cover lookup configuration: {0}")]
    InvalidCoverLookup(String),

    #[error("Invalid logging configuration: {0}")]
    InvalidLogging(String),

    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

impl From<BuilderError> for ConfigError {
    fn from(err: BuilderError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cover_lookup: CoverLookupConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration with precedence: CLI args > Environment variables > Config file > Defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_args(CliArgs::parse())
    }

    /// Same as [`Config::load`] with already parsed arguments
    pub fn load_from_args(cli_args: CliArgs) -> Result<Self, ConfigError> {
        let mut builder = Self::defaults()?;

        if let Some(config_path) = &cli_args.config {
            if !config_path.exists() {
                return Err(ConfigError::FileNotFound(config_path.display().to_string()));
            }
            builder = builder.add_source(File::from(config_path.as_path()));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        if let Some(host) = &cli_args.host {
            builder = builder.set_override("server.host", host.clone())?;
        }
        if let Some(port) = cli_args.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(db_path) = &cli_args.database {
            builder = builder.set_override("database.path", db_path.display().to_string())?;
        }
        if let Some(log_level) = &cli_args.log_level {
            builder = builder.set_override("logging.level", log_level.clone())?;
        }
        if cli_args.offline {
            builder = builder.set_override("cover_lookup.enabled", false)?;
        }

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path on top of the defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let config: Config = Self::defaults()?
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Built-in defaults, the lowest priority source
    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(RawConfig::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("server.request_timeout", 30)?
            .set_default("server.static_dir", "./static")?
            .set_default("database.path", "./data/library.sqlite")?
            .set_default("database.connection_pool_size", 4)?
            .set_default("database.busy_timeout", 5000)?
            .set_default("cover_lookup.enabled", true)?
            .set_default("cover_lookup.base_url", DEFAULT_COVER_LOOKUP_URL)?
            .set_default("cover_lookup.timeout_secs", 10)?
            .set_default("cover_lookup.listing_budget_ms", 20_000)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "text")?
            .set_default("logging.output", "stdout")?)
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.cover_lookup.validate()?;
        self.logging.validate()?;

        // A listing must finish its cover lookups before the request is cut off
        if self.cover_lookup.enabled
            && self.cover_lookup.listing_budget() >= self.server.request_timeout()
        {
            return Err(ConfigError::InvalidCoverLookup(format!(
                "listing_budget_ms ({}) must be below server.request_timeout ({}s)",
                self.cover_lookup.listing_budget_ms, self.server.request_timeout
            )));
        }
        Ok(())
    }
}

/// Command-line arguments for configuration override
#[derive(Debug, Default, Parser)]
#[command(name = "library-catalog")]
#[command(about = "Library catalog web application", long_about = None)]
pub struct CliArgs {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Server host address
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// SQLite database file path
    #[arg(short, long, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Disable external cover image lookups
    #[arg(long)]
    pub offline: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout: u64, // seconds
    pub static_dir: PathBuf,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::InvalidServer("host cannot be empty".to_string()));
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidServer("port must be greater than 0".to_string()));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::InvalidServer(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub connection_pool_size: u32,
    pub busy_timeout: u64, // milliseconds
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidDatabase("path cannot be empty".to_string()));
        }

        if self.connection_pool_size == 0 {
            return Err(ConfigError::InvalidDatabase(
                "connection_pool_size must be greater than 0".to_string(),
            ));
        }

        if self.busy_timeout == 0 {
            return Err(ConfigError::InvalidDatabase(
                "busy_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoverLookupConfig {
    pub enabled: bool,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Total time one listing may spend on cover lookups
    pub listing_budget_ms: u64,
}

impl CoverLookupConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidCoverLookup(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidCoverLookup(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.listing_budget_ms == 0 {
            return Err(ConfigError::InvalidCoverLookup(
                "listing_budget_ms must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn listing_budget(&self) -> Duration {
        Duration::from_millis(self.listing_budget_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
    pub log_file: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.as_str()) {
            return Err(ConfigError::InvalidLogging(format!(
                "level must be one of: {:?}",
                valid_levels
            )));
        }

        let valid_formats = ["json", "text"];
        if !valid_formats.contains(&self.format.as_str()) {
            return Err(ConfigError::InvalidLogging(format!(
                "format must be one of: {:?}",
                valid_formats
            )));
        }

        let valid_outputs = ["stdout", "file"];
        if !valid_outputs.contains(&self.output.as_str()) {
            return Err(ConfigError::InvalidLogging(format!(
                "output must be one of: {:?}",
                valid_outputs
            )));
        }

        if self.output == "file" && self.log_file.is_none() {
            return Err(ConfigError::InvalidLogging(
                "log_file must be specified when output is 'file'".to_string(),
            ));
        }

        Ok(())
    }
}
