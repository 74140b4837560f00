//! Configuration management

use clap::Parser;
use config::{Config as ConfigBuilder, ConfigError as BuilderError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid server configuration: {0}")]
    InvalidServer(String),

    #[error("Invalid backend configuration: {0}")]
    InvalidBackend(String),

    #[error("Invalid images configuration: {0}")]
    InvalidImages(String),

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
    pub backend: BackendConfig,
    #[serde(default)]
    pub images: ImagesConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration with precedence: CLI args > Environment variables > Config file > Defaults
    pub fn load() -> Result<Self, ConfigError> {
        // Parse command-line arguments
        let cli_args = CliArgs::parse();

        // Build configuration with proper precedence
        let mut builder = ConfigBuilder::builder();

        // 1. Start with defaults (lowest priority)
        builder = builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 4100)?
            .set_default("server.request_timeout", 30)?
            .set_default("server.allowed_origins", vec!["*"])?
            .set_default("backend.base_url", "http://127.0.0.1:8080")?
            .set_default("backend.request_timeout", 30)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("logging.output", "stdout")?
            .set_default("logging.max_file_size", 10485760)? // 10 MB
            .set_default("logging.max_backups", 5)?;

        // 2. Load from config file if specified (medium priority)
        if let Some(config_path) = &cli_args.config {
            if !config_path.exists() {
                return Err(ConfigError::FileNotFound(
                    config_path.display().to_string(),
                ));
            }
            builder = builder.add_source(File::from(config_path.as_path()));
        }

        // 3. Override with environment variables (higher priority)
        // Environment variables should be prefixed with MANGAM_ and use __ for nesting
        // Example: MANGAM_SERVER__PORT=4200
        builder = builder.add_source(
            Environment::with_prefix("MANGAM")
                .separator("__")
                .try_parsing(true),
        );

        // 4. Override with CLI arguments (highest priority)
        if let Some(host) = &cli_args.host {
            builder = builder.set_override("server.host", host.clone())?;
        }
        if let Some(port) = cli_args.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(backend_url) = &cli_args.backend_url {
            builder = builder.set_override("backend.base_url", backend_url.clone())?;
        }
        if let Some(log_level) = &cli_args.log_level {
            builder = builder.set_override("logging.level", log_level.clone())?;
        }

        // Build and deserialize configuration
        let config: Config = builder.build()?.try_deserialize()?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let config: Config = ConfigBuilder::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        // Set defaults first
        builder = builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 4100)?
            .set_default("server.request_timeout", 30)?
            .set_default("server.allowed_origins", vec!["*"])?
            .set_default("backend.base_url", "http://127.0.0.1:8080")?
            .set_default("backend.request_timeout", 30)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("logging.output", "stdout")?
            .set_default("logging.max_file_size", 10485760)?
            .set_default("logging.max_backups", 5)?;

        // Override with environment variables
        let config: Config = builder
            .add_source(
                Environment::with_prefix("MANGAM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.backend.validate()?;
        self.images.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Command-line arguments for configuration override
#[derive(Debug, Parser)]
#[command(name = "mangam-portal")]
#[command(about = "MangaM Portal Server", long_about = None)]
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

    /// Base URL of the MangaM backend API
    #[arg(short, long, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout: u64, // seconds
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::InvalidServer(
                "host cannot be empty".to_string(),
            ));
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidServer(
                "port must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::InvalidServer(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if self.allowed_origins.is_empty() {
            return Err(ConfigError::InvalidServer(
                "allowed_origins cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub request_timeout: u64, // seconds
}

impl BackendConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::InvalidBackend(
                "base_url cannot be empty".to_string(),
            ));
        }

        let parsed = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::InvalidBackend(format!("base_url is not a URL: {}", e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidBackend(
                "base_url must use http or https".to_string(),
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::InvalidBackend(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Allow-list for the remote-image proxy
#[derive(Debug, Clone, Deserialize)]
pub struct ImagesConfig {
    #[serde(default = "default_remote_patterns")]
    pub remote_patterns: Vec<RemotePattern>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            remote_patterns: default_remote_patterns(),
        }
    }
}

impl ImagesConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for pattern in &self.remote_patterns {
            pattern.validate()?;
        }
        Ok(())
    }

    /// Check whether a remote URL matches any configured pattern
    pub fn allows(&self, url: &Url) -> bool {
        self.remote_patterns.iter().any(|p| p.matches(url))
    }
}

/// A single allowed remote-image source
///
/// `port: None` means the scheme's default port; an explicit port must match
/// exactly. `pathname` is `**` (any path), a `/prefix/**` glob, or an exact
/// path.
#[derive(Debug, Clone, Deserialize)]
pub struct RemotePattern {
    #[serde(default = "default_protocol")]
    pub protocol: String,
    pub hostname: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default = "default_pathname")]
    pub pathname: String,
}

impl RemotePattern {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.protocol != "http" && self.protocol != "https" {
            return Err(ConfigError::InvalidImages(
                "protocol must be http or https".to_string(),
            ));
        }

        if self.hostname.is_empty() {
            return Err(ConfigError::InvalidImages(
                "hostname cannot be empty".to_string(),
            ));
        }

        if self.pathname.is_empty() {
            return Err(ConfigError::InvalidImages(
                "pathname cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn matches(&self, url: &Url) -> bool {
        if url.scheme() != self.protocol {
            return false;
        }

        let host_matches = url
            .host_str()
            .map(|h| h.eq_ignore_ascii_case(&self.hostname))
            .unwrap_or(false);
        if !host_matches {
            return false;
        }

        // The url crate drops a scheme-default port during parsing, so an
        // explicit default port still satisfies a `port: None` pattern.
        let port_matches = match self.port {
            Some(p) => url.port_or_known_default() == Some(p),
            None => url.port().is_none(),
        };
        if !port_matches {
            return false;
        }

        let path = url.path();
        if self.pathname == "**" {
            true
        } else if let Some(prefix) = self.pathname.strip_suffix("/**") {
            // Glob prefixes bind to whole segments: `/covers/**` must not
            // admit `/coversecret/key.pem`.
            match path.strip_prefix(prefix) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            }
        } else {
            path == self.pathname
        }
    }
}

fn default_protocol() -> String {
    "https".to_string()
}

fn default_pathname() -> String {
    "**".to_string()
}

fn default_remote_patterns() -> Vec<RemotePattern> {
    vec![
        RemotePattern {
            protocol: default_protocol(),
            hostname: "placehold.co".to_string(),
            port: None,
            pathname: default_pathname(),
        },
        RemotePattern {
            protocol: default_protocol(),
            hostname: "upload.wikimedia.org".to_string(),
            port: None,
            pathname: default_pathname(),
        },
    ]
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
    pub log_file: Option<PathBuf>,
    pub max_file_size: usize, // bytes
    pub max_backups: usize,
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

        if self.max_file_size == 0 {
            return Err(ConfigError::InvalidLogging(
                "max_file_size must be greater than 0".to_string(),
            ));
        }

        if self.max_backups == 0 {
            return Err(ConfigError::InvalidLogging(
                "max_backups must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
