//! Client configuration

use clap::Parser;
use thiserror::Error;

use crate::config::{
    api::ApiConfig, observability::LoggingConfig, payments::PaymentsConfig,
    storage::StorageConfig,
};

pub mod api;
pub mod observability;
pub mod payments;
pub mod storage;

pub use observability::LogFormat;

/// Invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Arguments or environment could not be parsed
    #[error(transparent)]
    Parse(#[from] clap::Error),

    /// `--api-url` was blank
    #[error("the backend URL cannot be empty")]
    MissingApiUrl,
}

/// Storefront client configuration
#[derive(Debug, Parser)]
#[command(name = "storefront", about = "STATIC storefront client", long_about = None)]
pub struct AppConfig {
    /// Backend settings.
    #[command(flatten)]
    pub api: ApiConfig,

    /// Durable state settings.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Bank transfer details shown at checkout.
    #[command(flatten)]
    pub payments: PaymentsConfig,
}

impl AppConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        let config = Self::try_parse()?;
        config.validate()?;

        Ok(config)
    }

    /// Parse from an explicit argument list, without touching `.env`.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments cannot be parsed
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let config = Self::try_parse_from(args)?;
        config.validate()?;

        Ok(config)
    }

    /// Check values clap cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingApiUrl`] for a blank backend URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.api_url.trim().is_empty() {
            return Err(ConfigError::MissingApiUrl);
        }

        Ok(())
    }
}
