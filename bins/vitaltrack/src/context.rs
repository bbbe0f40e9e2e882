//! Shared command context: configuration, output format and clients

use anyhow::{Context as _, Result};
use std::path::Path;
use vitaltrack_api_client::{ApiClient, ClientConfig, FoodLookupClient};
use vitaltrack_cli::OutputFormat;
use vitaltrack_core::config::{Config, LoggingSection};
use vitaltrack_telemetry::TelemetryConfig;

pub struct Context {
    pub format: OutputFormat,
    pub client_config: ClientConfig,
    logging: LoggingSection,
}

impl Context {
    pub fn load(config_path: Option<&Path>, format: OutputFormat) -> Result<Self> {
        let config = Config::load(config_path).context("Failed to load configuration")?;

        let client_config = ClientConfig::from_schema(&config.schema)
            .apply_overrides(|key| std::env::var(key).ok());
        client_config.validate()?;

        Ok(Self {
            format,
            client_config,
            logging: config.schema.logging,
        })
    }

    pub fn telemetry(&self, verbose: u8) -> TelemetryConfig {
        TelemetryConfig {
            log_level: self.logging.level.clone(),
            json: self.logging.json,
            directory: self.logging.directory.as_ref().map(Into::into),
            ..TelemetryConfig::default()
        }
        .with_verbosity(verbose)
    }

    pub fn client(&self) -> Result<ApiClient> {
        ApiClient::builder(self.client_config.clone())
            .build()
            .context("Failed to create API client")
    }

    pub fn lookup(&self) -> Result<FoodLookupClient> {
        FoodLookupClient::new(self.client_config.lookup.clone())
            .context("Failed to create food lookup client")
    }
}
