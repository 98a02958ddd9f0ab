//! Layered configuration: defaults, `config/default.toml`, then `ENRICHER_*`
//! environment variables.

use anyhow::{Context, Result};
use predictor::PredictorConfig;
use redpanda::RedpandaConfig;
use serde::{Deserialize, Serialize};
use store::StoreConfig;
use worker::WorkerConfig;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub redpanda: RedpandaConfig,

    #[serde(default)]
    pub predictor: PredictorConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub worker: WorkerConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            redpanda: RedpandaConfig::default(),
            predictor: PredictorConfig::default(),
            store: StoreConfig::default(),
            worker: WorkerConfig::default(),
        }
    }
}

impl Settings {
    /// Address the health server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Load configuration from files and environment.
pub fn load_settings() -> Result<Settings> {
    let config = config::Config::builder()
        .add_source(config::Config::try_from(&Settings::default())?)
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("ENRICHER")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut settings: Settings = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

/// Flat overrides for the fields deployments set most often; nested
/// parsing of `ENRICHER__...` does not cope with underscored field names.
fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(brokers) = var("ENRICHER_REDPANDA_BROKERS") {
        settings.redpanda.brokers = brokers
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if let Some(topic) = var("ENRICHER_REDPANDA_TOPIC") {
        settings.redpanda.topic = topic;
    }
    if let Some(group_id) = var("ENRICHER_REDPANDA_GROUP_ID") {
        settings.redpanda.group_id = group_id;
    }
    if let Some(username) = var("ENRICHER_REDPANDA_SASL_USERNAME") {
        settings.redpanda.sasl_username = Some(username);
    }
    if let Some(password) = var("ENRICHER_REDPANDA_SASL_PASSWORD") {
        settings.redpanda.sasl_password = Some(password);
    }

    if let Some(url) = var("ENRICHER_DATABASE_URL") {
        settings.store.url = url;
    }

    if let Some(url) = var("ENRICHER_AGE_URL") {
        settings.predictor.age_url = url;
    }
    if let Some(url) = var("ENRICHER_GENDER_URL") {
        settings.predictor.gender_url = url;
    }
    if let Some(url) = var("ENRICHER_NATIONALITY_URL") {
        settings.predictor.nationality_url = url;
    }
}
