//! Predictor endpoint configuration.

use enricher_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Base URLs of the three providers plus the per-call timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    #[serde(default = "default_age_url")]
    pub age_url: String,
    #[serde(default = "default_gender_url")]
    pub gender_url: String,
    #[serde(default = "default_nationality_url")]
    pub nationality_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_age_url() -> String {
    "https://api.agify.io/".to_string()
}

fn default_gender_url() -> String {
    "https://api.genderize.io/".to_string()
}

fn default_nationality_url() -> String {
    "https://api.nationalize.io/".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            age_url: default_age_url(),
            gender_url: default_gender_url(),
            nationality_url: default_nationality_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl PredictorConfig {
    /// Checks every base URL is an absolute http(s) URL.
    pub fn validate(&self) -> Result<()> {
        for (attribute, raw) in [
            ("age", &self.age_url),
            ("gender", &self.gender_url),
            ("nationality", &self.nationality_url),
        ] {
            let parsed = url::Url::parse(raw)
                .map_err(|e| Error::config(format!("Invalid {} URL '{}': {}", attribute, raw, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::config(format!(
                    "Unsupported scheme for {} URL '{}'",
                    attribute, raw
                )));
            }
        }
        if self.timeout_secs == 0 {
            return Err(Error::config("Predictor timeout must be at least one second"));
        }
        Ok(())
    }
}
