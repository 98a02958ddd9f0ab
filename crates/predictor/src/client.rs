//! HTTP client for the prediction providers.

use crate::prediction::AttributePrediction;
use enricher_core::{Error, Result};
use std::time::{Duration, Instant};
use telemetry::metrics;
use tracing::{debug, warn};

/// Issues one lookup per call against a provider base URL.
///
/// Wraps a single pooled `reqwest::Client`; clones share the pool.
#[derive(Clone)]
pub struct PredictorClient {
    http_client: reqwest::Client,
}

impl PredictorClient {
    /// Creates a client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }

    /// Looks up `name` at `base_url` and extracts the attribute.
    ///
    /// Empty names are sent as-is. Transport failures, timeouts and non-2xx
    /// statuses are `Error::Transport`; a body that does not decode into `P`
    /// is `Error::Decode`. Nothing is retried.
    pub async fn predict<P: AttributePrediction>(
        &self,
        base_url: &str,
        name: &str,
    ) -> Result<P::Output> {
        let start = Instant::now();
        metrics().predictor_calls.inc();

        let result = self.fetch::<P>(base_url, name).await;

        metrics()
            .predictor_latency_ms
            .observe(start.elapsed().as_millis() as u64);

        match result {
            Ok(prediction) => {
                debug!(
                    attribute = P::ATTRIBUTE,
                    latency_ms = %start.elapsed().as_millis(),
                    "Prediction received"
                );
                Ok(prediction.extract())
            }
            Err(e) => {
                metrics().predictor_errors.inc();
                warn!(
                    attribute = P::ATTRIBUTE,
                    endpoint = %base_url,
                    error = %e,
                    "Prediction failed"
                );
                Err(e)
            }
        }
    }

    async fn fetch<P: AttributePrediction>(&self, base_url: &str, name: &str) -> Result<P> {
        let response = self
            .http_client
            .get(base_url)
            .query(&[("name", name)])
            .send()
            .await
            .map_err(|e| {
                Error::transport(format!("{} request to {} failed: {}", P::ATTRIBUTE, base_url, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::transport(format!(
                "{} provider {} returned {}",
                P::ATTRIBUTE,
                base_url,
                status
            )));
        }

        let body = response.bytes().await.map_err(|e| {
            Error::transport(format!(
                "Failed to read {} response from {}: {}",
                P::ATTRIBUTE,
                base_url,
                e
            ))
        })?;

        serde_json::from_slice::<P>(&body).map_err(|e| {
            Error::decode(format!(
                "Invalid {} response from {}: {}",
                P::ATTRIBUTE,
                base_url,
                e
            ))
        })
    }
}
