//! Enrichment coordinator.
//!
//! Fans one raw record out to the age, gender and nationality providers and
//! joins the three answers into an [`EnrichedRecord`]. The join is
//! fail-fast: the first failed lookup is returned and the lookups still in
//! flight are dropped, so a partial record is never built.

use async_trait::async_trait;
use enricher_core::{EnrichedRecord, RawRecord, Result};
use predictor::{
    AgePrediction, GenderPrediction, NationalityPrediction, PredictorClient, PredictorConfig,
};
use std::time::{Duration, Instant};
use telemetry::metrics;
use tracing::debug;

/// Turns a raw record into an enriched one.
#[async_trait]
pub trait RecordEnricher: Send + Sync {
    async fn enrich(&self, record: &RawRecord) -> Result<EnrichedRecord>;
}

/// Enricher backed by the three HTTP predictors.
///
/// Only `name` is looked up; surname and patronymic pass through.
pub struct Enricher {
    client: PredictorClient,
    endpoints: PredictorConfig,
}

impl Enricher {
    pub fn new(client: PredictorClient, endpoints: PredictorConfig) -> Self {
        Self { client, endpoints }
    }

    /// Validates the endpoints and builds the HTTP client.
    pub fn from_config(config: PredictorConfig) -> Result<Self> {
        config.validate()?;
        let client = PredictorClient::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self::new(client, config))
    }
}

#[async_trait]
impl RecordEnricher for Enricher {
    async fn enrich(&self, record: &RawRecord) -> Result<EnrichedRecord> {
        let start = Instant::now();
        let name = record.name.as_str();

        let (age, gender, nationality) = tokio::try_join!(
            self.client
                .predict::<AgePrediction>(&self.endpoints.age_url, name),
            self.client
                .predict::<GenderPrediction>(&self.endpoints.gender_url, name),
            self.client
                .predict::<NationalityPrediction>(&self.endpoints.nationality_url, name),
        )?;

        let elapsed = start.elapsed();
        metrics()
            .enrichment_latency_ms
            .observe(elapsed.as_millis() as u64);

        debug!(
            name = %name,
            age = age,
            gender = %gender,
            nationality = %nationality,
            latency_ms = %elapsed.as_millis(),
            "Record enriched"
        );

        Ok(EnrichedRecord::new(record.clone(), age, gender, nationality))
    }
}
