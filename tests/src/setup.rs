//! Common test setup functions.

use api::{router, AppState};
use axum::Router;
use enricher_core::{RawRecord, Result};
use predictor::PredictorConfig;
use redpanda::{MessageSource, RecordPublisher};
use std::sync::Arc;
use std::time::Duration;
use store::PersistenceSink;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use worker::{
    CacheMirror, Enricher, MokaCacheMirror, NameMirrorWorker, PipelineStats, RecordEnricher,
    RecordPipeline,
};

use crate::fixtures;
use crate::mocks::{MockBroker, MockSink};

/// Test context with a mock broker, mock sink and three mock providers.
///
/// The pipeline, enricher and router are the production types; only the
/// broker, the database and the prediction services are replaced.
pub struct TestContext {
    pub age: MockServer,
    pub gender: MockServer,
    pub nationality: MockServer,
    pub broker: Arc<MockBroker>,
    pub sink: Arc<MockSink>,
    pub cache: MokaCacheMirror,
}

impl TestContext {
    pub async fn new() -> Self {
        Self {
            age: MockServer::start().await,
            gender: MockServer::start().await,
            nationality: MockServer::start().await,
            broker: Arc::new(MockBroker::new()),
            sink: Arc::new(MockSink::new()),
            cache: MokaCacheMirror::new(1_000),
        }
    }

    pub fn predictor_config(&self) -> PredictorConfig {
        PredictorConfig {
            age_url: self.age.uri(),
            gender_url: self.gender.uri(),
            nationality_url: self.nationality.uri(),
            timeout_secs: 5,
        }
    }

    pub fn enricher(&self) -> Arc<Enricher> {
        Arc::new(Enricher::from_config(self.predictor_config()).expect("Failed to build enricher"))
    }

    pub fn pipeline(&self) -> RecordPipeline {
        RecordPipeline::new(
            self.broker.clone() as Arc<dyn MessageSource>,
            self.enricher() as Arc<dyn RecordEnricher>,
            self.sink.clone() as Arc<dyn PersistenceSink>,
        )
    }

    /// Drains everything published so far through the pipeline.
    pub async fn run_pipeline(&self) -> Result<PipelineStats> {
        self.pipeline().run().await
    }

    pub async fn publish(&self, key: &str, record: &RawRecord) -> i64 {
        self.broker
            .publish(key, record)
            .await
            .expect("Failed to publish record")
    }

    pub fn router(&self) -> Router {
        router(AppState::new(self.cache.clone()))
    }

    pub fn mirror_worker(&self, names: Arc<dyn store::StoredNames>) -> NameMirrorWorker {
        NameMirrorWorker::new(names, Arc::new(self.cache.clone()) as Arc<dyn CacheMirror>)
    }

    /// Mounts successful answers for `name` on all three providers.
    pub async fn mount_predictions(
        &self,
        name: &str,
        age: i32,
        gender: &str,
        countries: &[(&str, f64)],
    ) {
        self.mount_predictions_delayed(name, age, gender, countries, [0, 0, 0])
            .await;
    }

    /// Same as `mount_predictions`, with a per-provider response delay in ms.
    pub async fn mount_predictions_delayed(
        &self,
        name: &str,
        age: i32,
        gender: &str,
        countries: &[(&str, f64)],
        delays: [u64; 3],
    ) {
        let answers = [
            (&self.age, fixtures::age_body(age)),
            (&self.gender, fixtures::gender_body(gender)),
            (&self.nationality, fixtures::nationality_body(countries)),
        ];

        for ((server, body), delay) in answers.into_iter().zip(delays) {
            mount(
                server,
                name,
                ResponseTemplate::new(200)
                    .set_body_json(body)
                    .set_delay(Duration::from_millis(delay)),
            )
            .await;
        }
    }
}

/// Mounts one answer for `name` on a provider.
pub async fn mount(server: &MockServer, name: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(query_param("name", name))
        .respond_with(response)
        .mount(server)
        .await;
}
