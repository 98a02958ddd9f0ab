//! Record pipeline: consume → enrich → persist, one message at a time.
//!
//! Every per-message failure is logged and skipped; the loop only ends when
//! the source closes or can no longer be read. Offsets are committed after
//! each message whatever its outcome (at-least-once).

use crate::enrichment::RecordEnricher;
use enricher_core::{RawRecord, Result};
use redpanda::{Message, MessageSource};
use std::sync::Arc;
use store::PersistenceSink;
use telemetry::metrics;
use tracing::{debug, error, info, warn};

/// What happened to one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Persisted,
    SkippedMalformed,
    SkippedEnrichment,
    SkippedPersist,
}

/// Per-outcome counts for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub persisted: u64,
    pub malformed: u64,
    pub enrichment_failed: u64,
    pub persist_failed: u64,
}

impl PipelineStats {
    pub fn record(&mut self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::Persisted => self.persisted += 1,
            RecordOutcome::SkippedMalformed => self.malformed += 1,
            RecordOutcome::SkippedEnrichment => self.enrichment_failed += 1,
            RecordOutcome::SkippedPersist => self.persist_failed += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.persisted + self.malformed + self.enrichment_failed + self.persist_failed
    }
}

/// Sequential consume-enrich-persist loop.
pub struct RecordPipeline {
    source: Arc<dyn MessageSource>,
    enricher: Arc<dyn RecordEnricher>,
    sink: Arc<dyn PersistenceSink>,
}

impl RecordPipeline {
    pub fn new(
        source: Arc<dyn MessageSource>,
        enricher: Arc<dyn RecordEnricher>,
        sink: Arc<dyn PersistenceSink>,
    ) -> Self {
        Self {
            source,
            enricher,
            sink,
        }
    }

    /// Runs until the source closes (`Ok`) or fails (`Err`, fatal).
    pub async fn run(&self) -> Result<PipelineStats> {
        info!("Record pipeline starting");
        let mut stats = PipelineStats::default();

        loop {
            let message = match self.source.next_message().await {
                Ok(Some(message)) => message,
                Ok(None) => {
                    info!(
                        processed = stats.total(),
                        persisted = stats.persisted,
                        "Message source closed, pipeline stopping"
                    );
                    return Ok(stats);
                }
                Err(e) => {
                    error!(error = %e, kind = e.kind(), "Upstream read failed, pipeline stopping");
                    return Err(e);
                }
            };

            let outcome = self.process_message(&message).await;
            stats.record(outcome);

            self.source.commit(&message).await?;
        }
    }

    /// Handles one message. Never fails; failures become skip outcomes.
    pub async fn process_message(&self, message: &Message) -> RecordOutcome {
        let Some(record) = self.parse(message) else {
            metrics().records_malformed.inc();
            return RecordOutcome::SkippedMalformed;
        };

        debug!(
            partition = message.partition,
            offset = message.offset,
            key = %message.key_str(),
            name = %record.name,
            surname = %record.surname,
            patronymic = %record.patronymic,
            "Received record"
        );

        let enriched = match self.enricher.enrich(&record).await {
            Ok(enriched) => enriched,
            Err(e) => {
                metrics().enrichment_failures.inc();
                warn!(
                    stage = "enrichment",
                    offset = message.offset,
                    name = %record.name,
                    kind = e.kind(),
                    error = %e,
                    "Skipping record"
                );
                return RecordOutcome::SkippedEnrichment;
            }
        };

        if let Err(e) = self.sink.insert(&enriched).await {
            metrics().persist_failures.inc();
            error!(
                stage = "persist",
                offset = message.offset,
                name = %enriched.name,
                kind = e.kind(),
                error = %e,
                "Dropping enriched record"
            );
            return RecordOutcome::SkippedPersist;
        }

        metrics().records_persisted.inc();
        info!(
            offset = message.offset,
            name = %enriched.name,
            age = enriched.age,
            gender = %enriched.gender,
            nationality = %enriched.nationality,
            "Record persisted"
        );
        RecordOutcome::Persisted
    }

    fn parse(&self, message: &Message) -> Option<RawRecord> {
        let Some(value) = message.value.as_deref() else {
            warn!(
                stage = "decode",
                partition = message.partition,
                offset = message.offset,
                key = %message.key_str(),
                "Skipping message without a value"
            );
            return None;
        };

        match RawRecord::from_payload(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(
                    stage = "decode",
                    partition = message.partition,
                    offset = message.offset,
                    key = %message.key_str(),
                    error = %e,
                    "Skipping malformed record"
                );
                None
            }
        }
    }
}
