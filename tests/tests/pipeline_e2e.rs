//! End-to-end tests for the record pipeline.
//!
//! Records go through the production publisher interface into a mock broker,
//! are enriched against mock prediction services over real HTTP, and land
//! in a capturing sink:
//! MockBroker → RecordPipeline → Enricher (wiremock) → MockSink

use enricher_core::{EnrichedRecord, RawRecord};
use integration_tests::{fixtures, setup::mount, setup::TestContext};
use wiremock::ResponseTemplate;

/// Andrew Bobov Bebov with age 30, gender male and nationality [("RU", 0.8)].
#[tokio::test]
async fn test_andrew_is_enriched_and_persisted() {
    let ctx = TestContext::new().await;
    ctx.mount_predictions("Andrew", 30, "male", &[("RU", 0.8)]).await;

    ctx.publish("Key-1", &fixtures::andrew()).await;
    let stats = ctx.run_pipeline().await.expect("Pipeline should finish");

    assert_eq!(stats.persisted, 1);
    assert_eq!(
        ctx.sink.captured(),
        vec![EnrichedRecord {
            name: "Andrew".into(),
            surname: "Bobov".into(),
            patronymic: "Bebov".into(),
            age: 30,
            gender: "male".into(),
            nationality: "RU".into(),
        }]
    );
}

/// Records are persisted in consumption order.
#[tokio::test]
async fn test_records_persist_in_order() {
    let ctx = TestContext::new().await;
    ctx.mount_predictions("Andrew", 34, "male", &[("GB", 0.7)]).await;
    ctx.mount_predictions("Ivan", 41, "male", &[("RU", 0.9)]).await;

    ctx.publish("Key-1", &fixtures::andrew()).await;
    ctx.publish("Key-2", &fixtures::ivan()).await;
    ctx.publish("Key-3", &fixtures::andrew()).await;

    ctx.run_pipeline().await.unwrap();

    let names: Vec<_> = ctx.sink.captured().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["Andrew", "Ivan", "Andrew"]);
    assert_eq!(ctx.broker.committed(), vec![0, 1, 2]);
}

/// Malformed payloads are skipped and the next valid record still goes through.
#[tokio::test]
async fn test_malformed_payloads_are_skipped() {
    let ctx = TestContext::new().await;
    ctx.mount_predictions("Ivan", 41, "male", &[("RU", 0.9)]).await;

    for (i, payload) in fixtures::malformed_payloads().into_iter().enumerate() {
        ctx.broker.push_raw(&format!("Bad-{}", i), payload);
    }
    ctx.publish("Key-1", &fixtures::ivan()).await;

    let stats = ctx.run_pipeline().await.unwrap();

    assert_eq!(stats.malformed, fixtures::malformed_payloads().len() as u64);
    assert_eq!(stats.persisted, 1);
    assert_eq!(ctx.sink.captured()[0].name, "Ivan");
}

/// Any one failing provider drops the record; nothing partial is persisted.
#[tokio::test]
async fn test_single_provider_failure_drops_record() {
    for failing in 0..3 {
        let ctx = TestContext::new().await;
        let servers = [&ctx.age, &ctx.gender, &ctx.nationality];
        let bodies = [
            fixtures::age_body(34),
            fixtures::gender_body("male"),
            fixtures::nationality_body(&[("GB", 0.7)]),
        ];

        for (i, (server, body)) in servers.into_iter().zip(bodies).enumerate() {
            let response = if i == failing {
                ResponseTemplate::new(500)
            } else {
                ResponseTemplate::new(200).set_body_json(body)
            };
            mount(server, "Andrew", response).await;
        }

        ctx.publish("Key-1", &fixtures::andrew()).await;
        let stats = ctx.run_pipeline().await.unwrap();

        assert_eq!(stats.enrichment_failed, 1, "provider {} failing", failing);
        assert_eq!(ctx.sink.count(), 0, "provider {} failing", failing);
    }
}

/// An enrichment failure does not stop later records.
#[tokio::test]
async fn test_pipeline_continues_after_enrichment_failure() {
    let ctx = TestContext::new().await;
    // Nothing mounted for "Unknown": every provider answers 404.
    ctx.mount_predictions("Ivan", 41, "male", &[("RU", 0.9)]).await;

    ctx.publish("Key-1", &RawRecord::new("Unknown", "X", "Y")).await;
    ctx.publish("Key-2", &fixtures::ivan()).await;

    let stats = ctx.run_pipeline().await.unwrap();

    assert_eq!(stats.enrichment_failed, 1);
    assert_eq!(stats.persisted, 1);
    assert_eq!(ctx.broker.committed(), vec![0, 1]);
}

/// Undecodable provider bodies fail the record.
#[tokio::test]
async fn test_undecodable_prediction_drops_record() {
    let ctx = TestContext::new().await;
    mount(
        &ctx.age,
        "Andrew",
        ResponseTemplate::new(200).set_body_json(serde_json::json!({"age": "thirty"})),
    )
    .await;
    mount(
        &ctx.gender,
        "Andrew",
        ResponseTemplate::new(200).set_body_json(fixtures::gender_body("male")),
    )
    .await;
    mount(
        &ctx.nationality,
        "Andrew",
        ResponseTemplate::new(200).set_body_json(fixtures::nationality_body(&[])),
    )
    .await;

    ctx.publish("Key-1", &fixtures::andrew()).await;
    let stats = ctx.run_pipeline().await.unwrap();

    assert_eq!(stats.enrichment_failed, 1);
    assert_eq!(ctx.sink.count(), 0);
}

/// The persisted row is the same whatever order the providers answer in.
#[tokio::test]
async fn test_completion_order_is_irrelevant() {
    for delays in [[0, 60, 120], [120, 60, 0], [60, 120, 0]] {
        let ctx = TestContext::new().await;
        ctx.mount_predictions_delayed("Andrew", 34, "male", &[("GB", 0.7)], delays)
            .await;

        ctx.publish("Key-1", &fixtures::andrew()).await;
        ctx.run_pipeline().await.unwrap();

        let rows = ctx.sink.captured();
        assert_eq!(rows.len(), 1, "delays {:?}", delays);
        assert_eq!(rows[0].age, 34);
        assert_eq!(rows[0].gender, "male");
        assert_eq!(rows[0].nationality, "GB");
    }
}

/// Empty or all-zero nationality answers persist an empty nationality.
#[tokio::test]
async fn test_no_confident_country_persists_empty_nationality() {
    let ctx = TestContext::new().await;
    ctx.mount_predictions("Andrew", 34, "male", &[("GB", 0.0), ("RU", 0.0)])
        .await;

    ctx.publish("Key-1", &fixtures::andrew()).await;
    ctx.run_pipeline().await.unwrap();

    assert_eq!(ctx.sink.captured()[0].nationality, "");
}

/// A failing sink drops the record but the offset is still committed.
#[tokio::test]
async fn test_persist_failure_is_skipped_and_committed() {
    let ctx = TestContext::new().await;
    ctx.mount_predictions("Andrew", 34, "male", &[("GB", 0.7)]).await;
    ctx.sink.set_should_fail(true);

    ctx.publish("Key-1", &fixtures::andrew()).await;
    let stats = ctx.run_pipeline().await.unwrap();

    assert_eq!(stats.persist_failed, 1);
    assert_eq!(ctx.broker.committed(), vec![0]);
}

/// Losing the broker ends the pipeline with a fatal error.
#[tokio::test]
async fn test_broker_failure_is_fatal() {
    let ctx = TestContext::new().await;
    ctx.mount_predictions("Andrew", 34, "male", &[("GB", 0.7)]).await;
    ctx.broker.set_fail_when_drained(true);

    ctx.publish("Key-1", &fixtures::andrew()).await;
    let err = ctx.run_pipeline().await.unwrap_err();

    assert!(err.is_fatal());
    assert_eq!(ctx.sink.count(), 1);
    assert_eq!(ctx.broker.pending(), 0);
}
