//! PostgreSQL persistence tests.
//!
//! Require Docker (or `ENRICHER_TEST_DATABASE_URL`); run with
//! `cargo test -p integration-tests --test store_postgres -- --ignored`.

use enricher_core::{EnrichedRecord, Error, RawRecord};
use integration_tests::{containers::TestPostgres, fixtures, setup::TestContext};
use redpanda::{OffsetKey, OffsetStore};
use std::sync::Arc;
use store::{query::count_records, PersistenceSink, Store, StoreConfig, StoredNames};
use worker::RecordPipeline;

fn enriched(raw: RawRecord, age: i32, gender: &str, nationality: &str) -> EnrichedRecord {
    EnrichedRecord::new(raw, age, gender.into(), nationality.into())
}

#[tokio::test]
#[ignore]
async fn test_insert_and_read_back() {
    let pg = TestPostgres::start().await;
    let store = pg.store().await;

    store
        .insert(&enriched(fixtures::andrew(), 34, "male", "GB"))
        .await
        .unwrap();
    store
        .insert(&enriched(fixtures::ivan(), 41, "male", "RU"))
        .await
        .unwrap();

    assert_eq!(count_records(&store).await.unwrap(), 2);

    let row: (String, String, String, i32, String, String) = sqlx::query_as(
        "SELECT name, surname, patronymic, age, gender, national FROM fiofull WHERE id = 1",
    )
    .fetch_one(store.pool())
    .await
    .unwrap();
    assert_eq!(
        row,
        (
            "Andrew".into(),
            "Bobov".into(),
            "Bebov".into(),
            34,
            "male".into(),
            "GB".into()
        )
    );
}

#[tokio::test]
#[ignore]
async fn test_stored_names_in_primary_key_order() {
    let pg = TestPostgres::start().await;
    let store = pg.store().await;

    store
        .insert(&enriched(fixtures::ivan(), 41, "male", "RU"))
        .await
        .unwrap();
    store
        .insert(&enriched(fixtures::andrew(), 34, "male", "GB"))
        .await
        .unwrap();

    let names = store.stored_names().await.unwrap();
    let pairs: Vec<_> = names.into_iter().map(|n| (n.id, n.name)).collect();
    assert_eq!(pairs, vec![(1, "Ivan".to_string()), (2, "Andrew".to_string())]);
}

#[tokio::test]
#[ignore]
async fn test_oversized_name_is_constraint_error() {
    let pg = TestPostgres::start().await;
    let store = pg.store().await;

    let long_name = "A".repeat(31);
    let err = store
        .insert(&enriched(RawRecord::new(long_name, "B", "C"), 1, "male", "GB"))
        .await
        .unwrap_err();

    match err {
        Error::Constraint { ref code, .. } => assert_eq!(code, "22001"),
        other => panic!("expected constraint error, got {:?}", other),
    }
    assert_eq!(count_records(&store).await.unwrap(), 0);
}

fn offset_key(group_id: &str) -> OffsetKey {
    OffsetKey {
        group_id: group_id.into(),
        topic: "FIO".into(),
        partition: 0,
    }
}

/// Committed offsets survive a reconnect and stay separate per group.
#[tokio::test]
#[ignore]
async fn test_committed_offsets_survive_reconnect() {
    let pg = TestPostgres::start().await;
    let store = pg.store().await;
    let enricher = offset_key("enricher");
    let audit = offset_key("audit");

    assert_eq!(store.load_offset(&enricher).await.unwrap(), None);

    store.save_offset(&enricher, 5).await.unwrap();
    store.save_offset(&enricher, 12).await.unwrap();
    store.save_offset(&audit, 3).await.unwrap();
    // Late saves from an older position are ignored
    store.save_offset(&enricher, 7).await.unwrap();

    let reconnected = Store::connect(StoreConfig {
        url: pg.url.clone(),
        ..StoreConfig::default()
    })
    .await
    .unwrap();
    assert_eq!(reconnected.load_offset(&enricher).await.unwrap(), Some(12));
    assert_eq!(reconnected.load_offset(&audit).await.unwrap(), Some(3));
}

/// Pipeline into the real table, then mirror the table into the cache.
#[tokio::test]
#[ignore]
async fn test_pipeline_to_postgres_to_cache() {
    let pg = TestPostgres::start().await;
    let store = Arc::new(pg.store().await);
    let ctx = TestContext::new().await;
    ctx.mount_predictions("Andrew", 34, "male", &[("GB", 0.7)]).await;
    ctx.mount_predictions("Ivan", 41, "male", &[("RU", 0.9)]).await;
    let long_name = "A".repeat(31);
    ctx.mount_predictions(&long_name, 1, "male", &[("GB", 0.5)]).await;

    ctx.publish("Key-1", &fixtures::andrew()).await;
    ctx.publish("Key-2", &RawRecord::new(long_name, "B", "C")).await;
    ctx.publish("Key-3", &fixtures::ivan()).await;

    let pipeline = RecordPipeline::new(ctx.broker.clone(), ctx.enricher(), store.clone());
    let stats = pipeline.run().await.unwrap();

    assert_eq!(stats.persisted, 2);
    assert_eq!(stats.persist_failed, 1);
    assert_eq!(count_records(&store).await.unwrap(), 2);

    let report = ctx.mirror_worker(store.clone()).run().await.unwrap();
    assert_eq!(report.mirrored, 2);
    assert_eq!(ctx.cache.get("FIOFull:1").await.as_deref(), Some("Andrew"));
    assert_eq!(ctx.cache.get("FIOFull:2").await.as_deref(), Some("Ivan"));
}
