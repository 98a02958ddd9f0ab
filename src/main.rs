//! Name Enrichment Pipeline
//!
//! Consumes name records from Redpanda, predicts age, gender and
//! nationality for each name, and persists the enriched rows to PostgreSQL.
//! A periodic worker mirrors persisted names into an in-process cache.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};

use api::{router, AppState};
use name_enricher::{load_settings, Settings};
use redpanda::Consumer;
use store::{health::check_connection, schema::init_schema, Store};
use telemetry::{health, init_tracing_from_env};
use worker::{
    join_pipeline, Enricher, MokaCacheMirror, NameMirrorWorker, RecordPipeline, WorkerScheduler,
};

#[tokio::main]
async fn main() -> Result<()> {
    // rustls 0.23+ requires explicit crypto provider selection
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting Name Enricher v{}", env!("CARGO_PKG_VERSION"));

    let settings = load_settings()?;

    info!(
        brokers = %settings.redpanda.broker_string(),
        topic = %settings.redpanda.topic,
        group_id = %settings.redpanda.group_id,
        "Loaded Redpanda config"
    );

    let store = Arc::new(
        Store::connect(settings.store.clone())
            .await
            .context("Failed to connect to PostgreSQL")?,
    );
    init_schema(&store)
        .await
        .context("Failed to initialize PostgreSQL schema")?;

    check_health(&settings, &store).await;

    let consumer = Arc::new(Consumer::new(settings.redpanda.clone(), store.clone()));

    let enricher = Arc::new(
        Enricher::from_config(settings.predictor.clone())
            .context("Failed to create predictor client")?,
    );

    let pipeline = Arc::new(RecordPipeline::new(
        consumer.clone(),
        enricher,
        store.clone(),
    ));

    let cache = MokaCacheMirror::new(settings.worker.cache_capacity);
    let mirror = Arc::new(NameMirrorWorker::new(store.clone(), Arc::new(cache.clone())));

    let scheduler = Arc::new(WorkerScheduler::new(
        settings.worker.clone(),
        pipeline,
        mirror,
    ));
    let mut handles = scheduler.clone().start();

    let app = router(AppState::new(cache));

    let addr: SocketAddr = settings
        .bind_address()
        .parse()
        .context("Invalid server address")?;

    info!("Health server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    });

    // Whichever ends first: the pipeline (source closed or fatal error) or
    // the server (shutdown signal).
    let finished = tokio::select! {
        joined = &mut handles.pipeline => Some(joined),
        served = server => {
            if let Ok(Err(e)) = served {
                error!("Server error: {}", e);
            }
            None
        }
    };

    info!("Shutting down...");

    consumer.close();
    handles.mirror.abort();

    // Let the pipeline drain what it already fetched before the last mirror pass.
    let pipeline_result = match finished {
        Some(joined) => Some(joined),
        None => join_pipeline(handles.pipeline, settings.worker.shutdown_timeout()).await,
    };

    scheduler.mirror_once().await;

    match pipeline_result {
        Some(Ok(Ok(stats))) => {
            info!(
                persisted = stats.persisted,
                malformed = stats.malformed,
                enrichment_failed = stats.enrichment_failed,
                persist_failed = stats.persist_failed,
                "Pipeline finished"
            );
        }
        Some(Ok(Err(e))) => {
            return Err(e).context("Record pipeline stopped on a fatal error");
        }
        Some(Err(e)) => {
            return Err(e).context("Record pipeline task panicked");
        }
        None => {}
    }

    info!(
        committed_offset = consumer.committed_offset(),
        fetch_offset = consumer.fetch_offset(),
        "Shutdown complete"
    );
    Ok(())
}

/// Check component health on startup.
async fn check_health(settings: &Settings, store: &Store) {
    let redpanda_healthy = redpanda::health::check_connection(&settings.redpanda).await;
    if redpanda_healthy {
        health().redpanda.set_healthy();
        info!("Redpanda connection: healthy");
    } else {
        health().redpanda.set_unhealthy("Connection failed");
        warn!("Redpanda connection: unhealthy");
    }

    if check_connection(store).await {
        health().postgres.set_healthy();
        info!("PostgreSQL connection: healthy");
    } else {
        health().postgres.set_unhealthy("Connection failed");
        error!("PostgreSQL connection: unhealthy");
    }
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
