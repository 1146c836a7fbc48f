//! Queue worker process.
//!
//! Pulls one job at a time from the queue and runs the full pipeline for it.
//! Run several instances against the same queue to scale out; the queue's
//! visibility timeout keeps two workers off the same message.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lectern_core::{
    load_config, validate_config, FfmpegExtractor, JobPipeline, JobQueue, RecordStore, S3Client,
    SqliteJobQueue, SqliteRecordStore, Storage, WhatlangDetector, WhisperTranscriber, Worker,
    YtDlpFetcher,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("LECTERN_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    // Create record store
    let records: Arc<dyn RecordStore> = Arc::new(
        SqliteRecordStore::new(&config.database.path).context("Failed to create record store")?,
    );
    info!("Record store initialized");

    // Create job queue
    let queue: Arc<dyn JobQueue> = Arc::new(
        SqliteJobQueue::new(
            &config.queue.path,
            Duration::from_secs(config.queue.visibility_timeout_secs as u64),
            Duration::from_secs(config.queue.wait_secs as u64),
        )
        .context("Failed to create job queue")?,
    );
    info!("Job queue initialized");

    // Create storage (remote object store when configured)
    let storage = match &config.storage.s3 {
        Some(s3_config) => {
            info!(
                "Initializing S3 storage (bucket: {}, region: {})",
                s3_config.bucket, s3_config.region
            );
            Arc::new(Storage::with_s3(
                config.worker.work_dir.clone(),
                S3Client::new(s3_config.clone()),
            ))
        }
        None => {
            info!("Using local filesystem storage");
            Arc::new(Storage::local(config.worker.work_dir.clone()))
        }
    };

    // Wire the pipeline to the real stage capabilities
    let pipeline = Arc::new(JobPipeline::new(
        records,
        storage,
        Arc::new(YtDlpFetcher::new(config.fetcher.clone())),
        Arc::new(FfmpegExtractor::new(config.extractor.clone())),
        Arc::new(WhisperTranscriber::new(config.transcriber.clone())),
        Arc::new(WhatlangDetector::new()),
        config.worker.clone(),
    ));

    let worker = Arc::new(Worker::new(queue, pipeline, config.worker.clone()));

    // Run the polling loop until a shutdown signal arrives. Stopping lets
    // the in-flight job reach its terminal state first.
    let runner = {
        let worker = Arc::clone(&worker);
        tokio::spawn(async move { worker.run().await })
    };

    shutdown_signal().await;
    info!("Shutdown signal received; stopping worker");
    worker.stop();

    runner.await.context("Worker task panicked")?;
    info!("Worker stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
