use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lectern_core::{
    create_llm_client, load_config, validate_config, JobQueue, LibreTranslateClient, RecordStore,
    S3Client, SqliteJobQueue, SqliteRecordStore, Storage, StudyContentGenerator,
    TranscriptTranslator, TranslationProvider,
};

use lectern_server::api::create_router;
use lectern_server::state::AppState;

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
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("LECTERN_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);

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

    // Create translator if configured
    let translator = match &config.translator {
        Some(translator_config) => {
            info!("Initializing translator at {}", translator_config.url);
            let provider: Arc<dyn TranslationProvider> =
                Arc::new(LibreTranslateClient::new(translator_config.clone()));
            Some(Arc::new(TranscriptTranslator::new(
                provider,
                translator_config.max_chunk_chars,
            )))
        }
        None => {
            info!("No translator configured");
            None
        }
    };

    // Create study content generator if configured
    let generator = match &config.generator {
        Some(generator_config) => {
            let llm = create_llm_client(generator_config)
                .context("Failed to create LLM client")?;
            info!(
                "Initializing study content generator ({} / {})",
                llm.provider(),
                llm.model()
            );
            Some(Arc::new(StudyContentGenerator::new(llm)))
        }
        None => {
            info!("No study content generator configured");
            None
        }
    };

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        records,
        storage,
        queue,
        translator,
        generator,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
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
