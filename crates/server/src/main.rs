use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use matchgrid_core::{
    build_evaluator, create_deleter, load_config, validate_config, BackendService,
    FrontendService, MatchFunctionHost, PairMatchFunction, QueryService, RedisStateStore,
    StateStore, Synchronizer,
};

use matchgrid_server::{create_router, AppState};

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
    let config_path = std::env::var("MATCHGRID_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;
    info!("Configuration loaded successfully");

    // Connect the state store (two pools: data + health)
    let store: Arc<dyn StateStore> = Arc::new(
        RedisStateStore::connect(config.redis.clone()).context("Failed to connect to redis")?,
    );

    // Build the evaluator client; a misconfigured transport is fatal here
    // rather than at the first window.
    let evaluator =
        build_evaluator(&config.evaluator).context("Failed to build evaluator client")?;

    // Deferred-delete worker
    let (deleter_handle, deleter) =
        create_deleter(Arc::clone(&store), config.frontend.delete_queue_size);
    let deleter_task = tokio::spawn(deleter.run());

    // Core services
    let query = Arc::new(QueryService::new(Arc::clone(&store), config.query.clone()));
    let host = Arc::new(MatchFunctionHost::new(
        Arc::clone(&query),
        config.match_function.clone(),
    ));
    let synchronizer = Arc::new(Synchronizer::new(
        Arc::clone(&store),
        evaluator,
        config.synchronizer.clone(),
    ));
    let frontend = FrontendService::new(Arc::clone(&store), deleter_handle);
    let backend = BackendService::new(host, Arc::clone(&synchronizer), Arc::clone(&store))
        .with_function(Arc::new(PairMatchFunction::new()));

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        store,
        frontend,
        backend,
        query,
        Arc::clone(&synchronizer),
    ));

    // Create router
    let app = create_router(Arc::clone(&state));

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Refuse new windows, then drain the delete queue: dropping the last
    // AppState reference drops the deleter handle, which lets the worker
    // finish whatever is queued and exit.
    state.synchronizer().shutdown();
    drop(state);
    deleter_task.await.ok();

    info!("matchgrid stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        error!("Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}
