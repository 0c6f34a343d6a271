use std::future::Future;
use std::sync::Arc;

use axum::Router;
use configs::{AppConfig, StoreBackend, StoreConfig};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use service::posts::{PostService, PostServiceConfig};
use service::storage::{InMemoryPostStore, PostStore, ShardedPostStore};

use crate::errors::StartupError;
use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Pick the store implementation named by `[store] backend`.
pub fn build_store(cfg: &StoreConfig) -> Result<Arc<dyn PostStore>, StartupError> {
    cfg.validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let store: Arc<dyn PostStore> = match (cfg.backend, cfg.shard_amount) {
        (StoreBackend::Memory, _) => Arc::new(InMemoryPostStore::new()),
        (StoreBackend::Sharded, None) => Arc::new(ShardedPostStore::new()),
        (StoreBackend::Sharded, Some(n)) => Arc::new(ShardedPostStore::with_shard_amount(n)),
    };
    Ok(store)
}

pub fn build_state(cfg: &AppConfig) -> Result<AppState, StartupError> {
    let store = build_store(&cfg.store)?;
    let posts = PostService::new(
        store,
        PostServiceConfig { create_id_attempts: cfg.store.create_id_attempts },
    );
    Ok(AppState::new(posts))
}

pub fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    Ok(routes::build_router(build_state(cfg)?, build_cors()))
}

fn log_banner(addr: &str, cfg: &AppConfig) {
    info!(%addr, backend = ?cfg.store.backend, "blog store server listening");
    info!("available methods:");
    for (method, path, op) in [
        ("POST", "/v1/posts", "CreatePost"),
        ("GET", "/v1/posts/:id", "GetPost"),
        ("PATCH", "/v1/posts/:id", "UpdatePost"),
        ("DELETE", "/v1/posts/:id", "DeletePost"),
        ("GET", "/health", "Health"),
        ("GET", "/stats", "Stats"),
        ("GET", "/metrics", "Metrics"),
    ] {
        info!("  {method:<6} {path:<16} {op}");
    }
}

/// Serve `app` on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<(), StartupError>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

/// Public entry: build the app, bind and serve until a shutdown signal arrives.
pub async fn run(cfg: AppConfig) -> Result<(), StartupError> {
    let app = build_app(&cfg)?;
    let addr = cfg.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Bind { addr: addr.clone(), source })?;
    log_banner(&addr, &cfg);

    serve(listener, app, shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}
