use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storydeck_api::config::ServerConfig;
use storydeck_api::router::build_app_router;
use storydeck_api::state::AppState;
use storydeck_cache::{Cache, MemoryCache, RedisCache};
use storydeck_content::pg::{PgCategoryStore, PgChapterStore, PgPreferenceStore, PgStoryStore};
use storydeck_content::{
    CategoryService, ChapterService, ContentConfig, PreferenceService, StoryService,
};
use storydeck_storage::{MemoryObjectStore, ObjectStore, S3ObjectStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storydeck_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let content_config = ContentConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = storydeck_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    storydeck_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    storydeck_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Cache ---
    let cache: Arc<dyn Cache> = match std::env::var("REDIS_URL") {
        Ok(url) => {
            let redis = RedisCache::connect(&url)
                .await
                .expect("Failed to connect to Redis");
            tracing::info!("Redis cache connected");
            Arc::new(redis)
        }
        Err(_) => {
            tracing::warn!("REDIS_URL not set, using in-process cache");
            Arc::new(MemoryCache::new())
        }
    };

    // --- Blob storage ---
    let blobs: Arc<dyn ObjectStore> = match std::env::var("BLOB_PUBLIC_BASE_URL") {
        Ok(base_url) => {
            let s3 = S3ObjectStore::from_env(base_url).await;
            tracing::info!("S3 object storage configured");
            Arc::new(s3)
        }
        Err(_) => {
            tracing::warn!("BLOB_PUBLIC_BASE_URL not set, using in-process object store");
            Arc::new(MemoryObjectStore::new())
        }
    };

    // --- Services ---
    let category_store = Arc::new(PgCategoryStore::new(pool.clone()));
    let story_store = Arc::new(PgStoryStore::new(pool.clone()));
    let chapter_store = Arc::new(PgChapterStore::new(pool.clone()));
    let preference_store = Arc::new(PgPreferenceStore::new(pool.clone()));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        categories: Arc::new(CategoryService::new(
            category_store.clone(),
            cache.clone(),
            blobs.clone(),
            content_config.clone(),
        )),
        stories: Arc::new(StoryService::new(
            story_store.clone(),
            category_store.clone(),
            cache.clone(),
            blobs.clone(),
            content_config.clone(),
        )),
        chapters: Arc::new(ChapterService::new(
            chapter_store,
            story_store,
            blobs,
            content_config.clone(),
        )),
        preferences: Arc::new(PreferenceService::new(
            preference_store,
            category_store,
            content_config,
        )),
    };

    // --- Router ---
    let app = build_app_router(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
