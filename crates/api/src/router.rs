//! Router assembly and middleware stack.
//!
//! `build_app_router` is shared by the binary entrypoint and integration
//! tests so both exercise the same middleware.

use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::extract::USER_ID_HEADER;
use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /categories                    list, create
/// /categories/{id}               get, update, delete
/// /search/categories             search by name
///
/// /stories                       list (paginated, sorted), create
/// /stories/{id}                  get detail, update, delete
/// /stories/{id}/slides           append slide
/// /stories/{id}/chapters         create chapter under a story
/// /search/stories                search by title/description
///
/// /chapters/{id}                 get detail, delete
/// /chapters/{id}/slides          append slide
///
/// /preferences                   replace saved choices
/// ```
fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(handlers::category::list).post(handlers::category::create),
        )
        .route(
            "/categories/{id}",
            get(handlers::category::get)
                .put(handlers::category::update)
                .delete(handlers::category::delete),
        )
        .route("/search/categories", get(handlers::category::search))
        .route(
            "/stories",
            get(handlers::story::list).post(handlers::story::create),
        )
        .route(
            "/stories/{id}",
            get(handlers::story::get)
                .put(handlers::story::update)
                .delete(handlers::story::delete),
        )
        .route("/stories/{id}/slides", post(handlers::story::add_slide))
        .route("/stories/{id}/chapters", post(handlers::chapter::create))
        .route("/search/stories", get(handlers::story::search))
        .route(
            "/chapters/{id}",
            get(handlers::chapter::get).delete(handlers::chapter::delete),
        )
        .route("/chapters/{id}/slides", post(handlers::chapter::add_slide))
        .route("/preferences", post(handlers::preference::save))
}

/// Assemble the full application router with its middleware stack.
pub fn build_app_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config);
    let request_timeout = Duration::from_secs(state.config.request_timeout_secs);
    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        // Health check at root level (not under /api/v1).
        .merge(handlers::health::router())
        // API v1 routes.
        .nest("/api/v1", api_routes())
        // -- Middleware stack (applied bottom-up) --
        // Panic recovery: catch panics and return 500 JSON.
        .layer(CatchPanicLayer::new())
        // Request timeout.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        // Propagate request ID to response.
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        // Structured request/response tracing.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Set request ID on incoming requests.
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        // CORS.
        .layer(cors)
        // Shared state.
        .with_state(state)
}

/// Build the CORS middleware layer from server configuration.
///
/// Panics at startup if any configured origin is invalid, which is the
/// desired behaviour -- we want misconfiguration to fail fast.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(USER_ID_HEADER)])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
