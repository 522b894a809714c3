pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod routes;
pub mod store;
pub mod visitor;

pub const STATIC_HASH: &str = env!("STATIC_HASH");

use axum::http::{HeaderValue, header};
use axum::{Router, routing::get};
use sqlx::SqlitePool;
use time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tower_sessions::{Expiry, SessionManagerLayer, cookie::SameSite};
use tower_sessions_sqlx_store::SqliteStore;
use tracing::Level;

use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}

async fn health() -> &'static str {
    "ok"
}

/// Build the full Axum application router.
///
/// Caller is responsible for running database migrations on `pool` beforehand.
/// This function sets up the session store (and migrates its table), then
/// assembles all route modules, middleware, and state.
pub async fn build_app(pool: SqlitePool, secure_cookies: bool) -> Result<Router, sqlx::Error> {
    build_app_with_store(Store::new(pool), secure_cookies).await
}

/// Same as [`build_app`], serving an existing [`Store`] so the caller shares
/// its writer lock with the handlers.
pub async fn build_app_with_store(store: Store, secure_cookies: bool) -> Result<Router, sqlx::Error> {
    let session_store = SqliteStore::new(store.pool().clone());
    session_store.migrate().await?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_expiry(Expiry::OnInactivity(Duration::days(7)))
        .with_secure(secure_cookies)
        .with_http_only(true)
        .with_same_site(SameSite::Lax);

    let state = AppState { store };

    let router = Router::new()
        .route("/health", get(health))
        .merge(routes::catalog::router())
        .merge(routes::admin::router())
        .merge(routes::export::router())
        .nest_service(
            "/static",
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("public, max-age=86400"),
                ))
                .service(ServeDir::new("static")),
        )
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state);

    Ok(router)
}
