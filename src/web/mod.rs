mod error;
mod extractors;
mod handlers;
mod routes;
pub mod security;
mod state;

pub use state::AppState;

use crate::services::auth;
use crate::{Config, Database};
use anyhow::Result;
use axum::middleware;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub async fn serve(config: Config, db: Database, addr: &str) -> Result<()> {
    if let Err(e) = auth::cleanup_expired_sessions(&db) {
        tracing::warn!("Could not clean up expired sessions: {}", e);
    }

    let state = Arc::new(AppState::new(config, db)?);

    let app = Router::new()
        .merge(routes::public_routes())
        .merge(routes::admin_routes())
        .fallback(handlers::public::not_found)
        .layer(middleware::from_fn(security::apply_security_headers))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
