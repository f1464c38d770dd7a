//! HTTP server exposing the matchup endpoint.

pub mod handlers;

use crate::analysis::MatchupAggregator;
use anyhow::{Context, Result};
use axum::{routing::get, Router};
use chrono_tz::Tz;
use handlers::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(aggregator: MatchupAggregator, timezone: Tz, cache_max_age_seconds: u64) -> Self {
        Self {
            state: Arc::new(AppState {
                aggregator,
                timezone,
                cache_max_age_seconds,
            }),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(handlers::get_matchups))
            .route("/api/get-stats", get(handlers::get_matchups))
            .route("/health", get(handlers::health))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Starts the server on `addr` and serves until the process stops.
    pub async fn serve(self, addr: &str) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        info!("Listening on http://{}", addr);

        axum::serve(listener, self.router())
            .await
            .context("HTTP server error")?;

        Ok(())
    }
}
