//! HTTP handlers for the matchup endpoint and health probe.

use crate::analysis::{parse_date, today, MatchupAggregator};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// Shared state for all handlers.
#[derive(Debug)]
pub struct AppState {
    pub aggregator: MatchupAggregator,
    pub timezone: Tz,
    pub cache_max_age_seconds: u64,
}

impl AppState {
    fn cache_control(&self) -> String {
        format!(
            "s-maxage={}, stale-while-revalidate",
            self.cache_max_age_seconds
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct MatchupQuery {
    pub date: Option<String>,
}

/// Error payload returned on 4xx/5xx.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

fn error_response(status: StatusCode, error: &str, details: String) -> Response {
    (
        status,
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(ErrorBody {
            error: error.to_string(),
            details,
        }),
    )
        .into_response()
}

/// Computes today's matchups (or those of `?date=`).
///
/// Always 200 with the full list unless the schedule cannot be fetched.
pub async fn get_matchups(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MatchupQuery>,
) -> Response {
    let date = match query.date.as_deref() {
        Some(raw) => match parse_date(raw) {
            Ok(date) => date,
            Err(message) => {
                return error_response(StatusCode::BAD_REQUEST, "Invalid date", message)
            }
        },
        None => today(state.timezone),
    };

    match state.aggregator.run(date).await {
        Ok(aggregation) => (
            StatusCode::OK,
            [
                (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*".to_string()),
                (header::CACHE_CONTROL, state.cache_control()),
            ],
            Json(aggregation.matchups),
        )
            .into_response(),
        Err(e) => {
            error!("Matchup aggregation for {} failed: {}", date, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch MLB data",
                e.to_string(),
            )
        }
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
