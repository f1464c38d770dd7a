//! HTTP client for the MLB Stats API.
//!
//! Every request goes through a shared semaphore so that the number of
//! in-flight upstream calls stays bounded no matter how wide the fan-out
//! above it is.

use crate::models::{Batter, CareerSplit, Game, GameLogEntry};
use crate::statsapi::error::{Result, StatsApiError};
use crate::statsapi::parse;
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::debug;

/// Public MLB Stats API base URL.
pub const STATSAPI_URL: &str = "https://statsapi.mlb.com/api/v1";

/// Configuration for the Stats API client.
#[derive(Debug, Clone)]
pub struct StatsApiConfig {
    /// Base URL, without a trailing slash.
    pub base_url: String,
    /// Sport id passed to the schedule endpoint (1 = MLB).
    pub sport_id: u32,
    /// Number of games requested from the game log endpoint.
    pub game_log_limit: usize,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Maximum concurrent requests.
    pub max_in_flight: usize,
    pub user_agent: String,
}

impl Default for StatsApiConfig {
    fn default() -> Self {
        Self {
            base_url: STATSAPI_URL.to_string(),
            sport_id: 1,
            game_log_limit: 20,
            timeout_seconds: 10,
            max_in_flight: 8,
            user_agent: format!("hrmatchups/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Client for the handful of Stats API endpoints we need.
#[derive(Debug, Clone)]
pub struct StatsApiClient {
    config: StatsApiConfig,
    http_client: reqwest::Client,
    permits: Arc<Semaphore>,
}

impl StatsApiClient {
    /// Create a new client.
    pub fn new(config: StatsApiConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()?;

        let permits = Arc::new(Semaphore::new(config.max_in_flight.max(1)));

        Ok(Self {
            config,
            http_client,
            permits,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Fetch all games scheduled on `date`.
    pub async fn schedule(&self, date: NaiveDate) -> Result<Vec<Game>> {
        let url = format!("{}/schedule/games/", self.config.base_url);
        let query = [
            ("sportId", self.config.sport_id.to_string()),
            ("date", date.format("%Y-%m-%d").to_string()),
        ];
        let body = self.get_json(&url, &query).await?;
        parse::parse_schedule(&body)
    }

    /// Fetch the active roster of a team.
    pub async fn roster(&self, team_id: u64) -> Result<Vec<Batter>> {
        let url = format!("{}/teams/{}/roster", self.config.base_url, team_id);
        let body = self.get_json(&url, &[]).await?;
        parse::parse_roster(&body)
    }

    /// Fetch a batter's career hitting split against one pitcher.
    ///
    /// `Ok(None)` means the batter has never faced the pitcher.
    pub async fn career_vs_pitcher(
        &self,
        batter_id: u64,
        pitcher_id: u64,
    ) -> Result<Option<CareerSplit>> {
        let url = format!("{}/people/{}/stats", self.config.base_url, batter_id);
        let query = [
            ("stats", "vsPlayer".to_string()),
            ("group", "hitting".to_string()),
            ("opposingPlayerId", pitcher_id.to_string()),
        ];
        let body = self.get_json(&url, &query).await?;
        Ok(parse::parse_career_split(&body))
    }

    /// Fetch a batter's most recent hitting game log, newest first.
    pub async fn game_log(&self, batter_id: u64) -> Result<Vec<GameLogEntry>> {
        let url = format!("{}/people/{}/stats", self.config.base_url, batter_id);
        let query = [
            ("stats", "gameLog".to_string()),
            ("limit", self.config.game_log_limit.to_string()),
            ("group", "hitting".to_string()),
        ];
        let body = self.get_json(&url, &query).await?;
        Ok(parse::parse_game_log(&body))
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| StatsApiError::Network {
                url: url.to_string(),
                message: format!("request limiter closed: {}", e),
            })?;

        debug!("GET {} {:?}", url, query);

        let response = self
            .http_client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StatsApiError::Timeout {
                        url: url.to_string(),
                        seconds: self.config.timeout_seconds,
                    }
                } else {
                    StatsApiError::Network {
                        url: url.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        if !response.status().is_success() {
            return Err(StatsApiError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| StatsApiError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })
    }
}
