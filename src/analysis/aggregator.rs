//! Matchup aggregation.
//!
//! This module turns a day's schedule into the flat list of batter vs.
//! probable starter matchups: one task per (batting team, opposing starter),
//! one lookup chain per non-pitcher on that team's roster, all joined at the
//! end. Only the schedule fetch can fail the whole run; everything below it
//! degrades to omission.

use crate::models::{
    AggregationStats, Batter, BatterOutcome, CareerSplit, Game, HomeRunWindows, Lookup,
    MatchupRecord, Pitcher, Team,
};
use crate::statsapi::{StatsApiClient, StatsApiError};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use futures::future::join_all;
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

/// Result of one aggregation run.
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub date: NaiveDate,
    pub matchups: Vec<MatchupRecord>,
    pub stats: AggregationStats,
}

/// Everything computed for one (batting team, opposing starter) task.
#[derive(Debug, Clone)]
pub struct TeamMatchups {
    pub roster_available: bool,
    pub outcomes: Vec<BatterOutcome>,
}

impl TeamMatchups {
    fn unavailable() -> Self {
        Self {
            roster_available: false,
            outcomes: Vec::new(),
        }
    }
}

/// Current calendar date in the given time zone.
pub fn today(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Parse a `YYYY-MM-DD` schedule date.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Collect the distinct (batting team, opposing starter) tasks in schedule
/// order.
///
/// A doubleheader with the same starter in both games yields one task.
pub fn plan_tasks(games: &[Game]) -> Vec<(Team, Pitcher)> {
    let mut seen = HashSet::new();
    games
        .iter()
        .flat_map(Game::matchups)
        .filter(|(team, pitcher)| seen.insert((team.id, pitcher.id)))
        .collect()
}

/// Computes home run matchups for a day's games.
#[derive(Debug, Clone)]
pub struct MatchupAggregator {
    client: StatsApiClient,
    deadline: Duration,
}

impl MatchupAggregator {
    /// Create an aggregator.
    ///
    /// `deadline` bounds the roster and batter lookups of a single run;
    /// anything still pending when it passes is counted as unavailable.
    pub fn new(client: StatsApiClient, deadline: Duration) -> Self {
        Self { client, deadline }
    }

    pub fn client(&self) -> &StatsApiClient {
        &self.client
    }

    /// Run a full aggregation for `date`.
    ///
    /// Fails only when the schedule itself cannot be fetched.
    pub async fn run(&self, date: NaiveDate) -> Result<Aggregation, StatsApiError> {
        let games = self.client.schedule(date).await?;
        let deadline = Instant::now() + self.deadline;

        let mut stats = AggregationStats {
            games: games.len(),
            ..Default::default()
        };

        if games.is_empty() {
            info!("No games scheduled for {}", date);
            return Ok(Aggregation {
                date,
                matchups: Vec::new(),
                stats,
            });
        }

        for game in &games {
            debug!(
                "Game {}: {} at {}",
                game.game_pk, game.away.team.name, game.home.team.name
            );
        }

        let tasks = plan_tasks(&games);
        stats.tasks = tasks.len();
        info!(
            "Found {} games on {}, processing {} matchups",
            games.len(),
            date,
            tasks.len()
        );

        let results = join_all(
            tasks
                .iter()
                .map(|(team, pitcher)| self.process_team(team, pitcher, deadline)),
        )
        .await;

        let mut matchups = Vec::new();
        for result in results {
            stats.record_team(result.roster_available, &result.outcomes);
            matchups.extend(
                result
                    .outcomes
                    .into_iter()
                    .filter_map(BatterOutcome::into_record),
            );
        }

        info!("Finished {}: {}", date, stats);

        Ok(Aggregation {
            date,
            matchups,
            stats,
        })
    }

    /// Check every non-pitcher on `team` against `pitcher`.
    ///
    /// An unavailable roster yields no outcomes.
    pub async fn process_team(
        &self,
        team: &Team,
        pitcher: &Pitcher,
        deadline: Instant,
    ) -> TeamMatchups {
        let roster = match self.fetch_roster(team, deadline).await {
            Lookup::Found(roster) => roster,
            Lookup::Missing => Vec::new(),
            Lookup::Unavailable(reason) => {
                warn!("Roster for {} unavailable: {}", team.name, reason);
                return TeamMatchups::unavailable();
            }
        };

        let batters: Vec<&Batter> = roster.iter().filter(|b| !b.is_pitcher()).collect();
        debug!(
            "{}: {} batters vs {}",
            team.name,
            batters.len(),
            pitcher.full_name
        );

        let outcomes = join_all(
            batters
                .into_iter()
                .map(|batter| self.process_batter(batter, team, pitcher, deadline)),
        )
        .await;

        TeamMatchups {
            roster_available: true,
            outcomes,
        }
    }

    async fn fetch_roster(&self, team: &Team, deadline: Instant) -> Lookup<Vec<Batter>> {
        match timeout_at(deadline, self.client.roster(team.id)).await {
            Ok(Ok(roster)) if roster.is_empty() => Lookup::Missing,
            Ok(Ok(roster)) => Lookup::Found(roster),
            Ok(Err(e)) => Lookup::Unavailable(e.to_string()),
            Err(_) => Lookup::Unavailable("deadline exceeded".to_string()),
        }
    }

    /// Evaluate one batter, converting a missed deadline into `Unavailable`.
    pub async fn process_batter(
        &self,
        batter: &Batter,
        team: &Team,
        pitcher: &Pitcher,
        deadline: Instant,
    ) -> BatterOutcome {
        match timeout_at(deadline, self.evaluate_batter(batter, team, pitcher)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                debug!(
                    "Deadline passed before {} vs {} finished",
                    batter.full_name, pitcher.full_name
                );
                BatterOutcome::Unavailable("deadline exceeded".to_string())
            }
        }
    }

    async fn evaluate_batter(
        &self,
        batter: &Batter,
        team: &Team,
        pitcher: &Pitcher,
    ) -> BatterOutcome {
        let career = match self.career_split(batter, pitcher).await {
            Lookup::Found(split) => split,
            Lookup::Missing => return BatterOutcome::NoHistory,
            Lookup::Unavailable(reason) => return BatterOutcome::Unavailable(reason),
        };

        if career.home_runs == 0 {
            return BatterOutcome::NoHomeRuns;
        }

        info!(
            "Found matchup: {} vs {} ({} career HR)",
            batter.full_name, pitcher.full_name, career.home_runs
        );

        let log = match self.client.game_log(batter.person_id).await {
            Ok(log) => log,
            Err(e) => {
                warn!("Game log for {} unavailable: {}", batter.full_name, e);
                return BatterOutcome::Unavailable(e.to_string());
            }
        };

        let windows = HomeRunWindows::from_game_log(&log);
        BatterOutcome::Matchup(MatchupRecord::new(batter, team, pitcher, career, windows))
    }

    async fn career_split(&self, batter: &Batter, pitcher: &Pitcher) -> Lookup<CareerSplit> {
        match self
            .client
            .career_vs_pitcher(batter.person_id, pitcher.id)
            .await
        {
            Ok(Some(split)) => Lookup::Found(split),
            Ok(None) => Lookup::Missing,
            Err(e) => {
                debug!(
                    "Career split {} vs {} unavailable: {}",
                    batter.full_name, pitcher.full_name, e
                );
                Lookup::Unavailable(e.to_string())
            }
        }
    }
}
