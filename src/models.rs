//! Data models for the matchup finder.
//!
//! This module contains the core data structures used throughout the
//! application: the entities pulled out of MLB Stats API responses, the
//! explicit lookup result types, and the matchup records we emit.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Roster position code the Stats API uses for pitchers.
pub const PITCHER_POSITION_CODE: &str = "1";

/// Number of recent games considered for trailing windows.
pub const GAME_LOG_WINDOW: usize = 20;

/// A club taking part in a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: u64,
    pub name: String,
}

/// The probable starter for one side of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pitcher {
    pub id: u64,
    #[serde(rename = "fullName")]
    pub full_name: String,
}

/// One side (home or away) of a scheduled game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSide {
    pub team: Team,
    pub probable_pitcher: Option<Pitcher>,
}

/// A scheduled game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub game_pk: u64,
    pub away: GameSide,
    pub home: GameSide,
}

impl Game {
    /// Returns the (batting team, opposing pitcher) pairs for this game.
    ///
    /// Away batters face the home starter and home batters face the away
    /// starter. Sides without an announced starter are skipped.
    pub fn matchups(&self) -> Vec<(Team, Pitcher)> {
        let mut pairs = Vec::with_capacity(2);
        if let Some(ref pitcher) = self.home.probable_pitcher {
            pairs.push((self.away.team.clone(), pitcher.clone()));
        }
        if let Some(ref pitcher) = self.away.probable_pitcher {
            pairs.push((self.home.team.clone(), pitcher.clone()));
        }
        pairs
    }
}

/// A roster entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batter {
    pub person_id: u64,
    pub full_name: String,
    pub position_code: String,
}

impl Batter {
    /// Whether the roster entry is listed as a pitcher.
    ///
    /// Two-way players carry their own code and still bat.
    pub fn is_pitcher(&self) -> bool {
        self.position_code == PITCHER_POSITION_CODE
    }
}

/// Career batting line of one batter against one pitcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CareerSplit {
    pub home_runs: u32,
}

/// One game from a batter's hitting log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLogEntry {
    pub date: Option<NaiveDate>,
    pub home_runs: u32,
}

/// Home run totals over the most recent 5, 10 and 20 games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HomeRunWindows {
    pub last5: u32,
    pub last10: u32,
    pub last20: u32,
}

impl HomeRunWindows {
    /// Sums home runs over the leading prefixes of a newest-first game log.
    ///
    /// Entries beyond the twentieth are ignored. Each window includes every
    /// narrower one, so `last5 <= last10 <= last20` always holds.
    pub fn from_game_log(entries: &[GameLogEntry]) -> Self {
        let mut windows = Self::default();
        for (i, entry) in entries.iter().take(GAME_LOG_WINDOW).enumerate() {
            if i < 5 {
                windows.last5 += entry.home_runs;
            }
            if i < 10 {
                windows.last10 += entry.home_runs;
            }
            windows.last20 += entry.home_runs;
        }
        windows
    }
}

/// Output unit: one batter with career home runs against today's opposing
/// starter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchupRecord {
    #[serde(rename = "playerName")]
    pub player_name: String,
    #[serde(rename = "playerId")]
    pub player_id: u64,
    pub team: String,
    #[serde(rename = "vsPitcher")]
    pub vs_pitcher: String,
    #[serde(rename = "careerHRs")]
    pub career_hrs: u32,
    pub last5: u32,
    pub last10: u32,
    pub last20: u32,
}

impl MatchupRecord {
    pub fn new(
        batter: &Batter,
        team: &Team,
        pitcher: &Pitcher,
        career: CareerSplit,
        windows: HomeRunWindows,
    ) -> Self {
        Self {
            player_name: batter.full_name.clone(),
            player_id: batter.person_id,
            team: team.name.clone(),
            vs_pitcher: pitcher.full_name.clone(),
            career_hrs: career.home_runs,
            last5: windows.last5,
            last10: windows.last10,
            last20: windows.last20,
        }
    }
}

/// Result of a recoverable upstream lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The upstream answered with usable data.
    Found(T),
    /// The upstream answered but holds nothing for this query.
    Missing,
    /// The request failed, timed out, or returned something unreadable.
    Unavailable(String),
}

/// What happened when a single batter was checked against a pitcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatterOutcome {
    Matchup(MatchupRecord),
    /// Career split exists but shows no home runs.
    NoHomeRuns,
    /// The batter has never faced the pitcher.
    NoHistory,
    Unavailable(String),
}

impl BatterOutcome {
    pub fn into_record(self) -> Option<MatchupRecord> {
        match self {
            BatterOutcome::Matchup(record) => Some(record),
            _ => None,
        }
    }
}

/// Counters describing one aggregation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationStats {
    /// Games on the schedule.
    pub games: usize,
    /// Distinct (batting team, opposing pitcher) tasks.
    pub tasks: usize,
    /// Rosters that could not be fetched.
    pub rosters_unavailable: usize,
    /// Non-pitchers looked up against a starter.
    pub batters_checked: usize,
    /// Batter lookups that failed or timed out.
    pub batters_unavailable: usize,
    /// Records emitted.
    pub matchups: usize,
}

impl AggregationStats {
    /// Folds one team's outcomes into the counters.
    pub fn record_team(&mut self, roster_available: bool, outcomes: &[BatterOutcome]) {
        if !roster_available {
            self.rosters_unavailable += 1;
        }
        self.batters_checked += outcomes.len();
        for outcome in outcomes {
            match outcome {
                BatterOutcome::Matchup(_) => self.matchups += 1,
                BatterOutcome::Unavailable(_) => self.batters_unavailable += 1,
                BatterOutcome::NoHomeRuns | BatterOutcome::NoHistory => {}
            }
        }
    }
}

impl fmt::Display for AggregationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} games, {} tasks, {} batters checked, {} matchups ({} rosters and {} batters unavailable)",
            self.games,
            self.tasks,
            self.batters_checked,
            self.matchups,
            self.rosters_unavailable,
            self.batters_unavailable
        )
    }
}

/// Metadata about a one-shot report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Schedule date the matchups were computed for.
    pub date: NaiveDate,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Stats API base URL used.
    pub api_url: String,
    pub stats: AggregationStats,
    /// Duration of the aggregation in seconds.
    pub duration_seconds: f64,
}

/// A complete one-shot report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchupReport {
    pub metadata: ReportMetadata,
    pub matchups: Vec<MatchupRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(hrs: &[u32]) -> Vec<GameLogEntry> {
        hrs.iter()
            .map(|&home_runs| GameLogEntry {
                date: None,
                home_runs,
            })
            .collect()
    }

    fn team(id: u64, name: &str) -> Team {
        Team {
            id,
            name: name.to_string(),
        }
    }

    fn pitcher(id: u64, name: &str) -> Pitcher {
        Pitcher {
            id,
            full_name: name.to_string(),
        }
    }

    #[test]
    fn test_windows_prefix_sums() {
        let entries = log(&[1, 0, 0, 0, 0, 1, 0, 2, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1]);
        let windows = HomeRunWindows::from_game_log(&entries);
        assert_eq!(windows.last5, 1);
        assert_eq!(windows.last10, 4);
        assert_eq!(windows.last20, 6);
    }

    #[test]
    fn test_windows_short_log() {
        let windows = HomeRunWindows::from_game_log(&log(&[0, 2, 1]));
        assert_eq!(
            windows,
            HomeRunWindows {
                last5: 3,
                last10: 3,
                last20: 3
            }
        );
        assert_eq!(HomeRunWindows::from_game_log(&[]), HomeRunWindows::default());
    }

    #[test]
    fn test_windows_ignore_entries_past_twenty() {
        let mut hrs = vec![0; 20];
        hrs.extend([5, 5, 5]);
        let windows = HomeRunWindows::from_game_log(&log(&hrs));
        assert_eq!(windows.last20, 0);
    }

    #[test]
    fn test_windows_monotonic() {
        let samples: [&[u32]; 4] = [&[3, 0, 1], &[0; 25], &[1; 12], &[0, 0, 0, 0, 0, 0, 4]];
        for hrs in samples {
            let w = HomeRunWindows::from_game_log(&log(hrs));
            assert!(w.last5 <= w.last10 && w.last10 <= w.last20, "{:?}", w);
        }
    }

    #[test]
    fn test_game_matchups_pair_batters_with_opposing_starter() {
        let game = Game {
            game_pk: 1,
            away: GameSide {
                team: team(147, "New York Yankees"),
                probable_pitcher: Some(pitcher(10, "Away Starter")),
            },
            home: GameSide {
                team: team(111, "Boston Red Sox"),
                probable_pitcher: Some(pitcher(20, "Home Starter")),
            },
        };

        let pairs = game.matchups();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0.name, "New York Yankees");
        assert_eq!(pairs[0].1.full_name, "Home Starter");
        assert_eq!(pairs[1].0.name, "Boston Red Sox");
        assert_eq!(pairs[1].1.full_name, "Away Starter");
    }

    #[test]
    fn test_game_matchups_skip_unannounced_starter() {
        let game = Game {
            game_pk: 2,
            away: GameSide {
                team: team(1, "A"),
                probable_pitcher: None,
            },
            home: GameSide {
                team: team(2, "B"),
                probable_pitcher: Some(pitcher(3, "C")),
            },
        };

        let pairs = game.matchups();
        assert_eq!(pairs, vec![(team(1, "A"), pitcher(3, "C"))]);
    }

    #[test]
    fn test_batter_is_pitcher() {
        let mut batter = Batter {
            person_id: 1,
            full_name: "Test".to_string(),
            position_code: "1".to_string(),
        };
        assert!(batter.is_pitcher());

        batter.position_code = "Y".to_string();
        assert!(!batter.is_pitcher());
    }

    #[test]
    fn test_matchup_record_json_keys() {
        let record = MatchupRecord {
            player_name: "Aaron Judge".to_string(),
            player_id: 592450,
            team: "New York Yankees".to_string(),
            vs_pitcher: "Chris Sale".to_string(),
            career_hrs: 2,
            last5: 1,
            last10: 2,
            last20: 4,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["playerName"], "Aaron Judge");
        assert_eq!(json["playerId"], 592450);
        assert_eq!(json["vsPitcher"], "Chris Sale");
        assert_eq!(json["careerHRs"], 2);
        assert_eq!(json["last20"], 4);
        assert_eq!(json.as_object().unwrap().len(), 8);
    }

    #[test]
    fn test_stats_record_team() {
        let record = MatchupRecord {
            player_name: "X".to_string(),
            player_id: 1,
            team: "T".to_string(),
            vs_pitcher: "P".to_string(),
            career_hrs: 1,
            last5: 0,
            last10: 0,
            last20: 0,
        };
        let mut stats = AggregationStats::default();
        stats.record_team(
            true,
            &[
                BatterOutcome::Matchup(record),
                BatterOutcome::NoHistory,
                BatterOutcome::Unavailable("timeout".to_string()),
            ],
        );
        stats.record_team(false, &[]);

        assert_eq!(stats.batters_checked, 3);
        assert_eq!(stats.matchups, 1);
        assert_eq!(stats.batters_unavailable, 1);
        assert_eq!(stats.rosters_unavailable, 1);
    }
}
