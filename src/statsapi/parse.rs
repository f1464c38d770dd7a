//! Extraction of model types from raw Stats API JSON.
//!
//! The API nests everything several levels deep and omits fields freely, so
//! these functions walk `serde_json::Value` trees and treat absence as data
//! rather than decoding into rigid structs.

use crate::models::{Batter, CareerSplit, Game, GameLogEntry, GameSide, Pitcher, Team};
use crate::statsapi::error::{Result, StatsApiError};
use chrono::NaiveDate;
use serde_json::Value;
use tracing::warn;

/// Parse every game from a `/schedule/games` response.
///
/// A response without `dates` (or with an empty list) means no games.
/// Individual games missing team identifiers are skipped.
pub fn parse_schedule(value: &Value) -> Result<Vec<Game>> {
    if !value.is_object() {
        return Err(StatsApiError::Malformed(
            "schedule response is not a JSON object".to_string(),
        ));
    }

    let Some(dates) = value["dates"].as_array() else {
        return Ok(Vec::new());
    };

    let mut games = Vec::new();
    for date in dates {
        let Some(entries) = date["games"].as_array() else {
            continue;
        };
        for entry in entries {
            match parse_game(entry) {
                Some(game) => games.push(game),
                None => warn!(
                    "Skipping malformed schedule entry (gamePk {})",
                    entry["gamePk"]
                ),
            }
        }
    }

    Ok(games)
}

fn parse_game(value: &Value) -> Option<Game> {
    Some(Game {
        game_pk: value["gamePk"].as_u64().unwrap_or_default(),
        away: parse_side(&value["teams"]["away"])?,
        home: parse_side(&value["teams"]["home"])?,
    })
}

fn parse_side(value: &Value) -> Option<GameSide> {
    let team = Team {
        id: value["team"]["id"].as_u64()?,
        name: value["team"]["name"].as_str()?.to_string(),
    };
    let probable_pitcher = parse_pitcher(&value["probablePitcher"]);
    Some(GameSide {
        team,
        probable_pitcher,
    })
}

fn parse_pitcher(value: &Value) -> Option<Pitcher> {
    Some(Pitcher {
        id: value["id"].as_u64()?,
        full_name: value["fullName"].as_str()?.to_string(),
    })
}

/// Parse a `/teams/{id}/roster` response.
///
/// Entries without a person id are dropped; a missing position code is kept
/// as an empty string, which counts as a batter.
pub fn parse_roster(value: &Value) -> Result<Vec<Batter>> {
    let roster = value["roster"].as_array().ok_or_else(|| {
        StatsApiError::Malformed("roster response has no 'roster' array".to_string())
    })?;

    Ok(roster
        .iter()
        .filter_map(|entry| {
            let person = &entry["person"];
            Some(Batter {
                person_id: person["id"].as_u64()?,
                full_name: person["fullName"].as_str().unwrap_or("Unknown").to_string(),
                position_code: entry["position"]["code"].as_str().unwrap_or("").to_string(),
            })
        })
        .collect())
}

/// Missing counts read as zero; counts past `u32::MAX` saturate.
fn home_run_count(value: Option<&Value>) -> u32 {
    value
        .and_then(Value::as_u64)
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or_default()
}

/// Parse a `stats=vsPlayer` response into the career split, if any.
///
/// Only the first split of the first stat group is considered. A split with
/// no `homeRuns` field counts as zero.
pub fn parse_career_split(value: &Value) -> Option<CareerSplit> {
    let stat = value["stats"][0]["splits"][0]["stat"].as_object()?;
    Some(CareerSplit {
        home_runs: home_run_count(stat.get("homeRuns")),
    })
}

/// Parse a `stats=gameLog` response into entries ordered newest-first.
///
/// When every split carries a date the log is sorted by date, descending;
/// otherwise the order the API returned is kept as is.
pub fn parse_game_log(value: &Value) -> Vec<GameLogEntry> {
    let Some(splits) = value["stats"][0]["splits"].as_array() else {
        return Vec::new();
    };

    let mut entries: Vec<GameLogEntry> = splits
        .iter()
        .map(|split| GameLogEntry {
            date: split["date"]
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()),
            home_runs: home_run_count(split["stat"].get("homeRuns")),
        })
        .collect();

    if !entries.is_empty() && entries.iter().all(|e| e.date.is_some()) {
        entries.sort_by(|a, b| b.date.cmp(&a.date));
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schedule_game(pk: u64, home_pitcher: Option<Value>, away_pitcher: Option<Value>) -> Value {
        let mut home = json!({ "team": { "id": 111, "name": "Boston Red Sox" } });
        let mut away = json!({ "team": { "id": 147, "name": "New York Yankees" } });
        if let Some(p) = home_pitcher {
            home["probablePitcher"] = p;
        }
        if let Some(p) = away_pitcher {
            away["probablePitcher"] = p;
        }
        json!({ "gamePk": pk, "teams": { "home": home, "away": away } })
    }

    #[test]
    fn test_parse_schedule_empty() {
        assert!(parse_schedule(&json!({ "dates": [] })).unwrap().is_empty());
        assert!(parse_schedule(&json!({ "totalGames": 0 })).unwrap().is_empty());
    }

    #[test]
    fn test_parse_schedule_rejects_non_object() {
        assert!(parse_schedule(&json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_parse_schedule_games() {
        let body = json!({
            "dates": [{
                "date": "2024-07-04",
                "games": [
                    schedule_game(1, Some(json!({ "id": 519242, "fullName": "Chris Sale" })), None),
                    { "gamePk": 2, "teams": { "home": {}, "away": {} } }
                ]
            }]
        });

        let games = parse_schedule(&body).unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].game_pk, 1);
        assert_eq!(games[0].home.team.name, "Boston Red Sox");
        assert_eq!(
            games[0].home.probable_pitcher.as_ref().map(|p| p.id),
            Some(519242)
        );
        assert!(games[0].away.probable_pitcher.is_none());
    }

    #[test]
    fn test_parse_roster_keeps_position_codes() {
        let body = json!({
            "roster": [
                { "person": { "id": 1, "fullName": "Starter" }, "position": { "code": "1" } },
                { "person": { "id": 2, "fullName": "Shortstop" }, "position": { "code": "6" } },
                { "person": { "fullName": "No Id" }, "position": { "code": "7" } }
            ]
        });

        let roster = parse_roster(&body).unwrap();
        assert_eq!(roster.len(), 2);
        assert!(roster[0].is_pitcher());
        assert_eq!(roster[1].full_name, "Shortstop");
        assert_eq!(roster[1].position_code, "6");
    }

    #[test]
    fn test_parse_roster_missing_array() {
        assert!(parse_roster(&json!({ "message": "not found" })).is_err());
    }

    #[test]
    fn test_parse_career_split() {
        let body = json!({
            "stats": [{ "splits": [{ "stat": { "homeRuns": 3, "atBats": 20 } }] }]
        });
        assert_eq!(parse_career_split(&body), Some(CareerSplit { home_runs: 3 }));

        let no_hr_field = json!({ "stats": [{ "splits": [{ "stat": { "atBats": 4 } }] }] });
        assert_eq!(
            parse_career_split(&no_hr_field),
            Some(CareerSplit { home_runs: 0 })
        );

        assert_eq!(parse_career_split(&json!({ "stats": [{ "splits": [] }] })), None);
        assert_eq!(parse_career_split(&json!({ "stats": [] })), None);
    }

    #[test]
    fn test_oversized_home_run_counts_saturate() {
        let huge = u64::from(u32::MAX) + 5;
        let career = json!({ "stats": [{ "splits": [{ "stat": { "homeRuns": huge } }] }] });
        assert_eq!(
            parse_career_split(&career),
            Some(CareerSplit { home_runs: u32::MAX })
        );

        let log = json!({ "stats": [{ "splits": [{ "stat": { "homeRuns": huge } }] }] });
        assert_eq!(parse_game_log(&log)[0].home_runs, u32::MAX);
    }

    #[test]
    fn test_parse_game_log_keeps_order_without_dates() {
        let body = json!({
            "stats": [{ "splits": [
                { "stat": { "homeRuns": 1 } },
                { "stat": { "homeRuns": 0 } },
                { "stat": {} }
            ] }]
        });

        let hrs: Vec<u32> = parse_game_log(&body).iter().map(|e| e.home_runs).collect();
        assert_eq!(hrs, vec![1, 0, 0]);
    }

    #[test]
    fn test_parse_game_log_sorts_dated_entries_newest_first() {
        let body = json!({
            "stats": [{ "splits": [
                { "date": "2024-06-01", "stat": { "homeRuns": 2 } },
                { "date": "2024-06-03", "stat": { "homeRuns": 0 } },
                { "date": "2024-06-02", "stat": { "homeRuns": 1 } }
            ] }]
        });

        let hrs: Vec<u32> = parse_game_log(&body).iter().map(|e| e.home_runs).collect();
        assert_eq!(hrs, vec![0, 1, 2]);
    }

    #[test]
    fn test_parse_game_log_missing_stats() {
        assert!(parse_game_log(&json!({})).is_empty());
    }
}
