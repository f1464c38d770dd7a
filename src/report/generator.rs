//! Report generation for one-shot runs.
//!
//! This module renders a `MatchupReport` as either the same JSON array the
//! HTTP endpoint serves, or a Markdown document with a summary and a
//! matchup table.

use crate::models::{AggregationStats, MatchupRecord, MatchupReport, ReportMetadata};
use anyhow::Result;
use std::io::Write;
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &MatchupReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("# Home Run Matchups for {}\n\n", report.metadata.date));
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(&report.metadata.stats));
    output.push_str(&generate_matchups_section(&report.matchups));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Schedule Date:** {}\n", metadata.date));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Stats API:** {}\n", metadata.api_url));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the summary section.
fn generate_summary_section(stats: &AggregationStats) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Games | Matchup Tasks | Batters Checked | Matchups |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | **{}** |\n\n",
        stats.games, stats.tasks, stats.batters_checked, stats.matchups
    ));

    if stats.rosters_unavailable > 0 || stats.batters_unavailable > 0 {
        section.push_str(&format!(
            "> Incomplete: {} rosters and {} batter lookups were unavailable.\n\n",
            stats.rosters_unavailable, stats.batters_unavailable
        ));
    }

    section
}

/// Generate the matchup table, strongest history first.
fn generate_matchups_section(matchups: &[MatchupRecord]) -> String {
    let mut section = String::new();

    section.push_str("## Matchups\n\n");

    if matchups.is_empty() {
        section.push_str("No batter has a career home run against today's probable starters.\n\n");
        return section;
    }

    let mut sorted: Vec<&MatchupRecord> = matchups.iter().collect();
    sorted.sort_by(|a, b| {
        b.career_hrs
            .cmp(&a.career_hrs)
            .then_with(|| b.last20.cmp(&a.last20))
    });

    section.push_str("| Player | Team | vs. Pitcher | Career HR | Last 5 | Last 10 | Last 20 |\n");
    section.push_str("|:---|:---|:---|:---:|:---:|:---:|:---:|\n");
    for m in sorted {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            m.player_name, m.team, m.vs_pitcher, m.career_hrs, m.last5, m.last10, m.last20
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Data from the MLB Stats API. Generated by hrmatchups.*\n".to_string()
}

/// Generate a JSON report: the matchup array alone, as served over HTTP.
pub fn generate_json_report(report: &MatchupReport) -> Result<String> {
    serde_json::to_string_pretty(&report.matchups).map_err(Into::into)
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
