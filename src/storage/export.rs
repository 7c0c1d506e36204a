//! Match exports: pretty JSON snapshots, the ball-log table and per-player
//! totals across matches

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::{BattingStats, BowlingStats, Match};

/// Pretty-printed JSON of the full match state
pub fn snapshot_json(state: &Match) -> Result<String> {
    serde_json::to_string_pretty(state).context("Failed to serialize match snapshot")
}

/// One row of the ball-log table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BallLogRow {
    pub time: String,
    pub outcome: String,
    pub striker: String,
    pub non_striker: String,
    pub bowler: String,
    /// Extras as JSON text, `{}` when there are none
    pub extras: String,
    /// Wicket detail as JSON text, `{}` when there is none
    pub wicket: String,
}

/// Flattens the ball log into table rows, oldest first
pub fn ball_log_rows(state: &Match) -> Result<Vec<BallLogRow>> {
    state
        .ball_log
        .iter()
        .map(|entry| {
            let wicket = match &entry.wicket {
                Some(info) => serde_json::to_string(info),
                None => Ok("{}".to_string()),
            }
            .context("Failed to serialize wicket detail")?;

            Ok(BallLogRow {
                time: entry.time.to_rfc3339(),
                outcome: entry.outcome.code(),
                striker: entry.striker.clone(),
                non_striker: entry.non_striker.clone(),
                bowler: entry.bowler.clone(),
                extras: serde_json::to_string(&entry.extras)
                    .context("Failed to serialize extras")?,
                wicket,
            })
        })
        .collect()
}

/// Renders rows as CSV with a header line
pub fn ball_log_csv(rows: &[BallLogRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if rows.is_empty() {
        writer
            .write_record([
                "time",
                "outcome",
                "striker",
                "non_striker",
                "bowler",
                "extras",
                "wicket",
            ])
            .context("Failed to write CSV header")?;
    }
    for row in rows {
        writer.serialize(row).context("Failed to write CSV row")?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output was not UTF-8")
}

/// Career figures for one player, summed over every stored match
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerTotals {
    pub player: String,
    /// Matches in which the player has a batting or bowling record
    pub matches: u32,
    pub batting: BattingStats,
    pub bowling: BowlingStats,
}

impl PlayerTotals {
    pub fn strike_rate(&self) -> f64 {
        self.batting.strike_rate()
    }
}

/// Sums batting and bowling records per player, highest run scorer first
pub fn player_totals(matches: &[Match]) -> Vec<PlayerTotals> {
    let mut totals: BTreeMap<&str, PlayerTotals> = BTreeMap::new();

    for state in matches {
        let mut seen = Vec::new();

        for (name, stats) in &state.batting_stats {
            let rec = totals.entry(name).or_insert_with(|| PlayerTotals {
                player: name.clone(),
                ..Default::default()
            });
            rec.batting.runs += stats.runs;
            rec.batting.balls += stats.balls;
            rec.batting.fours += stats.fours;
            rec.batting.sixes += stats.sixes;
            seen.push(name.as_str());
        }

        for (name, stats) in &state.bowling_stats {
            let rec = totals.entry(name).or_insert_with(|| PlayerTotals {
                player: name.clone(),
                ..Default::default()
            });
            rec.bowling.balls += stats.balls;
            rec.bowling.runs += stats.runs;
            rec.bowling.wickets += stats.wickets;
            seen.push(name.as_str());
        }

        seen.sort_unstable();
        seen.dedup();
        for name in seen {
            if let Some(rec) = totals.get_mut(name) {
                rec.matches += 1;
            }
        }
    }

    let mut list: Vec<PlayerTotals> = totals.into_values().collect();
    list.sort_by(|a, b| {
        b.batting
            .runs
            .cmp(&a.batting.runs)
            .then_with(|| b.bowling.wickets.cmp(&a.bowling.wickets))
            .then_with(|| a.player.cmp(&b.player))
    });
    list
}
