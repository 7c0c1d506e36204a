//! Ball-by-ball scoring engine
//!
//! [`apply_delivery`] turns a match state plus one delivery into the next
//! state. All preconditions are checked before anything changes and the work
//! happens on a copy, so a rejected delivery leaves the caller's match
//! untouched. Each applied ball appends a [`BallLogEntry`] holding everything
//! [`undo_last`] needs to put the match back exactly as it was.
//!
//! ## Rules
//!
//! | Outcome | Team | Striker | Bowler | Legal | Strike swaps on |
//! |---------|------|---------|--------|-------|-----------------|
//! | runs `r` | +r | +r, +1 ball, 4s/6s | +1 ball, +r | yes | odd `r` |
//! | wicket | +1 wkt | +1 ball | +1 ball, +1 wkt | yes | - |
//! | wide | +n (default 1) | - | +n | no | - |
//! | no-ball | +1 + bat | +bat | +1 + bat | no | odd bat runs |
//! | bye / leg-bye | +n (default 1) | +1 ball | +1 ball | yes | odd `n` |

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::commentary;
use super::error::MatchError;
use super::lifecycle::{self, Transition};
use super::match_state::{
    over_notation, BattingState, BattingStats, BowlingState, BowlingStats, Match, Phase, Side,
    TeamScore,
};
use super::outcome::{Delivery, Extras, Outcome, WicketInfo};

/// Immutable record of one delivery, with the pre-delivery snapshots undo needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallLogEntry {
    pub time: DateTime<Utc>,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Extras::is_empty")]
    pub extras: Extras,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wicket: Option<WicketInfo>,
    pub striker: String,
    pub non_striker: String,
    pub bowler: String,
    /// Batter who replaced the striker on a wicket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incoming: Option<String>,
    pub batting_team: Side,
    pub score_before: TeamScore,
    pub score_after: TeamScore,
    /// Batting records before the ball; `None` means no record existed
    pub prev_batting_stats: BTreeMap<String, Option<BattingStats>>,
    pub prev_bowling_stats: BTreeMap<String, Option<BowlingStats>>,
    pub prev_batting: BattingState,
    pub prev_bowling: BowlingState,
    pub prev_phase: Phase,
}

/// What a successful delivery produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Applied {
    pub entry: BallLogEntry,
    pub commentary: String,
    pub transition: Transition,
}

/// Returns true if the wicket about to fall ends the innings, in which case
/// no replacement batter is needed
fn wicket_ends_innings(state: &Match) -> bool {
    let score = state.batting_score();
    let roster = state.batting_roster().len() as u32;
    score.wickets + 1 >= roster.saturating_sub(1) || score.balls + 1 >= state.innings_balls()
}

/// Works out who replaces a dismissed striker. `next` already has the
/// striker recorded as dismissed.
fn incoming_batter(
    next: &mut Match,
    delivery: &Delivery,
    dismissed: &str,
    ends_innings: bool,
) -> Result<Option<String>, MatchError> {
    if let Some(name) = delivery.new_batter() {
        let name = name.trim();
        if !next.batting_roster().iter().any(|p| p == name) {
            return Err(MatchError::InvalidPlayer(format!(
                "{} is not in the {} batting roster",
                name, next.batting_team
            )));
        }
        if next.batting.is_on_field(name) && name != dismissed {
            return Err(MatchError::InvalidPlayer(format!(
                "{} is already at the crease",
                name
            )));
        }
        if next.batting.is_dismissed(name) {
            return Err(MatchError::InvalidPlayer(format!("{} is already out", name)));
        }
        return Ok(Some(name.to_string()));
    }

    match next.batting.take_next_batter() {
        Some(name) => Ok(Some(name)),
        None if ends_innings => Ok(None),
        None => Err(MatchError::NoEligibleBatter(dismissed.to_string())),
    }
}

/// Applies one delivery and returns the resulting match state.
///
/// `holder` must own an unexpired scorer lease. The returned state has the
/// log entry and commentary line appended and any over, innings or match
/// transition already applied.
pub fn apply_delivery<R: Rng + ?Sized>(
    state: &Match,
    delivery: &Delivery,
    holder: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<(Match, Applied), MatchError> {
    state.require_lock(holder, now)?;

    if !state.status.is_active() {
        return Err(MatchError::InactiveInnings(state.status));
    }

    let (striker, non_striker) = match (&state.batting.striker, &state.batting.non_striker) {
        (Some(s), Some(n)) => (s.clone(), n.clone()),
        _ => return Err(MatchError::PlayersNotSet),
    };
    let bowler = state
        .bowling
        .current_bowler
        .clone()
        .ok_or(MatchError::BowlerRequired)?;
    delivery.check_extras()?;

    let side = state.batting_team;
    let mut next = state.clone();

    let mut incoming = None;
    if delivery.outcome == Outcome::Wicket {
        let ends_innings = wicket_ends_innings(state);
        next.batting.dismissed.push(striker.clone());
        incoming = incoming_batter(&mut next, delivery, &striker, ends_innings)?;
    }

    // Snapshot every record this ball can touch before creating or changing it
    let mut prev_batting_stats = BTreeMap::new();
    for name in [&striker, &non_striker].into_iter().chain(incoming.as_ref()) {
        prev_batting_stats.insert(name.clone(), state.batting_stats.get(name).copied());
    }
    let mut prev_bowling_stats = BTreeMap::new();
    prev_bowling_stats.insert(bowler.clone(), state.bowling_stats.get(&bowler).copied());

    for name in prev_batting_stats.keys() {
        next.batting_stats.entry(name.clone()).or_default();
    }
    next.bowling_stats.entry(bowler.clone()).or_default();

    let extras = &delivery.extras;
    let mut swap_strike = false;
    {
        let bat = next.batting_stats.entry(striker.clone()).or_default();
        let bowl = next.bowling_stats.entry(bowler.clone()).or_default();
        let score = next.scores.get_mut(side);

        match delivery.outcome {
            Outcome::Runs(r) => {
                let r = u32::from(r);
                bat.runs += r;
                bat.balls += 1;
                if r == 4 {
                    bat.fours += 1;
                }
                if r == 6 {
                    bat.sixes += 1;
                }
                bowl.balls += 1;
                bowl.runs += r;
                score.runs += r;
                score.balls += 1;
                swap_strike = r % 2 == 1;
            }
            Outcome::Wicket => {
                bat.balls += 1;
                bowl.balls += 1;
                bowl.wickets += 1;
                score.wickets += 1;
                score.balls += 1;
            }
            Outcome::Wide => {
                let awarded = extras.awarded();
                bowl.runs += awarded;
                score.runs += awarded;
            }
            Outcome::NoBall => {
                let off_bat = extras.runs_off_bat;
                bowl.runs += 1 + off_bat;
                score.runs += 1 + off_bat;
                bat.runs += off_bat;
                swap_strike = off_bat % 2 == 1;
            }
            Outcome::Bye | Outcome::LegBye => {
                let awarded = extras.awarded();
                score.runs += awarded;
                bat.balls += 1;
                bowl.balls += 1;
                score.balls += 1;
                swap_strike = awarded % 2 == 1;
            }
        }
    }

    if delivery.outcome == Outcome::Wicket {
        next.batting.striker = incoming.clone();
    }
    if swap_strike {
        next.batting.swap_strike();
    }

    let score_after = *next.scores.get(side);
    let entry = BallLogEntry {
        time: now,
        outcome: delivery.outcome,
        extras: delivery.extras.clone(),
        wicket: delivery.wicket.clone(),
        striker: striker.clone(),
        non_striker,
        bowler: bowler.clone(),
        incoming,
        batting_team: side,
        score_before: *state.scores.get(side),
        score_after,
        prev_batting_stats,
        prev_bowling_stats,
        prev_batting: state.batting.clone(),
        prev_bowling: state.bowling.clone(),
        prev_phase: state.phase(),
    };

    let transition = lifecycle::after_delivery(&mut next, delivery.outcome.is_legal());

    let line = format!(
        "{} — {}",
        over_notation(score_after.balls),
        commentary::describe(
            &delivery.outcome.code(),
            Some(&striker),
            Some(&bowler),
            extras,
            rng,
        )
    );

    next.ball_log.push(entry.clone());
    next.commentary.push(line.clone());

    tracing::debug!(
        match_id = %next.id,
        outcome = %delivery.outcome,
        score = %score_after,
        over_complete = transition.over_complete,
        innings_ended = transition.innings_ended,
        "delivery applied"
    );

    Ok((
        next,
        Applied {
            entry,
            commentary: line,
            transition,
        },
    ))
}

/// Reverts the most recent delivery.
///
/// Returns `Ok(None)` when the ball log is empty. Otherwise the returned
/// state equals the state before that delivery was applied, including
/// strike, bowler, innings phase and every stat record it touched.
pub fn undo_last(
    state: &Match,
    holder: &str,
    now: DateTime<Utc>,
) -> Result<Option<(Match, BallLogEntry)>, MatchError> {
    state.require_lock(holder, now)?;

    let mut next = state.clone();
    let Some(entry) = next.ball_log.pop() else {
        return Ok(None);
    };

    next.restore_phase(entry.prev_phase);
    *next.scores.get_mut(entry.batting_team) = entry.score_before;

    for (name, prev) in &entry.prev_batting_stats {
        match prev {
            Some(stats) => {
                next.batting_stats.insert(name.clone(), *stats);
            }
            None => {
                next.batting_stats.remove(name);
            }
        }
    }
    for (name, prev) in &entry.prev_bowling_stats {
        match prev {
            Some(stats) => {
                next.bowling_stats.insert(name.clone(), *stats);
            }
            None => {
                next.bowling_stats.remove(name);
            }
        }
    }

    next.batting = entry.prev_batting.clone();
    next.bowling = entry.prev_bowling.clone();
    next.commentary.pop();

    tracing::debug!(match_id = %next.id, outcome = %entry.outcome, "delivery undone");

    Ok(Some((next, entry)))
}
