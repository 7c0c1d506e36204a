//! Match domain model
//!
//! A [`Match`] owns everything scoring touches: both team scores, who is on
//! the field, per-player stat records, the ball log, the commentary log and
//! the scorer lease. It is mutated only by [`super::scoring`] and
//! [`super::lifecycle`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use super::error::MatchError;
use super::id::MatchId;
use super::lock::ScorerLock;
use super::scoring::BallLogEntry;

/// Legal deliveries in an over
pub const BALLS_PER_OVER: u32 = 6;

/// Longest innings a match can be set up for
pub const MAX_OVERS: u32 = 100;

/// Formats a legal ball count as cricket over notation (`13` -> `"2.1"`)
pub fn over_notation(balls: u32) -> String {
    format!("{}.{}", balls / BALLS_PER_OVER, balls % BALLS_PER_OVER)
}

/// One of the two sides in a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "Team A")]
    TeamA,
    #[serde(rename = "Team B")]
    TeamB,
}

impl Side {
    /// Returns the opposing side
    pub fn other(self) -> Self {
        match self {
            Side::TeamA => Side::TeamB,
            Side::TeamB => Side::TeamA,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::TeamA => write!(f, "Team A"),
            Side::TeamB => write!(f, "Team B"),
        }
    }
}

/// Match status; moves strictly forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    #[serde(rename = "INNINGS1")]
    Innings1,
    #[serde(rename = "INNINGS2")]
    Innings2,
    #[serde(rename = "COMPLETED")]
    Completed,
}

impl MatchStatus {
    /// Returns true while deliveries may be scored
    pub fn is_active(&self) -> bool {
        matches!(self, MatchStatus::Innings1 | MatchStatus::Innings2)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Innings1 => write!(f, "INNINGS1"),
            MatchStatus::Innings2 => write!(f, "INNINGS2"),
            MatchStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// Runs, wickets and legal balls for one side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScore {
    pub runs: u32,
    #[serde(rename = "wkts")]
    pub wickets: u32,
    pub balls: u32,
}

impl TeamScore {
    /// Overs bowled in cricket notation
    pub fn overs(&self) -> String {
        over_notation(self.balls)
    }

    /// Runs per six legal balls
    pub fn run_rate(&self) -> f64 {
        if self.balls == 0 {
            0.0
        } else {
            f64::from(self.runs) * f64::from(BALLS_PER_OVER) / f64::from(self.balls)
        }
    }
}

impl fmt::Display for TeamScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({} ov)", self.runs, self.wickets, self.overs())
    }
}

/// Scores for both sides
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    #[serde(rename = "Team A")]
    pub team_a: TeamScore,
    #[serde(rename = "Team B")]
    pub team_b: TeamScore,
}

impl Scores {
    pub fn get(&self, side: Side) -> &TeamScore {
        match side {
            Side::TeamA => &self.team_a,
            Side::TeamB => &self.team_b,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut TeamScore {
        match side {
            Side::TeamA => &mut self.team_a,
            Side::TeamB => &mut self.team_b,
        }
    }
}

/// Player rosters for both sides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teams {
    #[serde(rename = "Team A")]
    pub team_a: Vec<String>,
    #[serde(rename = "Team B")]
    pub team_b: Vec<String>,
}

impl Teams {
    pub fn roster(&self, side: Side) -> &[String] {
        match side {
            Side::TeamA => &self.team_a,
            Side::TeamB => &self.team_b,
        }
    }

    /// Returns the side a player belongs to
    pub fn side_of(&self, player: &str) -> Option<Side> {
        if self.team_a.iter().any(|p| p == player) {
            Some(Side::TeamA)
        } else if self.team_b.iter().any(|p| p == player) {
            Some(Side::TeamB)
        } else {
            None
        }
    }
}

/// Who is batting and who comes in next
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattingState {
    #[serde(default)]
    pub striker: Option<String>,

    #[serde(default)]
    pub non_striker: Option<String>,

    /// Batting order, fixed when the innings starts
    pub order: Vec<String>,

    /// First order position not yet considered for an incoming batter
    pub next_index: usize,

    /// Batters dismissed this innings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dismissed: Vec<String>,
}

impl BattingState {
    /// Batting state for an innings whose openers the scorer still has to pick
    pub fn awaiting_openers(order: &[String]) -> Self {
        Self {
            striker: None,
            non_striker: None,
            order: order.to_vec(),
            next_index: 0,
            dismissed: Vec::new(),
        }
    }

    /// Batting state with the first two players in the order at the crease
    pub fn with_openers(order: &[String]) -> Self {
        Self {
            striker: order.first().cloned(),
            non_striker: order.get(1).cloned(),
            order: order.to_vec(),
            next_index: order.len().min(2),
            dismissed: Vec::new(),
        }
    }

    /// Returns true if the player is currently at the crease
    pub fn is_on_field(&self, player: &str) -> bool {
        self.striker.as_deref() == Some(player) || self.non_striker.as_deref() == Some(player)
    }

    pub fn is_dismissed(&self, player: &str) -> bool {
        self.dismissed.iter().any(|p| p == player)
    }

    pub fn swap_strike(&mut self) {
        std::mem::swap(&mut self.striker, &mut self.non_striker);
    }

    /// Takes the next batter from the order, skipping anyone at the crease
    /// or already out. Advances `next_index` past every position examined.
    pub fn take_next_batter(&mut self) -> Option<String> {
        while self.next_index < self.order.len() {
            let candidate = self.order[self.next_index].clone();
            self.next_index += 1;

            if !self.is_on_field(&candidate) && !self.is_dismissed(&candidate) {
                return Some(candidate);
            }
        }
        None
    }
}

/// Who is bowling
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BowlingState {
    #[serde(default)]
    pub current_bowler: Option<String>,

    /// Bowler of the most recently completed over
    #[serde(default)]
    pub last_over_bowler: Option<String>,
}

/// Batting figures for one player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattingStats {
    #[serde(rename = "R")]
    pub runs: u32,
    #[serde(rename = "B")]
    pub balls: u32,
    #[serde(rename = "4")]
    pub fours: u32,
    #[serde(rename = "6")]
    pub sixes: u32,
}

impl BattingStats {
    pub fn strike_rate(&self) -> f64 {
        if self.balls == 0 {
            0.0
        } else {
            f64::from(self.runs) * 100.0 / f64::from(self.balls)
        }
    }
}

/// Bowling figures for one player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BowlingStats {
    /// Legal balls bowled
    #[serde(rename = "B")]
    pub balls: u32,
    #[serde(rename = "R")]
    pub runs: u32,
    #[serde(rename = "W")]
    pub wickets: u32,
}

impl BowlingStats {
    pub fn overs(&self) -> String {
        over_notation(self.balls)
    }

    pub fn economy(&self) -> f64 {
        if self.balls == 0 {
            0.0
        } else {
            f64::from(self.runs) * f64::from(BALLS_PER_OVER) / f64::from(self.balls)
        }
    }
}

/// Status, innings number and batting side, captured together for undo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub status: MatchStatus,
    pub innings: u8,
    pub batting_team: Side,
}

/// Input for creating a match
#[derive(Debug, Clone, Default)]
pub struct NewMatch {
    pub title: String,
    pub venue: String,
    pub overs_limit: u32,
    pub team_a: Vec<String>,
    pub team_b: Vec<String>,
}

/// Full state of one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub title: String,
    #[serde(default)]
    pub venue: String,
    pub overs_limit: u32,
    pub status: MatchStatus,
    pub innings: u8,
    pub batting_team: Side,
    pub teams: Teams,
    pub scores: Scores,
    pub batting: BattingState,
    pub bowling: BowlingState,
    #[serde(default)]
    pub batting_stats: BTreeMap<String, BattingStats>,
    #[serde(default)]
    pub bowling_stats: BTreeMap<String, BowlingStats>,
    #[serde(default)]
    pub ball_log: Vec<BallLogEntry>,
    #[serde(default)]
    pub commentary: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scorer_lock: Option<ScorerLock>,
    pub created_at: DateTime<Utc>,
}

/// Trims names and rejects empty or duplicate entries within one roster
fn clean_roster(side: Side, roster: &[String]) -> Result<Vec<String>, MatchError> {
    let names: Vec<String> = roster.iter().map(|p| p.trim().to_string()).collect();

    if names.len() < 2 {
        return Err(MatchError::InvalidRoster(format!(
            "{} needs at least two players, got {}",
            side,
            names.len()
        )));
    }
    if names.iter().any(|p| p.is_empty()) {
        return Err(MatchError::InvalidRoster(format!(
            "{} has a blank player name",
            side
        )));
    }

    let mut seen = HashSet::new();
    for name in &names {
        if !seen.insert(name.as_str()) {
            return Err(MatchError::InvalidRoster(format!(
                "{} lists {} more than once",
                side, name
            )));
        }
    }

    Ok(names)
}

impl Match {
    /// Creates a match in the first innings with Team A batting and its
    /// first two players at the crease
    pub fn new(setup: NewMatch, now: DateTime<Utc>) -> Result<Self, MatchError> {
        if setup.overs_limit == 0 || setup.overs_limit > MAX_OVERS {
            return Err(MatchError::InvalidOvers {
                overs: setup.overs_limit,
                max: MAX_OVERS,
            });
        }

        let team_a = clean_roster(Side::TeamA, &setup.team_a)?;
        let team_b = clean_roster(Side::TeamB, &setup.team_b)?;

        if let Some(shared) = team_a.iter().find(|p| team_b.contains(p)) {
            return Err(MatchError::InvalidRoster(format!(
                "{} is listed for both teams",
                shared
            )));
        }

        let title = setup.title.trim().to_string();

        Ok(Self {
            id: MatchId::new(&title, now),
            title,
            venue: setup.venue.trim().to_string(),
            overs_limit: setup.overs_limit,
            status: MatchStatus::Innings1,
            innings: 1,
            batting_team: Side::TeamA,
            batting: BattingState::with_openers(&team_a),
            bowling: BowlingState::default(),
            teams: Teams { team_a, team_b },
            scores: Scores::default(),
            batting_stats: BTreeMap::new(),
            bowling_stats: BTreeMap::new(),
            ball_log: Vec::new(),
            commentary: Vec::new(),
            scorer_lock: None,
            created_at: now,
        })
    }

    /// Side currently in the field
    pub fn fielding_team(&self) -> Side {
        self.batting_team.other()
    }

    pub fn batting_roster(&self) -> &[String] {
        self.teams.roster(self.batting_team)
    }

    pub fn fielding_roster(&self) -> &[String] {
        self.teams.roster(self.fielding_team())
    }

    pub fn score(&self, side: Side) -> &TeamScore {
        self.scores.get(side)
    }

    /// Score of the side currently batting
    pub fn batting_score(&self) -> &TeamScore {
        self.scores.get(self.batting_team)
    }

    /// Legal balls allowed per innings
    pub fn innings_balls(&self) -> u32 {
        self.overs_limit.saturating_mul(BALLS_PER_OVER)
    }

    pub fn phase(&self) -> Phase {
        Phase {
            status: self.status,
            innings: self.innings,
            batting_team: self.batting_team,
        }
    }

    pub(crate) fn restore_phase(&mut self, phase: Phase) {
        self.status = phase.status;
        self.innings = phase.innings;
        self.batting_team = phase.batting_team;
    }

    /// Runs the chasing side needs to win; only defined in the second innings
    pub fn target(&self) -> Option<u32> {
        (self.innings == 2).then(|| self.score(self.fielding_team()).runs + 1)
    }

    /// Runs still required by the chasing side
    pub fn runs_required(&self) -> Option<u32> {
        self.target()
            .map(|target| target.saturating_sub(self.batting_score().runs))
    }

    /// Human-readable result once the match is completed
    pub fn result(&self) -> Option<String> {
        if self.status != MatchStatus::Completed {
            return None;
        }

        if self.innings < 2 {
            return Some("No result".to_string());
        }

        // After the second innings the chasing side is still marked as batting
        let chasing = self.batting_team;
        let defending = chasing.other();
        let chase = self.score(chasing);
        let set = self.score(defending);

        let summary = match chase.runs.cmp(&set.runs) {
            std::cmp::Ordering::Greater => {
                let wickets_in_hand = (self.teams.roster(chasing).len() as u32)
                    .saturating_sub(1)
                    .saturating_sub(chase.wickets);
                format!("{} won by {} wickets", chasing, wickets_in_hand)
            }
            std::cmp::Ordering::Less => {
                format!("{} won by {} runs", defending, set.runs - chase.runs)
            }
            std::cmp::Ordering::Equal => "Match tied".to_string(),
        };
        Some(summary)
    }

    /// Last `n` commentary lines, most recent first
    pub fn recent_commentary(&self, n: usize) -> impl Iterator<Item = &String> {
        self.commentary.iter().rev().take(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn setup(a: &[&str], b: &[&str]) -> NewMatch {
        NewMatch {
            title: "Tigers vs Lions".into(),
            venue: "Ground 2".into(),
            overs_limit: 20,
            team_a: names(a),
            team_b: names(b),
        }
    }

    #[test]
    fn new_match_initial_state() {
        let m = Match::new(setup(&["Asha", "Ben", "Chen"], &["Dev", "Eli"]), Utc::now()).unwrap();

        assert_eq!(m.status, MatchStatus::Innings1);
        assert_eq!(m.innings, 1);
        assert_eq!(m.batting_team, Side::TeamA);
        assert_eq!(m.batting.striker.as_deref(), Some("Asha"));
        assert_eq!(m.batting.non_striker.as_deref(), Some("Ben"));
        assert_eq!(m.batting.next_index, 2);
        assert!(m.bowling.current_bowler.is_none());
        assert!(m.batting_stats.is_empty());
        assert!(m.ball_log.is_empty());
        assert!(m.scorer_lock.is_none());
        assert_eq!(m.fielding_roster(), &names(&["Dev", "Eli"])[..]);
    }

    #[test]
    fn rejects_player_on_both_teams() {
        let err = Match::new(setup(&["Asha", "Ben"], &["Ben", "Dev"]), Utc::now()).unwrap_err();
        assert!(matches!(err, MatchError::InvalidRoster(_)));
    }

    #[test]
    fn rejects_empty_and_short_rosters() {
        assert!(matches!(
            Match::new(setup(&[], &["Dev", "Eli"]), Utc::now()),
            Err(MatchError::InvalidRoster(_))
        ));
        assert!(matches!(
            Match::new(setup(&["Asha"], &["Dev", "Eli"]), Utc::now()),
            Err(MatchError::InvalidRoster(_))
        ));
        assert!(matches!(
            Match::new(setup(&["Asha", " "], &["Dev", "Eli"]), Utc::now()),
            Err(MatchError::InvalidRoster(_))
        ));
    }

    #[test]
    fn rejects_duplicate_within_team() {
        let err = Match::new(setup(&["Asha", "Asha"], &["Dev", "Eli"]), Utc::now()).unwrap_err();
        assert!(matches!(err, MatchError::InvalidRoster(_)));
    }

    #[test]
    fn rejects_out_of_range_overs() {
        for overs in [0, MAX_OVERS + 1, 1_000_000_000] {
            let mut s = setup(&["Asha", "Ben"], &["Dev", "Eli"]);
            s.overs_limit = overs;
            assert_eq!(
                Match::new(s, Utc::now()).unwrap_err(),
                MatchError::InvalidOvers {
                    overs,
                    max: MAX_OVERS
                }
            );
        }

        let mut s = setup(&["Asha", "Ben"], &["Dev", "Eli"]);
        s.overs_limit = MAX_OVERS;
        assert!(Match::new(s, Utc::now()).is_ok());
    }

    #[test]
    fn innings_balls_saturates_on_stored_limit() {
        let mut m = Match::new(setup(&["Asha", "Ben"], &["Dev", "Eli"]), Utc::now()).unwrap();
        m.overs_limit = u32::MAX;
        assert_eq!(m.innings_balls(), u32::MAX);
    }

    #[test]
    fn take_next_batter_skips_on_field_and_dismissed() {
        let mut batting = BattingState::awaiting_openers(&names(&["A", "B", "C", "D"]));
        batting.striker = Some("A".into());
        batting.non_striker = Some("C".into());
        batting.dismissed.push("B".into());

        assert_eq!(batting.take_next_batter().as_deref(), Some("D"));
        assert_eq!(batting.next_index, 4);
        assert_eq!(batting.take_next_batter(), None);
    }

    #[test]
    fn over_notation_and_rates() {
        assert_eq!(over_notation(0), "0.0");
        assert_eq!(over_notation(13), "2.1");

        let score = TeamScore {
            runs: 30,
            wickets: 1,
            balls: 18,
        };
        assert_eq!(score.to_string(), "30/1 (3.0 ov)");
        assert!((score.run_rate() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn status_serializes_upper_case() {
        assert_eq!(
            serde_json::to_string(&MatchStatus::Innings2).unwrap(),
            "\"INNINGS2\""
        );
        assert_eq!(serde_json::to_string(&Side::TeamB).unwrap(), "\"Team B\"");
    }
}
