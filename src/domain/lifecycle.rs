//! Innings and match lifecycle
//!
//! Status only moves forward: `INNINGS1 -> INNINGS2 -> COMPLETED`.
//!
//! After every delivery [`after_delivery`] checks, in order:
//! 1. over boundary: the bowler is stood down and must be replaced, and the
//!    replacement cannot be the bowler who just finished
//! 2. overs exhausted, all out, or (second innings) target reached: the
//!    innings ends
//!
//! A new innings starts with nobody at the crease and nobody bowling; the
//! scorer picks them with [`Match::set_on_field_players`].

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::MatchError;
use super::match_state::{BattingState, BowlingState, Match, MatchStatus, Side, BALLS_PER_OVER};

/// State changes caused by a delivery
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// The ball completed an over; a new bowler is required
    pub over_complete: bool,
    /// The ball ended the innings
    pub innings_ended: bool,
    /// The ball ended the match
    pub match_completed: bool,
}

/// Returns true once the current innings is over
fn innings_finished(state: &Match) -> bool {
    let score = state.batting_score();
    let roster = state.batting_roster().len() as u32;

    let overs_done = score.balls >= state.innings_balls();
    let all_out = score.wickets >= roster.saturating_sub(1);
    let chased = state
        .target()
        .is_some_and(|target| score.runs >= target);

    overs_done || all_out || chased
}

/// Closes the current innings: the first hands over to the other side, the
/// second completes the match
fn close_innings(state: &mut Match) {
    match state.status {
        MatchStatus::Innings1 => {
            state.status = MatchStatus::Innings2;
            state.innings = 2;
            state.batting_team = state.batting_team.other();
            state.batting = BattingState::awaiting_openers(state.batting_roster());
            state.bowling = BowlingState::default();
            tracing::debug!(match_id = %state.id, batting = %state.batting_team, "second innings started");
        }
        MatchStatus::Innings2 => {
            state.status = MatchStatus::Completed;
            tracing::debug!(match_id = %state.id, "match completed");
        }
        MatchStatus::Completed => {}
    }
}

/// Applies over, innings and match transitions after a delivery
pub fn after_delivery(state: &mut Match, legal_ball: bool) -> Transition {
    let mut transition = Transition::default();
    let balls = state.batting_score().balls;

    if legal_ball && balls > 0 && balls % BALLS_PER_OVER == 0 {
        state.bowling.last_over_bowler = state.bowling.current_bowler.take();
        transition.over_complete = true;
    }

    if state.status.is_active() && innings_finished(state) {
        close_innings(state);
        transition.innings_ended = true;
        transition.match_completed = state.status == MatchStatus::Completed;
    }

    transition
}

impl Match {
    /// Puts batters and a bowler on the field.
    ///
    /// Required at the start of each innings and after every over. Batters
    /// must be distinct, not out, and on the batting side; the bowler must be
    /// on the fielding side and, at the start of an over, must not have
    /// bowled the previous one.
    pub fn set_on_field_players(
        &mut self,
        striker: &str,
        non_striker: &str,
        bowler: &str,
        holder: &str,
        now: DateTime<Utc>,
    ) -> Result<(), MatchError> {
        self.require_lock(holder, now)?;

        if !self.status.is_active() {
            return Err(MatchError::InactiveInnings(self.status));
        }

        let (striker, non_striker, bowler) = (striker.trim(), non_striker.trim(), bowler.trim());

        if striker == non_striker {
            return Err(MatchError::InvalidPlayer(
                "striker and non-striker must be different players".to_string(),
            ));
        }

        for batter in [striker, non_striker] {
            self.require_side(batter, self.batting_team, "bat")?;
            if self.batting.is_dismissed(batter) {
                return Err(MatchError::InvalidPlayer(format!("{} is already out", batter)));
            }
        }
        self.require_side(bowler, self.fielding_team(), "bowl")?;

        let over_not_started = self.batting_score().balls % BALLS_PER_OVER == 0;
        if over_not_started && self.bowling.last_over_bowler.as_deref() == Some(bowler) {
            return Err(MatchError::ConsecutiveOvers(bowler.to_string()));
        }

        self.batting.striker = Some(striker.to_string());
        self.batting.non_striker = Some(non_striker.to_string());
        self.bowling.current_bowler = Some(bowler.to_string());

        tracing::debug!(match_id = %self.id, striker, non_striker, bowler, "on-field players set");
        Ok(())
    }

    fn require_side(&self, player: &str, side: Side, role: &str) -> Result<(), MatchError> {
        match self.teams.side_of(player) {
            Some(found) if found == side => Ok(()),
            Some(found) => Err(MatchError::InvalidPlayer(format!(
                "{} plays for {} and cannot {} now",
                player, found, role
            ))),
            None => Err(MatchError::InvalidPlayer(format!(
                "{} is not in either team",
                player
            ))),
        }
    }

    /// Ends the current innings early (declaration, rain, forfeit)
    pub fn end_innings(&mut self, holder: &str, now: DateTime<Utc>) -> Result<(), MatchError> {
        self.require_lock(holder, now)?;

        if !self.status.is_active() {
            return Err(MatchError::InactiveInnings(self.status));
        }

        close_innings(self);
        Ok(())
    }

    /// Marks the match completed regardless of the innings in progress
    pub fn end_match(&mut self, holder: &str, now: DateTime<Utc>) -> Result<(), MatchError> {
        self.require_lock(holder, now)?;

        if !self.status.is_active() {
            return Err(MatchError::InactiveInnings(self.status));
        }

        self.status = MatchStatus::Completed;
        tracing::debug!(match_id = %self.id, innings = self.innings, "match ended early");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::match_state::{NewMatch, TeamScore};
    use crate::domain::outcome::Delivery;
    use crate::domain::scoring::apply_delivery;
    use chrono::{Duration, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SCORER: &str = "scorer-1";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 1, 9, 0, 0).unwrap()
    }

    fn fixture(overs: u32, players: usize) -> Match {
        let roster = |prefix: &str| (1..=players).map(|i| format!("{prefix}{i}")).collect();
        let mut m = Match::new(
            NewMatch {
                title: "Lifecycle".into(),
                venue: String::new(),
                overs_limit: overs,
                team_a: roster("A"),
                team_b: roster("B"),
            },
            now(),
        )
        .unwrap();
        m.try_acquire_lock(SCORER, now(), Duration::minutes(15)).unwrap();
        m.set_on_field_players("A1", "A2", "B1", SCORER, now()).unwrap();
        m
    }

    fn bowl(m: &Match, code: &str) -> (Match, Transition) {
        let mut rng = StdRng::seed_from_u64(3);
        let (next, applied) =
            apply_delivery(m, &Delivery::parse(code).unwrap(), SCORER, now(), &mut rng).unwrap();
        (next, applied.transition)
    }

    /// Bowls `count` dot balls, swapping bowlers at each over
    fn bowl_dots(mut m: Match, count: usize) -> Match {
        for _ in 0..count {
            if m.bowling.current_bowler.is_none() {
                let next = if m.bowling.last_over_bowler.as_deref() == Some(m.fielding_roster()[0].as_str()) {
                    m.fielding_roster()[1].clone()
                } else {
                    m.fielding_roster()[0].clone()
                };
                let (s, n) = (
                    m.batting.striker.clone().unwrap(),
                    m.batting.non_striker.clone().unwrap(),
                );
                m.set_on_field_players(&s, &n, &next, SCORER, now()).unwrap();
            }
            m = bowl(&m, "0").0;
        }
        m
    }

    #[test]
    fn over_boundary_requires_new_bowler() {
        let m = bowl_dots(fixture(5, 4), 5);
        let (mut m, t) = bowl(&m, "0");

        assert!(t.over_complete);
        assert!(!t.innings_ended);
        assert_eq!(m.bowling.current_bowler, None);
        assert_eq!(m.bowling.last_over_bowler.as_deref(), Some("B1"));

        let mut rng = StdRng::seed_from_u64(3);
        let err = apply_delivery(&m, &Delivery::parse("1").unwrap(), SCORER, now(), &mut rng)
            .unwrap_err();
        assert_eq!(err, MatchError::BowlerRequired);

        let err = m.set_on_field_players("A1", "A2", "B1", SCORER, now()).unwrap_err();
        assert_eq!(err, MatchError::ConsecutiveOvers("B1".into()));

        m.set_on_field_players("A1", "A2", "B2", SCORER, now()).unwrap();
        assert_eq!(m.bowling.current_bowler.as_deref(), Some("B2"));
    }

    #[test]
    fn wide_on_sixth_ball_slot_does_not_end_over() {
        let m = bowl_dots(fixture(5, 4), 5);
        let (m, t) = bowl(&m, "WD");
        assert!(!t.over_complete);
        assert_eq!(m.bowling.current_bowler.as_deref(), Some("B1"));
    }

    #[test]
    fn mid_over_bowler_change_allowed() {
        let mut m = bowl_dots(fixture(5, 4), 6);
        m.set_on_field_players("A1", "A2", "B2", SCORER, now()).unwrap();
        let mut m = bowl(&m, "0").0;
        // B2 is injured mid-over; B1 may finish it
        m.set_on_field_players("A1", "A2", "B1", SCORER, now()).unwrap();
    }

    #[test]
    fn overs_exhausted_swaps_innings_then_completes() {
        let m = bowl_dots(fixture(2, 2), 11);
        assert_eq!(m.status, MatchStatus::Innings1);

        let (m, t) = bowl(&bowl_dots(m, 0), "0");
        assert!(t.innings_ended);
        assert!(!t.match_completed);
        assert_eq!(m.status, MatchStatus::Innings2);
        assert_eq!(m.innings, 2);
        assert_eq!(m.batting_team, Side::TeamB);
        assert_eq!(m.batting.striker, None);
        assert_eq!(m.batting.non_striker, None);
        assert_eq!(m.batting.order, vec!["B1".to_string(), "B2".to_string()]);
        assert_eq!(m.bowling, BowlingState::default());

        let mut m = m;
        m.set_on_field_players("B1", "B2", "A1", SCORER, now()).unwrap();
        let m = bowl_dots(m, 11);
        assert_eq!(m.status, MatchStatus::Innings2);

        let (m, t) = bowl(&bowl_dots(m, 0), "0");
        assert!(t.match_completed);
        assert_eq!(m.status, MatchStatus::Completed);
        assert_eq!(*m.score(Side::TeamB), TeamScore { runs: 0, wickets: 0, balls: 12 });
        assert_eq!(m.result().as_deref(), Some("Match tied"));
    }

    #[test]
    fn all_out_ends_innings_with_overs_left() {
        let mut m = fixture(20, 4);
        for _ in 0..2 {
            m = bowl(&m, "W").0;
            assert_eq!(m.status, MatchStatus::Innings1);
        }
        let (m, t) = bowl(&m, "W");
        assert!(t.innings_ended);
        assert_eq!(m.status, MatchStatus::Innings2);
        assert_eq!(*m.score(Side::TeamA), TeamScore { runs: 0, wickets: 3, balls: 3 });
    }

    #[test]
    fn chase_completes_when_target_passed() {
        let mut m = fixture(5, 4);
        m = bowl(&m, "4").0;
        m.end_innings(SCORER, now()).unwrap();
        assert_eq!(m.target(), Some(5));

        m.set_on_field_players("B1", "B2", "A1", SCORER, now()).unwrap();
        let (m, t) = bowl(&m, "4");
        assert!(!t.innings_ended);
        assert_eq!(m.runs_required(), Some(1));

        let (m, t) = bowl(&m, "1");
        assert!(t.match_completed);
        assert_eq!(m.status, MatchStatus::Completed);
        assert_eq!(m.result().as_deref(), Some("Team B won by 3 wickets"));
    }

    #[test]
    fn set_players_validates_names() {
        let mut m = fixture(5, 4);
        let before = m.clone();

        assert!(matches!(
            m.set_on_field_players("A1", "A1", "B1", SCORER, now()),
            Err(MatchError::InvalidPlayer(_))
        ));
        assert_eq!(
            m.set_on_field_players("A1", "B2", "B1", SCORER, now()),
            Err(MatchError::InvalidPlayer(
                "B2 plays for Team B and cannot bat now".into()
            ))
        );
        assert_eq!(
            m.set_on_field_players("A1", "A2", "A3", SCORER, now()),
            Err(MatchError::InvalidPlayer(
                "A3 plays for Team A and cannot bowl now".into()
            ))
        );
        assert_eq!(
            m.set_on_field_players("A1", "Zed", "B1", SCORER, now()),
            Err(MatchError::InvalidPlayer("Zed is not in either team".into()))
        );
        assert!(matches!(
            m.set_on_field_players("A1", "A2", "B1", "intruder", now()),
            Err(MatchError::LockNotHeld(_))
        ));
        assert_eq!(m, before);
    }

    #[test]
    fn manual_end_match_and_no_more_scoring() {
        let mut m = fixture(5, 4);
        m.end_match(SCORER, now()).unwrap();
        assert_eq!(m.status, MatchStatus::Completed);
        assert_eq!(m.result().as_deref(), Some("No result"));

        assert_eq!(
            m.end_innings(SCORER, now()).unwrap_err(),
            MatchError::InactiveInnings(MatchStatus::Completed)
        );
        assert!(matches!(
            m.set_on_field_players("A1", "A2", "B1", SCORER, now()),
            Err(MatchError::InactiveInnings(_))
        ));
    }
}
