//! Scorebook: the persisted match API
//!
//! Every mutating call runs inside one critical section per match:
//! take the match's file lock, load the snapshot, run the domain operation,
//! write the snapshot back. A domain error aborts before the write, so the
//! stored match is never partially updated.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::config::ProjectConfig;
use super::export::{self, BallLogRow, PlayerTotals};
use super::store::MatchStore;
use crate::domain::{
    apply_delivery, undo_last, BallLogEntry, Delivery, Match, MatchError, MatchId, MatchStatus,
    NewMatch, ScorerLock, TeamScore,
};

/// Source of the current time
pub type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// What the scorer sees after a delivery is recorded
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryResult {
    pub entry: BallLogEntry,
    pub commentary: String,
    pub score: TeamScore,
    pub status: MatchStatus,
    pub over_complete: bool,
    pub innings_ended: bool,
    pub match_completed: bool,
}

/// Persisted matches plus the rules for changing them
pub struct Scorebook {
    store: MatchStore,
    config: ProjectConfig,
    clock: Clock,
}

impl Scorebook {
    pub fn new(store: MatchStore, config: ProjectConfig) -> Self {
        Self {
            store,
            config,
            clock: Box::new(Utc::now),
        }
    }

    /// Replaces the wall clock, for tests and replays
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Runs `op` on the stored match under its file lock and persists the
    /// result if `op` succeeds and changed anything
    fn update<T>(
        &self,
        id: &MatchId,
        action: &str,
        op: impl FnOnce(&mut Match, DateTime<Utc>) -> Result<T, MatchError>,
    ) -> Result<T> {
        let _guard = self.store.lock(id)?;
        let original = self.store.read(id)?;
        let now = self.now();

        let mut state = original.clone();
        let value = op(&mut state, now)?;

        if state != original {
            self.store.write(&state)?;
            tracing::info!(match_id = %id, action, "match updated");
        }
        Ok(value)
    }

    /// Creates and stores a new match
    pub fn create_match(&self, setup: NewMatch) -> Result<MatchId> {
        let state = Match::new(setup, self.now())?;

        let _guard = self.store.lock(&state.id)?;
        if self.store.exists(&state.id) {
            bail!(
                "Match {} already exists; wait a second or change the title",
                state.id
            );
        }
        self.store.write(&state)?;

        tracing::info!(match_id = %state.id, title = %state.title, "match created");
        Ok(state.id)
    }

    /// Scores one delivery
    pub fn apply_delivery(
        &self,
        id: &MatchId,
        holder: &str,
        delivery: &Delivery,
    ) -> Result<DeliveryResult> {
        self.update(id, "delivery", |state, now| {
            let mut rng = rand::thread_rng();
            let (next, applied) = apply_delivery(state, delivery, holder, now, &mut rng)?;
            *state = next;

            Ok(DeliveryResult {
                score: applied.entry.score_after,
                status: state.status,
                over_complete: applied.transition.over_complete,
                innings_ended: applied.transition.innings_ended,
                match_completed: applied.transition.match_completed,
                entry: applied.entry,
                commentary: applied.commentary,
            })
        })
    }

    /// Reverts the last delivery. Returns false if there was nothing to undo.
    pub fn undo_last(&self, id: &MatchId, holder: &str) -> Result<bool> {
        self.update(id, "undo", |state, now| match undo_last(state, holder, now)? {
            Some((next, _)) => {
                *state = next;
                Ok(true)
            }
            None => Ok(false),
        })
    }

    pub fn try_acquire_lock(&self, id: &MatchId, holder: &str) -> Result<ScorerLock> {
        let lease = self.config.lease();
        self.update(id, "lock acquire", |state, now| {
            state.try_acquire_lock(holder, now, lease)?;
            Ok(state.scorer_lock.clone())
        })?
        .ok_or_else(|| anyhow::anyhow!("Lock on {} vanished after acquire", id))
    }

    /// Returns false if `holder` did not hold the lock
    pub fn release_lock(&self, id: &MatchId, holder: &str) -> Result<bool> {
        self.update(id, "lock release", |state, _| Ok(state.release_lock(holder)))
    }

    pub fn extend_lock(&self, id: &MatchId, holder: &str) -> Result<ScorerLock> {
        let lease = self.config.lease();
        self.update(id, "lock extend", |state, now| {
            state.extend_lock(holder, now, lease)?;
            Ok(state.scorer_lock.clone())
        })?
        .ok_or_else(|| anyhow::anyhow!("Lock on {} vanished after extend", id))
    }

    pub fn set_on_field_players(
        &self,
        id: &MatchId,
        holder: &str,
        striker: &str,
        non_striker: &str,
        bowler: &str,
    ) -> Result<()> {
        self.update(id, "players", |state, now| {
            state.set_on_field_players(striker, non_striker, bowler, holder, now)
        })
    }

    pub fn end_innings(&self, id: &MatchId, holder: &str) -> Result<MatchStatus> {
        self.update(id, "end innings", |state, now| {
            state.end_innings(holder, now)?;
            Ok(state.status)
        })
    }

    pub fn end_match(&self, id: &MatchId, holder: &str) -> Result<MatchStatus> {
        self.update(id, "end match", |state, now| {
            state.end_match(holder, now)?;
            Ok(state.status)
        })
    }

    pub fn load(&self, id: &MatchId) -> Result<Match> {
        self.store.read(id)
    }

    /// Every stored match, oldest first
    pub fn list(&self) -> Result<Vec<Match>> {
        self.store.read_all()
    }

    /// Deletes a match. A live lease held by someone other than `holder`
    /// blocks deletion.
    pub fn delete(&self, id: &MatchId, holder: &str) -> Result<bool> {
        let _guard = self.store.lock(id)?;
        if !self.store.exists(id) {
            return Ok(false);
        }

        let state = self.store.read(id)?;
        if let Some(lock) = &state.scorer_lock {
            if lock.holder != holder && !lock.is_expired(self.now()) {
                return Err(MatchError::LockHeldByOther {
                    holder: lock.holder.clone(),
                    expires_at: lock.expires_at,
                }
                .into());
            }
        }

        let removed = self.store.remove(id)?;
        tracing::info!(match_id = %id, "match deleted");
        Ok(removed)
    }

    /// Pretty JSON of the full stored state
    pub fn export_snapshot(&self, id: &MatchId) -> Result<String> {
        export::snapshot_json(&self.load(id)?)
    }

    pub fn export_ball_log_table(&self, id: &MatchId) -> Result<Vec<BallLogRow>> {
        export::ball_log_rows(&self.load(id)?)
    }

    pub fn export_ball_log_csv(&self, id: &MatchId) -> Result<String> {
        export::ball_log_csv(&self.export_ball_log_table(id)?)
    }

    /// Batting and bowling totals across every stored match
    pub fn player_totals(&self) -> Result<Vec<PlayerTotals>> {
        Ok(export::player_totals(&self.list()?))
    }
}
