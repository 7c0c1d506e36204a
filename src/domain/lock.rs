//! Scorer lease
//!
//! Only one scorer may drive a match at a time. A scorer takes a lease for a
//! fixed duration; once it lapses anyone may take it over. Expiry is checked
//! lazily whenever the lease is consulted, so nothing runs in the background.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::error::MatchError;
use super::match_state::Match;

/// Default lease length in minutes
pub const DEFAULT_LEASE_MINUTES: u32 = 15;

/// A time-boxed claim on scoring a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorerLock {
    #[serde(rename = "locked_by")]
    pub holder: String,
    #[serde(rename = "locked_at")]
    pub acquired_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ScorerLock {
    pub fn new(holder: impl Into<String>, now: DateTime<Utc>, lease: Duration) -> Self {
        Self {
            holder: holder.into(),
            acquired_at: now,
            expires_at: now + lease,
        }
    }

    /// A lease whose expiry is before `now` may be reclaimed by anyone
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    pub fn is_held_by(&self, holder: &str, now: DateTime<Utc>) -> bool {
        self.holder == holder && !self.is_expired(now)
    }

    /// Time left on the lease, zero once expired
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).max(Duration::zero())
    }
}

impl Match {
    /// Installs a lease for `holder`.
    ///
    /// Succeeds when there is no lease, when the current one has expired, or
    /// when `holder` already owns it (which refreshes the expiry).
    pub fn try_acquire_lock(
        &mut self,
        holder: &str,
        now: DateTime<Utc>,
        lease: Duration,
    ) -> Result<(), MatchError> {
        if let Some(lock) = &self.scorer_lock {
            if lock.holder != holder && !lock.is_expired(now) {
                return Err(MatchError::LockHeldByOther {
                    holder: lock.holder.clone(),
                    expires_at: lock.expires_at,
                });
            }
        }

        self.scorer_lock = Some(ScorerLock::new(holder, now, lease));
        Ok(())
    }

    /// Clears the lease if `holder` owns it. Non-holders get `false`.
    pub fn release_lock(&mut self, holder: &str) -> bool {
        match &self.scorer_lock {
            Some(lock) if lock.holder == holder => {
                self.scorer_lock = None;
                true
            }
            _ => false,
        }
    }

    /// Pushes the holder's expiry out to `now + lease`
    pub fn extend_lock(
        &mut self,
        holder: &str,
        now: DateTime<Utc>,
        lease: Duration,
    ) -> Result<(), MatchError> {
        self.require_lock(holder, now)?;
        if let Some(lock) = self.scorer_lock.as_mut() {
            lock.expires_at = now + lease;
        }
        Ok(())
    }

    /// Fails unless `holder` owns an unexpired lease
    pub fn require_lock(&self, holder: &str, now: DateTime<Utc>) -> Result<(), MatchError> {
        match &self.scorer_lock {
            Some(lock) if lock.is_held_by(holder, now) => Ok(()),
            _ => Err(MatchError::LockNotHeld(holder.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::match_state::NewMatch;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 3, 10, 0, 0).unwrap()
    }

    fn lease() -> Duration {
        Duration::minutes(i64::from(DEFAULT_LEASE_MINUTES))
    }

    fn fixture() -> Match {
        Match::new(
            NewMatch {
                title: "Lock test".into(),
                overs_limit: 5,
                team_a: vec!["A1".into(), "A2".into()],
                team_b: vec!["B1".into(), "B2".into()],
                ..Default::default()
            },
            start(),
        )
        .unwrap()
    }

    #[test]
    fn acquire_when_free() {
        let mut m = fixture();
        m.try_acquire_lock("alice", start(), lease()).unwrap();

        let lock = m.scorer_lock.as_ref().unwrap();
        assert_eq!(lock.holder, "alice");
        assert_eq!(lock.expires_at, start() + lease());
    }

    #[test]
    fn contention_fails_until_expiry() {
        let mut m = fixture();
        m.try_acquire_lock("alice", start(), lease()).unwrap();

        let during = start() + Duration::minutes(10);
        let err = m.try_acquire_lock("bob", during, lease()).unwrap_err();
        assert!(matches!(err, MatchError::LockHeldByOther { ref holder, .. } if holder == "alice"));

        // Exactly at expiry the lease is still valid
        let at_expiry = start() + lease();
        assert!(m.try_acquire_lock("bob", at_expiry, lease()).is_err());

        let after = at_expiry + Duration::seconds(1);
        m.try_acquire_lock("bob", after, lease()).unwrap();
        assert_eq!(m.scorer_lock.as_ref().unwrap().holder, "bob");
    }

    #[test]
    fn holder_reacquire_refreshes() {
        let mut m = fixture();
        m.try_acquire_lock("alice", start(), lease()).unwrap();

        let later = start() + Duration::minutes(12);
        m.try_acquire_lock("alice", later, lease()).unwrap();
        assert_eq!(m.scorer_lock.as_ref().unwrap().expires_at, later + lease());
    }

    #[test]
    fn release_only_by_holder() {
        let mut m = fixture();
        m.try_acquire_lock("alice", start(), lease()).unwrap();

        assert!(!m.release_lock("bob"));
        assert!(m.scorer_lock.is_some());

        assert!(m.release_lock("alice"));
        assert!(m.scorer_lock.is_none());
        assert!(!m.release_lock("alice"));
    }

    #[test]
    fn extend_requires_live_lease() {
        let mut m = fixture();
        assert!(matches!(
            m.extend_lock("alice", start(), lease()),
            Err(MatchError::LockNotHeld(_))
        ));

        m.try_acquire_lock("alice", start(), lease()).unwrap();
        let later = start() + Duration::minutes(14);
        m.extend_lock("alice", later, lease()).unwrap();
        assert_eq!(m.scorer_lock.as_ref().unwrap().expires_at, later + lease());

        let expired = later + lease() + Duration::seconds(1);
        assert!(m.extend_lock("alice", expired, lease()).is_err());
    }

    #[test]
    fn remaining_never_negative() {
        let lock = ScorerLock::new("alice", start(), lease());
        assert_eq!(lock.remaining(start()), lease());
        assert_eq!(lock.remaining(start() + Duration::hours(1)), Duration::zero());
    }
}
