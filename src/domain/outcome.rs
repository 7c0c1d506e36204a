//! Delivery outcomes
//!
//! A delivery is described by a closed set of outcome codes plus the
//! quantities that only make sense for some of them (runs on a wide, runs off
//! the bat on a no-ball, the incoming batter after a wicket).
//!
//! Codes, case-insensitive:
//!
//! | Code | Meaning | Legal ball |
//! |------|---------|------------|
//! | `0`-`4`, `6` (`dot` = `0`) | runs off the bat | yes |
//! | `W` / `Wicket` | striker dismissed | yes |
//! | `WD` / `Wide` | wide | no |
//! | `NB` / `NoBall` | no-ball | no |
//! | `BY` / `Bye` | byes | yes |
//! | `LB` / `LegBye` | leg-byes | yes |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::MatchError;

/// Most runs a scorer may award on one wide, no-ball, bye or leg-bye
pub const MAX_EXTRA_RUNS: u32 = 10;

/// Outcome of a single delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Outcome {
    /// Runs off the bat: one of 0, 1, 2, 3, 4, 6
    Runs(u8),
    Wicket,
    Wide,
    NoBall,
    Bye,
    LegBye,
}

impl Outcome {
    /// Run values that can be scored off the bat in a single code
    pub const RUN_VALUES: [u8; 6] = [0, 1, 2, 3, 4, 6];

    /// Creates a runs outcome, rejecting values that have no code (5, 7, ...)
    pub fn runs(value: u8) -> Result<Self, MatchError> {
        if Self::RUN_VALUES.contains(&value) {
            Ok(Outcome::Runs(value))
        } else {
            Err(MatchError::UnknownOutcome(value.to_string()))
        }
    }

    /// Returns true if the delivery counts toward the six-ball over
    pub fn is_legal(&self) -> bool {
        !matches!(self, Outcome::Wide | Outcome::NoBall)
    }

    /// Returns the canonical short code
    pub fn code(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Runs(n) => write!(f, "{}", n),
            Outcome::Wicket => write!(f, "W"),
            Outcome::Wide => write!(f, "WD"),
            Outcome::NoBall => write!(f, "NB"),
            Outcome::Bye => write!(f, "BY"),
            Outcome::LegBye => write!(f, "LB"),
        }
    }
}

impl FromStr for Outcome {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        match code.to_ascii_uppercase().as_str() {
            "DOT" => Ok(Outcome::Runs(0)),
            "W" | "WICKET" => Ok(Outcome::Wicket),
            "WD" | "WIDE" => Ok(Outcome::Wide),
            "NB" | "NOBALL" => Ok(Outcome::NoBall),
            "BY" | "BYE" => Ok(Outcome::Bye),
            "LB" | "LEGBYE" => Ok(Outcome::LegBye),
            digits => digits
                .parse::<u8>()
                .ok()
                .and_then(|n| Outcome::runs(n).ok())
                .ok_or_else(|| MatchError::UnknownOutcome(code.to_string())),
        }
    }
}

impl TryFrom<String> for Outcome {
    type Error = MatchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Outcome> for String {
    fn from(outcome: Outcome) -> Self {
        outcome.to_string()
    }
}

fn is_zero(val: &u32) -> bool {
    *val == 0
}

/// Outcome-specific quantities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extras {
    /// Total runs awarded on a wide, or runs taken as byes / leg-byes.
    /// Defaults to 1 when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs: Option<u32>,

    /// Runs scored off the bat from a no-ball
    #[serde(default, skip_serializing_if = "is_zero")]
    pub runs_off_bat: u32,
}

impl Extras {
    /// Runs awarded for a wide, bye or leg-bye
    pub fn awarded(&self) -> u32 {
        self.runs.unwrap_or(1)
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_none() && self.runs_off_bat == 0
    }
}

/// Detail recorded with a wicket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WicketInfo {
    /// Incoming batter; picked from the batting order when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_batter: Option<String>,

    /// Free-text mode of dismissal ("bowled", "caught at slip", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub how: Option<String>,
}

/// One ball as entered by the scorer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub outcome: Outcome,

    #[serde(default)]
    pub extras: Extras,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wicket: Option<WicketInfo>,
}

impl Delivery {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            extras: Extras::default(),
            wicket: None,
        }
    }

    /// Parses an outcome code into a delivery with no extras
    pub fn parse(code: &str) -> Result<Self, MatchError> {
        Ok(Self::new(code.parse()?))
    }

    /// Sets the run count for a wide, bye or leg-bye
    pub fn with_runs(mut self, runs: u32) -> Self {
        self.extras.runs = Some(runs);
        self
    }

    /// Sets the off-the-bat runs for a no-ball
    pub fn with_runs_off_bat(mut self, runs: u32) -> Self {
        self.extras.runs_off_bat = runs;
        self
    }

    /// Names the batter coming in after a wicket
    pub fn with_new_batter(mut self, name: impl Into<String>) -> Self {
        self.wicket.get_or_insert_with(WicketInfo::default).new_batter = Some(name.into());
        self
    }

    /// Records how the batter was dismissed
    pub fn with_dismissal(mut self, how: impl Into<String>) -> Self {
        self.wicket.get_or_insert_with(WicketInfo::default).how = Some(how.into());
        self
    }

    /// Explicitly named incoming batter, if any
    pub fn new_batter(&self) -> Option<&str> {
        self.wicket.as_ref().and_then(|w| w.new_batter.as_deref())
    }

    /// Rejects run counts no single ball can produce
    pub fn check_extras(&self) -> Result<(), MatchError> {
        let runs = self.extras.runs.unwrap_or(0).max(self.extras.runs_off_bat);
        if runs > MAX_EXTRA_RUNS {
            return Err(MatchError::InvalidExtras {
                runs,
                max: MAX_EXTRA_RUNS,
            });
        }
        Ok(())
    }
}
