//! Ball-by-ball commentary
//!
//! Each outcome falls into a [`Category`] with a fixed set of template lines.
//! A line is drawn uniformly at random, so callers should check which
//! category a line came from rather than compare exact strings.

use rand::seq::SliceRandom;
use rand::Rng;

use super::outcome::{Extras, Outcome};

/// Commentary category of an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Four,
    Six,
    Runs,
    Dot,
    Wicket,
    Wide,
    NoBall,
    Byes,
    /// Codes that are not part of the outcome set
    Generic,
}

const FOUR: &[&str] = &[
    "That's a FOUR!",
    "Cracking shot, races away for four.",
    "Finds the gap and beats the field, four runs.",
];

const SIX: &[&str] = &[
    "It's a HUGE SIX!",
    "Launched over the rope, six!",
    "Clears the boundary with ease.",
];

const RUNS: &[&str] = &[
    "Pushed into the gap and they run.",
    "Good placement, quick running between the wickets.",
    "Worked away off the pads.",
    "Nudged into the off side for a run or two.",
];

const DOT: &[&str] = &[
    "No run. Dot ball.",
    "Defended solidly.",
    "Beaten outside off, no run.",
    "Tight line, nothing doing.",
];

const WICKET: &[&str] = &[
    "Clean bowled! What a delivery.",
    "Caught! Taken safely.",
    "LBW! The finger goes up.",
    "Edged and taken behind.",
    "Run out! Direct hit.",
    "Stumped! Beaten in the flight.",
];

const WIDE: &[&str] = &[
    "Wide called.",
    "Strays down the leg side, wide.",
    "Too far outside off, signalled wide.",
];

const NO_BALL: &[&str] = &["No ball! Free hit coming up.", "Overstepped, no ball."];

const BYES: &[&str] = &[
    "Byes added to the total.",
    "Off the pad, they scamper through.",
    "Misses everything and they steal a run.",
];

const GENERIC: &[&str] = &[
    "Pressure building on the batter.",
    "The crowd is enjoying this contest.",
    "Good, tight cricket.",
];

impl Category {
    pub fn of(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Runs(4) => Category::Four,
            Outcome::Runs(6) => Category::Six,
            Outcome::Runs(0) => Category::Dot,
            Outcome::Runs(_) => Category::Runs,
            Outcome::Wicket => Category::Wicket,
            Outcome::Wide => Category::Wide,
            Outcome::NoBall => Category::NoBall,
            Outcome::Bye | Outcome::LegBye => Category::Byes,
        }
    }

    /// Category for a raw outcome code; unparseable codes are `Generic`
    pub fn from_code(code: &str) -> Self {
        code.parse::<Outcome>()
            .map(|o| Category::of(&o))
            .unwrap_or(Category::Generic)
    }

    pub fn templates(self) -> &'static [&'static str] {
        match self {
            Category::Four => FOUR,
            Category::Six => SIX,
            Category::Runs => RUNS,
            Category::Dot => DOT,
            Category::Wicket => WICKET,
            Category::Wide => WIDE,
            Category::NoBall => NO_BALL,
            Category::Byes => BYES,
            Category::Generic => GENERIC,
        }
    }

    /// Returns true if `line` was produced from this category's templates
    pub fn matches(self, line: &str) -> bool {
        self.templates().iter().any(|t| line.contains(t))
    }
}

/// Describes one delivery as `"{bowler} to {striker} — {text}"`
pub fn describe<R: Rng + ?Sized>(
    code: &str,
    striker: Option<&str>,
    bowler: Option<&str>,
    extras: &Extras,
    rng: &mut R,
) -> String {
    let category = Category::from_code(code);
    let text = category.templates().choose(rng).copied().unwrap_or_default();

    let detail = match category {
        Category::Wide | Category::Byes if extras.awarded() > 1 => {
            format!(" ({} runs)", extras.awarded())
        }
        Category::NoBall if extras.runs_off_bat > 0 => {
            format!(" ({} off the bat)", extras.runs_off_bat)
        }
        _ => String::new(),
    };

    format!(
        "{} to {} — {}{}",
        bowler.filter(|b| !b.is_empty()).unwrap_or("Bowler"),
        striker.filter(|s| !s.is_empty()).unwrap_or("Batter"),
        text,
        detail
    )
}
