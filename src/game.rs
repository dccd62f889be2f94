use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The closed action set every spot supports. Variant order is the canonical
/// order: it breaks ties during resolution and orders review tables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Fold,
    Call,
    Raise,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Fold, Action::Call, Action::Raise];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Fold => "fold",
            Action::Call => "call",
            Action::Raise => "raise",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::Fold => "Fold",
            Action::Call => "Call",
            Action::Raise => "Raise",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = Error;

    /// Accepts any casing and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fold" => Ok(Action::Fold),
            "call" => Ok(Action::Call),
            "raise" => Ok(Action::Raise),
            _ => Err(Error::InvalidAction(s.trim().to_string())),
        }
    }
}

/// One row of the strategy review shown after a missed spot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewLine {
    pub action: Action,
    pub frequency: f64,
    pub ev: Option<f64>,
}

/// Outcome of judging a single user action.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Verdict {
    pub correct: bool,
    pub ev_loss: f64,
}
