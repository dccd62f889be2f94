use std::collections::BTreeMap;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::game::{Action, ReviewLine};

/// A single decision point with its reference strategy.
///
/// Strategy and EV maps are keyed by [`Action`], so every key is inside the
/// closed action set and iteration follows the canonical order. Frequencies
/// are not assumed to sum to one. A spot without EVs carries an empty map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Spot {
    positions: String,
    #[serde(deserialize_with = "non_negative_stacks")]
    stacks: BTreeMap<String, f64>,
    board: Vec<String>,
    hole_cards: BTreeMap<String, [String; 2]>,
    strategy: BTreeMap<Action, f64>,
    #[serde(default)]
    evs: BTreeMap<Action, f64>,
}

impl Spot {
    pub fn new(
        positions: impl Into<String>,
        stacks: impl IntoIterator<Item = (String, f64)>,
        board: impl IntoIterator<Item = String>,
        hole_cards: impl IntoIterator<Item = (String, [String; 2])>,
        strategy: impl IntoIterator<Item = (Action, f64)>,
    ) -> Self {
        Self {
            positions: positions.into(),
            stacks: stacks.into_iter().collect(),
            board: board.into_iter().collect(),
            hole_cards: hole_cards.into_iter().collect(),
            strategy: strategy.into_iter().collect(),
            evs: BTreeMap::new(),
        }
    }

    /// Attaches per-action EVs. Consumes the spot so it stays immutable once shared.
    pub fn with_evs(mut self, evs: impl IntoIterator<Item = (Action, f64)>) -> Self {
        self.evs = evs.into_iter().collect();
        self
    }

    pub fn positions(&self) -> &str {
        &self.positions
    }

    pub fn stacks(&self) -> &BTreeMap<String, f64> {
        &self.stacks
    }

    pub fn board(&self) -> &[String] {
        &self.board
    }

    pub fn hole_cards(&self) -> &BTreeMap<String, [String; 2]> {
        &self.hole_cards
    }

    pub fn strategy(&self) -> &BTreeMap<Action, f64> {
        &self.strategy
    }

    pub fn evs(&self) -> &BTreeMap<Action, f64> {
        &self.evs
    }

    /// Strategy frequency for a raw action name; unlisted actions have frequency 0.
    pub fn frequency(&self, action: &str) -> Result<f64> {
        Ok(self.frequency_of(action.parse()?))
    }

    /// EV for a raw action name; unlisted actions are worth negative infinity.
    pub fn ev(&self, action: &str) -> Result<f64> {
        Ok(self.ev_of(action.parse()?))
    }

    pub fn frequency_of(&self, action: Action) -> f64 {
        self.strategy.get(&action).copied().unwrap_or(0.0)
    }

    pub fn ev_of(&self, action: Action) -> f64 {
        self.evs.get(&action).copied().unwrap_or(f64::NEG_INFINITY)
    }

    pub fn best_ev(&self) -> Option<f64> {
        self.evs.values().copied().reduce(f64::max)
    }

    pub fn best_frequency(&self) -> Option<f64> {
        self.strategy.values().copied().reduce(f64::max)
    }

    /// Strategy table merged with EVs where present, in canonical action order.
    pub fn review(&self) -> Vec<ReviewLine> {
        Action::ALL
            .into_iter()
            .filter(|action| self.strategy.contains_key(action) || self.evs.contains_key(action))
            .map(|action| ReviewLine {
                action,
                frequency: self.frequency_of(action),
                ev: self.evs.get(&action).copied(),
            })
            .collect()
    }
}

/// Chip counts may be fractional but never negative.
fn non_negative_stacks<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let stacks = BTreeMap::<String, f64>::deserialize(deserializer)?;
    let invalid = stacks.iter().find(|(_, chips)| chips.is_nan() || **chips < 0.0);
    if let Some((player, chips)) = invalid {
        return Err(de::Error::custom(format!(
            "stack for {player} must be a non-negative chip count, got {chips}"
        )));
    }
    Ok(stacks)
}
