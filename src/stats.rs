use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::game::{Action, Verdict};

/// Running totals for a session. The session mutates these only through `record`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct SessionStats {
    pub total: u32,
    pub correct: u32,
    pub ev_loss: f64,
}

impl SessionStats {
    pub fn record(&mut self, correct: bool, ev_loss: f64) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
        self.ev_loss += ev_loss;
    }

    /// Share of correct rounds; 0.0 before the first round.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(self.total)
        }
    }
}

/// History entry written once per completed round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundRecord {
    pub board: Vec<String>,
    pub hole_cards: BTreeMap<String, [String; 2]>,
    pub action: Action,
    pub correct: bool,
    pub reference: Action,
    pub ev_loss: f64,
}

impl RoundRecord {
    pub(crate) fn new(
        board: &[String],
        hole_cards: &BTreeMap<String, [String; 2]>,
        action: Action,
        reference: Action,
        verdict: Verdict,
    ) -> Self {
        Self {
            board: board.to_vec(),
            hole_cards: hole_cards.clone(),
            action,
            correct: verdict.correct,
            reference,
            ev_loss: verdict.ev_loss,
        }
    }
}
