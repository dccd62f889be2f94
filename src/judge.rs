use crate::error::Result;
use crate::game::{Action, Verdict};
use crate::spot::Spot;

/// Judges `user_action` against the round's reference action.
///
/// Correctness means matching the reference exactly; a user action that
/// merely has some frequency in the strategy is still wrong. EV loss is
/// measured against the best EV, or against the best frequency as a proxy
/// when the spot has no EVs. An action without a listed EV loses everything.
pub fn evaluate(spot: &Spot, user_action: &str, reference: Action) -> Result<Verdict> {
    Ok(judge(spot, user_action.parse()?, reference))
}

/// [`evaluate`] for an already parsed action.
pub fn judge(spot: &Spot, action: Action, reference: Action) -> Verdict {
    Verdict {
        correct: action == reference,
        ev_loss: ev_loss(spot, action),
    }
}

pub fn ev_loss(spot: &Spot, action: Action) -> f64 {
    if let Some(best) = spot.best_ev() {
        (best - spot.ev_of(action)).max(0.0)
    } else if let Some(best) = spot.best_frequency() {
        (best - spot.frequency_of(action)).max(0.0)
    } else {
        0.0
    }
}
