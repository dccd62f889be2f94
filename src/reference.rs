//! Picks the action a round is judged against.
//!
//! Deterministic resolution takes the highest EV, or the highest frequency
//! when the spot has no EVs. Weighted resolution draws from the strategy
//! frequencies by inverse CDF.

use std::collections::BTreeMap;

use rand::Rng;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::game::Action;
use crate::spot::Spot;

/// Highest-EV action, falling back to the highest-frequency action.
/// Ties go to the earliest action in canonical order.
pub fn best_action(spot: &Spot) -> Result<Action> {
    first_max(spot.evs())
        .or_else(|| first_max(spot.strategy()))
        .ok_or(Error::NoStrategy)
}

/// Frequency-weighted draw. `None` only when the strategy is empty.
pub fn sample_action<R: Rng + ?Sized>(spot: &Spot, rng: &mut R) -> Option<Action> {
    let draw = rng.gen_range(0.0..1.0);
    sample_with_draw(spot.strategy(), draw)
}

/// Inverse-CDF lookup for an explicit draw `u` in `[0, 1)`.
///
/// Frequencies are accumulated in canonical order and the first action whose
/// cumulative frequency reaches `u` wins. If the listed frequencies sum to
/// less than `u`, the last listed action is returned.
pub fn sample_with_draw(strategy: &BTreeMap<Action, f64>, u: f64) -> Option<Action> {
    let mut cumulative = 0.0;
    for (&action, &frequency) in strategy {
        cumulative += frequency;
        if cumulative >= u {
            return Some(action);
        }
    }
    strategy.keys().next_back().copied()
}

/// Resolves the reference action for one round.
///
/// A randomized request on a spot without strategy frequencies silently
/// uses the deterministic rule.
pub fn resolve<R: Rng + ?Sized>(spot: &Spot, randomized: bool, rng: &mut R) -> Result<Action> {
    if randomized {
        if let Some(action) = sample_action(spot, rng) {
            debug!(%action, "sampled reference action");
            return Ok(action);
        }
        warn!(positions = spot.positions(), "empty strategy, using best action");
    }
    let action = best_action(spot)?;
    debug!(%action, "resolved best action");
    Ok(action)
}

fn first_max(values: &BTreeMap<Action, f64>) -> Option<Action> {
    let mut best: Option<(Action, f64)> = None;
    for (&action, &value) in values {
        match best {
            Some((_, top)) if value <= top => {}
            _ => best = Some((action, value)),
        }
    }
    best.map(|(action, _)| action)
}
