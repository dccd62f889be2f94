use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::spot::Spot;

/// Source of spots for a session.
///
/// Implementations must choose uniformly at random, with replacement, from a
/// fixed collection and fail with [`Error::EmptyPool`] when it is empty.
pub trait SpotPool {
    fn choose(&mut self) -> Result<Spot>;
}

pub struct RandomPool<R = StdRng> {
    spots: Vec<Spot>,
    rng: R,
}

impl<R: Rng> RandomPool<R> {
    pub fn new(spots: Vec<Spot>, rng: R) -> Self {
        Self { spots, rng }
    }

    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }
}

impl RandomPool<StdRng> {
    pub fn seeded(spots: Vec<Spot>, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self::new(spots, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SpotPool for RandomPool<R> {
    fn choose(&mut self) -> Result<Spot> {
        self.spots
            .choose(&mut self.rng)
            .cloned()
            .ok_or(Error::EmptyPool)
    }
}

/// Parses a JSON array of spots.
pub fn parse_spots(json: &str) -> Result<Vec<Spot>> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_spots(path: impl AsRef<Path>) -> Result<Vec<Spot>> {
    let raw = fs::read_to_string(path)?;
    parse_spots(&raw)
}
