pub mod cards;
pub mod error;
pub mod game;
pub mod judge;
pub mod pool;
pub mod reference;
pub mod samples;
pub mod session;
pub mod spot;
pub mod stats;
pub mod trainer;
pub mod web;

pub use error::{Error, Result};
pub use game::{Action, ReviewLine, Verdict};
pub use session::{Phase, Session, SessionConfig};
pub use spot::Spot;
pub use trainer::{Trainer, TrainerConfig};
