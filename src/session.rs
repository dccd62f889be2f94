use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::game::{Action, ReviewLine, Verdict};
use crate::judge;
use crate::pool::SpotPool;
use crate::reference;
use crate::spot::Spot;
use crate::stats::{RoundRecord, SessionStats};

pub const REVIEW_PROMPT: &str = "Show the GTO strategy for this spot?";
pub const CONTINUE_PROMPT: &str = "Continue?";

/// Configuration for a drill session, fixed once the session is built.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// Show the strategy review after every missed spot without asking.
    pub learning_mode: bool,
    /// Judge against a frequency-weighted draw instead of the best action.
    pub randomized_reference: bool,
    pub seed: Option<u64>,
}

/// Where the session is waiting. Judging a round and showing a review happen
/// inside [`Session::submit_action`] and [`Session::answer_review`], so they
/// never appear here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingSpot,
    AwaitingUserAction,
    ReviewOffered,
    AwaitingContinueDecision,
    Terminated,
}

/// Everything a collaborator needs to report one judged round.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundOutcome {
    pub round: u32,
    pub action: Action,
    pub reference: Action,
    pub verdict: Verdict,
    pub stats: SessionStats,
    /// Present when learning mode showed the review automatically.
    pub review: Option<Vec<ReviewLine>>,
    /// True when the collaborator should ask whether to show the review.
    pub review_offered: bool,
}

/// Blocking input side of a drill session.
pub trait InputSource {
    fn request_action(&mut self, spot: &Spot) -> Result<String>;
    fn request_yes_no(&mut self, prompt: &str) -> Result<bool>;
}

/// Output side of a drill session. Receives plain data only.
pub trait Reporter {
    fn spot(&mut self, round: u32, spot: &Spot) -> Result<()>;
    fn verdict(&mut self, outcome: &RoundOutcome) -> Result<()>;
    fn review(&mut self, lines: &[ReviewLine]) -> Result<()>;
    fn stats(&mut self, stats: &SessionStats) -> Result<()>;
}

#[derive(Debug)]
struct Round {
    spot: Spot,
    reference: Action,
}

pub struct Session<R = StdRng> {
    id: Uuid,
    config: SessionConfig,
    rng: R,
    phase: Phase,
    current_round: Option<Round>,
    stats: SessionStats,
    history: Vec<RoundRecord>,
}

impl Session<StdRng> {
    pub fn new(config: SessionConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Session<R> {
    pub fn with_rng(config: SessionConfig, rng: R) -> Self {
        let id = Uuid::new_v4();
        info!(
            %id,
            learning_mode = config.learning_mode,
            randomized_reference = config.randomized_reference,
            "session started"
        );
        Self {
            id,
            config,
            rng,
            phase: Phase::AwaitingSpot,
            current_round: None,
            stats: SessionStats::default(),
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    /// The spot of the round in progress, kept until the next spot is dealt.
    pub fn current_spot(&self) -> Option<&Spot> {
        self.current_round.as_ref().map(|round| &round.spot)
    }

    /// Draws the next spot from `pool` and starts a round with it.
    pub fn deal<P: SpotPool + ?Sized>(&mut self, pool: &mut P) -> Result<&Spot> {
        self.expect(Phase::AwaitingSpot)?;
        let spot = pool.choose()?;
        self.present(spot)
    }

    /// Starts a round on `spot`, resolving the action it will be judged against.
    pub fn present(&mut self, spot: Spot) -> Result<&Spot> {
        self.expect(Phase::AwaitingSpot)?;
        let reference =
            reference::resolve(&spot, self.config.randomized_reference, &mut self.rng)?;
        self.transition(Phase::AwaitingUserAction);
        let round = self.current_round.insert(Round { spot, reference });
        Ok(&round.spot)
    }

    /// Judges the user's action and records the round.
    ///
    /// An action outside fold/call/raise fails without touching the session,
    /// which keeps waiting for an action.
    pub fn submit_action(&mut self, input: &str) -> Result<RoundOutcome> {
        self.expect(Phase::AwaitingUserAction)?;
        let action: Action = input.parse()?;
        let round = self
            .current_round
            .as_ref()
            .ok_or(Error::UnexpectedPhase {
                expected: Phase::AwaitingUserAction,
                actual: Phase::AwaitingSpot,
            })?;

        let verdict = judge::judge(&round.spot, action, round.reference);
        self.stats.record(verdict.correct, verdict.ev_loss);
        self.history.push(RoundRecord::new(
            round.spot.board(),
            round.spot.hole_cards(),
            action,
            round.reference,
            verdict,
        ));
        debug!(
            %action,
            reference = %round.reference,
            correct = verdict.correct,
            ev_loss = verdict.ev_loss,
            "round judged"
        );

        let missed = !verdict.correct;
        let review = (missed && self.config.learning_mode).then(|| round.spot.review());
        let outcome = RoundOutcome {
            round: self.stats.total,
            action,
            reference: round.reference,
            verdict,
            stats: self.stats,
            review,
            review_offered: missed && !self.config.learning_mode,
        };

        self.transition(if outcome.review_offered {
            Phase::ReviewOffered
        } else {
            Phase::AwaitingContinueDecision
        });
        Ok(outcome)
    }

    /// Answers the review offer. Returns the strategy table when `show` is set.
    pub fn answer_review(&mut self, show: bool) -> Result<Option<Vec<ReviewLine>>> {
        self.expect(Phase::ReviewOffered)?;
        let review = if show {
            self.current_spot().map(Spot::review)
        } else {
            None
        };
        self.transition(Phase::AwaitingContinueDecision);
        Ok(review)
    }

    pub fn decide_continue(&mut self, keep_going: bool) -> Result<()> {
        self.expect(Phase::AwaitingContinueDecision)?;
        if keep_going {
            self.transition(Phase::AwaitingSpot);
        } else {
            self.transition(Phase::Terminated);
            info!(
                id = %self.id,
                total = self.stats.total,
                correct = self.stats.correct,
                ev_loss = self.stats.ev_loss,
                "session terminated"
            );
        }
        Ok(())
    }

    /// Runs rounds until `io` declines to continue. `io` is the front end: it
    /// both answers prompts and reports results.
    ///
    /// There is no round limit; the only way out is a "no" at the continue
    /// prompt or an error from the engine or a collaborator.
    pub fn run<P, C>(&mut self, pool: &mut P, io: &mut C) -> Result<SessionStats>
    where
        P: SpotPool + ?Sized,
        C: InputSource + Reporter + ?Sized,
    {
        while self.phase != Phase::Terminated {
            let round = self.stats.total + 1;
            let spot = self.deal(pool)?;
            io.spot(round, spot)?;
            let answer = io.request_action(spot)?;

            let outcome = self.submit_action(&answer)?;
            io.verdict(&outcome)?;
            if let Some(review) = &outcome.review {
                io.review(review)?;
            } else if outcome.review_offered {
                let show = io.request_yes_no(REVIEW_PROMPT)?;
                if let Some(review) = self.answer_review(show)? {
                    io.review(&review)?;
                }
            }
            io.stats(&self.stats)?;

            let keep_going = io.request_yes_no(CONTINUE_PROMPT)?;
            self.decide_continue(keep_going)?;
        }
        Ok(self.stats)
    }

    fn expect(&self, expected: Phase) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(Error::UnexpectedPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    fn transition(&mut self, next: Phase) {
        debug!(id = %self.id, from = ?self.phase, to = ?next, "phase change");
        self.phase = next;
    }
}
