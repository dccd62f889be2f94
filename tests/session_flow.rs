use std::collections::VecDeque;

use spot_drill::game::{Action, ReviewLine};
use spot_drill::pool::{RandomPool, SpotPool};
use spot_drill::samples::sample_spots;
use spot_drill::session::{
    CONTINUE_PROMPT, InputSource, REVIEW_PROMPT, Reporter, RoundOutcome, Session, SessionConfig,
};
use spot_drill::stats::SessionStats;
use spot_drill::{Error, Phase, Spot};

/// Replays canned answers and records everything it is shown.
#[derive(Default)]
struct Script {
    actions: VecDeque<&'static str>,
    answers: VecDeque<bool>,
    prompts: Vec<String>,
    spots: Vec<u32>,
    outcomes: Vec<RoundOutcome>,
    reviews: Vec<Vec<ReviewLine>>,
    stats: Vec<SessionStats>,
}

impl Script {
    fn new(actions: &[&'static str], answers: &[bool]) -> Self {
        Self {
            actions: actions.iter().copied().collect(),
            answers: answers.iter().copied().collect(),
            ..Self::default()
        }
    }
}

impl InputSource for Script {
    fn request_action(&mut self, _spot: &Spot) -> spot_drill::Result<String> {
        Ok(self.actions.pop_front().expect("scripted action").to_string())
    }

    fn request_yes_no(&mut self, prompt: &str) -> spot_drill::Result<bool> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front().unwrap_or(false))
    }
}

impl Reporter for Script {
    fn spot(&mut self, round: u32, _spot: &Spot) -> spot_drill::Result<()> {
        self.spots.push(round);
        Ok(())
    }

    fn verdict(&mut self, outcome: &RoundOutcome) -> spot_drill::Result<()> {
        self.outcomes.push(outcome.clone());
        Ok(())
    }

    fn review(&mut self, lines: &[ReviewLine]) -> spot_drill::Result<()> {
        self.reviews.push(lines.to_vec());
        Ok(())
    }

    fn stats(&mut self, stats: &SessionStats) -> spot_drill::Result<()> {
        self.stats.push(*stats);
        Ok(())
    }
}

/// Always hands out the same spot.
struct FixedPool(Spot);

impl SpotPool for FixedPool {
    fn choose(&mut self) -> spot_drill::Result<Spot> {
        Ok(self.0.clone())
    }
}

fn raise_spot() -> Spot {
    sample_spots().remove(0)
}

fn session(learning_mode: bool) -> Session {
    Session::new(SessionConfig {
        learning_mode,
        randomized_reference: false,
        seed: Some(42),
    })
}

#[test]
fn missed_spot_offers_review_and_yes_shows_the_table() {
    let mut session = session(false);
    assert_eq!(session.phase(), Phase::AwaitingSpot);
    assert_eq!(session.stats().accuracy(), 0.0);

    session.present(raise_spot()).expect("spot resolves");
    assert_eq!(session.phase(), Phase::AwaitingUserAction);

    let outcome = session.submit_action("call").expect("call is valid");
    assert!(!outcome.verdict.correct);
    assert_eq!(outcome.reference, Action::Raise);
    assert!(outcome.review_offered);
    assert!(outcome.review.is_none());
    assert_eq!(session.stats().total, 1);
    assert_eq!(session.stats().correct, 0);
    assert_eq!(session.phase(), Phase::ReviewOffered);

    let review = session.answer_review(true).unwrap().expect("review shown");
    assert_eq!(review, raise_spot().review());
    assert_eq!(review.len(), 3);
    assert_eq!(session.phase(), Phase::AwaitingContinueDecision);
}

#[test]
fn declining_the_review_skips_it() {
    let mut session = session(false);
    session.present(raise_spot()).unwrap();
    session.submit_action("fold").unwrap();
    assert_eq!(session.answer_review(false).unwrap(), None);
    assert_eq!(session.phase(), Phase::AwaitingContinueDecision);
}

#[test]
fn learning_mode_shows_review_without_asking() {
    let mut session = session(true);
    session.present(raise_spot()).unwrap();
    let outcome = session.submit_action("fold").unwrap();

    assert!(!outcome.review_offered);
    assert_eq!(outcome.review, Some(raise_spot().review()));
    assert_eq!(session.phase(), Phase::AwaitingContinueDecision);
}

#[test]
fn correct_round_goes_straight_to_continue_decision() {
    let mut session = session(false);
    session.present(raise_spot()).unwrap();
    let outcome = session.submit_action("Raise").unwrap();

    assert!(outcome.verdict.correct);
    assert!(!outcome.review_offered);
    assert_eq!(session.phase(), Phase::AwaitingContinueDecision);
    assert_eq!(session.stats().accuracy(), 1.0);
}

#[test]
fn invalid_action_leaves_the_round_open() {
    let mut session = session(false);
    session.present(raise_spot()).unwrap();

    assert!(matches!(session.submit_action("check"), Err(Error::InvalidAction(_))));
    assert_eq!(session.phase(), Phase::AwaitingUserAction);
    assert_eq!(session.stats().total, 0);
    assert!(session.history().is_empty());

    assert!(session.submit_action("raise").unwrap().verdict.correct);
}

#[test]
fn out_of_order_calls_are_rejected() {
    let mut session = session(false);
    assert!(matches!(
        session.submit_action("call"),
        Err(Error::UnexpectedPhase {
            expected: Phase::AwaitingUserAction,
            actual: Phase::AwaitingSpot,
        })
    ));

    session.present(raise_spot()).unwrap();
    assert!(matches!(
        session.present(raise_spot()),
        Err(Error::UnexpectedPhase { .. })
    ));
    assert!(matches!(session.decide_continue(true), Err(Error::UnexpectedPhase { .. })));

    session.submit_action("raise").unwrap();
    assert!(matches!(session.answer_review(true), Err(Error::UnexpectedPhase { .. })));
}

#[test]
fn continue_decision_loops_or_terminates() {
    let mut session = session(false);
    session.present(raise_spot()).unwrap();
    session.submit_action("raise").unwrap();
    session.decide_continue(true).unwrap();
    assert_eq!(session.phase(), Phase::AwaitingSpot);

    session.present(raise_spot()).unwrap();
    session.submit_action("call").unwrap();
    session.answer_review(false).unwrap();
    session.decide_continue(false).unwrap();
    assert_eq!(session.phase(), Phase::Terminated);

    let stats = session.stats();
    assert_eq!((stats.total, stats.correct), (2, 1));
    assert!((stats.ev_loss - 0.5).abs() < 1e-12);
    assert!(matches!(session.present(raise_spot()), Err(Error::UnexpectedPhase { .. })));
}

#[test]
fn history_records_each_round_in_order() {
    let mut session = session(false);
    session.present(raise_spot()).unwrap();
    session.submit_action("fold").unwrap();
    session.answer_review(false).unwrap();
    session.decide_continue(true).unwrap();
    session.present(raise_spot()).unwrap();
    session.submit_action("raise").unwrap();

    let history = session.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].action, Action::Fold);
    assert!(!history[0].correct);
    assert_eq!(history[0].reference, Action::Raise);
    assert_eq!(history[0].ev_loss, 5.0);
    assert_eq!(history[0].board, vec!["Ah", "7c", "2h"]);
    assert_eq!(history[0].hole_cards["BB"], ["9h".to_string(), "8h".to_string()]);
    assert!(history[1].correct);
}

#[test]
fn malformed_spot_fails_resolution() {
    let mut session = session(false);
    let empty = Spot::new("SB vs BB", [], [], [], []);
    assert!(matches!(session.present(empty), Err(Error::NoStrategy)));
    assert_eq!(session.phase(), Phase::AwaitingSpot);
}

#[test]
fn run_asks_for_review_only_on_misses_and_stops_on_no() {
    let mut session = session(false);
    let mut pool = FixedPool(raise_spot());
    let mut io = Script::new(&["call", "raise"], &[true, true, false]);

    let stats = session.run(&mut pool, &mut io).expect("session runs");

    assert_eq!((stats.total, stats.correct), (2, 1));
    assert_eq!(io.spots, vec![1, 2]);
    assert_eq!(
        io.prompts,
        vec![REVIEW_PROMPT, CONTINUE_PROMPT, CONTINUE_PROMPT]
    );
    assert_eq!(io.reviews.len(), 1);
    assert_eq!(io.outcomes.len(), 2);
    assert_eq!(io.stats.len(), 2);
    assert_eq!(io.stats[0].total, 1);
    assert_eq!(session.phase(), Phase::Terminated);
}

#[test]
fn run_in_learning_mode_never_prompts_for_review() {
    let mut session = session(true);
    let mut pool = FixedPool(raise_spot());
    let mut io = Script::new(&["fold"], &[false]);

    session.run(&mut pool, &mut io).unwrap();

    assert_eq!(io.prompts, vec![CONTINUE_PROMPT]);
    assert_eq!(io.reviews.len(), 1);
}

#[test]
fn run_propagates_invalid_actions() {
    let mut session = session(false);
    let mut pool = FixedPool(raise_spot());
    let mut io = Script::new(&["check"], &[]);

    assert!(matches!(
        session.run(&mut pool, &mut io),
        Err(Error::InvalidAction(_))
    ));
}

#[test]
fn run_on_empty_pool_fails() {
    let mut session = session(false);
    let mut pool = RandomPool::seeded(Vec::new(), Some(1));
    let mut io = Script::default();

    assert!(matches!(session.run(&mut pool, &mut io), Err(Error::EmptyPool)));
}

#[test]
fn randomized_reference_stays_within_the_strategy() {
    let mut session = Session::new(SessionConfig {
        learning_mode: false,
        randomized_reference: true,
        seed: Some(7),
    });
    let mut references = Vec::new();
    for _ in 0..200 {
        session.present(raise_spot()).unwrap();
        let outcome = session.submit_action("call").unwrap();
        references.push(outcome.reference);
        if outcome.review_offered {
            session.answer_review(false).unwrap();
        }
        session.decide_continue(true).unwrap();
    }

    assert!(references.contains(&Action::Call));
    assert!(references.contains(&Action::Raise));
    let correct = references.iter().filter(|&&a| a == Action::Call).count() as u32;
    assert_eq!(session.stats().correct, correct);
}
