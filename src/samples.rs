use crate::game::Action::{Call, Fold, Raise};
use crate::spot::Spot;

fn cards(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

fn hole(player: &str, first: &str, second: &str) -> (String, [String; 2]) {
    (player.to_string(), [first.to_string(), second.to_string()])
}

fn stacks(btn: f64, bb: f64) -> [(String, f64); 2] {
    [("BTN".to_string(), btn), ("BB".to_string(), bb)]
}

/// Built-in BTN vs BB flop spots with approximate frequencies and EVs.
pub fn sample_spots() -> Vec<Spot> {
    vec![
        Spot::new(
            "BTN vs BB",
            stacks(50.0, 50.0),
            cards(&["Ah", "7c", "2h"]),
            [hole("BTN", "Ad", "Kd"), hole("BB", "9h", "8h")],
            [(Fold, 0.05), (Call, 0.60), (Raise, 0.35)],
        )
        .with_evs([(Fold, -1.0), (Call, 3.5), (Raise, 4.0)]),
        Spot::new(
            "BTN vs BB",
            stacks(40.0, 40.0),
            cards(&["Kc", "Qd", "6s"]),
            [hole("BTN", "9h", "9d"), hole("BB", "Ad", "Qs")],
            [(Fold, 0.20), (Call, 0.50), (Raise, 0.30)],
        )
        .with_evs([(Fold, -2.0), (Call, 1.5), (Raise, 2.0)]),
        Spot::new(
            "BTN vs BB",
            stacks(60.0, 60.0),
            cards(&["Ts", "8s", "4d"]),
            [hole("BTN", "As", "Jh"), hole("BB", "Td", "9d")],
            [(Fold, 0.30), (Call, 0.40), (Raise, 0.30)],
        )
        .with_evs([(Fold, -1.5), (Call, 0.8), (Raise, 1.2)]),
    ]
}
