use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use itertools::Itertools;
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};

use crate::cards::{Card, render_token};
use crate::error;
use crate::game::{Action, ReviewLine};
use crate::pool::{RandomPool, load_spots};
use crate::reference;
use crate::samples::sample_spots;
use crate::session::{CONTINUE_PROMPT, InputSource, Reporter, RoundOutcome, Session, SessionConfig};
use crate::spot::Spot;
use crate::stats::SessionStats;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrainerConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub no_color: bool,
    /// JSON spot table; the built-in samples are used when absent.
    pub spots: Option<PathBuf>,
}

pub struct Trainer {
    config: TrainerConfig,
    session: Session,
    pool: RandomPool,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Result<Self> {
        let spots = match &config.spots {
            Some(path) => load_spots(path)
                .with_context(|| format!("loading spots from {}", path.display()))?,
            None => sample_spots(),
        };
        // Keep the pool's draws independent of the reference sampler.
        let pool = RandomPool::seeded(spots, config.session.seed.map(|seed| seed.wrapping_add(1)));
        let session = Session::new(config.session);
        Ok(Self {
            config,
            session,
            pool,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn run(&mut self) -> Result<SessionStats> {
        let stdin = io::stdin();
        self.run_with(stdin.lock(), io::stdout().lock())
    }

    /// Drives an interactive session over arbitrary streams.
    pub fn run_with<I: BufRead, W: Write>(&mut self, input: I, output: W) -> Result<SessionStats> {
        let mut terminal = Terminal::new(input, output, self.config.no_color);
        let stats = self.session.run(&mut self.pool, &mut terminal)?;
        terminal.summary(&stats)?;
        Ok(stats)
    }

    /// Plays `rounds` rounds answering with the best action each time.
    pub fn autoplay_best(&mut self, rounds: u32) -> Result<SessionStats> {
        let terminal = Terminal::new(io::empty(), io::stdout().lock(), self.config.no_color);
        let mut pilot = AutoPilot {
            terminal,
            remaining: rounds.max(1),
        };
        let stats = self.session.run(&mut self.pool, &mut pilot)?;
        pilot.terminal.summary(&stats)?;
        Ok(stats)
    }
}

/// Line-oriented front end over any reader/writer pair.
pub struct Terminal<I, W> {
    input: I,
    output: W,
    no_color: bool,
    line: String,
}

impl<I: BufRead, W: Write> Terminal<I, W> {
    pub fn new(input: I, output: W, no_color: bool) -> Self {
        Self {
            input,
            output,
            no_color,
            line: String::new(),
        }
    }

    pub fn summary(&mut self, stats: &SessionStats) -> error::Result<()> {
        if self.no_color {
            writeln!(
                self.output,
                "Summary: rounds={}, correct={}, accuracy={:.1}%, EV loss={:.2}",
                stats.total,
                stats.correct,
                stats.accuracy() * 100.0,
                stats.ev_loss
            )?;
        } else {
            writeln!(
                self.output,
                "{} {} {} {:.1}% {} {:.2}",
                "Summary".bold().magenta(),
                stats.total,
                "Accuracy".bold().white(),
                stats.accuracy() * 100.0,
                "EV loss".bold().white(),
                stats.ev_loss
            )?;
        }
        Ok(())
    }

    /// Next trimmed input line, `None` once input is exhausted.
    fn read_line(&mut self) -> error::Result<Option<String>> {
        self.line.clear();
        if self.input.read_line(&mut self.line)? == 0 {
            return Ok(None);
        }
        Ok(Some(self.line.trim().to_string()))
    }

    fn prompt(&mut self, text: &str) -> error::Result<()> {
        write!(self.output, "{text}")?;
        self.output.flush()?;
        Ok(())
    }

    fn label(&self, text: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            text.bold().white().to_string()
        }
    }

    fn card(&self, token: &str) -> String {
        let glyph = render_token(token);
        let red = token.parse::<Card>().is_ok_and(|card| card.suit.is_red());
        if self.no_color || !red {
            glyph
        } else {
            glyph.red().to_string()
        }
    }

    fn cards(&self, tokens: &[String]) -> String {
        if tokens.is_empty() {
            "--".to_string()
        } else {
            tokens.iter().map(|token| self.card(token)).join(" ")
        }
    }

    fn help(&mut self) -> error::Result<()> {
        writeln!(self.output, "Available actions:")?;
        for action in Action::ALL {
            writeln!(self.output, "  {}", action.label())?;
        }
        writeln!(self.output, "Type an action name, or 'h' to view this help.")?;
        Ok(())
    }
}

impl<I: BufRead, W: Write> InputSource for Terminal<I, W> {
    fn request_action(&mut self, _spot: &Spot) -> error::Result<String> {
        loop {
            self.prompt("Your action [fold/call/raise] (h=help): ")?;
            let Some(line) = self.read_line()? else {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input closed before an action was chosen",
                )
                .into());
            };
            if line.eq_ignore_ascii_case("h") {
                self.help()?;
                continue;
            }
            match line.parse::<Action>() {
                Ok(action) => return Ok(action.to_string()),
                Err(_) => writeln!(
                    self.output,
                    "Invalid action '{line}'. Choose fold, call or raise."
                )?,
            }
        }
    }

    fn request_yes_no(&mut self, prompt: &str) -> error::Result<bool> {
        self.prompt(&format!("{prompt} (y/n): "))?;
        Ok(self
            .read_line()?
            .is_some_and(|answer| matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes")))
    }
}

impl<I: BufRead, W: Write> Reporter for Terminal<I, W> {
    fn spot(&mut self, round: u32, spot: &Spot) -> error::Result<()> {
        let stacks = spot
            .stacks()
            .iter()
            .map(|(player, chips)| format!("{player} {chips}"))
            .join(", ");
        let holes = spot
            .hole_cards()
            .iter()
            .map(|(player, cards)| format!("{player} {}", self.cards(cards)))
            .join(", ");
        let round_label = if self.no_color {
            "Round".to_string()
        } else {
            "Round".bold().cyan().to_string()
        };
        let board = self.cards(spot.board());
        let (stacks_label, board_label, hole_label) =
            (self.label("Stacks"), self.label("Board"), self.label("Hole"));
        writeln!(
            self.output,
            "{round_label} {round} | {} | {stacks_label} {stacks} | {board_label} {board} | {hole_label} {holes}",
            spot.positions(),
        )?;
        Ok(())
    }

    fn verdict(&mut self, outcome: &RoundOutcome) -> error::Result<()> {
        if outcome.verdict.correct {
            let text = format!("Correct! {} matches the reference action.", outcome.action);
            if self.no_color {
                writeln!(self.output, "{text}")?;
            } else {
                writeln!(self.output, "{}", text.green())?;
            }
        } else {
            let text = format!(
                "Incorrect. Reference action: {} (EV loss {:.2})",
                outcome.reference, outcome.verdict.ev_loss
            );
            if self.no_color {
                writeln!(self.output, "{text}")?;
            } else {
                writeln!(self.output, "{}", text.red())?;
            }
        }
        Ok(())
    }

    fn review(&mut self, lines: &[ReviewLine]) -> error::Result<()> {
        let header = self.label("GTO strategy:");
        writeln!(self.output, "{header}")?;
        for line in lines {
            let ev = line
                .ev
                .map(|ev| format!("{ev:.2}"))
                .unwrap_or_else(|| "--".to_string());
            writeln!(
                self.output,
                "  {:<6} {:>5.1}%  EV {}",
                line.action.label(),
                line.frequency * 100.0,
                ev
            )?;
        }
        Ok(())
    }

    fn stats(&mut self, stats: &SessionStats) -> error::Result<()> {
        writeln!(
            self.output,
            "Session stats -> Rounds: {}, Accuracy: {:.1}%, EV Loss: {:.2}",
            stats.total,
            stats.accuracy() * 100.0,
            stats.ev_loss
        )?;
        Ok(())
    }
}

/// Answers every prompt itself: best action, always review, and continue
/// until the round budget is spent.
struct AutoPilot<W> {
    terminal: Terminal<io::Empty, W>,
    remaining: u32,
}

impl<W: Write> InputSource for AutoPilot<W> {
    fn request_action(&mut self, spot: &Spot) -> error::Result<String> {
        let action = reference::best_action(spot)?;
        writeln!(self.terminal.output, "Your action: {action}")?;
        Ok(action.to_string())
    }

    fn request_yes_no(&mut self, prompt: &str) -> error::Result<bool> {
        if prompt != CONTINUE_PROMPT {
            return Ok(true);
        }
        self.remaining = self.remaining.saturating_sub(1);
        Ok(self.remaining > 0)
    }
}

impl<W: Write> Reporter for AutoPilot<W> {
    fn spot(&mut self, round: u32, spot: &Spot) -> error::Result<()> {
        self.terminal.spot(round, spot)
    }

    fn verdict(&mut self, outcome: &RoundOutcome) -> error::Result<()> {
        self.terminal.verdict(outcome)
    }

    fn review(&mut self, lines: &[ReviewLine]) -> error::Result<()> {
        self.terminal.review(lines)
    }

    fn stats(&mut self, stats: &SessionStats) -> error::Result<()> {
        self.terminal.stats(stats)
    }
}
