use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use spot_drill::web;
use spot_drill::{SessionConfig, Trainer, TrainerConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "spot-drill",
    version,
    about = "Poker spot drill: pick an action, get judged against the GTO strategy",
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Automatically show the GTO strategy after an incorrect answer
    #[arg(long = "learning-mode", default_value_t = false)]
    learning_mode: bool,

    /// Pick the correct action at random according to the GTO frequencies
    #[arg(long = "randomized-reference", alias = "rng-training", default_value_t = false)]
    randomized_reference: bool,

    /// RNG seed (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file with the spots to drill (built-in samples if omitted)
    #[arg(long)]
    spots: Option<PathBuf>,

    /// Disable ANSI colors in CLI output
    #[arg(long = "no-color", default_value_t = false)]
    no_color: bool,

    /// Auto-play this many rounds using the best action (useful for smoke tests)
    #[arg(long, value_name = "ROUNDS")]
    auto: Option<u32>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the web server
    Serve {
        /// Address to bind (HOST:PORT)
        #[arg(long, default_value = "0.0.0.0:8080")]
        addr: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = color_eyre::install();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { addr }) => run_server(addr).await?,
        None => run_cli(cli)?,
    }

    Ok(())
}

fn run_cli(cli: Cli) -> Result<()> {
    let config = TrainerConfig {
        session: SessionConfig {
            learning_mode: cli.learning_mode,
            randomized_reference: cli.randomized_reference,
            seed: cli.seed,
        },
        no_color: cli.no_color,
        spots: cli.spots,
    };
    let mut trainer = Trainer::new(config)?;
    match cli.auto {
        Some(rounds) => trainer.autoplay_best(rounds)?,
        None => trainer.run()?,
    };
    Ok(())
}

async fn run_server(addr: String) -> Result<()> {
    let addr: SocketAddr = addr.parse()?;
    web::serve(addr).await
}
