use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use blackjack_env::{config::INFINITE_DECKS, play, BlackjackGame, EnvConfig, Variant};
use clap::{Parser, ValueEnum};
use tracing::{info, Level};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum VariantArg {
    Standard,
    Manual,
}

impl From<VariantArg> for Variant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Standard => Variant::Standard,
            VariantArg::Manual => Variant::Manual,
        }
    }
}

/// Play Blackjack against the dealer in the terminal.
#[derive(Debug, Parser)]
#[command(name = "blackjack", version)]
struct Args {
    /// JSON file with environment settings; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Decks in the shoe, or -1 for an infinite shoe.
    #[arg(long, allow_negative_numbers = true)]
    decks: Option<i32>,

    #[arg(long, value_enum)]
    variant: Option<VariantArg>,

    /// Seed for a reproducible shoe.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = Level::from_str(&args.log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => EnvConfig::from_file(path)
            .with_context(|| format!("could not load config from {}", path.display()))?,
        None => EnvConfig::default(),
    };
    if let Some(decks) = args.decks {
        config.num_decks = decks;
    }
    if let Some(variant) = args.variant {
        config.variant = variant.into();
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let mut game = BlackjackGame::from_config(&config).context("invalid configuration")?;
    info!(
        decks = config.num_decks,
        infinite = config.num_decks == INFINITE_DECKS,
        variant = config.variant.name(),
        "starting session"
    );

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    let summary = play::run_session(&mut game, &mut input, &mut output)?;
    info!(rounds = summary.rounds, net = summary.total_reward, "session ended");
    Ok(())
}
