use anyhow::{Context, Result};
use clap::Parser;
use game2048::engine::Game;
use game2048::render::render;
use game2048::state::GameState;
use game2048::utils::parse_moves;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Replay a sequence of 2048 moves on a seeded game", long_about = None)]
struct Args {
    /// Seed for tile spawns
    #[clap(short, long, default_value_t = 0)]
    seed: u64,

    /// Snapshot file to start from instead of a fresh game
    #[clap(long)]
    state: Option<PathBuf>,

    /// Where to save the final snapshot as JSON
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Print the board without colors
    #[clap(long)]
    no_color: bool,

    /// Moves to play, one letter each: U, D, L, R (e.g. "LLURD")
    moves: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let moves = parse_moves(&args.moves).map_err(anyhow::Error::msg)?;
    let colored = !args.no_color;

    let mut game = Game::with_seed(args.seed);
    if let Some(path) = &args.state {
        let saved = GameState::load(path)
            .with_context(|| format!("Failed to read game state from {}", path.display()))?;
        game.apply(&saved)
            .with_context(|| format!("Game state in {} is not usable", path.display()))?;
        info!(path = %path.display(), "Loaded starting state");
    }

    println!("Initial state:\n{}", render(&game.snapshot(), colored));

    let mut played = 0;
    for (i, direction) in moves.iter().enumerate() {
        let outcome = game.process_move(*direction);
        played += 1;
        println!("Move {}: {} -> {:?} (score {})", i + 1, direction, outcome, game.score());
        if outcome.is_terminal() {
            break;
        }
    }
    if played < moves.len() {
        println!("Game over; {} remaining moves skipped.", moves.len() - played);
    }

    println!("\nFinal state:\n{}", render(&game.snapshot(), colored));

    if let Some(path) = &args.output {
        game.snapshot()
            .save(path)
            .with_context(|| format!("Failed to write game state to {}", path.display()))?;
        println!("Saved final state to {}", path.display());
    }
    Ok(())
}
