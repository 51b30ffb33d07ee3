use anyhow::{Context, Result};
use clap::Parser;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use game2048::engine::{Direction, Game};
use game2048::render::render;
use game2048::state::GameState;
use rand::Rng;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Play 2048 in the terminal", long_about = None)]
struct Args {
    /// Seed for tile spawns; a different game every run when omitted
    #[clap(short, long)]
    seed: Option<u64>,

    /// Snapshot file to resume from (if it exists) and to save to on quit
    #[clap(long)]
    state: Option<PathBuf>,

    /// Draw tiles without colors
    #[clap(long)]
    no_color: bool,

    /// File receiving log output
    #[clap(long, default_value = "game2048.log")]
    log_file: PathBuf,
}

/// What the control loop is waiting for. None of this is known to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ShellState {
    Playing,
    ConfirmRestart,
    ConfirmQuit,
    RestartOrQuit,
}

impl ShellState {
    fn prompt(self) -> &'static str {
        match self {
            ShellState::Playing => "Arrows: move   R: restart   Q: quit",
            ShellState::ConfirmRestart => "Do you want to restart the game? [Y/N]",
            ShellState::ConfirmQuit => "Do you want to quit the game? [Y/N]",
            ShellState::RestartOrQuit => "Restart or quit the game? [R/Q]",
        }
    }
}

/// Puts the terminal in raw mode on an alternate screen until dropped.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        if let Err(err) = execute!(io::stdout(), EnterAlternateScreen, Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(err);
        }
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

fn direction_for(key: KeyCode) -> Option<Direction> {
    match key {
        KeyCode::Up => Some(Direction::Up),
        KeyCode::Down => Some(Direction::Down),
        KeyCode::Left => Some(Direction::Left),
        KeyCode::Right => Some(Direction::Right),
        _ => None,
    }
}

/// Applies one key press. Returns the next shell state, or `None` to quit.
fn handle_key<R: Rng>(game: &mut Game<R>, shell: ShellState, key: KeyCode) -> Option<ShellState> {
    if shell == ShellState::Playing {
        if let Some(direction) = direction_for(key) {
            let outcome = game.process_move(direction);
            return Some(if outcome.is_terminal() {
                ShellState::RestartOrQuit
            } else {
                ShellState::Playing
            });
        }
    }

    match (shell, key) {
        (ShellState::Playing, KeyCode::Char('r' | 'R')) => Some(ShellState::ConfirmRestart),
        (ShellState::Playing, KeyCode::Char('q' | 'Q') | KeyCode::Esc) => Some(ShellState::ConfirmQuit),
        (ShellState::ConfirmRestart, KeyCode::Char('y' | 'Y'))
        | (ShellState::RestartOrQuit, KeyCode::Char('r' | 'R')) => {
            game.restart();
            Some(ShellState::Playing)
        }
        (ShellState::ConfirmRestart | ShellState::ConfirmQuit, KeyCode::Char('n' | 'N') | KeyCode::Esc) => {
            Some(ShellState::Playing)
        }
        (ShellState::ConfirmQuit, KeyCode::Char('y' | 'Y'))
        | (ShellState::RestartOrQuit, KeyCode::Char('q' | 'Q') | KeyCode::Esc) => None,
        (state, _) => Some(state),
    }
}

fn draw<R: Rng>(out: &mut impl Write, game: &Game<R>, shell: ShellState, colored: bool) -> io::Result<()> {
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    let text = render(&game.snapshot(), colored);
    // Raw mode does not turn '\n' into a carriage return.
    for line in text.lines() {
        write!(out, "{}\r\n", line)?;
    }
    write!(out, "\r\n{}\r\n", shell.prompt())?;
    out.flush()
}

fn run<R: Rng>(game: &mut Game<R>, mut shell: ShellState, colored: bool) -> Result<()> {
    let mut stdout = io::stdout();
    loop {
        draw(&mut stdout, game, shell, colored)?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(());
        }

        match handle_key(game, shell, key.code) {
            Some(next) => shell = next,
            None => return Ok(()),
        }
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let log_file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    let mut game = match args.seed {
        Some(seed) => Game::with_seed(seed),
        None => Game::from_entropy(),
    };

    if let Some(path) = args.state.as_deref().filter(|path| path.exists()) {
        let saved = GameState::load(path)
            .with_context(|| format!("Failed to read saved game from {}", path.display()))?;
        game.apply(&saved)
            .with_context(|| format!("Saved game in {} is not usable", path.display()))?;
        info!(path = %path.display(), "Resumed saved game");
    }

    let shell = if game.is_game_over() {
        ShellState::RestartOrQuit
    } else {
        ShellState::Playing
    };

    {
        let _guard = TerminalGuard::enter().context("Failed to set up the terminal")?;
        run(&mut game, shell, !args.no_color)?;
    }

    if let Some(path) = &args.state {
        game.snapshot()
            .save(path)
            .with_context(|| format!("Failed to save game to {}", path.display()))?;
        println!("Game saved to {}", path.display());
    }
    info!(score = game.score(), best_score = game.best_score(), "Session finished");
    println!("Thanks for playing!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use game2048::engine::{GameStatus, MoveOutcome};

    fn game_from(cells: Vec<Vec<u32>>) -> Game {
        let mut game = Game::with_seed(0);
        game.apply(&GameState::new(cells, 0, 0, GameStatus::WaitingForMove))
            .unwrap();
        game
    }

    #[test]
    fn test_confirmations() {
        let mut game = Game::with_seed(1);
        let before = game.snapshot();

        assert_eq!(handle_key(&mut game, ShellState::Playing, KeyCode::Char('q')), Some(ShellState::ConfirmQuit));
        assert_eq!(handle_key(&mut game, ShellState::ConfirmQuit, KeyCode::Char('n')), Some(ShellState::Playing));
        assert_eq!(handle_key(&mut game, ShellState::ConfirmQuit, KeyCode::Char('Y')), None);

        assert_eq!(handle_key(&mut game, ShellState::Playing, KeyCode::Char('r')), Some(ShellState::ConfirmRestart));
        assert_eq!(handle_key(&mut game, ShellState::ConfirmRestart, KeyCode::Char('x')), Some(ShellState::ConfirmRestart));
        assert_eq!(handle_key(&mut game, ShellState::ConfirmRestart, KeyCode::Esc), Some(ShellState::Playing));
        assert_eq!(game.snapshot(), before);
    }

    #[test]
    fn test_arrows_move_only_while_playing() {
        let mut game = game_from(vec![vec![2, 0, 2, 0], vec![0; 4], vec![0; 4], vec![0; 4]]);
        assert_eq!(handle_key(&mut game, ShellState::ConfirmQuit, KeyCode::Right), Some(ShellState::ConfirmQuit));
        assert_eq!(game.score(), 0);

        assert_eq!(handle_key(&mut game, ShellState::Playing, KeyCode::Right), Some(ShellState::Playing));
        assert_eq!(game.score(), 4);
    }

    #[test]
    fn test_game_end_asks_restart_or_quit() {
        let mut game = game_from(vec![vec![1024, 1024, 0, 0], vec![0; 4], vec![0; 4], vec![0; 4]]);
        assert_eq!(handle_key(&mut game, ShellState::Playing, KeyCode::Left), Some(ShellState::RestartOrQuit));
        assert_eq!(game.status(), GameStatus::Victory);
        assert_eq!(game.process_move(Direction::Left), MoveOutcome::NoChange);

        assert_eq!(handle_key(&mut game, ShellState::RestartOrQuit, KeyCode::Char('r')), Some(ShellState::Playing));
        assert_eq!(game.status(), GameStatus::WaitingForMove);
        assert_eq!(game.best_score(), 2048);
        assert_eq!(handle_key(&mut game, ShellState::RestartOrQuit, KeyCode::Char('q')), None);
    }

    #[test]
    fn test_draw_uses_carriage_returns() {
        let game = Game::with_seed(4);
        let mut out = Vec::new();
        draw(&mut out, &game, ShellState::ConfirmQuit, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("|----|----|----|----|\r\n"));
        assert!(text.ends_with("Do you want to quit the game? [Y/N]\r\n"));
    }
}
