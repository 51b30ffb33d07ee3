//! Text rendering of game snapshots for terminal output.
//!
//! The renderer only ever sees a `GameState`; it never touches a live `Game`.

use crate::engine::GameStatus;
use crate::state::GameState;

/// Width of one cell between the `|` borders.
const CELL_WIDTH: usize = 4;

/// Returns the ANSI foreground color code used for a tile value.
///
/// Values past 2048 reuse the 2048 color.
fn tile_ansi_color_code(value: u32) -> &'static str {
    match value {
        2 => "97",
        4 => "32",
        8 => "92",
        16 => "96",
        32 => "36",
        64 => "33",
        128 => "93",
        256 => "35",
        512 => "95",
        1024 => "31",
        _ => "91",
    }
}

fn separator_line(columns: usize) -> String {
    let mut line = String::from("|");
    for _ in 0..columns {
        line.push_str(&"-".repeat(CELL_WIDTH));
        line.push('|');
    }
    line
}

/// Draws grid rows as a bordered table, one value per cell, blank for 0.
///
/// With `colored` set, every value is wrapped in its ANSI color code. Works for
/// any row type, so it serves both live boards and snapshots.
///
/// # Examples
/// ```
/// use game2048::render::render_grid;
/// let grid = render_grid(&[[2u32, 0], [0, 16]], false);
/// assert_eq!(grid, "|----|----|\n|   2|    |\n|----|----|\n|    |  16|\n|----|----|");
/// ```
pub fn render_grid<T: AsRef<[u32]>>(rows: &[T], colored: bool) -> String {
    let columns = rows.first().map_or(0, |row| row.as_ref().len());
    let separator = separator_line(columns);

    let mut output = separator.clone();
    for row in rows {
        output.push('\n');
        for &value in row.as_ref() {
            output.push('|');
            if value == 0 {
                output.push_str(&" ".repeat(CELL_WIDTH));
            } else if colored {
                output.push_str(&format!(
                    "\x1b[{}m{:>width$}\x1b[0m",
                    tile_ansi_color_code(value),
                    value,
                    width = CELL_WIDTH
                ));
            } else {
                output.push_str(&format!("{:>width$}", value, width = CELL_WIDTH));
            }
        }
        output.push('|');
        output.push('\n');
        output.push_str(&separator);
    }
    output
}

/// Renders a full snapshot: grid, score lines and the end-of-game banner.
pub fn render(state: &GameState, colored: bool) -> String {
    let mut output = render_grid(state.cells(), colored);
    output.push_str("\n\n");
    output.push_str(&format!("Score: {}\n", state.score()));
    output.push_str(&format!("Best score: {}\n", state.best_score()));

    match state.status() {
        GameStatus::Victory => output.push_str("You win!\n"),
        GameStatus::Defeat => output.push_str("You lose!\n"),
        GameStatus::WaitingForMove => {}
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(status: GameStatus) -> GameState {
        GameState::new(
            vec![vec![2, 0, 4, 1024], vec![0, 4, 0, 0], vec![0, 0, 8, 0], vec![0, 32, 0, 4096]],
            500,
            2500,
            status,
        )
    }

    #[test]
    fn test_render_plain() {
        let text = render(&state_with(GameStatus::WaitingForMove), false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "|----|----|----|----|");
        assert_eq!(lines[1], "|   2|    |   4|1024|");
        assert_eq!(lines[7], "|    |  32|    |4096|");
        assert_eq!(lines[8], "|----|----|----|----|");
        assert_eq!(lines[9], "");
        assert_eq!(lines[10], "Score: 500");
        assert_eq!(lines[11], "Best score: 2500");
        assert_eq!(lines.len(), 12);
    }

    #[test]
    fn test_render_banners() {
        assert!(render(&state_with(GameStatus::Victory), false).ends_with("You win!\n"));
        assert!(render(&state_with(GameStatus::Defeat), false).ends_with("You lose!\n"));
        let running = render(&state_with(GameStatus::WaitingForMove), false);
        assert!(!running.contains("You"));
    }

    #[test]
    fn test_render_colored() {
        let text = render(&state_with(GameStatus::WaitingForMove), true);
        assert!(text.contains("\x1b[97m   2\x1b[0m"));
        assert!(text.contains("\x1b[31m1024\x1b[0m"));
        // Tiles past 2048 keep the 2048 color.
        assert!(text.contains("\x1b[91m4096\x1b[0m"));
        // Empty cells stay uncolored.
        assert!(text.contains("|    |"));
    }

    #[test]
    fn test_tile_colors_are_distinct_up_to_2048() {
        let codes: Vec<&str> = (1..=11).map(|exp| tile_ansi_color_code(1 << exp)).collect();
        let mut unique = codes.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), codes.len());
    }
}
