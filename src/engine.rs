//! Core game engine for the 2048 puzzle.
//!
//! This module defines the game's fundamental components:
//! - `Direction`: The four ways the player can tilt the board.
//! - `Board`: The 4x4 grid of tiles, with the slide/merge pass, the legal-move
//!   check and tile spawning.
//! - `Game`: Manages the overall game state (score, best score, status) on top
//!   of a `Board`, and owns the random source used for spawning.
use crate::error::InvalidState;
use crate::render;
use crate::state::GameState;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter};
use tracing::{debug, info, trace, warn};

/// Width and height of the board. The board is always square.
pub const BOARD_SIZE: usize = 4;

/// Merging into a tile of this value (or above) wins the game.
pub const VICTORY_TILE: u32 = 2048;

/// Largest tile value a state may carry when it is loaded with `Game::apply`.
///
/// `2^17` is the largest tile that can ever appear on a 4x4 board, so this
/// bound rejects nonsense while keeping every merge well inside `u32`.
pub const MAX_TILE: u32 = 1 << 17;

/// Number of tiles placed on an empty board by `Game::restart`.
pub const STARTING_TILES: usize = 2;

/// Probability that a spawned tile is a 4 rather than a 2.
const CHANCE_TO_SPAWN_FOUR: f64 = 0.1;

/// The direction tiles travel during a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum Direction {
    /// Tiles travel towards row 0.
    Up,
    /// Tiles travel towards the last row.
    Down,
    /// Tiles travel towards column 0.
    Left,
    /// Tiles travel towards the last column.
    Right,
}

impl Direction {
    /// Parses a single move letter (`U`, `D`, `L` or `R`, case-insensitive).
    ///
    /// # Examples
    ///
    /// ```
    /// use game2048::engine::Direction;
    /// assert_eq!(Direction::from_char('l'), Some(Direction::Left));
    /// assert_eq!(Direction::from_char('x'), None);
    /// ```
    pub fn from_char(c: char) -> Option<Direction> {
        match c.to_ascii_uppercase() {
            'U' => Some(Direction::Up),
            'D' => Some(Direction::Down),
            'L' => Some(Direction::Left),
            'R' => Some(Direction::Right),
            _ => None,
        }
    }

    /// Returns the cells of line `index`, ordered from the far edge (the wall
    /// tiles move towards) back to the near edge.
    ///
    /// For horizontal moves `index` is a row, for vertical moves a column.
    fn line(self, index: usize) -> [(usize, usize); BOARD_SIZE] {
        std::array::from_fn(|step| {
            let far = BOARD_SIZE - 1 - step;
            match self {
                Direction::Up => (step, index),
                Direction::Down => (far, index),
                Direction::Left => (index, step),
                Direction::Right => (index, far),
            }
        })
    }
}

/// Where a game stands between moves.
///
/// Once a game leaves `WaitingForMove` it only goes back through
/// `Game::restart` or `Game::apply`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// The game accepts moves.
    #[default]
    WaitingForMove,
    /// A tile reached `VICTORY_TILE`.
    Victory,
    /// No move can change the board any more.
    Defeat,
}

/// What a call to `Game::process_move` did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveOutcome {
    /// Nothing changed: the game was already over, or no tile could move.
    NoChange,
    /// Tiles moved, a new tile was spawned and the game goes on.
    Continued,
    /// The move produced a winning tile. No tile was spawned.
    Victory,
    /// The game has no legal move left.
    Defeat,
}

impl MoveOutcome {
    /// Returns `true` if this outcome ended the game.
    pub fn is_terminal(self) -> bool {
        matches!(self, MoveOutcome::Victory | MoveOutcome::Defeat)
    }
}

/// Summary of one slide pass over the board, as returned by `Board::slide`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Slide {
    /// Whether any tile slid or merged.
    pub moved: bool,
    /// Number of merges performed.
    pub merges: u32,
    /// Sum of the values of all merged tiles; this is the score gained.
    pub score: u32,
    /// Value of the largest tile produced by a merge, 0 if nothing merged.
    pub largest_merge: u32,
}

/// Represents the game board as a 4x4 grid of tile values.
///
/// A cell holding 0 is empty; every other cell holds a power of two. The grid
/// is stored row-major and addressed as `(row, col)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    grid: [[u32; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Creates a board with every cell empty.
    ///
    /// # Examples
    /// ```
    /// use game2048::engine::Board;
    /// let board = Board::new_empty();
    /// assert_eq!(board.get_tile(0, 0), 0);
    /// assert_eq!(board.count_tiles(), 0);
    /// ```
    pub fn new_empty() -> Self {
        Board {
            grid: [[0; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Creates a board from a predefined grid. Values are taken as-is.
    pub fn from_grid(initial_grid: [[u32; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Board { grid: initial_grid }
    }

    /// Builds a board from arbitrary rows, checking shape and tile values.
    ///
    /// # Arguments
    /// * `rows`: One entry per row, top to bottom, each holding one value per column.
    ///
    /// # Returns
    /// * `Ok(Board)` if there are exactly `BOARD_SIZE` rows of `BOARD_SIZE` cells,
    ///   and every cell is 0 or a power of two between 2 and `MAX_TILE`.
    /// * `Err(InvalidState)` describing the first problem found otherwise.
    pub fn try_from_rows<T: AsRef<[u32]>>(rows: &[T]) -> Result<Self, InvalidState> {
        if rows.len() != BOARD_SIZE {
            return Err(InvalidState::RowCount {
                expected: BOARD_SIZE,
                found: rows.len(),
            });
        }

        let mut grid = [[0; BOARD_SIZE]; BOARD_SIZE];
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != BOARD_SIZE {
                return Err(InvalidState::ColumnCount {
                    row: r,
                    expected: BOARD_SIZE,
                    found: row.len(),
                });
            }
            for (c, &value) in row.iter().enumerate() {
                if !is_tile_value(value) {
                    return Err(InvalidState::TileValue { row: r, col: c, value });
                }
                grid[r][c] = value;
            }
        }
        Ok(Board { grid })
    }

    /// Returns the value at row `r`, column `c` (0 for an empty cell).
    ///
    /// # Panics
    /// Panics if `r` or `c` is not below `BOARD_SIZE`.
    pub fn get_tile(&self, r: usize, c: usize) -> u32 {
        self.grid[r][c]
    }

    /// Sets the value at row `r`, column `c`.
    ///
    /// # Panics
    /// Panics if `r` or `c` is not below `BOARD_SIZE`.
    pub fn set_tile(&mut self, r: usize, c: usize, value: u32) {
        self.grid[r][c] = value;
    }

    /// Returns an immutable reference to the underlying grid.
    pub fn get_grid(&self) -> &[[u32; BOARD_SIZE]; BOARD_SIZE] {
        &self.grid
    }

    /// Copies the grid out as owned rows, the shape `GameState` carries.
    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        self.grid.iter().map(|row| row.to_vec()).collect()
    }

    /// Coordinates of every empty cell, in row-major order.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for r in 0..BOARD_SIZE {
            for c in 0..BOARD_SIZE {
                if self.grid[r][c] == 0 {
                    cells.push((r, c));
                }
            }
        }
        cells
    }

    /// Number of non-empty cells.
    pub fn count_tiles(&self) -> usize {
        self.grid.iter().flatten().filter(|&&v| v != 0).count()
    }

    /// Largest value on the board, 0 for an empty board.
    pub fn max_tile(&self) -> u32 {
        self.grid.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Moves every tile as far as it can go in `direction`, merging equal pairs.
    ///
    /// Each line along the move axis is handled on its own. Cells are visited
    /// from the far edge towards the near edge; each visited cell acts as an
    /// accumulator and pulls in the nearest tiles behind it:
    /// - an empty accumulator takes the tile and keeps looking, so the tile it
    ///   just took can still merge with the next one found;
    /// - an accumulator equal to the tile absorbs it (value doubles) and stops;
    /// - an accumulator holding a different value stops.
    ///
    /// A cell produced by a merge never merges again in the same pass, so
    /// `[2, 2, 4, 0]` moved right becomes `[0, 0, 4, 4]`, not `[0, 0, 0, 8]`.
    ///
    /// # Returns
    /// A `Slide` with whether anything moved and what the merges added up to.
    ///
    /// # Examples
    /// ```
    /// use game2048::engine::{Board, Direction};
    /// let mut board = Board::from_grid([[2, 0, 2, 0], [0; 4], [0; 4], [0; 4]]);
    /// let slide = board.slide(Direction::Right);
    /// assert_eq!(board.get_grid()[0], [0, 0, 0, 4]);
    /// assert_eq!(slide.score, 4);
    /// ```
    pub fn slide(&mut self, direction: Direction) -> Slide {
        let mut slide = Slide::default();
        for index in 0..BOARD_SIZE {
            self.collapse_line(&direction.line(index), &mut slide);
        }
        slide
    }

    fn collapse_line(&mut self, cells: &[(usize, usize); BOARD_SIZE], slide: &mut Slide) {
        for (i, &(acc_r, acc_c)) in cells.iter().enumerate() {
            for &(mov_r, mov_c) in &cells[i + 1..] {
                let moving = self.grid[mov_r][mov_c];
                if moving == 0 {
                    continue;
                }

                let accumulator = self.grid[acc_r][acc_c];
                if accumulator == 0 {
                    self.grid[acc_r][acc_c] = moving;
                    self.grid[mov_r][mov_c] = 0;
                    slide.moved = true;
                    continue;
                }

                if accumulator == moving {
                    let merged = accumulator + moving;
                    self.grid[acc_r][acc_c] = merged;
                    self.grid[mov_r][mov_c] = 0;
                    slide.moved = true;
                    slide.merges += 1;
                    slide.score = slide.score.saturating_add(merged);
                    slide.largest_merge = slide.largest_merge.max(merged);
                }
                break;
            }
        }
    }

    /// Checks whether any move could change the board.
    ///
    /// True if some cell is empty, or some cell equals its right or lower
    /// neighbour. Checking those two neighbours covers every adjacent pair.
    pub fn has_legal_move(&self) -> bool {
        for r in 0..BOARD_SIZE {
            for c in 0..BOARD_SIZE {
                let value = self.grid[r][c];
                if value == 0 {
                    return true;
                }
                if c + 1 < BOARD_SIZE && self.grid[r][c + 1] == value {
                    return true;
                }
                if r + 1 < BOARD_SIZE && self.grid[r + 1][c] == value {
                    return true;
                }
            }
        }
        false
    }

    /// Places a new tile in a uniformly chosen empty cell.
    ///
    /// The tile is a 4 with probability 0.1 and a 2 otherwise.
    ///
    /// # Returns
    /// The `(row, col)` that received the tile, or `None` if the board is full.
    pub fn spawn_tile<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<(usize, usize)> {
        let &(r, c) = self.empty_cells().choose(rng)?;
        let value = if rng.gen_bool(CHANCE_TO_SPAWN_FOUR) { 4 } else { 2 };
        self.grid[r][c] = value;
        trace!(row = r, col = c, value, "Spawned tile");
        Some((r, c))
    }
}

fn is_tile_value(value: u32) -> bool {
    value == 0 || (value >= 2 && value <= MAX_TILE && value.is_power_of_two())
}

impl Default for Board {
    fn default() -> Self {
        Self::new_empty()
    }
}

impl fmt::Display for Board {
    /// Formats the board as the bordered, uncolored grid.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render::render_grid(&self.grid, false))
    }
}

/// Manages the state and progression of a 2048 game session.
///
/// The random source used for spawning is injected, so a seeded generator
/// replays the same game every time.
///
/// # Examples
/// ```
/// use game2048::engine::{Direction, Game, GameStatus, MoveOutcome};
///
/// let mut game = Game::with_seed(7);
/// assert_eq!(game.board().count_tiles(), 2);
///
/// match game.process_move(Direction::Left) {
///     MoveOutcome::Victory => println!("You win!"),
///     MoveOutcome::Defeat => println!("You lose!"),
///     MoveOutcome::Continued | MoveOutcome::NoChange => {}
/// }
/// assert!(game.score() <= game.best_score());
/// assert_eq!(game.status(), GameStatus::WaitingForMove);
/// ```
#[derive(Clone, Debug)]
pub struct Game<R = SmallRng> {
    board: Board,
    score: u32,
    best_score: u32,
    status: GameStatus,
    rng: R,
}

impl Game<SmallRng> {
    /// Creates a game whose tile spawns are fully determined by `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }

    /// Creates a game seeded from the operating system's entropy source.
    pub fn from_entropy() -> Self {
        Self::new(SmallRng::from_entropy())
    }
}

impl<R: Rng> Game<R> {
    /// Creates a new game driven by `rng`, already restarted with two tiles.
    ///
    /// The best score starts at 0.
    pub fn new(rng: R) -> Self {
        let mut game = Game {
            board: Board::new_empty(),
            score: 0,
            best_score: 0,
            status: GameStatus::WaitingForMove,
            rng,
        };
        game.restart();
        game
    }

    /// Returns an immutable reference to the current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the score of the current game.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Returns the highest score seen; it survives `restart`.
    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    /// Returns the current game status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns `true` once the game has been won or lost.
    pub fn is_game_over(&self) -> bool {
        self.status != GameStatus::WaitingForMove
    }

    /// Starts a fresh game: empty board, score 0, two spawned tiles.
    ///
    /// The best score is kept.
    pub fn restart(&mut self) {
        self.board = Board::new_empty();
        self.score = 0;
        self.status = GameStatus::WaitingForMove;
        for _ in 0..STARTING_TILES {
            self.board.spawn_tile(&mut self.rng);
        }
        info!(best_score = self.best_score, "Game restarted");
    }

    /// Returns a deep copy of the board, score, best score and status.
    pub fn snapshot(&self) -> GameState {
        GameState::new(self.board.to_rows(), self.score, self.best_score, self.status)
    }

    /// Replaces the whole game state with `state`.
    ///
    /// # Returns
    /// * `Ok(())` once the state is installed.
    /// * `Err(InvalidState)` if the grid is not `BOARD_SIZE` x `BOARD_SIZE` or
    ///   holds a value that is not a tile. The game is left untouched.
    pub fn apply(&mut self, state: &GameState) -> Result<(), InvalidState> {
        let board = Board::try_from_rows(state.cells()).inspect_err(|err| {
            warn!(error = %err, "Rejected game state");
        })?;
        self.board = board;
        self.score = *state.score();
        self.best_score = *state.best_score();
        self.status = *state.status();
        debug!(score = self.score, status = ?self.status, "Applied game state");
        Ok(())
    }

    /// Plays one move in `direction`.
    ///
    /// Nothing happens once the game is over. Otherwise the board slides (see
    /// `Board::slide`) and the merges are added to the score. A winning merge
    /// ends the game without spawning. Any other change spawns one tile and the
    /// game is lost if that leaves no legal move. A move that changes nothing
    /// spawns nothing; it only ends the game if the board was already dead.
    ///
    /// # Returns
    /// The `MoveOutcome` describing what happened.
    pub fn process_move(&mut self, direction: Direction) -> MoveOutcome {
        if self.is_game_over() {
            debug!(%direction, status = ?self.status, "Move ignored, game is over");
            return MoveOutcome::NoChange;
        }

        let slide = self.board.slide(direction);
        self.score = self.score.saturating_add(slide.score);
        self.best_score = self.best_score.max(self.score);

        let outcome = if slide.largest_merge >= VICTORY_TILE {
            self.status = GameStatus::Victory;
            info!(score = self.score, tile = slide.largest_merge, "Victory");
            MoveOutcome::Victory
        } else {
            if slide.moved {
                self.board.spawn_tile(&mut self.rng);
            }
            if !self.board.has_legal_move() {
                self.status = GameStatus::Defeat;
                info!(score = self.score, max_tile = self.board.max_tile(), "Defeat");
                MoveOutcome::Defeat
            } else if slide.moved {
                MoveOutcome::Continued
            } else {
                MoveOutcome::NoChange
            }
        };

        debug!(%direction, ?outcome, merges = slide.merges, score = self.score, "Processed move");
        outcome
    }
}
