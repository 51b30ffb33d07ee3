//! # 2048 Game Library
//!
//! This library provides the core game logic for the 2048 sliding-tile puzzle
//! on a 4x4 board: sliding and merging tiles, scoring, spawning new tiles, and
//! detecting victory and defeat.
//!
//! It is used by two binaries:
//! - `human_player`: Interactive play in the terminal with the arrow keys.
//! - `replay`: Applies a string of moves to a seeded game and prints or saves
//!   the resulting state.
//!
//! ## Modules
//! - `engine`: The board (`Board`), move directions (`Direction`), and the game
//!   state machine (`Game`) with its move resolution.
//! - `state`: The `GameState` snapshot used to observe, save and restore games.
//! - `render`: Turns snapshots into bordered, optionally colored text.
//! - `error`: Error types for rejected states and snapshot files.
//! - `utils`: Parsing helpers for boards and move strings.

pub mod engine;
pub mod error;
pub mod render;
pub mod state;
pub mod utils;
