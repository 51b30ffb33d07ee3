//! Game snapshots, as handed to renderers and written to disk.

use crate::engine::GameStatus;
use crate::error::StateFileError;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, instrument};

/// An immutable copy of everything a `Game` shows to the outside world.
///
/// Produced by `Game::snapshot` and consumed by `Game::apply`. The grid is an
/// owned copy, so a snapshot never changes when the game it came from does.
/// Its shape is only checked when it is applied.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Getters, Serialize, Deserialize)]
pub struct GameState {
    /// Grid rows, top to bottom; 0 marks an empty cell.
    cells: Vec<Vec<u32>>,
    /// Score of the current game.
    score: u32,
    /// Highest score seen.
    best_score: u32,
    /// Whether the game is running, won or lost.
    status: GameStatus,
}

impl GameState {
    /// Bundles the given values into a snapshot.
    pub fn new(cells: Vec<Vec<u32>>, score: u32, best_score: u32, status: GameStatus) -> Self {
        GameState {
            cells,
            score,
            best_score,
            status,
        }
    }

    /// Serializes the snapshot as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, StateFileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, StateFileError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes the snapshot to `path` as JSON, replacing any existing file.
    #[instrument(skip(self, path), fields(file = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StateFileError> {
        fs::write(path.as_ref(), self.to_json()?)?;
        debug!(score = self.score, "Saved game state");
        Ok(())
    }

    /// Reads a snapshot previously written by `save`.
    #[instrument(skip(path), fields(file = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StateFileError> {
        let state = Self::from_json(&fs::read_to_string(path.as_ref())?)?;
        debug!(score = state.score, "Loaded game state");
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Direction, Game};

    fn sample_state() -> GameState {
        GameState::new(
            vec![vec![2, 0, 4, 1024], vec![0, 4, 0, 0], vec![0, 0, 8, 0], vec![0, 32, 0, 16]],
            500,
            2500,
            GameStatus::WaitingForMove,
        )
    }

    #[test]
    fn test_getters() {
        let state = sample_state();
        assert_eq!(state.cells().len(), 4);
        assert_eq!(state.cells()[0][3], 1024);
        assert_eq!(*state.score(), 500);
        assert_eq!(*state.best_score(), 2500);
        assert_eq!(*state.status(), GameStatus::WaitingForMove);
    }

    #[test]
    fn test_json_field_names() {
        let json = sample_state().to_json().unwrap();
        assert!(json.contains("\"cells\""));
        assert!(json.contains("\"best_score\": 2500"));
        assert!(json.contains("\"WaitingForMove\""));
    }

    #[test]
    fn test_json_round_trip() {
        let state = GameState::new(vec![vec![0; 4]; 4], 12, 40, GameStatus::Defeat);
        let parsed = GameState::from_json(&state.to_json().unwrap()).unwrap();
        assert_eq!(parsed, state);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = GameState::from_json("{\"cells\": 3}").unwrap_err();
        assert!(matches!(err, StateFileError::Json(_)));
        assert!(err.to_string().starts_with("state file is not valid JSON"));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.json");

        let mut game = Game::with_seed(8);
        game.process_move(Direction::Down);
        let state = game.snapshot();
        state.save(&path).unwrap();

        let loaded = GameState::load(&path).unwrap();
        assert_eq!(loaded, state);

        let mut restored = Game::with_seed(1);
        restored.apply(&loaded).unwrap();
        assert_eq!(restored.snapshot(), state);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = GameState::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, StateFileError::Io(_)));
    }

    #[test]
    fn test_loaded_state_with_bad_shape_is_rejected_by_apply() {
        let json = r#"{"cells": [[2, 2], [0, 0]], "score": 4, "best_score": 4, "status": "WaitingForMove"}"#;
        let state = GameState::from_json(json).unwrap();
        let mut game = Game::with_seed(3);
        assert!(game.apply(&state).is_err());
    }
}
