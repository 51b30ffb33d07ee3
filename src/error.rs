//! Error types for the 2048 engine and its snapshot files.

use derive_more::{Display, Error, From};

/// A `GameState` that cannot be installed into a `Game`.
///
/// Returned by `Game::apply` and `Board::try_from_rows`. The engine never
/// recovers from this itself; the caller decides whether to keep the previous
/// state or abort.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum InvalidState {
    /// The grid has the wrong number of rows.
    #[display("invalid state: expected {expected} rows, found {found}")]
    RowCount {
        /// Rows the board requires.
        expected: usize,
        /// Rows present in the state.
        found: usize,
    },
    /// A row has the wrong number of cells.
    #[display("invalid state: row {row} has {found} cells, expected {expected}")]
    ColumnCount {
        /// Index of the offending row.
        row: usize,
        /// Cells the board requires per row.
        expected: usize,
        /// Cells present in that row.
        found: usize,
    },
    /// A cell holds something other than 0 or a power of two.
    #[display("invalid state: cell ({row}, {col}) holds {value}, which is not a tile value")]
    TileValue {
        /// Row of the offending cell.
        row: usize,
        /// Column of the offending cell.
        col: usize,
        /// The rejected value.
        value: u32,
    },
}

/// Failure while reading or writing a snapshot file.
#[derive(Debug, Display, Error, From)]
pub enum StateFileError {
    /// The file could not be read or written.
    #[display("state file I/O error: {_0}")]
    Io(std::io::Error),
    /// The file contents are not a valid snapshot document.
    #[display("state file is not valid JSON: {_0}")]
    Json(serde_json::Error),
}
