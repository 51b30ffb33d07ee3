use crate::engine::{Board, Direction, BOARD_SIZE};

/// Parses an array of string slices into a `Board` object.
///
/// Each string slice in the input array represents a row on the board, starting from row 0.
/// Cells are separated by whitespace. If fewer than `BOARD_SIZE` rows are provided, the
/// remaining rows are left empty; likewise a row with fewer than `BOARD_SIZE` cells is
/// padded with empty cells.
///
/// Valid cells are:
/// - a number: `0` for an empty cell, or a tile value (a power of two of at least 2)
/// - `.`: an empty cell
///
/// # Arguments
/// * `s`: A slice of string slices (`&[&str]`), one per row, starting from the top.
///
/// # Returns
/// * `Ok(Board)` if parsing is successful.
/// * `Err(String)` if:
///     - The number of rows in `s` exceeds `BOARD_SIZE`.
///     - Any row holds more than `BOARD_SIZE` cells.
///     - A cell is not a number or `.`, or is a number that is not a tile value.
///
/// # Examples
/// ```
/// use game2048::utils::board_from_str_array;
///
/// let board = board_from_str_array(&["2 . 4 1024", "0 8"]).unwrap();
/// assert_eq!(board.get_tile(0, 0), 2);
/// assert_eq!(board.get_tile(0, 1), 0);
/// assert_eq!(board.get_tile(0, 3), 1024);
/// assert_eq!(board.get_tile(1, 1), 8);
/// assert_eq!(board.get_tile(3, 3), 0);
///
/// assert!(board_from_str_array(&["2 x"]).is_err());
/// assert!(board_from_str_array(&["3"]).is_err());
/// ```
pub fn board_from_str_array(s: &[&str]) -> Result<Board, String> {
    if s.len() > BOARD_SIZE {
        return Err(format!(
            "Invalid number of rows. Expected at most {}, found {}",
            BOARD_SIZE,
            s.len()
        ));
    }

    let mut grid = [[0u32; BOARD_SIZE]; BOARD_SIZE];

    for (r, row_str) in s.iter().enumerate() {
        let cells: Vec<&str> = row_str.split_whitespace().collect();
        if cells.len() > BOARD_SIZE {
            return Err(format!(
                "Row {} is too long. Expected at most {} cells, found {}",
                r,
                BOARD_SIZE,
                cells.len()
            ));
        }

        for (c, cell) in cells.iter().enumerate() {
            grid[r][c] = match *cell {
                "." => 0,
                number => match number.parse::<u32>() {
                    Ok(value) if value == 0 || (value >= 2 && value.is_power_of_two()) => value,
                    Ok(value) => {
                        return Err(format!(
                            "Value {} in row {} col {} is not a tile value",
                            value, r, c
                        ))
                    }
                    Err(_) => {
                        return Err(format!(
                            "Unrecognized cell '{}' in row {} col {}",
                            number, r, c
                        ))
                    }
                },
            };
        }
    }
    Ok(Board::from_grid(grid))
}

/// Parses a string of move letters into directions.
///
/// Letters are `U`, `D`, `L` and `R` in either case; whitespace and commas are
/// ignored so `"L L U"` and `"llu"` read the same.
///
/// # Examples
/// ```
/// use game2048::engine::Direction;
/// use game2048::utils::parse_moves;
///
/// assert_eq!(parse_moves("lR, u").unwrap(), vec![Direction::Left, Direction::Right, Direction::Up]);
/// assert!(parse_moves("LX").is_err());
/// ```
pub fn parse_moves(s: &str) -> Result<Vec<Direction>, String> {
    s.chars()
        .enumerate()
        .filter(|(_, c)| !c.is_whitespace() && *c != ',')
        .map(|(i, c)| {
            Direction::from_char(c)
                .ok_or_else(|| format!("Unrecognized move '{}' at position {}", c, i))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_from_str_array_valid() {
        let board = board_from_str_array(&[
            "2 4 8 16",
            ". . . .",
            "32 64 128 256",
            "512 1024 2048 0",
        ])
        .unwrap();
        assert_eq!(board.get_tile(0, 0), 2);
        assert_eq!(board.get_tile(1, 0), 0);
        assert_eq!(board.get_tile(2, 3), 256);
        assert_eq!(board.get_tile(3, 2), 2048);
        assert_eq!(board.count_tiles(), 11);
    }

    #[test]
    fn test_board_from_str_array_extra_whitespace() {
        let board = board_from_str_array(&["  2   .\t4 ", ""]).unwrap();
        assert_eq!(board.get_grid()[0], [2, 0, 4, 0]);
        assert_eq!(board.get_grid()[1], [0, 0, 0, 0]);
    }

    #[test]
    fn test_board_from_str_array_invalid_cell() {
        let result = board_from_str_array(&["2 X"]);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Unrecognized cell 'X'"));
    }

    #[test]
    fn test_board_from_str_array_not_a_tile_value() {
        let result = board_from_str_array(&["2 6"]);
        assert!(result.unwrap_err().contains("Value 6 in row 0 col 1"));

        let result = board_from_str_array(&["1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_board_from_str_array_row_too_long() {
        let result = board_from_str_array(&["2 2 2 2 2"]);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Row 0 is too long"));
    }

    #[test]
    fn test_board_from_str_array_too_many_rows() {
        let rows = vec!["2"; BOARD_SIZE + 1];
        let result = board_from_str_array(&rows);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid number of rows"));
    }

    #[test]
    fn test_board_from_str_array_empty_input() {
        let board_str: [&str; 0] = [];
        let board = board_from_str_array(&board_str).unwrap();
        assert_eq!(board, Board::new_empty());
    }

    #[test]
    fn test_parse_moves() {
        assert_eq!(
            parse_moves("UDLR").unwrap(),
            vec![Direction::Up, Direction::Down, Direction::Left, Direction::Right]
        );
        assert_eq!(parse_moves("").unwrap(), Vec::<Direction>::new());
        assert_eq!(parse_moves(" l,l ").unwrap(), vec![Direction::Left, Direction::Left]);
    }

    #[test]
    fn test_parse_moves_reports_position() {
        let err = parse_moves("LLw").unwrap_err();
        assert_eq!(err, "Unrecognized move 'w' at position 2");
    }
}
