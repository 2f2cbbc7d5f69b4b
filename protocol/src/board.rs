use ndarray::Array2;
use sweeper_core::{Board, Cell, Coord2, MAX_DIMENSION, ToNdIndex, grid_dim};
use thiserror::Error;

/// Board as sent over the wire: rows of single-character cells.
pub type TextBoard = Vec<Vec<String>>;

pub const HIDDEN: &str = " ";
pub const TRIGGERED_MINE: &str = "X";
pub const MINE: &str = "B";

const DIGITS: [&str; 9] = ["0", "1", "2", "3", "4", "5", "6", "7", "8"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Unknown cell {0:?}")]
    UnknownCell(String),
    #[error("Board rows must be non-empty and of equal length")]
    RaggedBoard,
}

pub fn cell_text(cell: Cell) -> &'static str {
    match cell {
        Cell::Hidden => HIDDEN,
        Cell::Revealed(count) => DIGITS.get(usize::from(count)).copied().unwrap_or("?"),
        Cell::TriggeredMine => TRIGGERED_MINE,
        Cell::Mine => MINE,
    }
}

pub fn parse_cell(text: &str) -> Result<Cell, ProtocolError> {
    match text {
        HIDDEN => Ok(Cell::Hidden),
        TRIGGERED_MINE => Ok(Cell::TriggeredMine),
        MINE => Ok(Cell::Mine),
        _ => DIGITS
            .iter()
            .position(|&digit| digit == text)
            .map(|count| Cell::Revealed(count as u8))
            .ok_or_else(|| ProtocolError::UnknownCell(text.to_string())),
    }
}

pub fn render_board(board: &Board) -> TextBoard {
    board
        .cells()
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|&cell| cell_text(cell).to_string()).collect())
        .collect()
}

pub fn parse_board(rows: &TextBoard) -> Result<Board, ProtocolError> {
    let width = rows.first().map_or(0, Vec::len);
    let fits = |len: usize| (1..=usize::from(MAX_DIMENSION)).contains(&len);
    if !fits(width) || !fits(rows.len()) || rows.iter().any(|row| row.len() != width) {
        return Err(ProtocolError::RaggedBoard);
    }

    let size: Coord2 = (width as u8, rows.len() as u8);
    let mut cells: Array2<Cell> = Array2::default(grid_dim(size));
    for (y, row) in rows.iter().enumerate() {
        for (x, text) in row.iter().enumerate() {
            cells[(x as u8, y as u8).to_nd_index()] = parse_cell(text)?;
        }
    }
    Board::from_cells(cells).map_err(|_| ProtocolError::RaggedBoard)
}
