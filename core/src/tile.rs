use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Player-visible state of a single cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Hidden,
    /// Safe cell showing its adjacent mine count.
    Revealed(u8),
    /// The mine the player revealed, ending the game.
    TriggeredMine,
    /// Any other mine, uncovered because the game was lost.
    Mine,
}

impl Cell {
    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden)
    }

    pub const fn is_mine(self) -> bool {
        matches!(self, Self::TriggeredMine | Self::Mine)
    }
}

/// The player-facing grid. Cells only ever move away from [`Cell::Hidden`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Array2<Cell>", into = "Array2<Cell>")]
pub struct Board {
    cells: Array2<Cell>,
}

impl Board {
    /// A fully hidden board of the given `(width, height)`.
    pub fn hidden(size: Coord2) -> Self {
        Self {
            cells: Array2::default(grid_dim(size)),
        }
    }

    /// Rebuilds a board from stored cells, e.g. when loading a snapshot. Only the shape is
    /// checked here, consistency with a layout is up to the session.
    pub fn from_cells(cells: Array2<Cell>) -> Result<Self> {
        checked_size(&cells)?;
        Ok(Self { cells })
    }

    pub fn size(&self) -> Coord2 {
        // dimensions are checked on construction
        grid_size(&self.cells).unwrap_or((0, 0))
    }

    pub fn hidden_count(&self) -> CellCount {
        let count = self.cells.iter().filter(|cell| cell.is_hidden()).count();
        CellCount::try_from(count).unwrap_or(CellCount::MAX)
    }

    pub fn cells(&self) -> &Array2<Cell> {
        &self.cells
    }

    /// Iterates cells with their coordinates in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        iter_coords(self.size()).map(|coords| (coords, self[coords]))
    }

    pub(crate) fn uncover(&mut self, coords: Coord2, cell: Cell) {
        debug_assert!(!cell.is_hidden(), "cells never return to hidden");
        self.cells[coords.to_nd_index()] = cell;
    }
}

impl TryFrom<Array2<Cell>> for Board {
    type Error = GameError;

    fn try_from(cells: Array2<Cell>) -> Result<Self> {
        Self::from_cells(cells)
    }
}

impl From<Board> for Array2<Cell> {
    fn from(board: Board) -> Self {
        board.cells
    }
}

impl Index<Coord2> for Board {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}
