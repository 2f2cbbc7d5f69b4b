#![no_std]

extern crate alloc;

use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use engine::*;
pub use error::*;
pub use generator::*;
pub use session::*;
pub use tile::*;
pub use types::*;

mod engine;
mod error;
mod generator;
mod session;
mod tile;
mod types;

pub const MIN_DIMENSION: Coord = 1;
pub const MAX_DIMENSION: Coord = 100;

/// Value stored in the mine layout for a cell holding a mine.
pub const MINE: u8 = 9;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Validates raw request values: both sides within `1..=100`, mines within `1..=cells`.
    pub fn new(width: i32, height: i32, mines: i32) -> Result<Self> {
        let width = Self::check_dimension(width)?;
        let height = Self::check_dimension(height)?;
        let mines = CellCount::try_from(mines).map_err(|_| GameError::InvalidBombCount)?;
        if mines < 1 || mines > mult(width, height) {
            return Err(GameError::InvalidBombCount);
        }
        Ok(Self::new_unchecked((width, height), mines))
    }

    fn check_dimension(value: i32) -> Result<Coord> {
        Coord::try_from(value)
            .ok()
            .filter(|value| (MIN_DIMENSION..=MAX_DIMENSION).contains(value))
            .ok_or(GameError::InvalidDimensions)
    }

    pub const fn width(&self) -> Coord {
        self.size.0
    }

    pub const fn height(&self) -> Coord {
        self.size.1
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}

/// Hidden grid of the game: `9` marks a mine, any other value is the number of adjacent
/// mines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Array2<u8>", into = "Array2<u8>")]
pub struct MineLayout {
    values: Array2<u8>,
    mine_count: CellCount,
}

impl MineLayout {
    /// Places mines at `mine_coords` and computes adjacency counts around them.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        if mine_coords.iter().any(|&(x, y)| x >= size.0 || y >= size.1) {
            return Err(GameError::OutOfBounds);
        }
        Ok(Self::place(size, mine_coords))
    }

    /// Every coordinate must be within `size`; duplicates count once.
    pub(crate) fn place(size: Coord2, mine_coords: &[Coord2]) -> Self {
        let mut values: Array2<u8> = Array2::zeros(grid_dim(size));
        let mut mine_count: CellCount = 0;

        for &coords in mine_coords {
            if values[coords.to_nd_index()] == MINE {
                continue;
            }
            values[coords.to_nd_index()] = MINE;
            mine_count += 1;
            for pos in values.iter_neighbors(coords) {
                let value = &mut values[pos.to_nd_index()];
                if *value != MINE {
                    *value += 1;
                }
            }
        }

        Self { values, mine_count }
    }

    /// Rebuilds a layout from stored values, checking every count against its neighbors.
    pub fn from_values(values: Array2<u8>) -> Result<Self> {
        let size = checked_size(&values)?;
        let mut mine_count: CellCount = 0;

        for coords in iter_coords(size) {
            let value = values[coords.to_nd_index()];
            if value == MINE {
                mine_count += 1;
                continue;
            }
            let expected = values
                .iter_neighbors(coords)
                .filter(|pos| values[pos.to_nd_index()] == MINE)
                .count();
            if usize::from(value) != expected {
                return Err(GameError::InvalidLayout);
            }
        }

        Ok(Self { values, mine_count })
    }

    /// Configuration the layout was generated from.
    pub fn game_config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size(), self.mine_count)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    pub fn size(&self) -> Coord2 {
        // checked in from_values
        grid_size(&self.values).unwrap_or((0, 0))
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn total_cells(&self) -> CellCount {
        CellCount::try_from(self.values.len()).unwrap_or(CellCount::MAX)
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords] == MINE
    }

    /// Adjacent mine count of a safe cell, `None` for a mine.
    pub fn adjacent_mine_count(&self, coords: Coord2) -> Option<u8> {
        Some(self[coords]).filter(|&value| value != MINE)
    }

    pub fn values(&self) -> &Array2<u8> {
        &self.values
    }

    pub fn iter_mines(&self) -> impl Iterator<Item = Coord2> + '_ {
        iter_coords(self.size()).filter(|&coords| self.contains_mine(coords))
    }

    pub(crate) fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.values.iter_neighbors(coords)
    }
}

/// Size of a stored grid, rejecting anything outside `MIN_DIMENSION..=MAX_DIMENSION`.
pub(crate) fn checked_size<T>(grid: &Array2<T>) -> Result<Coord2> {
    let bounds = MIN_DIMENSION..=MAX_DIMENSION;
    grid_size(grid)
        .filter(|(width, height)| bounds.contains(width) && bounds.contains(height))
        .ok_or(GameError::InvalidBoardShape)
}

impl Index<Coord2> for MineLayout {
    type Output = u8;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.values[coords.to_nd_index()]
    }
}

impl TryFrom<Array2<u8>> for MineLayout {
    type Error = GameError;

    fn try_from(values: Array2<u8>) -> Result<Self> {
        Self::from_values(values)
    }
}

impl From<MineLayout> for Array2<u8> {
    fn from(layout: MineLayout) -> Self {
        layout.values
    }
}
