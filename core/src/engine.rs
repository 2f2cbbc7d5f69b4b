use alloc::collections::VecDeque;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Terminal signal of a single reveal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealOutcome {
    InProgress,
    Lost,
    Won,
}

impl RevealOutcome {
    /// `Some(won)` once the game is over.
    pub const fn won(self) -> Option<bool> {
        match self {
            Self::InProgress => None,
            Self::Lost => Some(false),
            Self::Won => Some(true),
        }
    }
}

/// Board produced by a reveal together with its outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reveal {
    pub board: Board,
    pub outcome: RevealOutcome,
}

/// Resolves moves against a fixed mine layout. Never mutates its inputs.
#[derive(Copy, Clone, Debug)]
pub struct RevealEngine<'a> {
    layout: &'a MineLayout,
}

impl<'a> RevealEngine<'a> {
    pub fn new(layout: &'a MineLayout) -> Self {
        Self { layout }
    }

    pub fn reveal(&self, board: &Board, target: Coord2) -> Result<Reveal> {
        if board.size() != self.layout.size() {
            return Err(GameError::InvalidBoardShape);
        }
        let target = self.layout.validate_coords(target)?;
        if !board[target].is_hidden() {
            return Err(GameError::AlreadyRevealed);
        }

        let mut next = board.clone();
        let outcome = if self.layout.contains_mine(target) {
            self.uncover_mines(&mut next, target);
            RevealOutcome::Lost
        } else {
            self.flood_fill(&mut next, target);
            if self.is_cleared(&next) {
                RevealOutcome::Won
            } else {
                RevealOutcome::InProgress
            }
        };

        log::debug!("Reveal at {:?}: {:?}", target, outcome);
        Ok(Reveal {
            board: next,
            outcome,
        })
    }

    /// Whether every safe cell has been uncovered; hidden mines do not matter.
    pub fn is_cleared(&self, board: &Board) -> bool {
        board
            .iter()
            .all(|(coords, cell)| !cell.is_hidden() || self.layout.contains_mine(coords))
    }

    fn uncover_mines(&self, board: &mut Board, target: Coord2) {
        for coords in self.layout.iter_mines() {
            let cell = if coords == target {
                Cell::TriggeredMine
            } else {
                Cell::Mine
            };
            board.uncover(coords, cell);
        }
    }

    /// Breadth-first over safe cells; zero cells expand, non-zero cells form the boundary.
    fn flood_fill(&self, board: &mut Board, start: Coord2) {
        let mut visited: Array2<bool> = Array2::default(grid_dim(board.size()));
        let mut to_visit = VecDeque::from([start]);

        while let Some(visit_coords) = to_visit.pop_front() {
            let seen = &mut visited[visit_coords.to_nd_index()];
            if *seen {
                continue;
            }
            *seen = true;

            if !board[visit_coords].is_hidden() {
                continue;
            }
            let Some(count) = self.layout.adjacent_mine_count(visit_coords) else {
                continue;
            };
            board.uncover(visit_coords, Cell::Revealed(count));
            log::trace!("Flood opened {:?}, mine count: {}", visit_coords, count);

            if count == 0 {
                to_visit.extend(
                    self.layout
                        .iter_neighbors(visit_coords)
                        .filter(|&pos| board[pos].is_hidden())
                        .filter(|pos| !visited[pos.to_nd_index()]),
                );
            }
        }
    }
}
