use crate::*;
pub use shuffle::*;

mod shuffle;

pub trait LayoutGenerator {
    fn generate(self, config: GameConfig) -> MineLayout;
}

/// Generates a layout and the matching, fully hidden board.
pub fn generate<G: LayoutGenerator>(generator: G, config: GameConfig) -> (MineLayout, Board) {
    let layout = generator.generate(config);
    let board = Board::hidden(layout.size());
    (layout, board)
}
