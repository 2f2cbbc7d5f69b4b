use super::*;
use alloc::vec::Vec;
use rand::prelude::*;
use rand::rngs::SmallRng;

/// Purely random placement: every subset of `mines` cells is equally likely.
#[derive(Clone, Debug, PartialEq)]
pub struct ShuffleGenerator {
    seed: u64,
}

impl ShuffleGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl LayoutGenerator for ShuffleGenerator {
    fn generate(self, config: GameConfig) -> MineLayout {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        shuffle_layout(config, &mut rng)
    }
}

/// Shuffles every coordinate of the board and mines the first `config.mines` of them.
pub fn shuffle_layout<R: Rng + ?Sized>(config: GameConfig, rng: &mut R) -> MineLayout {
    let mut coords: Vec<Coord2> = iter_coords(config.size).collect();
    coords.shuffle(rng);

    let mines = usize::from(config.mines);
    if mines > coords.len() {
        log::warn!(
            "Requested {} mines but only {} cells fit, filling the board",
            mines,
            coords.len()
        );
    }
    coords.truncate(mines);

    let layout = MineLayout::place(config.size, &coords);
    log::debug!(
        "Generated {}x{} layout with {} mines",
        config.size.0,
        config.size.1,
        layout.mine_count()
    );
    layout
}
