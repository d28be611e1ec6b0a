use super::*;
use ndarray::Array2;
use rand::prelude::*;

/// Purely random placement that keeps the start cell and, when the board has room, its whole 3x3
/// neighborhood free of mines.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
    start: Coord2,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64, start: Coord2) -> Self {
        Self { seed, start }
    }

    fn candidates(config: GameConfig, start: Coord2) -> Vec<Coord2> {
        let (x_end, y_end) = config.size;
        let all = move || (0..y_end).flat_map(move |y| (0..x_end).map(move |x| (x, y)));

        let outside_block: Vec<_> = all()
            .filter(|&(x, y)| x.abs_diff(start.0) > 1 || y.abs_diff(start.1) > 1)
            .collect();
        if outside_block.len() >= usize::from(config.mines) {
            return outside_block;
        }

        log::warn!("Cannot keep start neighborhood clear, only the start cell is safe");
        all().filter(|&coords| coords != start).collect()
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(self, config: GameConfig) -> MineLayout {
        let mut candidates = Self::candidates(config, self.start);
        let mut rng = SmallRng::seed_from_u64(self.seed);
        candidates.shuffle(&mut rng);

        let mut mine_mask: Array2<bool> = Array2::default(config.size.to_nd_index());
        for &coords in candidates.iter().take(config.mines.into()) {
            mine_mask[coords.to_nd_index()] = true;
        }

        let layout = MineLayout::from_mine_mask(mine_mask);
        if layout.mine_count() != config.mines {
            log::warn!(
                "Generated minefield count mismatch, actual: {}, requested: {}",
                layout.mine_count(),
                config.mines
            );
        }
        layout
    }
}
