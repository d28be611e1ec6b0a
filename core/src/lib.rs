use core::ops::{BitOr, Index};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use clock::*;
pub use difficulty::*;
pub use error::*;
pub use generator::*;
pub use scores::*;
pub use session::*;
pub use snapshot::*;
pub use types::*;

mod board;
mod cell;
mod clock;
mod difficulty;
mod error;
mod generator;
mod scores;
mod session;
mod snapshot;
mod types;

/// Board dimensions and mine total, the part of a difficulty the board engine cares about.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    /// For presets and layouts that are already known to be playable.
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// A playable config: the board is at least two cells and leaves at least one of them safe.
    pub fn new((width, height): Coord2, mines: CellCount) -> Self {
        let width = width.max(1);
        let height = height.max(if width == 1 { 2 } else { 1 });
        let mines_max = mult(width, height) - 1;
        let clamped = mines.clamp(1, mines_max);
        if clamped != mines {
            log::warn!("Mine count {mines} out of range, clamped to {clamped}");
        }
        Self::new_unchecked((width, height), clamped)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    /// Cells that must be opened to win.
    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells() - self.mines
    }

    pub const fn contains(&self, (x, y): Coord2) -> bool {
        x < self.size.0 && y < self.size.1
    }
}

/// Where the mines are, fixed for the life of one game.
///
/// Built by a [`MinefieldGenerator`] on the first reveal, or by hand for replays and tests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Self {
        let mines = mine_mask.iter().filter(|&&is_mine| is_mine).count();
        Self {
            mine_count: CellCount::try_from(mines).unwrap_or(CellCount::MAX),
            mine_mask,
        }
    }

    /// Layout with mines at exactly `mine_coords`; every coordinate must be on the board and one cell must stay
    /// safe.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let bounds = GameConfig::new_unchecked(size, 0);
        if !mine_coords.iter().all(|&coords| bounds.contains(coords)) {
            return Err(GameError::InvalidCoords);
        }

        let mut mine_mask = Array2::from_elem(size.to_nd_index(), false);
        for &coords in mine_coords {
            mine_mask[coords.to_nd_index()] = true;
        }

        let layout = Self::from_mine_mask(mine_mask);
        if layout.mine_count >= bounds.total_cells() {
            return Err(GameError::TooManyMines);
        }
        Ok(layout)
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size(), self.mine_count)
    }

    pub fn size(&self) -> Coord2 {
        let (width, height) = self.mine_mask.dim();
        (
            Coord::try_from(width).unwrap_or(Coord::MAX),
            Coord::try_from(height).unwrap_or(Coord::MAX),
        )
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    /// The number a revealed cell at `coords` shows.
    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        let mut count = 0;
        for neighbor in self.mine_mask.iter_neighbors(coords) {
            count += u8::from(self[neighbor]);
        }
        count
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.mine_mask[coords.to_nd_index()]
    }
}

/// Whether a mark toggle changed anything; revealed and off-board cells never change.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// What a reveal or chord did to the board, ordered by how much it matters to the session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
}

impl RevealOutcome {
    /// A mine hit also counts, the exploded cell is now open.
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }

    pub const fn hit_mine(self) -> bool {
        matches!(self, Self::HitMine)
    }
}

/// Chord folds its per-neighbor outcomes with `|`, keeping the most severe one.
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.max(rhs)
    }
}
