use serde::{Deserialize, Serialize};

/// Cover state of a cell. Marks only exist while the cell is unrevealed, so a
/// revealed cell can never carry a flag or question mark.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Hidden,
    Flagged,
    Questioned,
    Revealed,
}

impl CellState {
    pub const fn is_unrevealed(self) -> bool {
        !matches!(self, Self::Revealed)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub state: CellState,
    pub mine: bool,
    /// Only meaningful once mines are placed.
    pub adjacent: u8,
    /// Set on mines revealed by the player.
    pub exploded: bool,
    /// Set on flagged non-mines when the board is exposed after a loss.
    pub wrong_flag: bool,
}

impl Cell {
    pub const fn is_revealed(&self) -> bool {
        matches!(self.state, CellState::Revealed)
    }

    pub const fn is_flagged(&self) -> bool {
        matches!(self.state, CellState::Flagged)
    }
}

/// What a renderer should draw for a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Flagged,
    Questioned,
    Revealed(u8),
    Mine,
    Exploded,
    WrongFlag,
}

impl CellView {
    // whether the cell is visually closed
    pub const fn is_closed(self) -> bool {
        use CellView::*;
        match self {
            Hidden | Flagged | Questioned | WrongFlag => true,
            Revealed(_) | Mine | Exploded => false,
        }
    }
}

impl From<Cell> for CellView {
    fn from(cell: Cell) -> Self {
        match cell.state {
            CellState::Hidden => Self::Hidden,
            CellState::Questioned => Self::Questioned,
            CellState::Flagged if cell.wrong_flag => Self::WrongFlag,
            CellState::Flagged => Self::Flagged,
            CellState::Revealed if cell.exploded => Self::Exploded,
            CellState::Revealed if cell.mine => Self::Mine,
            CellState::Revealed => Self::Revealed(cell.adjacent),
        }
    }
}
