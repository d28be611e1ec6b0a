use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Everything a renderer needs for one frame, detached from the live session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub difficulty: Difficulty,
    pub state: GameState,
    pub cells: Array2<CellView>,
    pub mines_left: i32,
    pub elapsed_secs: u32,
    pub paused: bool,
    pub hint: Option<Coord2>,
    pub theme: Theme,
    pub question_marks: bool,
    pub new_best: bool,
}

impl Snapshot {
    pub fn from_session<S: ScoreStore, C: Clock>(session: &Session<S, C>) -> Self {
        Self {
            difficulty: session.difficulty(),
            state: session.state(),
            cells: session.board().views(),
            mines_left: session.remaining_mines(),
            elapsed_secs: session.elapsed_secs(),
            paused: session.is_paused(),
            hint: session.hint(),
            theme: session.theme(),
            question_marks: session.allows_question_marks(),
            new_best: session.is_new_best(),
        }
    }

    pub fn size(&self) -> Coord2 {
        self.difficulty.config.size
    }

    pub fn cell(&self, coords: Coord2) -> Option<CellView> {
        self.cells.get(coords.to_nd_index()).copied()
    }
}
