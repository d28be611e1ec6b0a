use core::ops::BitOr;
use ndarray::Array2;
use rand::prelude::*;
use std::collections::VecDeque;

use crate::*;

/// The minefield as the player sees and manipulates it.
///
/// Mines are placed lazily on the first reveal so the first opened cell is always safe. After that the layout and
/// adjacency counts never change for the life of the board. Every operation is a silent no-op on cells it cannot act
/// on, callers inspect the returned outcome instead of handling errors.
#[derive(Clone, Debug)]
pub struct Board {
    config: GameConfig,
    cells: Array2<Cell>,
    mines_placed: bool,
    revealed_count: CellCount,
    flag_count: CellCount,
    rng: SmallRng,
}

impl Board {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            cells: Array2::default(config.size.to_nd_index()),
            mines_placed: false,
            revealed_count: 0,
            flag_count: 0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Board with mines already in place, the first reveal gets no protection.
    pub fn with_layout(layout: MineLayout, seed: u64) -> Self {
        let mut board = Self::new(layout.game_config(), seed);
        board.apply_layout(&layout);
        board
    }

    /// Blank board of the same size, mines will be placed again on the next reveal.
    pub fn reset(&mut self) {
        self.cells.fill(Cell::default());
        self.mines_placed = false;
        self.revealed_count = 0;
        self.flag_count = 0;
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn mine_count(&self) -> CellCount {
        self.config.mines
    }

    pub fn flag_count(&self) -> CellCount {
        self.flag_count
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    /// Mines minus flags, negative when the player over-flags.
    pub fn remaining_mines(&self) -> i32 {
        i32::from(self.config.mines) - i32::from(self.flag_count)
    }

    pub fn mines_placed(&self) -> bool {
        self.mines_placed
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        self.config.contains(coords)
    }

    pub fn cell_at(&self, coords: Coord2) -> Option<Cell> {
        self.cells.get(coords.to_nd_index()).copied()
    }

    pub fn cell_view(&self, coords: Coord2) -> Option<CellView> {
        self.cell_at(coords).map(CellView::from)
    }

    pub fn views(&self) -> Array2<CellView> {
        self.cells.map(|&cell| CellView::from(cell))
    }

    pub fn place_mines(&mut self, safe: Coord2) {
        if self.mines_placed {
            log::warn!("Mines already placed, ignoring placement at {:?}", safe);
            return;
        }

        let layout = RandomMinefieldGenerator::new(self.rng.random(), safe).generate(self.config);
        self.apply_layout(&layout);
        log::debug!(
            "Placed {} mines on {:?}, safe start at {:?}",
            layout.mine_count(),
            self.config.size,
            safe
        );
    }

    fn apply_layout(&mut self, layout: &MineLayout) {
        let (x_end, y_end) = self.config.size;
        for x in 0..x_end {
            for y in 0..y_end {
                let coords = (x, y);
                let cell = &mut self.cells[coords.to_nd_index()];
                cell.mine = layout.contains_mine(coords);
                cell.adjacent = if cell.mine {
                    0
                } else {
                    layout.adjacent_mine_count(coords)
                };
            }
        }
        self.mines_placed = true;
    }

    /// Open a cell, flood-filling through cells with no adjacent mines.
    pub fn reveal(&mut self, coords: Coord2) -> RevealOutcome {
        use RevealOutcome::*;

        if !self.cell_at(coords).is_some_and(|cell| is_revealable(cell.state)) {
            return NoChange;
        }

        if !self.mines_placed {
            self.place_mines(coords);
        }

        let cell = &mut self.cells[coords.to_nd_index()];
        if cell.mine {
            cell.state = CellState::Revealed;
            cell.exploded = true;
            log::debug!("Hit mine at {:?}", coords);
            return HitMine;
        }

        let mut outcome = NoChange;
        let mut to_visit = VecDeque::from([coords]);

        while let Some(visit_coords) = to_visit.pop_front() {
            let cell = &mut self.cells[visit_coords.to_nd_index()];
            if !is_revealable(cell.state) {
                continue;
            }

            cell.state = CellState::Revealed;
            let adjacent = cell.adjacent;
            self.revealed_count += 1;
            outcome = Revealed;
            log::trace!("Opened cell at {:?}, mine count: {}", visit_coords, adjacent);

            if adjacent == 0 {
                to_visit.extend(
                    self.cells
                        .iter_neighbors(visit_coords)
                        .filter(|&pos| is_revealable(self.cells[pos.to_nd_index()].state)),
                );
            }
        }

        outcome
    }

    /// Cycle the mark of a hidden cell: none, flag, question (when allowed), none.
    pub fn toggle_mark(&mut self, coords: Coord2, allow_question: bool) -> MarkOutcome {
        use CellState::*;

        let Some(cell) = self.cells.get_mut(coords.to_nd_index()) else {
            return MarkOutcome::NoChange;
        };

        cell.state = match cell.state {
            Revealed => return MarkOutcome::NoChange,
            Hidden => {
                self.flag_count += 1;
                Flagged
            }
            Flagged => {
                self.flag_count -= 1;
                if allow_question { Questioned } else { Hidden }
            }
            Questioned => Hidden,
        };

        MarkOutcome::Changed
    }

    /// Open every unflagged neighbor of a revealed number whose flag count matches it exactly.
    ///
    /// A mine hit does not stop the remaining neighbors from being opened.
    pub fn chord(&mut self, coords: Coord2) -> RevealOutcome {
        use RevealOutcome::*;

        let Some(cell) = self.cell_at(coords) else {
            return NoChange;
        };

        if !cell.is_revealed() || cell.mine || cell.adjacent == 0 {
            return NoChange;
        }

        if self.count_flagged_neighbors(coords) != cell.adjacent {
            return NoChange;
        }

        self.cells
            .iter_neighbors(coords)
            .map(|neighbor_coords| self.reveal(neighbor_coords))
            .fold(NoChange, BitOr::bitor)
    }

    /// Expose the board after a loss. Flagged mines are revealed too, `flag_count` keeps the player's count.
    pub fn reveal_all_mines(&mut self) {
        use CellState::*;

        for cell in self.cells.iter_mut() {
            match (cell.mine, cell.state) {
                (true, _) => cell.state = Revealed,
                (false, Flagged) => cell.wrong_flag = true,
                (false, _) => {}
            }
        }
    }

    /// Flag the mines the player left unmarked after a win.
    pub fn auto_flag_mines(&mut self) {
        for cell in self.cells.iter_mut() {
            if cell.mine && cell.state.is_unrevealed() && !cell.is_flagged() {
                cell.state = CellState::Flagged;
                self.flag_count += 1;
            }
        }
    }

    pub fn is_win(&self) -> bool {
        self.revealed_count == self.config.safe_cells()
    }

    /// Pick a random cell that is safe to open, or the center before any mine exists.
    pub fn find_safe_hint(&mut self) -> Option<Coord2> {
        if !self.mines_placed {
            let (x_end, y_end) = self.config.size;
            return Some((x_end / 2, y_end / 2));
        }

        let options: Vec<Coord2> = self
            .cells
            .indexed_iter()
            .filter(|(_, cell)| !cell.mine && is_revealable(cell.state))
            .map(|((x, y), _)| (x as Coord, y as Coord))
            .collect();

        options.choose(&mut self.rng).copied()
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.cells
            .iter_neighbors(coords)
            .filter(|&pos| self.cells[pos.to_nd_index()].is_flagged())
            .count() as u8
    }
}

/// Hidden and question-marked cells can be opened, flags protect a cell.
const fn is_revealable(state: CellState) -> bool {
    matches!(state, CellState::Hidden | CellState::Questioned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn board(size: Coord2, mines: &[Coord2]) -> Board {
        Board::with_layout(MineLayout::from_mine_coords(size, mines).unwrap(), 0)
    }

    fn revealed_set(board: &Board) -> BTreeSet<Coord2> {
        let (x_end, y_end) = board.size();
        (0..x_end)
            .flat_map(|x| (0..y_end).map(move |y| (x, y)))
            .filter(|&coords| board.cell_at(coords).unwrap().is_revealed())
            .collect()
    }

    /// Zero-cells reachable from `start` plus the numbered cells bordering them.
    fn expected_region(board: &Board, start: Coord2) -> BTreeSet<Coord2> {
        let mut region = BTreeSet::from([start]);
        let mut stack = vec![start];
        while let Some(coords) = stack.pop() {
            if board.cell_at(coords).unwrap().adjacent != 0 {
                continue;
            }
            for pos in NeighborIter::new(coords, board.size()) {
                if region.insert(pos) {
                    stack.push(pos);
                }
            }
        }
        region
    }

    fn assert_adjacency_exact(board: &Board) {
        let (x_end, y_end) = board.size();
        for x in 0..x_end {
            for y in 0..y_end {
                let cell = board.cell_at((x, y)).unwrap();
                if cell.mine {
                    continue;
                }
                let mines = NeighborIter::new((x, y), board.size())
                    .filter(|&pos| board.cell_at(pos).unwrap().mine)
                    .count();
                assert_eq!(usize::from(cell.adjacent), mines, "at ({x}, {y})");
            }
        }
    }

    #[test]
    fn first_reveal_on_beginner_keeps_center_block_clear() {
        for seed in 0..100 {
            let mut board = Board::new(GameConfig::new((9, 9), 10), seed);

            let outcome = board.reveal((4, 4));

            assert_eq!(outcome, RevealOutcome::Revealed);
            assert!(board.mines_placed());
            assert!(board.revealed_count() >= 1);
            for x in 3..=5 {
                for y in 3..=5 {
                    assert!(!board.cell_at((x, y)).unwrap().mine);
                }
            }
            let mines = (0..9)
                .flat_map(|x| (0..9).map(move |y| (x, y)))
                .filter(|&coords| board.cell_at(coords).unwrap().mine)
                .count();
            assert_eq!(mines, 10);
            assert_adjacency_exact(&board);
        }
    }

    #[test]
    fn first_reveal_is_safe_on_crowded_board() {
        for seed in 0..50 {
            let mut board = Board::new(GameConfig::new((4, 4), 15), seed);

            assert_eq!(board.reveal((2, 1)), RevealOutcome::Revealed);
            assert_eq!(board.revealed_count(), 1);
            assert!(board.is_win());
            assert_adjacency_exact(&board);
        }
    }

    #[test]
    fn flood_fill_reveals_zero_region_and_its_border() {
        for seed in 0..100 {
            let mut board = Board::new(GameConfig::new((16, 16), 40), seed);

            board.reveal((8, 8));

            let revealed = revealed_set(&board);
            assert_eq!(revealed, expected_region(&board, (8, 8)));
            assert_eq!(revealed.len(), usize::from(board.revealed_count()));
            assert!(revealed.iter().all(|&c| !board.cell_at(c).unwrap().mine));
        }
    }

    #[test]
    fn flood_fill_stops_at_mine_wall() {
        let wall = [(3, 0), (3, 1), (3, 2), (3, 3)];
        let mut board = board((6, 4), &wall);

        assert_eq!(board.reveal((0, 0)), RevealOutcome::Revealed);

        assert_eq!(board.revealed_count(), 12);
        assert_eq!(board.cell_view((2, 1)), Some(CellView::Revealed(3)));
        assert_eq!(board.cell_view((4, 0)), Some(CellView::Hidden));
    }

    #[test]
    fn flood_fill_skips_flags_and_opens_question_marks() {
        let mut board = board((4, 4), &[(3, 3)]);
        board.toggle_mark((0, 3), false);
        board.toggle_mark((1, 0), true);
        board.toggle_mark((1, 0), true);

        board.reveal((0, 0));

        assert_eq!(board.cell_view((0, 3)), Some(CellView::Flagged));
        assert_eq!(board.cell_view((1, 0)), Some(CellView::Revealed(0)));
        assert_eq!(board.revealed_count(), 14);
        assert!(!board.is_win());
    }

    #[test]
    fn reveal_is_idempotent() {
        let mut board = board((3, 3), &[(2, 2)]);

        assert_eq!(board.reveal((1, 1)), RevealOutcome::Revealed);
        let before = board.revealed_count();
        assert_eq!(board.reveal((1, 1)), RevealOutcome::NoChange);
        assert_eq!(board.revealed_count(), before);
    }

    #[test]
    fn reveal_never_touches_flagged_cell() {
        let mut board = board((3, 3), &[(2, 2)]);
        board.toggle_mark((2, 2), false);

        assert_eq!(board.reveal((2, 2)), RevealOutcome::NoChange);
        assert_eq!(board.cell_view((2, 2)), Some(CellView::Flagged));
        assert!(!board.cell_at((2, 2)).unwrap().exploded);
    }

    #[test]
    fn out_of_bounds_is_ignored() {
        let mut board = board((3, 3), &[(2, 2)]);

        assert_eq!(board.reveal((3, 0)), RevealOutcome::NoChange);
        assert_eq!(board.chord((0, 9)), RevealOutcome::NoChange);
        assert_eq!(board.toggle_mark((5, 5), true), MarkOutcome::NoChange);
        assert_eq!(board.flag_count(), 0);
    }

    #[test]
    fn reveal_mine_explodes() {
        let mut board = board((2, 2), &[(0, 0)]);

        assert_eq!(board.reveal((0, 0)), RevealOutcome::HitMine);
        assert_eq!(board.cell_view((0, 0)), Some(CellView::Exploded));
        assert_eq!(board.revealed_count(), 0);
    }

    #[test]
    fn mark_cycle_with_question_marks() {
        let mut board = board((3, 3), &[(0, 0)]);

        assert_eq!(board.toggle_mark((1, 1), true), MarkOutcome::Changed);
        assert_eq!(board.cell_view((1, 1)), Some(CellView::Flagged));
        assert_eq!(board.flag_count(), 1);

        assert_eq!(board.toggle_mark((1, 1), true), MarkOutcome::Changed);
        assert_eq!(board.cell_view((1, 1)), Some(CellView::Questioned));
        assert_eq!(board.flag_count(), 0);

        assert_eq!(board.toggle_mark((1, 1), true), MarkOutcome::Changed);
        assert_eq!(board.cell_view((1, 1)), Some(CellView::Hidden));
        assert_eq!(board.flag_count(), 0);
    }

    #[test]
    fn mark_cycle_without_question_marks() {
        let mut board = board((3, 3), &[(0, 0)]);

        board.toggle_mark((1, 1), false);
        assert_eq!(board.cell_view((1, 1)), Some(CellView::Flagged));
        board.toggle_mark((1, 1), false);
        assert_eq!(board.cell_view((1, 1)), Some(CellView::Hidden));
        assert_eq!(board.flag_count(), 0);
    }

    #[test]
    fn revealed_cell_cannot_be_marked() {
        let mut board = board((3, 3), &[(0, 0)]);
        board.reveal((2, 2));

        assert_eq!(board.toggle_mark((2, 2), true), MarkOutcome::NoChange);
        assert_eq!(board.flag_count(), 0);
    }

    #[test]
    fn flag_count_tracks_flagged_cells() {
        let mut board = board((4, 4), &[(0, 0)]);
        let moves = [(1, 1), (2, 2), (1, 1), (3, 3), (1, 1), (2, 2), (0, 3)];

        for (i, &coords) in moves.iter().enumerate() {
            board.toggle_mark(coords, i % 2 == 0);
            let flagged = board.views().iter().filter(|&&v| v == CellView::Flagged).count();
            assert_eq!(usize::from(board.flag_count()), flagged);
        }
    }

    #[test]
    fn win_ignores_flag_correctness() {
        let mut board = board((3, 1), &[(0, 0)]);
        board.toggle_mark((2, 0), false);
        board.reveal((1, 0));
        assert!(!board.is_win());

        board.toggle_mark((2, 0), false);
        board.reveal((2, 0));
        assert!(board.is_win());
        assert_eq!(board.revealed_count(), 2);
    }

    #[test]
    fn chord_requires_exact_flag_count() {
        let mut board = board((3, 3), &[(0, 0), (2, 0)]);
        board.reveal((1, 1));

        assert_eq!(board.chord((1, 1)), RevealOutcome::NoChange);

        board.toggle_mark((0, 0), false);
        assert_eq!(board.chord((1, 1)), RevealOutcome::NoChange);

        board.toggle_mark((2, 0), false);
        board.toggle_mark((0, 2), false);
        assert_eq!(board.chord((1, 1)), RevealOutcome::NoChange);
        assert_eq!(board.revealed_count(), 1);

        board.toggle_mark((0, 2), false);
        assert_eq!(board.chord((1, 1)), RevealOutcome::Revealed);
        assert!(board.is_win());
    }

    #[test]
    fn chord_ignores_hidden_and_zero_cells() {
        let mut board = board((3, 3), &[(2, 2)]);
        assert_eq!(board.chord((0, 0)), RevealOutcome::NoChange);

        board.reveal((0, 0));
        assert_eq!(board.chord((0, 0)), RevealOutcome::NoChange);
    }

    #[test]
    fn chord_through_misplaced_flag_hits_mine_and_keeps_revealing() {
        let mut board = board((3, 3), &[(0, 0), (2, 0)]);
        board.reveal((1, 1));
        board.toggle_mark((0, 0), false);
        board.toggle_mark((0, 2), false);

        let outcome = board.chord((1, 1));

        assert!(outcome.hit_mine());
        assert!(outcome.has_update());
        assert_eq!(board.cell_view((2, 0)), Some(CellView::Exploded));
        assert_eq!(board.cell_view((1, 2)), Some(CellView::Revealed(0)));
        assert_eq!(board.cell_view((2, 2)), Some(CellView::Revealed(0)));
        assert_eq!(board.cell_view((0, 2)), Some(CellView::Flagged));
    }

    #[test]
    fn chord_can_detonate_several_mines() {
        let mut board = board((3, 3), &[(0, 0), (2, 0), (1, 2)]);
        board.reveal((1, 1));
        for coords in [(0, 1), (2, 1), (0, 2)] {
            board.toggle_mark(coords, false);
        }

        assert_eq!(board.chord((1, 1)), RevealOutcome::HitMine);
        for coords in [(0, 0), (2, 0), (1, 2)] {
            assert_eq!(board.cell_view(coords), Some(CellView::Exploded));
        }
    }

    #[test]
    fn reveal_all_mines_marks_wrong_flags() {
        let mut board = board((3, 3), &[(0, 0), (2, 2)]);
        board.toggle_mark((2, 2), false);
        board.toggle_mark((1, 0), false);
        board.reveal((0, 0));

        board.reveal_all_mines();

        assert_eq!(board.cell_view((0, 0)), Some(CellView::Exploded));
        assert_eq!(board.cell_view((2, 2)), Some(CellView::Mine));
        assert_eq!(board.cell_view((1, 0)), Some(CellView::WrongFlag));
        assert_eq!(board.cell_view((1, 1)), Some(CellView::Hidden));
    }

    #[test]
    fn reveal_all_mines_opens_flagged_mines() {
        let mut board = board((3, 3), &[(0, 0), (2, 2)]);
        board.toggle_mark((2, 2), false);
        board.reveal((0, 0));

        board.reveal_all_mines();

        assert!(board.cell_at((2, 2)).unwrap().is_revealed());
        assert_eq!(board.flag_count(), 1);
        assert_eq!(board.remaining_mines(), 1);
    }

    #[test]
    fn reveal_all_mines_exposes_unflagged_mines() {
        let mut board = board((3, 3), &[(0, 0), (2, 2)]);
        board.toggle_mark((2, 2), true);
        board.toggle_mark((2, 2), true);
        board.reveal((0, 0));

        board.reveal_all_mines();

        assert_eq!(board.cell_view((2, 2)), Some(CellView::Mine));
    }

    #[test]
    fn auto_flag_mines_after_win() {
        let mut board = board((3, 3), &[(0, 0), (2, 2)]);
        board.toggle_mark((0, 0), false);
        for coords in [(1, 0), (2, 0), (0, 1), (1, 1), (2, 1), (0, 2), (1, 2)] {
            board.reveal(coords);
        }
        assert!(board.is_win());

        board.auto_flag_mines();

        assert_eq!(board.flag_count(), 2);
        assert_eq!(board.remaining_mines(), 0);
        assert_eq!(board.cell_view((2, 2)), Some(CellView::Flagged));
    }

    #[test]
    fn hint_before_placement_is_center() {
        let mut board = Board::new(GameConfig::new((30, 16), 99), 3);
        assert_eq!(board.find_safe_hint(), Some((15, 8)));
        assert!(!board.mines_placed());
    }

    #[test]
    fn hint_points_at_safe_hidden_cell() {
        let mut board = board((4, 4), &[(0, 0), (3, 3)]);
        board.reveal((1, 0));
        board.toggle_mark((1, 1), false);

        for _ in 0..50 {
            let (x, y) = board.find_safe_hint().unwrap();
            let cell = board.cell_at((x, y)).unwrap();
            assert!(!cell.mine);
            assert_eq!(cell.state, CellState::Hidden);
        }
    }

    #[test]
    fn hint_not_found_when_only_mines_remain() {
        let mut board = board((2, 1), &[(0, 0)]);
        board.reveal((1, 0));
        assert_eq!(board.find_safe_hint(), None);
    }

    #[test]
    fn reset_clears_everything() {
        let mut board = board((3, 3), &[(0, 0)]);
        board.toggle_mark((0, 0), false);
        board.reveal((2, 2));

        board.reset();

        assert!(!board.mines_placed());
        assert_eq!(board.flag_count(), 0);
        assert_eq!(board.revealed_count(), 0);
        assert!(board.views().iter().all(|&v| v == CellView::Hidden));
    }
}
