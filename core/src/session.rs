use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// Largest value the elapsed-time counter shows.
pub const MAX_ELAPSED_SECS: u32 = 999;

/// Valid transitions:
/// - Playing -> Won
/// - Playing -> Lost
/// - any -> Playing, on a new game
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    Playing,
    Won,
    Lost,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Classic,
    Dark,
}

impl Theme {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Classic => "Classic",
            Self::Dark => "Dark",
        }
    }

    pub const fn next(self) -> Self {
        match self {
            Self::Classic => Self::Dark,
            Self::Dark => Self::Classic,
        }
    }
}

/// Discrete requests from whatever input layer drives the session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    RevealAt(Coord2),
    MarkAt(Coord2),
    NewGame,
    SetDifficulty(Difficulty),
    ApplyCustom {
        width: Coord,
        height: Coord,
        mines: CellCount,
    },
    TogglePause,
    ToggleQuestionMarks,
    RequestHint,
    CycleTheme,
}

/// One player's game from process start to exit: the current board plus timer, settings and best times.
pub struct Session<S = JsonFileStore, C = SystemClock> {
    board: Board,
    state: GameState,
    difficulty: Difficulty,
    elapsed_secs: u32,
    timer_start: Option<Instant>,
    pause_start: Option<Instant>,
    paused: bool,
    allow_question_marks: bool,
    theme: Theme,
    hint: Option<Coord2>,
    new_best: bool,
    best_scores: BestScores,
    store: S,
    clock: C,
    rng: SmallRng,
}

impl<S: ScoreStore, C: Clock> Session<S, C> {
    /// Starts a fresh game, best scores are read from `store` once here.
    pub fn new(difficulty: Difficulty, store: S, clock: C, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let board = Board::new(difficulty.config, rng.random());
        let best_scores = store.load();
        Self {
            board,
            state: GameState::Playing,
            difficulty,
            elapsed_secs: 0,
            timer_start: None,
            pause_start: None,
            paused: false,
            allow_question_marks: true,
            theme: Theme::default(),
            hint: None,
            new_best: false,
            best_scores,
            store,
            clock,
            rng,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn score_key(&self) -> String {
        self.difficulty.score_key()
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn timer_started(&self) -> bool {
        self.timer_start.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn allows_question_marks(&self) -> bool {
        self.allow_question_marks
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn hint(&self) -> Option<Coord2> {
        self.hint
    }

    /// Whether the last won game set a new best time.
    pub fn is_new_best(&self) -> bool {
        self.new_best
    }

    pub fn remaining_mines(&self) -> i32 {
        self.board.remaining_mines()
    }

    pub fn best_scores(&self) -> &BestScores {
        &self.best_scores
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_session(self)
    }

    /// Dispatch an input intent, returns whether anything visible changed.
    pub fn apply(&mut self, intent: Intent) -> bool {
        log::trace!("intent: {:?}", intent);
        match intent {
            Intent::RevealAt(coords) => self.reveal_at(coords),
            Intent::MarkAt(coords) => self.mark_at(coords),
            Intent::NewGame => {
                self.new_game(true);
                true
            }
            Intent::SetDifficulty(difficulty) => {
                self.set_difficulty(difficulty);
                true
            }
            Intent::ApplyCustom {
                width,
                height,
                mines,
            } => {
                self.apply_custom(width, height, mines);
                true
            }
            Intent::TogglePause => self.toggle_pause(),
            Intent::ToggleQuestionMarks => {
                self.toggle_question_marks();
                true
            }
            Intent::RequestHint => self.request_hint(),
            Intent::CycleTheme => {
                self.cycle_theme();
                true
            }
        }
    }

    /// Start over, on a blank board of the same size when `keep_difficulty` is set, otherwise on a new board built
    /// from the stored difficulty.
    pub fn new_game(&mut self, keep_difficulty: bool) {
        if keep_difficulty && self.board.config() == self.difficulty.config {
            self.board.reset();
        } else {
            self.board = Board::new(self.difficulty.config, self.rng.random());
        }
        self.clear_progress();
        log::debug!("New {} game", self.difficulty.name());
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.new_game(false);
    }

    pub fn apply_custom(&mut self, width: Coord, height: Coord, mines: CellCount) {
        self.set_difficulty(Difficulty::custom(width, height, mines));
    }

    /// Begin a game on a prepared layout, e.g. a replay or a puzzle.
    pub fn start_with_layout(&mut self, layout: MineLayout) {
        self.difficulty = Difficulty::for_config(layout.game_config());
        self.board = Board::with_layout(layout, self.rng.random());
        self.clear_progress();
        log::debug!("New {} game on a prepared layout", self.difficulty.name());
    }

    fn clear_progress(&mut self) {
        self.state = GameState::Playing;
        self.elapsed_secs = 0;
        self.timer_start = None;
        self.pause_start = None;
        self.paused = false;
        self.hint = None;
        self.new_best = false;
    }

    fn accepts_moves(&self) -> bool {
        self.state == GameState::Playing && !self.paused
    }

    /// Open a hidden cell, or chord when the cell is already open.
    pub fn reveal_at(&mut self, coords: Coord2) -> bool {
        if !self.accepts_moves() {
            return false;
        }

        let Some(cell) = self.board.cell_at(coords) else {
            return false;
        };

        let outcome = if cell.is_revealed() {
            self.board.chord(coords)
        } else {
            self.board.reveal(coords)
        };

        if outcome.has_update() {
            self.hint = None;
            if self.board.mines_placed() && self.timer_start.is_none() {
                self.timer_start = Some(self.clock.now());
                log::debug!("Timer started");
            }
        }

        if outcome.hit_mine() {
            self.state = GameState::Lost;
            self.board.reveal_all_mines();
            log::debug!("Game lost at {:?}", coords);
        } else if self.board.is_win() {
            self.on_won();
        }

        outcome.has_update()
    }

    fn on_won(&mut self) {
        self.state = GameState::Won;
        self.board.auto_flag_mines();

        if self.timer_start.is_none() {
            log::debug!("Game won without a running timer");
            return;
        }

        self.update_elapsed();
        let elapsed = self.elapsed_secs.max(1);
        let key = self.score_key();
        log::debug!("Game won in {}s ({})", elapsed, key);

        if self.best_scores.record(&key, elapsed) {
            self.new_best = true;
            log::debug!("New best time for {}: {}s", key, elapsed);
            if let Err(err) = self.store.save(&self.best_scores) {
                log::warn!("Could not save best scores: {}", err);
            }
        }
    }

    pub fn mark_at(&mut self, coords: Coord2) -> bool {
        if !self.accepts_moves() {
            return false;
        }

        let outcome = self.board.toggle_mark(coords, self.allow_question_marks);
        if outcome.has_update() {
            self.hint = None;
        }
        outcome.has_update()
    }

    pub fn request_hint(&mut self) -> bool {
        if !self.accepts_moves() {
            return false;
        }

        match self.board.find_safe_hint() {
            Some(coords) => {
                log::debug!("Hint: {:?}", coords);
                self.hint = Some(coords);
                true
            }
            None => false,
        }
    }

    /// Pause or resume; time spent paused does not count.
    pub fn toggle_pause(&mut self) -> bool {
        if self.state != GameState::Playing {
            return false;
        }

        self.paused = !self.paused;
        let now = self.clock.now();
        if self.paused {
            self.pause_start = Some(now);
        } else if let Some(pause_start) = self.pause_start.take() {
            if let Some(timer_start) = self.timer_start.as_mut() {
                *timer_start += now.saturating_duration_since(pause_start);
            }
        }
        log::debug!("paused: {}", self.paused);
        true
    }

    pub fn toggle_question_marks(&mut self) {
        self.allow_question_marks = !self.allow_question_marks;
    }

    pub fn cycle_theme(&mut self) {
        self.theme = self.theme.next();
    }

    /// Advance the displayed time, called once per frame.
    pub fn tick(&mut self) {
        if self.state == GameState::Playing
            && self.board.mines_placed()
            && self.timer_start.is_some()
            && !self.paused
        {
            self.update_elapsed();
        }
    }

    fn update_elapsed(&mut self) {
        if let Some(timer_start) = self.timer_start {
            let secs = self.clock.now().saturating_duration_since(timer_start).as_secs();
            self.elapsed_secs = secs.min(MAX_ELAPSED_SECS.into()) as u32;
        }
    }
}
