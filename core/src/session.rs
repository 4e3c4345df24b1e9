use alloc::collections::VecDeque;
use alloc::vec::Vec;
use hashbrown::HashSet;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - NotStarted -> InProgress
/// - InProgress <-> Paused
/// - InProgress -> Won
/// - InProgress -> Lost
/// - any -> NotStarted (reset)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the first reveal, no mines placed yet
    NotStarted,
    InProgress,
    /// Clock stopped, every intent except resume is ignored
    Paused,
    Won,
    Lost,
}

impl Phase {
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::NotStarted)
    }

    /// Game ended, only a reset leaves this phase
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }

    const fn accepts_reveal(self) -> bool {
        matches!(self, Self::NotStarted | Self::InProgress)
    }
}

impl Default for Phase {
    fn default() -> Self {
        Self::NotStarted
    }
}

/// What a session call did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The current phase does not accept this intent
    Rejected,
    NoChange,
    Changed,
    Won { new_high_score: bool },
    Lost,
}

/// Everything a renderer needs after a session call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Update {
    pub outcome: Outcome,
    /// Cells whose visual state changed, each at most once
    pub changes: Vec<CellChange>,
    pub mines_left: isize,
    pub elapsed_secs: u16,
    pub phase: Phase,
}

/// Cells to highlight once a mine went off.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LossReport {
    pub exploded: Coord2,
    /// Unflagged mines that were never revealed
    pub exposed_mines: Vec<Coord2>,
    /// Flags sitting on safe cells
    pub misflagged: Vec<Coord2>,
}

/// Work-list state shared by every flood started from one reveal or chord.
#[derive(Default)]
struct Flood {
    visited: HashSet<Coord2>,
    to_visit: VecDeque<Coord2>,
    changes: Vec<CellChange>,
}

/// One play-through from the first click to a win or loss.
#[derive(Clone, Debug)]
pub struct GameSession<R = SmallRng> {
    board: Board,
    config: GameConfig,
    difficulty: Option<Difficulty>,
    phase: Phase,
    revealed_count: CellCount,
    flagged_count: CellCount,
    elapsed_secs: u16,
    triggered_mine: Option<Coord2>,
    high_scores: HighScores,
    rng: R,
}

impl GameSession<SmallRng> {
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_rng(difficulty, SmallRng::from_os_rng())
    }

    /// Session whose mine layouts are reproducible from `seed`.
    pub fn with_seed(difficulty: Difficulty, seed: u64) -> Self {
        Self::with_rng(difficulty, SmallRng::seed_from_u64(seed))
    }

    /// Plays a prepared board, it has no difficulty so it never sets a high score.
    pub fn from_board(board: Board) -> Self {
        Self::from_board_with_rng(board, SmallRng::from_os_rng())
    }
}

impl<R: RngCore + SeedableRng> GameSession<R> {
    pub fn with_rng(difficulty: Difficulty, rng: R) -> Self {
        let config = difficulty.config();
        let mut session = Self::from_board_with_rng(Board::blank(config.size), rng);
        session.config = config;
        session.difficulty = Some(difficulty);
        session
    }

    pub fn from_board_with_rng(board: Board, rng: R) -> Self {
        Self {
            config: GameConfig::new_unchecked(board.size(), board.mine_count()),
            board,
            difficulty: None,
            phase: Phase::NotStarted,
            revealed_count: 0,
            flagged_count: 0,
            elapsed_secs: 0,
            triggered_mine: None,
            high_scores: HighScores::new(),
            rng,
        }
    }

    pub fn with_high_scores(mut self, high_scores: HighScores) -> Self {
        self.high_scores = high_scores;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_final()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    /// Mines minus flags, negative when the player over-flags
    pub fn mines_left(&self) -> isize {
        (self.config.mines as isize) - (self.flagged_count as isize)
    }

    pub fn elapsed_secs(&self) -> u16 {
        self.elapsed_secs
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn into_high_scores(self) -> HighScores {
        self.high_scores
    }

    pub fn view_at(&self, coords: Coord2) -> Result<CellView> {
        let cell = self.board.cell_at(coords)?;
        Ok(self.view_of(cell))
    }

    pub fn loss_report(&self) -> Option<LossReport> {
        if self.phase != Phase::Lost {
            return None;
        }

        let mut report = LossReport {
            exploded: self.triggered_mine?,
            exposed_mines: Vec::new(),
            misflagged: Vec::new(),
        };
        for (coords, cell) in self.board.iter_cells() {
            match self.view_of(cell) {
                CellView::Mine => report.exposed_mines.push(coords),
                CellView::Misflagged => report.misflagged.push(coords),
                _ => {}
            }
        }
        Some(report)
    }

    /// Starts over on a new board, mines are placed again on the next first reveal.
    pub fn reset(&mut self, difficulty: Difficulty) -> Update {
        self.rng = R::from_rng(&mut self.rng);
        self.config = difficulty.config();
        self.difficulty = Some(difficulty);
        self.board = Board::blank(self.config.size);
        self.phase = Phase::NotStarted;
        self.revealed_count = 0;
        self.flagged_count = 0;
        self.elapsed_secs = 0;
        self.triggered_mine = None;
        log::debug!("Reset to {}", difficulty);

        let changes = self
            .board
            .iter_cells()
            .map(|(coords, _)| CellChange::new(coords, CellView::Covered))
            .collect();
        self.update(Outcome::Changed, changes)
    }

    /// Left click: reveal a covered cell, or chord a satisfied number.
    pub fn reveal(&mut self, coords: Coord2) -> Result<Update> {
        let coords = self.board.validate_coords(coords)?;

        if !self.phase.accepts_reveal() {
            return Ok(self.rejected());
        }

        if self.board[coords].is_flagged {
            return Ok(self.update(Outcome::NoChange, Vec::new()));
        }

        if self.phase.is_initial() {
            self.start(coords)?;
        }

        let mut flood = Flood::default();
        let cell = self.board[coords];
        if cell.is_revealed {
            self.chord_reveal(coords, &mut flood);
        } else {
            self.flood_reveal(coords, &mut flood);
        }
        Ok(self.settle(flood.changes))
    }

    /// Reveals every covered neighbour of a number whose flags add up.
    pub fn chord(&mut self, coords: Coord2) -> Result<Update> {
        let coords = self.board.validate_coords(coords)?;

        if self.phase != Phase::InProgress {
            return Ok(self.rejected());
        }

        let mut flood = Flood::default();
        self.chord_reveal(coords, &mut flood);
        Ok(self.settle(flood.changes))
    }

    /// Right click: place or remove a flag on a covered cell.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<Update> {
        let coords = self.board.validate_coords(coords)?;

        if self.phase != Phase::InProgress {
            return Ok(self.rejected());
        }

        let cell = self.board[coords];
        if !cell.is_flagged && self.flagged_count >= self.config.mines + FLAG_OVERFLOW {
            log::trace!("Flag limit reached, ignoring flag at {:?}", coords);
            return Ok(self.update(Outcome::NoChange, Vec::new()));
        }

        let view = match self.board.toggle_flag_at(coords) {
            FlagOutcome::NoChange => return Ok(self.update(Outcome::NoChange, Vec::new())),
            FlagOutcome::Flagged => {
                self.flagged_count += 1;
                CellView::Flagged
            }
            FlagOutcome::Unflagged => {
                self.flagged_count -= 1;
                CellView::Covered
            }
        };
        Ok(self.update(Outcome::Changed, alloc::vec![CellChange::new(coords, view)]))
    }

    pub fn pause(&mut self) -> Update {
        if self.phase != Phase::InProgress {
            return self.rejected();
        }
        self.phase = Phase::Paused;
        log::debug!("Paused at {}s", self.elapsed_secs);
        self.update(Outcome::Changed, Vec::new())
    }

    pub fn resume(&mut self) -> Update {
        if self.phase != Phase::Paused {
            return self.rejected();
        }
        self.phase = Phase::InProgress;
        log::debug!("Resumed at {}s", self.elapsed_secs);
        self.update(Outcome::Changed, Vec::new())
    }

    /// Advances the clock by one second while the game is running.
    pub fn tick(&mut self) -> Update {
        if self.phase != Phase::InProgress {
            return self.rejected();
        }
        if self.elapsed_secs >= MAX_ELAPSED_SECS {
            return self.update(Outcome::NoChange, Vec::new());
        }
        self.elapsed_secs += 1;
        self.update(Outcome::Changed, Vec::new())
    }

    /// Whether the finished game's time beats the stored best for its difficulty.
    pub fn qualifies_for_high_score(&self) -> bool {
        self.phase == Phase::Won
            && self.difficulty.is_some_and(|difficulty| {
                self.high_scores
                    .is_high_score(self.elapsed_secs, difficulty)
            })
    }

    /// Stores the winning time under `name` if it still qualifies.
    pub fn record_high_score(&mut self, name: &str) -> bool {
        if self.phase != Phase::Won {
            return false;
        }
        let Some(difficulty) = self.difficulty else {
            return false;
        };
        self.high_scores.record(name, self.elapsed_secs, difficulty)
    }

    fn start(&mut self, first_click: Coord2) -> Result<()> {
        if !self.board.mines_placed() {
            self.board
                .place_mines(self.config.mines, first_click, &mut self.rng)?;
        }
        self.phase = Phase::InProgress;
        log::debug!("Started at {:?}", first_click);
        Ok(())
    }

    /// Reveals from `start` outward through zero cells, one work-list pass.
    ///
    /// A mine ends the game but does not stop the pass, so a chord keeps
    /// opening the rest of its neighbours.
    fn flood_reveal(&mut self, start: Coord2, flood: &mut Flood) {
        flood.to_visit.push_back(start);

        while let Some(coords) = flood.to_visit.pop_front() {
            if !flood.visited.insert(coords) {
                continue;
            }

            match self.board.reveal_at(coords) {
                RevealOutcome::NoChange => {
                    log::trace!("Skipping cell at {:?}", coords);
                }
                RevealOutcome::Mine => {
                    flood
                        .changes
                        .push(CellChange::new(coords, CellView::Exploded));
                    self.end_game(false, Some(coords));
                }
                RevealOutcome::Safe(count) => {
                    flood
                        .changes
                        .push(CellChange::new(coords, CellView::Revealed(count)));
                    self.revealed_count += 1;
                    log::trace!("Revealed cell at {:?}, mine count: {}", coords, count);

                    if count == 0 {
                        let board = &self.board;
                        let visited = &flood.visited;
                        flood.to_visit.extend(
                            board
                                .neighbors_of(coords)
                                .into_iter()
                                .filter(|&pos| board[pos].is_covered())
                                .filter(|pos| !visited.contains(pos)),
                        );
                    }
                }
            }
        }

        if !self.phase.is_final() && self.revealed_count == self.config.safe_cells() {
            self.end_game(true, None);
        }
    }

    fn chord_reveal(&mut self, coords: Coord2, flood: &mut Flood) {
        let cell = self.board[coords];
        if !cell.is_revealed || cell.is_mine || cell.adjacent_mines == 0 {
            return;
        }

        let flagged = self.board.count_flagged_neighbors(coords);
        if flagged != cell.adjacent_mines {
            log::trace!(
                "Chord at {:?} declined, {} flags around a {}",
                coords,
                flagged,
                cell.adjacent_mines
            );
            return;
        }

        for pos in self.board.neighbors_of(coords) {
            if self.board[pos].is_covered() {
                self.flood_reveal(pos, flood);
            }
        }
    }

    fn end_game(&mut self, won: bool, triggered_mine: Option<Coord2>) {
        if self.phase.is_final() {
            return;
        }
        self.phase = if won { Phase::Won } else { Phase::Lost };
        self.triggered_mine = triggered_mine;
        log::debug!("Game {:?} after {}s", self.phase, self.elapsed_secs);
    }

    /// Builds the update for a reveal or chord, adding the loss markers if a mine went off.
    fn settle(&self, mut changes: Vec<CellChange>) -> Update {
        let outcome = match self.phase {
            Phase::Lost => {
                changes.extend(self.board.iter_cells().filter_map(|(coords, cell)| {
                    match self.view_of(cell) {
                        view @ (CellView::Mine | CellView::Misflagged) => {
                            Some(CellChange::new(coords, view))
                        }
                        _ => None,
                    }
                }));
                Outcome::Lost
            }
            Phase::Won => Outcome::Won {
                new_high_score: self.qualifies_for_high_score(),
            },
            _ if changes.is_empty() => Outcome::NoChange,
            _ => Outcome::Changed,
        };
        self.update(outcome, changes)
    }

    fn view_of(&self, cell: Cell) -> CellView {
        if self.phase == Phase::Lost {
            if cell.is_mine && cell.is_covered() {
                return CellView::Mine;
            }
            if cell.is_flagged && !cell.is_mine {
                return CellView::Misflagged;
            }
        }
        cell.view()
    }

    fn rejected(&self) -> Update {
        self.update(Outcome::Rejected, Vec::new())
    }

    fn update(&self, outcome: Outcome, changes: Vec<CellChange>) -> Update {
        Update {
            outcome,
            changes,
            mines_left: self.mines_left(),
            elapsed_secs: self.elapsed_secs,
            phase: self.phase,
        }
    }
}
