//! Per-student bingo grid.
//!
//! A grid is 16 cells on a 4×4 board, filled once per student session with
//! distinct answers sampled from the problem bank. Marks are local only; the
//! grid reaches the network solely through a claim.
//!
//! Win detection is a pure function of the current marks, recomputed on
//! every call. With 16 cells and 10 lines, recomputation is cheaper than
//! keeping counters correct across toggles.

use crate::{env::Environment, error::GridError, problem::ProblemBank};

/// Cells per side.
pub const GRID_SIDE: usize = 4;

/// Cells per grid.
pub const GRID_SIZE: usize = GRID_SIDE * GRID_SIDE;

/// Every row, column, and diagonal of a 4×4 board.
pub const WINNING_COMBINATIONS: [[usize; GRID_SIDE]; 10] = [
    // Rows
    [0, 1, 2, 3],
    [4, 5, 6, 7],
    [8, 9, 10, 11],
    [12, 13, 14, 15],
    // Columns
    [0, 4, 8, 12],
    [1, 5, 9, 13],
    [2, 6, 10, 14],
    [3, 7, 11, 15],
    // Diagonals
    [0, 5, 10, 15],
    [3, 6, 9, 12],
];

/// One grid position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    /// Answer text shown in the cell.
    pub answer: String,
    /// Whether the student marked it.
    pub marked: bool,
}

/// A student's bingo grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BingoGrid {
    cells: Vec<GridCell>,
    /// Set once a claim is submitted. Marks are frozen from then on.
    claimed: bool,
}

impl BingoGrid {
    /// Sample 16 distinct answers from `bank` uniformly without replacement.
    ///
    /// Uses a partial Fisher-Yates shuffle driven by `env`, so a seeded
    /// environment always produces the same grid.
    pub fn generate<E: Environment>(bank: &ProblemBank, env: &E) -> Result<Self, GridError> {
        let mut answers = bank.distinct_answers();
        if answers.len() < GRID_SIZE {
            return Err(GridError::NotEnoughAnswers {
                needed: GRID_SIZE,
                available: answers.len(),
            });
        }

        for i in 0..GRID_SIZE {
            let j = i + env.random_below(answers.len() - i);
            answers.swap(i, j);
        }
        answers.truncate(GRID_SIZE);

        Self::from_answers(answers)
    }

    /// Build a grid from exactly 16 distinct answers, in position order.
    pub fn from_answers<S: Into<String>>(
        answers: impl IntoIterator<Item = S>,
    ) -> Result<Self, GridError> {
        let mut cells: Vec<GridCell> = Vec::with_capacity(GRID_SIZE);
        for answer in answers {
            let answer = answer.into();
            if !cells.iter().any(|c| c.answer == answer) {
                cells.push(GridCell { answer, marked: false });
            }
        }

        if cells.len() != GRID_SIZE {
            return Err(GridError::NotEnoughAnswers { needed: GRID_SIZE, available: cells.len() });
        }

        Ok(Self { cells, claimed: false })
    }

    /// Cell at `index`. `None` if out of range.
    pub fn cell(&self, index: usize) -> Option<&GridCell> {
        self.cells.get(index)
    }

    /// Cells grouped by row.
    pub fn rows(&self) -> impl Iterator<Item = &[GridCell]> {
        self.cells.chunks(GRID_SIDE)
    }

    /// Position of the cell showing `answer`, if the grid has it.
    pub fn cell_for_answer(&self, answer: &str) -> Option<usize> {
        self.cells.iter().position(|c| c.answer == answer)
    }

    /// Flip the mark on one cell.
    ///
    /// Returns `false` without touching anything once a claim has been
    /// submitted.
    pub fn toggle(&mut self, index: usize) -> Result<bool, GridError> {
        let size = self.cells.len();
        let cell =
            self.cells.get_mut(index).ok_or(GridError::CellOutOfRange { index, size })?;

        if self.claimed {
            return Ok(false);
        }

        cell.marked = !cell.marked;
        Ok(true)
    }

    /// Indices of marked cells, ascending.
    pub fn marked_indices(&self) -> Vec<usize> {
        self.cells.iter().enumerate().filter(|(_, c)| c.marked).map(|(i, _)| i).collect()
    }

    /// Lines whose four cells are all marked.
    pub fn winning_lines(&self) -> Vec<[usize; GRID_SIDE]> {
        WINNING_COMBINATIONS
            .iter()
            .filter(|line| line.iter().all(|&i| self.cells[i].marked))
            .copied()
            .collect()
    }

    /// True iff at least one winning combination is fully marked.
    pub fn has_bingo(&self) -> bool {
        WINNING_COMBINATIONS.iter().any(|line| line.iter().all(|&i| self.cells[i].marked))
    }

    /// True once a claim has been submitted.
    pub fn is_claimed(&self) -> bool {
        self.claimed
    }

    /// Accept a claim and freeze the grid for the rest of the session.
    ///
    /// # Errors
    ///
    /// - `GridError::AlreadyClaimed` if a claim was already submitted
    /// - `GridError::NoBingo` if no line is complete
    pub fn claim(&mut self) -> Result<(), GridError> {
        if self.claimed {
            return Err(GridError::AlreadyClaimed);
        }
        if !self.has_bingo() {
            return Err(GridError::NoBingo);
        }

        self.claimed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> BingoGrid {
        BingoGrid::from_answers((0..GRID_SIZE).map(|i| format!("a{i}"))).expect("16 answers")
    }

    fn mark(grid: &mut BingoGrid, indices: &[usize]) {
        for &i in indices {
            assert_eq!(grid.toggle(i), Ok(true));
        }
    }

    #[test]
    fn combinations_cover_rows_columns_diagonals() {
        assert_eq!(WINNING_COMBINATIONS.len(), 2 * GRID_SIDE + 2);
        for line in WINNING_COMBINATIONS {
            assert!(line.iter().all(|&i| i < GRID_SIZE));
        }
    }

    #[test]
    fn full_row_is_bingo() {
        let mut grid = grid();
        mark(&mut grid, &[0, 1, 2, 3]);
        assert!(grid.has_bingo());
        assert_eq!(grid.winning_lines(), vec![[0, 1, 2, 3]]);
    }

    #[test]
    fn three_of_a_row_is_not_bingo() {
        let mut grid = grid();
        mark(&mut grid, &[0, 1, 2]);
        assert!(!grid.has_bingo());
        assert_eq!(grid.claim(), Err(GridError::NoBingo));
    }

    #[test]
    fn column_and_diagonals_win() {
        for line in [[1, 5, 9, 13], [0, 5, 10, 15], [3, 6, 9, 12]] {
            let mut grid = grid();
            mark(&mut grid, &line);
            assert!(grid.has_bingo(), "line {line:?} should win");
        }
    }

    #[test]
    fn unmarking_breaks_bingo() {
        let mut grid = grid();
        mark(&mut grid, &[4, 5, 6, 7]);
        mark(&mut grid, &[6]);
        assert!(!grid.has_bingo());
        assert_eq!(grid.marked_indices(), vec![4, 5, 7]);
    }

    #[test]
    fn claim_freezes_marks() {
        let mut grid = grid();
        mark(&mut grid, &[0, 1, 2, 3]);
        assert_eq!(grid.claim(), Ok(()));

        assert_eq!(grid.toggle(0), Ok(false));
        assert_eq!(grid.toggle(9), Ok(false));
        assert_eq!(grid.marked_indices(), vec![0, 1, 2, 3]);
        assert_eq!(grid.claim(), Err(GridError::AlreadyClaimed));
    }

    #[test]
    fn out_of_range_toggle_rejected() {
        let mut grid = grid();
        assert_eq!(grid.toggle(16), Err(GridError::CellOutOfRange { index: 16, size: 16 }));
    }

    #[test]
    fn from_answers_requires_sixteen_distinct() {
        let result = BingoGrid::from_answers(["x"; GRID_SIZE]);
        assert_eq!(result, Err(GridError::NotEnoughAnswers { needed: 16, available: 1 }));
    }

    #[test]
    fn rows_are_four_wide() {
        let grid = grid();
        let rows: Vec<_> = grid.rows().collect();
        assert_eq!(rows.len(), GRID_SIDE);
        assert_eq!(rows[1][0].answer, "a4");
        assert_eq!(grid.cell_for_answer("a15"), Some(15));
    }
}
