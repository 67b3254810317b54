//! Error types for the quiz-bingo core.
//!
//! None of these are fatal for a peer. State errors reject a single update
//! and leave the replica untouched; grid errors reject a single student
//! action.

use bingo_proto::ProblemId;
use thiserror::Error;

/// An update would break a [`crate::GameState`] invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The resulting history would post a problem twice.
    #[error("problem {0} appears more than once in history")]
    DuplicateHistoryEntry(ProblemId),

    /// The resulting current problem would not be in the history.
    #[error("current problem {0} is not in history")]
    CurrentNotInHistory(ProblemId),
}

/// Errors from the bingo grid engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// The problem bank cannot fill a grid with distinct answers.
    #[error("need {needed} distinct answers, bank has {available}")]
    NotEnoughAnswers {
        /// Cells in a grid.
        needed: usize,
        /// Distinct answers available.
        available: usize,
    },

    /// Cell index outside the grid.
    #[error("cell {index} out of range (grid has {size} cells)")]
    CellOutOfRange {
        /// Requested index.
        index: usize,
        /// Cells in a grid.
        size: usize,
    },

    /// No winning combination is fully marked.
    #[error("no completed line on the grid")]
    NoBingo,

    /// A claim was already submitted this session.
    #[error("bingo already claimed this session")]
    AlreadyClaimed,
}

impl GridError {
    /// Returns true if the same action may succeed later in the session.
    ///
    /// A missing line can still be completed; a claimed session and a
    /// malformed grid stay that way.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NoBingo)
    }
}

/// Errors building a [`crate::ProblemBank`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankError {
    /// Two problems share an id.
    #[error("duplicate problem id {0}")]
    DuplicateProblemId(ProblemId),
}
