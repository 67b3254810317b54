//! Operations for simulated classrooms.
//!
//! Operations represent everything that can happen in a classroom: teacher
//! controls, student controls, network delivery, and time. They are generated
//! randomly by proptest or by the fuzzer and applied to a
//! [`crate::Classroom`].

use arbitrary::Arbitrary;

/// Student selector. Taken modulo the number of students in the classroom.
pub type StudentSlot = u8;

/// One step of a simulated classroom.
#[derive(Debug, Clone, Arbitrary)]
pub enum Operation {
    /// Teacher posts a random unused problem.
    AdvanceProblem,

    /// Teacher asks for a reset.
    RequestReset,

    /// Teacher confirms the pending reset.
    ConfirmReset,

    /// Teacher drops the pending reset.
    CancelReset,

    /// Student flips an arbitrary cell.
    ///
    /// Indices past the grid exercise the rejection path.
    ToggleCell {
        /// Student performing the toggle.
        student: StudentSlot,
        /// Cell index, not reduced.
        index: u8,
    },

    /// Student marks the cell holding the current problem's answer, if it
    /// is on their grid and not already marked.
    MarkCurrent {
        /// Student performing the mark.
        student: StudentSlot,
    },

    /// Student declares bingo, valid or not.
    ClaimBingo {
        /// Student claiming.
        student: StudentSlot,
    },

    /// Hand up to `count` in-flight messages to their receivers.
    Deliver {
        /// Maximum deliveries.
        count: u8,
    },

    /// Advance the logical clock.
    AdvanceTime {
        /// Milliseconds to advance.
        millis: u16,
    },
}

impl Operation {
    /// Short name for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AdvanceProblem => "advance-problem",
            Self::RequestReset => "request-reset",
            Self::ConfirmReset => "confirm-reset",
            Self::CancelReset => "cancel-reset",
            Self::ToggleCell { .. } => "toggle-cell",
            Self::MarkCurrent { .. } => "mark-current",
            Self::ClaimBingo { .. } => "claim-bingo",
            Self::Deliver { .. } => "deliver",
            Self::AdvanceTime { .. } => "advance-time",
        }
    }
}
