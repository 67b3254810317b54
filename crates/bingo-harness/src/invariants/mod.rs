//! Invariant checking for deterministic simulation testing.
//!
//! Invariants are properties that must always hold. Rather than asserting a
//! specific scenario, they are checked after every step of arbitrary
//! simulated classrooms.
//!
//! # Architecture
//!
//! The classroom extracts observable state from each peer into a
//! [`SystemSnapshot`], then runs registered [`Invariant`] checks against it.

mod checks;
mod snapshot;

pub use checks::{
    ClaimsBackedByBingo, CurrentInHistory, HistoryUnique, ProblemConvergence, WinnerConvergence,
    WinnersOrdered,
};
pub use snapshot::{PeerSnapshot, SystemSnapshot};

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Invariant violation with context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Name of the violated invariant.
    pub invariant: &'static str,
    /// Description of what went wrong.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// An invariant that can be checked against system state.
pub trait Invariant: Send + Sync {
    /// Invariant name for error reporting.
    fn name(&self) -> &'static str;

    /// Check the invariant against a snapshot.
    fn check(&self, state: &SystemSnapshot) -> InvariantResult;
}

/// Registry of invariants to check.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with every standard invariant.
    ///
    /// Includes:
    /// - [`HistoryUnique`], [`CurrentInHistory`], [`WinnersOrdered`]: replica
    ///   state is well formed
    /// - [`ClaimsBackedByBingo`]: claims need a frozen winning grid
    /// - [`ProblemConvergence`], [`WinnerConvergence`]: peers agree once
    ///   delivery completes
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(HistoryUnique);
        registry.add(CurrentInHistory);
        registry.add(WinnersOrdered);
        registry.add(ClaimsBackedByBingo);
        registry.add(ProblemConvergence);
        registry.add(WinnerConvergence);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants against the given state.
    ///
    /// Returns `Ok(())` if all invariants hold, or all violations found.
    pub fn check_all(&self, state: &SystemSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Check all invariants, panicking with every violation.
    #[allow(clippy::panic)]
    pub fn assert_all(&self, state: &SystemSnapshot, context: &str) {
        if let Err(violations) = self.check_all(state) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("Invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}
