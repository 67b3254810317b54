//! Peer session state machine.
//!
//! A [`Peer`] is one running teacher or student. It owns the peer's replica of
//! the shared game state and, for students, the local bingo grid. It consumes
//! [`PeerEvent`]s and returns [`PeerAction`]s; it never performs I/O.
//!
//! # Responsibilities
//!
//! - Teacher: pick unused problems at random, run the two-step reset.
//! - Student: mark cells, validate and publish bingo claims.
//! - Both: merge inbound messages into the replica.

use std::{fmt, sync::Arc};

use bingo_core::{
    BingoGrid, GameState, Problem, ProblemBank, Replica, ReplicaAction, env::Environment,
};
use bingo_proto::{GameUpdate, WinClaim};

use crate::{Notice, PeerAction, PeerError, PeerEvent};

/// Display name given to the teacher.
pub const DEFAULT_TEACHER_NAME: &str = "Teacher";

/// Which side of the classroom a peer is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Posts problems and resets the game.
    Teacher,
    /// Marks a grid and claims bingo.
    Student,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Teacher => f.write_str("teacher"),
            Self::Student => f.write_str("student"),
        }
    }
}

/// Who this peer is. Fixed for the life of the session.
///
/// Never transmitted, except the display name inside a bingo claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerIdentity {
    /// Teacher or student.
    pub role: Role,
    /// Name shown to others.
    pub display_name: String,
}

#[derive(Debug, Clone)]
enum RoleState {
    Teacher { reset_pending: bool },
    Student { grid: BingoGrid, claim: Option<WinClaim> },
}

/// One teacher or student session.
#[derive(Debug, Clone)]
pub struct Peer<E: Environment> {
    identity: PeerIdentity,
    replica: Replica<E>,
    bank: Arc<ProblemBank>,
    role: RoleState,
}

impl<E: Environment> Peer<E> {
    /// Start a teacher session named [`DEFAULT_TEACHER_NAME`].
    pub fn start_teacher(env: E, bank: Arc<ProblemBank>) -> Self {
        tracing::info!(problems = bank.len(), "teacher session started");

        Self {
            identity: PeerIdentity {
                role: Role::Teacher,
                display_name: DEFAULT_TEACHER_NAME.to_string(),
            },
            replica: Replica::new(env),
            bank,
            role: RoleState::Teacher { reset_pending: false },
        }
    }

    /// Start a student session and generate the student's grid.
    ///
    /// # Errors
    ///
    /// - `PeerError::EmptyDisplayName` if `name` is blank
    /// - `PeerError::Grid` if the bank has fewer than 16 distinct answers
    pub fn start_student(env: E, bank: Arc<ProblemBank>, name: &str) -> Result<Self, PeerError> {
        let display_name = name.trim();
        if display_name.is_empty() {
            return Err(PeerError::EmptyDisplayName);
        }

        let grid = BingoGrid::generate(&bank, &env)?;
        tracing::info!(name = display_name, "student session started");

        Ok(Self {
            identity: PeerIdentity {
                role: Role::Student,
                display_name: display_name.to_string(),
            },
            replica: Replica::new(env),
            bank,
            role: RoleState::Student { grid, claim: None },
        })
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: PeerEvent) -> Vec<PeerAction> {
        match event {
            PeerEvent::AdvanceProblem => self.as_teacher(&event, Self::advance_problem),
            PeerEvent::RequestReset => self.as_teacher(&event, Self::request_reset),
            PeerEvent::ConfirmReset => self.as_teacher(&event, Self::confirm_reset),
            PeerEvent::CancelReset => self.as_teacher(&event, Self::cancel_reset),
            PeerEvent::ToggleCell { index } => self.toggle_cell(&event, index),
            PeerEvent::ClaimBingo => self.claim_bingo(&event),
            PeerEvent::MessageReceived(bytes) => {
                let actions = self.replica.apply_remote_bytes(&bytes);
                self.convert(actions)
            },
            PeerEvent::Quit => vec![PeerAction::Quit],
        }
    }

    fn as_teacher(
        &mut self,
        event: &PeerEvent,
        f: impl FnOnce(&mut Self) -> Vec<PeerAction>,
    ) -> Vec<PeerAction> {
        if self.identity.role == Role::Teacher {
            f(self)
        } else {
            self.wrong_role(event)
        }
    }

    fn wrong_role(&self, event: &PeerEvent) -> Vec<PeerAction> {
        tracing::debug!(event = event.name(), role = %self.identity.role, "event for other role");
        reject(PeerError::WrongRole { event: event.name(), role: self.identity.role })
    }

    fn advance_problem(&mut self) -> Vec<PeerAction> {
        let history = self.replica.state().history();
        let candidates: Vec<&Problem> = self.bank.unused(history).collect();

        if candidates.is_empty() {
            tracing::info!(posted = history.len(), "problem bank exhausted");
            return vec![PeerAction::Notify(Notice::ProblemsExhausted)];
        }

        let pick = candidates[self.replica.env().random_below(candidates.len())].id;
        let mut next_history = history.to_vec();
        next_history.push(pick);

        tracing::info!(problem = pick, posted = next_history.len(), "problem posted");

        let update = GameUpdate::new().with_current_problem(Some(pick)).with_history(next_history);
        self.apply_local(update)
    }

    fn request_reset(&mut self) -> Vec<PeerAction> {
        if let RoleState::Teacher { reset_pending } = &mut self.role {
            *reset_pending = true;
        }
        vec![PeerAction::Notify(Notice::ConfirmReset)]
    }

    fn confirm_reset(&mut self) -> Vec<PeerAction> {
        let RoleState::Teacher { reset_pending } = &mut self.role else {
            return vec![];
        };
        if !*reset_pending {
            return reject(PeerError::NoPendingReset);
        }
        *reset_pending = false;

        tracing::info!("game reset");
        self.apply_local(GameUpdate::reset())
    }

    fn cancel_reset(&mut self) -> Vec<PeerAction> {
        if let RoleState::Teacher { reset_pending } = &mut self.role
            && *reset_pending
        {
            *reset_pending = false;
            tracing::debug!("reset cancelled");
        }
        vec![]
    }

    fn toggle_cell(&mut self, event: &PeerEvent, index: usize) -> Vec<PeerAction> {
        let RoleState::Student { grid, .. } = &mut self.role else {
            return self.wrong_role(event);
        };

        match grid.toggle(index) {
            Ok(true) => vec![PeerAction::GridChanged],
            Ok(false) => {
                tracing::debug!(index, "grid frozen after claim, toggle ignored");
                vec![]
            },
            Err(e) => reject(e.into()),
        }
    }

    fn claim_bingo(&mut self, event: &PeerEvent) -> Vec<PeerAction> {
        let RoleState::Student { grid, claim } = &mut self.role else {
            return self.wrong_role(event);
        };

        if let Err(e) = grid.claim() {
            tracing::debug!(error = %e, "bingo claim refused");
            return reject(e.into());
        }

        let (accepted, replica_actions) =
            self.replica.apply_local_bingo_claim(&self.identity.display_name);
        *claim = Some(accepted.clone());

        let mut actions = self.convert(replica_actions);
        actions.push(PeerAction::GridChanged);
        actions.push(PeerAction::Notify(Notice::BingoConfirmed(accepted)));
        actions
    }

    fn apply_local(&mut self, update: GameUpdate) -> Vec<PeerAction> {
        match self.replica.apply_local_update(update) {
            Ok(actions) => self.convert(actions),
            Err(e) => {
                tracing::warn!(error = %e, "local update refused");
                reject(e.into())
            },
        }
    }

    /// Encode replica publishes for the wire.
    fn convert(&self, actions: Vec<ReplicaAction>) -> Vec<PeerAction> {
        actions
            .into_iter()
            .filter_map(|action| match action {
                ReplicaAction::Publish(message) => match message.to_bytes() {
                    Ok(bytes) => Some(PeerAction::Publish(bytes)),
                    Err(e) => {
                        tracing::error!(error = %e, kind = message.kind(), "failed to encode message");
                        None
                    },
                },
                ReplicaAction::StateChanged(state) => Some(PeerAction::StateChanged(state)),
            })
            .collect()
    }

    /// Who this peer is.
    pub fn identity(&self) -> &PeerIdentity {
        &self.identity
    }

    /// This peer's replica of the shared state.
    pub fn state(&self) -> &GameState {
        self.replica.state()
    }

    /// The student's grid. `None` for the teacher.
    pub fn grid(&self) -> Option<&BingoGrid> {
        match &self.role {
            RoleState::Student { grid, .. } => Some(grid),
            RoleState::Teacher { .. } => None,
        }
    }

    /// The student's accepted claim, if any.
    pub fn claim(&self) -> Option<&WinClaim> {
        match &self.role {
            RoleState::Student { claim, .. } => claim.as_ref(),
            RoleState::Teacher { .. } => None,
        }
    }

    /// True while a reset waits for confirmation.
    pub fn is_reset_pending(&self) -> bool {
        matches!(self.role, RoleState::Teacher { reset_pending: true })
    }

    /// Problem currently posted, looked up in the bank.
    ///
    /// `None` if nothing is posted or the id is not in this peer's bank.
    pub fn current_problem(&self) -> Option<&Problem> {
        self.state().current_problem_id().and_then(|id| self.bank.get(id))
    }

    /// Grid cell holding the current problem's answer, if this student has
    /// one.
    pub fn current_answer_cell(&self) -> Option<usize> {
        let problem = self.current_problem()?;
        self.grid()?.cell_for_answer(&problem.answer)
    }

    /// `(posted, total)` problem counts.
    pub fn progress(&self) -> (usize, usize) {
        (self.state().history().len(), self.bank.len())
    }

    /// The problem bank.
    pub fn bank(&self) -> &ProblemBank {
        &self.bank
    }
}

fn reject(error: PeerError) -> Vec<PeerAction> {
    vec![PeerAction::Notify(Notice::Rejected(error))]
}

#[cfg(test)]
mod tests {
    use bingo_core::{GridError, Topic};
    use bingo_harness::SimEnv;
    use bingo_proto::SyncMessage;
    use bytes::Bytes;

    use super::*;

    fn bank(size: u32) -> Arc<ProblemBank> {
        let problems = (1..=size)
            .map(|id| Problem::new(id, format!("{id}% of 100"), id.to_string(), Topic::Percentage))
            .collect();
        Arc::new(ProblemBank::new(problems).expect("unique ids"))
    }

    fn teacher(size: u32) -> Peer<SimEnv> {
        Peer::start_teacher(SimEnv::with_seed(1), bank(size))
    }

    fn student(name: &str) -> Peer<SimEnv> {
        Peer::start_student(SimEnv::with_seed(2), bank(20), name).expect("valid student")
    }

    fn published(actions: &[PeerAction]) -> Vec<SyncMessage> {
        actions
            .iter()
            .filter_map(|a| match a {
                PeerAction::Publish(bytes) => Some(SyncMessage::decode(bytes).expect("decodes")),
                _ => None,
            })
            .collect()
    }

    /// Mark the first row and claim.
    fn win(student: &mut Peer<SimEnv>) -> Vec<PeerAction> {
        for index in 0..4 {
            assert_eq!(student.handle(PeerEvent::ToggleCell { index }), vec![PeerAction::GridChanged]);
        }
        student.handle(PeerEvent::ClaimBingo)
    }

    #[test]
    fn bank_of_three_exhausts_after_three_posts() {
        let mut teacher = teacher(3);

        for _ in 0..3 {
            let actions = teacher.handle(PeerEvent::AdvanceProblem);
            assert_eq!(published(&actions).len(), 1);
        }

        let mut posted = teacher.state().history().to_vec();
        posted.sort_unstable();
        assert_eq!(posted, vec![1, 2, 3]);
        assert_eq!(teacher.state().current_problem_id(), teacher.state().history().last().copied());

        let before = teacher.state().clone();
        let actions = teacher.handle(PeerEvent::AdvanceProblem);
        assert_eq!(actions, vec![PeerAction::Notify(Notice::ProblemsExhausted)]);
        assert_eq!(teacher.state(), &before);
        assert_eq!(teacher.progress(), (3, 3));
    }

    #[test]
    fn advance_publishes_full_history() {
        let mut teacher = teacher(5);
        teacher.handle(PeerEvent::AdvanceProblem);
        let actions = teacher.handle(PeerEvent::AdvanceProblem);

        let messages = published(&actions);
        let [SyncMessage::UpdateGame(update)] = messages.as_slice() else {
            panic!("expected one UPDATE_GAME");
        };
        assert_eq!(update.history.as_deref(), Some(teacher.state().history()));
        assert_eq!(update.current_problem_id, Some(teacher.state().current_problem_id()));
        assert!(update.bingo_winners.is_none());
        assert!(teacher.current_problem().is_some());
    }

    #[test]
    fn reset_needs_confirmation() {
        let mut teacher = teacher(5);
        teacher.handle(PeerEvent::AdvanceProblem);

        assert_eq!(
            teacher.handle(PeerEvent::ConfirmReset),
            vec![PeerAction::Notify(Notice::Rejected(PeerError::NoPendingReset))]
        );

        assert_eq!(teacher.handle(PeerEvent::RequestReset), vec![PeerAction::Notify(Notice::ConfirmReset)]);
        assert!(teacher.is_reset_pending());
        assert_eq!(teacher.state().history().len(), 1);

        let actions = teacher.handle(PeerEvent::ConfirmReset);
        assert_eq!(published(&actions), vec![SyncMessage::UpdateGame(GameUpdate::reset())]);
        assert_eq!(teacher.state(), &GameState::new());
        assert!(!teacher.is_reset_pending());
    }

    #[test]
    fn cancelled_reset_changes_nothing() {
        let mut teacher = teacher(5);
        teacher.handle(PeerEvent::AdvanceProblem);
        teacher.handle(PeerEvent::RequestReset);

        assert!(teacher.handle(PeerEvent::CancelReset).is_empty());
        assert!(!teacher.is_reset_pending());
        assert_eq!(teacher.state().history().len(), 1);
        assert!(matches!(
            teacher.handle(PeerEvent::ConfirmReset).as_slice(),
            [PeerAction::Notify(Notice::Rejected(PeerError::NoPendingReset))]
        ));
    }

    #[test]
    fn student_name_trimmed_and_required() {
        assert_eq!(student("  Ana ").identity().display_name, "Ana");
        assert_eq!(
            Peer::start_student(SimEnv::with_seed(0), bank(20), "   ").err(),
            Some(PeerError::EmptyDisplayName)
        );
    }

    #[test]
    fn small_bank_cannot_fill_grid() {
        let result = Peer::start_student(SimEnv::with_seed(0), bank(10), "Ana");
        assert_eq!(
            result.err(),
            Some(PeerError::Grid(GridError::NotEnoughAnswers { needed: 16, available: 10 }))
        );
    }

    #[test]
    fn claim_without_line_rejected() {
        let mut ana = student("Ana");
        ana.handle(PeerEvent::ToggleCell { index: 0 });

        let actions = ana.handle(PeerEvent::ClaimBingo);
        assert_eq!(actions, reject(PeerError::Grid(GridError::NoBingo)));
        assert!(ana.state().bingo_winners().is_empty());
        assert!(ana.claim().is_none());
    }

    #[test]
    fn valid_claim_published_and_confirmed() {
        let mut ana = student("Ana");
        let actions = win(&mut ana);

        let claim = ana.claim().cloned().expect("claim recorded");
        assert_eq!(claim.name, "Ana");
        assert_eq!(published(&actions), vec![SyncMessage::BingoClaim(claim.clone())]);
        assert_eq!(actions.last(), Some(&PeerAction::Notify(Notice::BingoConfirmed(claim.clone()))));
        assert_eq!(ana.state().bingo_winners(), &[claim]);
    }

    #[test]
    fn grid_frozen_after_claim() {
        let mut ana = student("Ana");
        win(&mut ana);
        let marks = ana.grid().map(BingoGrid::marked_indices);

        assert!(ana.handle(PeerEvent::ToggleCell { index: 0 }).is_empty());
        assert!(ana.handle(PeerEvent::ToggleCell { index: 9 }).is_empty());
        assert_eq!(ana.grid().map(BingoGrid::marked_indices), marks);

        assert_eq!(ana.handle(PeerEvent::ClaimBingo), reject(PeerError::Grid(GridError::AlreadyClaimed)));
        assert_eq!(ana.state().bingo_winners().len(), 1);
    }

    #[test]
    fn roles_enforced() {
        let mut teacher = teacher(5);
        let mut ana = student("Ana");

        assert!(matches!(
            teacher.handle(PeerEvent::ClaimBingo).as_slice(),
            [PeerAction::Notify(Notice::Rejected(PeerError::WrongRole { role: Role::Teacher, .. }))]
        ));
        assert!(matches!(
            ana.handle(PeerEvent::AdvanceProblem).as_slice(),
            [PeerAction::Notify(Notice::Rejected(PeerError::WrongRole { role: Role::Student, .. }))]
        ));
        assert!(ana.state().history().is_empty());
    }

    #[test]
    fn remote_message_changes_state_without_publishing() {
        let mut teacher = teacher(5);
        let mut ana = student("Ana");

        let actions = teacher.handle(PeerEvent::AdvanceProblem);
        for action in actions {
            if let PeerAction::Publish(bytes) = action {
                let received = ana.handle(PeerEvent::MessageReceived(bytes));
                assert!(matches!(received.as_slice(), [PeerAction::StateChanged(_)]));
            }
        }
        assert_eq!(ana.state(), teacher.state());
    }

    #[test]
    fn garbage_bytes_ignored() {
        let mut ana = student("Ana");
        let actions = ana.handle(PeerEvent::MessageReceived(Bytes::from_static(b"\x00garbage")));
        assert!(actions.is_empty());
        assert_eq!(ana.state(), &GameState::new());
    }

    #[test]
    fn current_answer_located_on_grid() {
        let mut teacher = teacher(20);
        let mut ana = student("Ana");
        assert_eq!(ana.current_answer_cell(), None);

        for action in teacher.handle(PeerEvent::AdvanceProblem) {
            if let PeerAction::Publish(bytes) = action {
                ana.handle(PeerEvent::MessageReceived(bytes));
            }
        }

        let answer = &ana.current_problem().expect("problem posted").answer;
        let grid = ana.grid().expect("student has a grid");
        assert_eq!(ana.current_answer_cell(), grid.cell_for_answer(answer));
        assert_eq!(teacher.current_answer_cell(), None);
    }

    #[test]
    fn quit_passes_through() {
        assert_eq!(student("Ana").handle(PeerEvent::Quit), vec![PeerAction::Quit]);
    }
}
