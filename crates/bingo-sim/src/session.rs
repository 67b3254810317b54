//! Whole-classroom session.
//!
//! Starts a teacher and N students on one broadcast topic, each on its own
//! tokio task with an [`AutoplayDriver`], and collects their final state.

use std::{sync::Arc, time::Duration};

use bingo_app::{Peer, Runtime};
use bingo_core::{BingoGrid, GameState, ProblemBank, WinClaim, grid::GRID_SIDE};
use bingo_transport::{BroadcastHub, ChannelConfig};
use tokio::{sync::watch, task::JoinHandle};

use crate::{AutoplayDriver, PeerEnv, Plan, SimError};

/// Ticks every peer keeps running after the last post, so the last marks
/// and claims settle.
const GRACE_TICKS: u32 = 5;

/// Shape of one simulated classroom.
#[derive(Debug, Clone)]
pub struct ClassroomConfig {
    /// Number of students.
    pub students: usize,
    /// Problems the teacher posts.
    pub rounds: usize,
    /// Seed for grids, problem order, and claim ids. `None` uses OS
    /// randomness.
    pub seed: Option<u64>,
    /// Broadcast topic and capacity.
    pub channel: ChannelConfig,
    /// Autoplay tick period.
    pub tick: Duration,
}

impl Default for ClassroomConfig {
    fn default() -> Self {
        Self {
            students: 3,
            rounds: 20,
            seed: None,
            channel: ChannelConfig::default(),
            tick: Duration::from_millis(50),
        }
    }
}

/// Final state of one student.
#[derive(Debug, Clone)]
pub struct StudentReport {
    /// Display name.
    pub name: String,
    /// Cells marked at the end.
    pub marked: usize,
    /// Completed lines, as cell indices.
    pub lines: Vec<[usize; GRID_SIDE]>,
    /// Grid rows, marked answers in brackets.
    pub board: Vec<String>,
    /// The student's accepted claim.
    pub claim: Option<WinClaim>,
    /// The student's replica at the end.
    pub state: GameState,
}

/// Final state of the whole classroom.
#[derive(Debug, Clone)]
pub struct ClassroomReport {
    /// The teacher's replica at the end.
    pub teacher: GameState,
    /// One entry per student, in start order.
    pub students: Vec<StudentReport>,
}

impl ClassroomReport {
    /// Students whose replica matches the teacher's.
    pub fn in_sync(&self) -> usize {
        self.students.iter().filter(|s| s.state == self.teacher).count()
    }
}

/// Display name of student `index`.
pub fn student_name(index: usize) -> String {
    format!("Student {}", index + 1)
}

fn render_board(grid: &BingoGrid) -> Vec<String> {
    grid.rows()
        .map(|row| {
            row.iter()
                .map(|cell| {
                    if cell.marked { format!("[{}]", cell.answer) } else { cell.answer.clone() }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// Run a classroom to completion.
///
/// Every peer runs for `rounds` plus a few grace ticks, then all quit
/// together.
///
/// # Errors
///
/// - `SimError::Peer` if a session cannot start (bank too small for a grid)
/// - `SimError::Transport` if a channel cannot subscribe
/// - `SimError::Join` if a peer task panics
pub async fn run_classroom(
    config: &ClassroomConfig,
    bank: Arc<ProblemBank>,
) -> Result<ClassroomReport, SimError> {
    let hub = BroadcastHub::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut handles: Vec<JoinHandle<Result<Peer<PeerEnv>, SimError>>> =
        Vec::with_capacity(config.students);
    for index in 0..config.students {
        let env = PeerEnv::for_peer(config.seed, index as u64 + 1);
        let peer = Peer::start_student(env, Arc::clone(&bank), &student_name(index))?;
        let driver = AutoplayDriver::new(
            hub.open_with(&config.channel),
            Plan::Student,
            config.tick,
            shutdown_rx.clone(),
        )?;
        handles.push(tokio::spawn(Runtime::new(driver, peer).run()));
    }

    let teacher = Peer::start_teacher(PeerEnv::for_peer(config.seed, 0), bank);
    let driver = AutoplayDriver::new(
        hub.open_with(&config.channel),
        Plan::Teacher { rounds: config.rounds },
        config.tick,
        shutdown_rx,
    )?;
    let teacher = tokio::spawn(Runtime::new(driver, teacher).run());
    tracing::info!(
        students = config.students,
        rounds = config.rounds,
        topic = %config.channel.topic,
        "classroom started"
    );

    let ticks = u32::try_from(config.rounds).unwrap_or(u32::MAX).saturating_add(GRACE_TICKS);
    tokio::time::sleep(config.tick.saturating_mul(ticks)).await;
    shutdown_tx.send_replace(true);
    tracing::debug!("shutdown sent");

    let teacher = teacher.await??;
    let mut students = Vec::with_capacity(handles.len());
    for handle in handles {
        let peer = handle.await??;
        let grid = peer.grid();
        students.push(StudentReport {
            name: peer.identity().display_name.clone(),
            marked: grid.map_or(0, |g| g.marked_indices().len()),
            lines: grid.map(BingoGrid::winning_lines).unwrap_or_default(),
            board: grid.map(render_board).unwrap_or_default(),
            claim: peer.claim().cloned(),
            state: peer.state().clone(),
        });
    }

    Ok(ClassroomReport { teacher: teacher.state().clone(), students })
}
