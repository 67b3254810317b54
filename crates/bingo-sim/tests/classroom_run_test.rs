//! End-to-end classroom runs on paused tokio time.

use std::{sync::Arc, time::Duration};

use bingo_core::{Problem, ProblemBank, Topic};
use bingo_sim::{ClassroomConfig, SimError, demo_bank, run_classroom};

fn config(students: usize, rounds: usize) -> ClassroomConfig {
    ClassroomConfig {
        students,
        rounds,
        seed: Some(7),
        tick: Duration::from_millis(20),
        ..ClassroomConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn full_game_everyone_wins_and_agrees() {
    let bank = Arc::new(demo_bank().expect("demo bank"));
    let report = run_classroom(&config(4, bank.len()), Arc::clone(&bank)).await.expect("run");

    assert_eq!(report.teacher.history().len(), bank.len());
    assert_eq!(report.students.len(), 4);
    assert_eq!(report.in_sync(), 4);
    assert!(report.students.iter().all(|s| s.claim.is_some()));
    assert_eq!(report.teacher.bingo_winners().len(), 4);

    for student in &report.students {
        assert!(!student.lines.is_empty(), "{} claimed without a line", student.name);
        assert_eq!(student.board.len(), 4);
        let bracketed = student.board.iter().map(|row| row.matches('[').count()).sum::<usize>();
        assert_eq!(bracketed, student.marked);
    }
}

#[tokio::test(start_paused = true)]
async fn teacher_stops_at_exhaustion() {
    let bank = Arc::new(demo_bank().expect("demo bank"));
    let report = run_classroom(&config(1, bank.len() + 10), Arc::clone(&bank)).await.expect("run");

    assert_eq!(report.teacher.history().len(), bank.len());
    assert_eq!(report.in_sync(), 1);
}

#[tokio::test(start_paused = true)]
async fn partial_game_stays_in_sync() {
    let bank = Arc::new(demo_bank().expect("demo bank"));
    let report = run_classroom(&config(3, 5), bank).await.expect("run");

    assert_eq!(report.teacher.history().len(), 5);
    assert_eq!(report.in_sync(), 3);
    assert!(report.students.iter().all(|s| s.marked <= 5));
}

#[tokio::test(start_paused = true)]
async fn small_bank_cannot_seat_students() {
    let problems =
        (1..=4).map(|id| Problem::new(id, "q", id.to_string(), Topic::Percentage)).collect();
    let bank = Arc::new(ProblemBank::new(problems).expect("unique ids"));

    let result = run_classroom(&config(2, 3), bank).await;
    assert!(matches!(result, Err(SimError::Peer(_))));
}
