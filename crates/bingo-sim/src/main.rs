//! Classroom simulator binary.
//!
//! # Usage
//!
//! ```bash
//! # Three students, twenty problems
//! bingo-sim
//!
//! # Reproducible grids and problem order
//! bingo-sim --students 5 --rounds 26 --seed 42 --log-level debug
//! ```

use std::{sync::Arc, time::Duration};

use bingo_sim::{ClassroomConfig, demo_bank, run_classroom};
use bingo_transport::{ChannelConfig, DEFAULT_CAPACITY, DEFAULT_TOPIC};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Quiz-bingo classroom simulator
#[derive(Parser, Debug)]
#[command(name = "bingo-sim")]
#[command(about = "Run a teacher and autoplaying students over a local broadcast topic")]
#[command(version)]
struct Args {
    /// Number of students
    #[arg(short, long, default_value = "3")]
    students: usize,

    /// Problems the teacher posts before quitting
    #[arg(short, long, default_value = "20")]
    rounds: usize,

    /// Seed for grids, problem order, and claim ids
    #[arg(long)]
    seed: Option<u64>,

    /// Broadcast topic name
    #[arg(long, default_value = DEFAULT_TOPIC)]
    topic: String,

    /// Messages buffered per receiver before the oldest are dropped
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// Autoplay tick in milliseconds
    #[arg(long, default_value = "50")]
    tick_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let config = ClassroomConfig {
        students: args.students,
        rounds: args.rounds,
        seed: args.seed,
        channel: ChannelConfig::for_topic(args.topic).with_capacity(args.capacity),
        tick: Duration::from_millis(args.tick_ms),
    };

    let bank = Arc::new(demo_bank()?);
    let report = run_classroom(&config, bank).await?;

    tracing::info!(
        posted = report.teacher.history().len(),
        winners = report.teacher.bingo_winners().len(),
        in_sync = report.in_sync(),
        "classroom finished"
    );
    for (rank, winner) in report.teacher.bingo_winners().iter().enumerate() {
        tracing::info!(rank = rank + 1, name = %winner.name, timestamp = winner.timestamp, "winner");
    }
    for student in &report.students {
        tracing::info!(
            name = %student.name,
            marked = student.marked,
            lines = student.lines.len(),
            bingo = student.claim.is_some(),
            "student"
        );
        for row in &student.board {
            tracing::debug!(name = %student.name, "{row}");
        }
    }

    Ok(())
}
