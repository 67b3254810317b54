//! Runtime loop tests with a scripted driver.

use std::{collections::VecDeque, convert::Infallible, sync::Arc};

use bingo_app::{Driver, Environment, Notice, Peer, PeerEvent, Runtime};
use bingo_core::{Problem, ProblemBank, Topic};
use bingo_harness::SimEnv;
use bingo_proto::SyncMessage;
use bytes::Bytes;

/// Replays queued events and records everything the runtime does.
#[derive(Default)]
struct ScriptedDriver {
    events: VecDeque<PeerEvent>,
    published: Vec<Bytes>,
    notices: Vec<Notice>,
    renders: usize,
}

impl ScriptedDriver {
    fn with_events(events: impl IntoIterator<Item = PeerEvent>) -> Self {
        Self { events: events.into_iter().collect(), ..Self::default() }
    }
}

impl Driver for ScriptedDriver {
    type Error = Infallible;

    async fn next_event(&mut self) -> Result<Option<PeerEvent>, Self::Error> {
        Ok(self.events.pop_front())
    }

    fn publish(&mut self, payload: Bytes) -> Result<(), Self::Error> {
        self.published.push(payload);
        Ok(())
    }

    fn state_changed<E: Environment>(&mut self, _peer: &Peer<E>) -> Result<(), Self::Error> {
        self.renders += 1;
        Ok(())
    }

    fn notify(&mut self, notice: Notice) -> Result<(), Self::Error> {
        self.notices.push(notice);
        Ok(())
    }

    fn stop(&mut self) {}
}

fn bank() -> Arc<ProblemBank> {
    let problems = (1..=20)
        .map(|id| Problem::new(id, format!("{id}:1 simplified"), format!("{id}:1"), Topic::RatioSimplify))
        .collect();
    Arc::new(ProblemBank::new(problems).expect("unique ids"))
}

#[tokio::test]
async fn teacher_posts_until_exhausted() {
    let bank = Arc::new(
        ProblemBank::new(vec![
            Problem::new(1, "a", "1", Topic::Percentage),
            Problem::new(2, "b", "2", Topic::Percentage),
        ])
        .expect("unique ids"),
    );
    let peer = Peer::start_teacher(SimEnv::with_seed(7), bank);
    let driver = ScriptedDriver::with_events(std::iter::repeat_n(PeerEvent::AdvanceProblem, 3));

    let runtime = Runtime::new(driver, peer);
    let peer = runtime.run().await.expect("infallible driver");

    assert_eq!(peer.progress(), (2, 2));
}

#[tokio::test]
async fn actions_reach_driver() {
    let peer = Peer::start_teacher(SimEnv::with_seed(7), bank());
    let mut runtime = Runtime::new(ScriptedDriver::default(), peer);

    assert_eq!(runtime.process_event(PeerEvent::AdvanceProblem), Ok(false));
    assert_eq!(runtime.process_event(PeerEvent::RequestReset), Ok(false));

    let driver = runtime.driver();
    assert_eq!(driver.published.len(), 1);
    assert!(matches!(
        SyncMessage::decode(&driver.published[0]),
        Ok(SyncMessage::UpdateGame(_))
    ));
    assert_eq!(driver.notices, vec![Notice::ConfirmReset]);
    assert_eq!(driver.renders, 1);
}

#[tokio::test]
async fn quit_stops_loop() {
    let peer = Peer::start_student(SimEnv::with_seed(7), bank(), "Ana").expect("valid student");
    let driver = ScriptedDriver::with_events([
        PeerEvent::ToggleCell { index: 0 },
        PeerEvent::Quit,
        PeerEvent::ToggleCell { index: 1 },
    ]);

    let mut runtime = Runtime::new(driver, peer);
    assert_eq!(runtime.process_event(PeerEvent::ToggleCell { index: 5 }), Ok(false));
    let peer = runtime.run().await.expect("infallible driver");

    let marked = peer.grid().map(|g| g.marked_indices());
    assert_eq!(marked, Some(vec![0, 5]));
}

#[tokio::test]
async fn inbound_message_merged_without_publish() {
    let mut teacher = Peer::start_teacher(SimEnv::with_seed(7), bank());
    let bytes = teacher
        .handle(PeerEvent::AdvanceProblem)
        .into_iter()
        .find_map(|a| match a {
            bingo_app::PeerAction::Publish(bytes) => Some(bytes),
            _ => None,
        })
        .expect("advance publishes");

    let student = Peer::start_student(SimEnv::with_seed(7), bank(), "Bo").expect("valid student");
    let mut runtime = Runtime::new(ScriptedDriver::default(), student);
    assert_eq!(runtime.process_event(PeerEvent::MessageReceived(bytes)), Ok(false));

    assert!(runtime.driver().published.is_empty());
    assert_eq!(runtime.peer().state(), teacher.state());
    assert_eq!(runtime.peer().current_problem().map(|p| p.id), teacher.state().current_problem_id());
}

#[tokio::test]
async fn early_claim_reported_as_retryable() {
    let peer = Peer::start_student(SimEnv::with_seed(3), bank(), "Ana").expect("valid student");
    let mut runtime = Runtime::new(ScriptedDriver::default(), peer);

    assert_eq!(runtime.process_event(PeerEvent::ClaimBingo), Ok(false));
    assert_eq!(runtime.process_event(PeerEvent::AdvanceProblem), Ok(false));

    let notices = &runtime.driver().notices;
    let [Notice::Rejected(early), Notice::Rejected(wrong_role)] = notices.as_slice() else {
        panic!("expected two rejections, got {notices:?}");
    };
    assert!(early.is_transient());
    assert!(!wrong_role.is_transient());
    assert!(runtime.driver().published.is_empty());
}
