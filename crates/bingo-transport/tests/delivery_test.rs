//! Delivery semantics of the local broadcast transport.

use std::time::Duration;

use bingo_transport::{BroadcastHub, ChannelConfig, LocalChannel, Transport};
use bytes::Bytes;
use tokio::{sync::mpsc, time::timeout};

const WAIT: Duration = Duration::from_secs(1);

/// Subscribe and forward every delivered payload into a queue.
fn listen(channel: &LocalChannel) -> mpsc::UnboundedReceiver<Bytes> {
    let (tx, rx) = mpsc::unbounded_channel();
    channel
        .subscribe(move |payload| {
            let _ = tx.send(payload);
        })
        .expect("subscribe inside runtime");
    rx
}

async fn next(rx: &mut mpsc::UnboundedReceiver<Bytes>) -> Bytes {
    timeout(WAIT, rx.recv()).await.expect("delivery within timeout").expect("queue open")
}

#[tokio::test]
async fn sender_does_not_hear_itself() {
    let hub = BroadcastHub::new();
    let a = hub.open("room");
    let b = hub.open("room");
    let mut a_rx = listen(&a);
    let mut b_rx = listen(&b);

    a.publish(Bytes::from_static(b"from a"));
    assert_eq!(next(&mut b_rx).await, "from a");

    b.publish(Bytes::from_static(b"from b"));
    // If a had heard its own message, it would come first.
    assert_eq!(next(&mut a_rx).await, "from b");
}

#[tokio::test]
async fn every_other_channel_receives() {
    let hub = BroadcastHub::new();
    let teacher = hub.open("room");
    let students: Vec<_> = (0..3).map(|_| hub.open("room")).collect();
    let mut queues: Vec<_> = students.iter().map(listen).collect();

    teacher.publish(Bytes::from_static(b"problem 7"));

    for rx in &mut queues {
        assert_eq!(next(rx).await, "problem 7");
    }
}

#[tokio::test]
async fn topics_are_isolated() {
    let hub = BroadcastHub::new();
    let a = hub.open("room-1");
    let b = hub.open("room-2");
    let b_probe = hub.open("room-2");
    let mut b_rx = listen(&b);

    a.publish(Bytes::from_static(b"wrong room"));
    b_probe.publish(Bytes::from_static(b"right room"));

    assert_eq!(next(&mut b_rx).await, "right room");
}

#[tokio::test]
async fn per_sender_order_preserved() {
    let hub = BroadcastHub::new();
    let sender = hub.open("room");
    let receiver = hub.open("room");
    let mut rx = listen(&receiver);

    for i in 0..50u8 {
        sender.publish(Bytes::from(vec![i]));
    }

    for i in 0..50u8 {
        assert_eq!(next(&mut rx).await.as_ref(), &[i]);
    }
}

#[tokio::test]
async fn late_subscriber_gets_no_backfill() {
    let hub = BroadcastHub::new();
    let sender = hub.open("room");
    let late = hub.open("room");

    sender.publish(Bytes::from_static(b"before"));
    let mut rx = listen(&late);
    sender.publish(Bytes::from_static(b"after"));

    assert_eq!(next(&mut rx).await, "after");
}

#[tokio::test]
async fn closed_channel_stops_delivering() {
    let hub = BroadcastHub::new();
    let sender = hub.open("room");
    let receiver = hub.open("room");
    let mut rx = listen(&receiver);

    receiver.close();
    sender.publish(Bytes::from_static(b"too late"));

    // The handler (and its queue sender) is gone once the task is aborted.
    let result = timeout(WAIT, rx.recv()).await.expect("queue closes promptly");
    assert_eq!(result, None);
}

#[tokio::test]
async fn publish_after_close_is_noop() {
    let hub = BroadcastHub::new();
    let sender = hub.open("room");
    let receiver = hub.open("room");
    let mut rx = listen(&receiver);

    sender.close();
    sender.publish(Bytes::from_static(b"ghost"));

    let probe = hub.open("room");
    probe.publish(Bytes::from_static(b"live"));
    assert_eq!(next(&mut rx).await, "live");
}

#[tokio::test]
async fn slow_receiver_loses_oldest() {
    let hub = BroadcastHub::new();
    let config = ChannelConfig::for_topic("room").with_capacity(4);
    let sender = hub.open_with(&config);
    let receiver = hub.open_with(&config);
    let mut rx = listen(&receiver);

    // Single-threaded runtime: the delivery task cannot run until we yield,
    // so all ten sends land before the receiver reads.
    for i in 0..10u8 {
        sender.publish(Bytes::from(vec![i]));
    }

    for i in 6..10u8 {
        assert_eq!(next(&mut rx).await.as_ref(), &[i]);
    }
}
