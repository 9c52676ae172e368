//! End-to-end tests of the provider → poller → dispatcher pipeline.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use vcpkit_core::{StatusChannel, StatusEvent, StatusField};
use vcpkit_status::{
    ChannelFilter, CodeFormatter, FileLoadedBridge, MessageClass, PollerConfig, PositionTracker,
    RawMessage, SimStatusProvider, StatusDispatcher, StatusPoller, StatusSync,
};

struct Pipeline {
    provider: SimStatusProvider,
    dispatcher: Arc<StatusDispatcher>,
    poller: StatusPoller,
    _tracker: PositionTracker,
    _formatter: CodeFormatter,
    _file_bridge: FileLoadedBridge,
}

fn pipeline() -> Pipeline {
    let provider = SimStatusProvider::new();
    let dispatcher = Arc::new(StatusDispatcher::new());
    let sync = StatusSync::new(provider.clone(), dispatcher.clone());
    let snapshot = sync.snapshot();

    let tracker = PositionTracker::attach(dispatcher.clone(), snapshot.clone());
    let formatter = CodeFormatter::attach(dispatcher.clone());
    let file_bridge = FileLoadedBridge::attach(dispatcher.clone(), snapshot);

    Pipeline {
        provider,
        dispatcher: dispatcher.clone(),
        poller: StatusPoller::new(sync, PollerConfig { cycle_time_ms: 5 }),
        _tracker: tracker,
        _formatter: formatter,
        _file_bridge: file_bridge,
    }
}

async fn wait_for(counter: &AtomicUsize, at_least: usize) {
    let mut attempts = 0;
    while counter.load(Ordering::SeqCst) < at_least && attempts < 200 {
        tokio::time::sleep(Duration::from_millis(5)).await;
        attempts += 1;
    }
}

#[tokio::test]
async fn test_field_change_reaches_subscriber() {
    let mut p = pipeline();

    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    p.dispatcher
        .subscribe_channel(StatusChannel::Field(StatusField::SpindleSpeed), move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

    p.poller.start();
    p.provider.update(|record| record.spindle_speed = 2400.0);

    wait_for(&count, 1).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);

    p.poller.stop().await;
}

#[tokio::test]
async fn test_position_change_produces_composite_event() {
    let mut p = pipeline();

    let updates: Arc<Mutex<Vec<StatusEvent>>> = Arc::default();
    let count = Arc::new(AtomicUsize::new(0));
    let (u, c) = (updates.clone(), count.clone());
    p.dispatcher
        .subscribe_channel(StatusChannel::AxisPositions, move |event| {
            u.lock().push(event.clone());
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

    p.poller.start();
    p.provider.update(|record| {
        record.position[0] = 12.5;
        record.g5x_offset[0] = 2.5;
    });

    wait_for(&count, 1).await;
    p.poller.stop().await;

    let updates = updates.lock();
    assert!(!updates.is_empty());
    match &updates[0] {
        StatusEvent::AxisPositions(update) => {
            assert_eq!(update.absolute[0], 12.5);
            assert_eq!(update.relative[0], 10.0);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_gcode_change_produces_formatted_list() {
    let mut p = pipeline();

    let formatted: Arc<Mutex<Vec<Vec<String>>>> = Arc::default();
    let count = Arc::new(AtomicUsize::new(0));
    let (f, c) = (formatted.clone(), count.clone());
    p.dispatcher
        .subscribe_channel(StatusChannel::FormattedGcodes, move |event| {
            if let StatusEvent::FormattedGcodes(codes) = event {
                f.lock().push(codes.clone());
            }
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

    p.poller.start();
    p.provider
        .update(|record| record.gcodes = vec![0, 10, 11, -1, 20]);

    wait_for(&count, 1).await;
    p.poller.stop().await;

    assert_eq!(formatted.lock()[0], vec!["G1", "G1.1", "G2"]);
}

#[tokio::test]
async fn test_error_channel_message_flow() {
    let mut p = pipeline();

    let errors: Arc<Mutex<Vec<String>>> = Arc::default();
    let count = Arc::new(AtomicUsize::new(0));
    let (e, c) = (errors.clone(), count.clone());
    p.dispatcher
        .subscribe_channel(StatusChannel::MachineError, move |event| {
            if let StatusEvent::MachineError(text) = event {
                e.lock().push(text.clone());
            }
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

    p.poller.start();
    p.provider.push_message(RawMessage {
        class: MessageClass::OperatorError,
        text: "".into(),
    });

    wait_for(&count, 1).await;
    p.poller.stop().await;

    assert_eq!(errors.lock().as_slice(), ["Unknown error!"]);
}

#[tokio::test]
async fn test_late_subscriber_catch_up() {
    let mut p = pipeline();
    p.poller.start();
    p.provider.update(|record| record.flood = true);

    let settle = Arc::new(AtomicUsize::new(0));
    let s = settle.clone();
    let id = p.dispatcher.subscribe(ChannelFilter::All, move |_| {
        s.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    wait_for(&settle, 1).await;
    p.poller.stop().await;
    p.dispatcher.unsubscribe(id);

    // A subscriber arriving after polling started sees the full state
    // through publish_all, including fields that never changed.
    let count = Arc::new(AtomicUsize::new(0));
    let seen_flood = Arc::new(AtomicUsize::new(0));
    let (c, sf) = (count.clone(), seen_flood.clone());
    p.dispatcher.subscribe(ChannelFilter::All, move |event| {
        c.fetch_add(1, Ordering::SeqCst);
        if let StatusEvent::Field {
            field: StatusField::Flood,
            value,
        } = event
        {
            if *value == vcpkit_core::FieldValue::Bool(true) {
                sf.fetch_add(1, Ordering::SeqCst);
            }
        }
        Ok(())
    });

    p.poller.sync().lock().publish_all();
    assert!(count.load(Ordering::SeqCst) >= StatusField::ALL.len());
    assert_eq!(seen_flood.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_repeated_poll_failures_halt_once() {
    let mut p = pipeline();
    p.poller.start();

    // Provider goes down and stays down.
    p.provider.set_unreachable(true);

    let mut attempts = 0;
    while p.poller.is_running() && attempts < 200 {
        tokio::time::sleep(Duration::from_millis(5)).await;
        attempts += 1;
    }
    assert!(!p.poller.is_running());

    // No further polls happen while halted.
    let polls_after_halt = p.provider.poll_count();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(p.provider.poll_count(), polls_after_halt);
}
