//! Demo binary: runs the full status pipeline against the simulated
//! provider, logging every dispatched event. A background task plays a
//! short machining scenario so there is something to watch; Ctrl-C stops
//! the poller and persists the recent-files list.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use vcpkit::{
    ChannelFilter, CodeFormatter, Config, FileLoadedBridge, PollerConfig, PositionTracker,
    MessageClass, RawMessage, RecentFiles, SimStatusProvider, StatusDispatcher, StatusEvent,
    StatusPoller, StatusSync, TaskState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vcpkit::init_logging()?;
    tracing::info!("VCPKit v{} (built {})", vcpkit::VERSION, vcpkit::BUILD_DATE);

    let config = Config::load_default()?;

    let provider = SimStatusProvider::new();
    let dispatcher = Arc::new(StatusDispatcher::new());
    let sync = StatusSync::new(provider.clone(), dispatcher.clone())
        .with_error_drain_limit(config.polling.error_drain_limit);
    let snapshot = sync.snapshot();

    let tracker = PositionTracker::attach(dispatcher.clone(), snapshot.clone());
    tracker.set_report_actual(config.polling.report_actual_position);
    let _formatter = CodeFormatter::attach(dispatcher.clone());
    let _file_bridge = FileLoadedBridge::attach(dispatcher.clone(), snapshot.clone());

    let recent = Arc::new(Mutex::new(RecentFiles::load(
        dispatcher.clone(),
        config.recent_files.files.clone(),
        config.recent_files.max_files,
    )));
    let r = recent.clone();
    dispatcher.subscribe(ChannelFilter::All, move |event| {
        if let StatusEvent::FileLoaded(path) = event {
            r.lock().add(path.into());
        }
        tracing::info!("{}", event.description());
        Ok(())
    });

    let mut poller = StatusPoller::new(
        sync,
        PollerConfig {
            cycle_time_ms: config.polling.cycle_time_ms,
        },
    );
    poller.start();

    tokio::spawn(run_scenario(provider));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    poller.stop().await;

    let mut config = config;
    config.recent_files.files = recent.lock().export();
    if let Some(path) = Config::default_config_path() {
        if let Err(err) = config.save_to_file(&path) {
            tracing::warn!("Failed to save config: {}", err);
        }
    }

    Ok(())
}

/// Drive the simulated controller through a short machining scenario.
async fn run_scenario(provider: SimStatusProvider) {
    let step = Duration::from_millis(500);

    tokio::time::sleep(step).await;
    provider.update(|record| {
        record.estop = 0;
        record.task_state = TaskState::EstopReset;
    });

    tokio::time::sleep(step).await;
    provider.update(|record| record.task_state = TaskState::On);
    provider.push_message(RawMessage {
        class: MessageClass::OperatorText,
        text: "Machine powered on".to_string(),
    });

    tokio::time::sleep(step).await;
    provider.update(|record| {
        record.file = "/tmp/demo-part.ngc".to_string();
        record.gcodes = vec![0, 10, 170, 400, 900];
        record.mcodes = vec![0, 3, 8];
    });

    tokio::time::sleep(step).await;
    provider.update(|record| record.spindle_speed = 1200.0);

    // Trace a slow diagonal so the derived position events keep flowing.
    for i in 1..=20i32 {
        tokio::time::sleep(step).await;
        provider.update(|record| {
            record.position[0] = f64::from(i) * 0.5;
            record.position[1] = f64::from(i) * 0.25;
            record.current_line = i;
        });
    }

    provider.push_message(RawMessage {
        class: MessageClass::OperatorError,
        text: "Demo scenario complete".to_string(),
    });
}
