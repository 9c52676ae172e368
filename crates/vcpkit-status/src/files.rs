//! Program file bridges.
//!
//! [`FileLoadedBridge`] turns raw `file` field changes into `FileLoaded`
//! events, but only once the interpreter is idle at the top call level;
//! mid-program file references (subroutines) must not look like a new
//! program load. [`RecentFiles`] keeps the most-recent-first file list
//! persisted across sessions.

use std::path::PathBuf;
use std::sync::Arc;

use vcpkit_core::{FieldValue, InterpState, StatusChannel, StatusEvent, StatusField};

use crate::dispatch::{StatusDispatcher, SubscriptionId};
use crate::sync::SnapshotCell;

/// Built-in subscriber gating `FileLoaded` events.
pub struct FileLoadedBridge {
    dispatcher: Arc<StatusDispatcher>,
    sub: SubscriptionId,
}

impl FileLoadedBridge {
    /// Attach the bridge to a dispatcher.
    pub fn attach(dispatcher: Arc<StatusDispatcher>, snapshot: SnapshotCell) -> Self {
        let d = dispatcher.clone();
        let sub = dispatcher.subscribe_channel(
            StatusChannel::Field(StatusField::File),
            move |event| {
                if let StatusEvent::Field {
                    value: FieldValue::Text(path),
                    ..
                } = event
                {
                    let loaded = snapshot.with(|record| {
                        record.interp_state == InterpState::Idle && record.call_level == 0
                    });
                    if loaded {
                        d.publish(&StatusEvent::FileLoaded(path.clone()));
                    }
                }
                Ok(())
            },
        );
        Self { dispatcher, sub }
    }
}

impl Drop for FileLoadedBridge {
    fn drop(&mut self) {
        self.dispatcher.unsubscribe(self.sub);
    }
}

/// Most-recent-first program file list.
///
/// Deduplicated, capped at `max_files`, and announced through the
/// dispatcher on every change. The current list is exported for
/// persistence at shutdown.
pub struct RecentFiles {
    dispatcher: Arc<StatusDispatcher>,
    files: Vec<PathBuf>,
    max_files: usize,
}

impl RecentFiles {
    /// Create an empty list with the given cap.
    pub fn new(dispatcher: Arc<StatusDispatcher>, max_files: usize) -> Self {
        Self {
            dispatcher,
            files: Vec::new(),
            max_files: max_files.max(1),
        }
    }

    /// Restore a persisted list, dropping paths that no longer exist.
    pub fn load(
        dispatcher: Arc<StatusDispatcher>,
        saved: impl IntoIterator<Item = PathBuf>,
        max_files: usize,
    ) -> Self {
        let mut list = Self::new(dispatcher, max_files);
        list.files = saved
            .into_iter()
            .filter(|path| path.exists())
            .take(list.max_files)
            .collect();
        list
    }

    /// Record a file as most recently used.
    pub fn add(&mut self, path: PathBuf) {
        self.files.retain(|existing| existing != &path);
        self.files.insert(0, path);
        self.files.truncate(self.max_files);
        self.dispatcher
            .publish(&StatusEvent::RecentFilesChanged(self.files.clone()));
    }

    /// The current list, most recent first.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Maximum number of retained entries.
    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// Clone the list for persistence.
    pub fn export(&self) -> Vec<PathBuf> {
        self.files.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use vcpkit_core::StatusRecord;

    fn file_event(path: &str) -> StatusEvent {
        StatusEvent::Field {
            field: StatusField::File,
            value: FieldValue::Text(path.into()),
        }
    }

    #[test]
    fn test_file_loaded_fires_when_interp_idle() {
        let dispatcher = Arc::new(StatusDispatcher::new());
        let cell = SnapshotCell::new(StatusRecord::default());
        let _bridge = FileLoadedBridge::attach(dispatcher.clone(), cell);

        let seen: Arc<Mutex<Vec<String>>> = Arc::default();
        let s = seen.clone();
        dispatcher.subscribe_channel(StatusChannel::FileLoaded, move |event| {
            if let StatusEvent::FileLoaded(path) = event {
                s.lock().push(path.clone());
            }
            Ok(())
        });

        dispatcher.publish(&file_event("/tmp/part.ngc"));
        assert_eq!(seen.lock().as_slice(), ["/tmp/part.ngc"]);
    }

    #[test]
    fn test_file_loaded_suppressed_mid_program() {
        let dispatcher = Arc::new(StatusDispatcher::new());
        let mut record = StatusRecord::default();
        record.interp_state = InterpState::Reading;
        let cell = SnapshotCell::new(record.clone());
        let _bridge = FileLoadedBridge::attach(dispatcher.clone(), cell.clone());

        let count = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let c = count.clone();
        dispatcher.subscribe_channel(StatusChannel::FileLoaded, move |_| {
            c.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        });

        dispatcher.publish(&file_event("/tmp/sub.ngc"));
        assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 0);

        // Idle but inside a subroutine call: still suppressed.
        record.interp_state = InterpState::Idle;
        record.call_level = 2;
        cell.store(record);
        dispatcher.publish(&file_event("/tmp/sub.ngc"));
        assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn test_recent_files_dedup_and_cap() {
        let dispatcher = Arc::new(StatusDispatcher::new());
        let mut recent = RecentFiles::new(dispatcher, 3);

        recent.add("/a".into());
        recent.add("/b".into());
        recent.add("/c".into());
        recent.add("/a".into());
        assert_eq!(
            recent.files(),
            [PathBuf::from("/a"), "/c".into(), "/b".into()]
        );

        recent.add("/d".into());
        assert_eq!(
            recent.files(),
            [PathBuf::from("/d"), "/a".into(), "/c".into()]
        );
    }

    #[test]
    fn test_recent_files_publishes_changes() {
        let dispatcher = Arc::new(StatusDispatcher::new());
        let seen: Arc<Mutex<Vec<Vec<PathBuf>>>> = Arc::default();
        let s = seen.clone();
        dispatcher.subscribe_channel(StatusChannel::RecentFilesChanged, move |event| {
            if let StatusEvent::RecentFilesChanged(files) = event {
                s.lock().push(files.clone());
            }
            Ok(())
        });

        let mut recent = RecentFiles::new(dispatcher, 10);
        recent.add("/a".into());
        recent.add("/b".into());

        let published = seen.lock();
        assert_eq!(published.len(), 2);
        assert_eq!(published[1], vec![PathBuf::from("/b"), "/a".into()]);
    }

    #[test]
    fn test_load_filters_missing_paths() {
        let dir = std::env::temp_dir();
        let existing = dir.join("vcpkit-recent-test.ngc");
        std::fs::write(&existing, "(empty)").expect("write temp file");

        let dispatcher = Arc::new(StatusDispatcher::new());
        let recent = RecentFiles::load(
            dispatcher,
            vec![existing.clone(), "/no/such/file.ngc".into()],
            10,
        );
        assert_eq!(recent.files(), [existing.clone()]);

        std::fs::remove_file(existing).ok();
    }
}
