use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::warn;

use markbook_workspace::SharedWorkspace;

use crate::saved::SavedSession;
use crate::store::SessionStore;

#[derive(Debug, Clone, Copy)]
pub struct SnapshotterConfig {
    pub interval: Duration,
}

impl Default for SnapshotterConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
        }
    }
}

/// Periodic session snapshot task. Each tick captures the in-memory
/// projection under the workspace lock and writes it through the
/// [`SessionStore`]; it never waits for pending document writes, so a
/// snapshot can briefly trail the store. One final snapshot runs on
/// shutdown.
/// 週期性工作階段快照工作：每次僅在鎖內擷取記憶體投影後寫入
/// [`SessionStore`]，不等待任何未完成的文件寫入；關閉時再補一次快照。
#[derive(Debug)]
pub struct Snapshotter {
    tx: mpsc::UnboundedSender<()>,
    task: JoinHandle<()>,
}

impl Snapshotter {
    pub fn spawn(
        shared: SharedWorkspace,
        store: Arc<SessionStore>,
        key: impl Into<String>,
        config: SnapshotterConfig,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(shared, store, key.into(), config.interval, rx));
        Self { tx, task }
    }

    /// Takes a final snapshot and stops the task.
    /// 補寫最後一次快照並停止工作。
    pub async fn shutdown(self) {
        drop(self.tx);
        let _ = self.task.await;
    }
}

async fn run(
    shared: SharedWorkspace,
    store: Arc<SessionStore>,
    key: String,
    interval: Duration,
    mut rx: mpsc::UnboundedReceiver<()>,
) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; consume it so snapshots start
    // one full interval after spawn.
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => snapshot_once(&shared, &store, &key).await,
            _ = rx.recv() => {
                snapshot_once(&shared, &store, &key).await;
                break;
            }
        }
    }
}

async fn snapshot_once(shared: &SharedWorkspace, store: &SessionStore, key: &str) {
    let session = {
        let workspace = shared.lock().await;
        SavedSession::capture(&workspace)
    };
    if let Err(err) = store.save_session(key, &session) {
        warn!(key, error = %err, "session snapshot failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::sync::Mutex;

    use markbook_store::{EntryPath, MemoryStore};
    use markbook_workspace::{Document, Workspace};

    fn shared_with_one_document() -> SharedWorkspace {
        let store = MemoryStore::new();
        let mut workspace = Workspace::new();
        workspace.open_root(store.root());
        workspace.open_document(Document::opened(
            "a.md",
            EntryPath::parse("a.md").unwrap(),
            None,
            "",
        ));
        Arc::new(Mutex::new(workspace))
    }

    #[tokio::test(start_paused = true)]
    async fn snapshots_land_on_the_interval() {
        let tmp = tempdir().unwrap();
        let store = Arc::new(SessionStore::new(tmp.path()));
        let shared = shared_with_one_document();
        let config = SnapshotterConfig {
            interval: Duration::from_secs(10),
        };
        let snapshotter = Snapshotter::spawn(Arc::clone(&shared), Arc::clone(&store), "notes", config);

        time::sleep(Duration::from_secs(5)).await;
        assert!(store.load_session("notes").unwrap().is_none());

        time::sleep(Duration::from_secs(10)).await;
        let saved = store.load_session("notes").unwrap().unwrap();
        assert_eq!(saved.open_files.len(), 1);
        assert_eq!(saved.open_files[0].path.to_string(), "a.md");
        snapshotter.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_writes_a_final_snapshot() {
        let tmp = tempdir().unwrap();
        let store = Arc::new(SessionStore::new(tmp.path()));
        let shared = shared_with_one_document();
        let config = SnapshotterConfig {
            interval: Duration::from_secs(3600),
        };
        let snapshotter = Snapshotter::spawn(Arc::clone(&shared), Arc::clone(&store), "notes", config);

        snapshotter.shutdown().await;
        let saved = store.load_session("notes").unwrap().unwrap();
        assert_eq!(saved.open_files.len(), 1);
    }
}
