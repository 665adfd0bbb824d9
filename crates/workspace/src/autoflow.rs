use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use markbook_store::StoreError;

use crate::autoname::{rename_document, title_file_name};
use crate::document::DocumentId;
use crate::events::WorkspaceEvent;
use crate::queue::{DocumentIntent, IntentQueue};
use crate::save::save_document;
use crate::workspace::{Workspace, WorkspaceError};

/// Workspace state shared with the per-document executors. The mutex is
/// held across each storage operation, which is exactly the single-writer
/// serialization the ordering rules require.
/// 與各文件執行緒共享的工作區狀態；互斥鎖涵蓋整個儲存操作，
/// 正是排序規則所需的單一寫入者序列化。
pub type SharedWorkspace = Arc<Mutex<Workspace>>;

/// Debounce windows for the two edit-driven flows.
/// 兩種編輯驅動流程的防抖窗口。
#[derive(Debug, Clone, Copy)]
pub struct AutoFlowConfig {
    pub save_delay: Duration,
    pub rename_delay: Duration,
}

impl Default for AutoFlowConfig {
    fn default() -> Self {
        Self {
            save_delay: Duration::from_millis(750),
            rename_delay: Duration::from_millis(1000),
        }
    }
}

/// Per-document debounced executor for auto-save and title-driven
/// auto-rename. Edits within a window collapse into one request; requests
/// run one at a time through an [`IntentQueue`], rename before save, so a
/// save queued against the old path always executes against the
/// post-rename path of record.
/// 每份文件的防抖執行器：窗口內的編輯合併為一次請求，經由 [`IntentQueue`]
/// 逐一執行且重新命名先於儲存，確保儲存一律針對最新路徑。
#[derive(Debug)]
pub struct AutoFlow {
    tx: mpsc::UnboundedSender<()>,
    task: JoinHandle<()>,
}

impl AutoFlow {
    pub fn spawn(
        shared: SharedWorkspace,
        id: DocumentId,
        config: AutoFlowConfig,
        events: mpsc::UnboundedSender<WorkspaceEvent>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(shared, id, config, events, rx));
        Self { tx, task }
    }

    /// Signals one edit on the document, restarting both debounce windows.
    /// 通知一次編輯，重新起算兩個防抖窗口。
    pub fn edited(&self) {
        let _ = self.tx.send(());
    }

    /// Flushes pending work and waits for the executor to settle.
    /// 清空待執行工作並等待執行器結束。
    pub async fn shutdown(self) {
        drop(self.tx);
        let _ = self.task.await;
    }
}

async fn run(
    shared: SharedWorkspace,
    id: DocumentId,
    config: AutoFlowConfig,
    events: mpsc::UnboundedSender<WorkspaceEvent>,
    mut rx: mpsc::UnboundedReceiver<()>,
) {
    let mut queue = IntentQueue::new();
    let mut save_at: Option<Instant> = None;
    let mut rename_at: Option<Instant> = None;
    loop {
        let next = match (save_at, rename_at) {
            (Some(save), Some(rename)) => Some(save.min(rename)),
            (Some(save), None) => Some(save),
            (None, Some(rename)) => Some(rename),
            (None, None) => None,
        };
        tokio::select! {
            signal = rx.recv() => match signal {
                Some(()) => {
                    let now = Instant::now();
                    save_at = Some(now + config.save_delay);
                    rename_at = Some(now + config.rename_delay);
                }
                None => {
                    // Teardown: flush whatever is still pending.
                    if rename_at.take().is_some() {
                        if let Some(name) = desired_rename(&shared, id).await {
                            queue.push(DocumentIntent::Rename(name));
                        }
                    }
                    if save_at.take().is_some() {
                        queue.push(DocumentIntent::Save);
                    }
                    drain(&shared, id, &events, &mut queue).await;
                    break;
                }
            },
            _ = time::sleep_until(next.unwrap_or_else(Instant::now)), if next.is_some() => {
                let now = Instant::now();
                if rename_at.is_some_and(|at| at <= now) {
                    rename_at = None;
                    if let Some(name) = desired_rename(&shared, id).await {
                        queue.push(DocumentIntent::Rename(name));
                    }
                }
                if save_at.is_some_and(|at| at <= now) {
                    save_at = None;
                    queue.push(DocumentIntent::Save);
                }
                drain(&shared, id, &events, &mut queue).await;
            }
        }
    }
}

/// The rename the current contents call for, if any. Computed at fire
/// time so a collapsed window always targets the latest title.
/// 依目前內容計算應採用的新名稱；於觸發時計算以反映最新標題。
async fn desired_rename(shared: &SharedWorkspace, id: DocumentId) -> Option<String> {
    let workspace = shared.lock().await;
    let doc = workspace.document(id)?;
    let name = title_file_name(doc.contents())?;
    (name != doc.name()).then_some(name)
}

async fn drain(
    shared: &SharedWorkspace,
    id: DocumentId,
    events: &mpsc::UnboundedSender<WorkspaceEvent>,
    queue: &mut IntentQueue,
) {
    while let Some(intent) = queue.begin() {
        match intent {
            DocumentIntent::Rename(name) => execute_rename(shared, id, name, events).await,
            DocumentIntent::Save => execute_save(shared, id, events).await,
        }
        queue.finish();
    }
}

async fn execute_rename(
    shared: &SharedWorkspace,
    id: DocumentId,
    name: String,
    events: &mpsc::UnboundedSender<WorkspaceEvent>,
) {
    let mut workspace = shared.lock().await;
    let root = match workspace.root_handle() {
        Some(root) => root,
        None => return,
    };
    let doc = match workspace.document_mut(id) {
        Some(doc) => doc,
        None => return,
    };
    if doc.is_virtual() {
        // No storage entry yet: the title simply becomes the name the
        // first save will create.
        doc.name = name;
        return;
    }
    match rename_document(&root, doc, &name).await {
        Ok(path) => {
            let _ = events.send(WorkspaceEvent::DocumentRenamed { id, path });
            let _ = events.send(WorkspaceEvent::ListingChanged);
        }
        Err(WorkspaceError::Store(StoreError::NameCollision(collided))) => {
            // Hard abort: the document keeps its old identity and a later
            // edit retries with whatever title it carries then.
            debug!(document = %id, name = %collided, "auto-rename collided, keeping old name");
        }
        Err(err) => {
            warn!(document = %id, error = %err, "auto-rename failed");
            let _ = events.send(WorkspaceEvent::OperationFailed {
                id: Some(id),
                reason: err.to_string(),
            });
        }
    }
}

async fn execute_save(
    shared: &SharedWorkspace,
    id: DocumentId,
    events: &mpsc::UnboundedSender<WorkspaceEvent>,
) {
    let mut workspace = shared.lock().await;
    let root = match workspace.root_handle() {
        Some(root) => root,
        None => return,
    };
    let doc = match workspace.document_mut(id) {
        Some(doc) => doc,
        None => return,
    };
    if !doc.is_dirty() {
        return;
    }
    match save_document(&root, doc).await {
        Ok(path) => {
            let _ = events.send(WorkspaceEvent::DocumentSaved { id, path });
        }
        Err(err) => {
            // Dirty stays set so the next manual save retries.
            warn!(document = %id, error = %err, "auto-save failed");
            let _ = events.send(WorkspaceEvent::OperationFailed {
                id: Some(id),
                reason: err.to_string(),
            });
        }
    }
}
