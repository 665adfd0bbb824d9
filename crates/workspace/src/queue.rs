/// A deferred storage operation for one document.
/// 單一文件的延後儲存操作。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentIntent {
    /// Write the current full contents; payloads are always "whatever the
    /// document holds now", so later saves subsume earlier ones.
    Save,
    Rename(String),
}

/// Depth-1, latest-wins intent slots with a single in-flight operation per
/// document. A rename always runs before a save queued in the same window,
/// so the save executes against the post-rename path of record; nothing
/// starts while another operation is in flight.
/// 每份文件深度為一、後到覆蓋的意圖槽位；同一窗口內重新命名先於儲存執行，
/// 且任何時刻最多一個操作在途。
#[derive(Debug, Default)]
pub struct IntentQueue {
    save_pending: bool,
    rename_pending: Option<String>,
    in_flight: bool,
}

impl IntentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an intent, collapsing onto any pending one of the same kind.
    /// 記錄意圖；同類型的待執行意圖會被後到者取代。
    pub fn push(&mut self, intent: DocumentIntent) {
        match intent {
            DocumentIntent::Save => self.save_pending = true,
            DocumentIntent::Rename(name) => self.rename_pending = Some(name),
        }
    }

    /// Takes the next intent to execute, marking it in flight. Returns
    /// `None` while an operation is already running or nothing is pending.
    /// 取出下一個要執行的意圖並標記在途；已有操作在途或無待執行時回傳 `None`。
    pub fn begin(&mut self) -> Option<DocumentIntent> {
        if self.in_flight {
            return None;
        }
        let next = if let Some(name) = self.rename_pending.take() {
            DocumentIntent::Rename(name)
        } else if self.save_pending {
            self.save_pending = false;
            DocumentIntent::Save
        } else {
            return None;
        };
        self.in_flight = true;
        Some(next)
    }

    /// Marks the in-flight operation as settled (success or failure).
    /// 標記在途操作已完成（不論成功或失敗）。
    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    pub fn is_idle(&self) -> bool {
        !self.in_flight && !self.save_pending && self.rename_pending.is_none()
    }
}
