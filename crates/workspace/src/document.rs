use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use markbook_store::{EntryPath, FileHandle};

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Session-local identifier of an open document. Never persisted; the
/// durable identity of a document is its path.
/// 文件在本次工作階段中的識別碼；不持久化，持久身分是路徑。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DocumentId(u64);

impl DocumentId {
    pub fn new() -> Self {
        Self(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Caret position persisted in the saved session.
/// 儲存在工作階段檔案中的游標位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CaretPosition {
    pub line: u32,
    pub column: u32,
}

/// An open editor entry. `path` is the durable identity; `handle` is only
/// a cache of the last successful resolve and may go stale at any time.
/// A document without a path is virtual: it exists purely in memory and
/// must go through create before any path-based operation applies.
/// 開啟中的編輯項目。`path` 為持久身分，`handle` 僅是最近解析結果的快取，
/// 隨時可能失效；沒有路徑的文件為虛擬文件，僅存在於記憶體。
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    pub(crate) name: String,
    pub(crate) path: Option<EntryPath>,
    pub(crate) handle: Option<FileHandle>,
    pub(crate) contents: String,
    pub(crate) dirty: bool,
    pub(crate) last_modified_unix: i64,
    pub(crate) caret: Option<CaretPosition>,
}

impl Document {
    /// Creates a virtual document that has never touched the store.
    /// 建立從未寫入儲存的虛擬文件。
    pub fn virtual_new(name: impl Into<String>) -> Self {
        Self {
            id: DocumentId::new(),
            name: name.into(),
            path: None,
            handle: None,
            contents: String::new(),
            dirty: false,
            last_modified_unix: current_timestamp(),
            caret: None,
        }
    }

    /// Creates a bound document from a resolved entry, clean on open.
    /// 以已解析的項目建立綁定文件，開啟時為未修改狀態。
    pub fn opened(
        name: impl Into<String>,
        path: EntryPath,
        handle: Option<FileHandle>,
        contents: impl Into<String>,
    ) -> Self {
        Self {
            id: DocumentId::new(),
            name: name.into(),
            path: Some(path),
            handle,
            contents: contents.into(),
            dirty: false,
            last_modified_unix: current_timestamp(),
            caret: None,
        }
    }

    pub fn with_caret(mut self, caret: Option<CaretPosition>) -> Self {
        self.caret = caret;
        self
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&EntryPath> {
        self.path.as_ref()
    }

    pub fn handle(&self) -> Option<&FileHandle> {
        self.handle.as_ref()
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_virtual(&self) -> bool {
        self.path.is_none()
    }

    pub fn caret(&self) -> Option<CaretPosition> {
        self.caret
    }

    pub fn last_modified_unix(&self) -> i64 {
        self.last_modified_unix
    }

    /// Replaces the in-memory contents, marking the document dirty.
    /// 以新文字取代記憶體內容並標記為已修改。
    pub fn set_contents(&mut self, contents: impl Into<String>) {
        self.contents = contents.into();
        self.dirty = true;
    }

    pub fn set_caret(&mut self, caret: Option<CaretPosition>) {
        self.caret = caret;
    }

    /// Binds a virtual document to its freshly created entry.
    /// 將虛擬文件綁定至剛建立的儲存項目。
    pub(crate) fn bind(&mut self, path: EntryPath, handle: FileHandle) {
        if let Some(name) = path.name() {
            self.name = name.to_string();
        }
        self.path = Some(path);
        self.handle = Some(handle);
    }

    /// Records a successful write: the only place the dirty flag clears.
    /// 記錄一次成功寫入；只有這裡會清除 dirty 旗標。
    pub(crate) fn mark_saved(&mut self) {
        self.dirty = false;
        self.last_modified_unix = current_timestamp();
    }
}

pub(crate) fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
