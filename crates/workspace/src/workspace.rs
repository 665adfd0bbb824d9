use std::sync::Arc;

use thiserror::Error;

use markbook_store::{DirHandle, EntryPath, StoreError};

use crate::document::{CaretPosition, Document, DocumentId};

/// Errors raised by workspace state transitions.
/// 工作區狀態轉換相關的錯誤。
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no workspace root is open")]
    RootClosed,
    #[error("document {0} is not open")]
    UnknownDocument(DocumentId),
    #[error("document has no storage entry yet")]
    VirtualDocument,
}

/// Outcome of a close request for a single document.
/// 關閉單一文件的結果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Removed without loss.
    Closed,
    /// A dirty virtual document was dropped; no storage ever existed.
    Discarded,
    /// Dirty with a bound path: the caller must confirm or force.
    NeedsConfirmation,
}

/// The in-memory model of one open workspace root and its documents.
/// Exactly one root may be open at a time; this struct is the single
/// writer of document state — entry operations mutate the store and this
/// state in lockstep, never one without the other.
/// 單一開啟工作區與其文件的記憶體模型；同時只允許一個根目錄開啟，
/// 且文件狀態只能經由此結構變更，儲存與狀態必須同步推進。
#[derive(Debug, Default)]
pub struct Workspace {
    root: Option<DirHandle>,
    documents: Vec<Document>,
    active_id: Option<DocumentId>,
    recycle_bin_active: bool,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a root, discarding any previous root and its documents.
    /// 開啟根目錄；先前的根目錄與文件全數清除。
    pub fn open_root(&mut self, root: DirHandle) {
        self.close_root();
        self.root = Some(root);
    }

    /// Closes the root and clears all documents and the active id.
    /// 關閉根目錄並清除所有文件與目前選取。
    pub fn close_root(&mut self) {
        self.root = None;
        self.documents.clear();
        self.active_id = None;
        self.recycle_bin_active = false;
    }

    pub fn is_open(&self) -> bool {
        self.root.is_some()
    }

    /// A cloned handle to the open root.
    /// 目前開啟根目錄的控制代碼副本。
    pub fn root_handle(&self) -> Option<DirHandle> {
        self.root.as_ref().map(Arc::clone)
    }

    pub fn require_root(&self) -> Result<DirHandle, WorkspaceError> {
        self.root_handle().ok_or(WorkspaceError::RootClosed)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id() == id)
    }

    pub(crate) fn document_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.iter_mut().find(|doc| doc.id() == id)
    }

    /// Two documents are the same entry iff their paths are equal; handle
    /// equality cannot survive a reload.
    /// 路徑相等即視為同一項目；控制代碼相等無法跨重新載入。
    pub fn find_by_path(&self, path: &EntryPath) -> Option<&Document> {
        self.documents
            .iter()
            .find(|doc| doc.path() == Some(path))
    }

    /// Adds an opened document, deduplicating by path, and makes it
    /// active. Returns the id of the surviving entry.
    /// 加入開啟的文件（依路徑去重）並設為目前文件。
    pub fn open_document(&mut self, document: Document) -> DocumentId {
        if let Some(path) = document.path() {
            if let Some(existing) = self.find_by_path(path) {
                let id = existing.id();
                self.active_id = Some(id);
                return id;
            }
        }
        let id = document.id();
        self.documents.push(document);
        self.active_id = Some(id);
        id
    }

    /// Creates a virtual document and makes it active.
    /// 建立虛擬文件並設為目前文件。
    pub fn new_virtual(&mut self, name: impl Into<String>) -> DocumentId {
        self.open_document(Document::virtual_new(name))
    }

    pub fn active_id(&self) -> Option<DocumentId> {
        self.active_id
    }

    pub fn active_document(&self) -> Option<&Document> {
        self.active_id.and_then(|id| self.document(id))
    }

    pub fn set_active(&mut self, id: DocumentId) -> Result<(), WorkspaceError> {
        if self.document(id).is_none() {
            return Err(WorkspaceError::UnknownDocument(id));
        }
        self.active_id = Some(id);
        Ok(())
    }

    /// Marks the active document by path, if such a document is open.
    /// 依路徑設定目前文件（若該文件已開啟）。
    pub fn set_active_by_path(&mut self, path: &EntryPath) {
        if let Some(id) = self.find_by_path(path).map(Document::id) {
            self.active_id = Some(id);
        }
    }

    /// Routes an edit from the rendering layer into document state.
    /// 將渲染層的編輯事件寫入文件狀態。
    pub fn edit_document(
        &mut self,
        id: DocumentId,
        contents: impl Into<String>,
    ) -> Result<(), WorkspaceError> {
        let doc = self
            .document_mut(id)
            .ok_or(WorkspaceError::UnknownDocument(id))?;
        doc.set_contents(contents);
        Ok(())
    }

    pub fn set_caret(
        &mut self,
        id: DocumentId,
        caret: Option<CaretPosition>,
    ) -> Result<(), WorkspaceError> {
        let doc = self
            .document_mut(id)
            .ok_or(WorkspaceError::UnknownDocument(id))?;
        doc.set_caret(caret);
        Ok(())
    }

    /// Applies a completed rename or move to document state, for callers
    /// that performed the entry operation themselves (e.g. a tree-view
    /// rename of an already open document).
    /// 將已完成的重新命名／搬移套用到文件狀態，供自行執行儲存操作的呼叫端使用。
    pub fn apply_rename(&mut self, id: DocumentId, path: EntryPath) {
        if let Some(doc) = self.document_mut(id) {
            if let Some(name) = path.name() {
                doc.name = name.to_string();
            }
            doc.path = Some(path);
        }
    }

    /// Closes a document. A dirty bound document needs confirmation unless
    /// forced; a dirty virtual document is simply discarded since no
    /// storage ever existed.
    /// 關閉文件：已修改且綁定路徑者需確認（除非強制）；虛擬文件直接捨棄。
    pub fn close_document(
        &mut self,
        id: DocumentId,
        force: bool,
    ) -> Result<CloseOutcome, WorkspaceError> {
        let doc = self.document(id).ok_or(WorkspaceError::UnknownDocument(id))?;
        let outcome = if doc.is_dirty() && !doc.is_virtual() && !force {
            return Ok(CloseOutcome::NeedsConfirmation);
        } else if doc.is_dirty() && doc.is_virtual() {
            CloseOutcome::Discarded
        } else {
            CloseOutcome::Closed
        };
        self.documents.retain(|doc| doc.id() != id);
        if self.active_id == Some(id) {
            self.active_id = self.documents.first().map(Document::id);
        }
        Ok(outcome)
    }

    pub fn recycle_bin_active(&self) -> bool {
        self.recycle_bin_active
    }

    pub fn set_recycle_bin_active(&mut self, active: bool) {
        self.recycle_bin_active = active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markbook_store::MemoryStore;

    fn open_workspace() -> Workspace {
        let store = MemoryStore::new();
        let mut workspace = Workspace::new();
        workspace.open_root(store.root());
        workspace
    }

    #[test]
    fn opening_the_same_path_twice_reuses_the_document() {
        let mut workspace = open_workspace();
        let path = EntryPath::parse("notes/a.md").unwrap();
        let first = workspace.open_document(Document::opened("a.md", path.clone(), None, ""));
        let second = workspace.open_document(Document::opened("a.md", path, None, ""));
        assert_eq!(first, second);
        assert_eq!(workspace.documents().len(), 1);
        assert_eq!(workspace.active_id(), Some(first));
    }

    #[test]
    fn closing_the_root_clears_everything() {
        let mut workspace = open_workspace();
        workspace.new_virtual("Untitled.md");
        workspace.set_recycle_bin_active(true);
        workspace.close_root();
        assert!(!workspace.is_open());
        assert!(workspace.documents().is_empty());
        assert_eq!(workspace.active_id(), None);
        assert!(!workspace.recycle_bin_active());
    }

    #[test]
    fn close_policy_distinguishes_virtual_and_bound_edits() {
        let mut workspace = open_workspace();

        let virtual_id = workspace.new_virtual("Untitled.md");
        workspace.edit_document(virtual_id, "scratch").unwrap();
        assert_eq!(
            workspace.close_document(virtual_id, false).unwrap(),
            CloseOutcome::Discarded
        );

        let path = EntryPath::parse("a.md").unwrap();
        let bound_id =
            workspace.open_document(Document::opened("a.md", path, None, "clean"));
        workspace.edit_document(bound_id, "edited").unwrap();
        assert_eq!(
            workspace.close_document(bound_id, false).unwrap(),
            CloseOutcome::NeedsConfirmation
        );
        assert_eq!(workspace.documents().len(), 1);
        assert_eq!(
            workspace.close_document(bound_id, true).unwrap(),
            CloseOutcome::Closed
        );
        assert!(workspace.documents().is_empty());
    }

    #[test]
    fn apply_rename_updates_name_and_path() {
        let mut workspace = open_workspace();
        let id = workspace.open_document(Document::opened(
            "a.md",
            EntryPath::parse("notes/a.md").unwrap(),
            None,
            "",
        ));
        let new_path = EntryPath::parse("notes/b.md").unwrap();
        workspace.apply_rename(id, new_path.clone());
        let doc = workspace.document(id).unwrap();
        assert_eq!(doc.name(), "b.md");
        assert_eq!(doc.path(), Some(&new_path));
    }

    #[test]
    fn active_document_follows_closures() {
        let mut workspace = open_workspace();
        let a = workspace.open_document(Document::opened(
            "a.md",
            EntryPath::parse("a.md").unwrap(),
            None,
            "",
        ));
        let b = workspace.open_document(Document::opened(
            "b.md",
            EntryPath::parse("b.md").unwrap(),
            None,
            "",
        ));
        assert_eq!(workspace.active_id(), Some(b));
        workspace.close_document(b, false).unwrap();
        assert_eq!(workspace.active_id(), Some(a));
    }
}
