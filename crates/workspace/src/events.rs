use markbook_store::EntryPath;

use crate::document::DocumentId;

/// Notifications emitted towards the rendering layer. The stream is
/// one-way: the renderer never mutates storage, it only reflects state.
/// 發往渲染層的單向通知；渲染層不得直接改動儲存。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceEvent {
    /// The root's shallow contents changed; emitted only after the
    /// mutation's storage calls completed, never mid-operation.
    /// 根目錄淺層內容已變動；必定於儲存操作完成後才發出。
    ListingChanged,
    DocumentSaved {
        id: DocumentId,
        path: EntryPath,
    },
    DocumentRenamed {
        id: DocumentId,
        path: EntryPath,
    },
    /// A non-blocking failure notification; the document's dirty flag is
    /// left set so the next manual save retries.
    /// 非阻斷的失敗通知；dirty 旗標保留，下一次手動儲存會重試。
    OperationFailed {
        id: Option<DocumentId>,
        reason: String,
    },
}
