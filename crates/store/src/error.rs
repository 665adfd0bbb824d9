use thiserror::Error;

/// Storage-level failure taxonomy shared by every layer above the
/// capability adapter.
/// 能力配接器之上所有層級共用的儲存錯誤分類。
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("entry {0} not found")]
    NotFound(String),
    #[error("an entry named {0} already exists")]
    NameCollision(String),
    #[error("directory {0} is not empty")]
    NotEmpty(String),
    #[error("permission to the storage root was denied")]
    PermissionDenied,
    #[error("target {0} lies inside the entry being moved")]
    InvalidTarget(String),
    #[error("the user abandoned the picker")]
    Cancelled,
    #[error("handle for {0} is stale and the path no longer resolves")]
    StaleReference(String),
    #[error(transparent)]
    InvalidPath(#[from] PathError),
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// `NotFound` is the only failure that is retryable by re-resolving
    /// the path of record.
    /// 只有 `NotFound` 可透過重新解析路徑重試。
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// A user-abandoned picker is a silent no-op, never surfaced as a
    /// failure.
    /// 使用者取消選取視窗屬於靜默結束，不視為失敗。
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StoreError::Cancelled)
    }
}

/// Rejected path or segment text.
/// 路徑或名稱文字不合法時的錯誤。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("path contains an empty segment")]
    EmptySegment,
    #[error("segment {0:?} is reserved")]
    ReservedSegment(String),
    #[error("segment {0:?} contains a path separator")]
    EmbeddedSeparator(String),
}
