use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreError;

/// Kind of a storage entry. Directories order before files so the derived
/// `Ord` matches the listing contract.
/// 儲存項目的類型；目錄排在檔案之前以符合列表順序契約。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryKind {
    Directory,
    File,
}

/// Shallow listing record returned by [`DirCapability::enumerate`].
/// 目錄淺層列舉回傳的項目。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub name: String,
    pub kind: EntryKind,
}

/// Opaque identity of a live handle within one process lifetime. Only used
/// to recover a path from a handle; never persisted.
/// 單一程序生命週期內的控制代碼識別值；僅用於反查路徑，絕不持久化。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleKey(u64);

impl HandleKey {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

pub type FileHandle = Arc<dyn FileCapability>;
pub type DirHandle = Arc<dyn DirCapability>;

/// Read/write authority over a single file entry. The backing entry may be
/// moved or deleted at any time, so every operation must tolerate
/// `NotFound`; the caller recovers by re-resolving the path of record.
/// 針對單一檔案的讀寫能力；底層項目隨時可能被搬移或刪除，所有操作都須容忍
/// `NotFound` 並由呼叫端透過路徑重新解析。
#[async_trait]
pub trait FileCapability: Send + Sync + fmt::Debug {
    fn key(&self) -> HandleKey;

    /// The entry name the handle was minted under. Cached at mint time, so
    /// it can trail a rename; path recovery still goes through
    /// `resolve_to_path`.
    /// 控制代碼建立時的項目名稱；屬建立時快取，重新命名後可能過時。
    fn name(&self) -> &str;

    /// Snapshot of the current contents.
    /// 讀取目前內容的快照。
    async fn read_text(&self) -> Result<String, StoreError>;

    /// Replaces the contents all-or-nothing on normal completion; on any
    /// failure the original durability is undefined and the error must be
    /// surfaced.
    /// 正常完成時整份取代內容；失敗時必須回報錯誤。
    async fn write_text(&self, contents: &str) -> Result<(), StoreError>;
}

/// Enumeration and child-minting authority over a single directory entry.
/// 針對單一目錄的列舉與子項目建立能力。
#[async_trait]
pub trait DirCapability: Send + Sync + fmt::Debug {
    fn key(&self) -> HandleKey;

    /// The entry name the handle was minted under; a root handle carries
    /// the workspace's display name, which is what session keys derive
    /// from.
    /// 控制代碼建立時的項目名稱；根目錄代碼即工作區顯示名稱，
    /// 工作階段鍵由此導出。
    fn name(&self) -> &str;

    /// Shallow, unordered listing. Callers sort per the listing policy.
    /// 淺層且無序的列舉；排序由呼叫端負責。
    async fn enumerate(&self) -> Result<Vec<EntryInfo>, StoreError>;

    /// Resolves (or mints, when `create` is set) a child file handle.
    /// Fails with `NotFound` when absent and `create` is false, or when the
    /// name is occupied by a directory.
    /// 解析（或在 `create` 時建立）子檔案控制代碼。
    async fn child_file(&self, name: &str, create: bool) -> Result<FileHandle, StoreError>;

    /// Directory counterpart of [`Self::child_file`].
    /// [`Self::child_file`] 的目錄版本。
    async fn child_dir(&self, name: &str, create: bool) -> Result<DirHandle, StoreError>;

    /// Removes the named child. Non-recursive removal of a non-empty
    /// directory fails with `NotEmpty`.
    /// 移除指定子項目；非遞迴刪除非空目錄時回傳 `NotEmpty`。
    async fn remove(&self, name: &str, recursive: bool) -> Result<(), StoreError>;

    /// Best-effort atomic move of the named child into `dst` under
    /// `new_name`. Returns `Ok(false)` — not an error — when the backend
    /// has no atomic primitive, signalling the copy+delete fallback.
    /// 盡力而為的原子搬移；後端不支援時回傳 `Ok(false)` 以改走複製後刪除。
    async fn move_child(
        &self,
        name: &str,
        dst: &DirHandle,
        new_name: &str,
    ) -> Result<bool, StoreError>;
}
