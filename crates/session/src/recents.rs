use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use markbook_store::{CapabilityHost, DirHandle, StoreError};

/// A previously opened workspace root. The handle is only a recall hint:
/// it must pass a permission re-check before any reuse.
/// 先前開啟過的工作區根目錄；控制代碼僅供召回，重用前必須通過權限重檢。
#[derive(Debug, Clone)]
pub struct RecentRootEntry {
    pub key: String,
    pub handle: DirHandle,
    pub last_accessed_unix: i64,
}

impl RecentRootEntry {
    pub fn new(key: impl Into<String>, handle: DirHandle) -> Self {
        Self {
            key: key.into(),
            handle,
            last_accessed_unix: current_timestamp(),
        }
    }
}

/// Boundary to wherever recent roots live. Entries carry live handles, so
/// implementations hold them in memory or behind a host-specific store;
/// they never round-trip through the session files.
/// 近期根目錄的儲存邊界；項目內含控制代碼，不經由工作階段檔案序列化。
#[async_trait]
pub trait RecentsStore: Send + Sync {
    /// Inserts or refreshes an entry, replacing any entry with the same key.
    /// 新增或更新項目；相同鍵者被取代。
    async fn put(&self, entry: RecentRootEntry) -> Result<(), StoreError>;

    /// All entries, most recently accessed first.
    /// 全部項目，依最近存取時間由新到舊。
    async fn get_all(&self) -> Result<Vec<RecentRootEntry>, StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory recents store.
/// 記憶體內的近期根目錄儲存。
#[derive(Debug, Default)]
pub struct MemoryRecents {
    entries: Mutex<Vec<RecentRootEntry>>,
}

impl MemoryRecents {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecentsStore for MemoryRecents {
    async fn put(&self, entry: RecentRootEntry) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        entries.retain(|existing| existing.key != entry.key);
        entries.push(entry);
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<RecentRootEntry>, StoreError> {
        let mut entries = self.entries.lock().await.clone();
        entries.sort_by_key(|entry| std::cmp::Reverse(entry.last_accessed_unix));
        Ok(entries)
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().await.retain(|entry| entry.key != key);
        Ok(())
    }
}

/// Recalls a recent root for reuse. The remembered handle is re-checked
/// against the host first, prompting once when the silent check fails; a
/// denial surfaces as `PermissionDenied` and the entry is dropped, since
/// its handle can never be used again.
/// 召回近期根目錄：先靜默重檢權限，失敗則提示一次；遭拒回報
/// `PermissionDenied` 並移除該項目。
pub async fn recall_root(
    recents: &dyn RecentsStore,
    host: &dyn CapabilityHost,
    key: &str,
) -> Result<Option<DirHandle>, StoreError> {
    let entry = match recents
        .get_all()
        .await?
        .into_iter()
        .find(|entry| entry.key == key)
    {
        Some(entry) => entry,
        None => return Ok(None),
    };

    let mut state = host.query_permission(&entry.handle).await;
    if !state.is_granted() {
        state = host.request_permission(&entry.handle).await;
    }
    if !state.is_granted() {
        debug!(key, "recalled root denied, dropping entry");
        recents.remove(key).await?;
        return Err(StoreError::PermissionDenied);
    }

    let handle = entry.handle.clone();
    recents
        .put(RecentRootEntry::new(key, entry.handle))
        .await?;
    Ok(Some(handle))
}

fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
