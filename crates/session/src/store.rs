use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use markbook_store::StoreError;

use crate::saved::{SavedSession, UiState};
use crate::util::write_atomic;

/// Errors raised by session persistence and restore.
/// 工作階段持久化與還原的錯誤。
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file IO error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid session payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Local-disk store for saved sessions and the global UI state. Sessions
/// are keyed per workspace root (`session_<key>.json`); the UI state is a
/// single `ui_state.json` shared by all roots. All writes are atomic and
/// a missing file loads as `Ok(None)`.
/// 工作階段與全域 UI 狀態的本機儲存。工作階段依根目錄鍵入
/// （`session_<key>.json`），UI 狀態為所有根目錄共用的單一檔案；
/// 全部採原子寫入，檔案不存在時回傳 `Ok(None)`。
#[derive(Debug)]
pub struct SessionStore {
    state_dir: PathBuf,
}

impl SessionStore {
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            state_dir: state_dir.as_ref().to_path_buf(),
        }
    }

    /// Derives the session key for a root display name. Anything outside
    /// `[A-Za-z0-9._-]` becomes `_`; a name that needed sanitizing also
    /// gets a short hash of the raw name appended, so distinct roots never
    /// collapse onto one session file.
    /// 由根目錄名稱導出工作階段鍵：非 `[A-Za-z0-9._-]` 字元轉為 `_`，
    /// 經替換的名稱再附上原始名稱的短雜湊，確保不同根目錄不共用檔案。
    pub fn session_key(root_name: &str) -> String {
        let sanitized: String = root_name
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
                    ch
                } else {
                    '_'
                }
            })
            .collect();
        if sanitized.is_empty() {
            return "root".to_string();
        }
        if sanitized == root_name {
            return sanitized;
        }
        let mut hasher = DefaultHasher::new();
        root_name.hash(&mut hasher);
        format!("{sanitized}-{:08x}", hasher.finish() as u32)
    }

    fn session_path(&self, key: &str) -> PathBuf {
        self.state_dir.join(format!("session_{key}.json"))
    }

    fn ui_state_path(&self) -> PathBuf {
        self.state_dir.join("ui_state.json")
    }

    pub fn load_session(&self, key: &str) -> Result<Option<SavedSession>, SessionError> {
        load_json(&self.session_path(key))
    }

    pub fn save_session(&self, key: &str, session: &SavedSession) -> Result<(), SessionError> {
        let path = self.session_path(key);
        debug!(path = %path.display(), files = session.open_files.len(), "saving session");
        save_json(&path, session)
    }

    pub fn load_ui_state(&self) -> Result<Option<UiState>, SessionError> {
        load_json(&self.ui_state_path())
    }

    pub fn save_ui_state(&self, state: &UiState) -> Result<(), SessionError> {
        save_json(&self.ui_state_path(), state)
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, SessionError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(SessionError::Io(err)),
    }
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), SessionError> {
    let json = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &json)?;
    Ok(())
}
