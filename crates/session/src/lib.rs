//! Session persistence and restore for Markbook: path-only saved sessions
//! and global UI state on local disk, the recent-roots boundary with its
//! permission re-check, the restore orchestrator and the periodic
//! snapshotter.
//! Markbook 的工作階段持久化與還原：僅含路徑的工作階段檔與全域 UI 狀態、
//! 近期根目錄邊界與權限重檢、還原協調器以及週期性快照工作。

pub mod recents;
pub mod restore;
pub mod saved;
pub mod snapshot;
pub mod store;
mod util;

pub use recents::{recall_root, MemoryRecents, RecentRootEntry, RecentsStore};
pub use restore::restore_session;
pub use saved::{SavedFile, SavedSession, UiState, ViewMode, SESSION_FORMAT_VERSION};
pub use snapshot::{Snapshotter, SnapshotterConfig};
pub use store::{SessionError, SessionStore};
