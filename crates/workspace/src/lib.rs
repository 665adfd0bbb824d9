//! Open-document state for a Markbook workspace: the mapping between
//! durable paths and ephemeral capability handles, and the operations that
//! keep both consistent under edits, debounced auto-save/auto-rename and
//! the recycle-bin flow.
//! Markbook 工作區的開啟文件狀態：維護持久路徑與短暫控制代碼間的對應，
//! 並在編輯、防抖自動儲存／重新命名與資源回收下保持一致。

pub mod autoflow;
pub mod autoname;
pub mod document;
pub mod events;
pub mod queue;
pub mod save;
pub mod tree;
pub mod workspace;

pub use autoflow::{AutoFlow, AutoFlowConfig, SharedWorkspace};
pub use autoname::{derive_title, rename_document, title_file_name};
pub use document::{CaretPosition, Document, DocumentId};
pub use events::WorkspaceEvent;
pub use queue::{DocumentIntent, IntentQueue};
pub use save::save_document;
pub use tree::{expand, TreeNode};
pub use workspace::{CloseOutcome, Workspace, WorkspaceError};
