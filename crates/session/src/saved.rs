use serde::{Deserialize, Serialize};

use markbook_store::EntryPath;
use markbook_workspace::{CaretPosition, Document, Workspace};

/// Current saved-session format version.
pub const SESSION_FORMAT_VERSION: u32 = 1;

/// Persisted projection of a workspace: durable paths only. Handles and
/// document contents never appear here; a restore re-resolves every path
/// from scratch and re-reads contents from the store.
/// 工作階段的持久化投影：僅保存持久路徑。控制代碼與文件內容一律不入檔，
/// 還原時重新解析路徑並重新讀取內容。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSession {
    pub format_version: u32,
    #[serde(default)]
    pub open_files: Vec<SavedFile>,
    #[serde(default)]
    pub active_file_path: Option<EntryPath>,
}

/// One remembered open document.
/// 一份被記住的開啟文件。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFile {
    pub name: String,
    pub path: EntryPath,
    #[serde(default)]
    pub caret: Option<CaretPosition>,
}

impl SavedSession {
    /// Projects the current workspace state. Virtual documents are not
    /// recorded: they have no durable identity to restore from.
    /// 投影目前工作區狀態；虛擬文件沒有持久身分，不予記錄。
    pub fn capture(workspace: &Workspace) -> Self {
        let open_files = workspace
            .documents()
            .iter()
            .filter_map(|doc| {
                let path = doc.path()?.clone();
                Some(SavedFile {
                    name: doc.name().to_string(),
                    path,
                    caret: doc.caret(),
                })
            })
            .collect();
        Self {
            format_version: SESSION_FORMAT_VERSION,
            open_files,
            active_file_path: workspace
                .active_document()
                .and_then(Document::path)
                .cloned(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.open_files.is_empty()
    }
}

/// Editor view mode. Presentation lives in the rendering layer; only the
/// chosen value is persisted.
/// 編輯檢視模式；僅持久化所選值，呈現屬於渲染層。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewMode {
    #[default]
    Source,
    Rich,
    Preview,
}

/// Global UI state, one record independent of which root is open.
/// 全域 UI 狀態；不隨開啟的根目錄而異。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    #[serde(default = "default_sidebar")]
    pub sidebar_visible: bool,
    #[serde(default)]
    pub view_mode: ViewMode,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_sidebar() -> bool {
    true
}

fn default_theme() -> String {
    "default".to_string()
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            sidebar_visible: default_sidebar(),
            view_mode: ViewMode::default(),
            theme: default_theme(),
        }
    }
}
