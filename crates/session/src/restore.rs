use tracing::debug;

use markbook_ops::list_dir;
use markbook_store::{resolve_file, DirHandle, EntryKind, EntryPath, StoreError};
use markbook_workspace::{Document, Workspace};

use crate::saved::SavedSession;
use crate::store::SessionError;

/// Rebuilds open documents from a saved session against a freshly granted
/// root. Every saved path is re-resolved from scratch; entries that moved
/// or vanished since the last run are skipped silently, never blocking the
/// rest of the restore. When nothing survives, a fallback document is
/// opened instead. Returns the number of documents opened.
/// 依已儲存的工作階段在新授權的根目錄下重建開啟文件。每條路徑重新解析；
/// 已消失或搬移的項目靜默略過，不阻擋其餘還原。全數失敗時改開啟候補文件。
pub async fn restore_session(
    workspace: &mut Workspace,
    root: &DirHandle,
    saved: &SavedSession,
) -> Result<usize, SessionError> {
    let mut restored = 0;
    for file in &saved.open_files {
        let handle = match resolve_file(root, &file.path).await {
            Ok(handle) => handle,
            Err(err) => {
                debug!(path = %file.path, error = %err, "skipping unrestorable session entry");
                continue;
            }
        };
        let contents = match handle.read_text().await {
            Ok(contents) => contents,
            Err(err) => {
                debug!(path = %file.path, error = %err, "skipping unreadable session entry");
                continue;
            }
        };
        workspace.open_document(
            Document::opened(file.name.clone(), file.path.clone(), Some(handle), contents)
                .with_caret(file.caret),
        );
        restored += 1;
    }

    if restored > 0 {
        if let Some(active) = &saved.active_file_path {
            workspace.set_active_by_path(active);
        }
        return Ok(restored);
    }
    fallback_open(workspace, root).await
}

/// Opens the most sensible document of an otherwise empty session:
/// `README.md` at the root (any casing), else the first markdown file in
/// listing order, else nothing.
/// 工作階段為空時的候補：根目錄的 `README.md`（不分大小寫），
/// 否則列舉順序中的第一個 markdown 檔，再否則維持空白。
async fn fallback_open(
    workspace: &mut Workspace,
    root: &DirHandle,
) -> Result<usize, SessionError> {
    let entries = list_dir(root, &EntryPath::root()).await?;
    let markdown = |name: &str| name.to_ascii_lowercase().ends_with(".md");
    let pick = entries
        .iter()
        .find(|entry| {
            entry.kind == EntryKind::File && entry.name.eq_ignore_ascii_case("README.md")
        })
        .or_else(|| {
            entries
                .iter()
                .find(|entry| entry.kind == EntryKind::File && markdown(&entry.name))
        });
    let Some(entry) = pick else {
        return Ok(0);
    };

    let path = EntryPath::from_name(&entry.name).map_err(StoreError::from)?;
    let handle = resolve_file(root, &path).await?;
    let contents = handle.read_text().await?;
    workspace.open_document(Document::opened(
        entry.name.clone(),
        path,
        Some(handle),
        contents,
    ));
    debug!(name = %entry.name, "opened fallback document");
    Ok(1)
}
