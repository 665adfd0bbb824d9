use tracing::debug;

use markbook_ops::create_file;
use markbook_store::{resolve_file, DirHandle, EntryPath, StoreError};

use crate::document::Document;
use crate::workspace::WorkspaceError;

/// Writes a document to the store, driving the Virtual → Bound transition
/// and the stale-handle recovery path:
/// 將文件寫入儲存，處理虛擬升級與過期控制代碼的復原：
///
/// - virtual document: created at the root under its display name, then
///   bound to the resulting path and handle;
/// - bound with a live handle: direct write;
/// - bound with a stale or absent handle: re-resolve the path of record,
///   then write; if the path no longer resolves the entry was externally
///   deleted and the failure is `StaleReference` — the file is never
///   silently recreated somewhere else.
///
/// The dirty flag clears only on success, so a failed auto-save retries on
/// the next manual save.
pub async fn save_document(
    root: &DirHandle,
    doc: &mut Document,
) -> Result<EntryPath, WorkspaceError> {
    let path = match doc.path.clone() {
        Some(path) => path,
        None => {
            let (path, handle) =
                create_file(root, &EntryPath::root(), &doc.name, &doc.contents).await?;
            doc.bind(path.clone(), handle);
            doc.mark_saved();
            debug!(path = %path, "promoted virtual document");
            return Ok(path);
        }
    };

    if let Some(handle) = doc.handle.clone() {
        match handle.write_text(&doc.contents).await {
            Ok(()) => {
                doc.mark_saved();
                return Ok(path);
            }
            // The cached handle went stale; fall back to the path.
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err.into()),
        }
    }

    match resolve_file(root, &path).await {
        Ok(handle) => {
            handle.write_text(&doc.contents).await?;
            doc.handle = Some(handle);
            doc.mark_saved();
            Ok(path)
        }
        Err(err) if err.is_not_found() => {
            Err(StoreError::StaleReference(path.to_string()).into())
        }
        Err(err) => Err(err.into()),
    }
}
