use tracing::debug;

use markbook_store::{resolve_dir, resolve_file, DirHandle, EntryInfo, EntryKind, EntryPath, StoreError};

use crate::entry::{entry_exists, ensure_dir, move_entry};
use crate::listing::list_dir;

/// Reserved root-level container for soft-deleted entries, created on
/// demand.
/// 保留給軟刪除項目的根層目錄，於需要時建立。
pub const TRASH_DIR: &str = ".trash";

fn trash_path() -> EntryPath {
    EntryPath::parse(TRASH_DIR).expect("trash name is a valid segment")
}

/// Determines the kind of an existing entry by attempting a file resolve
/// first and falling back to directory.
/// 先嘗試以檔案解析、失敗再以目錄解析來推斷項目類型。
async fn infer_kind(root: &DirHandle, path: &EntryPath) -> Result<EntryKind, StoreError> {
    match resolve_file(root, path).await {
        Ok(_) => Ok(EntryKind::File),
        Err(err) if err.is_not_found() => {
            resolve_dir(root, path).await?;
            Ok(EntryKind::Directory)
        }
        Err(err) => Err(err),
    }
}

/// Moves the entry at `path` into the trash container instead of erasing
/// it. A same-named older trash occupant is replaced, so restore always
/// refers to the current occupant.
/// 將項目移入回收目錄；同名的舊項目會被取代，確保還原對象唯一。
pub async fn soft_delete(root: &DirHandle, path: &EntryPath) -> Result<EntryPath, StoreError> {
    let name = path
        .name()
        .ok_or_else(|| StoreError::InvalidTarget("<root>".to_string()))?;
    if path.starts_with(&trash_path()) {
        return Err(StoreError::InvalidTarget(path.to_string()));
    }
    let kind = infer_kind(root, path).await?;
    let trash = ensure_dir(root, &trash_path()).await?;
    if let Some(existing) = entry_exists(&trash, name).await? {
        trash
            .remove(name, matches!(existing, EntryKind::Directory))
            .await?;
    }
    let moved = move_entry(root, path, &trash_path(), kind, None).await?;
    debug!(path = %path, "soft-deleted entry");
    Ok(moved)
}

/// Moves a trashed entry back to the workspace root. Fails with
/// `NameCollision` when the root already holds an entry of that name.
/// 將回收目錄中的項目移回根目錄；根目錄已有同名項目時回傳 `NameCollision`。
pub async fn restore_entry(root: &DirHandle, name: &str) -> Result<EntryPath, StoreError> {
    let trashed = trash_path().join(name)?;
    let kind = infer_kind(root, &trashed).await?;
    if entry_exists(root, name).await?.is_some() {
        return Err(StoreError::NameCollision(name.to_string()));
    }
    let restored = move_entry(root, &trashed, &EntryPath::root(), kind, None).await?;
    debug!(name, "restored entry from trash");
    Ok(restored)
}

/// Irreversibly removes the entry at `path`, recursing into directories.
/// Used for permanent deletion and for entries already inside the trash.
/// 不可逆地移除項目（目錄遞迴刪除）；用於永久刪除或回收目錄內的項目。
pub async fn hard_delete(root: &DirHandle, path: &EntryPath) -> Result<(), StoreError> {
    let name = path
        .name()
        .ok_or_else(|| StoreError::InvalidTarget("<root>".to_string()))?;
    let parent_path = path
        .parent()
        .ok_or_else(|| StoreError::InvalidTarget("<root>".to_string()))?;
    let parent = resolve_dir(root, &parent_path).await?;
    parent.remove(name, true).await?;
    debug!(path = %path, "hard-deleted entry");
    Ok(())
}

/// Lists the trash container with the usual ordering contract; an absent
/// container is simply empty.
/// 以相同排序契約列出回收目錄；尚未建立時視為空。
pub async fn list_trash(root: &DirHandle) -> Result<Vec<EntryInfo>, StoreError> {
    match list_dir(root, &trash_path()).await {
        Ok(entries) => Ok(entries),
        Err(err) if err.is_not_found() => Ok(Vec::new()),
        Err(err) => Err(err),
    }
}
