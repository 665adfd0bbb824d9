use std::sync::Arc;

use crate::error::{PathError, StoreError};
use crate::handle::{DirHandle, EntryKind, FileHandle, HandleKey};
use crate::path::EntryPath;

/// Resolves a directory path by walking segments from the root. Every call
/// is a fresh walk: intermediate directories may have been renamed since
/// the last resolve, so nothing is cached.
/// 逐段走訪解析目錄路徑；每次呼叫都重新走訪，不快取中間目錄。
pub async fn resolve_dir(root: &DirHandle, path: &EntryPath) -> Result<DirHandle, StoreError> {
    let mut current = Arc::clone(root);
    for segment in path.segments() {
        current = current.child_dir(segment, false).await?;
    }
    Ok(current)
}

/// Resolves a file path. Fails with `NotFound` at the first missing
/// segment; callers decide whether that aborts (open/save) or skips
/// (session restore).
/// 解析檔案路徑；在第一個缺少的區段回傳 `NotFound`，由呼叫端決定中止或略過。
pub async fn resolve_file(root: &DirHandle, path: &EntryPath) -> Result<FileHandle, StoreError> {
    let name = path.name().ok_or(PathError::EmptySegment)?;
    let parent = match path.parent() {
        Some(parent) => resolve_dir(root, &parent).await?,
        None => Arc::clone(root),
    };
    parent.child_file(name, false).await
}

/// Recovers the path of a live handle by walking the tree from the root
/// and comparing handle keys. Returns `None` when the handle is not a
/// descendant of `root` (or no longer exists).
/// 從根目錄走訪比較控制代碼識別值以反查路徑；非子孫或已不存在時回傳 `None`。
pub async fn resolve_to_path(
    root: &DirHandle,
    target: HandleKey,
) -> Result<Option<EntryPath>, StoreError> {
    if root.key() == target {
        return Ok(Some(EntryPath::root()));
    }
    let mut pending: Vec<(DirHandle, EntryPath)> = vec![(Arc::clone(root), EntryPath::root())];
    while let Some((dir, dir_path)) = pending.pop() {
        let entries = match dir.enumerate().await {
            Ok(entries) => entries,
            // The directory vanished mid-walk; its subtree cannot hold the
            // target any more.
            Err(StoreError::NotFound(_)) => continue,
            Err(err) => return Err(err),
        };
        for entry in entries {
            let child_path = dir_path.join(&entry.name)?;
            match entry.kind {
                EntryKind::File => match dir.child_file(&entry.name, false).await {
                    Ok(handle) if handle.key() == target => return Ok(Some(child_path)),
                    Ok(_) => {}
                    Err(StoreError::NotFound(_)) => {}
                    Err(err) => return Err(err),
                },
                EntryKind::Directory => match dir.child_dir(&entry.name, false).await {
                    Ok(handle) if handle.key() == target => return Ok(Some(child_path)),
                    Ok(handle) => pending.push((handle, child_path)),
                    Err(StoreError::NotFound(_)) => {}
                    Err(err) => return Err(err),
                },
            }
        }
    }
    Ok(None)
}
