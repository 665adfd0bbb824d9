use std::sync::Arc;

use tracing::debug;

use markbook_store::path::validate_segment;
use markbook_store::{
    resolve_dir, resolve_file, DirHandle, EntryInfo, EntryKind, EntryPath, FileHandle, StoreError,
};

/// Looks up a named child in a shallow enumeration.
/// 在淺層列舉中尋找指定名稱的子項目。
pub(crate) async fn entry_exists(
    dir: &DirHandle,
    name: &str,
) -> Result<Option<EntryKind>, StoreError> {
    Ok(dir
        .enumerate()
        .await?
        .into_iter()
        .find(|entry: &EntryInfo| entry.name == name)
        .map(|entry| entry.kind))
}

/// Walks `path` from the root, creating missing directories on the way.
/// 自根目錄走訪 `path`，沿途建立缺少的目錄。
pub async fn ensure_dir(root: &DirHandle, path: &EntryPath) -> Result<DirHandle, StoreError> {
    let mut current = Arc::clone(root);
    for segment in path.segments() {
        current = current.child_dir(segment, true).await?;
    }
    Ok(current)
}

/// Creates a file under `parent` and writes its initial contents in the
/// same operation, so the entry is never observable as an empty
/// placeholder. Creation never overwrites an existing entry.
/// 在 `parent` 下建立檔案並同步寫入初始內容；建立絕不覆寫既有項目。
pub async fn create_file(
    root: &DirHandle,
    parent: &EntryPath,
    name: &str,
    contents: &str,
) -> Result<(EntryPath, FileHandle), StoreError> {
    validate_segment(name)?;
    let dir = resolve_dir(root, parent).await?;
    if entry_exists(&dir, name).await?.is_some() {
        return Err(StoreError::NameCollision(name.to_string()));
    }
    let file = dir.child_file(name, true).await?;
    file.write_text(contents).await?;
    debug!(path = %parent, name, "created file");
    Ok((parent.join(name)?, file))
}

/// Creates a directory under `parent`.
/// 在 `parent` 下建立目錄。
pub async fn create_dir(
    root: &DirHandle,
    parent: &EntryPath,
    name: &str,
) -> Result<EntryPath, StoreError> {
    validate_segment(name)?;
    let dir = resolve_dir(root, parent).await?;
    if entry_exists(&dir, name).await?.is_some() {
        return Err(StoreError::NameCollision(name.to_string()));
    }
    dir.child_dir(name, true).await?;
    debug!(path = %parent, name, "created directory");
    Ok(parent.join(name)?)
}

/// Recursively copies the directory at `src` to `dst` (read+write per
/// file). Re-running a partially completed copy overwrites already-copied
/// files with identical content and converges.
/// 遞迴複製目錄；重複執行會以相同內容覆寫已複製的檔案並收斂到同一結果。
pub async fn copy_dir(
    root: &DirHandle,
    src: &EntryPath,
    dst: &EntryPath,
) -> Result<(), StoreError> {
    // The host tree is acyclic, but copying into our own subtree would
    // recurse into the files being written.
    if dst.starts_with(src) {
        return Err(StoreError::InvalidTarget(dst.to_string()));
    }
    let src_dir = resolve_dir(root, src).await?;
    let dst_dir = ensure_dir(root, dst).await?;
    let mut pending = vec![(src_dir, dst_dir)];
    while let Some((from, to)) = pending.pop() {
        for entry in from.enumerate().await? {
            match entry.kind {
                EntryKind::File => {
                    let source = from.child_file(&entry.name, false).await?;
                    let contents = source.read_text().await?;
                    let copied = to.child_file(&entry.name, true).await?;
                    copied.write_text(&contents).await?;
                }
                EntryKind::Directory => {
                    let from_child = from.child_dir(&entry.name, false).await?;
                    let to_child = to.child_dir(&entry.name, true).await?;
                    pending.push((from_child, to_child));
                }
            }
        }
    }
    Ok(())
}

/// Moves the entry at `src` into `dst_dir`, optionally under a new name.
/// The copy fully lands before the source is removed, so an interruption
/// leaves at worst a duplicate at both locations, never neither; re-running
/// the same call converges to the final state.
/// 將 `src` 搬移至 `dst_dir`；先完成複製再移除來源，中斷時最糟只會兩處同時存在，
/// 重跑同一操作即可收斂。
pub async fn move_entry(
    root: &DirHandle,
    src: &EntryPath,
    dst_dir: &EntryPath,
    kind: EntryKind,
    new_name: Option<&str>,
) -> Result<EntryPath, StoreError> {
    let src_name = path_name(src)?;
    let name = new_name.unwrap_or(src_name);
    validate_segment(name)?;
    let target = dst_dir.join(name)?;
    if target == *src {
        // Same location is a no-op, but only for an entry that exists.
        match kind {
            EntryKind::File => {
                resolve_file(root, src).await?;
            }
            EntryKind::Directory => {
                resolve_dir(root, src).await?;
            }
        }
        return Ok(target);
    }
    match kind {
        EntryKind::File => {
            let source = resolve_file(root, src).await?;
            let contents = source.read_text().await?;
            let dst = ensure_dir(root, dst_dir).await?;
            let moved = dst.child_file(name, true).await?;
            moved.write_text(&contents).await?;
        }
        EntryKind::Directory => {
            if target.starts_with(src) {
                return Err(StoreError::InvalidTarget(target.to_string()));
            }
            copy_dir(root, src, &target).await?;
        }
    }
    let src_parent = parent_of(src)?;
    let parent = resolve_dir(root, &src_parent).await?;
    parent
        .remove(src_name, matches!(kind, EntryKind::Directory))
        .await?;
    debug!(from = %src, to = %target, "moved entry");
    Ok(target)
}

/// Renames the entry at `path` in place. Prefers the host's atomic move
/// primitive (which keeps live handles valid) and falls back to
/// copy+delete when the host has none. On success exactly one entry named
/// `new_name` exists and none named the old name.
/// 就地重新命名；優先使用宿主的原子搬移，否則改走複製後刪除。成功後僅存在新名稱。
pub async fn rename(
    root: &DirHandle,
    path: &EntryPath,
    new_name: &str,
    kind: EntryKind,
) -> Result<EntryPath, StoreError> {
    let old_name = path_name(path)?;
    validate_segment(new_name)?;
    if new_name == old_name {
        return Ok(path.clone());
    }
    let parent_path = parent_of(path)?;
    let parent = resolve_dir(root, &parent_path).await?;
    // Renames never overwrite: a colliding sibling aborts with the old
    // identity fully intact.
    if entry_exists(&parent, new_name).await?.is_some() {
        return Err(StoreError::NameCollision(new_name.to_string()));
    }
    let dst = Arc::clone(&parent);
    if parent.move_child(old_name, &dst, new_name).await? {
        debug!(path = %path, new_name, "renamed atomically");
        return parent_path.join(new_name).map_err(Into::into);
    }
    move_entry(root, path, &parent_path, kind, Some(new_name)).await
}

fn path_name(path: &EntryPath) -> Result<&str, StoreError> {
    path.name()
        .ok_or_else(|| StoreError::InvalidTarget("<root>".to_string()))
}

fn parent_of(path: &EntryPath) -> Result<EntryPath, StoreError> {
    path.parent()
        .ok_or_else(|| StoreError::InvalidTarget("<root>".to_string()))
}
