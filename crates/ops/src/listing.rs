use markbook_store::{resolve_dir, DirHandle, EntryInfo, EntryPath, StoreError};

/// Shallow listing with the UI ordering contract: directories before
/// files, then byte-wise lexicographic by name ascending. Deterministic
/// regardless of the backend's enumeration order.
/// 淺層列表並套用介面排序契約：目錄在前，其後依名稱位元序遞增，結果必定確定。
pub async fn list_dir(
    root: &DirHandle,
    dir_path: &EntryPath,
) -> Result<Vec<EntryInfo>, StoreError> {
    let dir = resolve_dir(root, dir_path).await?;
    let mut entries = dir.enumerate().await?;
    entries.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use markbook_store::{EntryKind, MemoryStore};

    #[tokio::test]
    async fn directories_sort_before_files_then_by_name() {
        let store = MemoryStore::new();
        let root = store.root();
        root.child_file("b.md", true).await.unwrap();
        root.child_dir("A", true).await.unwrap();
        root.child_file("a.md", true).await.unwrap();

        let listed = list_dir(&root, &EntryPath::root()).await.unwrap();
        let names: Vec<_> = listed.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, vec!["A", "a.md", "b.md"]);
        assert_eq!(listed[0].kind, EntryKind::Directory);
    }

    #[tokio::test]
    async fn listing_a_missing_directory_fails() {
        let store = MemoryStore::new();
        let root = store.root();
        let missing = EntryPath::parse("gone").unwrap();
        assert!(list_dir(&root, &missing).await.unwrap_err().is_not_found());
    }
}
