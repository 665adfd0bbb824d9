//! End-to-end properties of the compound entry operations against the
//! in-memory capability backend.
//! 針對記憶體後端驗證複合操作的端對端性質。

use markbook_ops::{
    copy_dir, create_dir, create_file, list_dir, list_trash, move_entry, rename, restore_entry,
    soft_delete,
};
use markbook_store::{resolve_dir, resolve_file, EntryKind, EntryPath, MemoryStore, StoreError};

fn path(text: &str) -> EntryPath {
    EntryPath::parse(text).unwrap()
}

#[tokio::test]
async fn move_conserves_contents_and_removes_the_source() {
    let store = MemoryStore::new();
    let root = store.root();
    create_dir(&root, &EntryPath::root(), "src").await.unwrap();
    create_dir(&root, &EntryPath::root(), "dst").await.unwrap();
    create_file(&root, &path("src"), "f.md", "C").await.unwrap();

    let moved = move_entry(&root, &path("src/f.md"), &path("dst"), EntryKind::File, None)
        .await
        .unwrap();
    assert_eq!(moved, path("dst/f.md"));
    let target = resolve_file(&root, &path("dst/f.md")).await.unwrap();
    assert_eq!(target.read_text().await.unwrap(), "C");
    assert!(resolve_file(&root, &path("src/f.md"))
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn interrupted_move_converges_when_reapplied() {
    let store = MemoryStore::new();
    let root = store.root();
    create_dir(&root, &EntryPath::root(), "src").await.unwrap();
    create_dir(&root, &EntryPath::root(), "dst").await.unwrap();
    create_file(&root, &path("src"), "f.md", "C").await.unwrap();

    // Simulate a crash between the target write and the source removal:
    // the copy landed but the source still exists.
    create_file(&root, &path("dst"), "f.md", "C").await.unwrap();

    let moved = move_entry(&root, &path("src/f.md"), &path("dst"), EntryKind::File, None)
        .await
        .unwrap();
    assert_eq!(moved, path("dst/f.md"));
    let target = resolve_file(&root, &path("dst/f.md")).await.unwrap();
    assert_eq!(target.read_text().await.unwrap(), "C");
    assert!(resolve_file(&root, &path("src/f.md"))
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn directory_move_carries_every_descendant() {
    let store = MemoryStore::new();
    let root = store.root();
    create_dir(&root, &EntryPath::root(), "a").await.unwrap();
    create_dir(&root, &path("a"), "inner").await.unwrap();
    create_file(&root, &path("a"), "top.md", "1").await.unwrap();
    create_file(&root, &path("a/inner"), "deep.md", "2")
        .await
        .unwrap();
    create_dir(&root, &EntryPath::root(), "b").await.unwrap();

    move_entry(&root, &path("a"), &path("b"), EntryKind::Directory, None)
        .await
        .unwrap();

    let deep = resolve_file(&root, &path("b/a/inner/deep.md")).await.unwrap();
    assert_eq!(deep.read_text().await.unwrap(), "2");
    let top = resolve_file(&root, &path("b/a/top.md")).await.unwrap();
    assert_eq!(top.read_text().await.unwrap(), "1");
    assert!(resolve_dir(&root, &path("a")).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn rename_leaves_exactly_one_of_the_two_names() {
    for use_atomic in [true, false] {
        let store = MemoryStore::new();
        if !use_atomic {
            store.disable_atomic_moves();
        }
        let root = store.root();
        create_file(&root, &EntryPath::root(), "a.md", "body")
            .await
            .unwrap();

        let renamed = rename(&root, &path("a.md"), "b.md", EntryKind::File)
            .await
            .unwrap();
        assert_eq!(renamed, path("b.md"));

        let names: Vec<_> = list_dir(&root, &EntryPath::root())
            .await
            .unwrap()
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        assert_eq!(names, vec!["b.md"]);
        let file = resolve_file(&root, &path("b.md")).await.unwrap();
        assert_eq!(file.read_text().await.unwrap(), "body");
    }
}

#[tokio::test]
async fn rename_collision_changes_nothing() {
    let store = MemoryStore::new();
    let root = store.root();
    create_file(&root, &EntryPath::root(), "a.md", "A").await.unwrap();
    create_file(&root, &EntryPath::root(), "b.md", "B").await.unwrap();

    assert!(matches!(
        rename(&root, &path("a.md"), "b.md", EntryKind::File).await,
        Err(StoreError::NameCollision(_))
    ));
    let a = resolve_file(&root, &path("a.md")).await.unwrap();
    let b = resolve_file(&root, &path("b.md")).await.unwrap();
    assert_eq!(a.read_text().await.unwrap(), "A");
    assert_eq!(b.read_text().await.unwrap(), "B");
}

#[tokio::test]
async fn soft_delete_round_trips_through_the_trash() {
    let store = MemoryStore::new();
    let root = store.root();
    create_file(&root, &EntryPath::root(), "x.md", "keep me")
        .await
        .unwrap();

    soft_delete(&root, &path("x.md")).await.unwrap();
    assert!(resolve_file(&root, &path("x.md"))
        .await
        .unwrap_err()
        .is_not_found());
    assert_eq!(list_trash(&root).await.unwrap().len(), 1);

    let restored = restore_entry(&root, "x.md").await.unwrap();
    assert_eq!(restored, path("x.md"));
    let file = resolve_file(&root, &path("x.md")).await.unwrap();
    assert_eq!(file.read_text().await.unwrap(), "keep me");
    assert!(list_trash(&root).await.unwrap().is_empty());
}

#[tokio::test]
async fn soft_delete_and_restore_work_for_directories() {
    let store = MemoryStore::new();
    let root = store.root();
    create_dir(&root, &EntryPath::root(), "notes").await.unwrap();
    create_file(&root, &path("notes"), "a.md", "# A").await.unwrap();

    soft_delete(&root, &path("notes")).await.unwrap();
    assert!(resolve_dir(&root, &path("notes")).await.unwrap_err().is_not_found());

    restore_entry(&root, "notes").await.unwrap();
    let file = resolve_file(&root, &path("notes/a.md")).await.unwrap();
    assert_eq!(file.read_text().await.unwrap(), "# A");
}

#[tokio::test]
async fn copy_dir_duplicates_the_whole_subtree() {
    let store = MemoryStore::new();
    let root = store.root();
    create_dir(&root, &EntryPath::root(), "a").await.unwrap();
    create_dir(&root, &path("a"), "inner").await.unwrap();
    create_file(&root, &path("a/inner"), "deep.md", "2")
        .await
        .unwrap();

    copy_dir(&root, &path("a"), &path("copy")).await.unwrap();

    let original = resolve_file(&root, &path("a/inner/deep.md")).await.unwrap();
    let duplicate = resolve_file(&root, &path("copy/inner/deep.md")).await.unwrap();
    assert_eq!(original.read_text().await.unwrap(), "2");
    assert_eq!(duplicate.read_text().await.unwrap(), "2");
}

#[tokio::test]
async fn trash_is_not_listed_at_the_root_by_accident() {
    let store = MemoryStore::new();
    let root = store.root();
    create_file(&root, &EntryPath::root(), "x.md", "").await.unwrap();
    soft_delete(&root, &path("x.md")).await.unwrap();

    let names: Vec<_> = list_dir(&root, &EntryPath::root())
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.name)
        .collect();
    // The container itself is an ordinary directory; filtering it out of
    // the sidebar is a presentation decision, not a storage one.
    assert_eq!(names, vec![".trash"]);
}
