use tempfile::tempdir;

use markbook_ops::ensure_dir;
use markbook_store::{resolve_file, CapabilityHost, DirHandle, EntryPath, MemoryHost, MemoryStore};
use markbook_session::{restore_session, SavedFile, SavedSession, SessionStore, SESSION_FORMAT_VERSION};
use markbook_workspace::{CaretPosition, Document, Workspace};

async fn seeded_root() -> (MemoryStore, DirHandle) {
    let store = MemoryStore::new();
    let root = store.root();
    ensure_dir(&root, &EntryPath::parse("notes").unwrap())
        .await
        .unwrap();
    let notes = root.child_dir("notes", false).await.unwrap();
    let a = notes.child_file("a.md", true).await.unwrap();
    a.write_text("# Alpha").await.unwrap();
    let b = root.child_file("b.md", true).await.unwrap();
    b.write_text("# Beta").await.unwrap();
    (store, root)
}

fn session_of(files: &[(&str, &str, Option<CaretPosition>)], active: Option<&str>) -> SavedSession {
    SavedSession {
        format_version: SESSION_FORMAT_VERSION,
        open_files: files
            .iter()
            .map(|(name, path, caret)| SavedFile {
                name: name.to_string(),
                path: EntryPath::parse(*path).unwrap(),
                caret: *caret,
            })
            .collect(),
        active_file_path: active.map(|path| EntryPath::parse(path).unwrap()),
    }
}

#[tokio::test]
async fn a_saved_session_survives_the_disk_round_trip_and_restores() {
    let (_store, root) = seeded_root().await;
    let tmp = tempdir().unwrap();
    let disk = SessionStore::new(tmp.path());

    let caret = Some(CaretPosition { line: 2, column: 5 });
    let session = session_of(
        &[("a.md", "notes/a.md", caret), ("b.md", "b.md", None)],
        Some("b.md"),
    );
    let key = SessionStore::session_key("My Notes");
    disk.save_session(&key, &session).unwrap();
    let loaded = disk.load_session(&key).unwrap().unwrap();

    let mut workspace = Workspace::new();
    workspace.open_root(root.clone());
    let restored = restore_session(&mut workspace, &root, &loaded).await.unwrap();

    assert_eq!(restored, 2);
    let a = workspace
        .find_by_path(&EntryPath::parse("notes/a.md").unwrap())
        .unwrap();
    assert_eq!(a.contents(), "# Alpha");
    assert_eq!(a.caret(), caret);
    assert!(!a.is_dirty());
    assert_eq!(
        workspace.active_document().and_then(Document::path),
        Some(&EntryPath::parse("b.md").unwrap())
    );
}

#[tokio::test]
async fn vanished_entries_are_skipped_without_blocking_the_rest() {
    let (_store, root) = seeded_root().await;
    let session = session_of(
        &[("gone.md", "gone.md", None), ("b.md", "b.md", None)],
        Some("gone.md"),
    );

    let mut workspace = Workspace::new();
    workspace.open_root(root.clone());
    let restored = restore_session(&mut workspace, &root, &session).await.unwrap();

    assert_eq!(restored, 1);
    assert_eq!(workspace.documents().len(), 1);
    // The vanished active path cannot be honored; the surviving document
    // stays active from its own open.
    assert_eq!(
        workspace.active_document().map(Document::name),
        Some("b.md")
    );
}

#[tokio::test]
async fn an_empty_restore_falls_back_to_the_readme_any_casing() {
    let store = MemoryStore::new();
    let root = store.root();
    root.child_file("zzz.md", true).await.unwrap();
    let readme = root.child_file("ReadMe.md", true).await.unwrap();
    readme.write_text("hello").await.unwrap();

    let mut workspace = Workspace::new();
    workspace.open_root(root.clone());
    let session = session_of(&[("gone.md", "gone.md", None)], None);
    let restored = restore_session(&mut workspace, &root, &session).await.unwrap();

    assert_eq!(restored, 1);
    let doc = workspace.active_document().unwrap();
    assert_eq!(doc.name(), "ReadMe.md");
    assert_eq!(doc.contents(), "hello");
    assert!(!doc.is_dirty());
}

#[tokio::test]
async fn without_a_readme_the_first_markdown_file_opens() {
    let store = MemoryStore::new();
    let root = store.root();
    root.child_dir("archive", true).await.unwrap();
    root.child_file("b.md", true).await.unwrap();
    root.child_file("a.md", true).await.unwrap();
    root.child_file("a.txt", true).await.unwrap();

    let mut workspace = Workspace::new();
    workspace.open_root(root.clone());
    let session = session_of(&[], None);
    let restored = restore_session(&mut workspace, &root, &session).await.unwrap();

    assert_eq!(restored, 1);
    assert_eq!(
        workspace.active_document().map(Document::name),
        Some("a.md")
    );
}

#[tokio::test]
async fn the_session_key_derives_from_the_granted_root_itself() {
    let backing = MemoryStore::named("My Notes");
    let seed = backing.root().child_file("a.md", true).await.unwrap();
    seed.write_text("# A").await.unwrap();
    let host = MemoryHost::new(backing);
    let tmp = tempdir().unwrap();
    let disk = SessionStore::new(tmp.path());

    // First run: the granted handle is the only source of the root's name.
    let root = host.request_directory_access().await.unwrap().unwrap();
    let key = SessionStore::session_key(root.name());
    let mut workspace = Workspace::new();
    workspace.open_root(root.clone());
    let path = EntryPath::parse("a.md").unwrap();
    let handle = resolve_file(&root, &path).await.unwrap();
    workspace.open_document(Document::opened("a.md", path.clone(), Some(handle), "# A"));
    disk.save_session(&key, &SavedSession::capture(&workspace))
        .unwrap();

    // Next run: a fresh grant yields the same name, hence the same key.
    let root = host.request_directory_access().await.unwrap().unwrap();
    let key = SessionStore::session_key(root.name());
    let saved = disk.load_session(&key).unwrap().unwrap();

    let mut workspace = Workspace::new();
    workspace.open_root(root.clone());
    let restored = restore_session(&mut workspace, &root, &saved).await.unwrap();
    assert_eq!(restored, 1);
    let doc = workspace.find_by_path(&path).unwrap();
    assert_eq!(doc.contents(), "# A");
}

#[tokio::test]
async fn an_empty_root_restores_to_an_empty_workspace() {
    let store = MemoryStore::new();
    let root = store.root();
    let mut workspace = Workspace::new();
    workspace.open_root(root.clone());

    let session = session_of(&[], None);
    let restored = restore_session(&mut workspace, &root, &session).await.unwrap();

    assert_eq!(restored, 0);
    assert!(workspace.documents().is_empty());
    assert!(workspace.active_document().is_none());
}
