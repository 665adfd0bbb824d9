use markbook_ops::rename;
use markbook_store::{resolve_file, DirHandle, EntryKind, EntryPath};

use crate::document::Document;
use crate::workspace::WorkspaceError;

const MAX_TITLE_CHARS: usize = 64;

/// Extracts a display title from the first non-empty line when it is an
/// ATX heading (`#` through `######`). Anything else yields no title, so
/// documents without a heading keep their current name.
/// 從第一個非空行擷取 ATX 標題；沒有標題的文件維持原名稱。
pub fn derive_title(contents: &str) -> Option<String> {
    let line = contents.lines().find(|line| !line.trim().is_empty())?;
    let trimmed = line.trim();
    let hashes = trimmed.bytes().take_while(|b| *b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &trimmed[hashes..];
    if !rest.is_empty() && !rest.starts_with(' ') {
        return None;
    }
    sanitize_title(rest.trim())
}

/// The file name a title-driven rename targets.
/// 標題驅動重新命名的目標檔名。
pub fn title_file_name(contents: &str) -> Option<String> {
    derive_title(contents).map(|title| format!("{title}.md"))
}

fn sanitize_title(title: &str) -> Option<String> {
    let cleaned: String = title
        .chars()
        .map(|ch| {
            if ch.is_control() || matches!(ch, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
            {
                ' '
            } else {
                ch
            }
        })
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() || collapsed.chars().all(|ch| ch == '.') {
        return None;
    }
    let capped: String = collapsed.chars().take(MAX_TITLE_CHARS).collect();
    Some(capped.trim_end().to_string())
}

/// Renames a bound document in place and updates its identity fields. On
/// `NameCollision` the document keeps its old identity untouched — no
/// partial rename is ever applied.
/// 就地重新命名綁定文件並更新其身分欄位；名稱衝突時維持原身分不變。
pub async fn rename_document(
    root: &DirHandle,
    doc: &mut Document,
    new_name: &str,
) -> Result<EntryPath, WorkspaceError> {
    let path = doc.path.clone().ok_or(WorkspaceError::VirtualDocument)?;
    if path.name() == Some(new_name) {
        return Ok(path);
    }
    let new_path = rename(root, &path, new_name, EntryKind::File).await?;
    doc.name = new_name.to_string();
    doc.path = Some(new_path.clone());
    // The copy+delete fallback invalidates the old handle; refresh it and
    // fall back to path-only if the resolve loses a race.
    doc.handle = resolve_file(root, &new_path).await.ok();
    Ok(new_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use markbook_store::{MemoryStore, StoreError};

    #[test]
    fn title_comes_from_the_first_heading() {
        assert_eq!(derive_title("# My Note\nbody"), Some("My Note".into()));
        assert_eq!(derive_title("\n\n## Deep  Dive"), Some("Deep Dive".into()));
        assert_eq!(title_file_name("# My Note"), Some("My Note.md".into()));
    }

    #[test]
    fn non_headings_yield_no_title() {
        assert_eq!(derive_title("plain text"), None);
        assert_eq!(derive_title("####### seven"), None);
        assert_eq!(derive_title("#no-space"), None);
        assert_eq!(derive_title("#   "), None);
        assert_eq!(derive_title(""), None);
    }

    #[test]
    fn titles_are_sanitized_for_file_names() {
        assert_eq!(derive_title("# a/b: c?"), Some("a b c".into()));
        assert_eq!(derive_title("# ///"), None);
        let long = format!("# {}", "x".repeat(200));
        assert_eq!(derive_title(&long).unwrap().chars().count(), 64);
    }

    #[tokio::test]
    async fn rename_updates_identity_and_handle() {
        let store = MemoryStore::new();
        let root = store.root();
        let file = root.child_file("a.md", true).await.unwrap();
        file.write_text("# B").await.unwrap();
        let mut doc = Document::opened(
            "a.md",
            EntryPath::parse("a.md").unwrap(),
            Some(file),
            "# B",
        );

        let new_path = rename_document(&root, &mut doc, "B.md").await.unwrap();
        assert_eq!(new_path.to_string(), "B.md");
        assert_eq!(doc.name(), "B.md");
        assert_eq!(doc.path(), Some(&new_path));
        assert!(doc.handle().is_some());
    }

    #[tokio::test]
    async fn collision_aborts_without_touching_the_document() {
        let store = MemoryStore::new();
        let root = store.root();
        let file = root.child_file("a.md", true).await.unwrap();
        root.child_file("b.md", true).await.unwrap();
        let old_path = EntryPath::parse("a.md").unwrap();
        let mut doc = Document::opened("a.md", old_path.clone(), Some(file), "");

        let err = rename_document(&root, &mut doc, "b.md").await.unwrap_err();
        assert!(matches!(
            err,
            WorkspaceError::Store(StoreError::NameCollision(_))
        ));
        assert_eq!(doc.name(), "a.md");
        assert_eq!(doc.path(), Some(&old_path));
    }
}
