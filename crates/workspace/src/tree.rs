use markbook_ops::list_dir;
use markbook_store::{DirHandle, EntryKind, EntryPath, StoreError};

/// One node of the lazily loaded workspace tree. `children` is `None`
/// until the node has been expanded at least once; expansion loads a
/// single shallow level, so an untouched subtree costs nothing.
/// 惰性載入的工作區樹節點；`children` 在第一次展開前為 `None`，
/// 每次展開只載入一層淺層內容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    name: String,
    path: EntryPath,
    kind: EntryKind,
    children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    /// The unloaded root node of an open workspace.
    /// 開啟工作區的未載入根節點。
    pub fn root() -> Self {
        Self {
            name: String::new(),
            path: EntryPath::root(),
            kind: EntryKind::Directory,
            children: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &EntryPath {
        &self.path
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_loaded(&self) -> bool {
        self.children.is_some()
    }

    pub fn children(&self) -> Option<&[TreeNode]> {
        self.children.as_deref()
    }

    /// Finds the node for a path by walking loaded levels only; an
    /// unloaded ancestor means the target is not materialized yet.
    /// 僅沿已載入的層級尋找路徑對應節點；祖先未載入即視為不存在。
    pub fn find_mut(&mut self, path: &EntryPath) -> Option<&mut TreeNode> {
        if !path.starts_with(&self.path) {
            return None;
        }
        let mut current = self;
        let skip = current.path.segments().len();
        for segment in path.segments().iter().skip(skip) {
            current = current
                .children
                .as_mut()?
                .iter_mut()
                .find(|child| child.name == *segment)?;
        }
        Some(current)
    }

    /// Drops the loaded subtree; the next expand re-reads from storage.
    /// 捨棄已載入的子樹；下次展開時重新讀取儲存。
    pub fn collapse(&mut self) {
        if self.kind == EntryKind::Directory {
            self.children = None;
        }
    }
}

/// Expands one directory node from a fresh shallow listing. Children that
/// survive by name and kind keep their loaded subtrees, so refreshing a
/// level does not collapse everything beneath it.
/// 以最新的淺層列舉展開目錄節點；名稱與類型皆相同的子節點保留其已載入
/// 子樹，重新整理不會整層收合。
pub async fn expand(root: &DirHandle, node: &mut TreeNode) -> Result<(), StoreError> {
    if node.kind == EntryKind::File {
        return Ok(());
    }
    let entries = list_dir(root, &node.path).await?;
    let mut previous = node.children.take().unwrap_or_default();
    let mut children = Vec::with_capacity(entries.len());
    for info in entries {
        let path = node.path.join(&info.name)?;
        let kept = previous
            .iter()
            .position(|child| child.name == info.name && child.kind == info.kind);
        children.push(match kept {
            Some(index) => previous.swap_remove(index),
            None => TreeNode {
                name: info.name,
                path,
                kind: info.kind,
                children: None,
            },
        });
    }
    node.children = Some(children);
    Ok(())
}
