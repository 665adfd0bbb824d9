use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::StoreError;
use crate::handle::{
    DirCapability, DirHandle, EntryInfo, EntryKind, FileCapability, FileHandle, HandleKey,
};
use crate::host::{CapabilityHost, PermissionState};

/// In-memory capability backend. Handles carry node ids into a shared slab,
/// so an entry removed or replaced through any other handle leaves the old
/// handles stale exactly like a host store would.
/// 記憶體內的能力後端；控制代碼持有節點編號，項目被移除或取代後舊代碼即失效，
/// 行為與宿主儲存一致。
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug)]
struct Inner {
    nodes: HashMap<u64, Node>,
    next_id: u64,
    root_id: u64,
    permission_granted: bool,
    atomic_moves: bool,
}

#[derive(Debug)]
struct Node {
    name: String,
    body: NodeBody,
}

#[derive(Debug)]
enum NodeBody {
    File { contents: String },
    Dir { children: Vec<u64> },
}

impl Node {
    fn kind(&self) -> EntryKind {
        match self.body {
            NodeBody::File { .. } => EntryKind::File,
            NodeBody::Dir { .. } => EntryKind::Directory,
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::named("<root>")
    }

    /// A store whose root carries the given workspace display name; minted
    /// root handles report it through `name()`.
    /// 以指定顯示名稱作為根目錄的儲存；根控制代碼的 `name()` 回傳該名稱。
    pub fn named(root_name: impl Into<String>) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            0,
            Node {
                name: root_name.into(),
                body: NodeBody::Dir {
                    children: Vec::new(),
                },
            },
        );
        Self {
            inner: Arc::new(Mutex::new(Inner {
                nodes,
                next_id: 1,
                root_id: 0,
                permission_granted: true,
                atomic_moves: true,
            })),
        }
    }

    /// Mints a fresh handle for the store root.
    /// 建立根目錄的全新控制代碼。
    pub fn root(&self) -> DirHandle {
        let inner = self.inner.lock().expect("store lock");
        let root_id = inner.root_id;
        let label = inner
            .nodes
            .get(&root_id)
            .map(|node| node.name.clone())
            .unwrap_or_default();
        Arc::new(MemoryDir {
            store: Arc::clone(&self.inner),
            id: root_id,
            label,
        })
    }

    /// Grants or revokes the capability; revoked stores fail every
    /// operation with `PermissionDenied`.
    /// 授予或撤銷能力；撤銷後所有操作回傳 `PermissionDenied`。
    pub fn set_permission(&self, granted: bool) {
        self.inner.lock().expect("store lock").permission_granted = granted;
    }

    pub fn permission_granted(&self) -> bool {
        self.inner.lock().expect("store lock").permission_granted
    }

    /// Disables the atomic move primitive so `move_child` reports
    /// `Ok(false)` and callers exercise the copy+delete fallback.
    /// 關閉原子搬移，讓呼叫端改走複製後刪除的備援路徑。
    pub fn disable_atomic_moves(&self) {
        self.inner.lock().expect("store lock").atomic_moves = false;
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn check_permission(&self) -> Result<(), StoreError> {
        if self.permission_granted {
            Ok(())
        } else {
            Err(StoreError::PermissionDenied)
        }
    }

    fn node(&self, id: u64, label: &str) -> Result<&Node, StoreError> {
        self.nodes
            .get(&id)
            .ok_or_else(|| StoreError::NotFound(label.to_string()))
    }

    fn child_id(&self, dir_id: u64, name: &str, label: &str) -> Result<Option<u64>, StoreError> {
        match &self.node(dir_id, label)?.body {
            NodeBody::Dir { children } => Ok(children
                .iter()
                .copied()
                .find(|id| self.nodes.get(id).map(|n| n.name == name).unwrap_or(false))),
            NodeBody::File { .. } => Err(StoreError::NotFound(label.to_string())),
        }
    }

    fn insert_child(&mut self, dir_id: u64, name: &str, body: NodeBody) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                name: name.to_string(),
                body,
            },
        );
        if let Some(Node {
            body: NodeBody::Dir { children },
            ..
        }) = self.nodes.get_mut(&dir_id)
        {
            children.push(id);
        }
        id
    }

    fn remove_subtree(&mut self, id: u64) {
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            if let Some(node) = self.nodes.remove(&current) {
                if let NodeBody::Dir { children } = node.body {
                    queue.extend(children);
                }
            }
        }
    }
}

#[derive(Debug)]
struct MemoryDir {
    store: Arc<Mutex<Inner>>,
    id: u64,
    label: String,
}

#[derive(Debug)]
struct MemoryFile {
    store: Arc<Mutex<Inner>>,
    id: u64,
    label: String,
}

#[async_trait]
impl DirCapability for MemoryDir {
    fn key(&self) -> HandleKey {
        HandleKey::new(self.id)
    }

    fn name(&self) -> &str {
        &self.label
    }

    async fn enumerate(&self) -> Result<Vec<EntryInfo>, StoreError> {
        let inner = self.store.lock().expect("store lock");
        inner.check_permission()?;
        match &inner.node(self.id, &self.label)?.body {
            NodeBody::Dir { children } => Ok(children
                .iter()
                .filter_map(|id| inner.nodes.get(id))
                .map(|node| EntryInfo {
                    name: node.name.clone(),
                    kind: node.kind(),
                })
                .collect()),
            NodeBody::File { .. } => Err(StoreError::NotFound(self.label.clone())),
        }
    }

    async fn child_file(&self, name: &str, create: bool) -> Result<FileHandle, StoreError> {
        let mut inner = self.store.lock().expect("store lock");
        inner.check_permission()?;
        let existing = inner.child_id(self.id, name, &self.label)?;
        let id = match existing {
            Some(id) => match inner.node(id, name)?.kind() {
                EntryKind::File => id,
                EntryKind::Directory if create => {
                    return Err(StoreError::NameCollision(name.to_string()))
                }
                EntryKind::Directory => return Err(StoreError::NotFound(name.to_string())),
            },
            None if create => inner.insert_child(
                self.id,
                name,
                NodeBody::File {
                    contents: String::new(),
                },
            ),
            None => return Err(StoreError::NotFound(name.to_string())),
        };
        Ok(Arc::new(MemoryFile {
            store: Arc::clone(&self.store),
            id,
            label: name.to_string(),
        }))
    }

    async fn child_dir(&self, name: &str, create: bool) -> Result<DirHandle, StoreError> {
        let mut inner = self.store.lock().expect("store lock");
        inner.check_permission()?;
        let existing = inner.child_id(self.id, name, &self.label)?;
        let id = match existing {
            Some(id) => match inner.node(id, name)?.kind() {
                EntryKind::Directory => id,
                EntryKind::File if create => {
                    return Err(StoreError::NameCollision(name.to_string()))
                }
                EntryKind::File => return Err(StoreError::NotFound(name.to_string())),
            },
            None if create => inner.insert_child(
                self.id,
                name,
                NodeBody::Dir {
                    children: Vec::new(),
                },
            ),
            None => return Err(StoreError::NotFound(name.to_string())),
        };
        Ok(Arc::new(MemoryDir {
            store: Arc::clone(&self.store),
            id,
            label: name.to_string(),
        }))
    }

    async fn remove(&self, name: &str, recursive: bool) -> Result<(), StoreError> {
        let mut inner = self.store.lock().expect("store lock");
        inner.check_permission()?;
        let child = inner
            .child_id(self.id, name, &self.label)?
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        if let NodeBody::Dir { children } = &inner.node(child, name)?.body {
            if !children.is_empty() && !recursive {
                return Err(StoreError::NotEmpty(name.to_string()));
            }
        }
        if let Some(Node {
            body: NodeBody::Dir { children },
            ..
        }) = inner.nodes.get_mut(&self.id)
        {
            children.retain(|id| *id != child);
        }
        inner.remove_subtree(child);
        Ok(())
    }

    async fn move_child(
        &self,
        name: &str,
        dst: &DirHandle,
        new_name: &str,
    ) -> Result<bool, StoreError> {
        let mut inner = self.store.lock().expect("store lock");
        inner.check_permission()?;
        if !inner.atomic_moves {
            return Ok(false);
        }
        // A handle from a different backend cannot be moved atomically.
        let dst_id = dst.key().as_u64();
        match inner.nodes.get(&dst_id).map(Node::kind) {
            Some(EntryKind::Directory) => {}
            _ => return Ok(false),
        }
        let child = inner
            .child_id(self.id, name, &self.label)?
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        if inner.child_id(dst_id, new_name, new_name)?.is_some() {
            return Err(StoreError::NameCollision(new_name.to_string()));
        }
        if let Some(Node {
            body: NodeBody::Dir { children },
            ..
        }) = inner.nodes.get_mut(&self.id)
        {
            children.retain(|id| *id != child);
        }
        if let Some(Node {
            body: NodeBody::Dir { children },
            ..
        }) = inner.nodes.get_mut(&dst_id)
        {
            children.push(child);
        }
        if let Some(node) = inner.nodes.get_mut(&child) {
            node.name = new_name.to_string();
        }
        Ok(true)
    }
}

#[async_trait]
impl FileCapability for MemoryFile {
    fn key(&self) -> HandleKey {
        HandleKey::new(self.id)
    }

    fn name(&self) -> &str {
        &self.label
    }

    async fn read_text(&self) -> Result<String, StoreError> {
        let inner = self.store.lock().expect("store lock");
        inner.check_permission()?;
        match &inner.node(self.id, &self.label)?.body {
            NodeBody::File { contents } => Ok(contents.clone()),
            NodeBody::Dir { .. } => Err(StoreError::NotFound(self.label.clone())),
        }
    }

    async fn write_text(&self, new_contents: &str) -> Result<(), StoreError> {
        let mut inner = self.store.lock().expect("store lock");
        inner.check_permission()?;
        let label = self.label.clone();
        let node = inner
            .nodes
            .get_mut(&self.id)
            .ok_or(StoreError::NotFound(label))?;
        match &mut node.body {
            NodeBody::File { contents } => {
                *contents = new_contents.to_string();
                Ok(())
            }
            NodeBody::Dir { .. } => Err(StoreError::NotFound(self.label.clone())),
        }
    }
}

/// Scripted response for the next picker/permission request.
/// 腳本化的選取視窗／權限請求回應。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostResponse {
    Grant,
    Deny,
    Cancel,
}

/// Capability-host boundary over a [`MemoryStore`], with scriptable
/// grant/deny/cancel responses for the picker and permission prompts.
/// 以 [`MemoryStore`] 實作的宿主邊界，可腳本化授予、拒絕與取消回應。
#[derive(Debug)]
pub struct MemoryHost {
    store: MemoryStore,
    responses: Mutex<VecDeque<HostResponse>>,
}

impl MemoryHost {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store,
            responses: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push_response(&self, response: HostResponse) {
        self.responses
            .lock()
            .expect("host lock")
            .push_back(response);
    }

    fn next_response(&self) -> HostResponse {
        self.responses
            .lock()
            .expect("host lock")
            .pop_front()
            .unwrap_or(HostResponse::Grant)
    }
}

#[async_trait]
impl CapabilityHost for MemoryHost {
    async fn request_directory_access(&self) -> Result<Option<DirHandle>, StoreError> {
        match self.next_response() {
            HostResponse::Grant => {
                self.store.set_permission(true);
                Ok(Some(self.store.root()))
            }
            // Abandoning the picker is a silent no-op, not a failure.
            HostResponse::Cancel => Ok(None),
            HostResponse::Deny => Err(StoreError::PermissionDenied),
        }
    }

    async fn query_permission(&self, _dir: &DirHandle) -> PermissionState {
        if self.store.permission_granted() {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        }
    }

    async fn request_permission(&self, _dir: &DirHandle) -> PermissionState {
        match self.next_response() {
            HostResponse::Grant => {
                self.store.set_permission(true);
                PermissionState::Granted
            }
            _ => PermissionState::Denied,
        }
    }
}
