//! Capability-based storage access for Markbook workspaces.
//! Markbook 工作區的能力型儲存存取核心模組。
//!
//! Handles are ephemeral authorizations that never survive a process
//! restart; the `/`-separated [`EntryPath`] is the single durable identity
//! of an entry. Everything above this crate treats a handle as a cache and
//! the path as truth.

pub mod error;
pub mod handle;
pub mod host;
pub mod memory;
pub mod path;
pub mod resolver;

pub use error::{PathError, StoreError};
pub use handle::{DirCapability, DirHandle, EntryInfo, EntryKind, FileCapability, FileHandle, HandleKey};
pub use host::{CapabilityHost, PermissionState};
pub use memory::{HostResponse, MemoryHost, MemoryStore};
pub use path::EntryPath;
pub use resolver::{resolve_dir, resolve_file, resolve_to_path};
