//! Compound entry operations for Markbook workspaces: listing, create,
//! move, rename, recursive copy, and the recycle-bin flow.
//! Markbook 工作區的複合儲存操作：列表、建立、搬移、重新命名、遞迴複製與資源回收。
//!
//! Every operation takes the workspace root plus durable paths and resolves
//! handles freshly; this is the only layer allowed to call the capability
//! adapter's mutating primitives.

pub mod entry;
pub mod listing;
pub mod trash;

pub use entry::{copy_dir, create_dir, create_file, ensure_dir, move_entry, rename};
pub use listing::list_dir;
pub use trash::{hard_delete, list_trash, restore_entry, soft_delete, TRASH_DIR};
