use async_trait::async_trait;

use crate::error::StoreError;
use crate::handle::DirHandle;

/// Outcome of a permission query or prompt.
/// 權限查詢或請求的結果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
}

impl PermissionState {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionState::Granted)
    }
}

/// Boundary to the host capability store: the only source of root handles.
/// 宿主能力儲存的邊界，也是根目錄控制代碼的唯一來源。
///
/// A recalled handle must pass a permission re-check before reuse; `Denied`
/// is a user-visible "permission needed" state, not a crash.
#[async_trait]
pub trait CapabilityHost: Send + Sync {
    /// Asks the user to pick a workspace root. `Ok(None)` means the picker
    /// was abandoned, which is not a failure.
    /// 請使用者選取工作區根目錄；`Ok(None)` 代表取消選取，並非失敗。
    async fn request_directory_access(&self) -> Result<Option<DirHandle>, StoreError>;

    /// Checks the current permission state without prompting.
    /// 在不彈出提示的情況下查詢目前權限。
    async fn query_permission(&self, dir: &DirHandle) -> PermissionState;

    /// Prompts the user to re-grant access to a previously issued handle.
    /// 提示使用者重新授權先前取得的控制代碼。
    async fn request_permission(&self, dir: &DirHandle) -> PermissionState;
}
