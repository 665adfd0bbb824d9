use std::fs;
use std::io;
use std::path::Path;

/// Atomic replace: write to a temporary sibling, then rename over the
/// target so readers never observe a half-written file.
/// 原子替換：先寫入暫存檔再改名覆蓋，讀取端不會看到半寫入的檔案。
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)
}
