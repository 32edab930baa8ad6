use std::fs;
use std::io;
use std::path::Path;

use tracing::warn;
use walkdir::WalkDir;

use crate::error::{DownloadError, Result};

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
const STEP: f64 = 1024.0;

/// Total size in bytes of a file, or of every file below a directory.
pub fn dir_size(path: &Path) -> Result<u64> {
    let mut total = 0;
    for entry in WalkDir::new(path).follow_links(true) {
        let entry = entry.map_err(|e| walk_error(path, e))?;
        if entry.file_type().is_file() {
            total += entry.metadata().map_err(|e| walk_error(path, e))?.len();
        }
    }
    Ok(total)
}

fn walk_error(root: &Path, e: walkdir::Error) -> DownloadError {
    let path = e.path().unwrap_or(root).to_path_buf();
    DownloadError::fs(path, io::Error::from(e))
}

/// Human readable size, e.g. `"512.00 B"` or `"1.46 GB"`.
///
/// Scales down while the value is still strictly above 1024, so exact
/// powers of 1024 stay in the smaller unit (`1024` is `"1024.00 B"`).
/// Sizes past the last unit stay in TB.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;
    while size / STEP > 1.0 && unit < UNITS.len() - 1 {
        size /= STEP;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}

/// Delete a file, or a directory and everything below it.
pub fn remove_path(path: &Path) -> Result<()> {
    let metadata = fs::symlink_metadata(path).map_err(|e| DownloadError::fs(path, e))?;
    if metadata.is_dir() {
        remove_dir_tree(path)
    } else {
        remove_with_retry(path, |p| fs::remove_file(p))
    }
}

/// Recursively delete a directory tree.
///
/// Entries that refuse to go away because they are read-only get owner
/// write permission and one more attempt. Every other error is returned
/// as-is.
pub fn remove_dir_tree(path: &Path) -> Result<()> {
    let entries = fs::read_dir(path).map_err(|e| DownloadError::fs(path, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| DownloadError::fs(path, e))?;
        let entry_path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| DownloadError::fs(&entry_path, e))?;

        if file_type.is_dir() {
            remove_dir_tree(&entry_path)?;
        } else {
            remove_with_retry(&entry_path, |p| fs::remove_file(p))?;
        }
    }

    remove_with_retry(path, |p| fs::remove_dir(p))
}

fn remove_with_retry<F>(path: &Path, remove: F) -> Result<()>
where
    F: Fn(&Path) -> io::Result<()>,
{
    let err = match remove(path) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    if !is_read_only(path) {
        return Err(DownloadError::fs(path, err));
    }

    warn!(path = ?path, error = %err, "Read-only entry, granting write permission and retrying");
    grant_owner_write(path)?;
    remove(path).map_err(|e| DownloadError::fs(path, e))
}

/// Whether the entry lacks write permission, either by its mode bits or for
/// the current user (e.g. owned by someone else).
fn is_read_only(path: &Path) -> bool {
    match fs::symlink_metadata(path) {
        Ok(m) => m.permissions().readonly() || !writable_by_current_user(path),
        Err(_) => false,
    }
}

#[cfg(unix)]
fn writable_by_current_user(path: &Path) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return true;
    };
    unsafe { libc::access(c_path.as_ptr(), libc::W_OK) == 0 }
}

#[cfg(not(unix))]
fn writable_by_current_user(_path: &Path) -> bool {
    true
}

#[cfg(unix)]
fn grant_owner_write(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::symlink_metadata(path)
        .map_err(|e| DownloadError::fs(path, e))?
        .permissions();
    perms.set_mode(perms.mode() | 0o200);
    fs::set_permissions(path, perms).map_err(|e| DownloadError::fs(path, e))
}

#[cfg(not(unix))]
#[allow(clippy::permissions_set_readonly_false)]
fn grant_owner_write(path: &Path) -> Result<()> {
    let mut perms = fs::symlink_metadata(path)
        .map_err(|e| DownloadError::fs(path, e))?
        .permissions();
    perms.set_readonly(false);
    fs::set_permissions(path, perms).map_err(|e| DownloadError::fs(path, e))
}
