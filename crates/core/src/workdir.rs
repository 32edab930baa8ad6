//! Scoped change of the process working directory.
//!
//! The working directory is process-wide state. A guard must not be held
//! while anything else in the same process depends on the current directory,
//! and guards must not be created from several threads at once.

use std::env;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{DownloadError, Result};

/// Switches into a directory and switches back when dropped.
#[derive(Debug)]
pub struct WorkingDirGuard {
    previous: PathBuf,
}

impl WorkingDirGuard {
    pub fn enter(dir: &Path) -> Result<Self> {
        let previous = env::current_dir().map_err(|e| DownloadError::fs(".", e))?;
        env::set_current_dir(dir).map_err(|e| DownloadError::fs(dir, e))?;
        debug!(from = ?previous, to = ?dir, "Switched working directory");
        Ok(Self { previous })
    }

    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.previous) {
            warn!(dir = ?self.previous, error = %e, "Failed to restore working directory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};

    static CWD_LOCK: Mutex<()> = Mutex::new(());

    /// Serializes tests that touch the process working directory.
    fn cwd_lock() -> MutexGuard<'static, ()> {
        CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[test]
    fn restores_previous_directory_on_drop() {
        let _lock = cwd_lock();
        let dir = tempfile::tempdir().unwrap();
        let before = env::current_dir().unwrap();

        {
            let guard = WorkingDirGuard::enter(dir.path()).unwrap();
            assert_eq!(guard.previous(), before.as_path());
            assert_eq!(
                env::current_dir().unwrap().canonicalize().unwrap(),
                dir.path().canonicalize().unwrap()
            );
        }

        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn restores_previous_directory_on_early_return() {
        let _lock = cwd_lock();
        let dir = tempfile::tempdir().unwrap();
        let before = env::current_dir().unwrap();

        fn inside(dir: &Path) -> Result<()> {
            let _guard = WorkingDirGuard::enter(dir)?;
            Err(DownloadError::failed("inner step failed", ""))
        }

        assert!(inside(dir.path()).is_err());
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn missing_directory_is_a_filesystem_error() {
        let _lock = cwd_lock();
        let before = env::current_dir().unwrap();
        let err = WorkingDirGuard::enter(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, DownloadError::Filesystem { .. }));
        assert_eq!(env::current_dir().unwrap(), before);
    }
}
