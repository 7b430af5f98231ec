//! Host-wide mutual exclusion for lifecycle transitions.
//!
//! An advisory exclusive lock on a dedicated file serializes every
//! "replace the current player" operation across independent processes.
//! The file is only a lock handle; its content is never read.

use std::fs::{File, OpenOptions};
use std::path::Path;

use fs2::FileExt;

use crate::error::{PlayerError, Result};

/// Exclusive ownership of the lifecycle lock.
///
/// Held for the duration of one start/stop transition and released on
/// drop, which covers normal returns, error unwinding and process death
/// (the OS drops advisory locks with the descriptor).
#[derive(Debug)]
pub struct LockGuard {
    file: File,
}

/// Blocks until exclusive host-wide ownership is obtained.
///
/// There is deliberately no timeout: lifecycle transitions are bounded by
/// the termination timeout, so a stuck holder is a bug rather than an
/// expected condition.
pub fn acquire(path: &Path) -> Result<LockGuard> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| PlayerError::io(e, parent.display().to_string()))?;
    }

    // Open without truncating so an existing holder's descriptor state is
    // untouched while we wait.
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| PlayerError::io(e, path.display().to_string()))?;

    file.lock_exclusive()
        .map_err(|e| PlayerError::io(e, path.display().to_string()))?;

    Ok(LockGuard { file })
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_excludes_second_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bgm_player.lock");

        let guard = acquire(&path).unwrap();

        let probe = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .unwrap();
        assert!(probe.try_lock_exclusive().is_err());

        drop(guard);
        assert!(probe.try_lock_exclusive().is_ok());
        probe.unlock().unwrap();
    }

    #[test]
    fn reacquire_after_release() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bgm_player.lock");

        drop(acquire(&path).unwrap());
        drop(acquire(&path).unwrap());
    }
}
