//! Durable record of the current background player's pid.
//!
//! At most one record file exists per user. Its content is either a live
//! pid or a stale one pointing at a terminated process; staleness is
//! expected steady-state and never treated as corruption.

use std::fs;
use std::path::PathBuf;

use crate::error::{PlayerError, Result};

/// Reads and mutates the identity record at a fixed path.
#[derive(Debug, Clone)]
pub struct IdentityStore {
    path: PathBuf,
}

impl IdentityStore {
    /// Creates a store over the given record path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns the recorded pid, or None when the record is missing or
    /// unparseable. A corrupt record means "no current owner", never an
    /// error.
    pub fn read_current(&self) -> Option<u32> {
        let text = fs::read_to_string(&self.path).ok()?;
        text.trim().parse().ok()
    }

    /// Atomically replaces the record with `pid`.
    ///
    /// Write-temp-then-rename, so a concurrent reader never observes a
    /// half-written value.
    pub fn write_current(&self, pid: u32) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| PlayerError::io(e, parent.display().to_string()))?;
        }
        let tmp = self.path.with_extension("pid.tmp");
        fs::write(&tmp, pid.to_string())
            .map_err(|e| PlayerError::io(e, tmp.display().to_string()))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| PlayerError::io(e, self.path.display().to_string()))
    }

    /// Unconditionally removes the record.
    ///
    /// Only valid inside a lock-protected "I am replacing whoever is
    /// current" transition.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PlayerError::io(e, self.path.display().to_string())),
        }
    }

    /// Removes the record only if it still names `pid`.
    ///
    /// Returns false without touching the file otherwise, so a worker
    /// shutting down late cannot delete the record of the player that
    /// already replaced it.
    pub fn clear_if_owned_by(&self, pid: u32) -> bool {
        if self.read_current() != Some(pid) {
            return false;
        }
        fs::remove_file(&self.path).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, IdentityStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = IdentityStore::new(dir.path().join("bgm_player.pid"));
        (dir, store)
    }

    #[test]
    fn round_trip() {
        let (_dir, store) = temp_store();
        store.write_current(4242).unwrap();
        assert_eq!(store.read_current(), Some(4242));
    }

    #[test]
    fn missing_record_is_none() {
        let (_dir, store) = temp_store();
        assert_eq!(store.read_current(), None);
    }

    #[test]
    fn garbage_record_is_none() {
        let (dir, store) = temp_store();
        std::fs::write(dir.path().join("bgm_player.pid"), "not a pid\n").unwrap();
        assert_eq!(store.read_current(), None);
    }

    #[test]
    fn write_leaves_no_temp_file() {
        let (dir, store) = temp_store();
        store.write_current(7).unwrap();
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("bgm_player.pid")]);
    }

    #[test]
    fn clear_if_owned_by_refuses_foreign_pid() {
        let (_dir, store) = temp_store();
        store.write_current(100).unwrap();
        assert!(!store.clear_if_owned_by(200));
        // The newer owner's record survives a late shutdown of the old one.
        assert_eq!(store.read_current(), Some(100));
    }

    #[test]
    fn clear_if_owned_by_removes_own_record() {
        let (_dir, store) = temp_store();
        store.write_current(100).unwrap();
        assert!(store.clear_if_owned_by(100));
        assert_eq!(store.read_current(), None);
    }

    #[test]
    fn clear_is_idempotent() {
        let (_dir, store) = temp_store();
        store.write_current(5).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.read_current(), None);
    }
}
