//! Start/stop/replace orchestration for the background player.
//!
//! Both lifecycle paths funnel through the exclusion lock before touching
//! the identity record or signalling processes. Two concurrent start
//! requests are totally ordered by the lock: the second sees the first's
//! worker as current and replaces it.

use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::{Paths, CONFIG_DIR_ENV};
use crate::error::Result;
use crate::lifecycle::identity::IdentityStore;
use crate::lifecycle::{lock, probe};
use crate::types::{PlaybackRequest, StartOutcome, StopOutcome};

/// How long to wait for the new worker to register its pid, for
/// diagnostics only.
const REGISTRATION_GRACE: Duration = Duration::from_millis(500);

/// Polling step inside the registration grace window.
const REGISTRATION_POLL: Duration = Duration::from_millis(50);

/// Starts a new detached worker, superseding any current player.
///
/// Takes the lock, terminates and clears whoever is current, spawns the
/// worker, then waits a bounded grace period for its self-registration
/// before releasing. The caller gets the new pid when the worker
/// registered in time, but correctness never depends on observing it.
pub fn request_start(paths: &Paths, request: PlaybackRequest) -> Result<StartOutcome> {
    paths.ensure_exists()?;
    let _guard = lock::acquire(&paths.lock_file())?;
    let store = IdentityStore::new(paths.pid_file());

    let replaced = supersede_current(&store);
    spawn_worker(paths, request)?;
    let worker = wait_for_registration(&store);

    Ok(StartOutcome { replaced, worker })
}

/// Stops the current player if one is alive.
///
/// A record pointing at a dead process is removed and reported as
/// "nothing running"; that is expected steady-state, not an error.
pub fn request_stop(paths: &Paths) -> Result<StopOutcome> {
    paths.ensure_exists()?;
    let _guard = lock::acquire(&paths.lock_file())?;
    let store = IdentityStore::new(paths.pid_file());

    let Some(pid) = store.read_current() else {
        return Ok(StopOutcome::NothingRunning);
    };

    if !probe::exists(pid) {
        debug!("removing stale identity record for pid {}", pid);
        store.clear_if_owned_by(pid);
        return Ok(StopOutcome::NothingRunning);
    }

    if probe::terminate(pid, true, probe::TERMINATION_TIMEOUT) {
        store.clear_if_owned_by(pid);
        Ok(StopOutcome::Stopped(pid))
    } else {
        warn!("player pid {} survived termination", pid);
        Ok(StopOutcome::NothingRunning)
    }
}

/// Advisory liveness check used by toggle to decide intent.
///
/// Runs without the lock and performs no mutation; the delegated start or
/// stop re-validates under its own lock.
pub fn is_player_alive(paths: &Paths) -> bool {
    let store = IdentityStore::new(paths.pid_file());
    match store.read_current() {
        Some(pid) => probe::exists(pid),
        None => false,
    }
}

/// Terminates and unregisters the current player, if any.
///
/// Runs under the caller's lock. The record is cleared regardless of the
/// termination outcome: it is about to be superseded either way.
fn supersede_current(store: &IdentityStore) -> bool {
    let mut replaced = false;
    if let Some(pid) = store.read_current() {
        if probe::exists(pid) {
            probe::terminate(pid, true, probe::TERMINATION_TIMEOUT);
            replaced = true;
        }
    }
    if let Err(e) = store.clear() {
        warn!("could not clear identity record: {}", e);
    }
    replaced
}

/// Launches the detached worker process carrying the request.
///
/// The worker must survive this process's exit: it gets its own process
/// group on unix and detached-no-window creation flags on Windows, with
/// all standard streams nulled (the worker attaches its own log).
fn spawn_worker(paths: &Paths, request: PlaybackRequest) -> Result<u32> {
    let exe = std::env::current_exe()?;
    let mut cmd = Command::new(exe);
    cmd.arg("play")
        .arg("--daemon")
        .arg(request.cue.as_str())
        .arg(request.repeat.to_string())
        .env(CONFIG_DIR_ENV, &paths.config_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const DETACHED_PROCESS: u32 = 0x0000_0008;
        const CREATE_NO_WINDOW: u32 = 0x0800_0000;
        cmd.creation_flags(DETACHED_PROCESS | CREATE_NO_WINDOW);
    }

    let child = cmd.spawn()?;
    debug!("spawned worker pid {}", child.id());
    Ok(child.id())
}

/// Polls the identity record for the new worker's registration.
///
/// The record was cleared before the spawn and the lock is still held, so
/// any value that appears belongs to the worker just launched.
fn wait_for_registration(store: &IdentityStore) -> Option<u32> {
    let deadline = Instant::now() + REGISTRATION_GRACE;
    loop {
        if let Some(pid) = store.read_current() {
            return Some(pid);
        }
        if Instant::now() >= deadline {
            return None;
        }
        thread::sleep(REGISTRATION_POLL);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn temp_paths() -> (tempfile::TempDir, Paths) {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::from_dir(dir.path().to_path_buf());
        (dir, paths)
    }

    fn spawn_sleeper() -> u32 {
        let mut child = Command::new("sleep")
            .arg("30")
            .stdout(Stdio::null())
            .spawn()
            .unwrap();
        let pid = child.id();
        thread::spawn(move || {
            let _ = child.wait();
        });
        pid
    }

    #[test]
    fn stop_with_no_record_is_nothing_running() {
        let (_dir, paths) = temp_paths();
        let outcome = request_stop(&paths).unwrap();
        assert_eq!(outcome, StopOutcome::NothingRunning);
        assert!(!paths.pid_file().exists());
    }

    #[test]
    fn stop_removes_stale_record() {
        let (_dir, paths) = temp_paths();
        let mut child = Command::new("true").spawn().unwrap();
        let dead_pid = child.id();
        child.wait().unwrap();

        let store = IdentityStore::new(paths.pid_file());
        store.write_current(dead_pid).unwrap();

        let outcome = request_stop(&paths).unwrap();
        assert_eq!(outcome, StopOutcome::NothingRunning);
        assert_eq!(store.read_current(), None);
    }

    #[test]
    fn stop_terminates_registered_player() {
        let (_dir, paths) = temp_paths();
        let pid = spawn_sleeper();
        let store = IdentityStore::new(paths.pid_file());
        store.write_current(pid).unwrap();

        let outcome = request_stop(&paths).unwrap();
        assert_eq!(outcome, StopOutcome::Stopped(pid));
        assert!(!probe::exists(pid));
        assert_eq!(store.read_current(), None);
    }

    #[test]
    fn supersede_kills_current_and_clears_record() {
        let (_dir, paths) = temp_paths();
        let pid = spawn_sleeper();
        let store = IdentityStore::new(paths.pid_file());
        store.write_current(pid).unwrap();

        assert!(supersede_current(&store));
        assert!(!probe::exists(pid));
        assert_eq!(store.read_current(), None);
    }

    #[test]
    fn supersede_with_stale_record_reports_no_replacement() {
        let (_dir, paths) = temp_paths();
        let mut child = Command::new("true").spawn().unwrap();
        let dead_pid = child.id();
        child.wait().unwrap();

        let store = IdentityStore::new(paths.pid_file());
        store.write_current(dead_pid).unwrap();

        assert!(!supersede_current(&store));
        assert_eq!(store.read_current(), None);
    }

    #[test]
    fn advisory_liveness_tracks_record() {
        let (_dir, paths) = temp_paths();
        assert!(!is_player_alive(&paths));

        let pid = spawn_sleeper();
        let store = IdentityStore::new(paths.pid_file());
        store.write_current(pid).unwrap();
        assert!(is_player_alive(&paths));

        probe::terminate(pid, true, Duration::from_secs(2));
        assert!(!is_player_alive(&paths));
    }
}
