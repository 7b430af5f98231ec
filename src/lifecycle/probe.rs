//! Cross-platform process existence probes and termination.
//!
//! Termination is idempotent and safe to call on an already-dead or
//! already-replaced process; callers cannot assume they are the sole
//! terminator.

use std::thread;
use std::time::{Duration, Instant};

/// Interval between liveness checks while waiting for a graceful exit.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Settling window after the forceful kill signal.
const FORCE_KILL_GRACE: Duration = Duration::from_millis(200);

/// Default budget for a cooperative shutdown before escalating.
pub const TERMINATION_TIMEOUT: Duration = Duration::from_secs(2);

/// Returns true if the process is alive and reachable.
///
/// A permission-denied probe counts as alive: assuming a live process and
/// attempting termination beats orphaning it.
#[cfg(unix)]
pub fn exists(pid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    match kill(Pid::from_raw(pid as i32), None) {
        Ok(()) => true,
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

/// Returns true if the process is alive and reachable.
#[cfg(windows)]
pub fn exists(pid: u32) -> bool {
    use std::process::Command;

    let filter = format!("PID eq {}", pid);
    match Command::new("tasklist")
        .args(["/FI", &filter, "/NH", "/FO", "CSV"])
        .output()
    {
        Ok(out) => String::from_utf8_lossy(&out.stdout).contains(&format!("\"{}\"", pid)),
        Err(_) => false,
    }
}

/// Terminates a process, cooperatively first and forcefully if needed.
///
/// Sends the cooperative signal, polls [`exists`] every 100ms up to
/// `timeout`, then escalates to an unconditional kill with one short
/// settling poll. Returns true iff the process is gone afterwards; a
/// target that was already dead counts as gone.
#[cfg(unix)]
pub fn terminate(pid: u32, graceful: bool, timeout: Duration) -> bool {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    if !exists(pid) {
        return true;
    }

    let target = Pid::from_raw(pid as i32);
    let _ = kill(target, Signal::SIGTERM);

    if graceful {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            thread::sleep(POLL_INTERVAL);
            if !exists(pid) {
                return true;
            }
        }
        let _ = kill(target, Signal::SIGKILL);
        thread::sleep(FORCE_KILL_GRACE);
    }

    !exists(pid)
}

/// Terminates a process, cooperatively first and forcefully if needed.
///
/// Windows has no SIGKILL equivalent we can deliver directly; the
/// forceful step degrades to `taskkill /F` and the result reflects the
/// final observed state.
#[cfg(windows)]
pub fn terminate(pid: u32, graceful: bool, timeout: Duration) -> bool {
    use std::process::Command;

    if !exists(pid) {
        return true;
    }

    let pid_arg = pid.to_string();
    let _ = Command::new("taskkill").args(["/PID", &pid_arg]).output();

    if graceful {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            thread::sleep(POLL_INTERVAL);
            if !exists(pid) {
                return true;
            }
        }
        let _ = Command::new("taskkill")
            .args(["/PID", &pid_arg, "/F"])
            .output();
        thread::sleep(FORCE_KILL_GRACE);
    }

    !exists(pid)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::process::{Command, Stdio};

    /// Spawns a long sleeper and reaps it from a helper thread so the
    /// pid leaves the process table as soon as it dies.
    fn spawn_sleeper() -> u32 {
        let mut child = Command::new("sleep")
            .arg("30")
            .stdout(Stdio::null())
            .spawn()
            .unwrap();
        let pid = child.id();
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        pid
    }

    #[test]
    fn live_process_exists() {
        let pid = spawn_sleeper();
        assert!(exists(pid));
        terminate(pid, true, Duration::from_secs(2));
    }

    #[test]
    fn terminate_confirms_gone() {
        let pid = spawn_sleeper();
        assert!(terminate(pid, true, Duration::from_secs(2)));
        assert!(!exists(pid));
    }

    #[test]
    fn dead_pid_does_not_exist() {
        let mut child = Command::new("true").spawn().unwrap();
        let pid = child.id();
        child.wait().unwrap();
        assert!(!exists(pid));
    }

    #[test]
    fn terminate_already_dead_is_safe() {
        let mut child = Command::new("true").spawn().unwrap();
        let pid = child.id();
        child.wait().unwrap();
        assert!(terminate(pid, true, Duration::from_millis(300)));
    }
}
