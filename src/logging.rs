//! Daemon log management: bounded rotation and stream attachment.
//!
//! The worker runs detached with no supervising parent, so its log is
//! kept bounded by a size-triggered keep-tail rewrite performed once per
//! daemon start. Rotation failure is never fatal; a player that stops
//! logging is better than one that stops playing.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Line count that triggers a rotation.
pub const DEFAULT_MAX_LINES: usize = 1000;

/// Most recent lines preserved by a rotation.
pub const DEFAULT_KEEP_LINES: usize = 500;

/// Size-triggered keep-tail rewriter for the daemon log.
#[derive(Debug, Clone)]
pub struct LogRotator {
    log_file: PathBuf,
    max_lines: usize,
    keep_lines: usize,
}

impl LogRotator {
    /// Creates a rotator with the default line budget.
    pub fn new(log_file: PathBuf) -> Self {
        Self::with_limits(log_file, DEFAULT_MAX_LINES, DEFAULT_KEEP_LINES)
    }

    /// Creates a rotator with an explicit line budget.
    pub fn with_limits(log_file: PathBuf, max_lines: usize, keep_lines: usize) -> Self {
        Self {
            log_file,
            max_lines,
            keep_lines,
        }
    }

    /// Rewrites the log to its most recent tail when it grew past the
    /// budget.
    ///
    /// No-op for a missing file or one within budget. The rewrite keeps
    /// the last `keep_lines` lines behind a one-line rotation marker and
    /// replaces the file atomically. Failure is reported on stderr and
    /// swallowed.
    pub fn rotate_if_needed(&self) {
        if !self.log_file.exists() {
            return;
        }
        if let Err(e) = self.rotate() {
            eprintln!(
                "Warning: failed to rotate log file {}: {}",
                self.log_file.display(),
                e
            );
        }
    }

    fn rotate(&self) -> std::io::Result<()> {
        let data = std::fs::read(&self.log_file)?;
        let lines: Vec<&[u8]> = data.split_inclusive(|&b| b == b'\n').collect();
        if lines.len() <= self.max_lines {
            return Ok(());
        }

        let kept = &lines[lines.len().saturating_sub(self.keep_lines)..];
        let tmp = self.log_file.with_extension("log.tmp");
        let mut out = File::create(&tmp)?;
        writeln!(out, "[log rotated: kept last {} lines]", kept.len())?;
        for line in kept {
            out.write_all(line)?;
        }
        if !data.ends_with(b"\n") {
            out.write_all(b"\n")?;
        }
        std::fs::rename(&tmp, &self.log_file)
    }

    /// Rotates, then opens the log for append and redirects the process's
    /// standard streams into it.
    ///
    /// Called once at daemon startup before any other output. On unix the
    /// underlying fd is duplicated over stdout and stderr so panics and
    /// stray prints from the detached worker land in the log too; the
    /// returned handle is the tracing subscriber's writer on every
    /// platform.
    pub fn attach_for_append(&self) -> std::io::Result<File> {
        self.rotate_if_needed();

        if let Some(parent) = self.log_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)?;

        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;
            let fd = file.as_raw_fd();
            unsafe {
                libc::dup2(fd, libc::STDOUT_FILENO);
                libc::dup2(fd, libc::STDERR_FILENO);
            }
        }

        Ok(file)
    }
}

/// Initializes stderr logging for the short-lived CLI invocations.
pub fn init_cli() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initializes timestamped, plain-text logging into the attached daemon
/// log.
pub fn init_daemon(log: File) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Arc::new(log))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_lines(path: &std::path::Path, count: usize) {
        let mut text = String::new();
        for i in 1..=count {
            text.push_str(&format!("line-{:04}\n", i));
        }
        std::fs::write(path, text).unwrap();
    }

    #[test]
    fn within_budget_is_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bgm_player.log");
        write_lines(&path, 1000);
        let before = std::fs::read_to_string(&path).unwrap();

        LogRotator::with_limits(path.clone(), 1000, 500).rotate_if_needed();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn missing_file_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bgm_player.log");
        LogRotator::new(path.clone()).rotate_if_needed();
        assert!(!path.exists());
    }

    #[test]
    fn oversized_log_keeps_recent_tail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bgm_player.log");
        write_lines(&path, 1500);

        LogRotator::with_limits(path.clone(), 1000, 500).rotate_if_needed();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines.len() <= 501);
        assert_eq!(lines[0], "[log rotated: kept last 500 lines]");
        // The most recent 500 pre-rotation lines survive verbatim.
        for (i, line) in lines[1..].iter().enumerate() {
            assert_eq!(*line, format!("line-{:04}", 1001 + i));
        }
        assert_eq!(*lines.last().unwrap(), "line-1500");
    }

    #[test]
    fn rotation_replaces_rather_than_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bgm_player.log");
        write_lines(&path, 1200);

        let rotator = LogRotator::with_limits(path.clone(), 1000, 500);
        rotator.rotate_if_needed();
        rotator.rotate_if_needed();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.lines().count() <= 501);
        assert!(!path.with_extension("log.tmp").exists());
    }
}
