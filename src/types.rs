//! Core domain types for cue playback requests and lifecycle outcomes.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Semantic trigger category for a sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CueKind {
    /// Looping music while the tool is working on a prompt.
    Work,
    /// Completion jingle when the tool finishes.
    Done,
    /// Attention sound for permission prompts and similar interruptions.
    Notification,
}

impl CueKind {
    /// Returns the cue name as it appears in the cue library and on the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            CueKind::Work => "work",
            CueKind::Done => "done",
            CueKind::Notification => "notification",
        }
    }
}

/// A single playback request handed from the CLI to the worker.
///
/// `repeat == 0` means loop forever; any other value is an exact play count.
/// Requests are transient and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackRequest {
    /// Which cue to play.
    pub cue: CueKind,
    /// Number of times to play; 0 loops until stopped.
    pub repeat: u32,
}

impl PlaybackRequest {
    /// Creates a request for the given cue and repeat count.
    pub fn new(cue: CueKind, repeat: u32) -> Self {
        Self { cue, repeat }
    }

    /// Returns true if the request loops until explicitly stopped.
    pub fn is_infinite(&self) -> bool {
        self.repeat == 0
    }
}

/// Result of a start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartOutcome {
    /// True if a previously running player was terminated first.
    pub replaced: bool,
    /// The new worker's pid, if it registered within the grace window.
    /// Diagnostic only; correctness never depends on observing it.
    pub worker: Option<u32>,
}

/// Result of a stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// A live player was terminated.
    Stopped(u32),
    /// No live player was registered (a stale record may have been removed).
    NothingRunning,
}

impl StopOutcome {
    /// Returns true if a process was actually stopped.
    pub fn was_stopped(&self) -> bool {
        matches!(self, StopOutcome::Stopped(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_repeat_is_infinite() {
        assert!(PlaybackRequest::new(CueKind::Work, 0).is_infinite());
        assert!(!PlaybackRequest::new(CueKind::Work, 1).is_infinite());
    }

    #[test]
    fn cue_names_match_cli_surface() {
        assert_eq!(CueKind::Work.as_str(), "work");
        assert_eq!(CueKind::Done.as_str(), "done");
        assert_eq!(CueKind::Notification.as_str(), "notification");
    }
}
