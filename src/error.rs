//! Error types for the background music player.
//!
//! Covers cue resolution, asset lookup, audio backend startup and the
//! file plumbing shared by the lifecycle components.

use std::fmt;

/// Error codes matching the process exit-code contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Named sound-set not present in the cue library.
    SelectionNotFound,
    /// Cue type has no entry in the selected sound-set.
    CueNotConfigured,
    /// A configured sound file does not exist on disk.
    AssetMissing,
    /// Audio output device could not be opened.
    AudioInit,
    /// Sound file could not be decoded or queued for playback.
    AudioDecode,
    /// Filesystem failure in the identity, lock or config plumbing.
    Io,
}

impl ErrorCode {
    /// Returns the string code used in log lines and error output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::SelectionNotFound => "SELECTION_NOT_FOUND",
            ErrorCode::CueNotConfigured => "CUE_NOT_CONFIGURED",
            ErrorCode::AssetMissing => "ASSET_MISSING",
            ErrorCode::AudioInit => "AUDIO_INIT",
            ErrorCode::AudioDecode => "AUDIO_DECODE",
            ErrorCode::Io => "IO",
        }
    }

    /// Returns the process exit code for this error category.
    ///
    /// Success paths (including "nothing to stop" and "cue list empty")
    /// exit 0 and never construct an error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCode::SelectionNotFound => 10,
            ErrorCode::CueNotConfigured => 11,
            ErrorCode::AssetMissing => 12,
            ErrorCode::AudioInit => 13,
            ErrorCode::AudioDecode => 14,
            ErrorCode::Io => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for player operations.
#[derive(Debug)]
pub struct PlayerError {
    /// The error code category.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional context (file path, selection name, etc.).
    pub context: Option<String>,
}

impl PlayerError {
    /// Creates a new PlayerError with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Creates a new PlayerError with additional context.
    pub fn with_context(
        code: ErrorCode,
        message: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Sound-set not found in the cue library.
    pub fn selection_not_found(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::with_context(
            ErrorCode::SelectionNotFound,
            format!("configuration '{}' not found in the cue library", name),
            name,
        )
    }

    /// Cue type missing from the selected sound-set.
    pub fn cue_not_configured(cue: impl Into<String>, selection: impl Into<String>) -> Self {
        let cue = cue.into();
        let selection = selection.into();
        Self::with_context(
            ErrorCode::CueNotConfigured,
            format!("cue '{}' not found in configuration '{}'", cue, selection),
            selection,
        )
    }

    /// Configured sound file missing on disk.
    pub fn asset_missing(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::with_context(
            ErrorCode::AssetMissing,
            format!("sound file not found: {}", path),
            path,
        )
    }

    /// Audio output device could not be opened.
    pub fn audio_init(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::AudioInit, reason)
    }

    /// Decode or playback setup failed.
    pub fn audio_decode(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::AudioDecode, reason)
    }

    /// Filesystem failure with the offending path as context.
    pub fn io(err: std::io::Error, path: impl Into<String>) -> Self {
        Self::with_context(ErrorCode::Io, err.to_string(), path)
    }
}

impl fmt::Display for PlayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, " (context: {})", ctx)?;
        }
        Ok(())
    }
}

impl std::error::Error for PlayerError {}

impl From<std::io::Error> for PlayerError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorCode::Io, err.to_string())
    }
}

/// Result type alias using PlayerError.
pub type Result<T> = std::result::Result<T, PlayerError>;
