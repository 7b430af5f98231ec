//! ai-bgm: background music driven by AI coding tool hooks.
//!
//! Hook callbacks invoke the CLI repeatedly to start, restart or stop a
//! single looping sound process. The crate's core is the process
//! lifecycle machinery guaranteeing at most one background player at a
//! time; audio itself is a thin call into the decoder/mixer.
//!
//! # Modules
//!
//! - [`config`] - filesystem paths, cue library, selection state
//! - [`lifecycle`] - probe/identity/lock/supervisor lifecycle core
//! - [`logging`] - bounded log rotation and stream attachment
//! - [`playback`] - thin rodio playback engine
//! - [`daemon`] - the detached worker process
//! - [`integrations`] - hook installation for supported AI tools
//! - [`error`] - error types and result alias
//! - [`types`] - cue kinds, requests and lifecycle outcomes
//!
//! # Example
//!
//! ```rust,ignore
//! use ai_bgm::config::Paths;
//! use ai_bgm::lifecycle::supervisor;
//! use ai_bgm::types::{CueKind, PlaybackRequest};
//!
//! let paths = Paths::resolve();
//!
//! // Replace whatever is playing with a looping work cue.
//! supervisor::request_start(&paths, PlaybackRequest::new(CueKind::Work, 0))?;
//!
//! // Later: stop it again.
//! let outcome = supervisor::request_stop(&paths)?;
//! println!("stopped: {}", outcome.was_stopped());
//! ```

pub mod config;
pub mod daemon;
pub mod error;
pub mod integrations;
pub mod lifecycle;
pub mod logging;
pub mod playback;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use config::Paths;
pub use error::{ErrorCode, PlayerError, Result};
pub use types::{CueKind, PlaybackRequest, StartOutcome, StopOutcome};
