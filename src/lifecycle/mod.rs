//! Process lifecycle management.
//!
//! The pieces that guarantee at most one background player is alive:
//!
//! - [`probe`] - existence checks and graceful/forceful termination
//! - [`identity`] - durable pid record with ownership-safe clearing
//! - [`lock`] - host-wide mutual exclusion for lifecycle transitions
//! - [`supervisor`] - start/stop/replace orchestration

pub mod identity;
pub mod lock;
pub mod probe;
pub mod supervisor;
