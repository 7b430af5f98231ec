//! The detached playback worker.
//!
//! Runs as `ai-bgm play --daemon <cue> <repeat>` with no supervising
//! parent. Startup order matters: rotate and attach the log before any
//! output, install the termination watcher, register this process in the
//! identity record, then play. Every exit path clears the record through
//! the ownership check, so a worker that was already superseded never
//! deletes its replacement's registration.

use std::time::Duration;

use rand::seq::SliceRandom;
use rodio::Sink;
use tracing::{debug, error, info};

use crate::config::{self, Paths};
use crate::error::{ErrorCode, PlayerError, Result};
use crate::lifecycle::identity::IdentityStore;
use crate::logging::{self, LogRotator};
use crate::playback::AudioEngine;
use crate::types::PlaybackRequest;

/// Poll interval for the "still playing" condition.
const PLAYBACK_POLL: Duration = Duration::from_millis(100);

/// Heartbeat log line every this many polls (roughly every 10s).
const HEARTBEAT_POLLS: u32 = 100;

/// Cooperative termination, unified across platforms.
///
/// Installing the watcher registers the OS handlers, so a signal that
/// lands any time afterwards is buffered until the playback loop looks.
#[cfg(unix)]
struct ShutdownSignal {
    sigterm: tokio::signal::unix::Signal,
    sigint: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignal {
    fn install() -> Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        let sigterm = signal(SignalKind::terminate())
            .map_err(|e| PlayerError::new(ErrorCode::Io, e.to_string()))?;
        let sigint = signal(SignalKind::interrupt())
            .map_err(|e| PlayerError::new(ErrorCode::Io, e.to_string()))?;
        Ok(Self { sigterm, sigint })
    }

    async fn recv(&mut self) {
        tokio::select! {
            _ = self.sigterm.recv() => {}
            _ = self.sigint.recv() => {}
        }
    }
}

/// Cooperative termination on Windows is Ctrl-C only.
#[cfg(not(unix))]
struct ShutdownSignal;

#[cfg(not(unix))]
impl ShutdownSignal {
    fn install() -> Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Runs the worker to completion.
pub async fn run(paths: &Paths, request: PlaybackRequest) -> Result<()> {
    paths.ensure_exists()?;

    let rotator = LogRotator::new(paths.log_file());
    match rotator.attach_for_append() {
        Ok(log) => logging::init_daemon(log),
        Err(e) => {
            // Degraded mode: keep playing with stderr logging.
            logging::init_cli();
            tracing::warn!("could not attach daemon log: {}", e);
        }
    }

    let mut shutdown = ShutdownSignal::install()?;

    let store = IdentityStore::new(paths.pid_file());
    let self_pid = std::process::id();
    store.write_current(self_pid)?;
    info!("BGM player daemon started (pid {})", self_pid);

    let result = play_until_done(paths, request, &mut shutdown).await;

    // A replacement may have overwritten the record while we were
    // shutting down; only remove it if it is still ours.
    store.clear_if_owned_by(self_pid);

    match &result {
        Ok(()) => info!("BGM player daemon exiting"),
        Err(e) => error!("{}", e),
    }
    result
}

/// Resolves the cue, starts playback and blocks until it completes or a
/// termination signal arrives.
async fn play_until_done(
    paths: &Paths,
    request: PlaybackRequest,
    shutdown: &mut ShutdownSignal,
) -> Result<()> {
    let selection = config::load_selection(paths);
    let library = config::load_cue_library(paths)?;
    let files = config::resolve_cue_files(&library, &selection.selected, request.cue)?;

    let Some(file) = files.choose(&mut rand::thread_rng()) else {
        info!(
            "no files configured for cue '{}' in '{}', nothing to play",
            request.cue.as_str(),
            selection.selected
        );
        return Ok(());
    };

    let asset = paths.cue_asset(&selection.selected, file);
    if !asset.exists() {
        return Err(PlayerError::asset_missing(asset.display().to_string()));
    }

    let engine = AudioEngine::open()?;
    let sink = engine.play_file(&asset, request.repeat)?;
    if request.is_infinite() {
        info!("playing {} (looping until stopped)", file);
    } else {
        info!("playing {} ({} time(s))", file, request.repeat);
    }

    wait_for_sink(sink, shutdown).await;
    Ok(())
}

/// Polls the sink at a fixed interval while watching for cooperative
/// termination.
///
/// The shutdown branch is the worker's entire cancellation callback: stop
/// the sink and return so the caller can run the ownership-checked
/// identity clear. Nothing else runs on that path.
async fn wait_for_sink(sink: Sink, shutdown: &mut ShutdownSignal) {
    let mut ticker = tokio::time::interval(PLAYBACK_POLL);
    let mut polls: u32 = 0;

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                info!("received termination signal, stopping");
                sink.stop();
                return;
            }
            _ = ticker.tick() => {
                if sink.empty() {
                    info!("playback finished");
                    return;
                }
                polls += 1;
                if polls % HEARTBEAT_POLLS == 0 {
                    debug!("still playing");
                }
            }
        }
    }
}
