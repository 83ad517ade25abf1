//! # Watch Loop Module
//!
//! Continuous regeneration driven by filesystem change notifications.
//!
//! ## Overview
//!
//! A watch session subscribes to recursive change events under the configured
//! source tree and drives the generation pipeline from a single loop thread.
//! Three properties keep the loop safe:
//!
//! - **Self-trigger isolation** — every known output path (staged and
//!   published spec/routes/client files, extra spec copies, the whole staging
//!   directory) is excluded from the qualifying event set, recomputed from
//!   current configuration at watch start. The orchestrator's own writes can
//!   never wake it up again, which is the invariant preventing an infinite
//!   regenerate-detect-regenerate cycle.
//! - **Coalescing** — events funnel through a channel drained by one loop
//!   thread. A run starts only after a quiescence window with no further
//!   qualifying events (so a half-written source file is never read), and
//!   events arriving while a run is in flight collapse into exactly one
//!   follow-up run once it settles. Runs are discrete, ordered, and never
//!   parallel.
//! - **Failure recovery** — the loop is an explicit state machine
//!   (`Idle → Running → (Success | Failed) → Idle`). A failed run is logged
//!   as a warning and re-armed with an immediate retry after the settle
//!   window; nothing ever escalates to crash the watch thread or the host
//!   process. Recursion is never used, so sustained failures cannot grow the
//!   stack.

use crate::config::resolve;
use crate::pipeline::{GenerationPipeline, RunOutcome};
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

enum WatchMessage {
    Changed(Vec<PathBuf>),
    Shutdown,
}

/// Handle for an active watch session.
///
/// Owns the filesystem subscription and the loop thread. Dropping the handle
/// (or calling [`WatchHandle::stop`]) cancels the subscription and joins the
/// thread; [`WatchHandle::wait`] blocks for as long as the session runs,
/// which for a development server is until process exit.
pub struct WatchHandle {
    tx: Sender<WatchMessage>,
    watcher: Option<RecommendedWatcher>,
    thread: Option<JoinHandle<()>>,
}

impl WatchHandle {
    /// Stop watching: cancel the subscription and join the loop thread.
    pub fn stop(mut self) {
        self.shutdown();
    }

    /// Block until the watch loop exits.
    pub fn wait(mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    fn shutdown(&mut self) {
        // Drop the subscription first so no further events race the shutdown
        // message.
        self.watcher.take();
        let _ = self.tx.send(WatchMessage::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Start watching the configured source tree and rerunning `pipeline` on
/// qualifying changes.
///
/// `retry_pending` seeds the failure-recovery state from the caller's initial
/// run, so a failed startup generation is retried without waiting for an
/// edit.
///
/// # Errors
///
/// Returns an error only when the subscription itself cannot be established
/// (missing watch root that cannot be created, platform watcher failure).
/// Run failures after that point are recovered, never propagated.
pub fn start(mut pipeline: GenerationPipeline, retry_pending: bool) -> anyhow::Result<WatchHandle> {
    let config = pipeline.config();
    let project_root = pipeline.project_root().to_path_buf();
    let watch_root = resolve(&project_root, &config.watch_dir);
    let settle = Duration::from_millis(config.settle_ms);
    // Recomputed from current configuration at every watch start; output
    // paths are configuration-derived and must never be hard-coded.
    let exclusions = config.output_paths(&project_root);

    std::fs::create_dir_all(&watch_root)?;

    let (tx, rx) = mpsc::channel::<WatchMessage>();
    let event_tx = tx.clone();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                if matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    // Loop thread may already be gone during shutdown.
                    let _ = event_tx.send(WatchMessage::Changed(event.paths));
                }
            }
            Err(e) => warn!(error = %e, "filesystem watch error"),
        },
        NotifyConfig::default(),
    )?;
    watcher.watch(&watch_root, RecursiveMode::Recursive)?;
    info!(root = %watch_root.display(), "watching for source changes");

    let thread = std::thread::spawn(move || {
        watch_loop(&mut pipeline, &rx, &project_root, &exclusions, settle, retry_pending);
    });

    Ok(WatchHandle {
        tx,
        watcher: Some(watcher),
        thread: Some(thread),
    })
}

/// Explicit Idle → Running → (Success | Failed) → Idle loop. `pending` marks a
/// qualifying change awaiting quiescence; `retry` marks a failed run awaiting
/// its scheduled retry.
fn watch_loop(
    pipeline: &mut GenerationPipeline,
    rx: &mpsc::Receiver<WatchMessage>,
    project_root: &Path,
    exclusions: &HashSet<PathBuf>,
    settle: Duration,
    mut retry: bool,
) {
    let mut pending = false;
    loop {
        let message = if pending || retry {
            match rx.recv_timeout(settle) {
                Ok(message) => Some(message),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match rx.recv() {
                Ok(message) => Some(message),
                Err(_) => break,
            }
        };

        match message {
            Some(WatchMessage::Changed(paths)) => {
                if paths
                    .iter()
                    .any(|p| is_qualifying(p, project_root, exclusions))
                {
                    // Re-enter the settle window; the timeout above restarts
                    // on the next iteration, deferring the run until writes
                    // have quiesced.
                    pending = true;
                }
            }
            Some(WatchMessage::Shutdown) => break,
            None => {
                // Quiescent: run once. Events arriving while this run is in
                // flight queue in the channel and coalesce into a single
                // follow-up run.
                pending = false;
                retry = false;
                let run = pipeline.run();
                run.log();
                if matches!(run.outcome, RunOutcome::Failed | RunOutcome::PartialFailure) {
                    warn!("generation run failed, retry scheduled");
                    retry = true;
                }
            }
        }
    }
    debug!("watch loop stopped");
}

/// Whether a change event at `path` should trigger regeneration.
///
/// Hidden path components (below the project root) and every known output
/// path are excluded, so the orchestrator never reacts to its own writes.
fn is_qualifying(path: &Path, project_root: &Path, exclusions: &HashSet<PathBuf>) -> bool {
    if exclusions.iter().any(|e| path.starts_with(e)) {
        return false;
    }
    // The publisher's rename-in-place temporaries are orchestrator writes too
    if path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.ends_with(".apiforge.tmp"))
        .unwrap_or(false)
    {
        return false;
    }
    let relative = path.strip_prefix(project_root).unwrap_or(path);
    let hidden = relative.components().any(|c| {
        c.as_os_str()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
    });
    !hidden
}
