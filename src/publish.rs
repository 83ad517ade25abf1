//! # Conditional Publishing Module
//!
//! The single idempotency primitive used for every artifact kind.
//!
//! ## Overview
//!
//! [`publish`] copies a staged (freshly generated) file to its public
//! destination only when the contents actually differ. When the bytes are
//! identical it performs zero filesystem mutation: the destination's
//! modification time is untouched and downstream watchers (the host's own
//! file watcher, bundlers, version control tooling) see nothing.
//!
//! ## Atomicity
//!
//! When a write is needed, staged bytes are first copied to a temporary
//! sibling of the destination and then renamed into place, so external
//! observers never read a partially written destination file.

use crate::fingerprint::fingerprint;
use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Result of a conditional publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Destination differed (or was unreadable) and was overwritten.
    Written,
    /// Destination already held identical bytes; nothing was touched.
    Unchanged,
}

/// Copy `staged` to `dest` only if their contents differ.
///
/// Safe to call redundantly: an unchanged destination is never rewritten and
/// never gets a fresh mtime. A missing or unreadable file on either side
/// fingerprints as unique (see [`crate::fingerprint`]), which forces the copy.
///
/// # Errors
///
/// Returns an error when the destination's parent directory cannot be
/// created or the copy/rename itself fails (disk full, permissions). Callers
/// treat that as a failure of the artifact being published, not a process
/// fatal.
pub fn publish(staged: &Path, dest: &Path) -> anyhow::Result<PublishOutcome> {
    let staged_fp = fingerprint(staged);
    let dest_fp = fingerprint(dest);

    if staged_fp == dest_fp {
        debug!(
            dest = %dest.display(),
            fingerprint = %dest_fp,
            "artifact unchanged, skipping publish"
        );
        return Ok(PublishOutcome::Unchanged);
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {}", parent.display()))?;
    }

    // Copy to a temporary sibling first so the destination is replaced in a
    // single rename and never observed half-written. Runs are serialized per
    // orchestrator instance, so the temp name cannot collide with itself.
    let tmp = dest.with_extension("apiforge.tmp");
    fs::copy(staged, &tmp).with_context(|| {
        format!(
            "failed to stage copy {} -> {}",
            staged.display(),
            tmp.display()
        )
    })?;
    fs::rename(&tmp, dest)
        .with_context(|| format!("failed to move artifact into place at {}", dest.display()))?;

    debug!(
        staged = %staged.display(),
        dest = %dest.display(),
        fingerprint = %staged_fp,
        "artifact published"
    );
    Ok(PublishOutcome::Written)
}
