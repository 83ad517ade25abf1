//! # Content Fingerprinting Module
//!
//! Computes stable fingerprints of file contents for change detection.
//!
//! ## Overview
//!
//! Every publish decision in apiforge is driven by comparing the fingerprint of
//! freshly generated (staged) output against the fingerprint of the currently
//! published file. Fingerprints are SHA-256 digests of the file's bytes: two
//! fingerprints compare equal iff the underlying bytes were equal at read time.
//!
//! ## Unreadable Files
//!
//! A file that cannot be read (missing, permission denied, path is a directory)
//! has no stable fingerprint. Instead of erroring, [`fingerprint`] returns a
//! fresh [`Fingerprint::Unstable`] value that is unique per call, so any
//! comparison against it reports "different". This forces the conditional
//! publisher to copy rather than silently skip: an unnecessary copy is cheap,
//! a skipped necessary copy is not.
//!
//! Fingerprints are held in memory only and never persisted across restarts.

use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

// Source of process-unique values for unreadable files. Two calls never
// produce equal `Unstable` fingerprints.
static UNSTABLE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Opaque, comparable digest of a file's byte content.
///
/// Obtained via [`fingerprint`]. Equality of two `Digest` values means the
/// bytes were identical when read; an `Unstable` value never equals any other
/// fingerprint, including another `Unstable` from the same path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fingerprint {
    /// SHA-256 over the full file contents.
    Digest([u8; 32]),
    /// Unique sentinel for an unreadable file; forces a publish.
    Unstable(u64),
}

impl Fingerprint {
    /// Compute a fingerprint directly from in-memory bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Fingerprint::Digest(hasher.finalize().into())
    }

    /// Whether this fingerprint came from an unreadable file.
    pub fn is_unstable(&self) -> bool {
        matches!(self, Fingerprint::Unstable(_))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fingerprint::Digest(bytes) => {
                // First 16 hex chars are plenty for log correlation
                for b in &bytes[..8] {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Fingerprint::Unstable(n) => write!(f, "unstable-{n}"),
        }
    }
}

/// Fingerprint the file at `path`.
///
/// Never fails: a read error of any kind yields a fresh [`Fingerprint::Unstable`]
/// value so that callers treat the file as changed.
pub fn fingerprint(path: &Path) -> Fingerprint {
    match std::fs::read(path) {
        Ok(bytes) => Fingerprint::from_bytes(&bytes),
        Err(_) => Fingerprint::Unstable(UNSTABLE_COUNTER.fetch_add(1, Ordering::SeqCst)),
    }
}
