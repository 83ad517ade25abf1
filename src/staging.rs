//! # Staging Area Module
//!
//! An isolated scratch directory where generators materialize raw output.
//!
//! ## Overview
//!
//! External generators write whatever and whenever they like. If they wrote
//! straight to the public output paths, the host's own file watcher would
//! observe transient and partial states, and every speculative generator run
//! would churn mtimes even when nothing changed. The staging area gives each
//! orchestrator instance a private, hidden directory (`.apiforge/` under the
//! project root) that mirrors the configured output layout; the conditional
//! publisher is the only thing that ever moves bytes from staging to public.
//!
//! The staging area is private to one orchestrator instance and is never read
//! by two concurrent runs, because runs are serialized.

use std::path::{Path, PathBuf};

/// Name of the hidden per-project staging directory.
pub const STAGING_DIR_NAME: &str = ".apiforge";

/// Logical kind of a derived artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// The interface-description document (primary artifact).
    Spec,
    /// Generated routing glue code.
    Routes,
    /// Generated client library.
    Client,
}

impl ArtifactKind {
    /// Stable lowercase name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Spec => "spec",
            ArtifactKind::Routes => "routes",
            ArtifactKind::Client => "client",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one derived artifact: its kind plus where the generator stages
/// it and where it is published.
///
/// Derived once per run from configuration; configuration is not hot-reloaded
/// mid-run.
#[derive(Debug, Clone)]
pub struct ArtifactSpec {
    pub kind: ArtifactKind,
    /// Path the generator writes to, inside the staging area.
    pub staged: PathBuf,
    /// Public destination the artifact is conditionally published to.
    pub dest: PathBuf,
}

/// Hidden scratch directory mirroring the configured output paths.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    /// Create a staging area rooted at `<project_root>/.apiforge`.
    ///
    /// Directories are created lazily by [`StagingArea::staged_path`] callers
    /// via [`StagingArea::ensure_parent`]; construction never touches disk.
    pub fn new(project_root: &Path) -> Self {
        Self {
            root: project_root.join(STAGING_DIR_NAME),
        }
    }

    /// Root of the staging directory. Watch loops exclude everything under it.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Mirror a destination path (relative to the project root) inside the
    /// staging area. Absolute destinations are flattened to their file name
    /// since they have no project-relative shape to mirror.
    pub fn staged_path(&self, dest_rel: &Path) -> PathBuf {
        if dest_rel.is_absolute() {
            match dest_rel.file_name() {
                Some(name) => self.root.join(name),
                None => self.root.clone(),
            }
        } else {
            self.root.join(dest_rel)
        }
    }

    /// Ensure the parent directory of a staged path exists so generators can
    /// write without caring about layout.
    pub fn ensure_parent(&self, staged: &Path) -> anyhow::Result<()> {
        if let Some(parent) = staged.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}
