//! # Orchestrator Module
//!
//! The two public entry points: one-shot generation for packaging-time
//! callers and continuous generate-and-watch for development servers.
//!
//! ## Error Asymmetry
//!
//! [`Orchestrator::generate`] propagates configuration errors (missing
//! `spec`/`routes` blocks) so automated builds fail loudly, but captures
//! generator-internal failures inside the returned [`GenerationRun`] — a
//! transient failure is not a build-script bug. [`Orchestrator::generate_and_watch`]
//! surfaces only setup errors; after the subscription is live, every failure
//! becomes a retry-scheduled warning and nothing crashes the host.

use crate::config::Config;
use crate::generators::Generators;
use crate::pipeline::{GenerationPipeline, GenerationRun, RunOutcome};
use crate::watch::{self, WatchHandle};
use anyhow::Context;
use std::path::Path;

/// One orchestrator instance: a configuration bound to a project root and a
/// set of generators. Holds the only mutable cross-run state (the remembered
/// spec fingerprint) inside its pipeline.
pub struct Orchestrator {
    pipeline: GenerationPipeline,
}

impl Orchestrator {
    /// Bind configuration and generators to a project root.
    ///
    /// The root is canonicalized so watch-event paths compare cleanly against
    /// configuration-derived output paths.
    ///
    /// # Errors
    ///
    /// Fails when the project root does not exist.
    pub fn new(project_root: &Path, config: Config, generators: Generators) -> anyhow::Result<Self> {
        let project_root = project_root.canonicalize().with_context(|| {
            format!("project root {} does not exist", project_root.display())
        })?;
        Ok(Self {
            pipeline: GenerationPipeline::new(config, project_root, generators),
        })
    }

    /// One-shot generation, used at packaging time.
    ///
    /// # Errors
    ///
    /// Fails synchronously when required configuration (`spec`/`routes`) is
    /// absent. Generator failures do NOT error: they are recorded in the
    /// returned run as `Failed` outcomes and logged.
    pub fn generate(&mut self) -> anyhow::Result<GenerationRun> {
        self.pipeline.config().validate()?;
        let run = self.pipeline.run();
        run.log();
        Ok(run)
    }

    /// Run once, then watch the source tree and regenerate continuously.
    ///
    /// A failed initial run does not error; it primes the watch loop's retry
    /// state so generation self-heals as soon as the sources allow.
    ///
    /// # Errors
    ///
    /// Fails on missing required configuration or when the filesystem
    /// subscription cannot be established. Never fails on generator errors.
    pub fn generate_and_watch(mut self) -> anyhow::Result<WatchHandle> {
        self.pipeline.config().validate()?;
        let first = self.pipeline.run();
        first.log();
        let retry_pending = matches!(
            first.outcome,
            RunOutcome::Failed | RunOutcome::PartialFailure
        );
        watch::start(self.pipeline, retry_pending)
    }
}
