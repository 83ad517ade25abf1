//! # Generation Pipeline Module
//!
//! Orchestrates the three generation stages in dependency order.
//!
//! ## Overview
//!
//! One [`GenerationPipeline::run`] call is one end-to-end regeneration:
//!
//! 1. The spec generator writes the interface-description document into the
//!    staging area. A generator failure ends the run early and clears the
//!    remembered spec fingerprint so the next attempt cannot short-circuit.
//! 2. The staged spec is fingerprinted. If it matches the fingerprint
//!    remembered from the previous run, the run ends with outcome
//!    [`RunOutcome::Unchanged`]: no publish, no downstream generation. This is
//!    the short-circuit that keeps speculative or byte-identical regenerations
//!    free.
//! 3. Otherwise the spec is conditionally published, then the route and
//!    client generators run concurrently against the published spec. Each
//!    stage's failure is caught and logged independently; one stage failing
//!    never cancels the other. Both are awaited before the run completes.
//! 4. The published spec is conditionally copied to any extra configured
//!    destinations.
//!
//! The remembered fingerprint is a field of the pipeline instance, never
//! process-global, so multiple orchestrators (e.g. in tests) cannot interfere.

use crate::config::{resolve, Config};
use crate::fingerprint::{fingerprint, Fingerprint};
use crate::generators::Generators;
use crate::publish::{publish, PublishOutcome};
use crate::staging::{ArtifactKind, ArtifactSpec, StagingArea};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Per-artifact result within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactOutcome {
    Written,
    Unchanged,
    Failed,
}

impl From<PublishOutcome> for ArtifactOutcome {
    fn from(outcome: PublishOutcome) -> Self {
        match outcome {
            PublishOutcome::Written => ArtifactOutcome::Written,
            PublishOutcome::Unchanged => ArtifactOutcome::Unchanged,
        }
    }
}

/// Overall result of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Spec changed and every attempted downstream stage succeeded.
    Success,
    /// Staged spec was byte-identical to the previous run; downstream skipped.
    Unchanged,
    /// Spec published but at least one downstream stage failed.
    PartialFailure,
    /// Spec generation or spec publishing failed; downstream skipped.
    Failed,
}

/// Record of one end-to-end pipeline execution, used only for logging and
/// assertions. Owns no resources; discarded after the caller inspects it.
#[derive(Debug, Clone)]
pub struct GenerationRun {
    pub artifacts: Vec<(ArtifactKind, ArtifactOutcome)>,
    pub outcome: RunOutcome,
}

impl GenerationRun {
    /// Outcome recorded for one artifact kind, if that stage was attempted.
    pub fn outcome_for(&self, kind: ArtifactKind) -> Option<ArtifactOutcome> {
        self.artifacts
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, o)| *o)
    }

    /// Emit the per-artifact summary at info level.
    pub fn log(&self) {
        for (kind, outcome) in &self.artifacts {
            info!(artifact = %kind, outcome = ?outcome, "generation stage finished");
        }
        info!(outcome = ?self.outcome, "generation run complete");
    }
}

/// Drives spec, routes, and client generation with conditional publishing.
pub struct GenerationPipeline {
    config: Config,
    project_root: PathBuf,
    staging: StagingArea,
    generators: Generators,
    /// Fingerprint of the staged spec from the last successful generation.
    /// Cleared on spec failure so the next run always regenerates downstream.
    last_spec_fingerprint: Option<Fingerprint>,
}

impl GenerationPipeline {
    pub fn new(config: Config, project_root: PathBuf, generators: Generators) -> Self {
        let staging = StagingArea::new(&project_root);
        Self {
            config,
            project_root,
            staging,
            generators,
            last_spec_fingerprint: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Execute one generation run.
    ///
    /// Never panics and never returns an error: generator and I/O failures
    /// are captured as [`ArtifactOutcome::Failed`] entries. Callers that need
    /// configuration errors surfaced (the one-shot entry point) validate the
    /// configuration before invoking this.
    pub fn run(&mut self) -> GenerationRun {
        // Deep-copy per run: generators that mutate their view of the
        // configuration cannot corrupt the next run's inputs.
        let config = self.config.clone();

        let (Some(spec_cfg), Some(routes_cfg)) = (config.spec.as_ref(), config.routes.as_ref())
        else {
            warn!("generation run invoked without required spec/routes configuration");
            return GenerationRun {
                artifacts: vec![(ArtifactKind::Spec, ArtifactOutcome::Failed)],
                outcome: RunOutcome::Failed,
            };
        };

        let spec_artifact = self.artifact(ArtifactKind::Spec, &spec_cfg.dest_rel());

        // Stage 1: spec generation into the staging area.
        let generated = self
            .staging
            .ensure_parent(&spec_artifact.staged)
            .and_then(|()| self.generators.spec.generate(&spec_artifact.staged));
        if let Err(e) = generated {
            self.last_spec_fingerprint = None;
            warn!(error = %e, "spec generation failed, skipping downstream stages");
            return GenerationRun {
                artifacts: vec![(ArtifactKind::Spec, ArtifactOutcome::Failed)],
                outcome: RunOutcome::Failed,
            };
        }

        // Stage 2: short-circuit on byte-identical staged output.
        let staged_fp = fingerprint(&spec_artifact.staged);
        if self.last_spec_fingerprint.as_ref() == Some(&staged_fp) {
            debug!(fingerprint = %staged_fp, "staged spec unchanged, short-circuiting run");
            return GenerationRun {
                artifacts: vec![(ArtifactKind::Spec, ArtifactOutcome::Unchanged)],
                outcome: RunOutcome::Unchanged,
            };
        }
        self.last_spec_fingerprint = Some(staged_fp);

        let spec_outcome = match publish(&spec_artifact.staged, &spec_artifact.dest) {
            Ok(outcome) => ArtifactOutcome::from(outcome),
            Err(e) => {
                // Downstream generators must never run against a
                // staged-but-unpublished spec; forget the fingerprint so the
                // next run retries the publish.
                self.last_spec_fingerprint = None;
                warn!(error = %e, "spec publish failed, skipping downstream stages");
                return GenerationRun {
                    artifacts: vec![(ArtifactKind::Spec, ArtifactOutcome::Failed)],
                    outcome: RunOutcome::Failed,
                };
            }
        };

        // Stage 3: routes and client, concurrent and independent. Both are
        // awaited; a failure in one never cancels the other.
        let routes_artifact = self.artifact(ArtifactKind::Routes, &routes_cfg.dest_rel());
        let client_artifact = config
            .client
            .as_ref()
            .map(|client| self.artifact(ArtifactKind::Client, client.dest_rel()));

        let staging = &self.staging;
        let generators = &self.generators;
        let (routes_outcome, client_outcome) = std::thread::scope(|scope| {
            let routes = scope.spawn(|| {
                stage_artifact(staging, &routes_artifact, |out| {
                    generators.routes.generate(out)
                })
            });
            let client = client_artifact.as_ref().map(|artifact| {
                scope.spawn(move || {
                    stage_artifact(staging, artifact, |out| match &generators.client {
                        Some(gen) => gen.generate(out),
                        None => anyhow::bail!("client artifact configured but no generator bound"),
                    })
                })
            });
            (
                routes.join().unwrap_or(ArtifactOutcome::Failed),
                client.map(|h| h.join().unwrap_or(ArtifactOutcome::Failed)),
            )
        });

        // Stage 4: extra conditional copies of the published spec.
        for target in &config.copy_spec_to {
            let target = resolve(&self.project_root, target);
            match publish(&spec_artifact.dest, &target) {
                Ok(outcome) => {
                    debug!(target = %target.display(), outcome = ?outcome, "extra spec copy")
                }
                Err(e) => warn!(target = %target.display(), error = %e, "extra spec copy failed"),
            }
        }

        let mut artifacts = vec![
            (ArtifactKind::Spec, spec_outcome),
            (ArtifactKind::Routes, routes_outcome),
        ];
        if let Some(outcome) = client_outcome {
            artifacts.push((ArtifactKind::Client, outcome));
        }

        let outcome = if artifacts
            .iter()
            .any(|(_, o)| *o == ArtifactOutcome::Failed)
        {
            RunOutcome::PartialFailure
        } else {
            RunOutcome::Success
        };

        GenerationRun { artifacts, outcome }
    }

    fn artifact(&self, kind: ArtifactKind, dest_rel: &Path) -> ArtifactSpec {
        ArtifactSpec {
            kind,
            staged: self.staging.staged_path(dest_rel),
            dest: resolve(&self.project_root, dest_rel),
        }
    }
}

/// Generate one secondary artifact into staging and conditionally publish it.
/// All failures are caught here and reported as [`ArtifactOutcome::Failed`].
fn stage_artifact(
    staging: &StagingArea,
    artifact: &ArtifactSpec,
    generate: impl FnOnce(&Path) -> anyhow::Result<()>,
) -> ArtifactOutcome {
    let generated = staging
        .ensure_parent(&artifact.staged)
        .and_then(|()| generate(&artifact.staged));
    if let Err(e) = generated {
        warn!(artifact = %artifact.kind, error = %e, "generation failed");
        return ArtifactOutcome::Failed;
    }
    match publish(&artifact.staged, &artifact.dest) {
        Ok(outcome) => ArtifactOutcome::from(outcome),
        Err(e) => {
            warn!(artifact = %artifact.kind, error = %e, "publish failed");
            ArtifactOutcome::Failed
        }
    }
}
