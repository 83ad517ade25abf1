//! # apiforge
//!
//! **apiforge** is an incremental generation orchestrator: it regenerates an
//! API's derived artifacts — an interface-description document (OpenAPI JSON
//! or YAML), routing glue code, and a client library — in dependency order,
//! publishes only the artifacts whose bytes actually changed, and keeps doing
//! so safely in response to live filesystem edits.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`fingerprint`]** - SHA-256 content fingerprints with a forced-publish
//!   sentinel for unreadable files
//! - **[`publish`]** - the conditional publisher, the single idempotency
//!   primitive used for every artifact kind
//! - **[`staging`]** - the hidden per-project staging area generators write
//!   into, so public paths never show partial output
//! - **[`config`]** - the configuration surface (`spec`/`routes` required,
//!   `client` and extra spec copies optional) and the derived output-path set
//! - **[`generators`]** - trait seams for the three opaque external
//!   generators, plus a shell-command-backed implementation for the CLI
//! - **[`pipeline`]** - dependency-ordered generation with the spec
//!   short-circuit and independent routes/client stages
//! - **[`watch`]** - the continuous watch loop: self-trigger exclusion, event
//!   coalescing, and the retry-on-failure state machine
//! - **[`orchestrator`]** - the one-shot and generate-and-watch entry points
//! - **[`cli`]** - `apiforge generate` / `apiforge watch`
//!
//! ## Generation Flow
//!
//! ```text
//! source edit
//!   └─ watch loop wakes (after quiescence, own outputs excluded)
//!        └─ pipeline run
//!             ├─ Spec Generator  → .apiforge/…   (staging)
//!             ├─ fingerprint staged spec ── unchanged? ─→ short-circuit
//!             ├─ conditional publish spec
//!             ├─ Route Generator ─┐ concurrent, independent,
//!             ├─ Client Generator ┘ each conditionally published
//!             └─ extra spec copies (bundler intermediates)
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use apiforge::{Config, Generators, Orchestrator};
//! use std::path::Path;
//!
//! let config = Config::load(Path::new("apiforge.yaml")).expect("config");
//! let generators = Generators {
//!     spec: Box::new(|out: &Path| -> anyhow::Result<()> {
//!         std::fs::write(out, b"{\"openapi\":\"3.1.0\"}")?;
//!         Ok(())
//!     }),
//!     routes: Box::new(|out: &Path| -> anyhow::Result<()> {
//!         std::fs::write(out, b"// routes")?;
//!         Ok(())
//!     }),
//!     client: None,
//! };
//!
//! let mut orchestrator = Orchestrator::new(Path::new("."), config, generators).unwrap();
//! let run = orchestrator.generate().expect("missing spec/routes config");
//! println!("outcome: {:?}", run.outcome);
//! ```
//!
//! ## Failure Model
//!
//! Missing `spec`/`routes` configuration is a programmer error and fails the
//! one-shot entry point synchronously. Everything else — a generator that
//! throws on a syntax error mid-edit, a publish hitting a full disk — is
//! recovered: logged as a warning, retried on the next change event (and once
//! immediately, in case the failure was a half-written file), and never
//! allowed to crash a watching process.

pub mod cli;
pub mod config;
pub mod fingerprint;
pub mod generators;
pub mod orchestrator;
pub mod pipeline;
pub mod publish;
pub mod staging;
pub mod watch;

pub use config::{ClientConfig, Config, RoutesConfig, SpecConfig, SpecFormat};
pub use fingerprint::{fingerprint, Fingerprint};
pub use generators::{ClientGenerator, CommandGenerator, Generators, RouteGenerator, SpecGenerator};
pub use orchestrator::Orchestrator;
pub use pipeline::{ArtifactOutcome, GenerationPipeline, GenerationRun, RunOutcome};
pub use publish::{publish, PublishOutcome};
pub use staging::{ArtifactKind, ArtifactSpec, StagingArea};
pub use watch::WatchHandle;
