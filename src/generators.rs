//! # Generator Seams Module
//!
//! Trait seams for the three opaque external generators.
//!
//! ## Overview
//!
//! The orchestrator does not know how an interface-description document,
//! routing code, or a client library is produced. Each transformation is an
//! external collaborator behind a one-method trait: it is handed an output
//! path inside the staging area and either writes the artifact there or
//! fails. Failures are recovered by the pipeline, never fatal to the process.
//!
//! Closures implement all three traits, which keeps tests and embedding hosts
//! free to inject arbitrary behavior. The CLI binds the traits to configured
//! shell commands via [`CommandGenerator`].

use anyhow::bail;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Produces the interface-description document at the given staged path.
pub trait SpecGenerator: Send + Sync {
    fn generate(&self, out: &Path) -> anyhow::Result<()>;
}

/// Produces routing glue code at the given staged path, reading the
/// already-published spec document.
pub trait RouteGenerator: Send + Sync {
    fn generate(&self, out: &Path) -> anyhow::Result<()>;
}

/// Produces a client library at the given staged path, reading the
/// already-published spec document.
pub trait ClientGenerator: Send + Sync {
    fn generate(&self, out: &Path) -> anyhow::Result<()>;
}

impl<F> SpecGenerator for F
where
    F: Fn(&Path) -> anyhow::Result<()> + Send + Sync,
{
    fn generate(&self, out: &Path) -> anyhow::Result<()> {
        self(out)
    }
}

impl<F> RouteGenerator for F
where
    F: Fn(&Path) -> anyhow::Result<()> + Send + Sync,
{
    fn generate(&self, out: &Path) -> anyhow::Result<()> {
        self(out)
    }
}

impl<F> ClientGenerator for F
where
    F: Fn(&Path) -> anyhow::Result<()> + Send + Sync,
{
    fn generate(&self, out: &Path) -> anyhow::Result<()> {
        self(out)
    }
}

/// The three generator implementations bound to one orchestrator instance.
///
/// The client generator is optional; it is only invoked when the
/// configuration declares a client artifact.
pub struct Generators {
    pub spec: Box<dyn SpecGenerator>,
    pub routes: Box<dyn RouteGenerator>,
    pub client: Option<Box<dyn ClientGenerator>>,
}

/// Generator backed by a configured shell command.
///
/// The literal `{out}` in the command is replaced with the staged output path
/// before execution. A non-zero exit status is a generator failure.
pub struct CommandGenerator {
    command: String,
}

impl CommandGenerator {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn run(&self, out: &Path) -> anyhow::Result<()> {
        let rendered = self.command.replace("{out}", &out.display().to_string());
        debug!(command = %rendered, "running generator command");
        let status = Command::new("sh").arg("-c").arg(&rendered).status()?;
        if !status.success() {
            bail!("generator command failed ({status}): {rendered}");
        }
        Ok(())
    }
}

impl SpecGenerator for CommandGenerator {
    fn generate(&self, out: &Path) -> anyhow::Result<()> {
        self.run(out)
    }
}

impl RouteGenerator for CommandGenerator {
    fn generate(&self, out: &Path) -> anyhow::Result<()> {
        self.run(out)
    }
}

impl ClientGenerator for CommandGenerator {
    fn generate(&self, out: &Path) -> anyhow::Result<()> {
        self.run(out)
    }
}
