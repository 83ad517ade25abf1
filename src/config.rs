//! # Generation Configuration Module
//!
//! Configuration surface consumed by the orchestrator.
//!
//! ## Overview
//!
//! Configuration declares where each artifact is published and, for the CLI,
//! which external command produces it. It is deserialized from YAML or JSON
//! (matching the file extension) or built programmatically by a host.
//!
//! `spec` and `routes` are required; their absence is a configuration error
//! surfaced synchronously by [`Config::validate`] and never retried — unlike
//! generator failures, which are recovered at run time.
//!
//! ## Example
//!
//! ```yaml
//! spec:
//!   output_directory: api
//!   spec_file_base_name: openapi
//!   format: json
//!   command: "my-spec-gen --out {out}"
//! routes:
//!   routes_dir: src/generated
//!   routes_file_name: routes.rs
//!   command: "my-route-gen --spec api/openapi.json --out {out}"
//! client: generated/client.rs
//! reload_handler: true
//! copy_spec_to:
//!   - dist/openapi.json
//! ```

use crate::staging::{StagingArea, STAGING_DIR_NAME};
use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Output format of the interface-description document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecFormat {
    #[default]
    Json,
    Yaml,
}

impl SpecFormat {
    /// File extension for the published spec document.
    pub fn extension(&self) -> &'static str {
        match self {
            SpecFormat::Json => "json",
            SpecFormat::Yaml => "yaml",
        }
    }
}

/// Configuration for the primary spec artifact.
#[derive(Debug, Clone, Deserialize)]
pub struct SpecConfig {
    /// Directory the spec document is published into, relative to the project root.
    pub output_directory: PathBuf,
    /// Base file name without extension (e.g. `openapi`).
    #[serde(default = "default_spec_base_name")]
    pub spec_file_base_name: String,
    /// JSON or YAML output.
    #[serde(default)]
    pub format: SpecFormat,
    /// Shell command producing the document; `{out}` is replaced with the
    /// staged output path. Used by the CLI's command-backed generator.
    #[serde(default)]
    pub command: Option<String>,
}

fn default_spec_base_name() -> String {
    "openapi".to_string()
}

impl SpecConfig {
    /// Published spec path relative to the project root.
    pub fn dest_rel(&self) -> PathBuf {
        self.output_directory.join(format!(
            "{}.{}",
            self.spec_file_base_name,
            self.format.extension()
        ))
    }
}

/// Configuration for the generated routing code artifact.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutesConfig {
    /// Directory the routes file is published into, relative to the project root.
    pub routes_dir: PathBuf,
    /// File name of the generated routes module.
    pub routes_file_name: String,
    /// Shell command producing the routes file; `{out}` is replaced with the
    /// staged output path.
    #[serde(default)]
    pub command: Option<String>,
}

impl RoutesConfig {
    /// Published routes path relative to the project root.
    pub fn dest_rel(&self) -> PathBuf {
        self.routes_dir.join(&self.routes_file_name)
    }
}

/// Configuration for the optional client artifact: either a bare target path
/// or a richer descriptor carrying the generator command.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ClientConfig {
    Path(PathBuf),
    Detailed {
        path: PathBuf,
        #[serde(default)]
        command: Option<String>,
    },
}

impl ClientConfig {
    /// Published client path relative to the project root.
    pub fn dest_rel(&self) -> &Path {
        match self {
            ClientConfig::Path(p) => p,
            ClientConfig::Detailed { path, .. } => path,
        }
    }

    /// Generator command, if the richer descriptor form was used.
    pub fn command(&self) -> Option<&str> {
        match self {
            ClientConfig::Path(_) => None,
            ClientConfig::Detailed { command, .. } => command.as_deref(),
        }
    }
}

/// Top-level generation configuration.
///
/// `spec` and `routes` are modeled as `Option` so hosts can assemble the
/// object incrementally; [`Config::validate`] enforces their presence before
/// any run starts.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub spec: Option<SpecConfig>,
    pub routes: Option<RoutesConfig>,
    #[serde(default)]
    pub client: Option<ClientConfig>,
    /// Enables the continuous watch loop when running through the CLI.
    #[serde(default)]
    pub reload_handler: bool,
    /// Extra destinations the published spec is conditionally copied to
    /// (e.g. a bundler's intermediate output directory).
    #[serde(default)]
    pub copy_spec_to: Vec<PathBuf>,
    /// Source tree watched for changes, relative to the project root.
    #[serde(default = "default_watch_dir")]
    pub watch_dir: PathBuf,
    /// Quiescence window in milliseconds before a change event triggers a run.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

fn default_watch_dir() -> PathBuf {
    PathBuf::from("src")
}

fn default_settle_ms() -> u64 {
    200
}

impl Default for Config {
    // Matches the serde field defaults so programmatic construction and
    // deserialization agree.
    fn default() -> Self {
        Self {
            spec: None,
            routes: None,
            client: None,
            reload_handler: false,
            copy_spec_to: Vec::new(),
            watch_dir: default_watch_dir(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML or JSON file, chosen by extension.
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = if path.extension().map(|s| s == "json").unwrap_or(false) {
            serde_json::from_str(&raw)
                .with_context(|| format!("invalid JSON config {}", path.display()))?
        } else {
            serde_yaml::from_str(&raw)
                .with_context(|| format!("invalid YAML config {}", path.display()))?
        };
        Ok(config)
    }

    /// Enforce the required configuration blocks.
    ///
    /// # Errors
    ///
    /// Fails when `spec` or `routes` is absent. This is a programmer/user
    /// error surfaced immediately to the caller, never retried.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.spec.is_none() {
            bail!("configuration error: required `spec` block is missing");
        }
        if self.routes.is_none() {
            bail!("configuration error: required `routes` block is missing");
        }
        Ok(())
    }

    /// Every output path the orchestrator may write, resolved against the
    /// project root: staged and published spec/routes/client plus extra spec
    /// copies.
    ///
    /// Recomputed from current configuration before each watch start; the
    /// watch loop excludes these paths so the orchestrator's own writes never
    /// re-trigger a run.
    pub fn output_paths(&self, project_root: &Path) -> HashSet<PathBuf> {
        let staging = StagingArea::new(project_root);
        let mut paths = HashSet::new();
        let mut add = |rel: &Path| {
            paths.insert(resolve(project_root, rel));
            paths.insert(staging.staged_path(rel));
        };
        if let Some(spec) = &self.spec {
            add(&spec.dest_rel());
        }
        if let Some(routes) = &self.routes {
            add(&routes.dest_rel());
        }
        if let Some(client) = &self.client {
            add(client.dest_rel());
        }
        for extra in &self.copy_spec_to {
            paths.insert(resolve(project_root, extra));
        }
        paths.insert(project_root.join(STAGING_DIR_NAME));
        paths
    }
}

/// Resolve a configured path against the project root; absolute paths pass
/// through untouched.
pub fn resolve(project_root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        project_root.join(configured)
    }
}
