//! Nx workspace repair
//!
//! Brings `nx.json`, the workspace descriptor and the Nx cache artifacts into
//! a usable state without discarding anything a person or tool added. Every
//! text rewrite keeps the file's BOM and line-ending style, and a second run
//! with no intervening changes writes nothing.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

mod encoding;
mod nx_config;
mod verify;

pub use encoding::{EncodingProfile, LineEnding, TextFile, WriteOutcome, write_preserving};
pub use nx_config::{JsonDocument, NxConfig, PluginEntry, WorkspaceDescriptor};
pub use verify::{Verification, verify_tool};

use crate::config::RepairConfig;
use crate::external::Platform;

pub const NX_JSON: &str = "nx.json";
pub const WORKSPACE_JSON: &str = "workspace.json";
pub const CACHE_DIR: &str = ".nx/cache";
pub const WORKSPACE_DATA_DIR: &str = ".nx/workspace-data";
pub const PROJECT_GRAPH: &str = ".nx/workspace-data/project-graph.json";
pub const CLOUD_MARKER: &str = ".nx/cache/nx-cloud.env";
pub const BATCH_WRAPPER: &str = "nx.bat";

const EMPTY_PROJECT_GRAPH: &str = "{\n  \"nodes\": {},\n  \"externalNodes\": {},\n  \"dependencies\": {}\n}\n";
const CLOUD_MARKER_CONTENT: &str = "NX_NO_CLOUD=true\n";
const BATCH_WRAPPER_CONTENT: &str = "@ECHO OFF\nSETLOCAL\nCALL npx nx %*\nENDLOCAL\n";

/// What happened to one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairEntry {
    pub artifact: String,
    pub outcome: WriteOutcome,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RepairReport {
    pub entries: Vec<RepairEntry>,
}

impl RepairReport {
    fn record(&mut self, artifact: &str, outcome: WriteOutcome, detail: Option<String>) {
        tracing::debug!("{artifact}: {outcome}");
        self.entries.push(RepairEntry {
            artifact: artifact.to_string(),
            outcome,
            detail,
        });
    }

    pub fn outcome(&self, artifact: &str) -> Option<WriteOutcome> {
        self.entries
            .iter()
            .find(|entry| entry.artifact == artifact)
            .map(|entry| entry.outcome)
    }

    pub fn changed(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.outcome != WriteOutcome::Unchanged)
            .count()
    }
}

/// Repairs the Nx metadata of one workspace
pub struct WorkspaceRepair<'a> {
    root: PathBuf,
    config: &'a RepairConfig,
    platform: Platform,
    dry_run: bool,
}

impl<'a> WorkspaceRepair<'a> {
    pub fn new(root: &Path, config: &'a RepairConfig, platform: Platform) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
            platform,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run every repair step in order
    pub fn run(&self) -> Result<RepairReport> {
        let mut report = RepairReport::default();

        self.repair_nx_json(&mut report)?;
        self.repair_workspace_json(&mut report)?;
        self.ensure_dirs(&mut report)?;
        self.write_cache_artifacts(&mut report)?;
        if self.platform == Platform::Windows {
            self.ensure_batch_wrapper(&mut report)?;
        }

        Ok(report)
    }

    fn repair_nx_json(&self, report: &mut RepairReport) -> Result<()> {
        let path = self.root.join(NX_JSON);
        let existing = TextFile::read(&path)?;

        let mut doc = JsonDocument::<NxConfig>::parse_or_default(
            existing.as_ref().map(|file| file.text.as_str()),
            NX_JSON,
        );
        let complete = existing.is_some()
            && (doc.value.plugins.is_some() || doc.kept_as_is("plugins"))
            && (doc.value.target_defaults.is_some() || doc.kept_as_is("targetDefaults"))
            && (doc.value.named_inputs.is_some() || doc.kept_as_is("namedInputs"));

        let mut added = doc.value.merge_required(&self.config.required_plugins);
        if doc.kept_as_is("plugins") {
            tracing::warn!("{NX_JSON} plugins is not a list; required plugins were not added");
            added.clear();
        }

        // A complete file is left byte for byte as the user formatted it
        let outcome = if complete && added.is_empty() {
            WriteOutcome::Unchanged
        } else {
            write_preserving(&path, &doc.render()?, EncodingProfile::default(), self.dry_run)?
        };
        let detail = (!added.is_empty()).then(|| format!("added plugins: {}", added.join(", ")));
        report.record(NX_JSON, outcome, detail);
        Ok(())
    }

    fn repair_workspace_json(&self, report: &mut RepairReport) -> Result<()> {
        let path = self.root.join(WORKSPACE_JSON);
        let existing = TextFile::read(&path)?;

        let mut doc = JsonDocument::<WorkspaceDescriptor>::parse_or_default(
            existing.as_ref().map(|file| file.text.as_str()),
            WORKSPACE_JSON,
        );
        let complete = existing.is_some()
            && (doc.value.version.is_some() || doc.kept_as_is("version"))
            && (doc.value.projects.is_some() || doc.kept_as_is("projects"));
        doc.value.ensure_defaults();

        let outcome = if complete {
            WriteOutcome::Unchanged
        } else {
            write_preserving(&path, &doc.render()?, EncodingProfile::default(), self.dry_run)?
        };
        report.record(WORKSPACE_JSON, outcome, None);
        Ok(())
    }

    fn ensure_dirs(&self, report: &mut RepairReport) -> Result<()> {
        for dir in [CACHE_DIR, WORKSPACE_DATA_DIR] {
            let path = self.root.join(dir);
            let outcome = if path.is_dir() {
                WriteOutcome::Unchanged
            } else {
                if !self.dry_run {
                    fs::create_dir_all(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                }
                WriteOutcome::Created
            };
            report.record(dir, outcome, None);
        }
        Ok(())
    }

    fn write_cache_artifacts(&self, report: &mut RepairReport) -> Result<()> {
        // The graph cache is rebuilt by Nx on the next real computation, so it
        // is reset to an empty graph rather than merged.
        let outcome = write_preserving(
            &self.root.join(PROJECT_GRAPH),
            EMPTY_PROJECT_GRAPH,
            EncodingProfile::default(),
            self.dry_run,
        )?;
        report.record(PROJECT_GRAPH, outcome, None);

        let outcome = write_preserving(
            &self.root.join(CLOUD_MARKER),
            CLOUD_MARKER_CONTENT,
            EncodingProfile::default(),
            self.dry_run,
        )?;
        report.record(CLOUD_MARKER, outcome, None);
        Ok(())
    }

    fn ensure_batch_wrapper(&self, report: &mut RepairReport) -> Result<()> {
        let path = self.root.join(BATCH_WRAPPER);
        if path.exists() {
            report.record(BATCH_WRAPPER, WriteOutcome::Unchanged, None);
            return Ok(());
        }

        let crlf = EncodingProfile {
            bom: false,
            line_ending: LineEnding::CrLf,
        };
        let outcome = write_preserving(&path, BATCH_WRAPPER_CONTENT, crlf, self.dry_run)?;
        report.record(BATCH_WRAPPER, outcome, None);
        Ok(())
    }
}
