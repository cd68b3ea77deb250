//! Git hook dispatch
//!
//! Each hook classifies the files it is given and runs the matching
//! per-language steps in a fixed order:
//!
//! - `pre-commit`: provision the Python venv when Python files are staged,
//!   then run the unified staged-file check with the venv binary directory
//!   handed to it through its environment.
//! - `post-merge`: repair the Nx workspace, then install dependencies for every
//!   manifest family touched by the merge.
//! - `pre-push`: run each language's tests, stopping at the first failure.
//!
//! A missing tool turns its step into a warning; a failing step aborts the
//! hook with that step's exit code.

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};

pub mod classify;
mod post_merge;
mod pre_commit;
mod pre_push;

pub use classify::{Language, LanguageClassification, ManifestFamily};

use crate::cli::Output;
use crate::config::MonohookConfig;
use crate::error::HookError;
use crate::external::{CommandSpec, Platform, ProcessRunner, PythonEnv};
use crate::git::GitRepo;

/// Hooks monohook knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HookKind {
    PreCommit,
    PostMerge,
    PrePush,
}

impl HookKind {
    pub const ALL: [HookKind; 3] = [HookKind::PreCommit, HookKind::PostMerge, HookKind::PrePush];

    pub fn as_str(self) -> &'static str {
        match self {
            HookKind::PreCommit => "pre-commit",
            HookKind::PostMerge => "post-merge",
            HookKind::PrePush => "pre-push",
        }
    }

    /// Files the hook works on, as reported by git
    pub fn collect_files(self, repo: &GitRepo) -> Result<Vec<String>> {
        match self {
            HookKind::PreCommit => repo.staged_files(),
            HookKind::PostMerge => repo.merge_files(),
            HookKind::PrePush => repo.push_scope_files(),
        }
        .with_context(|| format!("Failed to collect files for {self}"))
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a single delegated step ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Passed,
    /// The tool is not installed
    Skipped,
    Failed { code: Option<i32> },
}

impl StepOutcome {
    /// Turn a failure into a [`HookError`]
    pub fn check(self, step: &str) -> Result<Self> {
        match self {
            StepOutcome::Failed { code } => Err(HookError::step_failed(step, code).into()),
            other => Ok(other),
        }
    }
}

/// Everything a hook needs for one invocation
pub struct HookContext<'a> {
    pub config: &'a MonohookConfig,
    pub root: PathBuf,
    pub files: Vec<String>,
    pub runner: &'a dyn ProcessRunner,
    pub output: &'a Output,
    pub platform: Platform,
}

impl<'a> HookContext<'a> {
    pub fn new(
        config: &'a MonohookConfig,
        root: &Path,
        files: Vec<String>,
        runner: &'a dyn ProcessRunner,
        output: &'a Output,
    ) -> Self {
        Self {
            config,
            root: root.to_path_buf(),
            files,
            runner,
            output,
            platform: Platform::current(),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn classification(&self) -> LanguageClassification {
        LanguageClassification::classify(&self.files)
    }

    pub fn python_env(&self) -> PythonEnv {
        PythonEnv::new(&self.root, &self.config.python, self.platform)
    }

    /// Run one delegated step, degrading to a warning when its tool is missing
    pub fn run_step(&self, label: &str, spec: &CommandSpec) -> Result<StepOutcome> {
        if !self.runner.is_available(&spec.program) {
            self.output
                .warning(&format!("'{}' not found; skipping {label}", spec.program));
            return Ok(StepOutcome::Skipped);
        }

        self.output.step(&format!("{label}: {}", spec.display()));
        let result = self.runner.run(spec)?;

        if result.success() {
            self.output.success(label);
            Ok(StepOutcome::Passed)
        } else {
            self.output.error(&format!(
                "{label} failed (exit code {})",
                result.code.map_or_else(|| "none".to_string(), |c| c.to_string())
            ));
            Ok(StepOutcome::Failed { code: result.code })
        }
    }
}

/// Run `kind` against the files in `ctx`
pub fn execute(kind: HookKind, ctx: &HookContext) -> Result<()> {
    tracing::info!("Executing {kind} hook with {} file(s)", ctx.files.len());
    ctx.output.header(&format!("monohook {kind}"));

    match kind {
        HookKind::PreCommit => pre_commit::execute(ctx),
        HookKind::PostMerge => post_merge::execute(ctx),
        HookKind::PrePush => pre_push::execute(ctx),
    }
}
