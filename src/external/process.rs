//! Process execution seam
//!
//! Every delegated tool (package managers, test runners, Nx) goes through a
//! [`ProcessRunner`], so hooks can be exercised without spawning anything.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// One external command invocation
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Extra variables for the child only; the parent environment is untouched
    pub env: Vec<(String, String)>,
    /// Capture stdout/stderr instead of streaming them to the terminal
    pub capture: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, cwd: &Path) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.to_path_buf(),
            env: Vec::new(),
            capture: false,
        }
    }

    /// Build from an argv-style list such as `["npx", "lint-staged"]`
    pub fn from_argv(argv: &[String], cwd: &Path) -> Result<Self> {
        let (program, args) = argv.split_first().context("Command is empty")?;
        Ok(Self::new(program.clone(), cwd).args(args.iter().cloned()))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn capture(mut self) -> Self {
        self.capture = true;
        self
    }

    /// Human readable command line for messages
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Exit status and captured output of a delegated process
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandInvocationResult {
    /// `None` when the process was terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandInvocationResult {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn combined_output(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Runs external commands, one at a time, blocking until they exit
pub trait ProcessRunner {
    /// Whether `program` can be found (on PATH, or as an existing path)
    fn is_available(&self, program: &str) -> bool;

    fn run(&self, spec: &CommandSpec) -> Result<CommandInvocationResult>;
}

/// Runner backed by `std::process::Command`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn is_available(&self, program: &str) -> bool {
        if program.contains('/') || program.contains('\\') {
            return Path::new(program).exists();
        }
        which::which(program).is_ok()
    }

    fn run(&self, spec: &CommandSpec) -> Result<CommandInvocationResult> {
        // Resolve through PATH/PATHEXT so `npx` finds `npx.cmd` on Windows
        let program = which::which(&spec.program).unwrap_or_else(|_| PathBuf::from(&spec.program));

        let mut cmd = Command::new(&program);
        cmd.args(&spec.args).current_dir(&spec.cwd);
        for (key, value) in &spec.env {
            cmd.env(key, value);
        }

        tracing::debug!("Running: {} (cwd {})", spec.display(), spec.cwd.display());

        if spec.capture {
            let output = cmd
                .stdin(Stdio::null())
                .output()
                .with_context(|| format!("Failed to execute '{}'", spec.display()))?;

            Ok(CommandInvocationResult {
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        } else {
            let status = cmd
                .status()
                .with_context(|| format!("Failed to execute '{}'", spec.display()))?;

            Ok(CommandInvocationResult {
                code: status.code(),
                ..Default::default()
            })
        }
    }
}
