//! Python virtual environment provisioning
//!
//! The venv binary directory is always computed (hooks hand it to child
//! processes even when no Python file changed), but the venv itself is only
//! created on demand.

use anyhow::Result;
use std::path::{Path, PathBuf};

use super::process::{CommandSpec, ProcessRunner};
use crate::cli::Output;
use crate::config::PythonConfig;
use crate::error::HookError;

/// Target platform for path rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) { Platform::Windows } else { Platform::Unix }
    }

    pub fn separator(self) -> char {
        match self {
            Platform::Windows => '\\',
            Platform::Unix => '/',
        }
    }
}

/// What [`PythonEnv::ensure`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VenvStatus {
    Existing,
    Created,
    /// The interpreter is not installed; Python steps degrade to no-ops
    InterpreterMissing,
}

#[derive(Debug, Clone)]
pub struct PythonEnv {
    venv_path: PathBuf,
    bin_dir: String,
    platform: Platform,
}

impl PythonEnv {
    pub fn new(root: &Path, config: &PythonConfig, platform: Platform) -> Self {
        Self {
            venv_path: root.join(&config.venv_dir),
            bin_dir: venv_bin_dir(root, &config.venv_dir, platform),
            platform,
        }
    }

    /// Binary directory rendered with the platform's separators
    pub fn bin_dir(&self) -> &str {
        &self.bin_dir
    }

    /// Interpreter inside the venv
    pub fn python(&self) -> String {
        let exe = match self.platform {
            Platform::Windows => "python.exe",
            Platform::Unix => "python",
        };
        format!("{}{}{}", self.bin_dir, self.platform.separator(), exe)
    }

    pub fn exists(&self) -> bool {
        self.venv_path.is_dir()
    }

    /// Create the venv with `interpreter -m venv` unless it already exists
    pub fn ensure(
        &self,
        interpreter: &str,
        runner: &dyn ProcessRunner,
        output: &Output,
    ) -> Result<VenvStatus> {
        if self.exists() {
            tracing::debug!("Python venv present at {}", self.venv_path.display());
            return Ok(VenvStatus::Existing);
        }

        if !runner.is_available(interpreter) {
            output.warning(&format!(
                "'{interpreter}' not found; skipping Python environment setup"
            ));
            return Ok(VenvStatus::InterpreterMissing);
        }

        let cwd = self.venv_path.parent().unwrap_or(Path::new("."));
        let spec = CommandSpec::new(interpreter, cwd)
            .args(["-m", "venv"])
            .arg(self.venv_path.display().to_string());

        output.step(&format!("Creating Python environment at {}", self.venv_path.display()));
        let result = runner.run(&spec)?;
        if !result.success() {
            return Err(HookError::step_failed(spec.display(), result.code).into());
        }

        output.success("Python environment created");
        Ok(VenvStatus::Created)
    }
}

/// `<root>/<venv>/bin` on Unix, `<root>\<venv>\Scripts` on Windows
pub fn venv_bin_dir(root: &Path, venv_dir: &str, platform: Platform) -> String {
    let sep = platform.separator();
    let leaf = match platform {
        Platform::Windows => "Scripts",
        Platform::Unix => "bin",
    };

    let root = root.display().to_string();
    let root = root.trim_end_matches(['/', '\\']);
    let venv = venv_dir
        .trim_matches(['/', '\\'])
        .replace(['/', '\\'], &sep.to_string());

    format!("{root}{sep}{venv}{sep}{leaf}")
}
