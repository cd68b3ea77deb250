//! Git integration layer for monohook
//!
//! Provides the file sets each hook works on and installs the hook scripts,
//! using git2.

use anyhow::{Context, Result};
use git2::Repository;
use std::path::{Path, PathBuf};

mod operations;

pub use operations::{HOOK_MARKER, HookInstall};

/// Git repository handle
pub struct GitRepo {
    pub repo: Repository,
}

impl GitRepo {
    /// Discover the repository containing `path`
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path).context("No Git repository found")?;
        Ok(GitRepo { repo })
    }

    /// Working tree root
    pub fn workdir(&self) -> Result<PathBuf> {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .context("Repository has no working directory")
    }

    /// Directory git runs hooks from, honouring `core.hooksPath`
    pub fn hooks_dir(&self) -> Result<PathBuf> {
        let configured = self
            .repo
            .config()
            .ok()
            .and_then(|config| config.get_path("core.hooksPath").ok());

        match configured {
            Some(path) if path.is_absolute() => Ok(path),
            Some(path) => Ok(self.workdir()?.join(path)),
            None => Ok(self.repo.path().join("hooks")),
        }
    }
}
