use anyhow::{Context, Result};
use git2::{Branch, Delta, DiffOptions, Oid, Status, StatusOptions};
use std::fs;

use super::GitRepo;

/// Marker line identifying hook scripts written by monohook
pub const HOOK_MARKER: &str = "# installed by monohook";

/// Outcome of installing a single hook script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookInstall {
    Installed,
    Replaced,
    /// A foreign hook exists and `force` was not given
    KeptExisting,
}

impl GitRepo {
    /// Files staged for commit, relative to the working tree
    ///
    /// Deletions are left out: there is nothing left on disk to check.
    pub fn staged_files(&self) -> Result<Vec<String>> {
        let mut status_opts = StatusOptions::new();
        status_opts.include_ignored(false);
        status_opts.include_untracked(false);
        status_opts.renames_head_to_index(true);

        let statuses = self
            .repo
            .statuses(Some(&mut status_opts))
            .context("Failed to get repository status")?;

        let mut files = Vec::new();
        for entry in statuses.iter() {
            let status = entry.status();
            if !status.intersects(
                Status::INDEX_NEW | Status::INDEX_MODIFIED | Status::INDEX_RENAMED | Status::INDEX_TYPECHANGE,
            ) {
                continue;
            }

            let path = entry
                .head_to_index()
                .and_then(|delta| delta.new_file().path().map(|p| p.to_string_lossy().into_owned()))
                .or_else(|| entry.path().map(str::to_string));

            if let Some(path) = path {
                files.push(path);
            }
        }

        Ok(files)
    }

    /// Files changed between two revisions, e.g. `ORIG_HEAD` and `HEAD`
    pub fn diff_files(&self, from: &str, to: &str) -> Result<Vec<String>> {
        let from_oid = self
            .repo
            .revparse_single(from)
            .with_context(|| format!("Failed to resolve '{from}'"))?
            .peel_to_commit()?
            .id();
        let to_oid = self
            .repo
            .revparse_single(to)
            .with_context(|| format!("Failed to resolve '{to}'"))?
            .peel_to_commit()?
            .id();

        self.diff_commits(from_oid, to_oid)
    }

    /// Files brought in by the merge that just completed
    pub fn merge_files(&self) -> Result<Vec<String>> {
        self.diff_files("ORIG_HEAD", "HEAD")
            .context("Failed to diff ORIG_HEAD..HEAD")
    }

    /// Files about to be pushed: the branch's changes since it diverged from
    /// its upstream, or the staged files when there is no upstream
    pub fn push_scope_files(&self) -> Result<Vec<String>> {
        let head = match self.repo.head() {
            Ok(head) if head.is_branch() => head,
            _ => return self.staged_files(),
        };
        let head_oid = head.target().context("HEAD does not point to a commit")?;

        let branch = Branch::wrap(head);
        let upstream = match branch.upstream() {
            Ok(upstream) => upstream,
            Err(_) => {
                tracing::debug!("No upstream configured; using staged files for pre-push scope");
                return self.staged_files();
            }
        };
        let upstream_oid = upstream
            .get()
            .target()
            .context("Upstream branch does not point to a commit")?;

        let base = self.repo.merge_base(upstream_oid, head_oid)?;
        self.diff_commits(base, head_oid)
    }

    fn diff_commits(&self, from: Oid, to: Oid) -> Result<Vec<String>> {
        let from_tree = self.repo.find_commit(from)?.tree()?;
        let to_tree = self.repo.find_commit(to)?.tree()?;

        let mut diff_opts = DiffOptions::new();
        diff_opts.context_lines(0);
        let diff = self
            .repo
            .diff_tree_to_tree(Some(&from_tree), Some(&to_tree), Some(&mut diff_opts))?;

        let files = diff
            .deltas()
            .filter(|delta| delta.status() != Delta::Deleted)
            .filter_map(|delta| delta.new_file().path().map(|p| p.to_string_lossy().into_owned()))
            .collect();

        Ok(files)
    }

    /// Write a hook script into the hooks directory
    pub fn install_hook(&self, hook_name: &str, content: &str, force: bool) -> Result<HookInstall> {
        let hooks_dir = self.hooks_dir()?;
        let hook_path = hooks_dir.join(hook_name);

        fs::create_dir_all(&hooks_dir).context("Failed to create hooks directory")?;

        let outcome = match fs::read_to_string(&hook_path) {
            Ok(existing) if !force && !existing.contains(HOOK_MARKER) => {
                return Ok(HookInstall::KeptExisting);
            }
            Ok(_) => HookInstall::Replaced,
            Err(_) if hook_path.exists() && !force => return Ok(HookInstall::KeptExisting),
            Err(_) => HookInstall::Installed,
        };

        fs::write(&hook_path, content).context("Failed to write hook file")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&hook_path)
                .context("Failed to get hook file metadata")?
                .permissions();
            perms.set_mode(0o755);
            fs::set_permissions(&hook_path, perms).context("Failed to set hook file permissions")?;
        }

        Ok(outcome)
    }

    /// Remove a hook script, only if monohook wrote it
    pub fn remove_hook(&self, hook_name: &str) -> Result<bool> {
        let hook_path = self.hooks_dir()?.join(hook_name);

        match fs::read_to_string(&hook_path) {
            Ok(existing) if existing.contains(HOOK_MARKER) => {
                fs::remove_file(&hook_path).context("Failed to remove hook file")?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
