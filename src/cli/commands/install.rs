use anyhow::Result;
use clap::Args;

use super::selected_hooks;
use crate::cli::Session;
use crate::git::{HOOK_MARKER, HookInstall};
use crate::hooks::HookKind;

#[derive(Args)]
pub struct InstallArgs {
    /// Specify which hooks to install (default: all)
    #[arg(long, value_delimiter = ',', value_enum)]
    pub hooks: Vec<HookKind>,

    /// Overwrite existing hooks
    #[arg(long)]
    pub force: bool,
}

/// Shell script git runs for `hook`
pub fn hook_script(hook: HookKind) -> String {
    format!("#!/bin/sh\n{HOOK_MARKER}\nexec monohook run {hook} \"$@\"\n")
}

pub async fn execute(args: InstallArgs, session: &Session) -> Result<()> {
    let repo = session.repo()?;
    let output = &session.output;

    output.header("Installing monohook hooks");
    if args.force {
        output.warning("Force mode enabled - will overwrite existing hooks");
    }

    let mut kept = 0;
    for hook in selected_hooks(&args.hooks) {
        match repo.install_hook(hook.as_str(), &hook_script(hook), args.force)? {
            HookInstall::Installed => output.success(&format!("Installed {hook}")),
            HookInstall::Replaced => output.success(&format!("Replaced {hook}")),
            HookInstall::KeptExisting => {
                kept += 1;
                output.warning(&format!("Kept existing {hook} hook (use --force to overwrite)"));
            }
        }
    }

    output.key_value("Hooks directory", &repo.hooks_dir()?.display().to_string(), false);
    if kept > 0 {
        tracing::info!("{kept} foreign hook(s) left in place");
    }
    Ok(())
}
