use anyhow::Result;
use clap::Args;

use super::selected_hooks;
use crate::cli::Session;
use crate::hooks::HookKind;

#[derive(Args)]
pub struct UninstallArgs {
    /// Specify which hooks to remove (default: all)
    #[arg(long, value_delimiter = ',', value_enum)]
    pub hooks: Vec<HookKind>,
}

pub async fn execute(args: UninstallArgs, session: &Session) -> Result<()> {
    let repo = session.repo()?;
    let output = &session.output;

    let mut removed = 0;
    for hook in selected_hooks(&args.hooks) {
        if repo.remove_hook(hook.as_str())? {
            removed += 1;
            output.success(&format!("Removed {hook}"));
        } else {
            tracing::debug!("{hook}: not installed by monohook, left alone");
        }
    }

    if removed == 0 {
        output.info("No monohook hooks installed");
    }
    Ok(())
}
