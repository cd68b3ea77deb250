use anyhow::Result;
use clap::Args;

use crate::cli::Session;
use crate::error::HookError;
use crate::external::SystemRunner;
use crate::runner::SafeRunner;

#[derive(Args)]
pub struct NxArgs {
    /// Arguments forwarded unchanged to the bulk runner
    ///
    /// Everything after the first forwarded argument goes to Nx, `--help`
    /// included. Put `--` first to forward a leading `-v`, `-q` or `-C`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

pub async fn execute(args: NxArgs, session: &Session) -> Result<()> {
    let config = session.config()?;
    let runner = SystemRunner;
    let safe = SafeRunner::new(&config.runner, &runner, &session.output)?;

    let outcome = safe.run(&args.args, &session.root)?;
    if outcome.exit_code != 0 {
        return Err(HookError::step_failed(config.runner.command.join(" "), Some(outcome.exit_code)).into());
    }
    Ok(())
}
