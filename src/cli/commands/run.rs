use anyhow::Result;
use clap::Args;

use crate::cli::Session;
use crate::external::SystemRunner;
use crate::hooks::{self, HookContext, HookKind};

#[derive(Args, Clone)]
pub struct RunArgs {
    /// Hook to run
    #[arg(value_enum)]
    pub hook: HookKind,

    /// Use these files instead of asking git (repeatable)
    #[arg(long = "file", value_name = "PATH")]
    pub files: Vec<String>,

    /// Arguments git passed to the hook
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

pub async fn execute(args: RunArgs, session: &Session) -> Result<()> {
    let config = session.config()?;

    if !args.args.is_empty() {
        tracing::debug!("{} hook arguments: {:?}", args.hook, args.args);
    }

    let files = if args.files.is_empty() {
        args.hook.collect_files(&session.repo()?)?
    } else {
        args.files
    };
    for file in &files {
        session.output.verbose(file);
    }

    let runner = SystemRunner;
    let ctx = HookContext::new(&config, &session.root, files, &runner, &session.output);
    hooks::execute(args.hook, &ctx)
}
