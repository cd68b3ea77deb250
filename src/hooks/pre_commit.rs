use anyhow::Result;

use super::{HookContext, Language};
use crate::external::CommandSpec;

pub(super) fn execute(ctx: &HookContext) -> Result<()> {
    if ctx.files.is_empty() {
        ctx.output.info("No staged files to check");
        return Ok(());
    }

    let classification = ctx.classification();
    ctx.output.key_value("Languages", &classification.to_string(), false);

    let python = ctx.python_env();
    if classification.has(Language::Python) {
        python.ensure(&ctx.config.python.interpreter, ctx.runner, ctx.output)?;
    }

    let check = &ctx.config.hooks.pre_commit.staged_check;
    if check.is_empty() {
        tracing::debug!("No staged-file check configured");
        return Ok(());
    }

    let spec = CommandSpec::from_argv(check, &ctx.root)?.env(&ctx.config.python.env_var, python.bin_dir());
    ctx.run_step("Staged file checks", &spec)?.check(&spec.display())?;
    Ok(())
}
