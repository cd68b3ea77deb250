use anyhow::Result;

use super::{HookContext, Language};
use crate::external::{CommandSpec, VenvStatus};

pub(super) fn execute(ctx: &HookContext) -> Result<()> {
    if ctx.files.is_empty() {
        ctx.output.info("Nothing to test for this push");
        return Ok(());
    }

    let classification = ctx.classification();
    ctx.output.key_value("Languages", &classification.to_string(), false);

    let tests = &ctx.config.hooks.pre_push;
    let suites = [
        (Language::Node, "Node tests", &tests.node_test),
        (Language::Python, "Python tests", &tests.python_test),
        (Language::Dotnet, ".NET tests", &tests.dotnet_test),
    ];

    for (language, label, argv) in suites {
        if !classification.has(language) || argv.is_empty() {
            continue;
        }

        let mut spec = CommandSpec::from_argv(argv, &ctx.root)?;
        if language == Language::Python {
            let python = ctx.python_env();
            if python.ensure(&ctx.config.python.interpreter, ctx.runner, ctx.output)?
                == VenvStatus::InterpreterMissing
            {
                continue;
            }
            spec = spec.env(&ctx.config.python.env_var, python.bin_dir());
        }

        ctx.run_step(label, &spec)?.check(&spec.display())?;
    }

    Ok(())
}
