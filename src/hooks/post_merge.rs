use anyhow::Result;

use super::{HookContext, ManifestFamily, StepOutcome};
use crate::error::HookError;
use crate::external::package_managers::{node_install_command, pip_install_args};
use crate::external::{CommandSpec, VenvStatus};
use crate::repair::WorkspaceRepair;

pub(super) fn execute(ctx: &HookContext) -> Result<()> {
    if ctx.config.hooks.post_merge.repair {
        let report = WorkspaceRepair::new(&ctx.root, &ctx.config.repair, ctx.platform).run()?;
        if report.changed() > 0 {
            ctx.output
                .info(&format!("Repaired {} Nx workspace artifact(s)", report.changed()));
        }
    }

    if ctx.files.is_empty() {
        ctx.output.info("No files changed by the merge");
        return Ok(());
    }

    // Every family runs; the first failure decides the exit code
    let mut first_failure: Option<HookError> = None;
    for family in ManifestFamily::ALL {
        let manifests = family.matching(&ctx.files)?;
        if manifests.is_empty() {
            continue;
        }

        ctx.output.step(&format!(
            "{} manifests changed: {}",
            family.name(),
            manifests.join(", ")
        ));

        if let Some(err) = sync_family(ctx, family, &manifests)? {
            first_failure.get_or_insert(err);
        }
    }

    match first_failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

/// Install one family's dependencies, returning its failure if any
fn sync_family(ctx: &HookContext, family: ManifestFamily, manifests: &[String]) -> Result<Option<HookError>> {
    let steps = match family {
        ManifestFamily::Node => {
            let (program, args) = node_install_command(&ctx.root);
            vec![CommandSpec::new(program, &ctx.root).args(args.iter().copied())]
        }
        ManifestFamily::Python => {
            let python = ctx.python_env();
            match python.ensure(&ctx.config.python.interpreter, ctx.runner, ctx.output) {
                Ok(VenvStatus::InterpreterMissing) => return Ok(None),
                Ok(_) => {}
                Err(err) => return failure_of(err),
            }
            manifests
                .iter()
                .map(|file| {
                    CommandSpec::new(python.python(), &ctx.root)
                        .args(pip_install_args(file))
                        .env(&ctx.config.python.env_var, python.bin_dir())
                })
                .collect()
        }
        ManifestFamily::Dotnet => {
            let restore = &ctx.config.hooks.post_merge.dotnet_restore;
            if restore.is_empty() {
                return Ok(None);
            }
            vec![CommandSpec::from_argv(restore, &ctx.root)?]
        }
    };

    let label = format!("{} dependencies", family.name());
    for spec in &steps {
        if let StepOutcome::Failed { code } = ctx.run_step(&label, spec)? {
            return Ok(Some(HookError::step_failed(spec.display(), code)));
        }
    }
    Ok(None)
}

fn failure_of(err: anyhow::Error) -> Result<Option<HookError>> {
    match err.downcast::<HookError>() {
        Ok(hook_error) => Ok(Some(hook_error)),
        Err(other) => Err(other),
    }
}
