use anyhow::Result;
use clap::Args;

use crate::cli::Session;
use crate::external::{Platform, SystemRunner};
use crate::repair::{WorkspaceRepair, WriteOutcome, verify_tool};

#[derive(Args)]
pub struct RepairArgs {
    /// Do not run the Nx version check afterwards
    #[arg(long)]
    pub skip_verify: bool,

    /// Report what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn execute(args: RepairArgs, session: &Session) -> Result<()> {
    let config = session.config()?;
    let output = &session.output;

    output.header(if args.dry_run {
        "Nx workspace repair (dry run)"
    } else {
        "Nx workspace repair"
    });

    let report = WorkspaceRepair::new(&session.root, &config.repair, Platform::current())
        .dry_run(args.dry_run)
        .run()?;

    for entry in &report.entries {
        let result = match &entry.detail {
            Some(detail) => format!("{} ({detail})", entry.outcome),
            None => entry.outcome.to_string(),
        };
        output.action_result(&entry.artifact, &result, entry.outcome != WriteOutcome::Unchanged);
    }

    if report.changed() == 0 {
        output.info("Workspace already in order");
    }

    if args.skip_verify || args.dry_run {
        return Ok(());
    }

    verify_tool(&session.root, &config.repair, &SystemRunner, output)?;
    Ok(())
}
