use anyhow::Result;
use clap::Args;

use crate::cli::Session;
use crate::hooks::{HookKind, LanguageClassification, ManifestFamily};

#[derive(Args)]
pub struct ClassifyArgs {
    /// Files to classify (default: staged files)
    pub paths: Vec<String>,
}

pub async fn execute(args: ClassifyArgs, session: &Session) -> Result<()> {
    let files = if args.paths.is_empty() {
        HookKind::PreCommit.collect_files(&session.repo()?)?
    } else {
        args.paths
    };

    let classification = LanguageClassification::classify(&files);
    // Plain line for scripts, even with --quiet
    println!("{classification}");

    if session.output.is_quiet() {
        return Ok(());
    }

    for family in ManifestFamily::ALL {
        let manifests = family.matching(&files)?;
        if manifests.is_empty() {
            continue;
        }
        session.output.step(&format!("{} manifests", family.name()));
        for manifest in &manifests {
            session.output.list_item(manifest);
        }
    }
    Ok(())
}
