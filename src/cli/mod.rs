//! Command-line interface for monohook
//!
//! Global flags are shared by every subcommand; each subcommand lives in its
//! own module under `commands`.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;

pub use output::Output;

use crate::config::MonohookConfig;
use crate::git::GitRepo;

#[derive(Parser)]
#[command(
    name = "monohook",
    version = env!("CARGO_PKG_VERSION"),
    about = "Git hooks, Nx workspace repair and safe task running for polyglot monorepos",
    long_about = "Git hooks for polyglot monorepos built on Nx.\n\n\
                  monohook dispatches pre-commit, post-merge and pre-push work to the \
                  Node, Python and .NET toolchains of an Nx monorepo, repairs Nx workspace \
                  metadata, and wraps bulk Nx runs so an empty project selection does not \
                  fail a pipeline."
)]
pub struct Cli {
    /// Run as if started in <DIR> instead of current working directory
    #[arg(short = 'C', long = "directory", global = true)]
    pub directory: Option<String>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use custom configuration file
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a git hook
    Run(commands::run::RunArgs),
    /// Repair Nx workspace metadata and verify the Nx CLI
    Repair(commands::repair::RepairArgs),
    /// Run `nx run-many`, treating "no projects matched" as success
    #[command(disable_help_flag = true)]
    Nx(commands::nx::NxArgs),
    /// Install git hooks into the current repository
    Install(commands::install::InstallArgs),
    /// Remove hooks installed by monohook
    Uninstall(commands::uninstall::UninstallArgs),
    /// Show which languages a set of files belongs to
    Classify(commands::classify::ClassifyArgs),
    /// Configuration management
    Config(commands::config::ConfigArgs),
    /// Show version information
    Version(commands::version::VersionArgs),
}

/// Where a command runs and how it reports
pub struct Session {
    pub root: PathBuf,
    pub output: Output,
    custom_config: Option<String>,
}

impl Session {
    /// Effective configuration for this workspace
    pub fn config(&self) -> Result<MonohookConfig> {
        MonohookConfig::load(&self.root, self.custom_config.as_deref())
    }

    pub fn repo(&self) -> Result<GitRepo> {
        GitRepo::discover(&self.root)
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir).with_context(|| format!("Cannot change directory to {dir}"))?;
        }

        setup_logging(self.verbose, self.quiet);

        let Some(command) = self.command else {
            Cli::command().print_help()?;
            return Ok(());
        };

        let session = Session {
            root: workspace_root()?,
            output: Output::new(self.verbose > 0, self.quiet),
            custom_config: self.config,
        };
        tracing::debug!("Workspace root: {}", session.root.display());

        match command {
            Commands::Run(args) => commands::run::execute(args, &session).await,
            Commands::Repair(args) => commands::repair::execute(args, &session).await,
            Commands::Nx(args) => commands::nx::execute(args, &session).await,
            Commands::Install(args) => commands::install::execute(args, &session).await,
            Commands::Uninstall(args) => commands::uninstall::execute(args, &session).await,
            Commands::Classify(args) => commands::classify::execute(args, &session).await,
            Commands::Config(args) => commands::config::execute(args, &session).await,
            Commands::Version(args) => commands::version::execute(args).await,
        }
    }
}

/// Git working tree root, or the current directory outside a repository
fn workspace_root() -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Cannot read current directory")?;
    match GitRepo::discover(&cwd).and_then(|repo| repo.workdir()) {
        Ok(root) => Ok(root),
        Err(err) => {
            tracing::debug!("Not inside a git work tree ({err}); using {}", cwd.display());
            Ok(cwd)
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => tracing_subscriber::EnvFilter::new("warn"),
        1 => tracing_subscriber::EnvFilter::new("info,globset=warn"),
        2 => tracing_subscriber::EnvFilter::new("debug,globset=warn"),
        _ => tracing_subscriber::EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
