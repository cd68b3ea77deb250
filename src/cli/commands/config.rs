use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::Session;
use crate::config::ConfigFormat;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Display current merged configuration
    Show {
        /// Output format
        #[arg(short, long, value_enum, default_value = "toml")]
        format: ConfigFormat,
    },
}

pub async fn execute(args: ConfigArgs, session: &Session) -> Result<()> {
    match args.command {
        ConfigCommand::Show { format } => {
            tracing::debug!("Rendering merged configuration as {format:?}");
            let config = session.config()?;
            println!("{}", config.export(format)?);
        }
    }
    Ok(())
}
