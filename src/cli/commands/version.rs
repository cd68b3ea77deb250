use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct VersionArgs {
    /// Show detailed version information
    #[arg(long = "detailed")]
    pub detailed: bool,
}

pub async fn execute(args: VersionArgs) -> Result<()> {
    let git_sha = option_env!("GIT_SHA").unwrap_or("unknown");

    println!("monohook {} ({git_sha})", crate::VERSION);
    if args.detailed {
        println!("Rust Edition: 2024");
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Description: {}", env!("CARGO_PKG_DESCRIPTION"));
    }
    Ok(())
}
