use clap::Parser;
use std::process::ExitCode;

use monohook::{Cli, exit_code_for};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = exit_code_for(&err);
            eprintln!("{} {err:#}", console::style("✖").red());
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
