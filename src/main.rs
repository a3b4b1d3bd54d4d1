use std::process::ExitCode;

use clap::Parser;
use gittyup::cli::{self, Cli};
use gittyup::output;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    match cli::run(args).await {
        Ok(code) => code,
        Err(err) => {
            output::print_error(&err.to_string());
            ExitCode::FAILURE
        }
    }
}
