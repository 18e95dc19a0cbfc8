mod cli;

use clap::Parser;
use cli::Args;
use std::process;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    cli::setup_logging(args.verbose);

    if let Err(error) = cli::run(args).await {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}
