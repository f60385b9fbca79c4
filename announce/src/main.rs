//! Announce registry server entry point

use announce::cli::{serve::ServeArgs, Cli, Commands};
use announce::logging;
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init().expect("failed to initialize logging");

    let result = match cli.command {
        Some(Commands::Client(args)) => announce::cli::client::execute(&args).await,
        Some(Commands::Serve(args)) => announce::cli::serve::execute(&args).await,
        // No subcommand - serve with environment configuration
        None => announce::cli::serve::execute(&ServeArgs::from_env()).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
