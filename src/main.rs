use clap::Parser;

use release_tracker::cli::{Cli, Commands};
use release_tracker::config::init_config;
use release_tracker::interfaces::cli::run_cli_command;
use release_tracker::system::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = init_config(cli.config.as_deref());

    // Config generation writes to stdout only; skip the subscriber
    let _guard = if matches!(cli.command, Commands::Config { .. }) {
        None
    } else {
        Some(init_logging(&config.logging)?)
    };

    if let Err(e) = run_cli_command(cli.command, &config).await {
        eprintln!("{}", e.format_colored());
        std::process::exit(1);
    }

    Ok(())
}
