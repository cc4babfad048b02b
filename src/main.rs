//! coupon-sniper - automated coupon capture over a browser tab
//!
//! Main entry point for the coupon-sniper server and control CLI.

mod cli;
mod client;
mod cmd_capture;
mod render;
mod server;

use clap::Parser;

use sniper_config::ConfigLoader;

use crate::cli::{Cli, Commands};
use crate::client::CaptureClient;
use crate::cmd_capture::handle_capture_command;
use crate::server::{init_tracing, run_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ConfigLoader::load_or_default(&cli.config)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            init_tracing()?;
            run_server(config).await
        }
        command => {
            let base_url = cli.server.unwrap_or_else(|| config.server.base_url());
            let client = CaptureClient::new(base_url);
            handle_capture_command(&client, command).await
        }
    }
}
