//! Capture subcommand handlers for coupon-sniper.

use chrono::Utc;

use crate::cli::Commands;
use crate::client::CaptureClient;
use crate::render::{render, status_line};

/// Handle a control subcommand against a running server.
pub(crate) async fn handle_capture_command(
    client: &CaptureClient,
    command: Commands,
) -> anyhow::Result<()> {
    match command {
        Commands::Start {
            filter,
            schedule,
            tab,
        } => {
            let scheduled = schedule.is_some();
            client.start(tab, filter, schedule).await?;
            if scheduled {
                println!("Capture scheduled.");
            } else {
                println!("Capture started.");
            }
            print_status(client).await
        }
        Commands::Pause { minutes } => {
            client.pause(minutes).await?;
            print_status(client).await
        }
        Commands::Cancel => {
            client.cancel().await?;
            println!("Capture cancelled.");
            Ok(())
        }
        Commands::Status => print_status(client).await,
        Commands::Watch => {
            client
                .watch(|record| {
                    println!(
                        "{} {}",
                        Utc::now().format("%H:%M:%S"),
                        status_line(record.as_ref(), Utc::now())
                    );
                })
                .await
        }
        Commands::Run => anyhow::bail!("`run` is not a control command"),
    }
}

async fn print_status(client: &CaptureClient) -> anyhow::Result<()> {
    let state = client.snapshot().await?;
    print!("{}", render(state.as_ref(), Utc::now()));
    Ok(())
}
