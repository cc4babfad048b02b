//! CLI definitions for coupon-sniper.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// coupon-sniper CLI.
#[derive(Parser)]
#[command(name = "coupon-sniper")]
#[command(about = "Automated coupon capture over a browser tab")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    /// Base URL of a running server (default: from the config's [server] section)
    #[arg(short, long, env = "COUPON_SNIPER_SERVER", global = true)]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub(crate) enum Commands {
    /// Connect to the browser and serve the capture API in foreground (default)
    Run,

    /// Start a capture now, or schedule one
    Start {
        /// Only claim coupons whose card text contains this
        #[arg(short, long, default_value = "")]
        filter: String,

        /// Wall-clock start time (HH:MM or HH:MM:SS)
        #[arg(long)]
        schedule: Option<String>,

        /// Tab to capture in (default: the browser's active tab)
        #[arg(long)]
        tab: Option<String>,
    },

    /// Pause the running capture
    Pause {
        /// Pause length in minutes
        #[arg(short, long)]
        minutes: Option<u64>,
    },

    /// Cancel the capture and forget its record
    Cancel,

    /// Show the current capture record
    Status,

    /// Follow the capture record as it changes
    Watch,
}
