use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hrm-sync")]
#[command(about = "Reconcile biometric terminal punches into daily attendance")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API (default)
    Serve,
    /// Sync attendance once and exit
    Sync {
        /// Date to sync in YYYY-MM-DD format. Defaults to yesterday.
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<NaiveDate>,
        /// ID of a specific device to sync
        #[arg(long, value_name = "ID")]
        device: Option<u64>,
    },
}
