use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "presence", about = "Face-recognition attendance kiosk client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the live recognition view
    Watch,
    /// Enroll a new student from the camera
    Enroll {
        /// Student name
        #[arg(short, long)]
        name: String,
        /// Mobile number (optional)
        #[arg(long)]
        mobile: Option<String>,
        /// Email address (optional)
        #[arg(long)]
        email: Option<String>,
        /// Show a live detection overlay for this many seconds before capturing
        #[arg(long, default_value_t = 0)]
        preview_secs: u64,
        /// If the student already exists, replace the stored facial data
        #[arg(long)]
        update_face: bool,
    },
    /// Log in as admin
    Login,
    /// Clear the admin session
    Logout,
    /// Show attendance summary and weekly counts (admin)
    Dashboard {
        /// Week to show: 0 = current, -1 = last week, 1 = next week
        #[arg(long, default_value_t = 0)]
        week_offset: i32,
    },
    /// Export all attendance records as CSV (admin)
    Export {
        /// Output file path
        #[arg(short, long, default_value = "attendance_records.csv")]
        output: PathBuf,
    },
    /// Change the admin password (admin)
    Passwd,
    /// Run camera diagnostics
    Test,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Watch => commands::watch::run(&config).await,
        Commands::Enroll {
            name,
            mobile,
            email,
            preview_secs,
            update_face,
        } => commands::enroll::run(&config, name, mobile, email, preview_secs, update_face).await,
        Commands::Login => commands::admin::login(&config).await,
        Commands::Logout => commands::admin::logout(&config),
        Commands::Dashboard { week_offset } => commands::dashboard::run(&config, week_offset).await,
        Commands::Export { output } => commands::export::run(&config, &output).await,
        Commands::Passwd => commands::admin::passwd(&config).await,
        Commands::Test => commands::camtest::run(&config),
    }
}
