//! `presence export` — write all attendance records as a CSV file.

use std::path::Path;

use anyhow::{Context, Result};
use presence_api::ApiClient;
use presence_core::export::attendance_csv;

use super::require_session;
use crate::config::Config;

pub async fn run(config: &Config, output: &Path) -> Result<()> {
    require_session(&config.session_gate())?;
    let client = ApiClient::new(&config.api_url);

    let records = client.attendance_all().await?;
    if records.is_empty() {
        println!("No attendance records found.");
        return Ok(());
    }

    let csv = attendance_csv(&records);
    std::fs::write(output, csv)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("Exported {} records to {}", records.len(), output.display());
    Ok(())
}
