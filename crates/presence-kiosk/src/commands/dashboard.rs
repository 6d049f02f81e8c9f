//! `presence dashboard` — the summary cards and weekly chart, as text.

use anyhow::Result;
use presence_api::ApiClient;

use super::require_session;
use crate::config::Config;

pub async fn run(config: &Config, week_offset: i32) -> Result<()> {
    require_session(&config.session_gate())?;
    let client = ApiClient::new(&config.api_url);

    let (today, absent, total) = tokio::try_join!(
        client.students_today(),
        client.students_absent_today(),
        client.total_students(),
    )?;

    println!("Present today : {today}");
    println!("Absent today  : {absent}");
    println!("Total students: {total}");

    let week = client.weekly_attendance(week_offset).await?;
    println!();
    match week_offset {
        0 => println!("Weekly attendance (current week):"),
        n => println!("Weekly attendance (offset {n:+}):"),
    }
    for (date, count) in week.dates.iter().zip(week.counts.iter()) {
        println!("  {date}  {count}");
    }

    Ok(())
}
