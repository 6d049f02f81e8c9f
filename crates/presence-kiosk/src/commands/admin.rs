//! `presence login` / `logout` / `passwd` — admin session management.

use anyhow::{bail, Result};
use presence_api::{ApiClient, ApiError};

use super::{prompt, require_session};
use crate::config::Config;

pub async fn login(config: &Config) -> Result<()> {
    let gate = config.session_gate();
    if gate.check().is_ok() {
        println!("Already logged in.");
        return Ok(());
    }

    let password = prompt("Admin password: ")?;
    let client = ApiClient::new(&config.api_url);

    if client.verify_admin(&password).await? {
        gate.establish()?;
        println!("Login successful.");
        Ok(())
    } else {
        bail!("invalid password")
    }
}

pub fn logout(config: &Config) -> Result<()> {
    config.session_gate().clear()?;
    println!("Logged out.");
    Ok(())
}

pub async fn passwd(config: &Config) -> Result<()> {
    require_session(&config.session_gate())?;

    let old = prompt("Current password: ")?;
    let new = prompt("New password: ")?;
    if new.is_empty() {
        bail!("new password must not be empty");
    }

    let client = ApiClient::new(&config.api_url);
    match client.update_password(&old, &new).await {
        Ok(message) => {
            println!("{message}");
            Ok(())
        }
        Err(ApiError::Remote { message, .. }) => bail!("{message}"),
        Err(err) => Err(err.into()),
    }
}
