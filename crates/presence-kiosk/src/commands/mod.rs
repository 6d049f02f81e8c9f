pub mod admin;
pub mod camtest;
pub mod dashboard;
pub mod enroll;
pub mod export;
pub mod watch;

use anyhow::bail;
use presence_core::clock::SystemWallClock;
use presence_core::session::{FileSessionStore, SessionError, SessionGate};

/// Gate an admin command behind a live session. The CLI analogue of the
/// dashboard redirect: expired or missing sessions point at `login`.
pub(crate) fn require_session(
    gate: &SessionGate<FileSessionStore, SystemWallClock>,
) -> anyhow::Result<()> {
    match gate.check() {
        Ok(()) => Ok(()),
        Err(SessionError::Expired) => bail!("session expired; run `presence login`"),
        Err(SessionError::NotAuthenticated) => bail!("not logged in; run `presence login`"),
        Err(err) => Err(err.into()),
    }
}

/// Prompt on stdout and read one trimmed line from stdin.
pub(crate) fn prompt(label: &str) -> anyhow::Result<String> {
    use std::io::Write;
    print!("{label}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
