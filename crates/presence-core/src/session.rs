//! Admin session gate.
//!
//! The dashboard, export, and password commands are gated behind a
//! persisted flag `{ authenticated, timestamp }`. The window is
//! sliding: every successful check refreshes the timestamp, and a flag
//! older than the inactivity window is cleared and reported expired.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::WallClock;

/// Default inactivity window: 10 minutes.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("not logged in")]
    NotAuthenticated,
    #[error("session expired")]
    Expired,
    #[error("session store error: {0}")]
    Store(#[from] std::io::Error),
}

/// The persisted flag, epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFlag {
    pub authenticated: bool,
    pub timestamp: u64,
}

/// Persistence seam for the flag, so expiry is testable without disk.
pub trait SessionStore {
    fn load(&self) -> Result<Option<SessionFlag>, SessionError>;
    fn save(&self, flag: &SessionFlag) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// JSON-file store under the configured session path.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionFlag>, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(flag) => Ok(Some(flag)),
                Err(err) => {
                    // A mangled flag is treated the same as no flag.
                    tracing::warn!(path = %self.path.display(), error = %err, "discarding unreadable session flag");
                    Ok(None)
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, flag: &SessionFlag) -> Result<(), SessionError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let raw = serde_json::to_string(flag).map_err(std::io::Error::other)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Checks, refreshes, establishes, and clears the admin session.
pub struct SessionGate<S, C> {
    store: S,
    clock: C,
    ttl: Duration,
}

impl<S: SessionStore, C: WallClock> SessionGate<S, C> {
    pub fn new(store: S, clock: C, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    /// Verify the session is live. On success the timestamp is
    /// refreshed, extending the window; a stale flag is cleared before
    /// reporting [`SessionError::Expired`].
    pub fn check(&self) -> Result<(), SessionError> {
        let flag = self.store.load()?.ok_or(SessionError::NotAuthenticated)?;
        if !flag.authenticated {
            return Err(SessionError::NotAuthenticated);
        }

        let now = self.clock.epoch_ms();
        let age_ms = now.saturating_sub(flag.timestamp);
        if age_ms > self.ttl.as_millis() as u64 {
            self.store.clear()?;
            return Err(SessionError::Expired);
        }

        self.store.save(&SessionFlag { authenticated: true, timestamp: now })
    }

    /// Write a fresh authenticated flag after a successful login.
    pub fn establish(&self) -> Result<(), SessionError> {
        self.store.save(&SessionFlag {
            authenticated: true,
            timestamp: self.clock.epoch_ms(),
        })
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        self.store.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::test_support::ManualWallClock;
    use tempfile::TempDir;

    const TEN_MINUTES_MS: u64 = 10 * 60 * 1000;

    fn gate_at(dir: &TempDir, now_ms: u64) -> (SessionGate<FileSessionStore, ManualWallClock>, ManualWallClock) {
        let clock = ManualWallClock::at(now_ms);
        let store = FileSessionStore::new(dir.path().join("session.json"));
        (SessionGate::new(store, clock.clone(), DEFAULT_SESSION_TTL), clock)
    }

    #[test]
    fn test_no_flag_is_not_authenticated() {
        let dir = TempDir::new().unwrap();
        let (gate, _clock) = gate_at(&dir, 1_000_000);
        assert!(matches!(gate.check(), Err(SessionError::NotAuthenticated)));
    }

    #[test]
    fn test_live_session_passes_and_refreshes() {
        let dir = TempDir::new().unwrap();
        let (gate, clock) = gate_at(&dir, 1_000_000);
        gate.establish().unwrap();

        clock.now_ms.set(1_000_000 + 5 * 60 * 1000);
        gate.check().unwrap();

        // Refreshed: another full window from the last check is fine.
        clock.now_ms.set(1_000_000 + 5 * 60 * 1000 + TEN_MINUTES_MS);
        gate.check().unwrap();
    }

    #[test]
    fn test_stale_flag_cleared_and_expired() {
        let dir = TempDir::new().unwrap();
        let (gate, clock) = gate_at(&dir, 1_000_000);
        gate.establish().unwrap();

        // 11 minutes later: expired, and the flag is gone.
        clock.now_ms.set(1_000_000 + 11 * 60 * 1000);
        assert!(matches!(gate.check(), Err(SessionError::Expired)));
        assert!(matches!(gate.check(), Err(SessionError::NotAuthenticated)));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let (gate, _clock) = gate_at(&dir, 0);
        gate.clear().unwrap();
        gate.establish().unwrap();
        gate.clear().unwrap();
        gate.clear().unwrap();
    }

    #[test]
    fn test_mangled_flag_treated_as_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = FileSessionStore::new(path);
        let gate = SessionGate::new(store, ManualWallClock::at(0), DEFAULT_SESSION_TTL);
        assert!(matches!(gate.check(), Err(SessionError::NotAuthenticated)));
    }

    #[test]
    fn test_unauthenticated_flag_rejected() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store
            .save(&SessionFlag { authenticated: false, timestamp: 1_000_000 })
            .unwrap();
        let gate = SessionGate::new(store, ManualWallClock::at(1_000_000), DEFAULT_SESSION_TTL);
        assert!(matches!(gate.check(), Err(SessionError::NotAuthenticated)));
    }
}
