use std::path::PathBuf;
use std::time::Duration;

use presence_core::clock::SystemWallClock;
use presence_core::session::{FileSessionStore, SessionGate};

/// Kiosk configuration, loaded from environment variables.
pub struct Config {
    /// Base URL of the recognition/attendance service.
    pub api_url: String,
    /// V4L2 device path (default: /dev/video0).
    pub camera_device: String,
    /// Minimum milliseconds between notifications for one identity.
    pub cooldown_ms: u64,
    /// Milliseconds the recognized banner stays up (capture paused).
    pub display_ms: u64,
    /// Path to the admin session flag file.
    pub session_path: PathBuf,
    /// Admin session inactivity window in seconds.
    pub session_ttl_secs: u64,
}

impl Config {
    /// Load configuration from `PRESENCE_*` environment variables with defaults.
    pub fn from_env() -> Self {
        let data_dir = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(home).join(".local/share")
            })
            .join("presence");

        let session_path = std::env::var("PRESENCE_SESSION_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("session.json"));

        Self {
            api_url: std::env::var("PRESENCE_API_URL")
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),
            camera_device: std::env::var("PRESENCE_CAMERA_DEVICE")
                .unwrap_or_else(|_| "/dev/video0".to_string()),
            cooldown_ms: env_u64("PRESENCE_COOLDOWN_MS", 2000),
            display_ms: env_u64("PRESENCE_DISPLAY_MS", 1000),
            session_path,
            session_ttl_secs: env_u64("PRESENCE_SESSION_TTL_SECS", 600),
        }
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn display(&self) -> Duration {
        Duration::from_millis(self.display_ms)
    }

    /// The admin session gate backed by the configured flag file.
    pub fn session_gate(&self) -> SessionGate<FileSessionStore, SystemWallClock> {
        SessionGate::new(
            FileSessionStore::new(self.session_path.clone()),
            SystemWallClock,
            Duration::from_secs(self.session_ttl_secs),
        )
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
