//! Per-identity notification cooldown.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Tracks, per identity, when a notification was last raised.
///
/// Owned by one poller activation and mutated only from within its
/// active iteration. An identity passes at most once per cooldown
/// window; [`should_notify`](DebounceState::should_notify) is the
/// single mutation point.
#[derive(Debug)]
pub struct DebounceState {
    cooldown: Duration,
    last_notified: HashMap<String, Instant>,
}

impl DebounceState {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown, last_notified: HashMap::new() }
    }

    /// Returns true (and records `now`) if `name` has not been notified
    /// within the cooldown window; false leaves the recorded time
    /// untouched so the window is anchored at the last notification,
    /// not the last sighting.
    pub fn should_notify(&mut self, name: &str, now: Instant) -> bool {
        if let Some(&last) = self.last_notified.get(name) {
            if now.duration_since(last) < self.cooldown {
                return false;
            }
        }
        self.last_notified.insert(name.to_string(), now);
        true
    }
}
