//! Presence core — the recognition poll loop and its supporting policy
//! objects, plus the admin session gate and CSV export.
//!
//! Everything here talks to the outside world through traits
//! ([`poller::FrameSource`], [`poller::Recognizer`], [`clock::Clock`],
//! [`session::SessionStore`]) so the loop and expiry logic are testable
//! without a camera, a network, or real timers.

pub mod clock;
pub mod debounce;
pub mod export;
pub mod poller;
pub mod session;
pub mod types;

pub use clock::{Clock, MonotonicClock, SystemWallClock, WallClock};
pub use debounce::DebounceState;
pub use poller::{Poller, PollerEvents, PollerOptions, PollerStatus};
pub use types::{AttendanceRecord, BoundingBox, DetectedFace, Frame, WeeklyAttendance};
