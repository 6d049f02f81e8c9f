//! Injectable time sources.
//!
//! The poller needs a monotonic clock for cooldown and suspension
//! arithmetic; the session gate needs wall-clock epoch milliseconds to
//! match the flag format on disk. Both are traits so tests drive time
//! by hand instead of sleeping.

use std::time::Instant;

/// Monotonic time source for the poll loop.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// The real monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Wall-clock time source for the session gate, in epoch milliseconds.
pub trait WallClock {
    fn epoch_ms(&self) -> u64;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemWallClock;

impl WallClock for SystemWallClock {
    fn epoch_ms(&self) -> u64 {
        chrono::Utc::now().timestamp_millis() as u64
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    /// Manually advanced monotonic clock shared between test and poller.
    #[derive(Clone)]
    pub struct ManualClock {
        start: Instant,
        offset: Rc<Cell<Duration>>,
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self { start: Instant::now(), offset: Rc::new(Cell::new(Duration::ZERO)) }
        }

        pub fn advance(&self, by: Duration) {
            self.offset.set(self.offset.get() + by);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.start + self.offset.get()
        }
    }

    /// Manually set wall clock.
    #[derive(Clone)]
    pub struct ManualWallClock {
        pub now_ms: Rc<Cell<u64>>,
    }

    impl ManualWallClock {
        pub fn at(ms: u64) -> Self {
            Self { now_ms: Rc::new(Cell::new(ms)) }
        }
    }

    impl WallClock for ManualWallClock {
        fn epoch_ms(&self) -> u64 {
            self.now_ms.get()
        }
    }
}
