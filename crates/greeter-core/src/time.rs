//! Clock seam used by the time-based gates.
//!
//! ```
//! use greeter_core::time::{GetElapsed, GetNow, SystemClock};
//! use std::time::Duration;
//!
//! fn cooled_down<C: GetElapsed>(clock: &C, fired_at: C::Instant, cooldown: Duration) -> bool {
//!     clock.elapsed(fired_at) > cooldown
//! }
//!
//! let clock = SystemClock;
//! let fired_at = clock.now();
//! assert!(!cooled_down(&clock, fired_at, Duration::from_secs(3600)));
//! ```

use std::time::Duration;

/// Each implementation picks its own instant representation
/// (`std::time::Instant` in production, a `Duration` offset in tests).
pub trait GetNow: Send + Sync + 'static {
    type Instant: Copy + Send + Sync + std::fmt::Debug + 'static;

    fn now(&self) -> Self::Instant;
}

pub trait GetElapsed: GetNow {
    fn elapsed(&self, since: Self::Instant) -> Duration;
}

/// Zero-sized; delegates to `std::time::Instant`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl GetNow for SystemClock {
    type Instant = std::time::Instant;

    #[inline]
    fn now(&self) -> std::time::Instant {
        std::time::Instant::now()
    }
}

impl GetElapsed for SystemClock {
    #[inline]
    fn elapsed(&self, since: std::time::Instant) -> Duration {
        since.elapsed()
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use mock::{MockClock, MockInstant};

#[cfg(any(test, feature = "test-support"))]
mod mock {
    use std::sync::{Arc, Mutex, PoisonError};
    use std::time::Duration;

    use super::{GetElapsed, GetNow};

    /// Manual clock: time moves only through [`advance`](MockClock::advance)
    /// and [`set`](MockClock::set). Clones share the same timeline.
    #[derive(Debug, Clone, Default)]
    pub struct MockClock {
        current: Arc<Mutex<Duration>>,
    }

    /// Offset from the mock clock's zero.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    pub struct MockInstant(pub Duration);

    impl MockClock {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn advance(&self, by: Duration) {
            *self.lock() += by;
        }

        pub fn set(&self, at: Duration) {
            *self.lock() = at;
        }

        pub fn current_time(&self) -> Duration {
            *self.lock()
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, Duration> {
            self.current.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl GetNow for MockClock {
        type Instant = MockInstant;

        fn now(&self) -> MockInstant {
            MockInstant(self.current_time())
        }
    }

    impl GetElapsed for MockClock {
        fn elapsed(&self, since: MockInstant) -> Duration {
            self.current_time().saturating_sub(since.0)
        }
    }
}
