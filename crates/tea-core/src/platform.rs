//! Platform abstraction traits for runtime services.
//!
//! Timers and host loops ask the platform for time through [`Clock`] so the
//! core never reads the system clock directly.

use std::time::Duration;

/// Monotonic time source.
pub trait Clock {
    /// Time elapsed since the clock's origin. Never decreases.
    fn now(&self) -> Duration;

    /// Milliseconds elapsed since `since`, saturating at zero.
    fn elapsed_millis(&self, since: Duration) -> u64 {
        let elapsed = self.now().saturating_sub(since);
        u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}
