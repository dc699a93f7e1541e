use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tea_core::Clock;

/// Clock implementation backed by [`std::time`].
#[derive(Debug, Clone)]
pub struct StdClock {
    origin: Instant,
}

impl StdClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn origin(&self) -> Instant {
        self.origin
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for StdClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Moves the clock to `to`; earlier values are ignored to stay monotonic.
    pub fn set(&self, to: Duration) {
        if to > self.now.get() {
            self.now.set(to);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_is_shared_and_monotonic() {
        let clock = ManualClock::new();
        let view = clock.clone();
        clock.advance(Duration::from_millis(250));
        assert_eq!(view.now(), Duration::from_millis(250));
        clock.set(Duration::from_millis(100));
        assert_eq!(view.now(), Duration::from_millis(250));
        clock.set(Duration::from_secs(1));
        assert_eq!(view.elapsed_millis(Duration::from_millis(400)), 600);
        assert_eq!(view.elapsed_millis(Duration::from_secs(5)), 0);
    }

    #[test]
    fn std_clock_moves_forward() {
        let clock = StdClock::new();
        let first = clock.now();
        assert!(clock.now() >= first);
    }
}
