//! Standard runtime services backed by Rust's `std` library.
//!
//! This crate provides the executor, clock and timers that a headless host
//! loop needs to run `tea-core` programs whose commands await futures.
//! Construct a [`StdRuntime`] and hand its [`StdRuntime::spawner`] to
//! `Program::with_spawner`.

mod clock;
mod executor;
mod timer;

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use futures_task::LocalSpawn;
use tea_core::Clock;

pub use clock::{ManualClock, StdClock};
pub use executor::StdExecutor;
pub use timer::{Sleep, Timers};

/// Convenience container bundling the executor, timers and clock.
pub struct StdRuntime<C: Clock = StdClock> {
    executor: Rc<StdExecutor>,
    timers: Rc<Timers<C>>,
}

impl StdRuntime<StdClock> {
    /// Creates a runtime driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(StdClock::new())
    }
}

impl<C: Clock> StdRuntime<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            executor: Rc::new(StdExecutor::new()),
            timers: Rc::new(Timers::new(clock)),
        }
    }

    /// Spawner to pass to `Program::with_spawner`.
    pub fn spawner(&self) -> Rc<dyn LocalSpawn> {
        self.executor.clone()
    }

    pub fn executor(&self) -> Rc<StdExecutor> {
        Rc::clone(&self.executor)
    }

    /// Timer wheel, shareable with `update` closures that issue sleeps.
    pub fn timers(&self) -> Rc<Timers<C>> {
        Rc::clone(&self.timers)
    }

    pub fn clock(&self) -> &C {
        self.timers.clock()
    }

    pub fn sleep(&self, duration: Duration) -> Sleep {
        self.timers.sleep(duration)
    }

    /// Fires due timers and polls woken tasks until neither makes progress.
    /// Returns the number of timers fired plus task polls performed.
    pub fn pump(&self) -> usize {
        let mut work = 0;
        loop {
            let step = self.timers.fire_due() + self.executor.run_until_stalled();
            if step == 0 {
                return work;
            }
            work += step;
        }
    }

    /// Whether spawned tasks or armed timers remain.
    pub fn has_pending_work(&self) -> bool {
        self.executor.has_pending_tasks() || self.timers.pending() > 0
    }

    /// Returns whether a task was spawned or woken since the last call.
    pub fn take_wake_request(&self) -> bool {
        self.executor.take_wake_request()
    }

    /// Registers a callback invoked whenever a task is spawned or woken.
    pub fn set_wake_callback(&self, callback: impl Fn() + Send + Sync + 'static) {
        self.executor.set_wake_callback(callback);
    }

    pub fn clear_wake_callback(&self) {
        self.executor.clear_wake_callback();
    }
}

impl<C: Clock> fmt::Debug for StdRuntime<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdRuntime")
            .field("executor", &self.executor)
            .field("timers", &self.timers.pending())
            .field("now", &self.timers.clock().now())
            .finish()
    }
}

impl Default for StdRuntime<StdClock> {
    fn default() -> Self {
        Self::new()
    }
}
