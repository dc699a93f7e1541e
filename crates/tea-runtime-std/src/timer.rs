//! Timer wheel driven by a [`Clock`]. Deadlines only fire when the host loop
//! calls [`Timers::fire_due`].

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use tea_core::Clock;

#[derive(Default)]
struct TimerState {
    fired: Cell<bool>,
    waker: RefCell<Option<Waker>>,
}

struct TimerEntry {
    deadline: Duration,
    state: Weak<TimerState>,
}

pub struct Timers<C: Clock> {
    clock: C,
    entries: RefCell<Vec<TimerEntry>>,
}

impl<C: Clock> Timers<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            entries: RefCell::new(Vec::new()),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Future completing once `duration` has elapsed on this wheel's clock.
    pub fn sleep(&self, duration: Duration) -> Sleep {
        let state = Rc::new(TimerState::default());
        let deadline = self.clock.now() + duration;
        self.entries.borrow_mut().push(TimerEntry {
            deadline,
            state: Rc::downgrade(&state),
        });
        Sleep { state }
    }

    /// Completes every expired timer and returns how many fired. Timers
    /// whose `Sleep` was dropped are discarded without counting.
    pub fn fire_due(&self) -> usize {
        let now = self.clock.now();
        let due: Vec<Rc<TimerState>> = {
            let mut entries = self.entries.borrow_mut();
            let mut due = Vec::new();
            entries.retain(|entry| match entry.state.upgrade() {
                Some(state) if entry.deadline <= now => {
                    due.push(state);
                    false
                }
                Some(_) => true,
                None => false,
            });
            due
        };
        for state in &due {
            state.fired.set(true);
            let waker = state.waker.borrow_mut().take();
            if let Some(waker) = waker {
                waker.wake();
            }
        }
        due.len()
    }

    /// Earliest deadline among timers still awaited.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.state.strong_count() > 0)
            .map(|entry| entry.deadline)
            .min()
    }

    pub fn pending(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.state.strong_count() > 0)
            .count()
    }
}

/// Returned by [`Timers::sleep`].
pub struct Sleep {
    state: Rc<TimerState>,
}

impl Sleep {
    pub fn is_elapsed(&self) -> bool {
        self.state.fired.get()
    }
}

impl Future for Sleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.state.fired.get() {
            return Poll::Ready(());
        }
        *self.state.waker.borrow_mut() = Some(cx.waker().clone());
        Poll::Pending
    }
}
