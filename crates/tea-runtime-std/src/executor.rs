//! Single-threaded task pool for command futures.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::task::{Context, Poll};

use futures_task::{waker, ArcWake, LocalFutureObj, LocalSpawn, SpawnError};

type WakeCallback = Arc<dyn Fn() + Send + Sync + 'static>;

/// Shared between the executor and every task waker.
struct WakeSignal {
    requested: AtomicBool,
    callback: RwLock<Option<WakeCallback>>,
}

impl WakeSignal {
    fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
        let callback = match self.callback.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        if let Some(callback) = callback {
            callback();
        }
    }
}

struct TaskWaker {
    woken: AtomicBool,
    signal: Arc<WakeSignal>,
}

impl ArcWake for TaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.woken.store(true, Ordering::SeqCst);
        arc_self.signal.request();
    }
}

struct Task {
    future: LocalFutureObj<'static, ()>,
    waker: Arc<TaskWaker>,
}

/// Polls spawned futures on the calling thread when asked to. Nothing runs
/// in the background; a host loop calls [`StdExecutor::run_until_stalled`].
pub struct StdExecutor {
    // A slot is `None` while its task is being polled or after it finished.
    // New tasks are always appended; empty slots are only trimmed from the
    // tail once a run has finished.
    tasks: RefCell<Vec<Option<Task>>>,
    signal: Arc<WakeSignal>,
}

impl StdExecutor {
    pub fn new() -> Self {
        Self {
            tasks: RefCell::new(Vec::new()),
            signal: Arc::new(WakeSignal {
                requested: AtomicBool::new(false),
                callback: RwLock::new(None),
            }),
        }
    }

    /// Polls every woken task until none is ready to make progress.
    /// Returns the number of polls performed.
    pub fn run_until_stalled(&self) -> usize {
        let mut polls = 0;
        loop {
            let ready: Vec<usize> = self
                .tasks
                .borrow()
                .iter()
                .enumerate()
                .filter_map(|(index, slot)| match slot {
                    Some(task) if task.waker.woken.swap(false, Ordering::SeqCst) => Some(index),
                    _ => None,
                })
                .collect();
            if ready.is_empty() {
                break;
            }
            for index in ready {
                let taken = self.tasks.borrow_mut()[index].take();
                let Some(mut task) = taken else {
                    continue;
                };
                let task_waker = waker(Arc::clone(&task.waker));
                let mut cx = Context::from_waker(&task_waker);
                polls += 1;
                match Pin::new(&mut task.future).poll(&mut cx) {
                    Poll::Ready(()) => log::trace!("task {index} finished"),
                    Poll::Pending => self.tasks.borrow_mut()[index] = Some(task),
                }
            }
        }
        self.compact();
        polls
    }

    pub fn has_pending_tasks(&self) -> bool {
        self.tasks.borrow().iter().any(Option::is_some)
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.borrow().iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns whether a task was spawned or woken since the last call.
    pub fn take_wake_request(&self) -> bool {
        self.signal.requested.swap(false, Ordering::SeqCst)
    }

    /// Registers a callback invoked whenever a task is spawned or woken, from
    /// whichever thread did the waking.
    pub fn set_wake_callback(&self, callback: impl Fn() + Send + Sync + 'static) {
        self.replace_callback(Some(Arc::new(callback)));
    }

    pub fn clear_wake_callback(&self) {
        self.replace_callback(None);
    }

    fn replace_callback(&self, callback: Option<WakeCallback>) {
        match self.signal.callback.write() {
            Ok(mut guard) => *guard = callback,
            Err(poisoned) => *poisoned.into_inner() = callback,
        }
    }

    fn compact(&self) {
        let mut tasks = self.tasks.borrow_mut();
        while matches!(tasks.last(), Some(None)) {
            tasks.pop();
        }
    }
}

impl Default for StdExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSpawn for StdExecutor {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        let task = Task {
            future,
            waker: Arc::new(TaskWaker {
                woken: AtomicBool::new(true),
                signal: Arc::clone(&self.signal),
            }),
        };
        self.tasks.borrow_mut().push(Some(task));
        self.signal.request();
        Ok(())
    }
}

impl fmt::Debug for StdExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdExecutor")
            .field("pending_tasks", &self.pending_tasks())
            .field(
                "wake_requested",
                &self.signal.requested.load(Ordering::SeqCst),
            )
            .finish()
    }
}
