use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use futures_task::{LocalFutureObj, LocalSpawn, SpawnError};

use crate::command::Command;
use crate::diff::{diff, mount, DiffStats};
use crate::document::{Document, EventCallback, HostError};
use crate::patcher::{LiveTree, Patcher};
use crate::vnode::{Event, Handler, VNode};

/// Phase of the dispatch cycle a runtime is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Dispatching,
    Rendering,
    Diffing,
    Patching,
    /// A host failure left the live tree out of sync with the last render.
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramOptions {
    /// Log every applied patch at trace level.
    pub trace_patches: bool,
    /// Queue length at which a warning is logged once.
    pub queue_warning_depth: usize,
}

impl Default for ProgramOptions {
    fn default() -> Self {
        Self {
            trace_patches: false,
            queue_warning_depth: 64,
        }
    }
}

#[derive(Debug)]
pub enum RuntimeError {
    Host(HostError),
    Halted,
    NoExecutor,
    Spawn(SpawnError),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::Host(err) => write!(f, "host document failure: {err}"),
            RuntimeError::Halted => write!(f, "runtime halted after a host failure"),
            RuntimeError::NoExecutor => write!(f, "future command issued without an executor"),
            RuntimeError::Spawn(err) => write!(f, "failed to spawn command: {err}"),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuntimeError::Host(err) => Some(err),
            RuntimeError::Spawn(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HostError> for RuntimeError {
    fn from(err: HostError) -> Self {
        RuntimeError::Host(err)
    }
}

impl From<SpawnError> for RuntimeError {
    fn from(err: SpawnError) -> Self {
        RuntimeError::Spawn(err)
    }
}

trait DispatchTarget<Msg> {
    fn dispatch(&self, msg: Msg) -> Result<(), RuntimeError>;
}

struct Detached<Msg>(PhantomData<Msg>);

impl<Msg> DispatchTarget<Msg> for Detached<Msg> {
    fn dispatch(&self, _msg: Msg) -> Result<(), RuntimeError> {
        Ok(())
    }
}

/// Weak, cloneable entry point into a running program.
pub struct RuntimeHandle<Msg: 'static>(Weak<dyn DispatchTarget<Msg>>);

impl<Msg: 'static> Clone for RuntimeHandle<Msg> {
    fn clone(&self) -> Self {
        Self(Weak::clone(&self.0))
    }
}

impl<Msg: 'static> RuntimeHandle<Msg> {
    /// A handle that is not connected to any runtime.
    pub fn detached() -> Self {
        let weak: Weak<dyn DispatchTarget<Msg>> = Weak::<Detached<Msg>>::new();
        Self(weak)
    }

    pub fn is_attached(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// Queues `msg`, running cycles if the runtime is idle.
    pub fn dispatch(&self, msg: Msg) -> Result<(), RuntimeError> {
        match self.0.upgrade() {
            Some(target) => target.dispatch(msg),
            None => {
                log::debug!("message dropped: runtime no longer exists");
                Ok(())
            }
        }
    }

    /// Dispatch for callers with nobody to report to; errors are logged.
    pub fn send(&self, msg: Msg) {
        if let Err(err) = self.dispatch(msg) {
            log::error!("dispatch failed: {err}");
        }
    }

    /// Host listener that turns events into messages for this runtime.
    pub fn callback(&self, handler: Handler<Msg>) -> EventCallback
    where
        Msg: Clone,
    {
        let handle = self.clone();
        Rc::new(move |event: &Event| {
            if let Some(msg) = handler.invoke(event) {
                handle.send(msg);
            }
        })
    }
}

impl<Msg: 'static> fmt::Debug for RuntimeHandle<Msg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeHandle")
            .field("attached", &self.is_attached())
            .finish()
    }
}

type UpdateFn<Model, Msg> = Box<dyn Fn(Msg, &mut Model) -> Command<Msg>>;
type ViewFn<Model, Msg> = Box<dyn Fn(&Model) -> VNode<Msg>>;

/// An application ready to be mounted.
pub struct Program<Model, Msg: 'static> {
    view: ViewFn<Model, Msg>,
    update: UpdateFn<Model, Msg>,
    model: Model,
    command: Command<Msg>,
    spawner: Option<Rc<dyn LocalSpawn>>,
    options: ProgramOptions,
}

impl<Model: 'static, Msg: Clone + PartialEq + 'static> Program<Model, Msg> {
    pub fn new(
        view: impl Fn(&Model) -> VNode<Msg> + 'static,
        update: impl Fn(Msg, &mut Model) -> Command<Msg> + 'static,
        init_model: Model,
    ) -> Self {
        Self {
            view: Box::new(view),
            update: Box::new(update),
            model: init_model,
            command: Command::None,
            spawner: None,
            options: ProgramOptions::default(),
        }
    }

    /// Command executed right after the first render.
    pub fn with_command(mut self, command: Command<Msg>) -> Self {
        self.command = command;
        self
    }

    pub fn with_spawner(mut self, spawner: Rc<dyn LocalSpawn>) -> Self {
        self.spawner = Some(spawner);
        self
    }

    pub fn with_options(mut self, options: ProgramOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> ProgramOptions {
        self.options
    }

    pub fn has_spawner(&self) -> bool {
        self.spawner.is_some()
    }

    /// Renders the initial view into `mount_point` and starts accepting
    /// messages. `mount_point` must have no children.
    ///
    /// Fails only when the host rejects the initial render. Errors from the
    /// initial command are logged.
    pub fn run<D: Document + 'static>(
        self,
        document: D,
        mount_point: D::Node,
    ) -> Result<Runtime<Model, Msg, D>, RuntimeError> {
        let Program {
            view,
            update,
            model,
            command,
            spawner,
            options,
        } = self;
        let inner = Rc::new_cyclic(|weak: &Weak<RuntimeInner<Model, Msg, D>>| {
            let target: Weak<dyn DispatchTarget<Msg>> = weak.clone();
            RuntimeInner {
                state: Cell::new(CycleState::Idle),
                draining: Cell::new(false),
                queue: RefCell::new(VecDeque::new()),
                model: RefCell::new(model),
                update,
                view,
                document: RefCell::new(document),
                live: RefCell::new(LiveTree::new(mount_point)),
                current: RefCell::new(None),
                spawner,
                options,
                handle: RuntimeHandle(target),
                cycles: Cell::new(0),
            }
        });
        match inner.start(command) {
            Ok(()) => {}
            Err(err @ (RuntimeError::Host(_) | RuntimeError::Halted)) => return Err(err),
            // The tree is mounted; a failed initial command does not undo that.
            Err(err) => log::error!("initial command failed: {err}"),
        }
        Ok(Runtime { inner })
    }
}

struct RuntimeInner<Model, Msg: 'static, D: Document> {
    state: Cell<CycleState>,
    draining: Cell<bool>,
    queue: RefCell<VecDeque<Msg>>,
    model: RefCell<Model>,
    update: UpdateFn<Model, Msg>,
    view: ViewFn<Model, Msg>,
    document: RefCell<D>,
    live: RefCell<LiveTree<D>>,
    current: RefCell<Option<VNode<Msg>>>,
    spawner: Option<Rc<dyn LocalSpawn>>,
    options: ProgramOptions,
    handle: RuntimeHandle<Msg>,
    cycles: Cell<u64>,
}

impl<Model, Msg, D> RuntimeInner<Model, Msg, D>
where
    Model: 'static,
    Msg: Clone + PartialEq + 'static,
    D: Document + 'static,
{
    fn start(&self, command: Command<Msg>) -> Result<(), RuntimeError> {
        self.draining.set(true);
        let rendered = self.render();
        self.draining.set(false);
        if let Err(err) = rendered {
            return Err(self.halt(err));
        }
        let spawned = self.run_command(command);
        let drained = self.drain();
        drained.and(spawned)
    }

    fn enqueue(&self, msg: Msg) {
        let mut queue = self.queue.borrow_mut();
        queue.push_back(msg);
        if queue.len() == self.options.queue_warning_depth {
            log::warn!(
                "dispatch queue reached {} pending messages; update may be feeding itself",
                queue.len()
            );
        }
    }

    /// Runs one full cycle per queued message until the queue is empty.
    fn drain(&self) -> Result<(), RuntimeError> {
        self.draining.set(true);
        let mut command_error = None;
        let result = loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(msg) = next else {
                break Ok(());
            };
            match self.step(msg) {
                Ok(command) => {
                    if let Err(err) = self.run_command(command) {
                        log::warn!("command failed: {err}");
                        command_error.get_or_insert(err);
                    }
                }
                Err(err) => break Err(self.halt(err)),
            }
        };
        self.draining.set(false);
        match (result, command_error) {
            (Err(err), _) | (Ok(()), Some(err)) => Err(err),
            (Ok(()), None) => Ok(()),
        }
    }

    fn step(&self, msg: Msg) -> Result<Command<Msg>, RuntimeError> {
        self.state.set(CycleState::Dispatching);
        let command = {
            let mut model = self.model.borrow_mut();
            (self.update)(msg, &mut model)
        };
        self.render()?;
        Ok(command)
    }

    fn render(&self) -> Result<(), RuntimeError> {
        self.state.set(CycleState::Rendering);
        let view = {
            let model = self.model.borrow();
            (self.view)(&model)
        };

        self.state.set(CycleState::Diffing);
        let patches = match self.current.borrow().as_ref() {
            Some(previous) => diff(previous, &view),
            None => mount(&view),
        };
        let stats = DiffStats::from_patches(&patches);

        self.state.set(CycleState::Patching);
        {
            let mut document = self.document.borrow_mut();
            let mut live = self.live.borrow_mut();
            Patcher::new(&self.handle)
                .trace(self.options.trace_patches)
                .apply(&mut *document, &mut *live, patches)?;
        }

        *self.current.borrow_mut() = Some(view);
        let cycle = self.cycles.get() + 1;
        self.cycles.set(cycle);
        log::debug!(
            "cycle {cycle}: {stats} ({} queued)",
            self.queue.borrow().len()
        );
        self.state.set(CycleState::Idle);
        Ok(())
    }

    /// Queues immediate messages and hands futures to the executor. Every
    /// leaf is attempted; the first failure is returned.
    fn run_command(&self, command: Command<Msg>) -> Result<(), RuntimeError> {
        if command.is_none() {
            return Ok(());
        }
        let mut leaves = Vec::new();
        command.into_leaves(&mut leaves);
        let mut first_error = None;
        for leaf in leaves {
            let outcome = match leaf {
                Command::Msg(msg) => {
                    self.enqueue(msg);
                    Ok(())
                }
                Command::Perform(future) => self.spawn(future),
                Command::None | Command::Batch(_) => Ok(()),
            };
            if let Err(err) = outcome {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn spawn(
        &self,
        future: crate::command::LocalBoxFuture<'static, Option<Msg>>,
    ) -> Result<(), RuntimeError> {
        let spawner = self.spawner.as_ref().ok_or(RuntimeError::NoExecutor)?;
        let handle = self.handle.clone();
        let task = async move {
            if let Some(msg) = future.await {
                handle.send(msg);
            }
        };
        spawner.spawn_local_obj(LocalFutureObj::new(Box::pin(task)))?;
        Ok(())
    }

    fn halt(&self, err: RuntimeError) -> RuntimeError {
        let dropped = {
            let mut queue = self.queue.borrow_mut();
            let dropped = queue.len();
            queue.clear();
            dropped
        };
        self.state.set(CycleState::Halted);
        log::error!("runtime halted: {err} ({dropped} queued messages dropped)");
        err
    }
}

impl<Model, Msg, D> DispatchTarget<Msg> for RuntimeInner<Model, Msg, D>
where
    Model: 'static,
    Msg: Clone + PartialEq + 'static,
    D: Document + 'static,
{
    fn dispatch(&self, msg: Msg) -> Result<(), RuntimeError> {
        match self.state.get() {
            CycleState::Halted => return Err(RuntimeError::Halted),
            CycleState::Idle if !self.draining.get() => {}
            _ => {
                self.enqueue(msg);
                return Ok(());
            }
        }
        self.enqueue(msg);
        self.drain()
    }
}

/// Owning handle for one mounted program. Dropping it stops dispatch; the
/// host tree is left as last rendered.
pub struct Runtime<Model, Msg: 'static, D: Document> {
    inner: Rc<RuntimeInner<Model, Msg, D>>,
}

impl<Model, Msg, D> Runtime<Model, Msg, D>
where
    Model: 'static,
    Msg: Clone + PartialEq + 'static,
    D: Document + 'static,
{
    pub fn dispatch(&self, msg: Msg) -> Result<(), RuntimeError> {
        self.inner.dispatch(msg)
    }

    pub fn handle(&self) -> RuntimeHandle<Msg> {
        self.inner.handle.clone()
    }

    pub fn state(&self) -> CycleState {
        self.inner.state.get()
    }

    /// Completed render cycles, the initial mount included.
    pub fn cycles(&self) -> u64 {
        self.inner.cycles.get()
    }

    pub fn options(&self) -> ProgramOptions {
        self.inner.options
    }

    pub fn pending_messages(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    pub fn with_model<R>(&self, f: impl FnOnce(&Model) -> R) -> R {
        f(&self.inner.model.borrow())
    }

    /// Read access to the host document. Listener callbacks obtained here
    /// must be invoked after `f` returns.
    pub fn with_document<R>(&self, f: impl FnOnce(&D) -> R) -> R {
        f(&self.inner.document.borrow())
    }

    pub fn with_live_tree<R>(&self, f: impl FnOnce(&LiveTree<D>) -> R) -> R {
        f(&self.inner.live.borrow())
    }

    /// The last successfully rendered view.
    pub fn with_current_view<R>(&self, f: impl FnOnce(Option<&VNode<Msg>>) -> R) -> R {
        f(self.inner.current.borrow().as_ref())
    }

    pub fn container(&self) -> D::Node {
        self.inner.live.borrow().container().clone()
    }

    /// Removes the rendered tree from the container and detaches every
    /// listener.
    pub fn unmount(self) -> Result<(), RuntimeError> {
        let mut document = self.inner.document.borrow_mut();
        self.inner.live.borrow_mut().unmount(&mut *document)?;
        Ok(())
    }
}

impl<Model, Msg: 'static, D: Document> fmt::Debug for Runtime<Model, Msg, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("state", &self.inner.state.get())
            .field("cycles", &self.inner.cycles.get())
            .field("queued", &self.inner.queue.borrow().len())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
