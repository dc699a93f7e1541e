use tea_core::{Clock, Document, MemoryDocument, Program, Runtime, RuntimeError};
use tea_runtime_std::{StdClock, StdRuntime};

/// Pairs a mounted program with the executor and timers its commands run on.
/// The embedding loop calls [`AppShell::should_update`] and
/// [`AppShell::update`] whenever it gets control.
pub struct AppShell<Model, Msg, D, C = StdClock>
where
    Msg: 'static,
    D: Document,
    C: Clock,
{
    std_runtime: StdRuntime<C>,
    runtime: Runtime<Model, Msg, D>,
}

impl<Model, Msg, D> AppShell<Model, Msg, D, StdClock>
where
    Model: 'static,
    Msg: Clone + PartialEq + 'static,
    D: Document + 'static,
{
    pub fn new(
        program: Program<Model, Msg>,
        document: D,
        mount_point: D::Node,
    ) -> Result<Self, RuntimeError> {
        Self::with_std_runtime(program, document, mount_point, StdRuntime::new())
    }
}

impl<Model, Msg, D, C> AppShell<Model, Msg, D, C>
where
    Model: 'static,
    Msg: Clone + PartialEq + 'static,
    D: Document + 'static,
    C: Clock,
{
    /// Mounts `program`, routing its future commands to `std_runtime`.
    /// A spawner already set on the program is replaced.
    pub fn with_std_runtime(
        program: Program<Model, Msg>,
        document: D,
        mount_point: D::Node,
        std_runtime: StdRuntime<C>,
    ) -> Result<Self, RuntimeError> {
        if program.has_spawner() {
            log::debug!("replacing the program's spawner with the shell executor");
        }
        let runtime = program
            .with_spawner(std_runtime.spawner())
            .run(document, mount_point)?;
        Ok(Self {
            std_runtime,
            runtime,
        })
    }

    pub fn runtime(&self) -> &Runtime<Model, Msg, D> {
        &self.runtime
    }

    pub fn std_runtime(&self) -> &StdRuntime<C> {
        &self.std_runtime
    }

    /// Dispatches `msg`, logging instead of returning failures the way
    /// host-event listeners do.
    pub fn dispatch(&self, msg: Msg) {
        if let Err(err) = self.runtime.dispatch(msg) {
            log::error!("dispatch failed: {err}");
        }
    }

    /// Whether a task was woken or a timer is due since the last update.
    pub fn should_update(&self) -> bool {
        let timer_due = self
            .std_runtime
            .timers()
            .next_deadline()
            .is_some_and(|deadline| deadline <= self.std_runtime.clock().now());
        self.std_runtime.take_wake_request() || timer_due
    }

    /// Fires due timers and runs command futures until nothing progresses.
    /// Returns the amount of work done.
    pub fn update(&mut self) -> usize {
        let work = self.std_runtime.pump();
        if work > 0 {
            log::trace!(
                "update performed {work} steps; runtime {:?}",
                self.runtime
            );
        }
        work
    }

    /// Whether command futures or timers are still outstanding.
    pub fn has_pending_work(&self) -> bool {
        self.std_runtime.has_pending_work()
    }
}

impl<Model, Msg, C> AppShell<Model, Msg, MemoryDocument, C>
where
    Model: 'static,
    Msg: Clone + PartialEq + 'static,
    C: Clock,
{
    pub fn log_debug_info(&self) {
        println!("\n\n");
        println!("════════════════════════════════════════════════════════");
        println!("           DEBUG: CURRENT DOCUMENT STATE");
        println!("════════════════════════════════════════════════════════");

        let container = self.runtime.container();
        self.runtime.with_document(|document| {
            print!("{}", document.dump_tree(Some(container)));
        });
        println!(
            "state {:?}, {} cycles, {} queued, {:?}",
            self.runtime.state(),
            self.runtime.cycles(),
            self.runtime.pending_messages(),
            self.std_runtime
        );

        println!("════════════════════════════════════════════════════════");
        println!("\n\n");
    }
}

/// Mounts `program` into a fresh [`MemoryDocument`] under a `<div>`.
pub fn headless<Model, Msg>(
    program: Program<Model, Msg>,
) -> Result<AppShell<Model, Msg, MemoryDocument>, RuntimeError>
where
    Model: 'static,
    Msg: Clone + PartialEq + 'static,
{
    let mut document = MemoryDocument::new();
    let container = document.create_container("div");
    AppShell::new(program, document, container)
}
