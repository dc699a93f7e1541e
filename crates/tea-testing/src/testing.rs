use std::time::Duration;

use tea_app_shell::AppShell;
use tea_core::{
    Event, MemoryDocument, NodeId, Program, Runtime, RuntimeError, Snapshot,
};
use tea_runtime_std::{ManualClock, StdRuntime};

/// Headless harness for exercising programs in tests.
///
/// The program is mounted into a [`MemoryDocument`] and its commands run on
/// an executor whose timers follow a [`ManualClock`], so tests decide when
/// time passes. Host events are synthesised by invoking the listener the
/// patcher registered on a node.
pub struct ProgramTestRule<Model: 'static, Msg: Clone + PartialEq + 'static> {
    shell: AppShell<Model, Msg, MemoryDocument, ManualClock>,
    clock: ManualClock,
}

impl<Model: 'static, Msg: Clone + PartialEq + 'static> ProgramTestRule<Model, Msg> {
    /// Mount `program` and settle any work its initial command started.
    pub fn new(program: Program<Model, Msg>) -> Result<Self, RuntimeError> {
        Self::build(|_| program)
    }

    /// Like [`ProgramTestRule::new`] for programs whose `update` needs the
    /// test runtime, typically to issue timer commands.
    pub fn build(
        make: impl FnOnce(&StdRuntime<ManualClock>) -> Program<Model, Msg>,
    ) -> Result<Self, RuntimeError> {
        let clock = ManualClock::new();
        let std_runtime = StdRuntime::with_clock(clock.clone());
        let program = make(&std_runtime);
        let mut document = MemoryDocument::new();
        let container = document.create_container("div");
        let shell = AppShell::with_std_runtime(program, document, container, std_runtime)?;
        let mut rule = Self { shell, clock };
        rule.pump_until_idle();
        Ok(rule)
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    pub fn runtime(&self) -> &Runtime<Model, Msg, MemoryDocument> {
        self.shell.runtime()
    }

    pub fn shell(&mut self) -> &mut AppShell<Model, Msg, MemoryDocument, ManualClock> {
        &mut self.shell
    }

    /// Run timers and command futures until nothing makes progress.
    pub fn pump_until_idle(&mut self) -> usize {
        let mut work = 0;
        loop {
            let step = self.shell.update();
            if step == 0 {
                return work;
            }
            work += step;
        }
    }

    /// Move the clock forward and settle everything that became due.
    pub fn advance_time(&mut self, by: Duration) -> usize {
        self.clock.advance(by);
        self.pump_until_idle()
    }

    pub fn dispatch(&mut self, msg: Msg) -> Result<(), RuntimeError> {
        self.runtime().dispatch(msg)?;
        self.pump_until_idle();
        Ok(())
    }

    /// Deliver `event` to `node` as the host would. Returns whether a
    /// listener for `event.kind` was registered there.
    pub fn fire(&mut self, node: NodeId, event: Event) -> bool {
        let listener = self
            .runtime()
            .with_document(|document| document.listener(node, &event.kind));
        match listener {
            Some(callback) => {
                callback(&event);
                self.pump_until_idle();
                true
            }
            None => false,
        }
    }

    pub fn click(&mut self, node: NodeId) -> bool {
        self.fire(node, Event::new("click"))
    }

    pub fn input(&mut self, node: NodeId, value: &str) -> bool {
        self.fire(node, Event::new("input").with_value(value))
    }

    pub fn check(&mut self, node: NodeId, checked: bool) -> bool {
        self.fire(node, Event::new("change").with_checked(checked))
    }

    pub fn key_down(&mut self, node: NodeId, key: &str) -> bool {
        self.fire(node, Event::new("keydown").with_key(key))
    }

    pub fn container(&self) -> NodeId {
        self.runtime().container()
    }

    /// Root node of the rendered tree.
    pub fn root(&self) -> Option<NodeId> {
        let container = self.container();
        self.runtime()
            .with_document(|document| document.children(container).first().copied())
    }

    pub fn find_by_text(&self, text: &str) -> Option<NodeId> {
        let container = self.container();
        self.runtime()
            .with_document(|document| document.find_by_text(container, text))
    }

    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        let container = self.container();
        self.runtime()
            .with_document(|document| document.find_by_tag(container, tag))
    }

    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<NodeId> {
        let container = self.container();
        self.runtime()
            .with_document(|document| document.find_by_attribute(container, name, value))
    }

    /// Text of the node, or of the whole rendered tree when `None`.
    pub fn text_content(&self, node: Option<NodeId>) -> String {
        let target = node.unwrap_or_else(|| self.container());
        self.runtime()
            .with_document(|document| document.text_content(target))
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.runtime()
            .with_document(|document| document.children(node).to_vec())
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        let root = self.root()?;
        self.runtime()
            .with_document(|document| document.snapshot(root))
    }

    pub fn dump_tree(&self) -> String {
        let container = self.container();
        self.runtime()
            .with_document(|document| document.dump_tree(Some(container)))
    }

    pub fn model<R>(&self, f: impl FnOnce(&Model) -> R) -> R {
        self.runtime().with_model(f)
    }

    /// Panics unless the live tree mirrors the last rendered view.
    pub fn assert_in_sync(&self) {
        let expected = self
            .runtime()
            .with_current_view(|view| view.map(Snapshot::of));
        assert_eq!(
            self.snapshot(),
            expected,
            "live tree diverged from the last render:\n{}",
            self.dump_tree()
        );
    }
}

/// Convenience helper for tests that only need temporary access to a
/// `ProgramTestRule`.
pub fn run_test_program<Model, Msg, R>(
    program: Program<Model, Msg>,
    f: impl FnOnce(&mut ProgramTestRule<Model, Msg>) -> R,
) -> R
where
    Model: 'static,
    Msg: Clone + PartialEq + 'static,
{
    let mut rule = match ProgramTestRule::new(program) {
        Ok(rule) => rule,
        Err(err) => panic!("program failed to mount: {err}"),
    };
    f(&mut rule)
}
