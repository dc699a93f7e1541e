#![doc = r"Core runtime for an Elm Architecture style UI framework: view trees, reconciliation, patching and the dispatch loop."]

pub mod collections;
pub mod command;
pub mod diff;
pub mod document;
pub mod memory;
pub mod patch;
pub mod patcher;
pub mod platform;
pub mod runtime;
pub mod snapshot;
pub mod vnode;

pub use command::{Command, LocalBoxFuture};
pub use diff::{diff, mount, DiffStats};
pub use document::{Document, EventCallback, HostError};
pub use memory::{ListenerId, MemoryDocument, NodeId};
pub use patch::{NodePath, Patch, PatchKind};
pub use patcher::{apply, LiveNode, LiveTree, Patcher};
pub use platform::Clock;
pub use runtime::{CycleState, Program, ProgramOptions, Runtime, RuntimeError, RuntimeHandle};
pub use snapshot::Snapshot;
pub use vnode::{AttrValue, Element, Event, Handler, KeyedCallback, VNode};

/// Renders `program` into a fresh [`MemoryDocument`] under a `<div>` container.
pub fn run_in_memory<Model, Msg>(
    program: Program<Model, Msg>,
) -> Result<Runtime<Model, Msg, MemoryDocument>, RuntimeError>
where
    Model: 'static,
    Msg: Clone + PartialEq + 'static,
{
    let mut document = MemoryDocument::new();
    let container = document.create_container("div");
    program.run(document, container)
}
