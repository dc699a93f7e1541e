//! Testing utilities and harness for tea-core programs

pub mod testing;

pub use testing::*;

pub mod prelude {
    pub use crate::testing::*;
    pub use tea_core::{Event, NodeId, Snapshot};
}
