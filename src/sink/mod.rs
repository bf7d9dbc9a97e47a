//! Sinks: thread-safe, ownership-aware output targets.

mod registry;
mod target;

pub use target::SinkKind;

pub(crate) use registry::SinkRegistry;
pub(crate) use target::SinkInner;
