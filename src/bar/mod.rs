//! Status bars: multi-component progress indicators and their registry.

mod component;
mod registry;

pub use component::{compose, BarComponent, DrawStatus, SPINNER};

pub(crate) use component::{blank_into, render_into};
pub(crate) use registry::BarRegistry;
