//! CLI library components for viewkit.

pub mod logging;
pub mod render;
pub mod source;
