//! General utility code
// (c) 2025 Ross Younger

mod tracing;

pub(crate) use tracing::trace_level;
pub use tracing::{setup as setup_tracing, tracing_is_initialised};
