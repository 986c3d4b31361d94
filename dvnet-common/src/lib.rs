//! Common primitives shared by the dvnet crates.

mod queue;
pub use queue::{BoundedQueue, PushTimeout, QueueFull};
