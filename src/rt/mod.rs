//! Cooperative task runtime.
//!
//! The [`Executor`] never blocks and never spawns threads, the application drives it by calling
//! [`Executor::poll_next`] from its own event loop whenever a [`Waker`] fires.
mod context;
mod executor;
mod task;

pub use context::{Context, Waker};
pub use executor::Executor;
pub(crate) use executor::WeakExec;
pub use task::{Task, TaskType, TaskValue};
