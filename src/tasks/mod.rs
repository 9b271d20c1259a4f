//! # Callables and results.
//!
//! This module provides the types a task wraps and produces:
//! - [`TaskFn`] - a callable with its declared calling convention
//! - [`TaskContext`] - completion handle and arguments given to asynchronous callables
//! - [`TaskResult`] - the `(error, …values)` tuple captured from a completion

mod result;
mod task_fn;

pub use result::TaskResult;
pub(crate) use task_fn::Convention;
pub use task_fn::{BoxTaskFuture, TaskContext, TaskFn};
