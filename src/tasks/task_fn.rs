//! # Callables wrapped by tasks (`TaskFn`)
//!
//! A [`TaskFn`] declares the calling convention of the callable up front instead of
//! guessing it from the signature:
//!
//! | Constructor              | Completes with                                           |
//! |--------------------------|----------------------------------------------------------|
//! | [`TaskFn::returning`]    | the returned `Result` (synchronous)                      |
//! | [`TaskFn::callback`]     | a later call on the [`TaskContext`] (asynchronous)       |
//! | [`TaskFn::ambi`]         | `Some(result)` returned, or a later [`TaskContext`] call |
//! | [`TaskFn::future`]       | the output of the returned future                        |
//!
//! Every invocation receives the unit's configured `args`. A closure is `Fn`, so a
//! task that is rebuilt and re-run gets a fresh invocation without hidden state.
//!
//! ## Example
//! ```rust
//! use serde_json::json;
//! use taskflow::{TaskFn, TaskError};
//!
//! let sync = TaskFn::returning(|_args| Ok(vec![json!(5)]));
//! let cb = TaskFn::callback(|ctx| ctx.ok(vec![json!("later")]));
//! let fut = TaskFn::future(|_ctx| async move { Ok::<_, TaskError>(vec![]) });
//!
//! assert_eq!(sync.convention(), "returning");
//! assert_eq!(cb.convention(), "callback");
//! assert_eq!(fut.convention(), "future");
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::core::Completer;
use crate::error::TaskError;
use crate::tasks::TaskResult;

/// Boxed future produced by [`TaskFn::future`] callables.
pub type BoxTaskFuture = BoxFuture<'static, Result<Vec<Value>, TaskError>>;

type ReturningFn = dyn Fn(&[Value]) -> Result<Vec<Value>, TaskError> + Send + Sync;
type CallbackFn = dyn Fn(TaskContext) + Send + Sync;
type AmbiFn = dyn Fn(TaskContext) -> Option<Result<Vec<Value>, TaskError>> + Send + Sync;
type FutureFn = dyn Fn(TaskContext) -> BoxTaskFuture + Send + Sync;

#[derive(Clone)]
pub(crate) enum Convention {
    Returning(Arc<ReturningFn>),
    Callback(Arc<CallbackFn>),
    Ambi(Arc<AmbiFn>),
    Future(Arc<FutureFn>),
}

/// A callable together with its declared calling convention.
#[derive(Clone)]
pub struct TaskFn {
    pub(crate) convention: Convention,
}

impl TaskFn {
    /// Synchronous callable: the returned value is the completion.
    pub fn returning<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Vec<Value>, TaskError> + Send + Sync + 'static,
    {
        Self {
            convention: Convention::Returning(Arc::new(f)),
        }
    }

    /// Asynchronous callable: completes through the [`TaskContext`] it receives.
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(TaskContext) + Send + Sync + 'static,
    {
        Self {
            convention: Convention::Callback(Arc::new(f)),
        }
    }

    /// Callable that either returns `Some(result)` synchronously, or returns `None`
    /// and completes later through the [`TaskContext`].
    ///
    /// The returned value is only honored when the unit's `ambi` option is on.
    pub fn ambi<F>(f: F) -> Self
    where
        F: Fn(TaskContext) -> Option<Result<Vec<Value>, TaskError>> + Send + Sync + 'static,
    {
        Self {
            convention: Convention::Ambi(Arc::new(f)),
        }
    }

    /// Async callable: the future's output is the completion.
    pub fn future<F, Fut>(f: F) -> Self
    where
        F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<Value>, TaskError>> + Send + 'static,
    {
        Self {
            convention: Convention::Future(Arc::new(move |ctx| f(ctx).boxed())),
        }
    }

    /// Label of the declared calling convention.
    pub fn convention(&self) -> &'static str {
        match self.convention {
            Convention::Returning(_) => "returning",
            Convention::Callback(_) => "callback",
            Convention::Ambi(_) => "ambi",
            Convention::Future(_) => "future",
        }
    }
}

impl fmt::Debug for TaskFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskFn")
            .field("convention", &self.convention())
            .finish()
    }
}

/// Handle given to asynchronous callables.
///
/// Carries the configured arguments and the task's completion callback. Cloning is
/// cheap; every clone completes the same task. Only the first completion counts;
/// later ones are reported as excess completions.
#[derive(Clone)]
pub struct TaskContext {
    args: Arc<[Value]>,
    completer: Completer,
}

impl TaskContext {
    pub(crate) fn new(args: Arc<[Value]>, completer: Completer) -> Self {
        Self { args, completer }
    }

    /// Name of the task being executed.
    pub fn name(&self) -> &str {
        self.completer.name()
    }

    /// Arguments configured on the task.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Completes the task with `result`.
    pub fn complete(&self, result: impl Into<TaskResult>) {
        self.completer.complete(result.into());
    }

    /// Completes the task successfully with `values`.
    pub fn ok(&self, values: Vec<Value>) {
        self.complete(TaskResult::ok(values));
    }

    /// Completes the task with `error`.
    pub fn fail(&self, error: TaskError) {
        self.complete(TaskResult::failed(error));
    }

    /// Spawns background work inside the task's isolation scope.
    ///
    /// An `Err` returned by `fut`, or a panic raised by it, completes the task with
    /// that error. Scoped work is dropped at its next await point once the task has
    /// completed. Without isolation (`domain = false`) the work runs detached and its
    /// errors are only logged.
    pub fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.completer.spawn(fut);
    }

    /// True once the task has exited; further completions are excess.
    pub fn is_closed(&self) -> bool {
        self.completer.is_closed()
    }
}

impl fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskContext")
            .field("task", &self.name())
            .field("args", &self.args)
            .finish()
    }
}
