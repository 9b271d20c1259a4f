//! # Fault-isolation scope.
//!
//! A [`Scope`] is opened when a task with `domain = true` starts executing and closed
//! when the task receives its completion (or is destroyed). Work spawned through the
//! scope is raced against its cancellation token and guarded with `catch_unwind`:
//! - `Err(e)` or a panic from scoped work is reported to the scope's error handler;
//! - once the scope is closed, scoped work is dropped at its next await point and can
//!   no longer report anything.
//!
//! ```text
//! open ──► spawn(work) ──► select! { cancelled ──► drop work
//!                                   work done  ──► Ok: nothing | Err/panic: on_error }
//! close ──► token.cancel()
//! ```

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use super::tick;
use crate::error::TaskError;

/// Cancellation scope guarding a task's background work.
#[derive(Clone, Debug, Default)]
pub(crate) struct Scope {
    token: CancellationToken,
}

impl Scope {
    pub(crate) fn open() -> Self {
        Self::default()
    }

    pub(crate) fn close(&self) {
        self.token.cancel();
    }

    /// Spawns `fut` inside the scope, routing its failure to `on_error`.
    pub(crate) fn spawn<F, E>(&self, fut: F, on_error: E) -> Result<(), TaskError>
    where
        F: Future<Output = Result<(), TaskError>> + Send + 'static,
        E: FnOnce(TaskError) + Send + 'static,
    {
        let token = self.token.clone();
        tick::spawn(async move {
            let guarded = AssertUnwindSafe(fut).catch_unwind();
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                res = guarded => match res {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => on_error(e),
                    Err(panic) => on_error(panicked(panic)),
                },
            }
        })
    }
}

/// Renders a panic payload as [`TaskError::Panicked`].
pub(crate) fn panicked(panic: Box<dyn Any + Send>) -> TaskError {
    let info = if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    };
    TaskError::Panicked { info }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn sink() -> (Arc<Mutex<Vec<TaskError>>>, impl FnOnce(TaskError) + Send + 'static) {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let e = Arc::clone(&errors);
        (errors, move |err| crate::core::lock(&e).push(err))
    }

    #[tokio::test]
    async fn test_scoped_error_is_reported() {
        let scope = Scope::open();
        let (errors, on_error) = sink();
        scope
            .spawn(async { Err(TaskError::fail("bg")) }, on_error)
            .unwrap();
        tokio::task::yield_now().await;
        assert_eq!(*crate::core::lock(&errors), vec![TaskError::fail("bg")]);
    }

    #[tokio::test]
    async fn test_scoped_panic_is_captured() {
        let scope = Scope::open();
        let (errors, on_error) = sink();
        scope
            .spawn(
                async {
                    let n: u32 = 0;
                    if n == 0 {
                        panic!("kaboom");
                    }
                    Ok(())
                },
                on_error,
            )
            .unwrap();
        tokio::task::yield_now().await;
        assert_eq!(
            *crate::core::lock(&errors),
            vec![TaskError::Panicked {
                info: "kaboom".into()
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_scope_drops_pending_work() {
        let scope = Scope::open();
        let (errors, on_error) = sink();
        scope
            .spawn(
                async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Err(TaskError::fail("too late"))
                },
                on_error,
            )
            .unwrap();
        tokio::task::yield_now().await;
        scope.close();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(crate::core::lock(&errors).is_empty());
    }
}
