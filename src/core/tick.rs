//! # Next-tick scheduling.
//!
//! Deferred work runs as its own tokio task on the ambient runtime. On the
//! current-thread runtime spawned tasks run in FIFO order once the caller yields,
//! which is what gives `run()` and late `once_done` registrations their
//! "never inside the calling stack" guarantee.

use std::future::Future;

use tokio::runtime::Handle;

use crate::error::TaskError;

/// Runs `f` on a later tick.
pub(crate) fn defer<F>(f: F) -> Result<(), TaskError>
where
    F: FnOnce() + Send + 'static,
{
    let handle = Handle::try_current().map_err(|_| TaskError::NoRuntime)?;
    handle.spawn(async move { f() });
    Ok(())
}

/// Spawns `fut` on the ambient runtime.
pub(crate) fn spawn<F>(fut: F) -> Result<(), TaskError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let handle = Handle::try_current().map_err(|_| TaskError::NoRuntime)?;
    handle.spawn(fut);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_defer_without_runtime_fails() {
        assert_eq!(defer(|| {}), Err(TaskError::NoRuntime));
        assert_eq!(spawn(async {}), Err(TaskError::NoRuntime));
    }

    #[tokio::test]
    async fn test_defer_runs_after_caller_yields() {
        let ran = Arc::new(AtomicBool::new(false));
        let r = Arc::clone(&ran);
        defer(move || r.store(true, Ordering::SeqCst)).ok();
        assert!(!ran.load(Ordering::SeqCst));
        tokio::task::yield_now().await;
        assert!(ran.load(Ordering::SeqCst));
    }
}
