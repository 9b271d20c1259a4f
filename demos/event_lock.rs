//! # Example: event_lock
//!
//! Serializes two phases that must not interleave ("drain" vs "accept") and gates a
//! report on both of them finishing.
//!
//! Shows how to:
//! - Pair [`EventLock::start`] / [`EventLock::finish`].
//! - Wait for a phase with [`EventLock::once_finished`].
//! - Lock several names at once with [`EventLock::block`] / [`EventLock::unblock`].
//! - Use the async [`EventLock::acquire`] / [`EventLock::release`] wrappers.
//! - Run completion-style handlers one after another with [`EventLock::emit_serial`].
//!
//! ## Run
//! ```bash
//! cargo run --example event_lock
//! ```

use std::time::Duration;

use serde_json::json;
use taskflow::{EventLock, Phase, TaskError};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let events = EventLock::new();
    events.when(Phase::Started.event("drain"), || println!("[drain] started"));
    events.when(Phase::Finished.event("drain"), || println!("[drain] finished"));

    events.start("drain", || println!("[drain] holding the lock"));
    events.once_finished("drain", || println!("[accept] drain is over, accepting work"));

    let worker = {
        let events = events.clone();
        tokio::spawn(async move {
            events.acquire("drain").await;
            println!("[worker] got drain after it was released");
            events.release("drain");
        })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    events.finish("drain", || println!("[drain] released"));
    let _ = worker.await;

    events.handle("flush", |target, ctx| {
        println!("[flush] writing {target}");
        ctx.ok(vec![]);
    });
    events.handle("flush", |target, ctx| {
        ctx.fail(TaskError::fail(format!("{target} is read-only")));
    });
    let (tx, rx) = tokio::sync::oneshot::channel();
    events.emit_serial("flush", json!("cache"), move |res| {
        let _ = tx.send(res);
    });
    if let Ok(Err(e)) = rx.await {
        println!("[flush] handlers reported: {e}");
    }

    events.block("db, cache", |res| match res {
        Ok(()) => println!("[maintenance] db and cache locked"),
        Err(e) => println!("[maintenance] {}", e.as_message()),
    });
    println!("db locked={} cache locked={}", events.is_locked("db"), events.is_locked("cache"));
    events.unblock(["db", "cache"], |res| {
        println!("[maintenance] unblocked: {}", res.is_ok());
    });

    events.block("", |res| {
        if let Err(e) = res {
            println!("[maintenance] rejected: {}", e.as_label());
        }
    });
}
