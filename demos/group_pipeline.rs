//! # Example: group_pipeline
//!
//! A serial pipeline group containing a parallel fan-out group.
//!
//! Shows how to:
//! - Build groups with [`Group::builder`] and a concurrency limit.
//! - Nest a group inside another one; the parent observes it like a task.
//! - Stop dispatching after the first failure with [`OnError::Exit`].
//! - Read the aggregated `(error, [child results…])` outcome.
//!
//! ## Flow
//! ```text
//! pipeline (concurrency = 1, on_error = Exit)
//!   ├─ fetch
//!   ├─ transform (concurrency = 0 → unlimited)
//!   │    ├─ resize  (300ms)
//!   │    └─ encode  (100ms)
//!   ├─ publish     (fails)
//!   └─ notify      (never started)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example group_pipeline
//! ```

use std::time::Duration;

use serde_json::json;
use taskflow::{Emit, EventKind, Group, OnError, TaskError, TaskFn};
use tracing_subscriber::EnvFilter;

fn sleeper(ms: u64, value: &'static str) -> TaskFn {
    TaskFn::future(move |_ctx| async move {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(vec![json!(value)])
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let pipeline = Group::builder()
        .name("pipeline")
        .concurrency(1)
        .on_error(OnError::Exit)
        .build();

    pipeline.create_task("fetch", sleeper(100, "raw"));

    let transform = pipeline.create_group("transform");
    transform.create_task("resize", sleeper(300, "resized"));
    transform.create_task("encode", sleeper(100, "encoded"));
    transform.on(EventKind::Passed, |_| println!("[transform] all children passed"));

    pipeline.create_task(
        "publish",
        TaskFn::returning(|_| Err(TaskError::fail("registry unavailable"))),
    );
    let notify = pipeline.create_task("notify", sleeper(10, "sent"));

    let result = pipeline.run().outcome().await;

    println!("pipeline error: {:?}", result.error.map(|e| e.to_string()));
    for (i, value) in result.values.iter().enumerate() {
        println!("  child #{i}: {value}");
    }
    println!(
        "completed={} remaining={} notify={}",
        pipeline.items_completed(),
        pipeline.items_remaining(),
        notify.status()
    );
}
