//! # Example: basic_task
//!
//! Runs three tasks, one per calling convention, and prints their lifecycle.
//!
//! Shows how to:
//! - Wrap a synchronous callable with [`TaskFn::returning`].
//! - Complete later through the [`TaskContext`](taskflow::TaskContext) with [`TaskFn::callback`].
//! - Await an async callable with [`TaskFn::future`].
//! - Attach direct listeners with [`Emit::on`].
//!
//! ## Flow
//! ```text
//! run() ─► pending ─(next tick)─► running ─► passed|failed ─► completed ─► done ─► destroyed
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example basic_task
//! ```

use std::time::Duration;

use serde_json::json;
use taskflow::{Emit, EventKind, Task, TaskError, TaskFn};
use tracing_subscriber::EnvFilter;

fn trace_lifecycle(task: &Task) {
    let name = task.name().to_string();
    for kind in [EventKind::Running, EventKind::Passed, EventKind::Failed, EventKind::Destroyed] {
        let name = name.clone();
        task.on(kind, move |ev| match ev.error() {
            Some(e) => println!("[{name}] {} ({e})", ev.kind().as_label()),
            None => println!("[{name}] {}", ev.kind().as_label()),
        });
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let sum = Task::builder()
        .name("sum")
        .args(vec![json!(2), json!(3)])
        .method(TaskFn::returning(|args| {
            let total: i64 = args.iter().filter_map(|v| v.as_i64()).sum();
            Ok(vec![json!(total)])
        }))
        .build();

    let timer = Task::new(
        "timer",
        TaskFn::callback(|ctx| {
            let done = ctx.clone();
            ctx.spawn(async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                done.ok(vec![json!("tick")]);
                Ok(())
            });
        }),
    );

    let flaky = Task::new(
        "flaky",
        TaskFn::future(|_ctx| async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Err::<Vec<serde_json::Value>, _>(TaskError::fail("connection refused"))
        }),
    );

    for task in [&sum, &timer, &flaky] {
        trace_lifecycle(task);
    }

    let outcomes = (sum.outcome(), timer.outcome(), flaky.outcome());
    sum.run();
    timer.run();
    flaky.run();

    let (a, b, c) = tokio::join!(outcomes.0, outcomes.1, outcomes.2);
    println!("sum   -> {}", a.to_value());
    println!("timer -> {}", b.to_value());
    println!("flaky -> {}", c.to_value());

    // destruction is deferred to the next tick
    tokio::task::yield_now().await;
}
