//! # Example: custom_subscriber
//!
//! Demonstrates how to build and attach a custom event subscriber.
//!
//! Shows how to:
//! - Implement the [`Subscribe`] trait.
//! - Inspect [`Event`] / [`EventKind`] for unit lifecycle metrics.
//! - Share one [`Bus`] between a group and its children, and fan it out with
//!   [`SubscriberSet::listen`].
//!
//! ## Flow
//! ```text
//! Group / Task ──► Bus.publish(Event)
//!                     └─► SubscriberSet::listen
//!                           ├─► LogWriter.on_event()
//!                           └─► Stats.on_event()
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example custom_subscriber
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::json;
use taskflow::{
    Bus, Event, EventKind, Group, LogWriter, Subscribe, SubscriberSet, TaskError, TaskFn, UnitKind,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Counts task outcomes. In real life, you could export metrics or trigger alerts.
#[derive(Default)]
struct Stats {
    passed: AtomicUsize,
    failed: AtomicUsize,
}

#[async_trait::async_trait]
impl Subscribe for Stats {
    async fn on_event(&self, ev: &Event) {
        if ev.unit_kind != Some(UnitKind::Task) {
            return;
        }
        match ev.kind {
            EventKind::Passed => {
                self.passed.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::Failed => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                println!(
                    "[stats] failed: task={} reason={}",
                    ev.unit.as_deref().unwrap_or("<unknown>"),
                    ev.reason.as_deref().unwrap_or("<none>")
                );
            }
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "stats"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let stats = Arc::new(Stats::default());
    let subs = Arc::new(SubscriberSet::new(vec![
        Arc::new(LogWriter::new()) as Arc<dyn Subscribe>,
        Arc::clone(&stats) as Arc<dyn Subscribe>,
    ]));

    let bus = Bus::default();
    let token = CancellationToken::new();
    let listener = Arc::clone(&subs).listen(&bus, token.clone());

    let group = Group::builder().name("batch").concurrency(2).bus(bus).build();
    for i in 0..5u64 {
        group.create_task(
            format!("job-{i}"),
            TaskFn::future(move |_ctx| async move {
                tokio::time::sleep(Duration::from_millis(50 * (i + 1))).await;
                if i == 3 {
                    return Err(TaskError::fail("disk full"));
                }
                Ok(vec![json!(i)])
            }),
        );
    }

    let result = group.run().outcome().await;
    println!("batch error: {:?}", result.error.map(|e| e.to_string()));

    // let the subscriber workers drain their queues
    tokio::time::sleep(Duration::from_millis(50)).await;
    token.cancel();
    let _ = listener.await;

    println!(
        "[stats] passed={} failed={}",
        stats.passed.load(Ordering::Relaxed),
        stats.failed.load(Ordering::Relaxed)
    );
}
