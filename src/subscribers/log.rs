//! # LogWriter: structured event logger
//!
//! A minimal subscriber that records incoming [`Event`]s through `tracing`.
//! Use it for tests or demos; install a `tracing` subscriber to see the output.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO taskflow: pending unit="fetch" kind=task seq=0
//! INFO taskflow: running unit="fetch" kind=task seq=1
//! WARN taskflow: failed unit="fetch" kind=task seq=2 reason="execution failed: refused"
//! INFO taskflow: completed unit="fetch" kind=task seq=3 values=0
//! ```

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;
use async_trait::async_trait;
use tracing::{info, warn};

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let unit = e.unit.as_deref().unwrap_or("unknown");
        let kind = e.unit_kind.map_or("unknown", |k| k.as_label());
        match e.kind {
            EventKind::Failed | EventKind::Error => {
                warn!(
                    target: "taskflow",
                    unit,
                    kind,
                    seq = e.seq,
                    reason = e.reason.as_deref().unwrap_or("unknown"),
                    "{}",
                    e.kind.as_label()
                );
            }
            EventKind::Completed | EventKind::Done => {
                info!(
                    target: "taskflow",
                    unit,
                    kind,
                    seq = e.seq,
                    values = e.values.unwrap_or(0),
                    "{}",
                    e.kind.as_label()
                );
            }
            EventKind::Pending | EventKind::Running | EventKind::Passed | EventKind::Destroyed => {
                info!(target: "taskflow", unit, kind, seq = e.seq, "{}", e.kind.as_label());
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
