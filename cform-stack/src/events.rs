//! Event log tailing.
//!
//! The service returns a stack's event log newest first, split into pages.
//! A tailer remembers a watermark (the timestamp of the newest event it has
//! already shown) and on each scan collects only events strictly newer than
//! it, stopping at the first older-or-equal event instead of walking the
//! whole history.

use std::io::Write;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use cform_core::types::{StackDescription, StackEvent, StackName};

use crate::clock::Clock;
use crate::error::{provider_err, StackError};
use crate::provider::Provisioner;

/// Pause between event scans while an operation runs.
pub const DEPLOY_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Events found by one scan, plus the watermark to use for the next scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBatch {
    /// Newest first, as the service returns them.
    pub events: Vec<StackEvent>,
    pub watermark: DateTime<Utc>,
}

impl EventBatch {
    /// Events oldest first, for display.
    pub fn chronological(&self) -> impl Iterator<Item = &StackEvent> {
        self.events.iter().rev()
    }
}

/// Collect every event strictly newer than `watermark`.
///
/// The returned watermark is the newest event of the first page, or the
/// given watermark when that is later (or the log is empty). A failure on
/// any page discards what was collected so far.
pub fn events_after<P>(
    provider: &P,
    stack: &StackName,
    watermark: DateTime<Utc>,
) -> Result<EventBatch, StackError>
where
    P: Provisioner + ?Sized,
{
    let mut events = Vec::new();
    let mut newest: Option<DateTime<Utc>> = None;
    let mut token: Option<String> = None;
    let mut pages = 0usize;

    'pages: loop {
        let page = provider
            .describe_stack_events(stack, token.as_deref())
            .map_err(StackError::EventPages)?;
        pages += 1;

        if pages == 1 {
            newest = page.stack_events.first().map(|e| e.timestamp);
        }

        for event in page.stack_events {
            if event.timestamp <= watermark {
                break 'pages;
            }
            events.push(event);
        }

        match page.next_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }

    debug!(stack = %stack, pages, new_events = events.len(), "scanned event log");

    let watermark = match newest {
        Some(ts) if ts > watermark => ts,
        _ => watermark,
    };
    Ok(EventBatch { events, watermark })
}

/// True once a stack status is terminal for a running operation.
pub fn status_settled(status: &str) -> bool {
    status.ends_with("_COMPLETE") || status.ends_with("_FAILED")
}

/// True for terminal statuses that mean the operation did not succeed.
pub fn status_failed(status: &str) -> bool {
    status.contains("ROLLBACK") || status.ends_with("_FAILED") || status == "DELETE_COMPLETE"
}

/// Print new events (oldest first) every [`DEPLOY_POLL_INTERVAL`] until the
/// stack settles. Returns the final description and the last watermark.
pub fn follow_operation<P, C, W>(
    provider: &P,
    clock: &C,
    stack: &StackName,
    mut watermark: DateTime<Utc>,
    out: &mut W,
) -> Result<(StackDescription, DateTime<Utc>), StackError>
where
    P: Provisioner + ?Sized,
    C: Clock + ?Sized,
    W: Write + ?Sized,
{
    loop {
        let batch = events_after(provider, stack, watermark)?;
        for event in batch.chronological() {
            writeln!(out, "{}", crate::render::event_line(event))?;
        }
        out.flush()?;
        watermark = batch.watermark;

        let description = provider
            .describe_stack(stack)
            .map_err(|e| provider_err("describe stack", e))?;
        if status_settled(&description.stack_status) {
            debug!(stack = %stack, status = %description.stack_status, "operation settled");
            return Ok((description, watermark));
        }
        clock.sleep(DEPLOY_POLL_INTERVAL);
    }
}
