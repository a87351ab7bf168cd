//! Create-or-update of a stack with live event output.

use std::fmt;
use std::io::Write;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use cform_core::types::{StackName, StackRequest, StackState};

use crate::clock::Clock;
use crate::error::{provider_err, StackError};
use crate::events::{follow_operation, status_failed};
use crate::provider::Provisioner;

/// Which submission path a deploy took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployMode {
    Create,
    Update,
}

impl fmt::Display for DeployMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployMode::Create => write!(f, "create"),
            DeployMode::Update => write!(f, "update"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutcome {
    pub mode: DeployMode,
    pub stack_id: String,
    pub final_status: String,
}

/// Describe the stack and reduce the answer to a [`StackState`].
///
/// Only the service's "does not exist" answer means [`StackState::NotFound`];
/// every other failure is returned.
pub fn probe_stack<P>(provider: &P, stack: &StackName) -> Result<StackState, StackError>
where
    P: Provisioner + ?Sized,
{
    match provider.describe_stack(stack) {
        Ok(description) => Ok(description.state()),
        Err(e) if e.is_stack_not_found() => Ok(StackState::NotFound),
        Err(e) => Err(provider_err("describe stack", e)),
    }
}

/// Timestamp of the newest event in the stack's log, if any.
fn latest_event_timestamp<P>(
    provider: &P,
    stack: &StackName,
) -> Result<Option<DateTime<Utc>>, StackError>
where
    P: Provisioner + ?Sized,
{
    let page = provider
        .describe_stack_events(stack, None)
        .map_err(StackError::EventPages)?;
    Ok(page.stack_events.first().map(|e| e.timestamp))
}

/// Create the stack if it is absent, otherwise update it, then print its
/// events until the operation settles.
///
/// The watermark is taken before submission so events from earlier
/// operations are never shown. A settled status that indicates rollback or
/// failure is returned as [`StackError::OperationFailed`].
pub fn deploy<P, C, W>(
    provider: &P,
    clock: &C,
    request: &StackRequest,
    out: &mut W,
) -> Result<DeployOutcome, StackError>
where
    P: Provisioner + ?Sized,
    C: Clock + ?Sized,
    W: Write + ?Sized,
{
    let stack = &request.stack_name;
    let state = probe_stack(provider, stack)?;

    let watermark = if state.exists() {
        latest_event_timestamp(provider, stack)?.unwrap_or(DateTime::<Utc>::MIN_UTC)
    } else {
        DateTime::<Utc>::MIN_UTC
    };

    let (mode, stack_id) = if state.exists() {
        info!(stack = %stack, %state, "updating stack");
        let id = provider
            .update_stack(request)
            .map_err(|e| provider_err("update stack", e))?;
        (DeployMode::Update, id)
    } else {
        info!(stack = %stack, "creating stack");
        let id = provider
            .create_stack(request)
            .map_err(|e| provider_err("create stack", e))?;
        (DeployMode::Create, id)
    };

    let (description, _) = follow_operation(provider, clock, stack, watermark, out)?;
    let final_status = description.stack_status;

    if status_failed(&final_status) {
        let reason = description.stack_status_reason.unwrap_or_default();
        warn!(stack = %stack, status = %final_status, "stack operation failed");
        return Err(StackError::OperationFailed {
            stack: stack.clone(),
            status: final_status,
            reason,
        });
    }

    info!(stack = %stack, %mode, status = %final_status, "stack operation complete");
    Ok(DeployOutcome {
        mode,
        stack_id,
        final_status,
    })
}
