//! Change-set previews: create, wait, report, and clean up.
//!
//! Once a change set has been created on the service it is deleted again on
//! every exit path unless the caller asked to keep it. Cleanup lives in a
//! [`Drop`] impl so that early returns through `?` are covered too.

use std::time::Duration;

use tracing::{debug, info, warn};

use cform_core::types::{
    ChangeSetDescription, ChangeSetName, ChangeSetRequest, ChangeSetStatus, ResourceChange,
    StackName,
};

use crate::clock::Clock;
use crate::error::{provider_err, StackError};
use crate::provider::Provisioner;

/// How often to check a pending change set and how long to wait overall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeSetPolling {
    pub interval: Duration,
    pub deadline: Duration,
}

impl Default for ChangeSetPolling {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            deadline: Duration::from_secs(60),
        }
    }
}

/// Identity of a change set, and whether the service has accepted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSetHandle {
    pub stack_name: StackName,
    pub change_set_name: ChangeSetName,
    pub id: Option<String>,
    created: bool,
}

impl ChangeSetHandle {
    pub fn new(stack_name: StackName, change_set_name: ChangeSetName) -> Self {
        Self {
            stack_name,
            change_set_name,
            id: None,
            created: false,
        }
    }

    pub fn mark_created(&mut self, id: String) {
        self.id = Some(id);
        self.created = true;
    }

    pub fn is_created(&self) -> bool {
        self.created
    }
}

/// The proposed changes of a completed change set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSetPlan {
    pub change_set_id: String,
    pub changes: Vec<ResourceChange>,
}

struct PreviewGuard<'a, P: Provisioner + ?Sized> {
    provider: &'a P,
    handle: ChangeSetHandle,
    keep: bool,
}

impl<P: Provisioner + ?Sized> Drop for PreviewGuard<'_, P> {
    fn drop(&mut self) {
        if !self.handle.is_created() {
            return;
        }
        let stack = &self.handle.stack_name;
        let name = &self.handle.change_set_name;
        if self.keep {
            info!(stack = %stack, change_set = %name, "keeping change set");
            return;
        }
        match self.provider.delete_change_set(stack, name) {
            Ok(()) => info!(stack = %stack, change_set = %name, "deleted change set"),
            Err(e) => warn!(stack = %stack, change_set = %name, error = %e, "failed to delete change set"),
        }
    }
}

/// Create a change set, wait until it is ready, and return its changes.
///
/// The change set is deleted afterwards (success or failure) unless `keep`
/// is set. A failed delete is logged and never replaces the primary result.
pub fn plan<P, C>(
    provider: &P,
    clock: &C,
    request: &ChangeSetRequest,
    keep: bool,
    polling: ChangeSetPolling,
) -> Result<ChangeSetPlan, StackError>
where
    P: Provisioner + ?Sized,
    C: Clock + ?Sized,
{
    let stack = request.stack.stack_name.clone();
    let name = request.change_set_name.clone();
    let mut guard = PreviewGuard {
        provider,
        handle: ChangeSetHandle::new(stack.clone(), name.clone()),
        keep,
    };

    let id = provider
        .create_change_set(request)
        .map_err(|e| provider_err("create change set", e))?;
    info!(stack = %stack, change_set = %name, id = %id, "created change set");
    guard.handle.mark_created(id.clone());

    let description = wait_for_change_set(provider, clock, &stack, &name, polling)?;
    Ok(ChangeSetPlan {
        change_set_id: id,
        changes: description.changes,
    })
}

/// Poll until the change set is `CREATE_COMPLETE`.
///
/// Each round sleeps first and then checks the deadline, so no describe
/// call is made once the deadline has passed.
pub fn wait_for_change_set<P, C>(
    provider: &P,
    clock: &C,
    stack: &StackName,
    change_set: &ChangeSetName,
    polling: ChangeSetPolling,
) -> Result<ChangeSetDescription, StackError>
where
    P: Provisioner + ?Sized,
    C: Clock + ?Sized,
{
    let started = clock.now();
    loop {
        clock.sleep(polling.interval);
        let waited = clock.now().saturating_duration_since(started);
        if waited >= polling.deadline {
            return Err(StackError::ChangeSetTimeout { waited });
        }

        let description = provider
            .describe_change_set(stack, change_set)
            .map_err(|e| provider_err("describe change set", e))?;
        match description.status {
            ChangeSetStatus::CreateComplete => return Ok(description),
            ChangeSetStatus::Failed => {
                return Err(StackError::ChangeSetFailed {
                    reason: description.status_reason.unwrap_or_default(),
                })
            }
            status => debug!(change_set = %change_set, %status, "change set pending"),
        }
    }
}
