//! Error types for cform-stack.

use std::time::Duration;

use thiserror::Error;

use cform_core::types::StackName;

use crate::provider::ProviderError;

/// All errors that can arise from stack and change-set operations.
#[derive(Debug, Error)]
pub enum StackError {
    /// A call to the provisioning service failed.
    #[error("{action} failed: {source}")]
    Provider {
        action: &'static str,
        #[source]
        source: ProviderError,
    },

    /// Paging through the stack event log failed; no events are returned.
    #[error("failed to fetch stack event pages: {0}")]
    EventPages(#[source] ProviderError),

    /// The service reported the change set as `FAILED`.
    #[error("cannot create change set: {reason}")]
    ChangeSetFailed { reason: String },

    /// The change set did not reach a terminal status before the deadline.
    #[error("change set creation timed out after {}s", waited.as_secs())]
    ChangeSetTimeout { waited: Duration },

    /// The stack operation settled in a rollback or failed status.
    #[error("stack {stack} settled in {status}: {reason}")]
    OperationFailed {
        stack: StackName,
        status: String,
        reason: String,
    },

    /// Writing operator output failed.
    #[error("failed to print stack events: {0}")]
    Output(#[from] std::io::Error),
}

/// Convenience constructor for [`StackError::Provider`].
pub(crate) fn provider_err(action: &'static str, source: ProviderError) -> StackError {
    StackError::Provider { action, source }
}
