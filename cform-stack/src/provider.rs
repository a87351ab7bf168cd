//! The provisioning service as seen by the orchestrators.

use thiserror::Error;

use cform_core::types::{
    ChangeSetDescription, ChangeSetName, ChangeSetRequest, EventPage, StackDescription, StackName,
    StackRequest,
};

/// Error code the service returns when describing a stack that does not exist.
pub const STACK_NOT_FOUND_CODE: &str = "ValidationError";

/// Failure reported by a [`Provisioner`] call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The service answered with an error code.
    #[error("{code}: {message}")]
    Service { code: String, message: String },

    /// The service could not be reached or its answer could not be decoded.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ProviderError {
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::Service {
            code: code.into(),
            message: message.into(),
        }
    }

    /// True only for the describe-stack "does not exist" answer.
    pub fn is_stack_not_found(&self) -> bool {
        matches!(self, ProviderError::Service { code, .. } if code == STACK_NOT_FOUND_CODE)
    }
}

/// Operations consumed from the provisioning service.
pub trait Provisioner {
    fn describe_stack(&self, stack: &StackName) -> Result<StackDescription, ProviderError>;

    /// Returns the new stack's id.
    fn create_stack(&self, request: &StackRequest) -> Result<String, ProviderError>;

    /// Returns the updated stack's id.
    fn update_stack(&self, request: &StackRequest) -> Result<String, ProviderError>;

    /// One page of the event log, newest first. `next_token` comes from the
    /// previous page; `None` starts at the newest event.
    fn describe_stack_events(
        &self,
        stack: &StackName,
        next_token: Option<&str>,
    ) -> Result<EventPage, ProviderError>;

    /// Returns the change set's id.
    fn create_change_set(&self, request: &ChangeSetRequest) -> Result<String, ProviderError>;

    fn describe_change_set(
        &self,
        stack: &StackName,
        change_set: &ChangeSetName,
    ) -> Result<ChangeSetDescription, ProviderError>;

    fn delete_change_set(
        &self,
        stack: &StackName,
        change_set: &ChangeSetName,
    ) -> Result<(), ProviderError>;
}
