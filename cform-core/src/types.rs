//! Domain types shared by the template and stack crates.
//!
//! Values exchanged with the provisioning service serialize with PascalCase
//! field names, matching the service's own request/response vocabulary.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name of a deployed stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackName(pub String);

impl fmt::Display for StackName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for StackName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for StackName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A strongly-typed name of a change-set preview.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangeSetName(pub String);

impl ChangeSetName {
    /// `cs-<YYYYMMDDHHMMSS>` for the given wall-clock time.
    pub fn timestamped(at: NaiveDateTime) -> Self {
        Self(format!("cs-{}", at.format("%Y%m%d%H%M%S")))
    }
}

impl fmt::Display for ChangeSetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ChangeSetName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ChangeSetName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Stack state
// ---------------------------------------------------------------------------

/// Coarse view of a remote stack, derived from its status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackState {
    NotFound,
    Exists,
    OperationInProgress,
    OperationComplete,
}

impl StackState {
    /// Derive the state from a stack status such as `UPDATE_IN_PROGRESS`.
    ///
    /// Statuses that are neither in progress nor complete (e.g.
    /// `ROLLBACK_FAILED`) map to [`StackState::Exists`].
    pub fn from_status(status: &str) -> Self {
        if status.ends_with("_IN_PROGRESS") {
            StackState::OperationInProgress
        } else if status.ends_with("_COMPLETE") {
            StackState::OperationComplete
        } else {
            StackState::Exists
        }
    }

    pub fn exists(self) -> bool {
        self != StackState::NotFound
    }
}

impl fmt::Display for StackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackState::NotFound => write!(f, "not-found"),
            StackState::Exists => write!(f, "exists"),
            StackState::OperationInProgress => write!(f, "operation-in-progress"),
            StackState::OperationComplete => write!(f, "operation-complete"),
        }
    }
}

// ---------------------------------------------------------------------------
// Service values
// ---------------------------------------------------------------------------

/// Result of describing a stack by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackDescription {
    pub stack_id: String,
    pub stack_name: String,
    pub stack_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_status_reason: Option<String>,
}

impl StackDescription {
    pub fn state(&self) -> StackState {
        StackState::from_status(&self.stack_status)
    }
}

/// One entry of a stack's event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackEvent {
    pub timestamp: DateTime<Utc>,
    pub resource_status: String,
    pub resource_type: String,
    pub logical_resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_status_reason: Option<String>,
}

/// One page of a stack's event log, newest event first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventPage {
    #[serde(default)]
    pub stack_events: Vec<StackEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Lifecycle status of a change-set preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeSetStatus {
    CreatePending,
    CreateInProgress,
    CreateComplete,
    DeletePending,
    DeleteInProgress,
    DeleteComplete,
    DeleteFailed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl ChangeSetStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeSetStatus::CreatePending => "CREATE_PENDING",
            ChangeSetStatus::CreateInProgress => "CREATE_IN_PROGRESS",
            ChangeSetStatus::CreateComplete => "CREATE_COMPLETE",
            ChangeSetStatus::DeletePending => "DELETE_PENDING",
            ChangeSetStatus::DeleteInProgress => "DELETE_IN_PROGRESS",
            ChangeSetStatus::DeleteComplete => "DELETE_COMPLETE",
            ChangeSetStatus::DeleteFailed => "DELETE_FAILED",
            ChangeSetStatus::Failed => "FAILED",
            ChangeSetStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ChangeSetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a change set would do to a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeAction {
    Add,
    Modify,
    Remove,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeAction::Add => write!(f, "Add"),
            ChangeAction::Modify => write!(f, "Modify"),
            ChangeAction::Remove => write!(f, "Remove"),
        }
    }
}

/// A single proposed resource change inside a change set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceChange {
    pub action: ChangeAction,
    pub logical_resource_id: String,
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
}

/// Result of describing a change set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangeSetDescription {
    pub status: ChangeSetStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
    #[serde(default)]
    pub changes: Vec<ResourceChange>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Payload of a create-stack or update-stack call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackRequest {
    pub stack_name: StackName,
    pub template_body: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

/// Payload of a create-change-set call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangeSetRequest {
    pub change_set_name: ChangeSetName,
    #[serde(flatten)]
    pub stack: StackRequest,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
