//! cform core library — domain types, stack configuration, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes and the values exchanged with the provisioning service
//! - [`config`] — stack config file loading and per-invocation settings
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{PlanSettings, StackConfig, StackSettings, TemplateSettings};
pub use error::ConfigError;
pub use types::{
    ChangeAction, ChangeSetDescription, ChangeSetName, ChangeSetRequest, ChangeSetStatus,
    EventPage, ResourceChange, StackDescription, StackEvent, StackName, StackRequest, StackState,
};
