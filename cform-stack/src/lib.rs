//! # cform-stack
//!
//! Create/update and change-set orchestration against a remote provisioning
//! service, with chronological event tailing.
//!
//! The service is reached only through the [`Provisioner`] trait; blocking
//! waits go through [`Clock`] so tests can simulate time.

pub mod change_set;
pub mod clock;
pub mod deploy;
pub mod error;
pub mod events;
pub mod provider;
pub mod render;

pub use change_set::{plan, wait_for_change_set, ChangeSetHandle, ChangeSetPlan, ChangeSetPolling};
pub use clock::{Clock, SystemClock};
pub use deploy::{deploy, probe_stack, DeployMode, DeployOutcome};
pub use error::StackError;
pub use events::{events_after, follow_operation, EventBatch, DEPLOY_POLL_INTERVAL};
pub use provider::{ProviderError, Provisioner, STACK_NOT_FOUND_CODE};
