#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeZone, Utc};

use cform_core::types::{
    ChangeSetDescription, ChangeSetName, ChangeSetRequest, ChangeSetStatus, EventPage,
    StackDescription, StackEvent, StackName, StackRequest,
};
use cform_stack::{Clock, ProviderError, Provisioner};

pub const BASE_EPOCH: i64 = 1_700_000_000;

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(BASE_EPOCH + secs, 0).unwrap()
}

pub fn event(secs: i64, status: &str, logical_id: &str) -> StackEvent {
    StackEvent {
        timestamp: at(secs),
        resource_status: status.to_string(),
        resource_type: "AWS::S3::Bucket".to_string(),
        logical_resource_id: logical_id.to_string(),
        resource_status_reason: None,
    }
}

pub fn stack(status: &str) -> StackDescription {
    StackDescription {
        stack_id: "arn:stack/web/1".to_string(),
        stack_name: "web".to_string(),
        stack_status: status.to_string(),
        stack_status_reason: None,
    }
}

pub fn not_found() -> ProviderError {
    ProviderError::service("ValidationError", "Stack with id web does not exist")
}

pub fn request() -> StackRequest {
    StackRequest {
        stack_name: StackName::from("web"),
        template_body: "Resources: {}\n".to_string(),
        parameters: Default::default(),
        capabilities: vec![],
        tags: Default::default(),
    }
}

pub fn change_set_request(name: &str) -> ChangeSetRequest {
    ChangeSetRequest {
        change_set_name: ChangeSetName::from(name),
        stack: request(),
    }
}

pub fn change_set(status: ChangeSetStatus, reason: Option<&str>) -> ChangeSetDescription {
    ChangeSetDescription {
        status,
        status_reason: reason.map(str::to_string),
        changes: vec![],
    }
}

/// Pops the front of a queue, but keeps serving the last entry forever.
fn sticky<T: Clone>(queue: &RefCell<VecDeque<T>>) -> Option<T> {
    let mut queue = queue.borrow_mut();
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

/// In-memory provisioning service.
///
/// The event log is a series of snapshots (newest event first); each scan
/// (a page request without a token) advances to the next snapshot, the last
/// one sticking. Pages are `page_size` events long, 0 meaning one page.
#[derive(Default)]
pub struct FakeProvisioner {
    pub stack_results: RefCell<VecDeque<Result<StackDescription, ProviderError>>>,
    pub event_snapshots: RefCell<VecDeque<Vec<StackEvent>>>,
    pub current_log: RefCell<Vec<StackEvent>>,
    pub page_size: Cell<usize>,
    /// 1-based page number within a scan that fails.
    pub fail_event_page: Cell<Option<usize>>,
    pub submit_error: RefCell<Option<ProviderError>>,
    pub created: RefCell<Vec<StackRequest>>,
    pub updated: RefCell<Vec<StackRequest>>,
    pub change_set_create_error: RefCell<Option<ProviderError>>,
    pub change_set_results: RefCell<VecDeque<Result<ChangeSetDescription, ProviderError>>>,
    pub delete_error: RefCell<Option<ProviderError>>,
    pub deleted: RefCell<Vec<ChangeSetName>>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stack_results(
        self,
        results: impl IntoIterator<Item = Result<StackDescription, ProviderError>>,
    ) -> Self {
        self.stack_results.borrow_mut().extend(results);
        self
    }

    pub fn with_event_snapshots(self, snapshots: impl IntoIterator<Item = Vec<StackEvent>>) -> Self {
        self.event_snapshots.borrow_mut().extend(snapshots);
        self
    }

    pub fn with_page_size(self, size: usize) -> Self {
        self.page_size.set(size);
        self
    }

    pub fn with_change_set_results(
        self,
        results: impl IntoIterator<Item = Result<ChangeSetDescription, ProviderError>>,
    ) -> Self {
        self.change_set_results.borrow_mut().extend(results);
        self
    }

    pub fn calls_named(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl Provisioner for FakeProvisioner {
    fn describe_stack(&self, _stack: &StackName) -> Result<StackDescription, ProviderError> {
        self.record("describe_stack".into());
        sticky(&self.stack_results).unwrap_or_else(|| Err(not_found()))
    }

    fn create_stack(&self, request: &StackRequest) -> Result<String, ProviderError> {
        self.record("create_stack".into());
        if let Some(err) = self.submit_error.borrow().clone() {
            return Err(err);
        }
        self.created.borrow_mut().push(request.clone());
        Ok("arn:stack/web/1".into())
    }

    fn update_stack(&self, request: &StackRequest) -> Result<String, ProviderError> {
        self.record("update_stack".into());
        if let Some(err) = self.submit_error.borrow().clone() {
            return Err(err);
        }
        self.updated.borrow_mut().push(request.clone());
        Ok("arn:stack/web/1".into())
    }

    fn describe_stack_events(
        &self,
        _stack: &StackName,
        next_token: Option<&str>,
    ) -> Result<EventPage, ProviderError> {
        self.record(format!("describe_stack_events:{}", next_token.unwrap_or("-")));

        if next_token.is_none() {
            if let Some(snapshot) = sticky(&self.event_snapshots) {
                *self.current_log.borrow_mut() = snapshot;
            }
        }

        let log = self.current_log.borrow();
        let offset: usize = next_token.map(|t| t.parse().unwrap()).unwrap_or(0);
        let size = match self.page_size.get() {
            0 => log.len().max(1),
            n => n,
        };
        let page_number = offset / size + 1;
        if self.fail_event_page.get() == Some(page_number) {
            return Err(ProviderError::Transport("connection reset".into()));
        }

        let end = (offset + size).min(log.len());
        let stack_events = log[offset.min(end)..end].to_vec();
        let next_token = (end < log.len()).then(|| end.to_string());
        Ok(EventPage {
            stack_events,
            next_token,
        })
    }

    fn create_change_set(&self, _request: &ChangeSetRequest) -> Result<String, ProviderError> {
        self.record("create_change_set".into());
        match self.change_set_create_error.borrow().clone() {
            Some(err) => Err(err),
            None => Ok("arn:changeSet/cs-1".into()),
        }
    }

    fn describe_change_set(
        &self,
        _stack: &StackName,
        _change_set: &ChangeSetName,
    ) -> Result<ChangeSetDescription, ProviderError> {
        self.record("describe_change_set".into());
        sticky(&self.change_set_results)
            .unwrap_or_else(|| Ok(change_set(ChangeSetStatus::CreatePending, None)))
    }

    fn delete_change_set(
        &self,
        _stack: &StackName,
        change_set: &ChangeSetName,
    ) -> Result<(), ProviderError> {
        self.record("delete_change_set".into());
        if let Some(err) = self.delete_error.borrow().clone() {
            return Err(err);
        }
        self.deleted.borrow_mut().push(change_set.clone());
        Ok(())
    }
}

/// Simulated time: `sleep` returns immediately and moves `now` forward.
pub struct ManualClock {
    start: Instant,
    offset: Cell<Duration>,
    pub sleeps: RefCell<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Cell::new(Duration::ZERO),
            sleeps: RefCell::new(Vec::new()),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.offset.get()
    }

    fn sleep(&self, duration: Duration) {
        self.offset.set(self.offset.get() + duration);
        self.sleeps.borrow_mut().push(duration);
    }
}
