//! Blocking JSON client for the provisioning gateway.
//!
//! Every operation is `POST <endpoint>/<Operation>` with a PascalCase JSON
//! body. Error responses carry `{"Code": "...", "Message": "..."}`.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use cform_core::{
    ChangeSetDescription, ChangeSetName, ChangeSetRequest, EventPage, StackDescription, StackName,
    StackRequest,
};
use cform_stack::{ProviderError, Provisioner};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorBody {
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StackIdBody {
    stack_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ChangeSetIdBody {
    id: String,
}

pub struct GatewayClient {
    agent: ureq::Agent,
    endpoint: String,
}

impl GatewayClient {
    pub fn new(endpoint: &str) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self {
            agent,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    fn send(&self, operation: &str, body: impl Serialize) -> Result<ureq::Response, ProviderError> {
        let url = format!("{}/{operation}", self.endpoint);
        tracing::debug!(%url, "gateway request");
        match self.agent.post(&url).send_json(body) {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(status, response)) => {
                let text = response.into_string().unwrap_or_default();
                Err(service_error(status, &text))
            }
            Err(ureq::Error::Transport(err)) => Err(ProviderError::Transport(err.to_string())),
        }
    }

    fn call<T: DeserializeOwned>(
        &self,
        operation: &str,
        body: impl Serialize,
    ) -> Result<T, ProviderError> {
        self.send(operation, body)?.into_json().map_err(|e| {
            ProviderError::Transport(format!("invalid {operation} response: {e}"))
        })
    }
}

/// Map a non-2xx response body to a [`ProviderError`].
fn service_error(status: u16, body: &str) -> ProviderError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => ProviderError::Service {
            code: err.code,
            message: err.message,
        },
        Err(_) => ProviderError::Transport(format!("HTTP {status}: {}", body.trim())),
    }
}

impl Provisioner for GatewayClient {
    fn describe_stack(&self, stack: &StackName) -> Result<StackDescription, ProviderError> {
        self.call("DescribeStack", json!({ "StackName": stack }))
    }

    fn create_stack(&self, request: &StackRequest) -> Result<String, ProviderError> {
        let body: StackIdBody = self.call("CreateStack", request)?;
        Ok(body.stack_id)
    }

    fn update_stack(&self, request: &StackRequest) -> Result<String, ProviderError> {
        let body: StackIdBody = self.call("UpdateStack", request)?;
        Ok(body.stack_id)
    }

    fn describe_stack_events(
        &self,
        stack: &StackName,
        next_token: Option<&str>,
    ) -> Result<EventPage, ProviderError> {
        let mut body = json!({ "StackName": stack });
        if let Some(token) = next_token {
            body["NextToken"] = json!(token);
        }
        self.call("DescribeStackEvents", body)
    }

    fn create_change_set(&self, request: &ChangeSetRequest) -> Result<String, ProviderError> {
        let body: ChangeSetIdBody = self.call("CreateChangeSet", request)?;
        Ok(body.id)
    }

    fn describe_change_set(
        &self,
        stack: &StackName,
        change_set: &ChangeSetName,
    ) -> Result<ChangeSetDescription, ProviderError> {
        self.call(
            "DescribeChangeSet",
            json!({ "StackName": stack, "ChangeSetName": change_set }),
        )
    }

    fn delete_change_set(
        &self,
        stack: &StackName,
        change_set: &ChangeSetName,
    ) -> Result<(), ProviderError> {
        self.send(
            "DeleteChangeSet",
            json!({ "StackName": stack, "ChangeSetName": change_set }),
        )?;
        Ok(())
    }
}
