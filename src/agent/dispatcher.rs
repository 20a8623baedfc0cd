use crate::auth::CredentialProvider;
use crate::error::{ChatError, ChatResult};
use crate::types::AgentRequest;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::sync::Arc;

pub const MISSING_ENDPOINT: &str =
    "Lambda function URL not available. Please check your deployment.";
pub const MISSING_CREDENTIALS: &str = "No credentials available. User must be authenticated.";

/// POSTs prompts to the streaming endpoint on behalf of the signed-in user.
///
/// Returns the raw response; reading the status and body is left to the
/// caller.
#[derive(Clone)]
pub struct Dispatcher {
    client: Client,
    endpoint: Option<String>,
    credentials: Arc<dyn CredentialProvider>,
}

impl Dispatcher {
    pub fn new(endpoint: Option<String>, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            credentials,
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub async fn dispatch(&self, payload: &AgentRequest) -> ChatResult<reqwest::Response> {
        let endpoint = self
            .endpoint
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ChatError::config(MISSING_ENDPOINT))?;

        let session = self.credentials.fetch_session().await?;
        let token = session
            .access_token
            .ok_or_else(|| ChatError::auth(MISSING_CREDENTIALS))?;

        tracing::debug!(
            session_id = %payload.session_id,
            model = payload.model.as_deref().unwrap_or("-"),
            personality = payload.personality.as_deref().unwrap_or("-"),
            "dispatching prompt"
        );

        let response = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/event-stream")
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?;
        Ok(response)
    }
}
