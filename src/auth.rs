//! Credential providers for the streaming endpoint.
//!
//! The dispatcher only needs "give me the current session". Where the token
//! comes from (a configured static token, a Cognito user pool sign-in) is the
//! provider's business.

use crate::config::{AppConfig, CognitoConfig};
use crate::error::{ChatError, ChatResult};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

pub const FALLBACK_USER_NAME: &str = "User";

/// Tokens of the signed-in user. Both absent means nobody is signed in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthSession {
    pub access_token: Option<String>,
    pub id_token: Option<String>,
}

impl AuthSession {
    pub fn is_signed_in(&self) -> bool {
        self.access_token.is_some()
    }
}

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn fetch_session(&self) -> ChatResult<AuthSession>;

    async fn sign_out(&self) -> ChatResult<()>;

    /// Display name of the signed-in user, used to seed session ids.
    async fn user_name(&self) -> String {
        match self.fetch_session().await {
            Ok(session) => session
                .id_token
                .as_deref()
                .and_then(display_name_from_id_token)
                .unwrap_or_else(|| FALLBACK_USER_NAME.to_string()),
            Err(err) => {
                tracing::warn!(error = %err, "could not fetch user attributes");
                FALLBACK_USER_NAME.to_string()
            }
        }
    }
}

#[derive(Deserialize)]
struct IdTokenClaims {
    name: Option<String>,
    email: Option<String>,
}

/// `name`, else `email`, from the unverified payload of an ID token.
pub fn display_name_from_id_token(token: &str) -> Option<String> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: IdTokenClaims = serde_json::from_slice(&bytes).ok()?;
    claims
        .name
        .filter(|name| !name.is_empty())
        .or(claims.email.filter(|email| !email.is_empty()))
}

// ============================================
// Static token
// ============================================

pub struct StaticTokenProvider {
    token: Mutex<Option<String>>,
}

impl StaticTokenProvider {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: Mutex::new(token),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticTokenProvider {
    async fn fetch_session(&self) -> ChatResult<AuthSession> {
        let token = self.token.lock().expect("token store poisoned").clone();
        Ok(AuthSession {
            access_token: token,
            id_token: None,
        })
    }

    async fn sign_out(&self) -> ChatResult<()> {
        self.token.lock().expect("token store poisoned").take();
        Ok(())
    }
}

// ============================================
// Cognito user pool (USER_PASSWORD_AUTH)
// ============================================

const INITIATE_AUTH_TARGET: &str = "AWSCognitoIdentityProviderService.InitiateAuth";
const AMZ_JSON: &str = "application/x-amz-json-1.1";

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthRequest<'a> {
    auth_flow: &'a str,
    client_id: &'a str,
    auth_parameters: AuthParameters<'a>,
}

#[derive(Serialize)]
struct AuthParameters<'a> {
    #[serde(rename = "USERNAME")]
    username: &'a str,
    #[serde(rename = "PASSWORD")]
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    access_token: Option<String>,
    id_token: Option<String>,
}

#[derive(Deserialize)]
struct CognitoErrorBody {
    #[serde(rename = "__type")]
    kind: Option<String>,
    message: Option<String>,
}

pub struct CognitoPasswordProvider {
    client: reqwest::Client,
    endpoint: String,
    client_id: String,
    session: Mutex<AuthSession>,
}

impl CognitoPasswordProvider {
    pub fn new(config: &CognitoConfig) -> Self {
        Self::with_endpoint(
            format!("https://cognito-idp.{}.amazonaws.com/", config.region),
            config.client_id.clone(),
        )
    }

    pub fn with_endpoint(endpoint: String, client_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            client_id,
            session: Mutex::new(AuthSession::default()),
        }
    }

    pub async fn sign_in(&self, username: &str, password: &str) -> ChatResult<()> {
        let body = serde_json::to_vec(&InitiateAuthRequest {
            auth_flow: "USER_PASSWORD_AUTH",
            client_id: &self.client_id,
            auth_parameters: AuthParameters { username, password },
        })?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, AMZ_JSON)
            .header("X-Amz-Target", INITIATE_AUTH_TARGET)
            .body(body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let reason = serde_json::from_str::<CognitoErrorBody>(&text)
                .ok()
                .and_then(|err| err.message.or(err.kind))
                .unwrap_or(text);
            return Err(ChatError::auth(format!("Sign-in failed: {reason}")));
        }

        let parsed: InitiateAuthResponse = serde_json::from_str(&text)
            .map_err(|e| ChatError::auth(format!("Unexpected sign-in response: {e}")))?;
        let Some(result) = parsed.authentication_result else {
            let challenge = parsed.challenge_name.unwrap_or_else(|| "unknown".to_string());
            return Err(ChatError::auth(format!(
                "Sign-in requires an unsupported challenge: {challenge}"
            )));
        };

        tracing::info!(user = username, "signed in");
        *self.session.lock().expect("session store poisoned") = AuthSession {
            access_token: result.access_token,
            id_token: result.id_token,
        };
        Ok(())
    }
}

#[async_trait]
impl CredentialProvider for CognitoPasswordProvider {
    async fn fetch_session(&self) -> ChatResult<AuthSession> {
        Ok(self.session.lock().expect("session store poisoned").clone())
    }

    async fn sign_out(&self) -> ChatResult<()> {
        *self.session.lock().expect("session store poisoned") = AuthSession::default();
        Ok(())
    }
}

/// The provider the configuration asks for. Cognito wins over a static token.
pub enum ConfiguredAuth {
    Cognito(Arc<CognitoPasswordProvider>),
    Static(Arc<StaticTokenProvider>),
}

impl ConfiguredAuth {
    pub fn from_config(config: &AppConfig) -> Self {
        match &config.cognito {
            Some(cognito) => Self::Cognito(Arc::new(CognitoPasswordProvider::new(cognito))),
            None => Self::Static(Arc::new(StaticTokenProvider::new(
                config.access_token.clone(),
            ))),
        }
    }

    pub fn provider(&self) -> Arc<dyn CredentialProvider> {
        match self {
            Self::Cognito(provider) => provider.clone(),
            Self::Static(provider) => provider.clone(),
        }
    }

    pub fn needs_sign_in(&self) -> bool {
        matches!(self, Self::Cognito(_))
    }
}
