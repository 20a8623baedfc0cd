use crate::catalog::{self, DEFAULT_MODEL, DEFAULT_PERSONALITY};
use crate::error::{ChatError, ChatResult};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Bundled defaults for builds that ship without a `.env` (mobile, web).
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

pub const ENDPOINT_VAR: &str = "AGENTCORE_CHAT_ENDPOINT";
pub const OUTPUTS_VAR: &str = "AGENTCORE_CHAT_OUTPUTS";
pub const ACCESS_TOKEN_VAR: &str = "AGENTCORE_CHAT_ACCESS_TOKEN";
pub const COGNITO_CLIENT_ID_VAR: &str = "COGNITO_CLIENT_ID";
pub const COGNITO_REGION_VAR: &str = "COGNITO_REGION";
pub const MODEL_VAR: &str = "AGENTCORE_CHAT_MODEL";
pub const PERSONALITY_VAR: &str = "AGENTCORE_CHAT_PERSONALITY";
pub const PRIME_VAR: &str = "AGENTCORE_CHAT_PRIME";

#[cfg(not(target_arch = "wasm32"))]
pub fn load_dotenv() {
    // First try to load from .env file (desktop dev)
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Some(path) = user_config_file()
        && dotenvy::from_path(&path).is_ok()
    {
        tracing::debug!(path = %path.display(), "loaded user config");
        return;
    }

    // Fall back to bundled config (mobile builds)
    load_bundled_config();
}

#[cfg(target_arch = "wasm32")]
pub fn load_dotenv() {
    load_bundled_config();
}

#[cfg(not(target_arch = "wasm32"))]
fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("agentcore-chat").join("config.env"))
}

fn load_bundled_config() {
    for (key, value) in parse_env_lines(BUNDLED_CONFIG) {
        // Only set if not already set (allow env override)
        if env::var(key).is_err() {
            // SAFETY: We're setting env vars at startup before any threads are spawned
            unsafe {
                env::set_var(key, value);
            }
        }
    }
}

fn parse_env_lines(source: &str) -> impl Iterator<Item = (&str, &str)> {
    source.lines().filter_map(|line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let (key, value) = line.split_once('=')?;
        Some((key.trim(), value.trim()))
    })
}

/// Outputs file written by the backend deployment.
#[derive(Debug, Default, Deserialize)]
pub struct DeploymentOutputs {
    #[serde(default)]
    pub auth: Option<AuthOutputs>,
    #[serde(default)]
    pub custom: Option<CustomOutputs>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthOutputs {
    pub aws_region: Option<String>,
    pub user_pool_client_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomOutputs {
    #[serde(rename = "bedrockAgentStreamUrl")]
    pub bedrock_agent_stream_url: Option<String>,
}

impl DeploymentOutputs {
    pub fn from_json(raw: &str) -> ChatResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| ChatError::config(format!("Invalid deployment outputs: {e}")))
    }

    pub fn load(path: &Path) -> ChatResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ChatError::config(format!("Cannot read outputs file {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    fn stream_url(&self) -> Option<String> {
        self.custom.as_ref()?.bedrock_agent_stream_url.clone()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CognitoConfig {
    pub client_id: String,
    pub region: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub endpoint: Option<String>,
    pub access_token: Option<String>,
    pub cognito: Option<CognitoConfig>,
    pub default_model: String,
    pub default_personality: String,
    pub prime_new_sessions: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            access_token: None,
            cognito: None,
            default_model: DEFAULT_MODEL.to_string(),
            default_personality: DEFAULT_PERSONALITY.to_string(),
            prime_new_sessions: true,
        }
    }
}

impl AppConfig {
    /// Build configuration from process environment variables.
    pub fn from_env() -> ChatResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ChatResult<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let outputs = match var(OUTPUTS_VAR) {
            Some(path) => DeploymentOutputs::load(Path::new(&path))?,
            None => DeploymentOutputs::default(),
        };

        let endpoint = var(ENDPOINT_VAR).or_else(|| outputs.stream_url());

        let auth_outputs = outputs.auth.as_ref();
        let client_id = var(COGNITO_CLIENT_ID_VAR)
            .or_else(|| auth_outputs.and_then(|auth| auth.user_pool_client_id.clone()));
        let region = var(COGNITO_REGION_VAR)
            .or_else(|| auth_outputs.and_then(|auth| auth.aws_region.clone()));
        let cognito = match (client_id, region) {
            (Some(client_id), Some(region)) => Some(CognitoConfig { client_id, region }),
            _ => None,
        };

        let default_model = var(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        if catalog::find_model(&default_model).is_none() {
            return Err(ChatError::config(format!("Unknown model: {default_model}")));
        }
        let default_personality =
            var(PERSONALITY_VAR).unwrap_or_else(|| DEFAULT_PERSONALITY.to_string());
        if catalog::find_personality(&default_personality).is_none() {
            return Err(ChatError::config(format!(
                "Unknown personality: {default_personality}"
            )));
        }

        let prime_new_sessions = var(PRIME_VAR)
            .map(|value| {
                matches!(
                    value.to_ascii_lowercase().as_str(),
                    "1" | "true" | "yes" | "on"
                )
            })
            .unwrap_or(true);

        Ok(Self {
            endpoint,
            access_token: var(ACCESS_TOKEN_VAR),
            cognito,
            default_model,
            default_personality,
            prime_new_sessions,
        })
    }
}
