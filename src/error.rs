/// Every way a chat exchange can fail.
///
/// Malformed SSE frames are deliberately absent: the decoder drops them
/// and they never reach the user.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChatError {
    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Auth(String),

    #[error("HTTP error! status: {status}, body: {body}")]
    Http { status: u16, body: String },

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Stream(String),
}

impl ChatError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Config(err.to_string())
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
