use super::dispatcher::Dispatcher;
use crate::error::{ChatError, ChatResult};
use crate::types::AgentRequest;
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;

/// Body of a successful response, chunk by chunk.
pub type ByteStream = BoxStream<'static, ChatResult<Vec<u8>>>;

/// Anything that can turn a prompt into a streaming response body.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    async fn open_stream(&self, request: &AgentRequest) -> ChatResult<ByteStream>;
}

/// The deployed agent behind its streaming HTTP endpoint.
#[derive(Clone)]
pub struct HttpAgentBackend {
    dispatcher: Dispatcher,
}

impl HttpAgentBackend {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

#[async_trait]
impl AgentBackend for HttpAgentBackend {
    async fn open_stream(&self, request: &AgentRequest) -> ChatResult<ByteStream> {
        let response = self.dispatcher.dispatch(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => {
                    tracing::warn!(status = status.as_u16(), error = %err, "could not read error body");
                    format!("<unreadable: {err}>")
                }
            };
            return Err(ChatError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response
            .bytes_stream()
            .map(|item| item.map(|bytes| bytes.to_vec()).map_err(ChatError::from))
            .boxed())
    }
}
