/// Client side of the streaming agent endpoint.
///
/// - `dispatcher` - authenticated POST of a prompt to the configured URL
/// - `backend` - the `AgentBackend` seam that yields a response byte stream
/// - `sse` - incremental decoding of that stream into token fragments
///
/// ```rust,no_run
/// use agentcore_chat::agent::{AgentBackend, Dispatcher, HttpAgentBackend, decode_stream};
/// use agentcore_chat::auth::StaticTokenProvider;
/// use agentcore_chat::types::AgentRequest;
/// use futures::StreamExt;
/// use std::sync::Arc;
///
/// # async fn example() -> agentcore_chat::ChatResult<()> {
/// let auth = Arc::new(StaticTokenProvider::new(Some("token".into())));
/// let backend = HttpAgentBackend::new(Dispatcher::new(Some("https://example/".into()), auth));
/// let request = AgentRequest {
///     prompt: "Hello".into(),
///     session_id: agentcore_chat::session::generate_session_id(None),
///     model: None,
///     personality: None,
/// };
/// let mut events = Box::pin(decode_stream(backend.open_stream(&request).await?));
/// while let Some(event) = events.next().await {
///     println!("{:?}", event?);
/// }
/// # Ok(())
/// # }
/// ```
mod backend;
mod dispatcher;
mod sse;

pub use backend::{AgentBackend, ByteStream, HttpAgentBackend};
pub use dispatcher::{Dispatcher, MISSING_CREDENTIALS, MISSING_ENDPOINT};
pub use sse::{DecodedChunk, SseDecoder, StreamEvent, decode_stream};
