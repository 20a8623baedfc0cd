//! Conversation state and the transitions that mutate it.
//!
//! `ChatSession` is the only owner of the message list, the streaming
//! buffer and the current session. Front ends hold one and call its
//! transition functions; network work happens in [`run_exchange`], which
//! reports back through [`ChatSession::apply`].
//!
//! Every launched exchange carries the generation it started under. Any
//! reset bumps the generation, so results of an exchange that was still in
//! flight when the user started a new chat are dropped instead of leaking
//! into the new conversation.

use crate::agent::{AgentBackend, StreamEvent, decode_stream};
use crate::catalog;
use crate::config::AppConfig;
use crate::error::{ChatError, ChatResult};
use crate::session::generate_session_id;
use crate::types::{AgentRequest, Message, Role, Session};
use futures::StreamExt;
use time::OffsetDateTime;

/// Prompt of the silent exchange that opens a primed session.
pub const PRIMING_PROMPT: &str = "Hello";
pub const WELCOME_TEXT: &str = "Hello! I'm your AI assistant. How can I help you today?";
pub const ERROR_PREFIX: &str = "**Error:**";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChatPolicy {
    /// Open every new session with a silent [`PRIMING_PROMPT`] exchange
    /// instead of a canned welcome message.
    pub prime_new_sessions: bool,
}

impl Default for ChatPolicy {
    fn default() -> Self {
        Self {
            prime_new_sessions: true,
        }
    }
}

/// A request the state machine wants sent, tagged with its generation.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingExchange {
    pub generation: u64,
    pub request: AgentRequest,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExchangeEvent {
    Fragment(String),
    Completed,
    Failed(ChatError),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExchangeUpdate {
    pub generation: u64,
    pub event: ExchangeEvent,
}

#[derive(Clone, Debug)]
pub struct ChatSession {
    user_seed: Option<String>,
    policy: ChatPolicy,
    session: Session,
    messages: Vec<Message>,
    streaming: String,
    loading: bool,
    input: String,
    generation: u64,
    message_seq: u64,
}

impl ChatSession {
    pub fn new(user_seed: Option<&str>, policy: ChatPolicy) -> Self {
        Self::with_selection(
            user_seed,
            policy,
            catalog::DEFAULT_MODEL,
            catalog::DEFAULT_PERSONALITY,
        )
    }

    pub fn from_config(user_seed: Option<&str>, config: &AppConfig) -> Self {
        Self::with_selection(
            user_seed,
            ChatPolicy {
                prime_new_sessions: config.prime_new_sessions,
            },
            &config.default_model,
            &config.default_personality,
        )
    }

    fn with_selection(
        user_seed: Option<&str>,
        policy: ChatPolicy,
        model: &str,
        personality: &str,
    ) -> Self {
        let session = Session {
            session_id: generate_session_id(user_seed),
            model: model.to_string(),
            personality: personality.to_string(),
        };
        tracing::info!(session_id = %session.session_id, "new chat session");
        Self {
            user_seed: user_seed.map(str::to_string),
            policy,
            session,
            messages: Vec::new(),
            streaming: String::new(),
            loading: false,
            input: String::new(),
            generation: 0,
            message_seq: 0,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Text of the response currently streaming in; empty when idle.
    pub fn streaming_text(&self) -> &str {
        &self.streaming
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn policy(&self) -> ChatPolicy {
        self.policy
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Open the conversation according to policy: either a priming exchange
    /// to send, or a welcome message.
    pub fn start(&mut self) -> Option<PendingExchange> {
        if self.policy.prime_new_sessions {
            self.prime()
        } else {
            if self.messages.is_empty() && !self.loading {
                self.push_message(Role::Agent, WELCOME_TEXT.to_string());
            }
            None
        }
    }

    /// Send the user's text. `None` when it is blank or a reply is pending.
    pub fn submit(&mut self, text: &str) -> Option<PendingExchange> {
        self.launch(text, false)
    }

    /// Silent initialization exchange: no user message is shown.
    pub fn prime(&mut self) -> Option<PendingExchange> {
        self.launch(PRIMING_PROMPT, true)
    }

    fn launch(&mut self, text: &str, silent: bool) -> Option<PendingExchange> {
        let prompt = text.trim();
        if prompt.is_empty() || self.loading {
            return None;
        }

        if !silent {
            self.push_message(Role::User, prompt.to_string());
        }
        self.input.clear();
        self.streaming.clear();
        self.loading = true;
        self.generation += 1;

        Some(PendingExchange {
            generation: self.generation,
            request: AgentRequest {
                prompt: prompt.to_string(),
                session_id: self.session.session_id.clone(),
                model: Some(self.session.model.clone()),
                personality: Some(self.session.personality.clone()),
            },
        })
    }

    /// Fold one driver result into the state. Returns `false` when the
    /// update belongs to an exchange that is no longer current.
    pub fn apply(&mut self, update: ExchangeUpdate) -> bool {
        if update.generation != self.generation || !self.loading {
            tracing::debug!(
                stale = update.generation,
                current = self.generation,
                "dropping update from superseded exchange"
            );
            return false;
        }

        match update.event {
            ExchangeEvent::Fragment(text) => self.streaming.push_str(&text),
            ExchangeEvent::Completed => {
                let text = std::mem::take(&mut self.streaming);
                self.push_message(Role::Agent, text);
                self.loading = false;
            }
            ExchangeEvent::Failed(err) => {
                self.streaming.clear();
                self.push_message(Role::Agent, format!("{ERROR_PREFIX} {err}"));
                self.loading = false;
            }
        }
        true
    }

    /// Throw the conversation away and start over under a new session id.
    /// A request still in flight is not cancelled; its results are ignored.
    pub fn new_chat(&mut self) -> Option<PendingExchange> {
        self.reset();
        self.start()
    }

    pub fn change_model(&mut self, model: &str) -> ChatResult<Option<PendingExchange>> {
        if catalog::find_model(model).is_none() {
            return Err(ChatError::config(format!("Unknown model: {model}")));
        }
        if self.session.model == model {
            return Ok(None);
        }
        tracing::info!(from = %self.session.model, to = model, "model changed");
        self.session.model = model.to_string();
        Ok(self.new_chat())
    }

    pub fn change_personality(&mut self, personality: &str) -> ChatResult<Option<PendingExchange>> {
        if catalog::find_personality(personality).is_none() {
            return Err(ChatError::config(format!(
                "Unknown personality: {personality}"
            )));
        }
        if self.session.personality == personality {
            return Ok(None);
        }
        tracing::info!(
            from = %self.session.personality,
            to = personality,
            "personality changed"
        );
        self.session.personality = personality.to_string();
        Ok(self.new_chat())
    }

    fn reset(&mut self) {
        self.messages.clear();
        self.streaming.clear();
        self.input.clear();
        self.loading = false;
        self.generation += 1;
        self.session.session_id = generate_session_id(self.user_seed.as_deref());
        tracing::info!(session_id = %self.session.session_id, "new chat session");
    }

    fn push_message(&mut self, role: Role, text: String) {
        let timestamp = OffsetDateTime::now_utc();
        self.message_seq += 1;
        let id = format!(
            "{}-{}",
            timestamp.unix_timestamp_nanos() / 1_000_000,
            self.message_seq
        );
        self.messages.push(Message {
            id,
            text,
            role,
            timestamp,
        });
    }
}

/// Run one exchange against `backend`, reporting each fragment and then
/// exactly one `Completed` or `Failed` through `apply`.
pub async fn run_exchange<B, F>(backend: &B, exchange: &PendingExchange, mut apply: F)
where
    B: AgentBackend + ?Sized,
    F: FnMut(ExchangeUpdate),
{
    let generation = exchange.generation;
    let mut report = |event: ExchangeEvent| apply(ExchangeUpdate { generation, event });

    match stream_reply(backend, &exchange.request, &mut report).await {
        Ok(()) => report(ExchangeEvent::Completed),
        Err(err) => {
            tracing::error!(
                session_id = %exchange.request.session_id,
                error = %err,
                "chat exchange failed"
            );
            report(ExchangeEvent::Failed(err));
        }
    }
}

async fn stream_reply<B>(
    backend: &B,
    request: &AgentRequest,
    report: &mut impl FnMut(ExchangeEvent),
) -> ChatResult<()>
where
    B: AgentBackend + ?Sized,
{
    let body = backend.open_stream(request).await?;
    let mut events = std::pin::pin!(decode_stream(body));
    while let Some(event) = events.next().await {
        match event? {
            StreamEvent::Token(text) => report(ExchangeEvent::Fragment(text)),
            StreamEvent::ServerError(message) => return Err(ChatError::Stream(message)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(generation: u64, text: &str) -> ExchangeUpdate {
        ExchangeUpdate {
            generation,
            event: ExchangeEvent::Fragment(text.to_string()),
        }
    }

    fn completed(generation: u64) -> ExchangeUpdate {
        ExchangeUpdate {
            generation,
            event: ExchangeEvent::Completed,
        }
    }

    #[test]
    fn submit_builds_request_from_session() {
        let mut chat = ChatSession::new(Some("alice"), ChatPolicy::default());
        chat.set_input("  What is AI?  ");
        let exchange = chat.submit("  What is AI?  ").unwrap();

        assert_eq!(exchange.request.prompt, "What is AI?");
        assert_eq!(exchange.request.session_id, chat.session().session_id);
        assert!(exchange.request.session_id.starts_with("alice"));
        assert_eq!(exchange.request.model.as_deref(), Some(catalog::DEFAULT_MODEL));
        assert_eq!(
            exchange.request.personality.as_deref(),
            Some(catalog::DEFAULT_PERSONALITY)
        );
        assert!(chat.is_loading());
        assert!(chat.input().is_empty());
        assert_eq!(chat.messages().len(), 1);
        assert!(chat.messages()[0].is_user());
    }

    #[test]
    fn blank_submit_is_ignored() {
        let mut chat = ChatSession::new(None, ChatPolicy::default());
        assert!(chat.submit("   ").is_none());
        assert!(!chat.is_loading());
        assert!(chat.messages().is_empty());
    }

    #[test]
    fn submit_while_awaiting_is_noop() {
        let mut chat = ChatSession::new(None, ChatPolicy::default());
        let first = chat.submit("one").unwrap();
        assert!(chat.submit("two").is_none());
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.generation(), first.generation);
    }

    #[test]
    fn fragments_grow_buffer_until_completed() {
        let mut chat = ChatSession::new(None, ChatPolicy::default());
        let exchange = chat.submit("Hello").unwrap();
        assert!(chat.apply(fragment(exchange.generation, "Hi ")));
        assert_eq!(chat.streaming_text(), "Hi ");
        assert!(chat.apply(fragment(exchange.generation, "there!")));
        assert_eq!(chat.streaming_text(), "Hi there!");
        assert!(chat.apply(completed(exchange.generation)));

        assert_eq!(chat.streaming_text(), "");
        assert!(!chat.is_loading());
        let last = chat.messages().last().unwrap();
        assert!(!last.is_user());
        assert_eq!(last.text, "Hi there!");
    }

    #[test]
    fn failure_appends_single_error_message() {
        let mut chat = ChatSession::new(None, ChatPolicy::default());
        let exchange = chat.submit("Hello").unwrap();
        chat.apply(fragment(exchange.generation, "partial"));
        chat.apply(ExchangeUpdate {
            generation: exchange.generation,
            event: ExchangeEvent::Failed(ChatError::auth("No credentials available")),
        });

        assert_eq!(chat.messages().len(), 2);
        assert_eq!(
            chat.messages()[1].text,
            "**Error:** No credentials available"
        );
        assert!(!chat.is_loading());
        assert_eq!(chat.streaming_text(), "");
    }

    #[test]
    fn priming_adds_no_user_message() {
        let mut chat = ChatSession::new(None, ChatPolicy::default());
        let exchange = chat.start().unwrap();
        assert_eq!(exchange.request.prompt, PRIMING_PROMPT);
        assert!(chat.messages().is_empty());
        chat.apply(fragment(exchange.generation, "Welcome!"));
        chat.apply(completed(exchange.generation));
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].text, "Welcome!");
    }

    #[test]
    fn unprimed_start_shows_welcome() {
        let mut chat = ChatSession::new(
            None,
            ChatPolicy {
                prime_new_sessions: false,
            },
        );
        assert!(chat.start().is_none());
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].text, WELCOME_TEXT);
        assert!(chat.start().is_none());
        assert_eq!(chat.messages().len(), 1);
    }

    #[test]
    fn new_chat_discards_stale_stream() {
        let mut chat = ChatSession::new(
            None,
            ChatPolicy {
                prime_new_sessions: false,
            },
        );
        let old_id = chat.session().session_id.clone();
        let exchange = chat.submit("Hello").unwrap();
        chat.apply(fragment(exchange.generation, "Hi"));

        assert!(chat.new_chat().is_none());
        assert_ne!(chat.session().session_id, old_id);
        assert!(!chat.is_loading());
        assert_eq!(chat.streaming_text(), "");
        assert_eq!(chat.messages().len(), 1);

        assert!(!chat.apply(fragment(exchange.generation, " there")));
        assert!(!chat.apply(completed(exchange.generation)));
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].text, WELCOME_TEXT);
    }

    #[test]
    fn stale_update_cannot_hijack_primed_exchange() {
        let mut chat = ChatSession::new(None, ChatPolicy::default());
        let old = chat.submit("Hello").unwrap();
        let primed = chat.new_chat().unwrap();
        assert!(chat.is_loading());

        assert!(!chat.apply(fragment(old.generation, "old reply")));
        assert!(chat.apply(fragment(primed.generation, "fresh")));
        assert!(chat.apply(completed(primed.generation)));
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].text, "fresh");
    }

    #[test]
    fn model_and_personality_changes_reset_session() {
        let mut chat = ChatSession::new(None, ChatPolicy::default());
        chat.submit("Hello");
        let first_id = chat.session().session_id.clone();

        let exchange = chat
            .change_model("us.amazon.nova-pro-v1:0")
            .unwrap()
            .unwrap();
        assert_ne!(chat.session().session_id, first_id);
        assert!(chat.messages().is_empty());
        assert_eq!(
            exchange.request.model.as_deref(),
            Some("us.amazon.nova-pro-v1:0")
        );
        chat.apply(completed(exchange.generation));

        let second_id = chat.session().session_id.clone();
        let exchange = chat.change_personality("silly").unwrap().unwrap();
        assert_ne!(chat.session().session_id, second_id);
        assert_eq!(exchange.request.personality.as_deref(), Some("silly"));
    }

    #[test]
    fn unchanged_or_unknown_selection() {
        let mut chat = ChatSession::new(None, ChatPolicy::default());
        let id = chat.session().session_id.clone();
        assert_eq!(chat.change_model(catalog::DEFAULT_MODEL), Ok(None));
        assert_eq!(chat.session().session_id, id);
        assert!(matches!(
            chat.change_personality("grumpy"),
            Err(ChatError::Config(_))
        ));
        assert_eq!(chat.session().personality, catalog::DEFAULT_PERSONALITY);
    }

    #[test]
    fn message_ids_are_unique() {
        let mut chat = ChatSession::new(None, ChatPolicy::default());
        for prompt in ["a", "b", "c"] {
            let exchange = chat.submit(prompt).unwrap();
            chat.apply(completed(exchange.generation));
        }
        let mut ids: Vec<_> = chat.messages().iter().map(|m| m.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }
}
