use crate::agent::HttpAgentBackend;
use crate::chat::{ChatSession, ERROR_PREFIX, PendingExchange, run_exchange};
use crate::markdown::render_markdown;
use crate::theme::ThemeMode;
use crate::types::{Message, Role};
use crate::ui::{AppServices, AuthState};
use crate::views::header::ChatHeader;
use dioxus::events::Key;
use dioxus::prelude::*;
use std::sync::Arc;
use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};

const MESSAGE_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour repr:12 padding:none]:[minute] [period]");

fn format_message_timestamp(timestamp: OffsetDateTime) -> Option<String> {
    let mut datetime = timestamp;
    if let Ok(offset) = UtcOffset::current_local_offset() {
        datetime = datetime.to_offset(offset);
    }
    datetime.format(MESSAGE_TIME_FORMAT).ok()
}

fn role_class(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Agent => "agent",
    }
}

/// Send `exchange` in the background, folding every update back into `chat`.
pub(crate) fn launch_exchange(
    backend: Arc<HttpAgentBackend>,
    chat: Signal<ChatSession>,
    exchange: Option<PendingExchange>,
) {
    let Some(exchange) = exchange else {
        return;
    };
    let mut chat = chat;
    spawn(async move {
        run_exchange(backend.as_ref(), &exchange, |update| {
            chat.with_mut(|session| {
                session.apply(update);
            });
        })
        .await;
    });
}

#[component]
pub fn ChatView(
    user_name: String,
    auth_state: Signal<AuthState>,
    theme: Signal<ThemeMode>,
) -> Element {
    let services = use_context::<AppServices>();
    let seed = user_name.clone();
    let config = services.config.clone();
    let mut chat = use_signal(move || ChatSession::from_config(Some(&seed), &config));

    let backend = use_signal(|| services.backend.clone());
    use_hook(move || {
        let exchange = chat.with_mut(|session| session.start());
        launch_exchange(backend(), chat, exchange);
    });

    let mut send_message = move || {
        let text = chat.read().input().to_string();
        let exchange = chat.with_mut(|session| session.submit(&text));
        launch_exchange(backend(), chat, exchange);
    };

    let snapshot = chat.read();
    let messages: Vec<Message> = snapshot.messages().to_vec();
    let streaming = snapshot.streaming_text().to_string();
    let loading = snapshot.is_loading();
    let input = snapshot.input().to_string();
    drop(snapshot);

    rsx! {
        ChatHeader { chat, user_name, auth_state, theme }
        div { class: "main-container",
            div { id: "chat-list", class: "chat-list",
                for msg in messages.iter() {
                    div { key: "{msg.id}", class: format_args!("message-row {}", role_class(msg.role)),
                        if !msg.is_user() { div { class: "avatar", "AI" } }
                        div { class: "message-stack",
                            if msg.is_user() {
                                div { class: "bubble user", "{msg.text}" }
                            } else {
                                AgentBubble { content: msg.text.clone(), show_copy: true }
                            }
                            if let Some(ts) = format_message_timestamp(msg.timestamp) {
                                div { class: format_args!(
                                        "message-meta {}",
                                        if msg.is_user() { "align-end" } else { "align-start" }
                                    ),
                                    span { class: "message-timestamp", "{ts}" }
                                }
                            }
                        }
                    }
                }
                if loading {
                    div { class: "message-row agent",
                        div { class: "avatar", "AI" }
                        div { class: "message-stack",
                            if streaming.is_empty() {
                                div { class: "bubble agent",
                                    span { class: "shimmer-text", "Thinking…" }
                                }
                            } else {
                                AgentBubble { content: streaming.clone(), show_copy: false }
                            }
                        }
                    }
                }
            }

            form { class: "composer",
                onsubmit: move |ev: FormEvent| {
                    ev.prevent_default();
                    send_message();
                },
                div { class: "composer-inner",
                    textarea {
                        rows: "1", placeholder: "Type your message…",
                        value: "{input}",
                        oninput: move |ev| chat.with_mut(|session| session.set_input(ev.value())),
                        onkeydown: move |ev| {
                            if ev.key() == Key::Enter && !ev.modifiers().shift() {
                                ev.prevent_default();
                                send_message();
                            }
                        },
                        disabled: loading, autofocus: true,
                    }
                    button {
                        class: "btn btn-primary", r#type: "submit",
                        disabled: loading || input.trim().is_empty(),
                        "Send"
                    }
                }
            }
        }
    }
}

#[component]
fn AgentBubble(content: String, show_copy: bool) -> Element {
    let content_html = render_markdown(&content);
    let bubble_class = if content.starts_with(ERROR_PREFIX) {
        "bubble agent error"
    } else {
        "bubble agent"
    };
    let copy_payload = content.clone();
    let on_copy = move |_| {
        let raw = copy_payload.clone();
        spawn(async move {
            #[cfg(any(feature = "desktop", feature = "mobile"))]
            {
                match arboard::Clipboard::new() {
                    Ok(mut cb) => {
                        if let Err(err) = cb.set_text(raw) {
                            tracing::warn!(error = %err, "clipboard write failed");
                        }
                    }
                    Err(err) => tracing::warn!(error = %err, "clipboard unavailable"),
                }
            }
            #[cfg(not(any(feature = "desktop", feature = "mobile")))]
            let _ = raw;
        });
    };

    rsx! {
        div { class: bubble_class,
            if show_copy {
                div { class: "bubble-controls",
                    button { class: "action-btn", title: "Copy markdown", onclick: on_copy, "Copy" }
                }
            }
            div { class: "md", dangerous_inner_html: "{content_html}" }
        }
    }
}
