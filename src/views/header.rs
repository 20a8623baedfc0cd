use crate::agent::HttpAgentBackend;
use crate::catalog::{MODEL_OPTIONS, PERSONALITY_OPTIONS};
use crate::chat::{ChatSession, PendingExchange};
use crate::error::ChatResult;
use crate::theme::ThemeMode;
use crate::ui::{AppServices, AuthState};
use crate::views::chat::launch_exchange;
use dioxus::prelude::*;
use std::sync::Arc;

fn finish_selection(
    backend: Arc<HttpAgentBackend>,
    chat: Signal<ChatSession>,
    result: ChatResult<Option<PendingExchange>>,
) {
    match result {
        Ok(exchange) => launch_exchange(backend, chat, exchange),
        Err(err) => tracing::warn!(error = %err, "selection rejected"),
    }
}

/// Selectors and New chat wait until the pending reply settles.
fn controls_locked(chat: &ChatSession) -> bool {
    chat.is_loading()
}

#[component]
pub fn ChatHeader(
    chat: Signal<ChatSession>,
    user_name: String,
    auth_state: Signal<AuthState>,
    theme: Signal<ThemeMode>,
) -> Element {
    let services = use_context::<AppServices>();
    let backend = use_signal(|| services.backend.clone());
    let mut chat = chat;
    let mut auth_state = auth_state;
    let mut theme = theme;

    let auth = services.auth.clone();
    let on_sign_out = move |_| {
        let provider = auth.provider();
        spawn(async move {
            if let Err(err) = provider.sign_out().await {
                tracing::warn!(error = %err, "sign-out failed");
            }
            auth_state.set(AuthState::SignedOut);
        });
    };

    let snapshot = chat.read();
    let current_model = snapshot.session().model.clone();
    let current_personality = snapshot.session().personality.clone();
    let locked = controls_locked(&snapshot);
    drop(snapshot);

    rsx! {
        div { class: "header",
            div {
                div { class: "header-title", "AgentCore Chat" }
                div { class: "header-subtitle", "Signed in as {user_name}" }
            }
            div { class: "header-controls",
                select {
                    title: "Model",
                    disabled: locked,
                    value: "{current_model}",
                    onchange: move |ev| {
                        let result = chat.with_mut(|session| session.change_model(&ev.value()));
                        finish_selection(backend(), chat, result);
                    },
                    for choice in MODEL_OPTIONS.iter() {
                        option {
                            key: "{choice.id}",
                            value: "{choice.id}",
                            selected: choice.id == current_model,
                            "{choice.name}"
                        }
                    }
                }
                select {
                    title: "Personality",
                    disabled: locked,
                    value: "{current_personality}",
                    onchange: move |ev| {
                        let result = chat.with_mut(|session| session.change_personality(&ev.value()));
                        finish_selection(backend(), chat, result);
                    },
                    for choice in PERSONALITY_OPTIONS.iter() {
                        option {
                            key: "{choice.id}",
                            value: "{choice.id}",
                            selected: choice.id == current_personality,
                            "{choice.name}"
                        }
                    }
                }
                button {
                    class: "btn btn-header", r#type: "button",
                    disabled: locked,
                    onclick: move |_| {
                        let exchange = chat.with_mut(|session| session.new_chat());
                        launch_exchange(backend(), chat, exchange);
                    },
                    "New chat"
                }
                button {
                    class: "btn btn-header", r#type: "button",
                    title: "Toggle theme",
                    onclick: move |_| theme.set(theme().toggled()),
                    "{theme().toggled().label()}"
                }
                if services.auth.needs_sign_in() {
                    button {
                        class: "btn btn-header", r#type: "button",
                        onclick: on_sign_out,
                        "Sign out"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatPolicy, ExchangeEvent, ExchangeUpdate};

    #[test]
    fn controls_lock_while_reply_pending() {
        let mut chat = ChatSession::new(None, ChatPolicy::default());
        assert!(!controls_locked(&chat));

        let exchange = chat.submit("Hello").unwrap();
        assert!(controls_locked(&chat));

        chat.apply(ExchangeUpdate {
            generation: exchange.generation,
            event: ExchangeEvent::Completed,
        });
        assert!(!controls_locked(&chat));
    }
}
