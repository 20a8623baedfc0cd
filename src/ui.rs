use crate::agent::{Dispatcher, HttpAgentBackend};
use crate::auth::ConfiguredAuth;
use crate::config::AppConfig;
use crate::theme::{BASE_CSS, ThemeMode, theme_css};
use crate::views::{ChatView, LoginView};
use dioxus::prelude::*;
use std::sync::Arc;

/// Long-lived collaborators handed to the component tree as context.
#[derive(Clone)]
pub struct AppServices {
    pub config: AppConfig,
    pub auth: Arc<ConfiguredAuth>,
    pub backend: Arc<HttpAgentBackend>,
}

impl AppServices {
    pub fn from_config(config: AppConfig) -> Self {
        let auth = Arc::new(ConfiguredAuth::from_config(&config));
        let dispatcher = Dispatcher::new(config.endpoint.clone(), auth.provider());
        Self {
            config,
            auth,
            backend: Arc::new(HttpAgentBackend::new(dispatcher)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthState {
    Checking,
    SignedOut,
    SignedIn(String),
}

#[component]
pub fn App() -> Element {
    let services = use_context::<AppServices>();
    let theme = use_signal(ThemeMode::default);
    let mut auth_state = use_signal(|| AuthState::Checking);

    use_hook(|| {
        let provider = services.auth.provider();
        let needs_sign_in = services.auth.needs_sign_in();
        spawn(async move {
            let signed_in = provider
                .fetch_session()
                .await
                .map(|session| session.is_signed_in())
                .unwrap_or(false);
            if needs_sign_in && !signed_in {
                auth_state.set(AuthState::SignedOut);
            } else {
                auth_state.set(AuthState::SignedIn(provider.user_name().await));
            }
        });
    });

    rsx! {
        ThemeStyles { theme }
        div { class: "app",
            match auth_state() {
                AuthState::Checking => rsx! {
                    div { class: "centered-panel",
                        span { class: "shimmer-text", "Loading…" }
                    }
                },
                AuthState::SignedOut => rsx! {
                    LoginView { auth_state }
                },
                AuthState::SignedIn(user_name) => rsx! {
                    ChatView { user_name, auth_state, theme }
                },
            }
        }
    }
}

#[component]
fn ThemeStyles(theme: Signal<ThemeMode>) -> Element {
    let palette = theme_css(theme());
    rsx! {
        style { dangerous_inner_html: "{palette}" }
        style { dangerous_inner_html: "{BASE_CSS}" }
    }
}
