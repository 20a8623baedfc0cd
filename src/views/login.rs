use crate::auth::{ConfiguredAuth, CredentialProvider};
use crate::ui::{AppServices, AuthState};
use dioxus::prelude::*;

#[component]
pub fn LoginView(auth_state: Signal<AuthState>) -> Element {
    let services = use_context::<AppServices>();
    let mut auth_state = auth_state;
    let mut username = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut busy = use_signal(|| false);

    let on_submit = move |ev: FormEvent| {
        ev.prevent_default();
        if busy() {
            return;
        }
        let ConfiguredAuth::Cognito(provider) = services.auth.as_ref() else {
            return;
        };
        let provider = provider.clone();
        let name = username().trim().to_string();
        let secret = password();
        busy.set(true);
        error.set(None);
        spawn(async move {
            match provider.sign_in(&name, &secret).await {
                Ok(()) => {
                    let display = provider.user_name().await;
                    auth_state.set(AuthState::SignedIn(display));
                }
                Err(err) => {
                    tracing::warn!(error = %err, "sign-in rejected");
                    error.set(Some(err.to_string()));
                    password.set(String::new());
                }
            }
            busy.set(false);
        });
    };

    rsx! {
        div { class: "centered-panel",
            form { class: "login-form", onsubmit: on_submit,
                div { class: "header-title", "AgentCore Chat" }
                div { class: "text-muted", "Sign in to continue" }
                input {
                    r#type: "text", placeholder: "Username", autofocus: true,
                    value: "{username}", oninput: move |ev| username.set(ev.value()),
                }
                input {
                    r#type: "password", placeholder: "Password",
                    value: "{password}", oninput: move |ev| password.set(ev.value()),
                }
                if let Some(message) = error() {
                    div { class: "form-error", "{message}" }
                }
                button {
                    class: "btn btn-primary", r#type: "submit",
                    disabled: busy() || username().trim().is_empty() || password().is_empty(),
                    if busy() { "Signing in…" } else { "Sign in" }
                }
            }
        }
    }
}
