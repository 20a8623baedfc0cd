use agentcore_chat::config::{AppConfig, load_dotenv};
use agentcore_chat::ui::{App, AppServices};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env()?;
    if config.endpoint.is_none() {
        tracing::warn!("no streaming endpoint configured; messages will fail until one is set");
    }

    dioxus::LaunchBuilder::new()
        .with_context(AppServices::from_config(config))
        .launch(App);
    Ok(())
}
