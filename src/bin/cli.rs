//! Terminal front end: the same conversation flow as the GUI, one line at a time.

use agentcore_chat::agent::{Dispatcher, HttpAgentBackend};
use agentcore_chat::auth::{ConfiguredAuth, CredentialProvider};
use agentcore_chat::catalog::{MODEL_OPTIONS, PERSONALITY_OPTIONS};
use agentcore_chat::chat::{ChatSession, ExchangeEvent, PendingExchange, run_exchange};
use agentcore_chat::config::{AppConfig, load_dotenv};
use agentcore_chat::types::Role;
use anyhow::Context;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

type Input = Lines<BufReader<Stdin>>;

const HELP: &str = "\
Commands:
  /new                 start a new conversation
  /model <id>          switch model (starts a new conversation)
  /personality <id>    switch personality (starts a new conversation)
  /models              list available models
  /personalities       list available personalities
  /session             show the current session
  /help                show this help
  quit                 exit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let auth = ConfiguredAuth::from_config(&config);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    if let ConfiguredAuth::Cognito(provider) = &auth {
        let username = prompt(&mut input, "Username: ").await?;
        let password = prompt(&mut input, "Password (input is visible): ").await?;
        provider
            .sign_in(username.trim(), password.trim())
            .await
            .context("sign-in failed")?;
    }
    let provider = auth.provider();
    let user_name = provider.user_name().await;
    let backend = HttpAgentBackend::new(Dispatcher::new(config.endpoint.clone(), provider));

    println!("Signed in as {user_name}. Type /help for commands.");
    let mut chat = ChatSession::from_config(Some(&user_name), &config);
    let opening = chat.start();
    print_new_messages(&chat, 0);
    drive(&backend, &mut chat, opening).await;

    loop {
        let Some(line) = read_line(&mut input, "> ").await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let exchange = match line.split_once(' ').unwrap_or((line, "")) {
            ("quit" | "exit" | "/quit", _) => break,
            ("/help", _) => {
                println!("{HELP}");
                None
            }
            ("/new", _) => {
                let exchange = chat.new_chat();
                println!("New session {}", chat.session().session_id);
                print_new_messages(&chat, 0);
                exchange
            }
            ("/model", id) => selection(&mut chat, |chat| chat.change_model(id.trim())),
            ("/personality", id) => {
                selection(&mut chat, |chat| chat.change_personality(id.trim()))
            }
            ("/models", _) => {
                for option in MODEL_OPTIONS {
                    println!("  {:<40} {}", option.id, option.name);
                }
                None
            }
            ("/personalities", _) => {
                for option in PERSONALITY_OPTIONS {
                    println!("  {:<12} {}", option.id, option.description);
                }
                None
            }
            ("/session", _) => {
                let session = chat.session();
                println!(
                    "session {}\nmodel {}\npersonality {}",
                    session.session_id, session.model, session.personality
                );
                None
            }
            _ => chat.submit(line),
        };
        drive(&backend, &mut chat, exchange).await;
    }

    Ok(())
}

fn selection(
    chat: &mut ChatSession,
    change: impl FnOnce(&mut ChatSession) -> agentcore_chat::ChatResult<Option<PendingExchange>>,
) -> Option<PendingExchange> {
    match change(chat) {
        Ok(exchange) => {
            let session = chat.session();
            println!(
                "Session {} ({}, {})",
                session.session_id, session.model, session.personality
            );
            print_new_messages(chat, 0);
            exchange
        }
        Err(err) => {
            eprintln!("{err}");
            None
        }
    }
}

/// Run `exchange` to completion, echoing the reply as it streams in.
async fn drive(backend: &HttpAgentBackend, chat: &mut ChatSession, exchange: Option<PendingExchange>) {
    let Some(exchange) = exchange else {
        return;
    };
    let before = chat.messages().len();
    let mut streamed = false;
    let mut failed = false;
    run_exchange(backend, &exchange, |update| {
        match &update.event {
            ExchangeEvent::Fragment(text) => {
                print!("{text}");
                let _ = std::io::stdout().flush();
                streamed = true;
            }
            ExchangeEvent::Failed(_) => failed = true,
            ExchangeEvent::Completed => {}
        }
        chat.apply(update);
    })
    .await;

    if streamed {
        println!();
    }
    // A completed reply was already echoed fragment by fragment.
    if failed || !streamed {
        print_new_messages(chat, before);
    }
}

fn print_new_messages(chat: &ChatSession, from: usize) {
    for message in chat.messages().iter().skip(from) {
        if message.role == Role::Agent {
            println!("{}", message.text);
        }
    }
}

async fn prompt(input: &mut Input, label: &str) -> anyhow::Result<String> {
    read_line(input, label)
        .await?
        .context("stdin closed before sign-in completed")
}

async fn read_line(input: &mut Input, label: &str) -> anyhow::Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush()?;
    Ok(input.next_line().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_lists_every_command() {
        for command in [
            "/new",
            "/model <id>",
            "/personality <id>",
            "/models",
            "/personalities",
            "/session",
            "/help",
            "quit",
        ] {
            assert!(HELP.contains(command), "missing {command}");
        }
    }
}
