//! Connects a live session and prints events as they arrive.
//!
//! ```sh
//! CHATSPACE_TOKEN=... cargo run --example chat_session
//! ```

use chatspace_core::{CacheRepository, ChatClient, ClientEvent};
use chatspace_ws::{ConnectionState, SessionConfig, WsTransport};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> chatspace_core::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chatspace_core=debug,chatspace_ws=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = SessionConfig::default();
    if let Ok(token) = std::env::var("CHATSPACE_TOKEN") {
        config = config.token(token);
    }

    let cache = match CacheRepository::new("chatspace-cache.db").await {
        Ok(cache) => cache,
        Err(err) => {
            tracing::warn!(error = %err, "cache unavailable, running memory-only");
            CacheRepository::disabled()
        }
    };

    let mut client = ChatClient::new(WsTransport, config, cache);
    client.connect().await?;

    while client.state() != ConnectionState::Disconnected {
        for event in client.pump().await {
            match event {
                ClientEvent::MessageReceived { chat_id, message } => {
                    info!(%chat_id, content = %message.content, "message");
                }
                other => info!(?other, "event"),
            }
        }
    }
    info!("session over");
    Ok(())
}
