//! Room-scoped WebSocket broadcast server.
//!
//! Clients authenticate with a session token, join rooms and receive every
//! message persisted to the rooms they joined.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin roomcast-server
//! cargo run --bin roomcast-server -- --host 0.0.0.0 --port 3000 --user alice --user bob
//! ```

use std::sync::Arc;

use clap::Parser;
use roomcast_server::{
    connection::ConnectionServices,
    domain::{ChatStore, Identity, UserId},
    hub::{Hub, HubConfig},
    infrastructure::store::{
        DEFAULT_GROUP_ID, DEFAULT_ROOM_ID, InMemoryChatStore, InMemorySessions,
    },
    ui::Server,
    usecase::{JoinRoomUseCase, SendMessageUseCase, TouchLastSeenUseCase},
};
use roomcast_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "roomcast-server")]
#[command(about = "Room-scoped WebSocket broadcast server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Capacity of each connection's outbound queue
    #[arg(long, default_value_t = HubConfig::default().outbound_capacity)]
    queue_capacity: usize,

    /// Maximum size of an inbound message in bytes
    #[arg(long, default_value_t = HubConfig::default().max_message_size)]
    max_message_size: usize,

    /// Demo user to seed into the default group (repeatable)
    #[arg(short = 'u', long = "user", default_values_t = ["alice".to_string(), "bob".to_string()])]
    users: Vec<String>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Collaborators (store, sessions)
    // 2. Hub
    // 3. UseCases
    // 4. Server

    // 1. Create collaborators and seed demo users
    let store = Arc::new(InMemoryChatStore::default());
    let sessions = Arc::new(InMemorySessions::new());
    for (index, username) in args.users.iter().enumerate() {
        let user_id = UserId::new(index as i64 + 1);
        if let Err(e) = store.add_member(DEFAULT_GROUP_ID, user_id).await {
            tracing::error!("Failed to seed user '{}': {}", username, e);
            std::process::exit(1);
        }
        let token = sessions.issue(Identity::new(user_id, username.as_str())).await;
        tracing::info!("User '{}' (id {}) token: {}", username, user_id, token);
    }
    tracing::info!(
        "Default group {} has room {} (#general)",
        DEFAULT_GROUP_ID,
        DEFAULT_ROOM_ID
    );

    // 2. Start the hub
    let config = HubConfig {
        outbound_capacity: args.queue_capacity,
        max_message_size: args.max_message_size,
        ..HubConfig::default()
    };
    let hub = Hub::spawn(config.clone());

    // 3. Create UseCases
    let chat_store: Arc<dyn ChatStore> = store;
    let connection_services = ConnectionServices {
        hub: hub.clone(),
        join_room: Arc::new(JoinRoomUseCase::new(chat_store.clone(), hub.clone())),
        send_message: Arc::new(SendMessageUseCase::new(chat_store.clone(), hub.clone())),
        touch_last_seen: Arc::new(TouchLastSeenUseCase::new(chat_store, hub)),
        config,
    };

    // 4. Create and run the server
    let server = Server::new(sessions, connection_services);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
