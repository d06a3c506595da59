//! Multi-room WebSocket Chat Relay Library
//!
//! Clients create or join short-lived rooms identified by a generated code.
//! Every text event is fanned out to all members of the same room.
//!
//! # Features
//! - Room creation with 4-letter codes and a host-chosen capacity
//! - Capacity checked at admission and again at join
//! - Host-only capacity changes, announced by a system notice
//! - Entered/left notices and member count updates
//! - History replay for members joining later
//! - Rooms deleted as soon as the last member leaves
//!
//! # Architecture
//! - `Coordinator` is the synchronous core: room registry, membership,
//!   broadcasts and host policy. It returns `Broadcast`s instead of sending.
//! - `ChatServer` is an actor that owns the coordinator and all client
//!   channels, processing one `ServerCommand` at a time
//! - Each connection has a `handler` task that talks to the server over `mpsc`
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use chat_relay::{ChatServer, Config, handle_connection};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::default();
//!     let listener = TcpListener::bind(&config.addr).await.unwrap();
//!     let (cmd_tx, cmd_rx) = mpsc::channel(config.command_buffer);
//!
//!     tokio::spawn(ChatServer::new(cmd_rx, &config).run());
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         let cmd_tx = cmd_tx.clone();
//!         tokio::spawn(handle_connection(stream, cmd_tx, config.client_buffer));
//!     }
//! }
//! ```

pub mod broadcast;
pub mod capacity;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod handler;
pub mod message;
pub mod registry;
pub mod room;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use broadcast::{Broadcast, RoomEvent};
pub use capacity::{CapacityRequest, DefaultReason};
pub use client::Client;
pub use config::{Config, ConfigError};
pub use coordinator::Coordinator;
pub use error::{AppError, SendError};
pub use handler::handle_connection;
pub use message::{ClientMessage, ErrorCode, ServerMessage};
pub use registry::RoomRegistry;
pub use room::{MessageRecord, Room, RoomSnapshot, Sender};
pub use server::{ChatServer, ServerCommand};
pub use types::{ClientId, Identity, RoomCode};
