//! Client struct definition
//!
//! Represents a connected client with its room identity and communication channel.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::error::SendError;
use crate::message::ServerMessage;
use crate::types::{ClientId, Identity};

/// Connected client information
///
/// Holds the connection's unique ID, the message sender channel, and
/// the room identity once the client has entered a room.
#[derive(Debug)]
pub struct Client {
    /// Unique identifier for this connection
    pub id: ClientId,
    /// Server → Client message channel
    pub sender: mpsc::Sender<ServerMessage>,
    /// Room and display name (None before entering a room)
    pub identity: Option<Identity>,
}

impl Client {
    /// Create a new client with the given ID and sender channel
    pub fn new(id: ClientId, sender: mpsc::Sender<ServerMessage>) -> Self {
        Self {
            id,
            sender,
            identity: None,
        }
    }

    /// Queue a message for this client without waiting
    ///
    /// Returns an error if the channel is closed (client disconnected) or
    /// full (client stopped reading).
    pub fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender.try_send(msg).map_err(|e| match e {
            TrySendError::Full(_) => SendError::ChannelFull,
            TrySendError::Closed(_) => SendError::ChannelClosed,
        })
    }

    /// Get the display name for this client
    ///
    /// Returns the room name if set, otherwise "Unknown".
    pub fn display_name(&self) -> &str {
        self.identity
            .as_ref()
            .map(|identity| identity.name.as_str())
            .unwrap_or("Unknown")
    }

    pub fn in_room(&self) -> bool {
        self.identity.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RoomCode;

    #[tokio::test]
    async fn test_client_creation() {
        let (tx, _rx) = mpsc::channel(32);
        let client = Client::new(ClientId::new(), tx);

        assert!(client.identity.is_none());
        assert!(!client.in_room());
        assert_eq!(client.display_name(), "Unknown");
    }

    #[tokio::test]
    async fn test_client_identity() {
        let (tx, _rx) = mpsc::channel(32);
        let mut client = Client::new(ClientId::new(), tx);

        client.identity = Some(Identity::new(RoomCode("ABCD".to_string()), "Alice"));

        assert!(client.in_room());
        assert_eq!(client.display_name(), "Alice");
    }

    fn connected(client: &Client) -> ServerMessage {
        ServerMessage::Connected {
            client_id: client.id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_client_send_closed() {
        let (tx, rx) = mpsc::channel(32);
        let client = Client::new(ClientId::new(), tx);
        drop(rx);

        let result = client.send(connected(&client));
        assert!(matches!(result, Err(SendError::ChannelClosed)));
    }

    #[tokio::test]
    async fn test_client_send_full_does_not_wait() {
        let (tx, mut rx) = mpsc::channel(1);
        let client = Client::new(ClientId::new(), tx);

        client.send(connected(&client)).unwrap();
        let result = client.send(connected(&client));
        assert!(matches!(result, Err(SendError::ChannelFull)));

        // Draining frees the slot again
        assert!(rx.recv().await.is_some());
        assert!(client.send(connected(&client)).is_ok());
    }
}
