//! Error types for the chat relay
//!
//! Defines application-level errors and message send errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-level errors
///
/// Covers both fatal errors (connection termination) and
/// room errors (reported to the client or dropped, depending on the stage).
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error (fatal)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send error (fatal - internal channel broken)
    #[error("Channel send error")]
    ChannelSend,

    /// Room code unknown or missing
    #[error("Invalid room: {0}")]
    InvalidRoom(String),

    /// Room has reached its capacity
    #[error("Room is full")]
    RoomFull,

    /// Host-only action attempted by someone else
    #[error("Only the host can do that")]
    Forbidden,

    /// Capacity is not a positive integer or is below the member count
    #[error("Invalid capacity: {0}")]
    InvalidCapacity(String),

    /// Display name is required but blank
    #[error("Name required")]
    NameRequired,

    /// Display name is reserved for system notices
    #[error("Reserved name: {0}")]
    ReservedName(String),

    /// Room code is required but blank
    #[error("Room code required")]
    RoomCodeRequired,

    /// Connection is not in any room
    #[error("Not in room")]
    NotInRoom,

    /// Connection is already in a room
    #[error("Already in room")]
    AlreadyInRoom,
}

/// Message send errors
///
/// Occurs when attempting to send messages through closed channels.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,

    /// The client is not reading and its buffer is full
    #[error("Channel full")]
    ChannelFull,
}
