//! Message protocol definitions
//!
//! JSON-based bidirectional message protocol using Serde's tagged enum
//! for type-safe serialization/deserialization.

use serde::{Deserialize, Serialize};

use crate::broadcast::{RoomEvent, ENTERED_TEXT, LEFT_TEXT};
use crate::error::AppError;
use crate::room::{MessageRecord, RoomSnapshot};

/// Capacity as sent by clients: a JSON number or free text
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CapacityField {
    Number(serde_json::Number),
    Text(String),
}

impl CapacityField {
    /// Raw text handed to capacity validation
    pub fn to_raw(&self) -> String {
        match self {
            CapacityField::Number(n) => n.to_string(),
            CapacityField::Text(s) => s.clone(),
        }
    }
}

/// Client → Server message
///
/// All messages from client to server. Uses tagged enum with snake_case naming.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Create a new room and enter it as host
    CreateRoom {
        name: String,
        #[serde(default)]
        capacity: Option<CapacityField>,
    },
    /// Enter an existing room by code
    JoinRoom { name: String, room_code: String },
    /// Ask whether a room exists and how full it is
    CheckRoom { room_code: String },
    /// Send a chat message
    Chat { data: String },
    /// Change the room capacity (host only)
    UpdateCapacity { capacity: CapacityField },
    /// Leave the current room
    LeaveRoom,
}

/// Server → Client message
///
/// All messages from server to client. Uses tagged enum with snake_case naming.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection successful, client ID issued
    Connected { client_id: String },
    /// Entered a room; carries the history to render
    RoomJoined {
        room_code: String,
        name: String,
        is_host: bool,
        capacity: usize,
        members: usize,
        messages: Vec<MessageRecord>,
    },
    /// Answer to `check_room`
    RoomStatus {
        room_code: String,
        exists: bool,
        members: usize,
        capacity: usize,
    },
    /// Chat message, entered/left notice or system notice
    Message { name: String, message: String },
    /// Member count or capacity changed
    MemberUpdate { members: usize, capacity: usize },
    /// Error occurred
    Error { code: ErrorCode, message: String },
}

impl ServerMessage {
    pub fn room_joined(name: &str, snapshot: RoomSnapshot) -> Self {
        ServerMessage::RoomJoined {
            room_code: snapshot.code.to_string(),
            name: name.to_string(),
            is_host: snapshot.is_host,
            capacity: snapshot.capacity,
            members: snapshot.member_count,
            messages: snapshot.messages,
        }
    }
}

impl From<MessageRecord> for ServerMessage {
    fn from(record: MessageRecord) -> Self {
        ServerMessage::Message {
            name: record.sender.display_name().to_string(),
            message: record.text,
        }
    }
}

impl From<RoomEvent> for ServerMessage {
    fn from(event: RoomEvent) -> Self {
        match event {
            RoomEvent::MemberUpdate {
                member_count,
                capacity,
            } => ServerMessage::MemberUpdate {
                members: member_count,
                capacity,
            },
            RoomEvent::Chat(record) | RoomEvent::System(record) => record.into(),
            RoomEvent::Entered { name } => ServerMessage::Message {
                name,
                message: ENTERED_TEXT.to_string(),
            },
            RoomEvent::Left { name } => ServerMessage::Message {
                name,
                message: LEFT_TEXT.to_string(),
            },
        }
    }
}

/// Error codes for ServerMessage::Error
///
/// Represents different error scenarios that can be communicated to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Blank display name
    NameRequired,
    /// Name taken by the system sender
    ReservedName,
    /// Blank room code
    RoomCodeRequired,
    /// Non-existent room code
    RoomNotFound,
    /// Room is at capacity
    RoomFull,
    /// Attempted a room action without joining a room
    NotInRoom,
    /// Already in a room
    AlreadyInRoom,
    /// Invalid message format
    InvalidMessage,
}

/// Convert AppError to ServerMessage for client notification
impl From<AppError> for ServerMessage {
    fn from(err: AppError) -> Self {
        let (code, message) = match &err {
            AppError::NameRequired => (ErrorCode::NameRequired, "Please enter a name.".to_string()),
            AppError::ReservedName(_) => {
                (ErrorCode::ReservedName, "That name is reserved.".to_string())
            }
            AppError::RoomCodeRequired => {
                (ErrorCode::RoomCodeRequired, "Please enter a room code.".to_string())
            }
            AppError::InvalidRoom(_) => (ErrorCode::RoomNotFound, "Room does not exist.".to_string()),
            AppError::RoomFull => (ErrorCode::RoomFull, "Room is full.".to_string()),
            AppError::NotInRoom => (ErrorCode::NotInRoom, "You are not in a room".to_string()),
            AppError::AlreadyInRoom => {
                (ErrorCode::AlreadyInRoom, "You are already in a room".to_string())
            }
            AppError::Json(e) => {
                (ErrorCode::InvalidMessage, format!("Invalid message format: {}", e))
            }
            // Fatal errors are not typically converted (connection closes)
            _ => (ErrorCode::InvalidMessage, "Internal error".to_string()),
        };
        ServerMessage::Error { code, message }
    }
}
