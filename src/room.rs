//! Room struct definition
//!
//! Represents a chat room with a fixed host name, a mutable capacity,
//! the set of counted member connections and the message history.

use std::collections::HashMap;

use serde::{Serialize, Serializer};

use crate::error::AppError;
use crate::types::{ClientId, RoomCode};

/// Name shown for notices that no member sent
pub const SYSTEM_SENDER: &str = "System";

/// Check if `name` would be mistaken for the system sender
pub fn is_reserved_name(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case(SYSTEM_SENDER)
}

/// Who a message record came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sender {
    Member(String),
    System,
}

impl Sender {
    pub fn display_name(&self) -> &str {
        match self {
            Sender::Member(name) => name,
            Sender::System => SYSTEM_SENDER,
        }
    }
}

impl Serialize for Sender {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.display_name())
    }
}

/// One entry of a room's history
///
/// Serialized as `{"name": ..., "message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRecord {
    #[serde(rename = "name")]
    pub sender: Sender,
    #[serde(rename = "message")]
    pub text: String,
}

impl MessageRecord {
    pub fn from_member(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Member(name.into()),
            text: text.into(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::System,
            text: text.into(),
        }
    }
}

/// Point-in-time view of a room for a connecting member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub code: RoomCode,
    pub messages: Vec<MessageRecord>,
    pub capacity: usize,
    pub member_count: usize,
    pub is_host: bool,
}

/// Multi-member chat room
///
/// Invariant: `member_count() <= capacity`. Each connection is counted at
/// most once, so removing a connection twice cannot underflow the count.
#[derive(Debug)]
pub struct Room {
    /// Room code for identification
    pub code: RoomCode,
    /// Display name of the creator; never changes
    host_name: String,
    /// Maximum number of members
    capacity: usize,
    /// Counted member connections and their display names
    members: HashMap<ClientId, String>,
    /// Chat messages and system notices, in broadcast order
    messages: Vec<MessageRecord>,
}

impl Room {
    /// Create an empty room
    pub fn new(code: RoomCode, host_name: impl Into<String>, capacity: usize) -> Self {
        Self {
            code,
            host_name: host_name.into(),
            capacity: capacity.max(1),
            members: HashMap::new(),
            messages: Vec::new(),
        }
    }

    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn messages(&self) -> &[MessageRecord] {
        &self.messages
    }

    /// Check if the room cannot take another member
    pub fn is_full(&self) -> bool {
        self.members.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_host(&self, name: &str) -> bool {
        self.host_name == name
    }

    /// Check if a connection is counted as a member
    pub fn contains(&self, client_id: ClientId) -> bool {
        self.members.contains_key(&client_id)
    }

    /// Connections currently subscribed to this room's broadcasts
    pub fn member_ids(&self) -> Vec<ClientId> {
        self.members.keys().copied().collect()
    }

    /// Count a connection as a member
    ///
    /// Joining twice with the same connection is a no-op.
    pub fn add_member(&mut self, client_id: ClientId, name: impl Into<String>) -> Result<(), AppError> {
        if self.members.contains_key(&client_id) {
            return Ok(());
        }
        if self.is_full() {
            return Err(AppError::RoomFull);
        }
        self.members.insert(client_id, name.into());
        Ok(())
    }

    /// Stop counting a connection
    ///
    /// Returns the member's name, or None if it was not counted.
    pub fn remove_member(&mut self, client_id: ClientId) -> Option<String> {
        self.members.remove(&client_id)
    }

    /// Change the capacity; never below the member count
    pub fn set_capacity(&mut self, capacity: usize) -> Result<(), AppError> {
        if capacity == 0 || capacity < self.members.len() {
            return Err(AppError::InvalidCapacity(format!(
                "{} is below the current member count {}",
                capacity,
                self.members.len()
            )));
        }
        self.capacity = capacity;
        Ok(())
    }

    pub fn push_message(&mut self, record: MessageRecord) {
        self.messages.push(record);
    }

    pub fn snapshot(&self, name: &str) -> RoomSnapshot {
        RoomSnapshot {
            code: self.code.clone(),
            messages: self.messages.clone(),
            capacity: self.capacity,
            member_count: self.members.len(),
            is_host: self.is_host(name),
        }
    }
}
