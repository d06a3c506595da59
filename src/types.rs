//! Basic type definitions for the chat relay
//!
//! Provides newtype wrappers for type safety:
//! - `ClientId`: UUID-based unique connection identifier
//! - `RoomCode`: short uppercase room code
//! - `Identity`: the (room, name) pair a connection claims

use rand::Rng;
use uuid::Uuid;

/// Letters room codes are drawn from
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Unique connection identifier (newtype pattern)
///
/// Wraps a UUID v4 for type-safe identification of a physical connection.
/// Implements Hash and Eq for use as HashMap keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub Uuid);

impl ClientId {
    /// Create a new random client ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Room code (uppercase letters)
///
/// Used as the registry key. Generated randomly or parsed from user input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomCode(pub String);

impl RoomCode {
    /// Generate a random code of `length` uppercase letters
    ///
    /// Uniqueness is the registry's job, see `RoomRegistry::generate_code`.
    pub fn generate(length: usize) -> Self {
        let mut rng = rand::thread_rng();
        let code = (0..length)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    /// Parse user input into a room code (trimmed, uppercased)
    ///
    /// Returns None for blank input.
    pub fn parse(input: &str) -> Option<Self> {
        let code = input.trim();
        if code.is_empty() {
            None
        } else {
            Some(Self(code.to_uppercase()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which room a connection belongs to and under which display name
///
/// Resolved by the transport layer and passed explicitly into every
/// coordinator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub room_code: RoomCode,
    pub name: String,
}

impl Identity {
    pub fn new(room_code: RoomCode, name: impl Into<String>) -> Self {
        Self {
            room_code,
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_unique() {
        let id1 = ClientId::new();
        let id2 = ClientId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_room_code_length() {
        let code = RoomCode::generate(4);
        assert_eq!(code.0.len(), 4);
    }

    #[test]
    fn test_room_code_letters_only() {
        for _ in 0..100 {
            let code = RoomCode::generate(8);
            assert!(code.0.chars().all(|c| c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_room_code_parse() {
        assert_eq!(RoomCode::parse(" abcd "), Some(RoomCode("ABCD".to_string())));
        assert_eq!(RoomCode::parse("   "), None);
        assert_eq!(RoomCode::parse(""), None);
    }
}
