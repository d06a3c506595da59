//! Room registry
//!
//! Owns the room code -> room mapping. Not synchronized itself; the
//! `ChatServer` actor is its only owner.

use std::collections::HashMap;

use tracing::debug;

use crate::capacity::CapacityRequest;
use crate::room::Room;
use crate::types::RoomCode;

#[derive(Debug)]
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, Room>,
    code_length: usize,
}

impl RoomRegistry {
    pub fn new(code_length: usize) -> Self {
        Self {
            rooms: HashMap::new(),
            code_length: code_length.max(1),
        }
    }

    /// Generate a code not currently used by any room
    pub fn generate_code(&self) -> RoomCode {
        loop {
            let code = RoomCode::generate(self.code_length);
            if !self.rooms.contains_key(&code) {
                break code;
            }
        }
    }

    /// Create an empty room hosted by `host_name`
    pub fn create_room(&mut self, host_name: &str, capacity: CapacityRequest) -> RoomCode {
        if let CapacityRequest::Defaulted { capacity, reason } = capacity {
            debug!("Requested capacity unusable ({:?}), using {}", reason, capacity);
        }

        let code = self.generate_code();
        let room = Room::new(code.clone(), host_name, capacity.capacity());
        self.rooms.insert(code.clone(), room);
        code
    }

    pub fn exists(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    pub fn get(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn get_mut(&mut self, code: &RoomCode) -> Option<&mut Room> {
        self.rooms.get_mut(code)
    }

    pub fn delete(&mut self, code: &RoomCode) -> Option<Room> {
        self.rooms.remove(code)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
