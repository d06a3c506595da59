//! Membership and host policy
//!
//! The `Coordinator` is the synchronous core of the relay: it owns the room
//! registry and turns join/leave/message/capacity events into state changes
//! plus the broadcasts those changes produce, in the order they happened.
//! It never touches a transport; callers deliver the returned broadcasts.

use tracing::{debug, info};

use crate::broadcast::{self, Broadcast, RoomEvent};
use crate::capacity::{self, CapacityRequest};
use crate::error::AppError;
use crate::registry::RoomRegistry;
use crate::room::{self, Room, RoomSnapshot};
use crate::types::{ClientId, Identity, RoomCode};

#[derive(Debug)]
pub struct Coordinator {
    registry: RoomRegistry,
    default_capacity: usize,
}

impl Coordinator {
    pub fn new(code_length: usize, default_capacity: usize) -> Self {
        Self {
            registry: RoomRegistry::new(code_length),
            default_capacity: default_capacity.max(1),
        }
    }

    /// Create an empty room; `capacity` falls back to the default when unusable
    pub fn create_room(&mut self, host_name: &str, capacity: Option<&str>) -> RoomCode {
        let request = CapacityRequest::parse(capacity, self.default_capacity);
        let code = self.registry.create_room(host_name, request);
        info!(
            "Room {} created by '{}' (capacity {})",
            code,
            host_name,
            request.capacity()
        );
        code
    }

    pub fn room_exists(&self, code: &RoomCode) -> bool {
        self.registry.exists(code)
    }

    pub fn room(&self, code: &RoomCode) -> Option<&Room> {
        self.registry.get(code)
    }

    /// The view a connecting member named `name` should render
    pub fn room_snapshot(&self, code: &RoomCode, name: &str) -> Option<RoomSnapshot> {
        self.registry.get(code).map(|room| room.snapshot(name))
    }

    pub fn room_count(&self) -> usize {
        self.registry.len()
    }

    /// Pre-join admission check, run at room-selection time
    pub fn admit(&self, code: &RoomCode) -> Result<(), AppError> {
        let room = self
            .registry
            .get(code)
            .ok_or_else(|| AppError::InvalidRoom(code.to_string()))?;

        if room.is_full() {
            return Err(AppError::RoomFull);
        }
        Ok(())
    }

    /// Count `client_id` as a member of the identity's room
    ///
    /// Capacity is re-checked here so concurrent admissions cannot overfill
    /// a room.
    pub fn join(&mut self, client_id: ClientId, identity: &Identity) -> Result<Vec<Broadcast>, AppError> {
        if identity.name.trim().is_empty() {
            return Err(AppError::InvalidRoom(identity.room_code.to_string()));
        }
        if room::is_reserved_name(&identity.name) {
            return Err(AppError::ReservedName(identity.name.clone()));
        }

        let room = self
            .registry
            .get_mut(&identity.room_code)
            .ok_or_else(|| AppError::InvalidRoom(identity.room_code.to_string()))?;

        room.add_member(client_id, identity.name.clone())?;

        info!(
            "'{}' joined room {} ({}/{})",
            identity.name,
            room.code,
            room.member_count(),
            room.capacity()
        );

        Ok(vec![
            Broadcast::to_room(
                room,
                RoomEvent::Entered {
                    name: identity.name.clone(),
                },
            ),
            broadcast::member_update(room),
        ])
    }

    /// Leave or disconnect; deletes the room when its last member goes
    ///
    /// A connection that is not counted in the room is ignored.
    pub fn leave(&mut self, client_id: ClientId, identity: &Identity) -> Vec<Broadcast> {
        let Some(room) = self.registry.get_mut(&identity.room_code) else {
            debug!("Leave for missing room {}", identity.room_code);
            return Vec::new();
        };

        let Some(name) = room.remove_member(client_id) else {
            debug!(
                "Client {} was not a member of room {}",
                client_id, identity.room_code
            );
            return Vec::new();
        };

        info!(
            "'{}' left room {} ({}/{})",
            name,
            room.code,
            room.member_count(),
            room.capacity()
        );

        if room.is_empty() {
            self.registry.delete(&identity.room_code);
            info!("Room {} deleted (empty)", identity.room_code);
            return Vec::new();
        }

        vec![
            Broadcast::to_room(room, RoomEvent::Left { name }),
            broadcast::member_update(room),
        ]
    }

    /// Record a chat message and address it to the whole room
    pub fn message(&mut self, identity: &Identity, text: &str) -> Result<Broadcast, AppError> {
        let room = self
            .registry
            .get_mut(&identity.room_code)
            .ok_or_else(|| AppError::InvalidRoom(identity.room_code.to_string()))?;

        info!("{} said: {}", identity.name, text);
        Ok(broadcast::message(room, &identity.name, text))
    }

    /// Record a notice from the system sender
    pub fn system_notice(&mut self, code: &RoomCode, text: &str) -> Result<Broadcast, AppError> {
        let room = self
            .registry
            .get_mut(code)
            .ok_or_else(|| AppError::InvalidRoom(code.to_string()))?;

        Ok(broadcast::system_notice(room, text))
    }

    /// Host-only capacity change
    ///
    /// The new capacity must be a positive integer no lower than the
    /// current member count.
    pub fn update_capacity(&mut self, identity: &Identity, raw: &str) -> Result<Broadcast, AppError> {
        let room = self
            .registry
            .get_mut(&identity.room_code)
            .ok_or_else(|| AppError::InvalidRoom(identity.room_code.to_string()))?;

        if !room.is_host(&identity.name) {
            return Err(AppError::Forbidden);
        }

        let capacity = capacity::validate_update(raw, room.member_count())?;
        room.set_capacity(capacity)?;

        info!("Room {} capacity set to {} by host", room.code, capacity);
        self.system_notice(
            &identity.room_code,
            &format!("Room capacity updated to {}", capacity),
        )
    }
}
