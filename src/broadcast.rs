//! Room events and their fan-out
//!
//! A `Broadcast` pairs an event with the connections subscribed to the room
//! at the moment the event was produced. Late joiners never receive it live;
//! they get the stored history instead.

use crate::room::{MessageRecord, Room};
use crate::types::{ClientId, RoomCode};

pub const ENTERED_TEXT: &str = "has entered the room";
pub const LEFT_TEXT: &str = "has left the room";

/// Something that happened in a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// A member joined
    Entered { name: String },
    /// A member left or disconnected
    Left { name: String },
    /// Chat message from a member
    Chat(MessageRecord),
    /// Notice from the system sender
    System(MessageRecord),
    /// Membership or capacity changed
    MemberUpdate { member_count: usize, capacity: usize },
}

impl RoomEvent {
    /// The record shown in the chat log, if this event has one
    pub fn record(&self) -> Option<MessageRecord> {
        match self {
            RoomEvent::Entered { name } => Some(MessageRecord::from_member(name.clone(), ENTERED_TEXT)),
            RoomEvent::Left { name } => Some(MessageRecord::from_member(name.clone(), LEFT_TEXT)),
            RoomEvent::Chat(record) | RoomEvent::System(record) => Some(record.clone()),
            RoomEvent::MemberUpdate { .. } => None,
        }
    }
}

/// An event addressed to a fixed set of connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broadcast {
    pub room: RoomCode,
    pub recipients: Vec<ClientId>,
    pub event: RoomEvent,
}

impl Broadcast {
    /// Address `event` to everyone currently in `room`
    pub fn to_room(room: &Room, event: RoomEvent) -> Self {
        Self {
            room: room.code.clone(),
            recipients: room.member_ids(),
            event,
        }
    }
}

/// Append a member's message to the history and address it to the room
///
/// The sender is included in the recipients.
pub fn message(room: &mut Room, name: &str, text: impl Into<String>) -> Broadcast {
    let record = MessageRecord::from_member(name, text);
    room.push_message(record.clone());
    Broadcast::to_room(room, RoomEvent::Chat(record))
}

/// Append a system notice to the history and address it to the room
pub fn system_notice(room: &mut Room, text: impl Into<String>) -> Broadcast {
    let record = MessageRecord::system(text);
    room.push_message(record.clone());
    Broadcast::to_room(room, RoomEvent::System(record))
}

/// Current member count and capacity, addressed to the room
pub fn member_update(room: &Room) -> Broadcast {
    Broadcast::to_room(
        room,
        RoomEvent::MemberUpdate {
            member_count: room.member_count(),
            capacity: room.capacity(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::Sender;

    fn room_with(names: &[&str]) -> (Room, Vec<ClientId>) {
        let mut room = Room::new(RoomCode("WXYZ".to_string()), "Alice", 10);
        let ids = names
            .iter()
            .map(|name| {
                let id = ClientId::new();
                room.add_member(id, *name).unwrap();
                id
            })
            .collect();
        (room, ids)
    }

    #[test]
    fn test_message_includes_sender_and_appends() {
        let (mut room, ids) = room_with(&["Alice", "Bob"]);

        let broadcast = message(&mut room, "Bob", "hello");

        assert_eq!(broadcast.recipients.len(), 2);
        for id in &ids {
            assert!(broadcast.recipients.contains(id));
        }
        assert_eq!(room.messages(), &[MessageRecord::from_member("Bob", "hello")]);
        assert_eq!(
            broadcast.event,
            RoomEvent::Chat(MessageRecord::from_member("Bob", "hello"))
        );
    }

    #[test]
    fn test_system_notice_uses_system_sender() {
        let (mut room, _) = room_with(&["Alice"]);

        let broadcast = system_notice(&mut room, "Room capacity updated to 3");

        assert_eq!(room.messages()[0].sender, Sender::System);
        assert_eq!(broadcast.event.record().unwrap().sender.display_name(), "System");
    }

    #[test]
    fn test_recipients_are_a_snapshot() {
        let (mut room, _) = room_with(&["Alice"]);
        let broadcast = message(&mut room, "Alice", "first");

        let late = ClientId::new();
        room.add_member(late, "Bob").unwrap();

        assert!(!broadcast.recipients.contains(&late));
    }

    #[test]
    fn test_history_order_matches_broadcast_order() {
        let (mut room, _) = room_with(&["Alice", "Bob"]);
        let sent: Vec<_> = ["one", "two", "three"]
            .iter()
            .map(|text| message(&mut room, "Alice", *text).event.record().unwrap())
            .collect();

        assert_eq!(room.messages(), sent.as_slice());
    }

    #[test]
    fn test_notice_records() {
        let entered = RoomEvent::Entered {
            name: "Bob".to_string(),
        };
        assert_eq!(entered.record().unwrap().text, ENTERED_TEXT);

        let update = RoomEvent::MemberUpdate {
            member_count: 1,
            capacity: 2,
        };
        assert!(update.record().is_none());
    }
}
