//! ChatServer Actor implementation
//!
//! The central actor that owns all state: connected clients and the room
//! coordinator. Commands are handled one at a time, so every room operation
//! is atomic and broadcasts leave in the order the state changed.
//!
//! The actor never waits on a client. Outbound messages are queued with
//! `try_send`; a client whose buffer is full or closed is evicted as if it
//! had disconnected.

use std::collections::{HashMap, VecDeque};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::broadcast::Broadcast;
use crate::client::Client;
use crate::config::Config;
use crate::coordinator::Coordinator;
use crate::error::AppError;
use crate::message::ServerMessage;
use crate::room;
use crate::types::{ClientId, Identity, RoomCode};

/// Commands sent from handlers to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New client connected
    Connect {
        client_id: ClientId,
        sender: mpsc::Sender<ServerMessage>,
    },
    /// Client disconnected
    Disconnect {
        client_id: ClientId,
    },
    /// Create a new room and enter it
    CreateRoom {
        client_id: ClientId,
        name: String,
        capacity: Option<String>,
    },
    /// Enter an existing room
    JoinRoom {
        client_id: ClientId,
        name: String,
        room_code: String,
    },
    /// Look up a room without entering it
    CheckRoom {
        client_id: ClientId,
        room_code: String,
    },
    /// Send a chat message
    Chat {
        client_id: ClientId,
        content: String,
    },
    /// Change the current room's capacity
    UpdateCapacity {
        client_id: ClientId,
        capacity: String,
    },
    /// Leave the current room
    LeaveRoom {
        client_id: ClientId,
    },
    /// Client sent a frame that is not a valid message
    Malformed {
        client_id: ClientId,
        error: serde_json::Error,
    },
}

/// The main ChatServer actor
///
/// Manages all state and processes commands from client handlers.
pub struct ChatServer {
    /// All connected clients: ClientId -> Client
    clients: HashMap<ClientId, Client>,
    /// Rooms, membership and host policy
    coordinator: Coordinator,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer {
    /// Create a new ChatServer with the given command receiver
    pub fn new(receiver: mpsc::Receiver<ServerCommand>, config: &Config) -> Self {
        Self {
            clients: HashMap::new(),
            coordinator: Coordinator::new(config.code_length, config.default_capacity),
            receiver,
        }
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously receives and processes commands until all senders are dropped.
    pub async fn run(mut self) {
        info!("ChatServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("ChatServer shutting down");
    }

    /// Process a single command
    fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Connect { client_id, sender } => {
                self.handle_connect(client_id, sender);
            }
            ServerCommand::Disconnect { client_id } => {
                self.handle_disconnect(client_id);
            }
            ServerCommand::CreateRoom {
                client_id,
                name,
                capacity,
            } => {
                self.handle_create_room(client_id, name, capacity);
            }
            ServerCommand::JoinRoom {
                client_id,
                name,
                room_code,
            } => {
                self.handle_join_room(client_id, name, room_code);
            }
            ServerCommand::CheckRoom {
                client_id,
                room_code,
            } => {
                self.handle_check_room(client_id, room_code);
            }
            ServerCommand::Chat { client_id, content } => {
                self.handle_chat(client_id, content);
            }
            ServerCommand::UpdateCapacity {
                client_id,
                capacity,
            } => {
                self.handle_update_capacity(client_id, capacity);
            }
            ServerCommand::LeaveRoom { client_id } => {
                self.handle_leave_room(client_id);
            }
            ServerCommand::Malformed { client_id, error } => {
                self.reply(client_id, AppError::Json(error).into());
            }
        }
    }

    /// Handle new client connection
    fn handle_connect(&mut self, client_id: ClientId, sender: mpsc::Sender<ServerMessage>) {
        info!("Client {} connected", client_id);
        let client = Client::new(client_id, sender);
        self.clients.insert(client_id, client);
        debug!(
            "Total clients: {}, Total rooms: {}",
            self.clients.len(),
            self.coordinator.room_count()
        );
    }

    /// Handle client disconnection
    ///
    /// A client that was already evicted is ignored.
    fn handle_disconnect(&mut self, client_id: ClientId) {
        info!("Client {} disconnected", client_id);

        let broadcasts = self.remove_client(client_id);
        self.deliver(broadcasts);

        debug!(
            "Total clients: {}, Total rooms: {}",
            self.clients.len(),
            self.coordinator.room_count()
        );
    }

    /// Handle room creation; the creator enters the new room as host
    fn handle_create_room(&mut self, client_id: ClientId, name: String, capacity: Option<String>) {
        if !self.clients.contains_key(&client_id) {
            return;
        }

        let name = match self.check_entry(client_id, &name) {
            Ok(name) => name,
            Err(e) => {
                self.reply(client_id, e.into());
                return;
            }
        };

        let room_code = self.coordinator.create_room(&name, capacity.as_deref());
        self.enter_room(client_id, Identity::new(room_code, name));
    }

    /// Handle room joining
    fn handle_join_room(&mut self, client_id: ClientId, name: String, room_code: String) {
        if !self.clients.contains_key(&client_id) {
            return;
        }

        let name = match self.check_entry(client_id, &name) {
            Ok(name) => name,
            Err(e) => {
                self.reply(client_id, e.into());
                return;
            }
        };

        let Some(room_code) = RoomCode::parse(&room_code) else {
            self.reply(client_id, AppError::RoomCodeRequired.into());
            return;
        };

        // Admission: reject unknown or full rooms before anything is bound
        if let Err(e) = self.coordinator.admit(&room_code) {
            debug!("Client {} refused entry to {}: {}", client_id, room_code, e);
            self.reply(client_id, e.into());
            return;
        }

        self.enter_room(client_id, Identity::new(room_code, name));
    }

    /// Handle a room lookup
    fn handle_check_room(&mut self, client_id: ClientId, room_code: String) {
        let Some(room_code) = RoomCode::parse(&room_code) else {
            self.reply(client_id, AppError::RoomCodeRequired.into());
            return;
        };

        let (exists, members, capacity) = match self.coordinator.room(&room_code) {
            Some(room) => (true, room.member_count(), room.capacity()),
            None => (false, 0, 0),
        };
        self.reply(
            client_id,
            ServerMessage::RoomStatus {
                room_code: room_code.to_string(),
                exists,
                members,
                capacity,
            },
        );
    }

    /// Handle chat message
    fn handle_chat(&mut self, client_id: ClientId, content: String) {
        let Some(identity) = self.identity_or_notify(client_id) else {
            return;
        };

        match self.coordinator.message(&identity, &content) {
            Ok(broadcast) => self.deliver(vec![broadcast]),
            Err(e) => debug!("Dropped message from {}: {}", client_id, e),
        }
    }

    /// Handle a capacity change; refusals are not reported back
    fn handle_update_capacity(&mut self, client_id: ClientId, capacity: String) {
        let Some(identity) = self.identity_or_notify(client_id) else {
            return;
        };

        match self.coordinator.update_capacity(&identity, &capacity) {
            Ok(broadcast) => self.deliver(vec![broadcast]),
            Err(e) => debug!(
                "Ignored capacity update from '{}' in {}: {}",
                identity.name, identity.room_code, e
            ),
        }
    }

    /// Handle voluntary room leaving
    fn handle_leave_room(&mut self, client_id: ClientId) {
        let Some(client) = self.clients.get_mut(&client_id) else {
            return;
        };

        let Some(identity) = client.identity.take() else {
            self.reply(client_id, AppError::NotInRoom.into());
            return;
        };

        info!("Client {} left room {}", client_id, identity.room_code);

        let broadcasts = self.coordinator.leave(client_id, &identity);
        self.deliver(broadcasts);
    }

    /// Helper: Validate a name for entering a room; returns it trimmed
    fn check_entry(&self, client_id: ClientId, name: &str) -> Result<String, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::NameRequired);
        }
        if room::is_reserved_name(name) {
            return Err(AppError::ReservedName(name.to_string()));
        }
        if self.clients.get(&client_id).is_some_and(Client::in_room) {
            return Err(AppError::AlreadyInRoom);
        }
        Ok(name.to_string())
    }

    /// Helper: Join the identity's room, send the snapshot, then announce
    fn enter_room(&mut self, client_id: ClientId, identity: Identity) {
        let mut broadcasts = match self.coordinator.join(client_id, &identity) {
            Ok(broadcasts) => broadcasts,
            Err(e) => {
                self.reply(client_id, e.into());
                return;
            }
        };

        let snapshot = self
            .coordinator
            .room_snapshot(&identity.room_code, &identity.name);

        let mut stalled = false;
        if let Some(client) = self.clients.get_mut(&client_id) {
            client.identity = Some(identity.clone());
            info!(
                "Client {} entered room {} as '{}'",
                client_id,
                identity.room_code,
                client.display_name()
            );

            if let Some(snapshot) = snapshot {
                if let Err(e) = client.send(ServerMessage::room_joined(&identity.name, snapshot)) {
                    warn!("Evicting client {}: {}", client_id, e);
                    stalled = true;
                }
            }
        }

        // The leave has to reach the room after the entry it undoes
        if stalled {
            broadcasts.extend(self.remove_client(client_id));
        }
        self.deliver(broadcasts);
    }

    /// Helper: Current identity, or tell the client it is not in a room
    fn identity_or_notify(&mut self, client_id: ClientId) -> Option<Identity> {
        let identity = self.clients.get(&client_id)?.identity.clone();
        if identity.is_none() {
            self.reply(client_id, AppError::NotInRoom.into());
        }
        identity
    }

    /// Helper: Send one message to one client, evicting it if it cannot take it
    fn reply(&mut self, client_id: ClientId, msg: ServerMessage) {
        let Some(client) = self.clients.get(&client_id) else {
            return;
        };
        if let Err(e) = client.send(msg) {
            warn!("Evicting client {}: {}", client_id, e);
            let broadcasts = self.remove_client(client_id);
            self.deliver(broadcasts);
        }
    }

    /// Helper: Push broadcasts to their recipients, in order
    ///
    /// Recipients that cannot take a message are evicted; the resulting
    /// leave broadcasts are queued behind the ones already pending.
    fn deliver(&mut self, broadcasts: Vec<Broadcast>) {
        let mut queue: VecDeque<Broadcast> = broadcasts.into();

        while let Some(broadcast) = queue.pop_front() {
            let msg = ServerMessage::from(broadcast.event);
            let mut stalled = Vec::new();

            for recipient in &broadcast.recipients {
                let Some(client) = self.clients.get(recipient) else {
                    continue;
                };
                if let Err(e) = client.send(msg.clone()) {
                    warn!("Evicting client {} from {}: {}", recipient, broadcast.room, e);
                    stalled.push(*recipient);
                }
            }

            for client_id in stalled {
                queue.extend(self.remove_client(client_id));
            }
        }
    }

    /// Helper: Forget a client and take it out of its room
    ///
    /// Dropping the client's sender ends its write task, which closes the socket.
    fn remove_client(&mut self, client_id: ClientId) -> Vec<Broadcast> {
        let Some(client) = self.clients.remove(&client_id) else {
            return Vec::new();
        };

        match client.identity {
            Some(identity) => self.coordinator.leave(client_id, &identity),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::message::{ClientMessage, ErrorCode};
    use crate::room::MessageRecord;

    struct TestClient {
        id: ClientId,
        rx: mpsc::Receiver<ServerMessage>,
    }

    impl TestClient {
        async fn next(&mut self) -> ServerMessage {
            tokio::time::timeout(Duration::from_secs(1), self.rx.recv())
                .await
                .expect("timed out waiting for message")
                .expect("channel closed")
        }
    }

    fn start() -> mpsc::Sender<ServerCommand> {
        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        tokio::spawn(ChatServer::new(cmd_rx, &Config::default()).run());
        cmd_tx
    }

    async fn connect(cmd_tx: &mpsc::Sender<ServerCommand>) -> TestClient {
        connect_with_buffer(cmd_tx, 64).await
    }

    async fn connect_with_buffer(cmd_tx: &mpsc::Sender<ServerCommand>, buffer: usize) -> TestClient {
        let (tx, rx) = mpsc::channel(buffer);
        let id = ClientId::new();
        cmd_tx
            .send(ServerCommand::Connect { client_id: id, sender: tx })
            .await
            .unwrap();
        TestClient { id, rx }
    }

    fn message(name: &str, text: &str) -> ServerMessage {
        ServerMessage::Message {
            name: name.to_string(),
            message: text.to_string(),
        }
    }

    fn member_update(members: usize, capacity: usize) -> ServerMessage {
        ServerMessage::MemberUpdate { members, capacity }
    }

    /// Create a room as `client` and consume the join messages; returns the code
    async fn create(cmd_tx: &mpsc::Sender<ServerCommand>, client: &mut TestClient, name: &str, capacity: &str) -> String {
        cmd_tx
            .send(ServerCommand::CreateRoom {
                client_id: client.id,
                name: name.to_string(),
                capacity: Some(capacity.to_string()),
            })
            .await
            .unwrap();

        let ServerMessage::RoomJoined {
            room_code, is_host, ..
        } = client.next().await
        else {
            panic!("expected room_joined");
        };
        assert!(is_host);
        assert_eq!(client.next().await, message(name, "has entered the room"));
        let _ = client.next().await;
        room_code
    }

    async fn join(cmd_tx: &mpsc::Sender<ServerCommand>, client: &TestClient, name: &str, room_code: &str) {
        cmd_tx
            .send(ServerCommand::JoinRoom {
                client_id: client.id,
                name: name.to_string(),
                room_code: room_code.to_string(),
            })
            .await
            .unwrap();
    }

    async fn check(cmd_tx: &mpsc::Sender<ServerCommand>, client: &mut TestClient, room_code: &str) -> ServerMessage {
        cmd_tx
            .send(ServerCommand::CheckRoom {
                client_id: client.id,
                room_code: room_code.to_string(),
            })
            .await
            .unwrap();
        client.next().await
    }

    #[tokio::test]
    async fn test_room_lifecycle_scenario() {
        let cmd_tx = start();
        let mut alice = connect(&cmd_tx).await;
        let mut bob = connect(&cmd_tx).await;
        let mut carol = connect(&cmd_tx).await;

        let code = create(&cmd_tx, &mut alice, "Alice", "2").await;

        // Bob joins: memberCount = 2
        join(&cmd_tx, &bob, "Bob", &code).await;
        let ServerMessage::RoomJoined {
            is_host, members, capacity, ..
        } = bob.next().await
        else {
            panic!("expected room_joined");
        };
        assert!(!is_host);
        assert_eq!((members, capacity), (2, 2));
        for client in [&mut alice, &mut bob] {
            assert_eq!(client.next().await, message("Bob", "has entered the room"));
            assert_eq!(client.next().await, member_update(2, 2));
        }

        // Carol is refused: room full
        join(&cmd_tx, &carol, "Carol", &code).await;
        assert!(matches!(
            carol.next().await,
            ServerMessage::Error {
                code: ErrorCode::RoomFull,
                ..
            }
        ));

        // Host raises capacity to 3
        cmd_tx
            .send(ServerCommand::UpdateCapacity {
                client_id: alice.id,
                capacity: "3".to_string(),
            })
            .await
            .unwrap();
        for client in [&mut alice, &mut bob] {
            assert_eq!(client.next().await, message("System", "Room capacity updated to 3"));
        }

        // Carol joins and sees the notice in the history replay
        join(&cmd_tx, &carol, "Carol", &code).await;
        let ServerMessage::RoomJoined {
            members, messages, ..
        } = carol.next().await
        else {
            panic!("expected room_joined");
        };
        assert_eq!(members, 3);
        assert_eq!(messages, vec![MessageRecord::system("Room capacity updated to 3")]);
        for client in [&mut alice, &mut bob, &mut carol] {
            assert_eq!(client.next().await, message("Carol", "has entered the room"));
            assert_eq!(client.next().await, member_update(3, 3));
        }

        // Bob is not the host: nothing happens
        cmd_tx
            .send(ServerCommand::UpdateCapacity {
                client_id: bob.id,
                capacity: "5".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(
            check(&cmd_tx, &mut bob, &code).await,
            ServerMessage::RoomStatus {
                room_code: code.clone(),
                exists: true,
                members: 3,
                capacity: 3,
            }
        );

        // Bob disconnects
        cmd_tx
            .send(ServerCommand::Disconnect { client_id: bob.id })
            .await
            .unwrap();
        for client in [&mut alice, &mut carol] {
            assert_eq!(client.next().await, message("Bob", "has left the room"));
            assert_eq!(client.next().await, member_update(2, 3));
        }

        // Everyone else leaves: room is gone
        cmd_tx
            .send(ServerCommand::Disconnect { client_id: alice.id })
            .await
            .unwrap();
        assert_eq!(carol.next().await, message("Alice", "has left the room"));
        assert_eq!(carol.next().await, member_update(1, 3));

        cmd_tx
            .send(ServerCommand::LeaveRoom { client_id: carol.id })
            .await
            .unwrap();
        assert_eq!(
            check(&cmd_tx, &mut carol, &code).await,
            ServerMessage::RoomStatus {
                room_code: code.clone(),
                exists: false,
                members: 0,
                capacity: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_chat_reaches_everyone_in_order() {
        let cmd_tx = start();
        let mut alice = connect(&cmd_tx).await;
        let mut bob = connect(&cmd_tx).await;

        let code = create(&cmd_tx, &mut alice, "Alice", "5").await;
        join(&cmd_tx, &bob, "Bob", &code).await;
        let _ = bob.next().await;
        for client in [&mut alice, &mut bob] {
            let _ = client.next().await;
            let _ = client.next().await;
        }

        for (id, text) in [(alice.id, "one"), (bob.id, "two"), (alice.id, "three")] {
            cmd_tx
                .send(ServerCommand::Chat {
                    client_id: id,
                    content: text.to_string(),
                })
                .await
                .unwrap();
        }

        for client in [&mut alice, &mut bob] {
            assert_eq!(client.next().await, message("Alice", "one"));
            assert_eq!(client.next().await, message("Bob", "two"));
            assert_eq!(client.next().await, message("Alice", "three"));
        }
    }

    #[tokio::test]
    async fn test_admission_errors() {
        let cmd_tx = start();
        let mut client = connect(&cmd_tx).await;

        join(&cmd_tx, &client, "", "ABCD").await;
        assert!(matches!(
            client.next().await,
            ServerMessage::Error {
                code: ErrorCode::NameRequired,
                ..
            }
        ));

        join(&cmd_tx, &client, "Dana", "  ").await;
        assert!(matches!(
            client.next().await,
            ServerMessage::Error {
                code: ErrorCode::RoomCodeRequired,
                ..
            }
        ));

        join(&cmd_tx, &client, "Dana", "QQQQ").await;
        assert_eq!(
            client.next().await,
            ServerMessage::Error {
                code: ErrorCode::RoomNotFound,
                message: "Room does not exist.".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_room_actions_require_room() {
        let cmd_tx = start();
        let mut client = connect(&cmd_tx).await;

        cmd_tx
            .send(ServerCommand::Chat {
                client_id: client.id,
                content: "hello?".to_string(),
            })
            .await
            .unwrap();
        assert!(matches!(
            client.next().await,
            ServerMessage::Error {
                code: ErrorCode::NotInRoom,
                ..
            }
        ));

        cmd_tx
            .send(ServerCommand::LeaveRoom { client_id: client.id })
            .await
            .unwrap();
        assert!(matches!(
            client.next().await,
            ServerMessage::Error {
                code: ErrorCode::NotInRoom,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_cannot_enter_two_rooms() {
        let cmd_tx = start();
        let mut alice = connect(&cmd_tx).await;
        create(&cmd_tx, &mut alice, "Alice", "2").await;

        cmd_tx
            .send(ServerCommand::CreateRoom {
                client_id: alice.id,
                name: "Alice".to_string(),
                capacity: None,
            })
            .await
            .unwrap();
        assert!(matches!(
            alice.next().await,
            ServerMessage::Error {
                code: ErrorCode::AlreadyInRoom,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_lowercase_code_accepted() {
        let cmd_tx = start();
        let mut alice = connect(&cmd_tx).await;
        let mut bob = connect(&cmd_tx).await;
        let code = create(&cmd_tx, &mut alice, "Alice", "2").await;

        join(&cmd_tx, &bob, "Bob", &code.to_lowercase()).await;
        assert!(matches!(bob.next().await, ServerMessage::RoomJoined { .. }));
    }

    async fn chat(cmd_tx: &mpsc::Sender<ServerCommand>, client: &TestClient, text: &str) {
        cmd_tx
            .send(ServerCommand::Chat {
                client_id: client.id,
                content: text.to_string(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_stalled_member_is_evicted_and_other_rooms_continue() {
        let cmd_tx = start();
        let mut carol = connect(&cmd_tx).await;
        let code_a = create(&cmd_tx, &mut carol, "Carol", "5").await;

        // Never drained: the room_joined snapshot fills its only slot
        let mut slow = connect_with_buffer(&cmd_tx, 1).await;
        join(&cmd_tx, &slow, "Slow", &code_a).await;

        assert_eq!(carol.next().await, message("Slow", "has entered the room"));
        assert_eq!(carol.next().await, member_update(2, 5));
        assert_eq!(carol.next().await, message("Slow", "has left the room"));
        assert_eq!(carol.next().await, member_update(1, 5));

        for text in ["a", "b", "c"] {
            chat(&cmd_tx, &carol, text).await;
            assert_eq!(carol.next().await, message("Carol", text));
        }

        // The transport still reports the disconnect later; it must not count twice
        cmd_tx
            .send(ServerCommand::Disconnect { client_id: slow.id })
            .await
            .unwrap();

        let mut bob = connect(&cmd_tx).await;
        let code_b = create(&cmd_tx, &mut bob, "Bob", "2").await;
        assert_ne!(code_a, code_b);

        assert_eq!(
            check(&cmd_tx, &mut carol, &code_a).await,
            ServerMessage::RoomStatus {
                room_code: code_a.clone(),
                exists: true,
                members: 1,
                capacity: 5,
            }
        );

        // The evicted client got its snapshot, then its channel was closed
        assert!(matches!(slow.next().await, ServerMessage::RoomJoined { .. }));
        assert!(slow.rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_stalled_host_does_not_block_new_rooms() {
        let cmd_tx = start();
        let mut slow = connect_with_buffer(&cmd_tx, 1).await;
        cmd_tx
            .send(ServerCommand::CreateRoom {
                client_id: slow.id,
                name: "Slow".to_string(),
                capacity: Some("3".to_string()),
            })
            .await
            .unwrap();
        for text in ["one", "two", "three"] {
            chat(&cmd_tx, &slow, text).await;
        }

        let mut bob = connect(&cmd_tx).await;
        create(&cmd_tx, &mut bob, "Bob", "2").await;

        // The stalled host was the only member, so its room is gone
        let ServerMessage::RoomJoined { room_code, .. } = slow.next().await else {
            panic!("expected room_joined");
        };
        assert_eq!(
            check(&cmd_tx, &mut bob, &room_code).await,
            ServerMessage::RoomStatus {
                room_code: room_code.clone(),
                exists: false,
                members: 0,
                capacity: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_rooms_are_isolated() {
        let cmd_tx = start();
        let mut alice = connect(&cmd_tx).await;
        let mut bob = connect(&cmd_tx).await;
        let code_a = create(&cmd_tx, &mut alice, "Alice", "2").await;
        let code_b = create(&cmd_tx, &mut bob, "Bob", "2").await;

        chat(&cmd_tx, &alice, "only in A").await;
        assert_eq!(alice.next().await, message("Alice", "only in A"));

        // Bob's next message is his own lookup, not Alice's chat
        let ServerMessage::RoomStatus { room_code, members, .. } = check(&cmd_tx, &mut bob, &code_b).await else {
            panic!("expected room_status");
        };
        assert_eq!(room_code, code_b);
        assert_eq!(members, 1);

        // Leaving B leaves A untouched
        cmd_tx
            .send(ServerCommand::LeaveRoom { client_id: bob.id })
            .await
            .unwrap();
        let ServerMessage::RoomStatus { exists, .. } = check(&cmd_tx, &mut bob, &code_b).await else {
            panic!("expected room_status");
        };
        assert!(!exists);
        let ServerMessage::RoomStatus { exists, members, .. } = check(&cmd_tx, &mut alice, &code_a).await else {
            panic!("expected room_status");
        };
        assert!(exists);
        assert_eq!(members, 1);
    }

    #[tokio::test]
    async fn test_system_name_rejected() {
        let cmd_tx = start();
        let mut alice = connect(&cmd_tx).await;
        let mut mallory = connect(&cmd_tx).await;
        let code = create(&cmd_tx, &mut alice, "Alice", "5").await;

        join(&cmd_tx, &mallory, "System", &code).await;
        assert_eq!(
            mallory.next().await,
            ServerMessage::Error {
                code: ErrorCode::ReservedName,
                message: "That name is reserved.".to_string(),
            }
        );

        cmd_tx
            .send(ServerCommand::CreateRoom {
                client_id: mallory.id,
                name: " system ".to_string(),
                capacity: None,
            })
            .await
            .unwrap();
        assert!(matches!(
            mallory.next().await,
            ServerMessage::Error {
                code: ErrorCode::ReservedName,
                ..
            }
        ));

        // Nobody entered Alice's room
        let ServerMessage::RoomStatus { members, .. } = check(&cmd_tx, &mut alice, &code).await else {
            panic!("expected room_status");
        };
        assert_eq!(members, 1);
    }

    #[tokio::test]
    async fn test_malformed_frame_reported() {
        let cmd_tx = start();
        let mut client = connect(&cmd_tx).await;
        let error = serde_json::from_str::<ClientMessage>(r#"{"type":"shout"}"#).unwrap_err();

        cmd_tx
            .send(ServerCommand::Malformed {
                client_id: client.id,
                error,
            })
            .await
            .unwrap();

        let ServerMessage::Error { code, message } = client.next().await else {
            panic!("expected error");
        };
        assert_eq!(code, ErrorCode::InvalidMessage);
        assert!(message.starts_with("Invalid message format"));
    }
}
