//! Socket registry: tracks live connections and their room memberships.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::handle::SocketHandle;

/// Thread-safe registry of all live connections.
#[derive(Debug, Default)]
pub struct SocketRegistry {
    /// Socket id → connection handle.
    sockets: DashMap<Uuid, Arc<SocketHandle>>,
    /// Room name → member socket ids.
    rooms: DashMap<String, HashSet<Uuid>>,
}

impl SocketRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to the registry.
    pub fn register(&self, handle: Arc<SocketHandle>) {
        self.sockets.insert(handle.id, handle);
    }

    /// Removes a connection and every room membership it holds.
    pub fn unregister(&self, socket_id: Uuid) -> Option<Arc<SocketHandle>> {
        self.rooms.retain(|_, members| {
            members.remove(&socket_id);
            !members.is_empty()
        });
        self.sockets.remove(&socket_id).map(|(_, handle)| handle)
    }

    /// Gets a connection by socket id.
    pub fn get(&self, socket_id: Uuid) -> Option<Arc<SocketHandle>> {
        self.sockets
            .get(&socket_id)
            .map(|entry| entry.value().clone())
    }

    /// Subscribes a connection to a room. Re-joining is a no-op.
    pub fn join_room(&self, room: &str, socket_id: Uuid) {
        self.rooms
            .entry(room.to_string())
            .or_default()
            .insert(socket_id);
    }

    /// Returns the socket ids currently subscribed to a room.
    pub fn room_members(&self, room: &str) -> Vec<Uuid> {
        self.rooms
            .get(room)
            .map(|entry| entry.value().iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the number of live connections.
    pub fn connection_count(&self) -> usize {
        self.sockets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::user_room;
    use thingdash_auth::Claims;
    use tokio::sync::mpsc;

    fn handle() -> Arc<SocketHandle> {
        let (tx, _rx) = mpsc::channel(8);
        Arc::new(SocketHandle::new(
            Claims {
                sub: Uuid::new_v4(),
                username: "test".to_string(),
                iat: 0,
                exp: i64::MAX,
            },
            tx,
        ))
    }

    #[test]
    fn unregister_clears_room_memberships() {
        let registry = SocketRegistry::new();
        let h = handle();
        let room = user_room(h.claims.sub);

        registry.register(h.clone());
        registry.join_room(&room, h.id);
        assert_eq!(registry.room_members(&room), vec![h.id]);

        registry.unregister(h.id);
        assert!(registry.room_members(&room).is_empty());
        assert_eq!(registry.connection_count(), 0);
    }

    #[test]
    fn rejoining_a_room_is_idempotent() {
        let registry = SocketRegistry::new();
        let h = handle();
        registry.register(h.clone());
        registry.join_room("user:abc", h.id);
        registry.join_room("user:abc", h.id);
        assert_eq!(registry.room_members("user:abc").len(), 1);
    }
}
