use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Identifies one live websocket connection. A principal signed in on several
/// devices holds several connection ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        ConnectionId(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

struct Connection {
    principal_id: Option<Uuid>,
    joined_rooms: HashSet<Uuid>,
    outbound: UnboundedSender<String>,
}

#[derive(Default)]
struct RegistryInner {
    connections: HashMap<ConnectionId, Connection>,
    rooms: HashMap<Uuid, HashSet<ConnectionId>>,
}

/// Tracks live connections, who they belong to, and which conversation rooms
/// they joined.
///
/// A connection starts unauthenticated; [`ConnectionRegistry::bind_principal`]
/// flips it. Delivery is at-most-once with no acknowledgement: a member whose
/// outbound queue is gone is pruned from the room during fan-out.
#[derive(Default, Clone)]
pub struct ConnectionRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a fresh, unauthenticated connection.
    pub async fn register(&self, outbound: UnboundedSender<String>) -> ConnectionId {
        let id = ConnectionId::new();
        let mut guard = self.inner.write().await;
        guard.connections.insert(
            id,
            Connection {
                principal_id: None,
                joined_rooms: HashSet::new(),
                outbound,
            },
        );
        tracing::debug!(connection = %id, "connection registered");
        id
    }

    /// Mark `conn` as belonging to `principal_id`. Idempotent.
    pub async fn bind_principal(&self, conn: ConnectionId, principal_id: Uuid) {
        let mut guard = self.inner.write().await;
        if let Some(connection) = guard.connections.get_mut(&conn) {
            connection.principal_id = Some(principal_id);
        }
    }

    pub async fn principal_of(&self, conn: ConnectionId) -> Option<Uuid> {
        let guard = self.inner.read().await;
        guard.connections.get(&conn).and_then(|c| c.principal_id)
    }

    /// Join `conn` to every room in `rooms`. Rooms already joined are a no-op,
    /// so re-running a successful handshake never duplicates memberships.
    pub async fn join_rooms(&self, conn: ConnectionId, rooms: &[Uuid]) {
        let mut guard = self.inner.write().await;
        let RegistryInner {
            connections,
            rooms: room_index,
        } = &mut *guard;
        let Some(connection) = connections.get_mut(&conn) else {
            return;
        };
        for room in rooms {
            connection.joined_rooms.insert(*room);
            room_index.entry(*room).or_default().insert(conn);
        }
        tracing::debug!(connection = %conn, joined = rooms.len(), "rooms joined");
    }

    pub async fn is_member(&self, conn: ConnectionId, room: Uuid) -> bool {
        let guard = self.inner.read().await;
        guard
            .connections
            .get(&conn)
            .map(|c| c.joined_rooms.contains(&room))
            .unwrap_or(false)
    }

    /// Push one frame to a single connection. Failure is dropped.
    pub async fn send_to(&self, conn: ConnectionId, payload: &str) {
        let guard = self.inner.read().await;
        if let Some(connection) = guard.connections.get(&conn) {
            let _ = connection.outbound.send(payload.to_owned());
        }
    }

    /// Fan a frame out to every member of `room`. Returns delivery count.
    pub async fn broadcast(&self, room: Uuid, payload: &str) -> usize {
        self.fan_out(room, None, payload).await
    }

    /// Fan a frame out to every member of `room` except `skip`.
    pub async fn broadcast_except(&self, room: Uuid, skip: ConnectionId, payload: &str) -> usize {
        self.fan_out(room, Some(skip), payload).await
    }

    async fn fan_out(&self, room: Uuid, skip: Option<ConnectionId>, payload: &str) -> usize {
        let mut guard = self.inner.write().await;
        let RegistryInner { connections, rooms } = &mut *guard;
        let Some(members) = rooms.get_mut(&room) else {
            return 0;
        };
        let mut delivered = 0;
        members.retain(|id| {
            if skip == Some(*id) {
                return true;
            }
            let Some(connection) = connections.get(id) else {
                return false;
            };
            if connection.outbound.send(payload.to_owned()).is_ok() {
                delivered += 1;
                true
            } else {
                false
            }
        });
        if members.is_empty() {
            rooms.remove(&room);
        }
        delivered
    }

    /// Drop `conn` and remove it from every room it joined. Runs synchronously
    /// on disconnect; peers are not notified.
    pub async fn remove(&self, conn: ConnectionId) {
        let mut guard = self.inner.write().await;
        let Some(connection) = guard.connections.remove(&conn) else {
            return;
        };
        for room in connection.joined_rooms {
            if let Some(members) = guard.rooms.get_mut(&room) {
                members.remove(&conn);
                if members.is_empty() {
                    guard.rooms.remove(&room);
                }
            }
        }
        tracing::debug!(connection = %conn, "connection removed");
    }

    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }

    pub async fn room_size(&self, room: Uuid) -> usize {
        self.inner
            .read()
            .await
            .rooms
            .get(&room)
            .map(|m| m.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn registered_connection_starts_unauthenticated() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let conn = registry.register(tx).await;

        assert_eq!(registry.connection_count().await, 1);
        assert!(registry.principal_of(conn).await.is_none());

        let principal = Uuid::new_v4();
        registry.bind_principal(conn, principal).await;
        assert_eq!(registry.principal_of(conn).await, Some(principal));
    }

    #[tokio::test]
    async fn joining_twice_does_not_duplicate_membership() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let conn = registry.register(tx).await;
        let room = Uuid::new_v4();

        registry.join_rooms(conn, &[room]).await;
        registry.join_rooms(conn, &[room]).await;
        assert_eq!(registry.room_size(room).await, 1);

        let delivered = registry.broadcast(room, "frame").await;
        assert_eq!(delivered, 1);
        assert_eq!(rx.recv().await.unwrap(), "frame");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn broadcast_except_skips_the_sender() {
        let registry = ConnectionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let conn_a = registry.register(tx_a).await;
        let conn_b = registry.register(tx_b).await;
        let room = Uuid::new_v4();
        registry.join_rooms(conn_a, &[room]).await;
        registry.join_rooms(conn_b, &[room]).await;

        let delivered = registry.broadcast_except(room, conn_a, "typing").await;
        assert_eq!(delivered, 1);
        assert_eq!(rx_b.recv().await.unwrap(), "typing");
        assert!(rx_a.try_recv().is_err());
        // the skipped member stays in the room
        assert_eq!(registry.room_size(room).await, 2);
    }

    #[tokio::test]
    async fn dead_members_are_pruned_during_fan_out() {
        let registry = ConnectionRegistry::new();
        let (tx_a, rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let conn_a = registry.register(tx_a).await;
        let conn_b = registry.register(tx_b).await;
        let room = Uuid::new_v4();
        registry.join_rooms(conn_a, &[room]).await;
        registry.join_rooms(conn_b, &[room]).await;

        drop(rx_a);
        let delivered = registry.broadcast(room, "frame").await;
        assert_eq!(delivered, 1);
        assert_eq!(rx_b.recv().await.unwrap(), "frame");
        assert_eq!(registry.room_size(room).await, 1);
    }

    #[tokio::test]
    async fn remove_strips_every_room_synchronously() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let conn = registry.register(tx).await;
        let rooms = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        registry.join_rooms(conn, &rooms).await;

        registry.remove(conn).await;
        assert_eq!(registry.connection_count().await, 0);
        for room in rooms {
            assert_eq!(registry.room_size(room).await, 0);
            assert_eq!(registry.broadcast(room, "frame").await, 0);
        }
    }
}
