//! Server-to-client packet routing.
//!
//! An [`Outbound`] belongs to one instance and knows that instance's open
//! connections. Hosts plug in a transport ([`ChannelOutbound`] hands each
//! connection an mpsc receiver); tests use [`LoopbackOutbound`].

use crate::state::ProjectileLedger;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tileguard_proto::Packet;
use tokio::sync::mpsc;
use tracing::trace;

/// Packet sink of one instance.
pub trait Outbound: Send + Sync {
    fn send_to(&self, conn: u8, packet: Packet);

    /// Connections currently attached.
    fn connections(&self) -> Vec<u8>;

    /// Detach a connection after its final packet.
    fn close(&self, _conn: u8) {}

    fn send_to_many(&self, conns: &[u8], packet: &Packet) {
        for &conn in conns {
            self.send_to(conn, packet.clone());
        }
    }

    fn broadcast(&self, packet: &Packet) {
        self.send_to_many(&self.connections(), packet);
    }

    fn broadcast_except(&self, except: u8, packet: &Packet) {
        let targets: Vec<u8> = self
            .connections()
            .into_iter()
            .filter(|&c| c != except)
            .collect();
        self.send_to_many(&targets, packet);
    }
}

/// Transport backed by one unbounded channel per connection.
#[derive(Debug, Default)]
pub struct ChannelOutbound {
    senders: DashMap<u8, mpsc::UnboundedSender<Packet>>,
}

impl ChannelOutbound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a connection, returning the stream of packets for it.
    pub fn register(&self, conn: u8) -> mpsc::UnboundedReceiver<Packet> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.insert(conn, tx);
        rx
    }
}

impl Outbound for ChannelOutbound {
    fn send_to(&self, conn: u8, packet: Packet) {
        let closed = match self.senders.get(&conn) {
            Some(tx) => tx.send(packet).is_err(),
            None => false,
        };
        if closed {
            trace!(conn, "receiver gone, detaching");
            self.senders.remove(&conn);
        }
    }

    fn connections(&self) -> Vec<u8> {
        let mut conns: Vec<u8> = self.senders.iter().map(|e| *e.key()).collect();
        conns.sort_unstable();
        conns
    }

    fn close(&self, conn: u8) {
        self.senders.remove(&conn);
    }
}

/// In-memory recorder for tests and benches.
#[derive(Debug, Default)]
pub struct LoopbackOutbound {
    open: Mutex<Vec<u8>>,
    sent: Mutex<Vec<(u8, Packet)>>,
}

impl LoopbackOutbound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, conn: u8) {
        let mut open = self.open.lock();
        if !open.contains(&conn) {
            open.push(conn);
            open.sort_unstable();
        }
    }

    /// Every packet sent so far, in order.
    pub fn sent(&self) -> Vec<(u8, Packet)> {
        self.sent.lock().clone()
    }

    /// Packets delivered to one connection.
    pub fn sent_to(&self, conn: u8) -> Vec<Packet> {
        self.sent
            .lock()
            .iter()
            .filter(|(c, _)| *c == conn)
            .map(|(_, p)| p.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.sent.lock().is_empty()
    }
}

impl Outbound for LoopbackOutbound {
    fn send_to(&self, conn: u8, packet: Packet) {
        self.sent.lock().push((conn, packet));
    }

    fn connections(&self) -> Vec<u8> {
        self.open.lock().clone()
    }

    fn close(&self, conn: u8) {
        self.open.lock().retain(|&c| c != conn);
    }
}

/// Wraps a transport and marks projectile ledgers when kills go out.
///
/// Kills are observed on whatever thread sends them, which is why the
/// ledgers are lock-guarded.
pub struct TrackedOutbound {
    inner: Arc<dyn Outbound>,
    ledgers: Arc<DashMap<u8, ProjectileLedger>>,
}

impl TrackedOutbound {
    pub fn new(inner: Arc<dyn Outbound>) -> Self {
        Self {
            inner,
            ledgers: Arc::new(DashMap::new()),
        }
    }

    pub fn track(&self, conn: u8, ledger: ProjectileLedger) {
        self.ledgers.insert(conn, ledger);
    }

    pub fn untrack(&self, conn: u8) {
        self.ledgers.remove(&conn);
    }

    fn observe(&self, packet: &Packet) {
        if let Packet::KillProjectile { ident, owner } = packet
            && let Some(ledger) = self.ledgers.get(owner)
        {
            ledger.mark_killed(*ident);
        }
    }
}

impl Outbound for TrackedOutbound {
    fn send_to(&self, conn: u8, packet: Packet) {
        self.observe(&packet);
        self.inner.send_to(conn, packet);
    }

    fn connections(&self) -> Vec<u8> {
        self.inner.connections()
    }

    fn close(&self, conn: u8) {
        self.inner.close(conn);
    }

    fn send_to_many(&self, conns: &[u8], packet: &Packet) {
        self.observe(packet);
        self.inner.send_to_many(conns, packet);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn loopback_broadcast_except() {
        let out = LoopbackOutbound::new();
        out.open(0);
        out.open(2);
        out.open(1);
        out.broadcast_except(1, &Packet::info("hi"));
        let targets: Vec<u8> = out.sent().into_iter().map(|(c, _)| c).collect();
        assert_eq!(targets, vec![0, 2]);
    }

    #[tokio::test]
    async fn channel_outbound_delivers_and_closes() {
        let out = ChannelOutbound::new();
        let mut rx = out.register(3);
        out.send_to(3, Packet::info("hello"));
        assert_eq!(rx.recv().await, Some(Packet::info("hello")));
        out.close(3);
        assert!(out.connections().is_empty());
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn tracked_outbound_marks_kills() {
        let inner = Arc::new(LoopbackOutbound::new());
        inner.open(5);
        let tracked = TrackedOutbound::new(inner.clone());
        let ledger = ProjectileLedger::new();
        ledger.record(9, 1, 0.0, 0.0, Instant::now());
        tracked.track(5, ledger.clone());

        tracked.broadcast(&Packet::KillProjectile { ident: 9, owner: 5 });
        ledger.prune(Instant::now());
        assert!(ledger.is_empty());
        assert_eq!(inner.sent().len(), 1);
    }
}
