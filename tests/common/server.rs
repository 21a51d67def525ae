//! In-process test instance.
//!
//! Drives a [`ServerInstance`] directly with a controllable clock, so tests
//! decide exactly when ticks and sweeps happen.

#![allow(dead_code)]

use super::player_info;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tileguard::config::{Config, InstanceSettings};
use tileguard::handlers::{Outcome, Registry};
use tileguard::server::{LoopbackOutbound, ServerInstance, SharedState};
use tileguard::state::Session;
use tileguard_proto::message::{SpawnContext, SpawnPlayer};
use tileguard_proto::{Packet, Payload, TILE_SIZE};

/// A test instance with a loopback transport.
pub struct TestInstance {
    pub instance: ServerInstance,
    pub out: Arc<LoopbackOutbound>,
    pub shared: SharedState,
    pub now: Instant,
}

impl TestInstance {
    /// Instance with default settings and every built-in validator.
    pub fn new() -> Self {
        Self::with_settings(InstanceSettings::named("test"))
    }

    pub fn with_settings(settings: InstanceSettings) -> Self {
        Self::build(settings, Registry::new())
    }

    /// Instance running a caller-prepared registry.
    pub fn build(settings: InstanceSettings, registry: Registry) -> Self {
        let shared = SharedState::from_config(&Config::default());
        Self::build_shared(settings, registry, shared)
    }

    pub fn build_shared(settings: InstanceSettings, registry: Registry, shared: SharedState) -> Self {
        let out = Arc::new(LoopbackOutbound::new());
        let now = Instant::now();
        let instance = ServerInstance::new(
            Arc::new(settings),
            Arc::new(registry),
            shared.services(),
            out.clone(),
            now,
        );
        Self {
            instance,
            out,
            shared,
            now,
        }
    }

    /// Attach a connection and open it on the transport.
    pub fn connect(&mut self) -> u8 {
        let conn = self
            .instance
            .connect(self.now)
            .expect("instance has a free slot");
        self.out.open(conn);
        conn
    }

    pub fn send(&mut self, conn: u8, payload: Payload) -> Outcome {
        self.instance.handle_message(conn, payload, self.now)
    }

    /// Connect and run the handshake up to the login decision.
    pub fn handshake(&mut self, name: &str, uuid: Option<&str>) -> u8 {
        let conn = self.connect();
        self.send(conn, player_info(conn, name, uuid));
        self.send(conn, Payload::WorldDataRequest);
        conn
    }

    /// Connect a guest all the way into the world.
    pub fn join(&mut self, name: &str) -> u8 {
        let conn = self.handshake(name, None);
        self.send(
            conn,
            Payload::SpawnPlayer(SpawnPlayer {
                player: conn,
                spawn_x: -1,
                spawn_y: -1,
                respawn_timer: 0,
                deaths_pve: 0,
                deaths_pvp: 0,
                context: SpawnContext::SpawningIntoWorld,
            }),
        );
        assert!(
            self.session(conn).state().is_complete(),
            "{name} did not finish joining"
        );
        conn
    }

    /// Move a player to a tile.
    pub fn place(&mut self, conn: u8, x: i32, y: i32) {
        self.session_mut(conn).position = (x as f32 * TILE_SIZE, y as f32 * TILE_SIZE);
    }

    pub fn session(&self, conn: u8) -> &Session {
        self.instance.session(conn).expect("session exists")
    }

    pub fn session_mut(&mut self, conn: u8) -> &mut Session {
        self.instance.session_mut(conn).expect("session exists")
    }

    /// Move the clock forward and run one tick.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
        self.instance.tick(self.now);
    }

    pub fn sent_to(&self, conn: u8) -> Vec<Packet> {
        self.out.sent_to(conn)
    }
}
