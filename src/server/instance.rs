//! One world instance: its sessions, its world and the message pipeline.
//!
//! ```text
//! inbound ──▶ rate gate ──▶ state gate ──▶ Registry::dispatch ──▶ default effect
//!                                               │
//!                                     disconnect requested? ──▶ Disconnect packet, free slot
//!
//! tick ──▶ on_game_tick (expire disables, prune projectiles)
//!      └─▶ on_secondly_update every 1s (threshold sweep, banned sweep, respawn)
//!      └─▶ autosave
//! ```

use crate::config::InstanceSettings;
use crate::error::InstanceError;
use crate::handlers::{Context, DispatchEvent, Outcome, Registry, Services, apply_effect};
use crate::handlers::helpers::describe;
use crate::metrics;
use crate::persistence::{CharacterRecord, SaveQueue};
use crate::security::{RateLimitManager, banned, threshold};
use crate::server::outbound::{Outbound, TrackedOutbound};
use crate::state::{Session, SessionTable, World};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tileguard_proto::{Packet, Payload};
use tracing::{debug, error, info};

/// Cadence of the threshold and banned-content sweeps.
pub const SECONDLY: Duration = Duration::from_secs(1);

/// A world instance and everything attached to it.
pub struct ServerInstance {
    name: Arc<str>,
    settings: Arc<InstanceSettings>,
    sessions: SessionTable,
    world: World,
    registry: Arc<Registry>,
    services: Services,
    outbound: TrackedOutbound,
    limiter: RateLimitManager,
    saves: Option<SaveQueue>,
    last_sweep: Instant,
    last_autosave: Instant,
}

impl ServerInstance {
    pub fn new(
        settings: Arc<InstanceSettings>,
        registry: Arc<Registry>,
        services: Services,
        outbound: Arc<dyn Outbound>,
        now: Instant,
    ) -> Self {
        Self {
            name: Arc::from(settings.name.as_str()),
            sessions: SessionTable::new(settings.max_players),
            world: World::new(&settings.world),
            limiter: RateLimitManager::new(&settings.rate_limits),
            outbound: TrackedOutbound::new(outbound),
            settings,
            registry,
            services,
            saves: None,
            last_sweep: now,
            last_autosave: now,
        }
    }

    /// Start from a saved world instead of a fresh one.
    pub fn with_world(mut self, world: World) -> Self {
        self.world = world;
        self
    }

    /// Autosave and shutdown saves go through `saves`.
    pub fn with_saves(mut self, saves: SaveQueue) -> Self {
        self.saves = Some(saves);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &InstanceSettings {
        &self.settings
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn sessions(&self) -> &SessionTable {
        &self.sessions
    }

    pub fn session(&self, conn: u8) -> Option<&Session> {
        self.sessions.get(conn)
    }

    pub fn session_mut(&mut self, conn: u8) -> Option<&mut Session> {
        self.sessions.get_mut(conn)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Attach a connection to the first free slot.
    pub fn connect(&mut self, now: Instant) -> Result<u8, InstanceError> {
        let conn = self.sessions.free_slot().ok_or(InstanceError::Full)?;
        self.connect_at(conn, now)?;
        Ok(conn)
    }

    /// Attach a connection to a specific slot.
    pub fn connect_at(&mut self, conn: u8, now: Instant) -> Result<(), InstanceError> {
        let session = Session::new(conn, self.settings.login.guest_group.clone(), now);
        let ledger = session.projectiles.clone();
        self.sessions.insert(session)?;
        self.outbound.track(conn, ledger);
        metrics::set_connected_players(&self.name, self.sessions.len() as i64);
        info!(instance = %self.name, conn, "Connection attached");
        Ok(())
    }

    /// Run one inbound message through the pipeline.
    ///
    /// Returns the final outcome; messages stopped by the rate or state gate
    /// report `Cancel` without reaching any handler.
    pub fn handle_message(&mut self, conn: u8, payload: Payload, now: Instant) -> Outcome {
        if !self.limiter.check_message_rate(conn) {
            metrics::record_rate_limited();
            return Outcome::Cancel;
        }
        let Some(mut session) = self.sessions.remove(conn) else {
            debug!(instance = %self.name, conn, "Message for empty slot");
            return Outcome::Cancel;
        };
        if !session.state().permits(payload.kind()) {
            debug!(
                instance = %self.name,
                conn,
                state = ?session.state(),
                message = %describe(&payload),
                "Message not allowed in this state"
            );
            metrics::record_cancel(payload.kind().as_str());
            self.sessions.restore(session);
            return Outcome::Cancel;
        }

        let mut event = DispatchEvent::new(self.name.clone(), conn, payload);
        let reason = {
            let mut ctx = Context {
                instance: &self.name,
                now,
                session: &mut session,
                sessions: &self.sessions,
                world: &mut self.world,
                services: &self.services,
                settings: &self.settings,
                outbound: &self.outbound,
                disconnect_reason: None,
            };
            self.registry.dispatch(&mut ctx, &mut event);
            apply_effect(&mut ctx, &event);
            ctx.disconnect_reason.take()
        };
        self.sessions.restore(session);

        if let Some(reason) = reason {
            self.outbound.send_to(conn, Packet::Disconnect { reason });
            self.disconnect(conn);
        }
        event.outcome
    }

    /// Tear a connection down, saving its character when configured.
    ///
    /// Returns whether the slot was occupied.
    pub fn disconnect(&mut self, conn: u8) -> bool {
        let Some(mut session) = self.sessions.remove(conn) else {
            return false;
        };
        session.mark_disconnected();

        let ssc = &self.settings.ssc;
        if ssc.enabled
            && ssc.save_on_disconnect
            && let Some(account) = &session.account
        {
            let record = CharacterRecord::capture(
                &session.inventory,
                session.stats,
                session.stored_spawn,
                (session.deaths_pve, session.deaths_pvp),
                session.loadout,
            );
            match self.services.characters.save(account, record) {
                Ok(()) => debug!(instance = %self.name, account = %account, "Character saved"),
                Err(e) => error!(
                    instance = %self.name,
                    account = %account,
                    error = %e,
                    "Failed to save character"
                ),
            }
        }

        self.limiter.remove_client(conn);
        self.outbound.untrack(conn);
        self.outbound.close(conn);
        metrics::set_connected_players(&self.name, self.sessions.len() as i64);
        info!(
            instance = %self.name,
            conn,
            player = %session.label(),
            "Connection detached"
        );
        true
    }

    /// Per-frame work: lift expired disables and forget old projectiles.
    pub fn on_game_tick(&mut self, now: Instant) {
        for session in self.sessions.iter_mut() {
            if threshold::expire(session, &self.settings.thresholds, now) {
                debug!(instance = %self.name, conn = session.conn, "Threshold disable lifted");
            }
            session.projectiles.prune(now);
        }
    }

    /// Once-a-second work: threshold sweep, banned content sweep and the
    /// respawn countdown.
    pub fn on_secondly_update(&mut self, now: Instant) {
        for session in self.sessions.iter_mut() {
            threshold::sweep(
                session,
                &self.settings.thresholds,
                &mut self.world,
                &self.outbound,
                now,
            );
            banned::sweep(session, self.services.bans.as_ref(), &self.outbound);
            if session.dead && session.respawn_timer > 0 {
                session.respawn_timer -= 1;
            }
        }
    }

    /// Drive the instance clock.
    pub fn tick(&mut self, now: Instant) {
        self.on_game_tick(now);
        if now.saturating_duration_since(self.last_sweep) >= SECONDLY {
            self.on_secondly_update(now);
            self.last_sweep = now;
        }
        let autosave = self.settings.autosave_seconds;
        if autosave > 0
            && now.saturating_duration_since(self.last_autosave) >= Duration::from_secs(autosave)
        {
            self.save_world();
            self.last_autosave = now;
        }
    }

    /// Queue a snapshot of the world. Returns whether one was queued.
    pub fn save_world(&self) -> bool {
        let Some(saves) = &self.saves else {
            return false;
        };
        match self.world.snapshot() {
            Ok(bytes) => saves.enqueue(self.name.to_string(), bytes),
            Err(e) => {
                error!(instance = %self.name, error = %e, "Failed to snapshot world");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryAccountStore, MemoryCharacterStore};
    use crate::security::{GroupTable, ItemBanList};
    use crate::server::outbound::LoopbackOutbound;
    use crate::state::ConnectionState;
    use tileguard_proto::message::{ChatText, PlayerInfo};
    use tileguard_proto::message::Difficulty;

    fn instance(out: Arc<LoopbackOutbound>) -> ServerInstance {
        let groups = Arc::new(GroupTable::with_defaults());
        let services = Services {
            permissions: groups.clone(),
            bans: Arc::new(ItemBanList::new(groups)),
            accounts: Arc::new(MemoryAccountStore::new()),
            characters: Arc::new(MemoryCharacterStore::new()),
        };
        ServerInstance::new(
            Arc::new(InstanceSettings::named("main")),
            Arc::new(Registry::new()),
            services,
            out,
            Instant::now(),
        )
    }

    #[test]
    fn chat_before_login_is_gated() {
        let out = Arc::new(LoopbackOutbound::new());
        let mut inst = instance(out.clone());
        let conn = inst.connect(Instant::now()).unwrap();
        out.open(conn);
        let outcome = inst.handle_message(
            conn,
            Payload::ChatText(ChatText { text: "hi".into() }),
            Instant::now(),
        );
        assert_eq!(outcome, Outcome::Cancel);
        assert!(out.is_empty());
    }

    #[test]
    fn forced_disconnect_frees_slot() {
        let out = Arc::new(LoopbackOutbound::new());
        let mut inst = instance(out.clone());
        let conn = inst.connect(Instant::now()).unwrap();
        out.open(conn);
        let info = PlayerInfo {
            player: conn,
            name: String::new(),
            difficulty: Difficulty::Softcore,
            client_uuid: None,
        };
        let outcome = inst.handle_message(conn, Payload::PlayerInfo(info), Instant::now());
        assert_eq!(outcome, Outcome::Cancel);
        assert!(inst.session(conn).is_none());
        assert!(matches!(out.sent_to(conn)[0], Packet::Disconnect { .. }));
        assert!(out.connections().is_empty());
    }

    #[test]
    fn player_info_advances_state() {
        let out = Arc::new(LoopbackOutbound::new());
        let mut inst = instance(out.clone());
        let conn = inst.connect(Instant::now()).unwrap();
        let info = PlayerInfo {
            player: conn,
            name: "alice".into(),
            difficulty: Difficulty::Softcore,
            client_uuid: None,
        };
        inst.handle_message(conn, Payload::PlayerInfo(info), Instant::now());
        assert_eq!(
            inst.session(conn).map(|s| s.state()),
            Some(ConnectionState::AwaitingPlayerInfo)
        );
    }

    #[test]
    fn respawn_timer_counts_down_each_second() {
        let out = Arc::new(LoopbackOutbound::new());
        let mut inst = instance(out);
        let start = Instant::now();
        let conn = inst.connect(start).unwrap();
        let session = inst.session_mut(conn).unwrap();
        session.dead = true;
        session.respawn_timer = 2;
        inst.tick(start + Duration::from_millis(500));
        assert_eq!(inst.session(conn).unwrap().respawn_timer, 2);
        inst.tick(start + Duration::from_millis(1000));
        assert_eq!(inst.session(conn).unwrap().respawn_timer, 1);
    }
}
