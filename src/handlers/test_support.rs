//! Shared fixture for validator unit tests.

use super::core::{Context, DispatchEvent, HandlerResult, Services};
use crate::config::InstanceSettings;
use crate::persistence::{MemoryAccountStore, MemoryCharacterStore};
use crate::security::{GroupTable, ItemBanList};
use crate::server::outbound::LoopbackOutbound;
use crate::state::{Session, SessionTable, Transition, World};
use std::sync::Arc;
use std::time::Instant;
use tileguard_proto::{Packet, Payload, TILE_SIZE};

pub type HandlerFn = fn(&mut Context<'_>, &mut DispatchEvent) -> HandlerResult;

/// One joined player (connection 0) in a default world, with connection 1
/// open as an onlooker.
pub struct Fixture {
    pub session: Session,
    pub sessions: SessionTable,
    pub world: World,
    pub groups: Arc<GroupTable>,
    pub bans: Arc<ItemBanList>,
    pub accounts: Arc<MemoryAccountStore>,
    pub characters: Arc<MemoryCharacterStore>,
    pub services: Services,
    pub settings: InstanceSettings,
    pub outbound: LoopbackOutbound,
    pub now: Instant,
}

impl Fixture {
    pub fn new() -> Self {
        let settings = InstanceSettings::named("test");
        let now = Instant::now();
        let groups = Arc::new(GroupTable::with_defaults());
        let bans = Arc::new(ItemBanList::new(groups.clone()));
        let accounts = Arc::new(MemoryAccountStore::new());
        let characters = Arc::new(MemoryCharacterStore::new());
        let services = Services {
            permissions: groups.clone(),
            bans: bans.clone(),
            accounts: accounts.clone(),
            characters: characters.clone(),
        };

        let mut session = Session::new(0, "default", now);
        session.name = "alice".into();
        session.handshake.received_info = true;
        session.handshake.finished_handshake = true;
        for t in [
            Transition::InfoAccepted,
            Transition::WorldRequested,
            Transition::LoginCompleted,
        ] {
            session.advance(t).unwrap();
        }
        session.position = (100.0 * TILE_SIZE, 100.0 * TILE_SIZE);

        let mut sessions = SessionTable::new(settings.max_players);
        let mut onlooker = Session::new(1, "default", now);
        onlooker.name = "bob".into();
        sessions.insert(onlooker).unwrap();

        let outbound = LoopbackOutbound::new();
        outbound.open(0);
        outbound.open(1);

        Self {
            session,
            sessions,
            world: World::new(&settings.world),
            groups,
            bans,
            accounts,
            characters,
            services,
            settings,
            outbound,
            now,
        }
    }

    /// A fixture whose connection 0 has only just been assigned a slot.
    pub fn fresh() -> Self {
        let mut fixture = Self::new();
        fixture.session = Session::new(0, "guest", fixture.now);
        fixture
    }

    pub fn context(&mut self) -> Context<'_> {
        Context {
            instance: "test",
            now: self.now,
            session: &mut self.session,
            sessions: &self.sessions,
            world: &mut self.world,
            services: &self.services,
            settings: &self.settings,
            outbound: &self.outbound,
            disconnect_reason: None,
        }
    }

    /// Run one handler, then the default effect when the outcome allows it.
    pub fn run(&mut self, handler: HandlerFn, payload: Payload) -> (DispatchEvent, Option<String>) {
        let mut event = DispatchEvent::new(Arc::from("test"), 0, payload);
        let mut ctx = self.context();
        handler(&mut ctx, &mut event).unwrap();
        super::apply_effect(&mut ctx, &event);
        let reason = ctx.disconnect_reason.take();
        (event, reason)
    }

    pub fn sent_to(&self, conn: u8) -> Vec<Packet> {
        self.outbound.sent_to(conn)
    }
}
