//! Handler context and core types.
//!
//! Defines the `Context<'a>` passed to all handlers. It carries the sender's
//! session (taken out of the session table for the duration of the
//! dispatch), read access to every other session, the world, and the shared
//! services of the process.

use super::event::DispatchEvent;
use crate::config::InstanceSettings;
use crate::persistence::{AccountStore, CharacterStore};
use crate::security::banned::banned_name;
use crate::security::threshold;
use crate::security::{BanPredicate, PermissionResolver};
use crate::server::outbound::Outbound;
use crate::state::{Category, Session, SessionTable, World};
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;
use tileguard_proto::{Item, Packet};

pub use crate::error::{HandlerError, HandlerResult};

/// Collaborators shared by every instance.
#[derive(Clone)]
pub struct Services {
    pub permissions: Arc<dyn PermissionResolver>,
    pub bans: Arc<dyn BanPredicate>,
    pub accounts: Arc<dyn AccountStore>,
    pub characters: Arc<dyn CharacterStore>,
}

/// Handler context passed to each message handler.
pub struct Context<'a> {
    pub instance: &'a str,
    /// Time the message is being processed at.
    pub now: Instant,
    /// The sender's session.
    pub session: &'a mut Session,
    /// Every other session of the instance.
    pub sessions: &'a SessionTable,
    pub world: &'a mut World,
    pub services: &'a Services,
    pub settings: &'a InstanceSettings,
    pub outbound: &'a dyn Outbound,
    /// Set by [`Context::disconnect`]; acted on after the dispatch.
    pub disconnect_reason: Option<String>,
}

impl<'a> Context<'a> {
    pub fn conn(&self) -> u8 {
        self.session.conn
    }

    /// Whether the sender holds `permission`.
    pub fn can(&self, permission: &str) -> bool {
        self.services
            .permissions
            .has_permission(self.session, permission)
    }

    /// Name of `item` if it is banned for the sender.
    pub fn banned(&self, item: Item) -> Option<Cow<'static, str>> {
        banned_name(item, self.session, self.services.bans.as_ref())
    }

    /// Count an accepted action against the sender's thresholds.
    pub fn count(&mut self, category: Category) -> bool {
        threshold::count(self.session, category, self.services.permissions.as_ref())
    }

    pub fn reply(&self, packet: Packet) {
        self.outbound.send_to(self.conn(), packet);
    }

    pub fn broadcast(&self, packet: &Packet) {
        self.outbound.broadcast(packet);
    }

    /// Send to everyone but the sender.
    pub fn relay(&self, packet: &Packet) {
        self.outbound.broadcast_except(self.conn(), packet);
    }

    /// Within the post-breach throttle window.
    pub fn throttled(&self) -> bool {
        let window = std::time::Duration::from_millis(self.settings.security.throttle_millis);
        self.session.is_throttled(self.now, window)
    }

    /// Whether the sender may edit tile (x, y) at all: build permission and
    /// spawn protection.
    pub fn may_build_at(&self, x: i32, y: i32) -> bool {
        use crate::security::perms;
        if !self.can(perms::MODIFY_WORLD) {
            return false;
        }
        let radius = self.settings.security.spawn_protection_radius;
        !self.world.in_spawn_protection(x, y, radius) || self.can(perms::EDIT_SPAWN)
    }

    /// Force the sender off the server.
    ///
    /// Cancels the message, stops the chain and marks the session
    /// disconnected; the instance sends the reason and frees the slot.
    pub fn disconnect(&mut self, event: &mut DispatchEvent, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::info!(
            instance = %self.instance,
            conn = self.conn(),
            player = %self.session.label(),
            reason = %reason,
            "Disconnecting player"
        );
        event.reject();
        self.session.mark_disconnected();
        self.disconnect_reason = Some(reason);
    }
}
