//! Banned content guard.
//!
//! Runs passively once a second over fully joined sessions and reactively
//! from the validators that accept items into the world.

use super::item_bans::BanPredicate;
use crate::server::outbound::Outbound;
use crate::state::{ConnectionState, DisabledFlags, Session};
use std::borrow::Cow;
use tileguard_proto::{Item, Packet};
use tracing::{debug, info};

/// Debuffs applied while a banned item is worn.
pub mod buffs {
    pub const CURSED: u16 = 23;
    pub const FROZEN: u16 = 47;
    pub const WEBBED: u16 = 149;
    pub const STONED: u16 = 156;

    pub const TAINT: [u16; 4] = [CURSED, FROZEN, WEBBED, STONED];
}

/// Buff duration in game ticks; outlasts one sweep so it never lapses
/// between sweeps.
pub const TAINT_TICKS: i32 = 330;

/// Name of `item` when it is banned for `session`.
pub fn banned_name(
    item: Item,
    session: &Session,
    predicate: &dyn BanPredicate,
) -> Option<Cow<'static, str>> {
    if item.is_empty() {
        return None;
    }
    let name = item.name();
    predicate.is_banned(&name, session).then_some(name)
}

/// Outcome of one passive sweep over a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepResult {
    pub tainted: bool,
    pub cleared: bool,
}

/// Check held and worn items of a joined session.
pub fn sweep(
    session: &mut Session,
    predicate: &dyn BanPredicate,
    outbound: &dyn Outbound,
) -> SweepResult {
    if session.state() != ConnectionState::Complete || !session.handshake.finished_handshake {
        return SweepResult::default();
    }

    let held = session.inventory.selected(session.selected_slot);
    session.held_item_banned = banned_name(held, session, predicate).is_some();

    let worn_banned = session
        .inventory
        .worn()
        .find_map(|(_, item)| banned_name(item, session, predicate));

    match worn_banned {
        Some(name) => {
            if !session.disabled.contains(DisabledFlags::BANNED_WEARABLE) {
                info!(player = %session.label(), item = %name, "Banned item worn, disabling");
                crate::metrics::record_disable("banned_wearable");
            }
            session.disabled.insert(DisabledFlags::BANNED_WEARABLE);
            for buff in buffs::TAINT {
                outbound.broadcast(&Packet::AddBuff {
                    player: session.conn,
                    buff,
                    ticks: TAINT_TICKS,
                });
            }
            outbound.send_to(
                session.conn,
                Packet::error(format!("Remove your banned item ({name}) to continue.")),
            );
            SweepResult {
                tainted: true,
                cleared: false,
            }
        }
        None if session.disabled.contains(DisabledFlags::BANNED_WEARABLE) => {
            session.disabled.remove(DisabledFlags::BANNED_WEARABLE);
            debug!(player = %session.label(), "Banned item removed, flag cleared");
            SweepResult {
                tainted: false,
                cleared: true,
            }
        }
        None => SweepResult::default(),
    }
}
