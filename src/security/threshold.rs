//! Per-second action thresholds.
//!
//! Validators count accepted actions per [`Category`]. Once a second the
//! instance sweeps every session: a counter at or above its limit disables
//! the session for that category and, for tile kills and placements, rolls
//! the window's edits back. Counters and the edit ledger are emptied at the
//! end of every sweep whether or not anything breached.

use super::permissions::{PermissionResolver, ignore_permission};
use crate::config::{BreachLogging, ThresholdConfig};
use crate::server::outbound::Outbound;
use crate::state::{Category, DisabledFlags, EditKind, Session, World};
use std::time::{Duration, Instant};
use tileguard_proto::Packet;
use tracing::{info, warn};

/// Configured limit of a category; 0 means unlimited.
pub fn limit(config: &ThresholdConfig, category: Category) -> u32 {
    match category {
        Category::TileKill => config.tile_kill,
        Category::TilePlace => config.tile_place,
        Category::TileLiquid => config.tile_liquid,
        Category::Projectile => config.projectile,
        Category::Paint => config.paint,
        Category::HealOther => config.heal_other,
    }
}

/// Count one accepted action unless the session is exempt.
///
/// Returns whether the counter moved.
pub fn count(
    session: &mut Session,
    category: Category,
    permissions: &dyn PermissionResolver,
) -> bool {
    if permissions.has_permission(session, ignore_permission(category)) {
        return false;
    }
    session.counters.increment(category);
    true
}

/// Ledger side rolled back when a category breaches.
fn reverted_edits(category: Category) -> Option<EditKind> {
    match category {
        Category::TileKill => Some(EditKind::Destroyed),
        Category::TilePlace => Some(EditKind::Created),
        _ => None,
    }
}

/// Compare one session's counters against the limits and reset them.
///
/// Returns the categories that breached this window.
pub fn sweep(
    session: &mut Session,
    config: &ThresholdConfig,
    world: &mut World,
    outbound: &dyn Outbound,
    now: Instant,
) -> Vec<Category> {
    let mut breached = Vec::new();

    for category in Category::ALL {
        let max = limit(config, category);
        let value = session.counters.get(category);
        if max == 0 || value < max {
            continue;
        }

        session.disabled.insert(DisabledFlags::threshold(category));
        session.last_threat = Some(now);
        breached.push(category);

        match config.logging {
            BreachLogging::Console => info!(
                player = %session.label(),
                conn = session.conn,
                category = %category,
                count = value,
                limit = max,
                "Threshold exceeded"
            ),
            BreachLogging::LogAndConsole => warn!(
                player = %session.label(),
                conn = session.conn,
                category = %category,
                count = value,
                limit = max,
                "Threshold exceeded"
            ),
        }
        crate::metrics::record_disable(category.as_str());

        outbound.send_to(
            session.conn,
            Packet::error(format!(
                "You exceeded the {} threshold ({} per second) and are disabled for {} seconds.",
                category.describe(),
                max,
                config.disable_seconds
            )),
        );

        if let Some(kind) = reverted_edits(category) {
            for ((x, y), original) in session.ledger.take(kind) {
                if world.set_tile(x, y, original) {
                    outbound.broadcast(&Packet::tile(x, y, original));
                }
            }
        }
    }

    session.counters.reset();
    session.ledger.clear();
    breached
}

/// Lift threshold disables once `disable_seconds` have passed since the last
/// threat. Returns whether anything was cleared.
pub fn expire(session: &mut Session, config: &ThresholdConfig, now: Instant) -> bool {
    if !session.disabled.has_threshold() {
        return false;
    }
    let window = Duration::from_secs(config.disable_seconds);
    if session.is_throttled(now, window) {
        return false;
    }
    session.disabled.clear_thresholds();
    true
}
