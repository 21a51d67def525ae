//! Message validators.
//!
//! This module contains the handler registry and the built-in validators
//! that sit between every client and the shared world.
//!
//! ## Pipeline
//!
//! A validator inspects the payload and the sender's session and either
//! lets the message through, cancels it (usually sending the client a
//! correction), overwrites it with a modified effect, or disconnects the
//! sender. When the chain finishes with [`Outcome::Continue`] the default
//! world effect is applied by [`apply_effect`].

pub mod core;

mod chat;
mod connection;
mod heal;
pub(crate) mod helpers;
mod interact;
mod loadout;
mod npc;
mod paint;
mod player_update;
mod projectile;
mod slot;
mod spawn;
mod summon;
mod teleport;
mod tiles;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::core::{
    Context, DispatchEvent, Handler, HandlerError, HandlerResult, Outcome, Priority, Registry,
    Services,
};
pub use connection::reasons;
pub use spawn::RESPAWN_SECONDS;
pub use summon::{SummonCategory, classify as classify_summon};

use tileguard_proto::{MessageKind, Payload};

/// Register every built-in validator at normal priority.
pub fn register_all(registry: &Registry) {
    use MessageKind as K;

    registry.register(K::PlayerInfo, connection::handle_player_info, Priority::Normal);
    registry.register(K::WorldDataRequest, connection::handle_world_request, Priority::Normal);
    registry.register(K::Password, connection::handle_password, Priority::Normal);

    registry.register(K::SlotSync, slot::handle_slot_sync, Priority::Normal);
    registry.register(K::PlayerUpdate, player_update::handle_player_update, Priority::Normal);
    registry.register(K::SpawnPlayer, spawn::handle_spawn, Priority::Normal);
    registry.register(K::PlayerDeath, spawn::handle_death, Priority::Normal);
    registry.register(K::NpcStrike, npc::handle_npc_strike, Priority::Normal);
    registry.register(K::NpcTalk, npc::handle_npc_talk, Priority::Normal);
    registry.register(K::SummonBoss, summon::handle_summon, Priority::Normal);
    registry.register(K::PaintTile, paint::handle_paint_tile, Priority::Normal);
    registry.register(K::PaintWall, paint::handle_paint_wall, Priority::Normal);
    registry.register(K::DoorToggle, interact::handle_door, Priority::Normal);
    registry.register(K::SignEdit, interact::handle_sign, Priority::Normal);
    registry.register(K::ChestOpen, interact::handle_chest_open, Priority::Normal);
    registry.register(K::ChestItem, interact::handle_chest_item, Priority::Normal);
    registry.register(K::LoadoutSwitch, loadout::handle_loadout, Priority::Normal);
    registry.register(K::Teleport, teleport::handle_teleport, Priority::Normal);
    registry.register(K::TileEdit, tiles::handle_tile_edit, Priority::Normal);
    registry.register(K::LiquidSet, tiles::handle_liquid, Priority::Normal);
    registry.register(K::NewProjectile, projectile::handle_new_projectile, Priority::Normal);
    registry.register(K::KillProjectile, projectile::handle_kill_projectile, Priority::Normal);
    registry.register(K::HealOther, heal::handle_heal, Priority::Normal);
    registry.register(K::ChatText, chat::handle_chat, Priority::Normal);
}

/// Apply a message's default world effect.
///
/// Does nothing unless the chain left the outcome at `Continue`.
pub fn apply_effect(ctx: &mut Context<'_>, event: &DispatchEvent) {
    if event.outcome != Outcome::Continue {
        return;
    }
    match &event.payload {
        Payload::PlayerInfo(_) | Payload::WorldDataRequest | Payload::Password(_) => {}
        Payload::SlotSync(p) => slot::apply(ctx, p),
        Payload::PlayerUpdate(p) => player_update::apply(ctx, p),
        Payload::SpawnPlayer(p) => spawn::apply(ctx, p),
        Payload::PlayerDeath(p) => spawn::apply_death(ctx, p),
        Payload::NpcStrike(p) => npc::apply_strike(ctx, p),
        Payload::NpcTalk(p) => npc::apply_talk(ctx, p),
        Payload::SummonBoss(p) => summon::apply(ctx, p),
        Payload::PaintTile(p) => paint::apply_tile(ctx, p),
        Payload::PaintWall(p) => paint::apply_wall(ctx, p),
        Payload::DoorToggle(p) => interact::apply_door(ctx, p),
        Payload::SignEdit(p) => interact::apply_sign(ctx, p),
        Payload::ChestOpen(p) => interact::apply_chest_open(ctx, p),
        Payload::ChestItem(p) => interact::apply_chest_item(ctx, p),
        Payload::LoadoutSwitch(p) => loadout::apply(ctx, p),
        Payload::Teleport(p) => teleport::apply(ctx, p),
        Payload::TileEdit(p) => tiles::apply_edit(ctx, p),
        Payload::LiquidSet(p) => tiles::apply_liquid(ctx, p),
        Payload::NewProjectile(p) => projectile::apply_new(ctx, p),
        Payload::KillProjectile(p) => projectile::apply_kill(ctx, p),
        Payload::HealOther(p) => heal::apply(ctx, p),
        Payload::ChatText(p) => chat::apply(ctx, p),
    }
}
