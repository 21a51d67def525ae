//! Tile edits and liquid placement.
//!
//! Accepted edits are recorded in the session's tile ledger with the tile
//! as it was before the edit, so a threshold breach can roll them back.

use super::core::{Context, DispatchEvent, HandlerResult};
use super::helpers::{payload, reject, resend_tile};
use crate::state::{Category, EditKind};
use std::borrow::Cow;
use tileguard_proto::item::ids;
use tileguard_proto::message::{LiquidSet, TileAction, TileEdit};
use tileguard_proto::{Item, LiquidKind, Packet};

/// Name of the item the edit would put into the world, when banned.
fn placement_ban(ctx: &Context<'_>, action: TileAction) -> Option<Cow<'static, str>> {
    match action {
        TileAction::PlaceActuator => ctx.banned(Item::single(ids::ACTUATOR)),
        TileAction::PlaceTile | TileAction::PlaceWall => {
            ctx.banned(ctx.session.inventory.selected(ctx.session.selected_slot))
        }
        _ => None,
    }
}

fn check_edit(ctx: &Context<'_>, edit: &TileEdit) -> Result<(), Cow<'static, str>> {
    if ctx.session.is_disabled() {
        return Err("disabled".into());
    }
    if matches!(edit.action, TileAction::Unknown(_)) {
        return Err("unknown tile action".into());
    }
    if !ctx.may_build_at(edit.x, edit.y) {
        return Err("no build permission".into());
    }
    let security = &ctx.settings.security;
    if !ctx.session.in_range(edit.x, edit.y, security.build_range) {
        let blast = edit.action.is_kill()
            && ctx
                .session
                .projectiles
                .has_live_near(edit.x, edit.y, security.explosive_radius);
        if !blast {
            return Err("out of range".into());
        }
    }
    if ctx.throttled() {
        return Err("throttled".into());
    }
    if let Some(name) = placement_ban(ctx, edit.action) {
        ctx.reply(Packet::error(format!("You cannot place {name}; it is banned.")));
        return Err("banned placement".into());
    }
    Ok(())
}

pub fn handle_tile_edit(ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
    let edit = payload!(event, TileEdit);
    let Some(original) = ctx.world.tile(edit.x, edit.y) else {
        reject(ctx, event, "out of bounds");
        return Ok(());
    };
    if let Err(reason) = check_edit(ctx, &edit) {
        reject(ctx, event, &reason);
        resend_tile(ctx, edit.x, edit.y);
        return Ok(());
    }

    let (kind, category) = if edit.action.is_kill() {
        (EditKind::Destroyed, Category::TileKill)
    } else {
        (EditKind::Created, Category::TilePlace)
    };
    ctx.session.ledger.record(kind, edit.x, edit.y, original);
    ctx.count(category);
    Ok(())
}

pub(super) fn apply_edit(ctx: &mut Context<'_>, edit: &TileEdit) {
    let Some(tile) = ctx.world.tile_mut(edit.x, edit.y) else {
        return;
    };
    match edit.action {
        TileAction::KillTile => tile.block = None,
        TileAction::PlaceTile => tile.block = Some(edit.style),
        TileAction::KillWall => tile.wall = 0,
        TileAction::PlaceWall => tile.wall = edit.style,
        TileAction::PlaceActuator => tile.actuator = true,
        TileAction::KillActuator => tile.actuator = false,
        TileAction::Unknown(_) => return,
    }
    let updated = *tile;
    ctx.relay(&Packet::tile(edit.x, edit.y, updated));
}

fn bucket(kind: LiquidKind) -> Option<Item> {
    match kind {
        LiquidKind::Lava => Some(Item::single(ids::LAVA_BUCKET)),
        LiquidKind::Honey => Some(Item::single(ids::HONEY_BUCKET)),
        LiquidKind::Water | LiquidKind::Shimmer => None,
    }
}

fn check_liquid(ctx: &Context<'_>, liquid: &LiquidSet) -> Result<(), &'static str> {
    if ctx.session.is_disabled() {
        return Err("disabled");
    }
    if !ctx.may_build_at(liquid.x, liquid.y) {
        return Err("no build permission");
    }
    if !ctx
        .session
        .in_range(liquid.x, liquid.y, ctx.settings.security.build_range)
    {
        return Err("out of range");
    }
    if liquid.amount > 0
        && let Some(bucket) = bucket(liquid.kind)
        && let Some(name) = ctx.banned(bucket)
    {
        ctx.reply(Packet::error(format!("You cannot use {name}; it is banned.")));
        return Err("banned bucket");
    }
    Ok(())
}

pub fn handle_liquid(ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
    let liquid = payload!(event, LiquidSet);
    if !ctx.world.in_bounds(liquid.x, liquid.y) {
        reject(ctx, event, "out of bounds");
        return Ok(());
    }
    if let Err(reason) = check_liquid(ctx, &liquid) {
        reject(ctx, event, reason);
        resend_tile(ctx, liquid.x, liquid.y);
        return Ok(());
    }
    ctx.count(Category::TileLiquid);
    Ok(())
}

pub(super) fn apply_liquid(ctx: &mut Context<'_>, liquid: &LiquidSet) {
    let Some(tile) = ctx.world.tile_mut(liquid.x, liquid.y) else {
        return;
    };
    tile.liquid = liquid.amount;
    tile.liquid_kind = liquid.kind;
    let updated = *tile;
    ctx.relay(&Packet::tile(liquid.x, liquid.y, updated));
}
