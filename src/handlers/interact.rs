//! Doors, signs and chests.

use super::core::{Context, DispatchEvent, HandlerResult};
use super::helpers::{payload, reject};
use crate::security::perms;
use crate::state::world::{CHEST_SLOTS, MAX_SIGN_TEXT};
use tileguard_proto::Packet;
use tileguard_proto::message::{ChestItem, ChestOpen, DoorToggle, SignEdit};

/// Shared gate: tile in the world, player not disabled, within reach.
fn reachable(ctx: &Context<'_>, x: i32, y: i32) -> Result<(), &'static str> {
    if !ctx.world.in_bounds(x, y) {
        return Err("out of bounds");
    }
    if ctx.session.is_disabled() {
        return Err("disabled");
    }
    if !ctx
        .session
        .in_range(x, y, ctx.settings.security.interact_range)
    {
        return Err("out of range");
    }
    Ok(())
}

pub fn handle_door(ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
    let door = payload!(event, DoorToggle);
    let verdict = reachable(ctx, door.x, door.y).and_then(|()| {
        if ctx.may_build_at(door.x, door.y) {
            Ok(())
        } else {
            Err("no build permission")
        }
    });
    if let Err(reason) = verdict {
        reject(ctx, event, reason);
        if let Some(tile) = ctx.world.tile(door.x, door.y) {
            ctx.reply(Packet::DoorToggled {
                x: door.x,
                y: door.y,
                open: tile.open,
            });
        }
    }
    Ok(())
}

pub(super) fn apply_door(ctx: &mut Context<'_>, door: &DoorToggle) {
    if let Some(tile) = ctx.world.tile_mut(door.x, door.y) {
        tile.open = door.open;
        ctx.relay(&Packet::DoorToggled {
            x: door.x,
            y: door.y,
            open: door.open,
        });
    }
}

pub fn handle_sign(ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
    let edit = payload!(event, SignEdit);
    let Some(sign) = ctx.world.sign(edit.sign) else {
        reject(ctx, event, "unknown sign");
        return Ok(());
    };
    let current = Packet::SignText {
        sign: edit.sign,
        x: sign.x,
        y: sign.y,
        text: sign.text.clone(),
    };
    let (sx, sy) = (sign.x, sign.y);
    let verdict = reachable(ctx, sx, sy).and_then(|()| {
        if (edit.x, edit.y) != (sx, sy) {
            Err("sign position mismatch")
        } else if !ctx.can(perms::EDIT_SIGN) || !ctx.may_build_at(sx, sy) {
            Err("no sign permission")
        } else if edit.text.chars().count() > MAX_SIGN_TEXT {
            Err("sign text too long")
        } else {
            Ok(())
        }
    });
    if let Err(reason) = verdict {
        reject(ctx, event, reason);
        ctx.reply(current);
    }
    Ok(())
}

pub(super) fn apply_sign(ctx: &mut Context<'_>, edit: &SignEdit) {
    if let Some(sign) = ctx.world.sign_mut(edit.sign) {
        sign.text = edit.text.clone();
        let packet = Packet::SignText {
            sign: edit.sign,
            x: sign.x,
            y: sign.y,
            text: edit.text.clone(),
        };
        ctx.relay(&packet);
    }
}

pub fn handle_chest_open(ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
    let open = payload!(event, ChestOpen);
    let verdict = reachable(ctx, open.x, open.y).and_then(|()| {
        if !ctx.can(perms::OPEN_CHEST) {
            Err("no chest permission")
        } else if ctx.world.chest_at(open.x, open.y).is_none() {
            Err("no chest there")
        } else {
            Ok(())
        }
    });
    if let Err(reason) = verdict {
        reject(ctx, event, reason);
        ctx.reply(Packet::error("You cannot open this chest."));
    }
    Ok(())
}

pub(super) fn apply_chest_open(ctx: &mut Context<'_>, open: &ChestOpen) {
    let Some(id) = ctx.world.chest_at(open.x, open.y) else {
        return;
    };
    let Some(chest) = ctx.world.chest(id) else {
        return;
    };
    for (slot, item) in chest.items.iter().enumerate() {
        if item.is_empty() {
            continue;
        }
        let Ok(slot) = u8::try_from(slot) else {
            break;
        };
        ctx.reply(Packet::ChestSlot {
            chest: id,
            slot,
            item: *item,
        });
    }
}

pub fn handle_chest_item(ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
    let update = payload!(event, ChestItem);
    let Some(chest) = ctx.world.chest(update.chest) else {
        reject(ctx, event, "unknown chest");
        return Ok(());
    };
    let slot = usize::from(update.slot);
    if slot >= CHEST_SLOTS {
        reject(ctx, event, "chest slot out of range");
        return Ok(());
    }
    let current = chest.items.get(slot).copied().unwrap_or_default();
    let (cx, cy) = (chest.x, chest.y);

    let verdict = reachable(ctx, cx, cy).and_then(|()| {
        if !ctx.can(perms::OPEN_CHEST) {
            return Err("no chest permission");
        }
        if let Some(name) = ctx.banned(update.item) {
            ctx.reply(Packet::error(format!("{name} is banned.")));
            return Err("banned item");
        }
        Ok(())
    });
    if let Err(reason) = verdict {
        reject(ctx, event, reason);
        ctx.reply(Packet::ChestSlot {
            chest: update.chest,
            slot: update.slot,
            item: current,
        });
    }
    Ok(())
}

pub(super) fn apply_chest_item(ctx: &mut Context<'_>, update: &ChestItem) {
    let Some(chest) = ctx.world.chest_mut(update.chest) else {
        return;
    };
    let Some(slot) = chest.items.get_mut(usize::from(update.slot)) else {
        return;
    };
    *slot = update.item;
    ctx.relay(&Packet::ChestSlot {
        chest: update.chest,
        slot: update.slot,
        item: update.item,
    });
}
