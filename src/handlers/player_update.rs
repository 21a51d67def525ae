//! Movement and held-item updates.

use super::core::{Context, DispatchEvent, HandlerResult};
use super::helpers::{owns, payload, reject};
use crate::state::SlotCategory;
use tileguard_proto::message::PlayerUpdate;
use tileguard_proto::{Packet, Payload};
use tracing::debug;

pub fn handle_player_update(ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
    let update = payload!(event, PlayerUpdate);
    if !owns(ctx, update.player) {
        reject(ctx, event, "update for another player");
        return Ok(());
    }
    if usize::from(update.selected_slot) >= SlotCategory::Inventory.count() {
        reject(ctx, event, "selected slot out of range");
        return Ok(());
    }
    if !ctx.world.pixel_in_bounds(update.x, update.y) {
        reject(ctx, event, "position out of bounds");
        return Ok(());
    }

    let previous = ctx.session.selected_slot;
    let selected = ctx.session.inventory.selected(update.selected_slot);
    let selected_ban = ctx.banned(selected);
    if update.selected_slot != previous
        && let Some(name) = &selected_ban
    {
        reject(ctx, event, "selected banned item");
        ctx.reply(Packet::SelectedSlot {
            player: update.player,
            slot: previous,
        });
        ctx.reply(Packet::error(format!("{name} is banned.")));
        return Ok(());
    }

    if update.using_item && (ctx.session.held_item_banned || selected_ban.is_some()) {
        debug!(conn = ctx.conn(), "Stripping use of banned held item");
        let stripped = PlayerUpdate {
            using_item: false,
            ..update
        };
        event.payload = Payload::PlayerUpdate(stripped);
        event.overwrite();
        apply(ctx, &stripped);
    }
    Ok(())
}

pub(super) fn apply(ctx: &mut Context<'_>, update: &PlayerUpdate) {
    ctx.session.position = (update.x, update.y);
    ctx.session.selected_slot = update.selected_slot;
    ctx.relay(&Packet::PlayerUpdate(*update));
}
