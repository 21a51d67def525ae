//! Equipment loadout switching.

use super::core::{Context, DispatchEvent, HandlerResult};
use super::helpers::{owns, payload, reject};
use tileguard_proto::message::LoadoutSwitch;
use tileguard_proto::{LOADOUT_COUNT, Packet};
use tracing::warn;

pub fn handle_loadout(ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
    let switch = payload!(event, LoadoutSwitch);
    if !owns(ctx, switch.player) || switch.index >= LOADOUT_COUNT {
        reject(ctx, event, "invalid loadout switch");
        return Ok(());
    }
    if switch.index == ctx.session.loadout {
        event.reject();
    }
    Ok(())
}

pub(super) fn apply(ctx: &mut Context<'_>, switch: &LoadoutSwitch) {
    let from = ctx.session.loadout;
    if !ctx.session.inventory.switch_loadout(from, switch.index) {
        warn!(conn = ctx.conn(), from, to = switch.index, "Loadout switch refused");
        return;
    }
    ctx.session.loadout = switch.index;
    ctx.relay(&Packet::LoadoutSwitched {
        player: switch.player,
        index: switch.index,
    });
}
