//! NPC strikes and conversations.

use super::core::{Context, DispatchEvent, HandlerResult};
use super::helpers::{owns, payload, reject};
use tileguard_proto::message::{NpcStrike, NpcTalk};
use tileguard_proto::{MAX_NPCS, Packet};

fn npc_in_range(npc: i16) -> bool {
    usize::try_from(npc).is_ok_and(|n| n < MAX_NPCS)
}

pub fn handle_npc_strike(ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
    let strike = payload!(event, NpcStrike);
    if !npc_in_range(strike.npc) {
        reject(ctx, event, "npc index out of range");
        return Ok(());
    }
    let cap = ctx.settings.security.max_npc_damage;
    let rejection = if ctx.session.is_disabled() {
        Some("disabled")
    } else if strike.damage < 0 || strike.damage > cap {
        Some("npc damage over cap")
    } else {
        None
    };
    if let Some(reason) = rejection {
        reject(ctx, event, reason);
        ctx.reply(Packet::NpcUpdate { npc: strike.npc });
    }
    Ok(())
}

pub(super) fn apply_strike(ctx: &mut Context<'_>, strike: &NpcStrike) {
    ctx.relay(&Packet::NpcStrike {
        npc: strike.npc,
        damage: strike.damage,
    });
}

pub fn handle_npc_talk(ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
    let talk = payload!(event, NpcTalk);
    if !owns(ctx, talk.player) || (talk.npc != -1 && !npc_in_range(talk.npc)) {
        reject(ctx, event, "invalid npc talk");
        return Ok(());
    }
    if ctx.session.is_disabled() {
        reject(ctx, event, "disabled");
        ctx.reply(Packet::NpcTalk {
            player: talk.player,
            npc: -1,
        });
    }
    Ok(())
}

pub(super) fn apply_talk(ctx: &mut Context<'_>, talk: &NpcTalk) {
    ctx.session.talk_npc = talk.npc;
    ctx.relay(&Packet::NpcTalk {
        player: talk.player,
        npc: talk.npc,
    });
}
