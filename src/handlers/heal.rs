//! Healing other players.

use super::core::{Context, DispatchEvent, HandlerResult};
use super::helpers::{payload, reject};
use crate::state::Category;
use tileguard_proto::Packet;
use tileguard_proto::message::HealOther;

pub fn handle_heal(ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
    let heal = payload!(event, HealOther);
    let target_known = heal.target == ctx.conn() || ctx.sessions.get(heal.target).is_some();
    let rejection = if !target_known {
        Some("no such heal target")
    } else if ctx.session.is_disabled() {
        Some("disabled")
    } else if heal.amount <= 0 || heal.amount > ctx.settings.security.max_heal {
        Some("heal amount over cap")
    } else {
        None
    };
    match rejection {
        Some(reason) => reject(ctx, event, reason),
        None => {
            ctx.count(Category::HealOther);
        }
    }
    Ok(())
}

pub(super) fn apply(ctx: &mut Context<'_>, heal: &HealOther) {
    ctx.relay(&Packet::HealOther {
        target: heal.target,
        amount: heal.amount,
    });
}
