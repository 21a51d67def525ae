//! PlayerInfo handler: name and difficulty policy.

use super::reasons;
use crate::handlers::core::{Context, DispatchEvent, HandlerResult};
use crate::handlers::helpers::{owns, payload, reject};
use crate::state::{ConnectionState, Transition};
use tileguard_proto::message::PlayerInfo;
use tracing::debug;

/// Why a name is refused, if it is.
fn name_problem(ctx: &Context<'_>, name: &str) -> Option<&'static str> {
    let login = &ctx.settings.login;
    if name.trim().is_empty() {
        return Some(reasons::EMPTY_NAME);
    }
    if name.chars().count() > login.max_name_length {
        return Some(reasons::NAME_TOO_LONG);
    }
    let lowered = name.to_lowercase();
    if login
        .reserved_prefixes
        .iter()
        .any(|prefix| !prefix.is_empty() && lowered.starts_with(&prefix.to_lowercase()))
    {
        return Some(reasons::RESERVED_NAME);
    }
    if ctx.sessions.name_in_use(name, ctx.conn()) {
        return Some(reasons::NAME_IN_USE);
    }
    None
}

pub fn handle_player_info(ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
    let info: PlayerInfo = payload!(event, PlayerInfo);
    if !owns(ctx, info.player) {
        reject(ctx, event, "player info for another slot");
        return Ok(());
    }

    if !ctx.settings.login.difficulty.allows(info.difficulty) {
        ctx.disconnect(event, reasons::DIFFICULTY);
        return Ok(());
    }

    if ctx.session.handshake.received_info {
        // Appearance update.
        if info.name != ctx.session.name {
            ctx.disconnect(event, reasons::NAME_CHANGED);
            return Ok(());
        }
        ctx.session.difficulty = info.difficulty;
        return Ok(());
    }

    if let Some(reason) = name_problem(ctx, &info.name) {
        ctx.disconnect(event, reason);
        return Ok(());
    }

    ctx.session.name = info.name;
    ctx.session.difficulty = info.difficulty;
    ctx.session.fingerprint = info.client_uuid.filter(|uuid| !uuid.is_empty());
    ctx.session.handshake.received_info = true;
    if ctx.session.state() == ConnectionState::AssigningSlot {
        ctx.session.advance(Transition::InfoAccepted)?;
    }
    debug!(
        instance = %ctx.instance,
        conn = ctx.conn(),
        player = %ctx.session.name,
        "Player info accepted"
    );
    Ok(())
}
