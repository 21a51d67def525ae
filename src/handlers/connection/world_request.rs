//! WorldDataRequest handler: picks fingerprint login, a password challenge
//! or a guest join.

use super::{complete_as_guest, login_success};
use crate::handlers::core::{Context, DispatchEvent, HandlerResult};
use crate::state::Transition;
use tileguard_proto::Packet;
use tracing::debug;

pub fn handle_world_request(ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
    ctx.session.advance(Transition::WorldRequested)?;

    let account = ctx.services.accounts.find(&ctx.session.name);
    match account {
        Some(account)
            if ctx.settings.login.fingerprint_login
                && ctx
                    .session
                    .fingerprint
                    .as_deref()
                    .is_some_and(|fp| account.knows_fingerprint(fp)) =>
        {
            debug!(conn = ctx.conn(), account = %account.name, "Fingerprint login");
            login_success(ctx, event, account)
        }
        Some(_) => challenge(ctx),
        None if ctx.settings.password.is_some() => challenge(ctx),
        None => complete_as_guest(ctx),
    }
}

fn challenge(ctx: &mut Context<'_>) -> HandlerResult {
    ctx.session.handshake.requires_password = true;
    ctx.reply(Packet::PasswordChallenge);
    debug!(conn = ctx.conn(), player = %ctx.session.name, "Password required");
    Ok(())
}
