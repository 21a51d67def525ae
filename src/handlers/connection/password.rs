//! Password handler: account password or server password.

use super::{complete_as_guest, login_success, reasons};
use crate::handlers::core::{Context, DispatchEvent, HandlerResult};
use crate::handlers::helpers::{payload, reject};
use crate::security::password::{is_printable, verify_password};
use tracing::info;

pub fn handle_password(ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
    let answer = payload!(event, Password);
    if !ctx.session.handshake.requires_password {
        reject(ctx, event, "password not requested");
        return Ok(());
    }

    if !is_printable(&answer.password) {
        ctx.disconnect(event, reasons::INVALID_PASSWORD_INPUT);
        return Ok(());
    }

    if let Some(account) = ctx.services.accounts.find(&ctx.session.name) {
        if verify_password(&answer.password, &account.password_hash) {
            return login_success(ctx, event, account);
        }
        info!(conn = ctx.conn(), account = %account.name, "Wrong account password");
        ctx.disconnect(event, reasons::WRONG_ACCOUNT_PASSWORD);
        return Ok(());
    }

    match ctx.settings.password.as_deref() {
        Some(expected) if expected == answer.password => complete_as_guest(ctx),
        _ => {
            ctx.disconnect(event, reasons::WRONG_SERVER_PASSWORD);
            Ok(())
        }
    }
}
