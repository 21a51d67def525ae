//! Connection and login handlers.
//!
//! Handles PlayerInfo, WorldDataRequest and Password, and the character
//! restore that runs on a successful login.

mod password;
mod player_info;
mod restore;
mod world_request;

pub use password::handle_password;
pub use player_info::handle_player_info;
pub use restore::restore_character;
pub use world_request::handle_world_request;

use super::core::{Context, DispatchEvent, HandlerResult};
use crate::persistence::Account;
use crate::state::Transition;
use tileguard_proto::Packet;
use tracing::info;

/// Disconnect reasons shown to the player.
pub mod reasons {
    pub const INVALID_PASSWORD_INPUT: &str = "Empty or invalid password sent by client.";
    pub const WRONG_ACCOUNT_PASSWORD: &str = "Invalid user account password.";
    pub const WRONG_SERVER_PASSWORD: &str = "Invalid server password.";
    pub const RESTORE_FAILED: &str = "Failed to load your character.";
    pub const EMPTY_NAME: &str = "Your name may not be empty.";
    pub const NAME_TOO_LONG: &str = "Your name is too long.";
    pub const RESERVED_NAME: &str = "Your name uses a reserved prefix.";
    pub const NAME_IN_USE: &str = "That name is already in use on this server.";
    pub const NAME_CHANGED: &str = "Changing your name while connected is not allowed.";
    pub const DIFFICULTY: &str = "Your character difficulty is not allowed on this server.";
}

/// Send the one world-info packet that lets the client finish joining.
fn send_world_info(ctx: &Context<'_>) {
    let (spawn_x, spawn_y) = ctx.world.spawn();
    ctx.reply(Packet::WorldInfo {
        name: ctx.world.name.clone(),
        width: ctx.world.width(),
        height: ctx.world.height(),
        spawn_x,
        spawn_y,
    });
}

/// Finish the handshake without an account.
fn complete_as_guest(ctx: &mut Context<'_>) -> HandlerResult {
    ctx.session.handshake.requires_password = false;
    send_world_info(ctx);
    ctx.session.advance(Transition::LoginCompleted)?;
    info!(
        instance = %ctx.instance,
        conn = ctx.conn(),
        player = %ctx.session.label(),
        group = %ctx.session.group,
        "Player joined as guest"
    );
    Ok(())
}

/// Finish the handshake as `account`.
///
/// A character that fails to restore disconnects the player before any
/// world-info is sent.
fn login_success(ctx: &mut Context<'_>, event: &mut DispatchEvent, account: Account) -> HandlerResult {
    ctx.session.group = account.group.clone();
    ctx.services
        .accounts
        .record_login(&account.name, ctx.session.fingerprint.as_deref())?;

    // Attached only after a restore: a session that failed one must not be
    // saved over the stored record on disconnect.
    if ctx.settings.ssc.enabled && !restore_character(ctx, event, &account.name) {
        return Ok(());
    }
    ctx.session.account = Some(account.name.clone());

    ctx.session.handshake.requires_password = false;
    send_world_info(ctx);
    ctx.session.advance(Transition::LoginCompleted)?;
    ctx.reply(Packet::info(format!("Authenticated as {}.", account.name)));
    info!(
        instance = %ctx.instance,
        conn = ctx.conn(),
        account = %account.name,
        group = %account.group,
        "Player logged in"
    );
    Ok(())
}
