//! Helper functions shared by the validators.
//!
//! Payload extraction, ownership checks and the revert packets sent back to
//! a client whose action was rejected.

use super::core::{Context, DispatchEvent};
use tileguard_proto::{Packet, Payload};
use tracing::debug;

/// Pull a typed payload out of the event, or fail the handler with
/// `PayloadMismatch`.
///
/// The payload is cloned so the handler can keep mutating the event.
macro_rules! payload {
    ($event:expr, $variant:ident) => {
        match &$event.payload {
            ::tileguard_proto::Payload::$variant(p) => p.clone(),
            other => {
                return Err($crate::error::HandlerError::PayloadMismatch {
                    expected: ::tileguard_proto::MessageKind::$variant,
                    actual: other.kind(),
                });
            }
        }
    };
}
pub(crate) use payload;

/// Cancel `event` and log why at debug level.
pub fn reject(ctx: &Context<'_>, event: &mut DispatchEvent, reason: &str) {
    debug!(
        instance = %ctx.instance,
        conn = ctx.conn(),
        kind = %event.kind,
        reason,
        "Rejected message"
    );
    event.cancel();
}

/// Whether a player field in the payload names the sender.
pub fn owns(ctx: &Context<'_>, player: u8) -> bool {
    player == ctx.conn()
}

/// Send the server's copy of tile (x, y) back to the sender.
pub fn resend_tile(ctx: &Context<'_>, x: i32, y: i32) {
    if let Some(tile) = ctx.world.tile(x, y) {
        ctx.reply(Packet::tile(x, y, tile));
    }
}

/// Send the server's copy of one of the sender's inventory slots.
pub fn resend_slot(ctx: &Context<'_>, slot: i16) {
    let Ok(index) = usize::try_from(slot) else {
        return;
    };
    if let Some(item) = ctx.session.inventory.get(index) {
        ctx.reply(Packet::SlotSync {
            player: ctx.conn(),
            slot,
            item,
        });
    }
}

/// Put the sender back where the server last saw them.
pub fn reteleport(ctx: &Context<'_>) {
    let (x, y) = ctx.session.position;
    ctx.reply(Packet::Teleport {
        player: ctx.conn(),
        x,
        y,
    });
}

/// Short description of a payload for logs.
pub fn describe(payload: &Payload) -> String {
    match payload {
        Payload::TileEdit(edit) => format!("{:?} at ({}, {})", edit.action, edit.x, edit.y),
        Payload::ChatText(chat) => format!("chat ({} chars)", chat.text.chars().count()),
        other => other.kind().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tileguard_proto::message::{Paint, TileAction, TileEdit};

    #[test]
    fn describe_tile_edit() {
        let payload = Payload::TileEdit(TileEdit {
            action: TileAction::KillTile,
            x: 3,
            y: 4,
            style: 0,
        });
        assert_eq!(describe(&payload), "KillTile at (3, 4)");
        let paint = Payload::PaintTile(Paint { x: 0, y: 0, color: 1 });
        assert_eq!(describe(&paint), "paint_tile");
    }
}
