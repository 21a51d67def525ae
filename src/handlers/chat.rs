//! Chat. Disabled players may still talk.

use super::core::{Context, DispatchEvent, HandlerResult};
use super::helpers::{payload, reject};
use tileguard_proto::Packet;
use tileguard_proto::message::ChatText;

pub fn handle_chat(ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
    let chat = payload!(event, ChatText);
    if chat.text.trim().is_empty() {
        reject(ctx, event, "empty chat");
    } else if chat.text.chars().count() > ctx.settings.security.max_chat_length {
        reject(ctx, event, "chat too long");
    }
    Ok(())
}

pub(super) fn apply(ctx: &mut Context<'_>, chat: &ChatText) {
    ctx.broadcast(&Packet::Chat {
        player: ctx.conn(),
        text: chat.text.clone(),
    });
}
