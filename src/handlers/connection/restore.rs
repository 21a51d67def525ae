//! Server-side character restore.

use super::reasons;
use crate::error::StoreError;
use crate::handlers::core::{Context, DispatchEvent};
use crate::persistence::CharacterRecord;
use crate::state::{Inventory, SlotCategory, TOTAL_SLOTS};
use std::time::Duration;
use tileguard_proto::Packet;
use tracing::{debug, error};

/// Load `account`'s stored character into the sender's session and push
/// every slot to the clients.
///
/// Returns `false` when the player was disconnected because the record
/// could not be loaded. An account with no stored character keeps the
/// client's own inventory.
pub fn restore_character(ctx: &mut Context<'_>, event: &mut DispatchEvent, account: &str) -> bool {
    let record = match load(ctx, account) {
        Ok(Some(record)) => record,
        Ok(None) => {
            debug!(conn = ctx.conn(), account, "No stored character");
            return true;
        }
        Err(e) => {
            error!(
                instance = %ctx.instance,
                conn = ctx.conn(),
                account,
                error = %e,
                "Character restore failed"
            );
            ctx.disconnect(event, reasons::RESTORE_FAILED);
            return false;
        }
    };

    let (record, inventory) = record;
    let session = &mut *ctx.session;
    session.inventory = inventory;
    session.stats = record.stats;
    session.stored_spawn = record.spawn;
    session.deaths_pve = record.deaths_pve;
    session.deaths_pvp = record.deaths_pvp;
    session.loadout = record.loadout;

    push_slots(ctx);
    let stats = ctx.session.stats;
    ctx.broadcast(&Packet::PlayerStats {
        player: ctx.conn(),
        health: stats.health,
        max_health: stats.max_health,
        mana: stats.mana,
        max_mana: stats.max_mana,
    });

    let window = Duration::from_millis(ctx.settings.ssc.authoritative_slot_millis);
    ctx.session.authoritative_until = Some(ctx.now + window);
    true
}

fn load(ctx: &Context<'_>, account: &str) -> Result<Option<(CharacterRecord, Inventory)>, StoreError> {
    let Some(mut record) = ctx.services.characters.load(account)? else {
        return Ok(None);
    };
    let actual = record.slots.len();
    let slots = std::mem::take(&mut record.slots);
    let inventory = Inventory::from_flat(slots).ok_or_else(|| StoreError::SlotCount {
        account: account.to_string(),
        expected: TOTAL_SLOTS,
        actual,
    })?;
    Ok(Some((record, inventory)))
}

/// Every slot, category by category: once to everybody else, once to the
/// owner.
fn push_slots(ctx: &Context<'_>) {
    let conn = ctx.conn();
    for &category in SlotCategory::ALL {
        for (index, item) in ctx.session.inventory.category(category).iter().enumerate() {
            let Ok(slot) = i16::try_from(category.offset() + index) else {
                continue;
            };
            let packet = Packet::SlotSync {
                player: conn,
                slot,
                item: *item,
            };
            ctx.outbound.broadcast_except(conn, &packet);
            ctx.outbound.send_to(conn, packet);
        }
    }
}
