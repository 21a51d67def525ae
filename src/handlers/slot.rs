//! Inventory slot sync.

use super::core::{Context, DispatchEvent, HandlerResult};
use super::helpers::{owns, payload, reject, resend_slot};
use crate::state::TOTAL_SLOTS;
use tileguard_proto::Packet;
use tileguard_proto::message::SlotSync;

pub fn handle_slot_sync(ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
    let sync = payload!(event, SlotSync);
    let in_range = usize::try_from(sync.slot).is_ok_and(|slot| slot < TOTAL_SLOTS);
    if !in_range {
        reject(ctx, event, "slot out of range");
        return Ok(());
    }
    if !owns(ctx, sync.player) {
        reject(ctx, event, "slot sync for another player");
        return Ok(());
    }
    if ctx.session.slots_authoritative(ctx.now) {
        reject(ctx, event, "inside authoritative slot window");
        resend_slot(ctx, sync.slot);
        return Ok(());
    }
    Ok(())
}

pub(super) fn apply(ctx: &mut Context<'_>, sync: &SlotSync) {
    let Ok(slot) = usize::try_from(sync.slot) else {
        return;
    };
    if ctx.session.inventory.set(slot, sync.item) {
        ctx.relay(&Packet::SlotSync {
            player: sync.player,
            slot: sync.slot,
            item: sync.item,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::Fixture;
    use std::time::Duration;
    use tileguard_proto::{Item, ItemId, Payload};

    fn sync(player: u8, slot: i16) -> Payload {
        Payload::SlotSync(SlotSync {
            player,
            slot,
            item: Item::stack(ItemId(2), 5),
        })
    }

    #[test]
    fn accepted_sync_stores_and_relays() {
        let mut f = Fixture::new();
        let (event, _) = f.run(handle_slot_sync, sync(0, 3));
        assert!(!event.is_cancelled());
        assert_eq!(f.session.inventory.get(3), Some(Item::stack(ItemId(2), 5)));
        assert_eq!(f.sent_to(1).len(), 1);
        assert!(f.sent_to(0).is_empty());
    }

    #[test]
    fn out_of_range_and_foreign_slots_cancel() {
        let mut f = Fixture::new();
        let (event, _) = f.run(handle_slot_sync, sync(0, 350));
        assert!(event.is_cancelled());
        let (event, _) = f.run(handle_slot_sync, sync(0, -1));
        assert!(event.is_cancelled());
        let (event, _) = f.run(handle_slot_sync, sync(1, 0));
        assert!(event.is_cancelled());
        assert!(f.outbound.is_empty());
    }

    #[test]
    fn authoritative_window_resends_server_copy() {
        let mut f = Fixture::new();
        f.session.authoritative_until = Some(f.now + Duration::from_secs(1));
        let (event, _) = f.run(handle_slot_sync, sync(0, 3));
        assert!(event.is_cancelled());
        assert_eq!(f.session.inventory.get(3), Some(Item::EMPTY));
        assert_eq!(
            f.sent_to(0),
            vec![Packet::SlotSync {
                player: 0,
                slot: 3,
                item: Item::EMPTY
            }]
        );
    }
}
