//! Item stacks and item names.
//!
//! Bans are configured by item name, so the bouncer needs a name for every
//! item it inspects. Ids the server reasons about directly are listed in
//! [`ids`]; anything else falls back to a generic `Item #<id>` name.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Numeric item type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i32);

impl ItemId {
    /// The empty slot.
    pub const NONE: ItemId = ItemId(0);

    /// Display name used for ban matching.
    pub fn name(self) -> Cow<'static, str> {
        match KNOWN_ITEMS.binary_search_by_key(&self.0, |(id, _)| *id) {
            Ok(idx) => Cow::Borrowed(KNOWN_ITEMS[idx].1),
            Err(_) => Cow::Owned(format!("Item #{}", self.0)),
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Item ids the server handles specially.
pub mod ids {
    use super::ItemId;

    pub const DIRT_BLOCK: ItemId = ItemId(2);
    pub const TORCH: ItemId = ItemId(8);
    pub const SUSPICIOUS_LOOKING_EYE: ItemId = ItemId(43);
    pub const MAGIC_MIRROR: ItemId = ItemId(50);
    pub const WORM_FOOD: ItemId = ItemId(70);
    pub const WATER_BUCKET: ItemId = ItemId(206);
    pub const LAVA_BUCKET: ItemId = ItemId(207);
    pub const GOBLIN_BATTLE_STANDARD: ItemId = ItemId(361);
    pub const MECHANICAL_EYE: ItemId = ItemId(544);
    pub const SLIME_CROWN: ItemId = ItemId(560);
    pub const ACTUATOR: ItemId = ItemId(849);
    pub const PAINTBRUSH: ItemId = ItemId(1071);
    pub const PAINT_ROLLER: ItemId = ItemId(1072);
    pub const PAINT_SCRAPER: ItemId = ItemId(1100);
    pub const HONEY_BUCKET: ItemId = ItemId(1128);
    pub const ROD_OF_DISCORD: ItemId = ItemId(1326);
    pub const SPECTRE_PAINTBRUSH: ItemId = ItemId(1543);
    pub const SPECTRE_PAINT_ROLLER: ItemId = ItemId(1544);
    pub const SPECTRE_PAINT_SCRAPER: ItemId = ItemId(1545);
    pub const RECALL_POTION: ItemId = ItemId(2350);
    pub const TELEPORTATION_POTION: ItemId = ItemId(2351);
    pub const WORMHOLE_POTION: ItemId = ItemId(2997);
}

/// Sorted by id for binary search.
const KNOWN_ITEMS: &[(i32, &str)] = &[
    (2, "Dirt Block"),
    (8, "Torch"),
    (43, "Suspicious Looking Eye"),
    (50, "Magic Mirror"),
    (70, "Worm Food"),
    (206, "Water Bucket"),
    (207, "Lava Bucket"),
    (361, "Goblin Battle Standard"),
    (544, "Mechanical Eye"),
    (560, "Slime Crown"),
    (849, "Actuator"),
    (1071, "Paintbrush"),
    (1072, "Paint Roller"),
    (1100, "Paint Scraper"),
    (1128, "Honey Bucket"),
    (1326, "Rod of Discord"),
    (1543, "Spectre Paintbrush"),
    (1544, "Spectre Paint Roller"),
    (1545, "Spectre Paint Scraper"),
    (2350, "Recall Potion"),
    (2351, "Teleportation Potion"),
    (2997, "Wormhole Potion"),
];

/// One inventory slot's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Item {
    /// Item type; [`ItemId::NONE`] for an empty slot.
    pub id: ItemId,
    /// Stack size.
    pub stack: i16,
    /// Reforge prefix.
    pub prefix: u8,
}

impl Item {
    /// The empty slot value.
    pub const EMPTY: Item = Item {
        id: ItemId::NONE,
        stack: 0,
        prefix: 0,
    };

    /// A single unprefixed item.
    pub const fn single(id: ItemId) -> Self {
        Self {
            id,
            stack: 1,
            prefix: 0,
        }
    }

    /// A stack of `stack` unprefixed items.
    pub const fn stack(id: ItemId, stack: i16) -> Self {
        Self {
            id,
            stack,
            prefix: 0,
        }
    }

    /// Whether the slot holds nothing.
    pub fn is_empty(&self) -> bool {
        self.id == ItemId::NONE || self.stack <= 0
    }

    /// Name used for ban checks.
    pub fn name(&self) -> Cow<'static, str> {
        self.id.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_items_are_sorted() {
        assert!(KNOWN_ITEMS.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn names_resolve() {
        assert_eq!(ids::ACTUATOR.name(), "Actuator");
        assert_eq!(ItemId(99_999).name(), "Item #99999");
    }

    #[test]
    fn empty_detection() {
        assert!(Item::EMPTY.is_empty());
        assert!(Item::stack(ids::TORCH, 0).is_empty());
        assert!(!Item::single(ids::TORCH).is_empty());
    }

    #[test]
    fn default_item_is_the_empty_slot() {
        assert_eq!(ItemId::default(), ItemId::NONE);
        assert_eq!(Item::default(), Item::EMPTY);
    }
}
