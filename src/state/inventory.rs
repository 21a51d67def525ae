//! Typed player inventory.
//!
//! The flat slot index used on the wire and in character storage is carved
//! into categories by one generated layout table. Call sites address slots by
//! category, never by numeric range.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use tileguard_proto::{Item, LOADOUT_COUNT};

macro_rules! slot_layout {
    ($($variant:ident => $count:expr),+ $(,)?) => {
        /// A group of contiguous inventory slots.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum SlotCategory {
            $($variant),+
        }

        const COUNTS: &[usize] = &[$($count),+];

        impl SlotCategory {
            /// Every category, in storage order.
            pub const ALL: &'static [SlotCategory] = &[$(SlotCategory::$variant),+];
        }
    };
}

slot_layout! {
    Inventory => 59,
    Armor => 20,
    Dye => 10,
    MiscEquip => 5,
    MiscDye => 5,
    PiggyBank => 40,
    Safe => 40,
    Trash => 1,
    DefendersForge => 40,
    VoidVault => 40,
    Loadout1Armor => 20,
    Loadout1Dye => 10,
    Loadout2Armor => 20,
    Loadout2Dye => 10,
    Loadout3Armor => 20,
    Loadout3Dye => 10,
}

const fn offsets() -> [usize; COUNTS.len()] {
    let mut out = [0; COUNTS.len()];
    let mut i = 1;
    while i < COUNTS.len() {
        out[i] = out[i - 1] + COUNTS[i - 1];
        i += 1;
    }
    out
}

const OFFSETS: [usize; COUNTS.len()] = offsets();

/// Total number of slots in a character record.
pub const TOTAL_SLOTS: usize = OFFSETS[COUNTS.len() - 1] + COUNTS[COUNTS.len() - 1];

impl SlotCategory {
    /// Number of slots in the category.
    pub const fn count(self) -> usize {
        COUNTS[self as usize]
    }

    /// First flat index of the category.
    pub const fn offset(self) -> usize {
        OFFSETS[self as usize]
    }

    /// Flat index range of the category.
    pub const fn range(self) -> Range<usize> {
        self.offset()..self.offset() + self.count()
    }

    /// Category and in-category index of a flat slot.
    pub fn locate(slot: usize) -> Option<(SlotCategory, usize)> {
        Self::ALL
            .iter()
            .find(|c| c.range().contains(&slot))
            .map(|&c| (c, slot - c.offset()))
    }

    /// Stored armor of loadout `index`.
    pub fn loadout_armor(index: u8) -> Option<SlotCategory> {
        match index {
            0 => Some(Self::Loadout1Armor),
            1 => Some(Self::Loadout2Armor),
            2 => Some(Self::Loadout3Armor),
            _ => None,
        }
    }

    /// Stored dyes of loadout `index`.
    pub fn loadout_dye(index: u8) -> Option<SlotCategory> {
        match index {
            0 => Some(Self::Loadout1Dye),
            1 => Some(Self::Loadout2Dye),
            2 => Some(Self::Loadout3Dye),
            _ => None,
        }
    }

    /// Categories the player is wearing.
    pub const WORN: [SlotCategory; 4] = [
        SlotCategory::Armor,
        SlotCategory::Dye,
        SlotCategory::MiscEquip,
        SlotCategory::MiscDye,
    ];
}

/// A player's slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<Item>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            slots: vec![Item::EMPTY; TOTAL_SLOTS],
        }
    }
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a flat character record. Returns `None` on a slot count
    /// mismatch.
    pub fn from_flat(slots: Vec<Item>) -> Option<Self> {
        (slots.len() == TOTAL_SLOTS).then_some(Self { slots })
    }

    pub fn as_flat(&self) -> &[Item] {
        &self.slots
    }

    pub fn get(&self, slot: usize) -> Option<Item> {
        self.slots.get(slot).copied()
    }

    /// Store an item; `false` when the slot does not exist.
    pub fn set(&mut self, slot: usize, item: Item) -> bool {
        match self.slots.get_mut(slot) {
            Some(s) => {
                *s = item;
                true
            }
            None => false,
        }
    }

    pub fn category(&self, category: SlotCategory) -> &[Item] {
        &self.slots[category.range()]
    }

    pub fn category_mut(&mut self, category: SlotCategory) -> &mut [Item] {
        &mut self.slots[category.range()]
    }

    /// The item in hotbar/inventory slot `selected`.
    pub fn selected(&self, selected: u8) -> Item {
        self.category(SlotCategory::Inventory)
            .get(usize::from(selected))
            .copied()
            .unwrap_or(Item::EMPTY)
    }

    /// Non-empty worn items with their flat slot.
    pub fn worn(&self) -> impl Iterator<Item = (usize, Item)> + '_ {
        SlotCategory::WORN.into_iter().flat_map(move |c| {
            self.category(c)
                .iter()
                .enumerate()
                .filter(|(_, item)| !item.is_empty())
                .map(move |(i, item)| (c.offset() + i, *item))
        })
    }

    fn swap_categories(&mut self, a: SlotCategory, b: SlotCategory) {
        let (ra, rb) = (a.range(), b.range());
        let (lo, hi) = if ra.start < rb.start { (ra, rb) } else { (rb, ra) };
        let (left, right) = self.slots.split_at_mut(hi.start);
        left[lo].swap_with_slice(&mut right[..hi.len()]);
    }

    /// Rotate equipment from loadout `from` to loadout `to`.
    ///
    /// The live armor and dyes are parked in `from`'s storage and `to`'s
    /// storage becomes live. Returns `false` for out-of-range indices or when
    /// `from == to`, leaving the inventory untouched.
    pub fn switch_loadout(&mut self, from: u8, to: u8) -> bool {
        if from == to || from >= LOADOUT_COUNT || to >= LOADOUT_COUNT {
            return false;
        }
        let pairs = [
            (SlotCategory::loadout_armor(from), SlotCategory::loadout_armor(to), SlotCategory::Armor),
            (SlotCategory::loadout_dye(from), SlotCategory::loadout_dye(to), SlotCategory::Dye),
        ];
        for (current, target, live) in pairs {
            let (Some(current), Some(target)) = (current, target) else {
                return false;
            };
            self.swap_categories(current, live);
            self.swap_categories(target, live);
        }
        true
    }
}
