//! World tiles.

use serde::{Deserialize, Serialize};

/// Liquid occupying a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LiquidKind {
    #[default]
    Water,
    Lava,
    Honey,
    Shimmer,
}

impl LiquidKind {
    /// Decode the wire discriminant.
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Water),
            1 => Some(Self::Lava),
            2 => Some(Self::Honey),
            3 => Some(Self::Shimmer),
            _ => None,
        }
    }
}

/// One cell of the world grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tile {
    /// Foreground block type, `None` when the cell is empty.
    pub block: Option<u16>,
    /// Background wall type, `0` for no wall.
    pub wall: u16,
    /// Liquid amount (0..=255).
    pub liquid: u8,
    /// Liquid type when `liquid > 0`.
    pub liquid_kind: LiquidKind,
    /// Paint colour on the block.
    pub paint: u8,
    /// Paint colour on the wall.
    pub wall_paint: u8,
    /// Whether an actuator is wired into the cell.
    pub actuator: bool,
    /// Door state for door blocks.
    pub open: bool,
}

impl Tile {
    /// A solid block of the given type.
    pub fn block(kind: u16) -> Self {
        Self {
            block: Some(kind),
            ..Self::default()
        }
    }
}
