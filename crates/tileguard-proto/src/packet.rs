//! Outbound (server to client) packets.

use crate::item::Item;
use crate::message::{PlayerUpdate, SpawnPlayer};
use crate::tile::Tile;
use serde::{Deserialize, Serialize};

/// RGB colour for server text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const INFO: Color = Color(255, 255, 0);
    pub const ERROR: Color = Color(255, 0, 0);
    pub const SUCCESS: Color = Color(0, 128, 0);
}

/// A server-to-client packet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Packet {
    /// Terminates the connection with a reason shown to the player.
    Disconnect { reason: String },
    /// Asks the client for the connection password.
    PasswordChallenge,
    /// World metadata; receiving it lets the client finish joining.
    WorldInfo {
        name: String,
        width: i32,
        height: i32,
        spawn_x: i32,
        spawn_y: i32,
    },
    /// Authoritative content of one player inventory slot.
    SlotSync { player: u8, slot: i16, item: Item },
    /// Health and mana.
    PlayerStats {
        player: u8,
        health: i16,
        max_health: i16,
        mana: i16,
        max_mana: i16,
    },
    /// Text line from the server.
    ServerMessage { text: String, color: Color },
    /// Chat line relayed from a player.
    Chat { player: u8, text: String },
    /// Rectangular tile region, row-major.
    TileSquare {
        x: i32,
        y: i32,
        width: u16,
        height: u16,
        tiles: Vec<Tile>,
    },
    PaintTile { x: i32, y: i32, color: u8 },
    PaintWall { x: i32, y: i32, color: u8 },
    SignText {
        sign: i16,
        x: i32,
        y: i32,
        text: String,
    },
    ChestSlot { chest: i16, slot: u8, item: Item },
    /// Moves a player to a pixel position.
    Teleport { player: u8, x: f32, y: f32 },
    PlayerSpawn(SpawnPlayer),
    PlayerUpdate(PlayerUpdate),
    PlayerDeath { player: u8, pvp: bool },
    SelectedSlot { player: u8, slot: u8 },
    AddBuff { player: u8, buff: u16, ticks: i32 },
    NewProjectile {
        ident: i16,
        owner: u8,
        kind: i16,
        x: f32,
        y: f32,
    },
    KillProjectile { ident: i16, owner: u8 },
    /// Forces an NPC resync after a rejected strike.
    NpcUpdate { npc: i16 },
    NpcStrike { npc: i16, damage: i16 },
    NpcTalk { player: u8, npc: i16 },
    HealOther { target: u8, amount: i16 },
    LoadoutSwitched { player: u8, index: u8 },
    DoorToggled { x: i32, y: i32, open: bool },
}

impl Packet {
    /// Plain informational server text.
    pub fn info(text: impl Into<String>) -> Self {
        Packet::ServerMessage {
            text: text.into(),
            color: Color::INFO,
        }
    }

    /// Error server text.
    pub fn error(text: impl Into<String>) -> Self {
        Packet::ServerMessage {
            text: text.into(),
            color: Color::ERROR,
        }
    }

    /// A single-tile square.
    pub fn tile(x: i32, y: i32, tile: Tile) -> Self {
        Packet::TileSquare {
            x,
            y,
            width: 1,
            height: 1,
            tiles: vec![tile],
        }
    }
}
