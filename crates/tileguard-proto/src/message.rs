//! Inbound (client to server) messages.
//!
//! Every decoded frame becomes one [`Payload`]. Field types mirror the wire
//! widths, so out-of-range values (negative slots, coordinates outside the
//! world, unknown enum discriminants) survive decoding and are the bouncer's
//! job to reject.

use crate::item::Item;
use crate::tile::LiquidKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message type tag used to key handler chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MessageKind {
    PlayerInfo,
    WorldDataRequest,
    Password,
    SlotSync,
    PlayerUpdate,
    SpawnPlayer,
    PlayerDeath,
    NpcStrike,
    SummonBoss,
    PaintTile,
    PaintWall,
    DoorToggle,
    SignEdit,
    ChestOpen,
    ChestItem,
    LoadoutSwitch,
    Teleport,
    TileEdit,
    LiquidSet,
    NewProjectile,
    KillProjectile,
    HealOther,
    NpcTalk,
    ChatText,
}

impl MessageKind {
    /// Every kind, in declaration order.
    pub const ALL: [MessageKind; 24] = [
        Self::PlayerInfo,
        Self::WorldDataRequest,
        Self::Password,
        Self::SlotSync,
        Self::PlayerUpdate,
        Self::SpawnPlayer,
        Self::PlayerDeath,
        Self::NpcStrike,
        Self::SummonBoss,
        Self::PaintTile,
        Self::PaintWall,
        Self::DoorToggle,
        Self::SignEdit,
        Self::ChestOpen,
        Self::ChestItem,
        Self::LoadoutSwitch,
        Self::Teleport,
        Self::TileEdit,
        Self::LiquidSet,
        Self::NewProjectile,
        Self::KillProjectile,
        Self::HealOther,
        Self::NpcTalk,
        Self::ChatText,
    ];

    /// Stable snake_case label for logs and metrics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlayerInfo => "player_info",
            Self::WorldDataRequest => "world_data_request",
            Self::Password => "password",
            Self::SlotSync => "slot_sync",
            Self::PlayerUpdate => "player_update",
            Self::SpawnPlayer => "spawn_player",
            Self::PlayerDeath => "player_death",
            Self::NpcStrike => "npc_strike",
            Self::SummonBoss => "summon_boss",
            Self::PaintTile => "paint_tile",
            Self::PaintWall => "paint_wall",
            Self::DoorToggle => "door_toggle",
            Self::SignEdit => "sign_edit",
            Self::ChestOpen => "chest_open",
            Self::ChestItem => "chest_item",
            Self::LoadoutSwitch => "loadout_switch",
            Self::Teleport => "teleport",
            Self::TileEdit => "tile_edit",
            Self::LiquidSet => "liquid_set",
            Self::NewProjectile => "new_projectile",
            Self::KillProjectile => "kill_projectile",
            Self::HealOther => "heal_other",
            Self::NpcTalk => "npc_talk",
            Self::ChatText => "chat_text",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Character difficulty mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Softcore,
    Mediumcore,
    Hardcore,
    Journey,
}

/// Player identity and appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub player: u8,
    pub name: String,
    pub difficulty: Difficulty,
    /// Client install fingerprint, used for automatic login.
    pub client_uuid: Option<String>,
}

/// Connection password answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Password {
    pub password: String,
}

/// One inventory slot as reported by the client (flat slot index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSync {
    pub player: u8,
    pub slot: i16,
    pub item: Item,
}

/// Movement and held-item state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerUpdate {
    pub player: u8,
    pub selected_slot: u8,
    /// Position in pixels.
    pub x: f32,
    pub y: f32,
    pub using_item: bool,
}

/// Why the client is (re)spawning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnContext {
    ReviveFromDeath,
    SpawningIntoWorld,
    RecallFromItem,
}

/// Spawn request; spawn coordinates are in tiles, `-1` meaning world spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPlayer {
    pub player: u8,
    pub spawn_x: i16,
    pub spawn_y: i16,
    pub respawn_timer: i32,
    pub deaths_pve: i16,
    pub deaths_pvp: i16,
    pub context: SpawnContext,
}

/// Death notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDeath {
    pub player: u8,
    pub pvp: bool,
}

/// Damage dealt to an NPC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NpcStrike {
    pub npc: i16,
    pub damage: i16,
    pub knockback: f32,
    pub direction: i8,
    pub crit: bool,
}

/// Boss, invasion, pet licence or world upgrade activation.
///
/// Positive codes are NPC types, negative codes are events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummonBoss {
    pub player: u8,
    pub code: i16,
}

/// Paint applied to a block or a wall, depending on the message kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paint {
    pub x: i32,
    pub y: i32,
    pub color: u8,
}

/// Door opened or closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorToggle {
    pub x: i32,
    pub y: i32,
    pub open: bool,
    pub direction: i8,
}

/// Sign text change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignEdit {
    pub sign: i16,
    pub x: i32,
    pub y: i32,
    pub text: String,
}

/// Request to open the chest at a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChestOpen {
    pub x: i32,
    pub y: i32,
}

/// One chest slot as reported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChestItem {
    pub chest: i16,
    pub slot: u8,
    pub item: Item,
}

/// Equipment loadout change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadoutSwitch {
    pub player: u8,
    pub index: u8,
}

/// Teleport flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeleportKind {
    /// Item-driven self teleport (rod, potions).
    PlayerToPosition,
    NpcToPosition,
    /// Wormhole potion jump onto a teammate.
    PlayerToPlayer,
    Unknown(u8),
}

/// Teleport request. Coordinates are pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Teleport {
    pub kind: TeleportKind,
    pub target: i16,
    pub x: f32,
    pub y: f32,
    pub style: u8,
}

/// Tile modification verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileAction {
    KillTile,
    PlaceTile,
    KillWall,
    PlaceWall,
    PlaceActuator,
    KillActuator,
    Unknown(u8),
}

impl TileAction {
    /// Whether the action removes something from the world.
    pub fn is_kill(self) -> bool {
        matches!(self, Self::KillTile | Self::KillWall | Self::KillActuator)
    }

    /// Whether the action adds something to the world.
    pub fn is_place(self) -> bool {
        matches!(self, Self::PlaceTile | Self::PlaceWall | Self::PlaceActuator)
    }
}

/// Tile modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileEdit {
    pub action: TileAction,
    pub x: i32,
    pub y: i32,
    /// Block or wall type for placements.
    pub style: u16,
}

/// Liquid placed or removed at a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidSet {
    pub x: i32,
    pub y: i32,
    pub amount: u8,
    pub kind: LiquidKind,
}

/// Projectile creation. Position in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewProjectile {
    pub ident: i16,
    pub owner: u8,
    pub kind: i16,
    pub damage: i16,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

/// Projectile destruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillProjectile {
    pub ident: i16,
    pub owner: u8,
}

/// Healing another player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealOther {
    pub target: u8,
    pub amount: i16,
}

/// Talking to an NPC; `npc == -1` ends the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcTalk {
    pub player: u8,
    pub npc: i16,
}

/// Chat line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatText {
    pub text: String,
}

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    PlayerInfo(PlayerInfo),
    WorldDataRequest,
    Password(Password),
    SlotSync(SlotSync),
    PlayerUpdate(PlayerUpdate),
    SpawnPlayer(SpawnPlayer),
    PlayerDeath(PlayerDeath),
    NpcStrike(NpcStrike),
    SummonBoss(SummonBoss),
    PaintTile(Paint),
    PaintWall(Paint),
    DoorToggle(DoorToggle),
    SignEdit(SignEdit),
    ChestOpen(ChestOpen),
    ChestItem(ChestItem),
    LoadoutSwitch(LoadoutSwitch),
    Teleport(Teleport),
    TileEdit(TileEdit),
    LiquidSet(LiquidSet),
    NewProjectile(NewProjectile),
    KillProjectile(KillProjectile),
    HealOther(HealOther),
    NpcTalk(NpcTalk),
    ChatText(ChatText),
}

impl Payload {
    /// The message kind tag for this payload.
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::PlayerInfo(_) => MessageKind::PlayerInfo,
            Self::WorldDataRequest => MessageKind::WorldDataRequest,
            Self::Password(_) => MessageKind::Password,
            Self::SlotSync(_) => MessageKind::SlotSync,
            Self::PlayerUpdate(_) => MessageKind::PlayerUpdate,
            Self::SpawnPlayer(_) => MessageKind::SpawnPlayer,
            Self::PlayerDeath(_) => MessageKind::PlayerDeath,
            Self::NpcStrike(_) => MessageKind::NpcStrike,
            Self::SummonBoss(_) => MessageKind::SummonBoss,
            Self::PaintTile(_) => MessageKind::PaintTile,
            Self::PaintWall(_) => MessageKind::PaintWall,
            Self::DoorToggle(_) => MessageKind::DoorToggle,
            Self::SignEdit(_) => MessageKind::SignEdit,
            Self::ChestOpen(_) => MessageKind::ChestOpen,
            Self::ChestItem(_) => MessageKind::ChestItem,
            Self::LoadoutSwitch(_) => MessageKind::LoadoutSwitch,
            Self::Teleport(_) => MessageKind::Teleport,
            Self::TileEdit(_) => MessageKind::TileEdit,
            Self::LiquidSet(_) => MessageKind::LiquidSet,
            Self::NewProjectile(_) => MessageKind::NewProjectile,
            Self::KillProjectile(_) => MessageKind::KillProjectile,
            Self::HealOther(_) => MessageKind::HealOther,
            Self::NpcTalk(_) => MessageKind::NpcTalk,
            Self::ChatText(_) => MessageKind::ChatText,
        }
    }
}
