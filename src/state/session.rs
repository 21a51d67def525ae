//! Per-connection session state.
//!
//! A `Session` is created when a connection is assigned a slot and dropped on
//! disconnect. Slot reuse always builds a new one, so nothing leaks between
//! players sharing a slot index.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};
use tileguard_proto::Tile;
use tileguard_proto::message::Difficulty;

use super::inventory::Inventory;
use super::machine::{ConnectionState, Transition};
use super::projectiles::ProjectileLedger;
use crate::error::TransitionError;

/// Actions counted against the per-second thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    TileKill,
    TilePlace,
    TileLiquid,
    Projectile,
    Paint,
    HealOther,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::TileKill,
        Category::TilePlace,
        Category::TileLiquid,
        Category::Projectile,
        Category::Paint,
        Category::HealOther,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TileKill => "tile_kill",
            Self::TilePlace => "tile_place",
            Self::TileLiquid => "tile_liquid",
            Self::Projectile => "projectile",
            Self::Paint => "paint",
            Self::HealOther => "heal_other",
        }
    }

    /// Human readable form used in player notices.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::TileKill => "tile kill",
            Self::TilePlace => "tile place",
            Self::TileLiquid => "liquid",
            Self::Projectile => "projectile",
            Self::Paint => "paint",
            Self::HealOther => "heal other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-window action counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters([u32; Category::ALL.len()]);

impl Counters {
    pub fn get(&self, category: Category) -> u32 {
        self.0[category as usize]
    }

    pub fn increment(&mut self, category: Category) {
        let c = &mut self.0[category as usize];
        *c = c.saturating_add(1);
    }

    pub fn reset(&mut self) {
        self.0 = [0; Category::ALL.len()];
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&c| c == 0)
    }
}

/// Why a session is currently blocked from acting on the world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisabledFlags(u16);

impl DisabledFlags {
    /// Wearing a banned item. Cleared by the banned-content sweep only.
    pub const BANNED_WEARABLE: DisabledFlags = DisabledFlags(1 << 15);

    /// Flag set when `category` breaches its threshold.
    pub const fn threshold(category: Category) -> Self {
        DisabledFlags(1 << category as u16)
    }

    const THRESHOLD_MASK: u16 = (1 << Category::ALL.len()) - 1;

    pub fn insert(&mut self, flag: DisabledFlags) {
        self.0 |= flag.0;
    }

    pub fn remove(&mut self, flag: DisabledFlags) {
        self.0 &= !flag.0;
    }

    pub fn contains(&self, flag: DisabledFlags) -> bool {
        self.0 & flag.0 == flag.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn has_threshold(&self) -> bool {
        self.0 & Self::THRESHOLD_MASK != 0
    }

    /// Drop every threshold flag, keeping the banned-wearable flag.
    pub fn clear_thresholds(&mut self) {
        self.0 &= !Self::THRESHOLD_MASK;
    }
}

/// Handshake progress flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandshakeFlags {
    pub received_info: bool,
    /// First spawn into the world has happened.
    pub finished_handshake: bool,
    pub requires_password: bool,
}

/// Which side of a tile edit the ledger entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Destroyed,
    Created,
}

/// Pre-edit tiles of the edits made in the current window.
#[derive(Debug, Clone, Default)]
pub struct TileLedger {
    destroyed: HashMap<(i32, i32), Tile>,
    created: HashMap<(i32, i32), Tile>,
}

impl TileLedger {
    /// Remember the tile as it was before the first edit this window.
    pub fn record(&mut self, kind: EditKind, x: i32, y: i32, original: Tile) {
        self.side_mut(kind).entry((x, y)).or_insert(original);
    }

    /// Remove and return every entry of one side.
    pub fn take(&mut self, kind: EditKind) -> Vec<((i32, i32), Tile)> {
        self.side_mut(kind).drain().collect()
    }

    pub fn len(&self, kind: EditKind) -> usize {
        match kind {
            EditKind::Destroyed => self.destroyed.len(),
            EditKind::Created => self.created.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.destroyed.is_empty() && self.created.is_empty()
    }

    pub fn clear(&mut self) {
        self.destroyed.clear();
        self.created.clear();
    }

    fn side_mut(&mut self, kind: EditKind) -> &mut HashMap<(i32, i32), Tile> {
        match kind {
            EditKind::Destroyed => &mut self.destroyed,
            EditKind::Created => &mut self.created,
        }
    }
}

/// Spawn-point reconciliation progress (server-side characters).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpawnSync {
    /// No spawn request seen yet.
    #[default]
    Unseen,
    /// First request seen; both spawns remembered.
    Cached {
        server: (i16, i16),
        client: (i16, i16),
    },
    /// Client spawn accepted for the rest of the session.
    Synced,
}

/// Health and mana.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PlayerStats {
    pub health: i16,
    pub max_health: i16,
    pub mana: i16,
    pub max_mana: i16,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            health: 100,
            max_health: 100,
            mana: 20,
            max_mana: 20,
        }
    }
}

/// Per-connection state.
#[derive(Debug)]
pub struct Session {
    pub conn: u8,
    state: ConnectionState,
    pub connected_at: Instant,
    pub name: String,
    pub difficulty: Difficulty,
    /// Client fingerprint from `PlayerInfo`.
    pub fingerprint: Option<String>,
    /// Account name once authenticated.
    pub account: Option<String>,
    pub group: String,
    pub handshake: HandshakeFlags,
    pub counters: Counters,
    pub disabled: DisabledFlags,
    pub ledger: TileLedger,
    pub last_threat: Option<Instant>,
    /// Selected item was banned at the last sweep.
    pub held_item_banned: bool,
    /// Client slot syncs before this instant get the server copy back.
    pub authoritative_until: Option<Instant>,
    /// Pixel position.
    pub position: (f32, f32),
    pub selected_slot: u8,
    pub inventory: Inventory,
    pub loadout: u8,
    pub stats: PlayerStats,
    pub dead: bool,
    /// Seconds until the player may respawn.
    pub respawn_timer: i32,
    pub deaths_pve: i16,
    pub deaths_pvp: i16,
    pub spawn_sync: SpawnSync,
    /// Spawn point from the character store, in tiles.
    pub stored_spawn: (i16, i16),
    /// NPC the player is talking to, -1 for none.
    pub talk_npc: i16,
    pub projectiles: ProjectileLedger,
}

impl Session {
    pub fn new(conn: u8, group: impl Into<String>, now: Instant) -> Self {
        Self {
            conn,
            state: ConnectionState::AssigningSlot,
            connected_at: now,
            name: String::new(),
            difficulty: Difficulty::default(),
            fingerprint: None,
            account: None,
            group: group.into(),
            handshake: HandshakeFlags::default(),
            counters: Counters::default(),
            disabled: DisabledFlags::default(),
            ledger: TileLedger::default(),
            last_threat: None,
            held_item_banned: false,
            authoritative_until: None,
            position: (0.0, 0.0),
            selected_slot: 0,
            inventory: Inventory::new(),
            loadout: 0,
            stats: PlayerStats::default(),
            dead: false,
            respawn_timer: 0,
            deaths_pve: 0,
            deaths_pvp: 0,
            spawn_sync: SpawnSync::default(),
            stored_spawn: (-1, -1),
            talk_npc: -1,
            projectiles: ProjectileLedger::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Move the connection forward.
    pub fn advance(&mut self, transition: Transition) -> Result<ConnectionState, TransitionError> {
        self.state = self.state.advance(transition)?;
        Ok(self.state)
    }

    /// Mark the session for teardown. Idempotent.
    pub fn mark_disconnected(&mut self) {
        if let Ok(next) = self.state.advance(Transition::Disconnect) {
            self.state = next;
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.account.is_some()
    }

    /// Blocked from world-affecting actions.
    pub fn is_disabled(&self) -> bool {
        !self.disabled.is_empty()
    }

    /// Within the post-breach throttle window.
    pub fn is_throttled(&self, now: Instant, window: Duration) -> bool {
        self.last_threat
            .is_some_and(|t| now.saturating_duration_since(t) < window)
    }

    /// Client slot syncs are currently overridden by the server copy.
    pub fn slots_authoritative(&self, now: Instant) -> bool {
        self.authoritative_until.is_some_and(|until| now < until)
    }

    /// Tile position derived from the pixel position.
    pub fn tile_position(&self) -> (i32, i32) {
        let size = tileguard_proto::TILE_SIZE;
        (
            (self.position.0 / size) as i32,
            (self.position.1 / size) as i32,
        )
    }

    /// Whether tile (x, y) is within `range` tiles of the player.
    pub fn in_range(&self, x: i32, y: i32, range: i32) -> bool {
        let (px, py) = self.tile_position();
        (px - x).abs() <= range && (py - y).abs() <= range
    }

    /// Display name for logs before the handshake sets one.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            "<unnamed>"
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment_and_reset() {
        let mut c = Counters::default();
        c.increment(Category::Paint);
        c.increment(Category::Paint);
        c.increment(Category::TileKill);
        assert_eq!(c.get(Category::Paint), 2);
        assert_eq!(c.get(Category::TileKill), 1);
        assert!(!c.is_zero());
        c.reset();
        assert!(c.is_zero());
    }

    #[test]
    fn disabled_flags() {
        let mut f = DisabledFlags::default();
        assert!(f.is_empty());
        f.insert(DisabledFlags::threshold(Category::Paint));
        f.insert(DisabledFlags::BANNED_WEARABLE);
        assert!(f.contains(DisabledFlags::threshold(Category::Paint)));
        assert!(!f.contains(DisabledFlags::threshold(Category::TileKill)));
        assert!(f.has_threshold());

        f.clear_thresholds();
        assert!(!f.has_threshold());
        assert!(f.contains(DisabledFlags::BANNED_WEARABLE));
        f.remove(DisabledFlags::BANNED_WEARABLE);
        assert!(f.is_empty());
    }

    #[test]
    fn ledger_keeps_first_original() {
        let mut ledger = TileLedger::default();
        ledger.record(EditKind::Destroyed, 1, 1, Tile::block(1));
        ledger.record(EditKind::Destroyed, 1, 1, Tile::default());
        let taken = ledger.take(EditKind::Destroyed);
        assert_eq!(taken, vec![((1, 1), Tile::block(1))]);
        assert!(ledger.is_empty());
    }

    #[test]
    fn session_lifecycle() {
        let mut s = Session::new(4, "guest", Instant::now());
        assert_eq!(s.state(), ConnectionState::AssigningSlot);
        s.advance(Transition::InfoAccepted).unwrap();
        assert!(s.advance(Transition::LoginCompleted).is_err());
        assert_eq!(s.state(), ConnectionState::AwaitingPlayerInfo);
        s.mark_disconnected();
        s.mark_disconnected();
        assert!(s.state().is_disconnected());
    }

    #[test]
    fn range_and_throttle() {
        let now = Instant::now();
        let mut s = Session::new(0, "guest", now);
        s.position = (160.0, 320.0);
        assert_eq!(s.tile_position(), (10, 20));
        assert!(s.in_range(15, 25, 5));
        assert!(!s.in_range(16, 20, 5));

        assert!(!s.is_throttled(now, Duration::from_secs(1)));
        s.last_threat = Some(now);
        assert!(s.is_throttled(now + Duration::from_millis(500), Duration::from_secs(1)));
        assert!(!s.is_throttled(now + Duration::from_secs(2), Duration::from_secs(1)));
    }
}
