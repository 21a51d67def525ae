//! Per-world instance settings.

use serde::Deserialize;
use tileguard_proto::message::Difficulty;

use super::security::{RateLimitConfig, SecurityConfig};

/// Settings of one world instance. Handed to handlers as an immutable
/// snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceSettings {
    pub name: String,
    /// Connection slots (default: 16).
    #[serde(default = "default_max_players")]
    pub max_players: u8,
    /// Server password required from clients without an account.
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub login: LoginConfig,
    #[serde(default)]
    pub ssc: SscConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub rate_limits: RateLimitConfig,
    /// Game tick interval in milliseconds (default: 16).
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
    /// Seconds between world autosaves; 0 disables (default: 600).
    #[serde(default = "default_autosave_seconds")]
    pub autosave_seconds: u64,
    /// Announce boss summons with the summoner's name (default: true).
    #[serde(default = "default_true")]
    pub announce_summons: bool,
}

impl InstanceSettings {
    /// Default settings for a named instance.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for InstanceSettings {
    fn default() -> Self {
        Self {
            name: "main".to_string(),
            max_players: default_max_players(),
            password: None,
            world: WorldConfig::default(),
            login: LoginConfig::default(),
            ssc: SscConfig::default(),
            thresholds: ThresholdConfig::default(),
            security: SecurityConfig::default(),
            rate_limits: RateLimitConfig::default(),
            tick_millis: default_tick_millis(),
            autosave_seconds: default_autosave_seconds(),
            announce_summons: true,
        }
    }
}

fn default_max_players() -> u8 {
    16
}

fn default_tick_millis() -> u64 {
    16
}

fn default_autosave_seconds() -> u64 {
    600
}

pub(super) fn default_true() -> bool {
    true
}

/// World dimensions and spawn, in tiles.
#[derive(Debug, Clone, Deserialize)]
pub struct WorldConfig {
    #[serde(default = "default_world_name")]
    pub name: String,
    #[serde(default = "default_world_width")]
    pub width: i32,
    #[serde(default = "default_world_height")]
    pub height: i32,
    /// Spawn tile; defaults to the middle of the surface.
    #[serde(default)]
    pub spawn_x: Option<i32>,
    #[serde(default)]
    pub spawn_y: Option<i32>,
}

impl WorldConfig {
    pub fn spawn(&self) -> (i32, i32) {
        (
            self.spawn_x.unwrap_or(self.width / 2),
            self.spawn_y.unwrap_or(self.height / 4),
        )
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            width: default_world_width(),
            height: default_world_height(),
            spawn_x: None,
            spawn_y: None,
        }
    }
}

fn default_world_name() -> String {
    "World".to_string()
}

fn default_world_width() -> i32 {
    400
}

fn default_world_height() -> i32 {
    200
}

/// Which character difficulties may join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyPolicy {
    #[default]
    Any,
    Softcore,
    Mediumcore,
    Hardcore,
}

impl DifficultyPolicy {
    pub fn allows(self, difficulty: Difficulty) -> bool {
        match self {
            Self::Any => true,
            Self::Softcore => difficulty == Difficulty::Softcore,
            Self::Mediumcore => difficulty == Difficulty::Mediumcore,
            Self::Hardcore => difficulty == Difficulty::Hardcore,
        }
    }
}

/// Handshake and login policy.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginConfig {
    /// Log known accounts in by client fingerprint (default: true).
    #[serde(default = "default_true")]
    pub fingerprint_login: bool,
    #[serde(default)]
    pub difficulty: DifficultyPolicy,
    /// Character names may not start with these (case-insensitive).
    #[serde(default = "default_reserved_prefixes")]
    pub reserved_prefixes: Vec<String>,
    /// Longest accepted character name (default: 20).
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
    /// Group of sessions without an account (default: "guest").
    #[serde(default = "default_guest_group")]
    pub guest_group: String,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            fingerprint_login: true,
            difficulty: DifficultyPolicy::default(),
            reserved_prefixes: default_reserved_prefixes(),
            max_name_length: default_max_name_length(),
            guest_group: default_guest_group(),
        }
    }
}

fn default_reserved_prefixes() -> Vec<String> {
    vec!["server".to_string()]
}

fn default_max_name_length() -> usize {
    20
}

fn default_guest_group() -> String {
    "guest".to_string()
}

/// Server-side characters.
#[derive(Debug, Clone, Deserialize)]
pub struct SscConfig {
    /// Keep inventories on the server (default: false).
    #[serde(default)]
    pub enabled: bool,
    /// Save the character when an authenticated player leaves (default: true).
    #[serde(default = "default_true")]
    pub save_on_disconnect: bool,
    /// Milliseconds after a restore during which client slot syncs are
    /// answered with the server copy (default: 2000).
    #[serde(default = "default_authoritative_slot_millis")]
    pub authoritative_slot_millis: u64,
}

impl Default for SscConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            save_on_disconnect: true,
            authoritative_slot_millis: default_authoritative_slot_millis(),
        }
    }
}

fn default_authoritative_slot_millis() -> u64 {
    2000
}

/// How breaches are logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BreachLogging {
    /// Informational console output only.
    Console,
    /// Warning level, picked up by log shipping.
    #[default]
    LogAndConsole,
}

/// Per-second action limits.
#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_tile_kill")]
    pub tile_kill: u32,
    #[serde(default = "default_tile_place")]
    pub tile_place: u32,
    #[serde(default = "default_tile_liquid")]
    pub tile_liquid: u32,
    #[serde(default = "default_projectile")]
    pub projectile: u32,
    #[serde(default = "default_paint")]
    pub paint: u32,
    #[serde(default = "default_heal_other")]
    pub heal_other: u32,
    /// Seconds a threshold disable lasts after the last breach (default: 5).
    #[serde(default = "default_disable_seconds")]
    pub disable_seconds: u64,
    #[serde(default)]
    pub logging: BreachLogging,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            tile_kill: default_tile_kill(),
            tile_place: default_tile_place(),
            tile_liquid: default_tile_liquid(),
            projectile: default_projectile(),
            paint: default_paint(),
            heal_other: default_heal_other(),
            disable_seconds: default_disable_seconds(),
            logging: BreachLogging::default(),
        }
    }
}

fn default_tile_kill() -> u32 {
    60
}

fn default_tile_place() -> u32 {
    32
}

fn default_tile_liquid() -> u32 {
    50
}

fn default_projectile() -> u32 {
    50
}

fn default_paint() -> u32 {
    15
}

fn default_heal_other() -> u32 {
    50
}

fn default_disable_seconds() -> u64 {
    5
}
