//! Range checks, caps, spawn protection and flood limits.

use serde::Deserialize;

/// Per-instance anti-abuse tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Tiles around the world spawn only `world.editspawn` may edit
    /// (default: 10; 0 disables).
    #[serde(default = "default_spawn_protection")]
    pub spawn_protection_radius: i32,
    /// Farthest tile, in tiles from the player, that may be edited
    /// (default: 32).
    #[serde(default = "default_build_range")]
    pub build_range: i32,
    /// Farthest door, sign or chest that may be used (default: 12).
    #[serde(default = "default_interact_range")]
    pub interact_range: i32,
    /// Tiles around a live projectile in which out-of-range kills are
    /// accepted (default: 10).
    #[serde(default = "default_explosive_radius")]
    pub explosive_radius: i32,
    /// Milliseconds after a breach during which edits are rejected
    /// (default: 1000).
    #[serde(default = "default_throttle_millis")]
    pub throttle_millis: u64,
    /// Highest accepted NPC strike damage (default: 1175).
    #[serde(default = "default_max_damage")]
    pub max_npc_damage: i16,
    /// Highest accepted projectile damage (default: 1175).
    #[serde(default = "default_max_damage")]
    pub max_projectile_damage: i16,
    /// Highest accepted heal-other amount (default: 200).
    #[serde(default = "default_max_heal")]
    pub max_heal: i16,
    /// Longest accepted chat line in characters (default: 500).
    #[serde(default = "default_max_chat_length")]
    pub max_chat_length: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            spawn_protection_radius: default_spawn_protection(),
            build_range: default_build_range(),
            interact_range: default_interact_range(),
            explosive_radius: default_explosive_radius(),
            throttle_millis: default_throttle_millis(),
            max_npc_damage: default_max_damage(),
            max_projectile_damage: default_max_damage(),
            max_heal: default_max_heal(),
            max_chat_length: default_max_chat_length(),
        }
    }
}

fn default_spawn_protection() -> i32 {
    10
}

fn default_build_range() -> i32 {
    32
}

fn default_interact_range() -> i32 {
    12
}

fn default_explosive_radius() -> i32 {
    10
}

fn default_throttle_millis() -> u64 {
    1000
}

fn default_max_damage() -> i16 {
    1175
}

fn default_max_heal() -> i16 {
    200
}

fn default_max_chat_length() -> usize {
    500
}

/// Inbound flood protection.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Messages allowed per connection per second (default: 300).
    #[serde(default = "default_message_rate")]
    pub message_rate_per_second: u32,
    /// Burst allowed on top of the steady rate (default: 600).
    #[serde(default = "default_message_burst")]
    pub message_burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            message_rate_per_second: default_message_rate(),
            message_burst: default_message_burst(),
        }
    }
}

fn default_message_rate() -> u32 {
    300
}

fn default_message_burst() -> u32 {
    600
}
