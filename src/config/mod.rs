//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: top-level `Config`, logging, saves and the shared tables
//!   (groups, item bans, accounts)
//! - [`instance`]: per-world settings (`InstanceSettings`) with login, SSC and
//!   threshold sections
//! - [`security`]: range checks, caps, spawn protection and flood limits

mod instance;
mod security;
mod types;

pub use instance::{
    BreachLogging, DifficultyPolicy, InstanceSettings, LoginConfig, SscConfig, ThresholdConfig,
    WorldConfig,
};
pub use security::{RateLimitConfig, SecurityConfig};
pub use types::{
    AccountConfig, Config, ConfigError, GroupConfig, ItemBanConfig, LogFormat, LoggingConfig,
    SavesConfig,
};
