//! Security module for tileguard.
//!
//! Provides the moderation engines the validators lean on:
//! - **Thresholds**: per-second action counters, disables and edit rollback
//! - **Banned content**: passive worn/held item sweep and reactive checks
//! - **Item bans**: the shared ban list behind [`BanPredicate`]
//! - **Permissions**: group table behind [`PermissionResolver`]
//! - **Rate Limiting**: governor-based inbound flood protection
//! - **Passwords**: Argon2 hashing for accounts
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                          Security Module                            │
//! ├────────────┬──────────────┬────────────┬─────────────┬──────────────┤
//! │ Thresholds │ Banned guard │ Item bans  │ Permissions │ Rate limiter │
//! │ counters   │ taint buffs  │ DashMap    │ RwLock      │ Governor     │
//! │ rollback   │ reactive     │ per group  │ inheritance │ token bucket │
//! └────────────┴──────────────┴────────────┴─────────────┴──────────────┘
//! ```

pub mod banned;
pub mod item_bans;
pub mod password;
pub mod permissions;
pub mod rate_limit;
pub mod threshold;

pub use item_bans::{BanPredicate, ItemBanList};
pub use permissions::{GroupTable, PermissionResolver, perms};
pub use rate_limit::RateLimitManager;
