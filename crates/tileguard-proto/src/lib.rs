//! # tileguard-proto
//!
//! Typed protocol values shared by the tileguard bouncer and its hosts.
//!
//! The wire decoder is not part of this crate: hosts decode raw frames into a
//! [`Payload`] and hand it to the bouncer, and encode the [`Packet`]s the
//! bouncer emits. Everything here is plain data.
//!
//! - [`message`]: inbound message kinds and their payloads
//! - [`packet`]: outbound server packets
//! - [`item`]: item stacks and the names the ban list matches on
//! - [`tile`]: world tiles and liquids

#![deny(clippy::all)]

pub mod item;
pub mod message;
pub mod packet;
pub mod tile;

pub use item::{Item, ItemId};
pub use message::{MessageKind, Payload};
pub use packet::Packet;
pub use tile::{LiquidKind, Tile};

/// Upper bound on player slots per world.
pub const MAX_PLAYERS: usize = 255;

/// Number of NPC slots in a world.
pub const MAX_NPCS: usize = 200;

/// Number of projectile identities a single owner may use.
pub const MAX_PROJECTILES: usize = 1000;

/// Pixels per tile edge.
pub const TILE_SIZE: f32 = 16.0;

/// Number of equipment loadouts a player can switch between.
pub const LOADOUT_COUNT: u8 = 3;
