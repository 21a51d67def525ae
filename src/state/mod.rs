//! State management module.
//!
//! Per-connection sessions, the slot table that owns them, the connection
//! state machine, and the world grid of an instance.

pub mod inventory;
pub mod machine;
pub mod projectiles;
pub mod session;
pub mod table;
pub mod world;

pub use inventory::{Inventory, SlotCategory, TOTAL_SLOTS};
pub use machine::{ConnectionState, Transition};
pub use projectiles::ProjectileLedger;
pub use session::{
    Category, Counters, DisabledFlags, EditKind, HandshakeFlags, PlayerStats, Session, SpawnSync,
    TileLedger,
};
pub use table::SessionTable;
pub use world::World;
