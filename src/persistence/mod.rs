//! Account and character storage.
//!
//! The bouncer only talks to the [`AccountStore`] and [`CharacterStore`]
//! traits. The in-memory implementations here are process-wide (`DashMap`)
//! and shared by every instance; hosts with a database plug in their own.

pub mod save;

pub use save::{FileWorldSink, SaveQueue, WorldSink};

use crate::config::AccountConfig;
use crate::error::StoreError;
use crate::security::password::hash_password;
use crate::state::{Inventory, PlayerStats};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tileguard_proto::Item;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub name: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub group: String,
    /// Client fingerprints this account has logged in from.
    pub fingerprints: Vec<String>,
}

impl Account {
    pub fn knows_fingerprint(&self, fingerprint: &str) -> bool {
        self.fingerprints.iter().any(|f| f == fingerprint)
    }
}

pub trait AccountStore: Send + Sync {
    /// Look up an account by (case-insensitive) name.
    fn find(&self, name: &str) -> Option<Account>;

    /// Record a successful login, remembering the fingerprint.
    fn record_login(&self, name: &str, fingerprint: Option<&str>) -> Result<(), StoreError>;
}

/// Stored server-side character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    /// Flat slot layout, one entry per inventory slot.
    pub slots: Vec<Item>,
    pub stats: PlayerStats,
    /// Spawn point in tiles, `(-1, -1)` for world spawn.
    pub spawn: (i16, i16),
    pub deaths_pve: i16,
    pub deaths_pvp: i16,
    pub loadout: u8,
}

impl CharacterRecord {
    /// Snapshot of a live inventory.
    pub fn capture(
        inventory: &Inventory,
        stats: PlayerStats,
        spawn: (i16, i16),
        deaths: (i16, i16),
        loadout: u8,
    ) -> Self {
        Self {
            slots: inventory.as_flat().to_vec(),
            stats,
            spawn,
            deaths_pve: deaths.0,
            deaths_pvp: deaths.1,
            loadout,
        }
    }
}

pub trait CharacterStore: Send + Sync {
    fn load(&self, account: &str) -> Result<Option<CharacterRecord>, StoreError>;
    fn save(&self, account: &str, record: CharacterRecord) -> Result<(), StoreError>;
}

/// Accounts held in memory.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: DashMap<String, Account>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from configuration (hashes are taken as-is).
    pub fn from_config(accounts: &[AccountConfig]) -> Self {
        let store = Self::new();
        for a in accounts {
            store.accounts.insert(
                a.name.to_lowercase(),
                Account {
                    name: a.name.clone(),
                    password_hash: a.password_hash.clone(),
                    group: a.group.clone(),
                    fingerprints: a.fingerprints.clone(),
                },
            );
        }
        store
    }

    /// Create an account, hashing the password.
    pub fn register(&self, name: &str, password: &str, group: &str) -> Result<(), StoreError> {
        let key = name.to_lowercase();
        if self.accounts.contains_key(&key) {
            return Err(StoreError::AccountExists(name.to_string()));
        }
        let password_hash = hash_password(password).map_err(|e| StoreError::Hash(e.to_string()))?;
        self.accounts.insert(
            key,
            Account {
                name: name.to_string(),
                password_hash,
                group: group.to_string(),
                fingerprints: Vec::new(),
            },
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl AccountStore for MemoryAccountStore {
    fn find(&self, name: &str) -> Option<Account> {
        self.accounts.get(&name.to_lowercase()).map(|a| a.clone())
    }

    fn record_login(&self, name: &str, fingerprint: Option<&str>) -> Result<(), StoreError> {
        if let (Some(mut account), Some(fp)) =
            (self.accounts.get_mut(&name.to_lowercase()), fingerprint)
            && !account.knows_fingerprint(fp)
        {
            account.fingerprints.push(fp.to_string());
        }
        Ok(())
    }
}

/// Characters held in memory.
#[derive(Debug, Default)]
pub struct MemoryCharacterStore {
    records: DashMap<String, CharacterRecord>,
}

impl MemoryCharacterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CharacterStore for MemoryCharacterStore {
    fn load(&self, account: &str) -> Result<Option<CharacterRecord>, StoreError> {
        Ok(self
            .records
            .get(&account.to_lowercase())
            .map(|r| r.clone()))
    }

    fn save(&self, account: &str, record: CharacterRecord) -> Result<(), StoreError> {
        self.records.insert(account.to_lowercase(), record);
        Ok(())
    }
}
