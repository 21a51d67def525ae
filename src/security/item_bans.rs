//! Banned item list.

use super::permissions::{PermissionResolver, perms};
use crate::config::ItemBanConfig;
use crate::state::Session;
use dashmap::DashMap;
use std::sync::Arc;

/// Decides whether a named item is banned for a session.
pub trait BanPredicate: Send + Sync {
    fn is_banned(&self, item_name: &str, session: &Session) -> bool;
}

#[derive(Debug, Clone)]
struct ItemBan {
    allowed_groups: Vec<String>,
}

/// Item bans shared by every instance, keyed by lowercased item name.
pub struct ItemBanList {
    bans: DashMap<String, ItemBan>,
    permissions: Arc<dyn PermissionResolver>,
}

impl ItemBanList {
    pub fn new(permissions: Arc<dyn PermissionResolver>) -> Self {
        Self {
            bans: DashMap::new(),
            permissions,
        }
    }

    pub fn from_config(bans: &[ItemBanConfig], permissions: Arc<dyn PermissionResolver>) -> Self {
        let list = Self::new(permissions);
        for ban in bans {
            list.add(&ban.item, ban.allowed_groups.iter().cloned());
        }
        list
    }

    pub fn add(&self, item: &str, allowed_groups: impl IntoIterator<Item = String>) {
        self.bans.insert(
            item.to_lowercase(),
            ItemBan {
                allowed_groups: allowed_groups.into_iter().collect(),
            },
        );
    }

    pub fn remove(&self, item: &str) -> bool {
        self.bans.remove(&item.to_lowercase()).is_some()
    }

    pub fn len(&self) -> usize {
        self.bans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bans.is_empty()
    }
}

impl BanPredicate for ItemBanList {
    fn is_banned(&self, item_name: &str, session: &Session) -> bool {
        let Some(ban) = self.bans.get(&item_name.to_lowercase()) else {
            return false;
        };
        if ban.allowed_groups.iter().any(|g| g == &session.group) {
            return false;
        }
        !self.permissions.has_permission(session, perms::USE_BANNED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::permissions::GroupTable;
    use std::time::Instant;

    fn list() -> ItemBanList {
        let groups = GroupTable::with_defaults();
        groups.set("trusted", Some("default"), [perms::USE_BANNED]);
        let list = ItemBanList::new(Arc::new(groups));
        list.add("Rod of Discord", ["vip".to_string()]);
        list
    }

    #[test]
    fn banned_unless_allowed() {
        let list = list();
        let mut session = Session::new(0, "default", Instant::now());
        assert!(list.is_banned("rod of discord", &session));
        assert!(!list.is_banned("Dirt Block", &session));

        session.group = "vip".into();
        assert!(!list.is_banned("Rod of Discord", &session));

        session.group = "trusted".into();
        assert!(!list.is_banned("Rod of Discord", &session));
    }

    #[test]
    fn remove_unbans() {
        let list = list();
        assert!(list.remove("ROD OF DISCORD"));
        assert!(list.is_empty());
    }
}
