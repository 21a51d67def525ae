//! Group permissions.
//!
//! Every session belongs to one group. Groups inherit from an optional parent
//! and grant permission names; `*` grants everything and a trailing `.*`
//! grants a whole namespace (`ignore.*`).

use crate::config::GroupConfig;
use crate::state::{Category, Session};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Permission names checked by the validators.
pub mod perms {
    pub const MODIFY_WORLD: &str = "world.modify";
    pub const EDIT_SPAWN: &str = "world.editspawn";
    pub const PAINT: &str = "world.paint";
    pub const OPEN_CHEST: &str = "world.chest.open";
    pub const EDIT_SIGN: &str = "world.sign.edit";
    pub const SUMMON_BOSS: &str = "npc.summonboss";
    pub const START_INVASION: &str = "npc.startinvasion";
    pub const SUMMON_PET: &str = "npc.summonpet";
    pub const WORLD_UPGRADES: &str = "world.upgrades";
    pub const ROD: &str = "tp.rod";
    pub const WORMHOLE: &str = "tp.wormhole";
    pub const USE_BANNED: &str = "item.usebanned";
    pub const IGNORE_TILE_KILL: &str = "ignore.tile_kill";
    pub const IGNORE_TILE_PLACE: &str = "ignore.tile_place";
    pub const IGNORE_TILE_LIQUID: &str = "ignore.tile_liquid";
    pub const IGNORE_PROJECTILE: &str = "ignore.projectile";
    pub const IGNORE_PAINT: &str = "ignore.paint";
    pub const IGNORE_HEAL_OTHER: &str = "ignore.heal_other";
}

/// Permission that exempts a session from a threshold category.
pub const fn ignore_permission(category: Category) -> &'static str {
    match category {
        Category::TileKill => perms::IGNORE_TILE_KILL,
        Category::TilePlace => perms::IGNORE_TILE_PLACE,
        Category::TileLiquid => perms::IGNORE_TILE_LIQUID,
        Category::Projectile => perms::IGNORE_PROJECTILE,
        Category::Paint => perms::IGNORE_PAINT,
        Category::HealOther => perms::IGNORE_HEAL_OTHER,
    }
}

/// Answers permission questions about a session.
pub trait PermissionResolver: Send + Sync {
    fn has_permission(&self, session: &Session, permission: &str) -> bool;
}

#[derive(Debug, Clone, Default)]
struct Group {
    parent: Option<String>,
    permissions: Vec<String>,
}

/// Groups shared by every instance.
#[derive(Debug, Default)]
pub struct GroupTable {
    groups: RwLock<HashMap<String, Group>>,
}

/// Inheritance chains longer than this are treated as cycles.
const MAX_DEPTH: usize = 16;

fn grants(granted: &str, requested: &str) -> bool {
    if granted == "*" || granted == requested {
        return true;
    }
    granted
        .strip_suffix('*')
        .is_some_and(|prefix| prefix.ends_with('.') && requested.starts_with(prefix))
}

impl GroupTable {
    /// Built-in `guest` and `default` groups.
    pub fn with_defaults() -> Self {
        let table = Self::default();
        table.set(
            "guest",
            None,
            [
                perms::MODIFY_WORLD,
                perms::PAINT,
                perms::OPEN_CHEST,
                perms::EDIT_SIGN,
                perms::SUMMON_PET,
                perms::WORMHOLE,
            ],
        );
        table.set(
            "default",
            Some("guest"),
            [
                perms::SUMMON_BOSS,
                perms::START_INVASION,
                perms::WORLD_UPGRADES,
                perms::ROD,
            ],
        );
        table
    }

    /// Defaults overlaid with configured groups.
    pub fn from_config(groups: &[GroupConfig]) -> Self {
        let table = Self::with_defaults();
        for g in groups {
            table.set(&g.name, g.parent.as_deref(), g.permissions.iter().map(String::as_str));
        }
        table
    }

    /// Create or replace a group.
    pub fn set<'a>(
        &self,
        name: &str,
        parent: Option<&str>,
        permissions: impl IntoIterator<Item = &'a str>,
    ) {
        self.groups.write().insert(
            name.to_string(),
            Group {
                parent: parent.map(str::to_string),
                permissions: permissions.into_iter().map(str::to_string).collect(),
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.groups.read().contains_key(name)
    }

    /// Whether `group` (or an ancestor) grants `permission`.
    pub fn group_has(&self, group: &str, permission: &str) -> bool {
        let groups = self.groups.read();
        let mut current = Some(group);
        for _ in 0..MAX_DEPTH {
            let Some(name) = current else {
                return false;
            };
            let Some(g) = groups.get(name) else {
                return false;
            };
            if g.permissions.iter().any(|p| grants(p, permission)) {
                return true;
            }
            current = g.parent.as_deref();
        }
        tracing::warn!(group, "permission inheritance too deep, assuming cycle");
        false
    }
}

impl PermissionResolver for GroupTable {
    fn has_permission(&self, session: &Session, permission: &str) -> bool {
        self.group_has(&session.group, permission)
    }
}
