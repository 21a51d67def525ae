//! World grid and the containers placed in it.

use crate::config::WorldConfig;
use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tileguard_proto::{Item, Tile};

/// Slots per chest.
pub const CHEST_SLOTS: usize = 40;

/// Longest sign text accepted.
pub const MAX_SIGN_TEXT: usize = 1200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chest {
    pub x: i32,
    pub y: i32,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sign {
    pub x: i32,
    pub y: i32,
    pub text: String,
}

/// Tiles, chests and signs of one instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub name: String,
    width: i32,
    height: i32,
    spawn: (i32, i32),
    tiles: Vec<Tile>,
    chests: BTreeMap<i16, Chest>,
    signs: BTreeMap<i16, Sign>,
}

impl World {
    pub fn new(config: &WorldConfig) -> Self {
        let width = config.width.max(1);
        let height = config.height.max(1);
        Self {
            name: config.name.clone(),
            width,
            height,
            spawn: config.spawn(),
            tiles: vec![Tile::default(); (width as usize) * (height as usize)],
            chests: BTreeMap::new(),
            signs: BTreeMap::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Spawn tile.
    pub fn spawn(&self) -> (i32, i32) {
        self.spawn
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        (0..self.width).contains(&x) && (0..self.height).contains(&y)
    }

    /// Whether a pixel position lies inside the world.
    pub fn pixel_in_bounds(&self, x: f32, y: f32) -> bool {
        let size = tileguard_proto::TILE_SIZE;
        x.is_finite()
            && y.is_finite()
            && x >= 0.0
            && y >= 0.0
            && x < self.width as f32 * size
            && y < self.height as f32 * size
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| (y as usize) * (self.width as usize) + (x as usize))
    }

    pub fn tile(&self, x: i32, y: i32) -> Option<Tile> {
        self.index(x, y).map(|i| self.tiles[i])
    }

    pub fn tile_mut(&mut self, x: i32, y: i32) -> Option<&mut Tile> {
        let i = self.index(x, y)?;
        self.tiles.get_mut(i)
    }

    /// Overwrite a tile. Returns `false` outside the world.
    pub fn set_tile(&mut self, x: i32, y: i32, tile: Tile) -> bool {
        match self.tile_mut(x, y) {
            Some(t) => {
                *t = tile;
                true
            }
            None => false,
        }
    }

    /// Whether (x, y) lies within `radius` tiles of the spawn.
    pub fn in_spawn_protection(&self, x: i32, y: i32, radius: i32) -> bool {
        radius > 0 && (x - self.spawn.0).abs() <= radius && (y - self.spawn.1).abs() <= radius
    }

    /// Place an empty chest, returning its id.
    pub fn add_chest(&mut self, x: i32, y: i32) -> i16 {
        let id = self
            .chests
            .keys()
            .next_back()
            .map_or(0, |last| last.saturating_add(1));
        self.chests.insert(
            id,
            Chest {
                x,
                y,
                items: vec![Item::EMPTY; CHEST_SLOTS],
            },
        );
        id
    }

    pub fn chest(&self, id: i16) -> Option<&Chest> {
        self.chests.get(&id)
    }

    pub fn chest_mut(&mut self, id: i16) -> Option<&mut Chest> {
        self.chests.get_mut(&id)
    }

    pub fn chest_at(&self, x: i32, y: i32) -> Option<i16> {
        self.chests
            .iter()
            .find(|(_, c)| c.x == x && c.y == y)
            .map(|(&id, _)| id)
    }

    pub fn add_sign(&mut self, x: i32, y: i32, text: impl Into<String>) -> i16 {
        let id = self
            .signs
            .keys()
            .next_back()
            .map_or(0, |last| last.saturating_add(1));
        self.signs.insert(
            id,
            Sign {
                x,
                y,
                text: text.into(),
            },
        );
        id
    }

    pub fn sign(&self, id: i16) -> Option<&Sign> {
        self.signs.get(&id)
    }

    pub fn sign_mut(&mut self, id: i16) -> Option<&mut Sign> {
        self.signs.get_mut(&id)
    }

    /// Serialize the whole world for a save file.
    pub fn snapshot(&self) -> Result<Vec<u8>, StoreError> {
        Ok(rmp_serde::to_vec(self)?)
    }

    pub fn from_snapshot(bytes: &[u8]) -> Result<Self, StoreError> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> World {
        World::new(&WorldConfig {
            name: "test".into(),
            width: 50,
            height: 40,
            spawn_x: Some(25),
            spawn_y: Some(10),
        })
    }

    #[test]
    fn bounds_and_tiles() {
        let mut world = small();
        assert!(world.in_bounds(0, 0));
        assert!(world.in_bounds(49, 39));
        assert!(!world.in_bounds(50, 0));
        assert!(!world.in_bounds(-1, 5));
        assert!(world.set_tile(3, 4, Tile::block(1)));
        assert_eq!(world.tile(3, 4), Some(Tile::block(1)));
        assert!(!world.set_tile(100, 4, Tile::block(1)));
        assert!(world.tile(100, 4).is_none());
    }

    #[test]
    fn pixel_bounds_reject_nan() {
        let world = small();
        assert!(world.pixel_in_bounds(10.0, 10.0));
        assert!(!world.pixel_in_bounds(f32::NAN, 10.0));
        assert!(!world.pixel_in_bounds(50.0 * 16.0, 10.0));
    }

    #[test]
    fn spawn_protection_box() {
        let world = small();
        assert!(world.in_spawn_protection(30, 12, 10));
        assert!(!world.in_spawn_protection(40, 12, 10));
        assert!(!world.in_spawn_protection(25, 10, 0));
    }

    #[test]
    fn chests_and_signs() {
        let mut world = small();
        let a = world.add_chest(5, 5);
        let b = world.add_chest(8, 5);
        assert_ne!(a, b);
        assert_eq!(world.chest_at(8, 5), Some(b));
        assert_eq!(world.chest(a).unwrap().items.len(), CHEST_SLOTS);
        let s = world.add_sign(1, 1, "hello");
        assert_eq!(world.sign(s).unwrap().text, "hello");
    }

    #[test]
    fn snapshot_restores_world() {
        let mut world = small();
        world.set_tile(1, 2, Tile::block(7));
        world.add_chest(1, 1);
        let bytes = world.snapshot().unwrap();
        assert_eq!(World::from_snapshot(&bytes).unwrap(), world);
    }
}
