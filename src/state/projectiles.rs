//! Recently created projectiles of one session.
//!
//! Appended to by the instance task when a projectile is accepted, and marked
//! killed by the outbound path (which may run on any thread) when a
//! kill-projectile packet goes out. Both sides hold the same `Arc`.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tileguard_proto::TILE_SIZE;

/// How long a projectile stays in the ledger.
pub const PROJECTILE_LIFETIME: Duration = Duration::from_secs(5);

/// One created projectile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileStamp {
    pub ident: i16,
    pub kind: i16,
    /// Last known position in pixels.
    pub x: f32,
    pub y: f32,
    pub created: Instant,
    pub killed: bool,
}

/// Shared, lock-guarded projectile list.
#[derive(Debug, Clone, Default)]
pub struct ProjectileLedger(Arc<Mutex<Vec<ProjectileStamp>>>);

impl ProjectileLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, ident: i16, kind: i16, x: f32, y: f32, now: Instant) {
        let mut list = self.0.lock();
        list.retain(|p| p.ident != ident);
        list.push(ProjectileStamp {
            ident,
            kind,
            x,
            y,
            created: now,
            killed: false,
        });
    }

    /// Mark a projectile as destroyed. Returns whether it was known.
    pub fn mark_killed(&self, ident: i16) -> bool {
        let mut list = self.0.lock();
        match list.iter_mut().find(|p| p.ident == ident) {
            Some(p) => {
                p.killed = true;
                true
            }
            None => false,
        }
    }

    /// Drop killed and expired entries.
    pub fn prune(&self, now: Instant) {
        self.0
            .lock()
            .retain(|p| !p.killed && now.duration_since(p.created) < PROJECTILE_LIFETIME);
    }

    /// Whether a live projectile is within `radius` tiles of tile (x, y).
    pub fn has_live_near(&self, x: i32, y: i32, radius: i32) -> bool {
        let reach = radius as f32;
        self.0.lock().iter().any(|p| {
            !p.killed
                && (p.x / TILE_SIZE - x as f32).abs() <= reach
                && (p.y / TILE_SIZE - y as f32).abs() <= reach
        })
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_kill_prune() {
        let ledger = ProjectileLedger::new();
        let now = Instant::now();
        ledger.record(1, 28, 160.0, 160.0, now);
        ledger.record(2, 28, 320.0, 160.0, now);
        assert_eq!(ledger.len(), 2);

        assert!(ledger.mark_killed(1));
        assert!(!ledger.mark_killed(9));
        ledger.prune(now);
        assert_eq!(ledger.len(), 1);

        ledger.prune(now + PROJECTILE_LIFETIME);
        assert!(ledger.is_empty());
    }

    #[test]
    fn live_projectile_near_tile() {
        let ledger = ProjectileLedger::new();
        ledger.record(3, 28, 100.0 * TILE_SIZE, 50.0 * TILE_SIZE, Instant::now());
        assert!(ledger.has_live_near(104, 50, 5));
        assert!(!ledger.has_live_near(120, 50, 5));
        ledger.mark_killed(3);
        assert!(!ledger.has_live_near(104, 50, 5));
    }

    #[test]
    fn clones_share_state() {
        let ledger = ProjectileLedger::new();
        let hook_side = ledger.clone();
        ledger.record(7, 1, 0.0, 0.0, Instant::now());
        let handle = std::thread::spawn(move || hook_side.mark_killed(7));
        assert!(handle.join().unwrap());
        ledger.prune(Instant::now());
        assert!(ledger.is_empty());
    }
}
