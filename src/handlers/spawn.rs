//! Spawn, respawn and death.
//!
//! With server-side characters the client's idea of its spawn point is
//! replaced by the stored one until the player picks a new bed.

use super::core::{Context, DispatchEvent, HandlerResult};
use super::helpers::{owns, payload, reject};
use crate::state::SpawnSync;
use tileguard_proto::message::{PlayerDeath, SpawnPlayer};
use tileguard_proto::{Packet, Payload, TILE_SIZE};
use tracing::debug;

/// Seconds a dead player waits before respawning.
pub const RESPAWN_SECONDS: i32 = 10;

pub fn handle_spawn(ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
    let spawn = payload!(event, SpawnPlayer);
    if !owns(ctx, spawn.player) {
        reject(ctx, event, "spawn for another player");
        return Ok(());
    }
    // Any spawn context counts: recall and world entry would also revive.
    if ctx.session.dead && ctx.session.respawn_timer > 0 {
        reject(ctx, event, "respawn before timer expired");
        return Ok(());
    }
    if ctx.settings.ssc.enabled {
        reconcile(ctx, event, spawn);
    }
    Ok(())
}

fn reconcile(ctx: &mut Context<'_>, event: &mut DispatchEvent, spawn: SpawnPlayer) {
    let client = (spawn.spawn_x, spawn.spawn_y);
    match ctx.session.spawn_sync {
        SpawnSync::Unseen => {
            ctx.session.spawn_sync = SpawnSync::Cached {
                server: ctx.session.stored_spawn,
                client,
            };
        }
        SpawnSync::Synced => {}
        SpawnSync::Cached { client: cached, .. } if cached != client => {
            debug!(conn = ctx.conn(), "Client picked a new spawn point");
            ctx.session.spawn_sync = SpawnSync::Synced;
        }
        SpawnSync::Cached { server, .. } => {
            let forced = SpawnPlayer {
                spawn_x: server.0,
                spawn_y: server.1,
                respawn_timer: 0,
                deaths_pve: ctx.session.deaths_pve,
                deaths_pvp: ctx.session.deaths_pvp,
                ..spawn
            };
            event.payload = Payload::SpawnPlayer(forced);
            event.overwrite();
            finish_spawn(ctx, &forced);
            ctx.broadcast(&Packet::PlayerSpawn(forced));
        }
    }
}

fn finish_spawn(ctx: &mut Context<'_>, spawn: &SpawnPlayer) {
    let (x, y) = if spawn.spawn_x < 0 || spawn.spawn_y < 0 {
        ctx.world.spawn()
    } else {
        (i32::from(spawn.spawn_x), i32::from(spawn.spawn_y))
    };
    let session = &mut *ctx.session;
    session.dead = false;
    session.respawn_timer = 0;
    session.handshake.finished_handshake = true;
    session.position = (x as f32 * TILE_SIZE, y as f32 * TILE_SIZE);
}

pub(super) fn apply(ctx: &mut Context<'_>, spawn: &SpawnPlayer) {
    finish_spawn(ctx, spawn);
    ctx.relay(&Packet::PlayerSpawn(*spawn));
}

pub fn handle_death(ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
    let death = payload!(event, PlayerDeath);
    if !owns(ctx, death.player) {
        reject(ctx, event, "death of another player");
    }
    Ok(())
}

pub(super) fn apply_death(ctx: &mut Context<'_>, death: &PlayerDeath) {
    let session = &mut *ctx.session;
    session.dead = true;
    session.respawn_timer = RESPAWN_SECONDS;
    if death.pvp {
        session.deaths_pvp = session.deaths_pvp.saturating_add(1);
    } else {
        session.deaths_pve = session.deaths_pve.saturating_add(1);
    }
    ctx.relay(&Packet::PlayerDeath {
        player: death.player,
        pvp: death.pvp,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::core::Outcome;
    use crate::handlers::test_support::Fixture;
    use tileguard_proto::message::SpawnContext;

    fn spawn_at(x: i16, y: i16, context: SpawnContext) -> Payload {
        Payload::SpawnPlayer(SpawnPlayer {
            player: 0,
            spawn_x: x,
            spawn_y: y,
            respawn_timer: 0,
            deaths_pve: 0,
            deaths_pvp: 0,
            context,
        })
    }

    fn ssc_fixture() -> Fixture {
        let mut f = Fixture::new();
        f.settings.ssc.enabled = true;
        f.session.stored_spawn = (40, 60);
        f.session.deaths_pve = 3;
        f.session.handshake.finished_handshake = false;
        f
    }

    #[test]
    fn first_spawn_caches_then_reuse_is_forced() {
        let mut f = ssc_fixture();
        let (event, _) = f.run(handle_spawn, spawn_at(-1, -1, SpawnContext::SpawningIntoWorld));
        assert_eq!(event.outcome, Outcome::Continue);
        assert_eq!(
            f.session.spawn_sync,
            SpawnSync::Cached {
                server: (40, 60),
                client: (-1, -1)
            }
        );
        assert!(f.session.handshake.finished_handshake);

        f.outbound.clear();
        let (event, _) = f.run(handle_spawn, spawn_at(-1, -1, SpawnContext::RecallFromItem));
        assert_eq!(event.outcome, Outcome::Overwrite);
        let Payload::SpawnPlayer(forced) = event.payload else {
            panic!("payload replaced with another kind");
        };
        assert_eq!((forced.spawn_x, forced.spawn_y), (40, 60));
        assert_eq!(forced.deaths_pve, 3);
        assert_eq!(forced.respawn_timer, 0);
        assert_eq!(f.sent_to(0), vec![Packet::PlayerSpawn(forced)]);
        assert_eq!(f.sent_to(1), vec![Packet::PlayerSpawn(forced)]);
    }

    #[test]
    fn new_client_spawn_syncs_for_good() {
        let mut f = ssc_fixture();
        f.run(handle_spawn, spawn_at(-1, -1, SpawnContext::SpawningIntoWorld));
        let (event, _) = f.run(handle_spawn, spawn_at(12, 34, SpawnContext::RecallFromItem));
        assert_eq!(event.outcome, Outcome::Continue);
        assert_eq!(f.session.spawn_sync, SpawnSync::Synced);

        let (event, _) = f.run(handle_spawn, spawn_at(-1, -1, SpawnContext::RecallFromItem));
        assert_eq!(event.outcome, Outcome::Continue);
    }

    #[test]
    fn early_revive_is_cancelled() {
        let mut f = Fixture::new();
        f.run(
            handle_death,
            Payload::PlayerDeath(PlayerDeath { player: 0, pvp: false }),
        );
        assert!(f.session.dead);
        assert_eq!(f.session.respawn_timer, RESPAWN_SECONDS);
        assert_eq!(f.session.deaths_pve, 1);

        let (event, _) = f.run(handle_spawn, spawn_at(-1, -1, SpawnContext::ReviveFromDeath));
        assert!(event.is_cancelled());

        for context in [SpawnContext::SpawningIntoWorld, SpawnContext::RecallFromItem] {
            let (event, _) = f.run(handle_spawn, spawn_at(-1, -1, context));
            assert!(event.is_cancelled(), "{context:?}");
        }
        assert!(f.session.dead);
        assert_eq!(f.session.respawn_timer, RESPAWN_SECONDS);

        f.session.respawn_timer = 0;
        let (event, _) = f.run(handle_spawn, spawn_at(-1, -1, SpawnContext::ReviveFromDeath));
        assert!(!event.is_cancelled());
        assert!(!f.session.dead);
    }

    #[test]
    fn death_of_someone_else_is_cancelled() {
        let mut f = Fixture::new();
        let (event, _) = f.run(
            handle_death,
            Payload::PlayerDeath(PlayerDeath { player: 1, pvp: true }),
        );
        assert!(event.is_cancelled());
        assert!(!f.session.dead);
    }
}
