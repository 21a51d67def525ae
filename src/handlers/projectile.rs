//! Projectile creation and destruction.

use super::core::{Context, DispatchEvent, HandlerResult};
use super::helpers::{owns, payload, reject};
use crate::state::Category;
use tileguard_proto::message::{KillProjectile, NewProjectile};
use tileguard_proto::{MAX_PROJECTILES, Packet};

fn ident_in_range(ident: i16) -> bool {
    usize::try_from(ident).is_ok_and(|i| i < MAX_PROJECTILES)
}

pub fn handle_new_projectile(ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
    let proj = payload!(event, NewProjectile);
    if !owns(ctx, proj.owner) || !ident_in_range(proj.ident) {
        reject(ctx, event, "foreign or out-of-range projectile");
        return Ok(());
    }
    let rejection = if ctx.session.is_disabled() {
        Some("disabled")
    } else if proj.damage < 0 || proj.damage > ctx.settings.security.max_projectile_damage {
        Some("projectile damage over cap")
    } else {
        None
    };
    if let Some(reason) = rejection {
        reject(ctx, event, reason);
        ctx.reply(Packet::KillProjectile {
            ident: proj.ident,
            owner: proj.owner,
        });
        return Ok(());
    }
    ctx.count(Category::Projectile);
    ctx.session
        .projectiles
        .record(proj.ident, proj.kind, proj.x, proj.y, ctx.now);
    Ok(())
}

pub(super) fn apply_new(ctx: &mut Context<'_>, proj: &NewProjectile) {
    ctx.relay(&Packet::NewProjectile {
        ident: proj.ident,
        owner: proj.owner,
        kind: proj.kind,
        x: proj.x,
        y: proj.y,
    });
}

pub fn handle_kill_projectile(ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
    let kill = payload!(event, KillProjectile);
    if !owns(ctx, kill.owner) || !ident_in_range(kill.ident) {
        reject(ctx, event, "foreign or out-of-range projectile");
    }
    Ok(())
}

/// The outbound hook marks the owner's ledger entry when this goes out.
pub(super) fn apply_kill(ctx: &mut Context<'_>, kill: &KillProjectile) {
    ctx.relay(&Packet::KillProjectile {
        ident: kill.ident,
        owner: kill.owner,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::Fixture;
    use tileguard_proto::Payload;

    fn new_proj(ident: i16, owner: u8, damage: i16) -> Payload {
        Payload::NewProjectile(NewProjectile {
            ident,
            owner,
            kind: 28,
            damage,
            x: 1600.0,
            y: 1600.0,
            vx: 1.0,
            vy: 0.0,
        })
    }

    #[test]
    fn accepted_projectile_is_counted_and_ledgered() {
        let mut f = Fixture::new();
        let (event, _) = f.run(handle_new_projectile, new_proj(3, 0, 40));
        assert!(!event.is_cancelled());
        assert_eq!(f.session.counters.get(Category::Projectile), 1);
        assert_eq!(f.session.projectiles.len(), 1);
        assert_eq!(f.sent_to(1).len(), 1);
    }

    #[test]
    fn overpowered_projectile_is_killed() {
        let mut f = Fixture::new();
        let (event, _) = f.run(handle_new_projectile, new_proj(3, 0, 5000));
        assert!(event.is_cancelled());
        assert_eq!(
            f.sent_to(0),
            vec![Packet::KillProjectile { ident: 3, owner: 0 }]
        );
        assert!(f.session.projectiles.is_empty());
    }

    #[test]
    fn foreign_and_out_of_range_idents() {
        let mut f = Fixture::new();
        let (event, _) = f.run(handle_new_projectile, new_proj(3, 1, 1));
        assert!(event.is_cancelled());
        let (event, _) = f.run(handle_new_projectile, new_proj(1000, 0, 1));
        assert!(event.is_cancelled());
        let kill = Payload::KillProjectile(KillProjectile { ident: -1, owner: 0 });
        let (event, _) = f.run(handle_kill_projectile, kill);
        assert!(event.is_cancelled());
    }
}
