//! Item-driven teleports.

use super::core::{Context, DispatchEvent, HandlerResult};
use super::helpers::{payload, reject, reteleport};
use crate::security::perms;
use tileguard_proto::message::{Teleport, TeleportKind};
use tileguard_proto::{MAX_PLAYERS, Packet};

/// Rod of Discord teleports carry style 0; potions and pylons use others.
const ROD_STYLE: u8 = 0;

fn check(ctx: &Context<'_>, tp: &Teleport) -> Result<(), &'static str> {
    if ctx.session.is_disabled() {
        return Err("disabled");
    }
    match tp.kind {
        TeleportKind::PlayerToPosition => {
            if tp.style == ROD_STYLE && !ctx.can(perms::ROD) {
                return Err("no rod permission");
            }
            if i16::from(ctx.conn()) != tp.target {
                return Err("teleporting another player");
            }
        }
        TeleportKind::PlayerToPlayer => {
            if !ctx.can(perms::WORMHOLE) {
                return Err("no wormhole permission");
            }
            let target = u8::try_from(tp.target)
                .ok()
                .filter(|t| usize::from(*t) < MAX_PLAYERS)
                .ok_or("target out of range")?;
            if target == ctx.conn() || ctx.sessions.get(target).is_none() {
                return Err("no such target player");
            }
        }
        TeleportKind::NpcToPosition | TeleportKind::Unknown(_) => {
            return Err("teleport kind not allowed");
        }
    }
    if !ctx.world.pixel_in_bounds(tp.x, tp.y) {
        return Err("destination out of bounds");
    }
    Ok(())
}

pub fn handle_teleport(ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
    let tp = payload!(event, Teleport);
    if let Err(reason) = check(ctx, &tp) {
        reject(ctx, event, reason);
        reteleport(ctx);
    }
    Ok(())
}

pub(super) fn apply(ctx: &mut Context<'_>, tp: &Teleport) {
    ctx.session.position = (tp.x, tp.y);
    ctx.relay(&Packet::Teleport {
        player: ctx.conn(),
        x: tp.x,
        y: tp.y,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::Fixture;
    use tileguard_proto::Payload;

    fn tp(kind: TeleportKind, target: i16, style: u8) -> Payload {
        Payload::Teleport(Teleport {
            kind,
            target,
            x: 320.0,
            y: 480.0,
            style,
        })
    }

    #[test]
    fn rod_needs_permission() {
        let mut f = Fixture::new();
        f.session.group = "guest".into();
        let (event, _) = f.run(handle_teleport, tp(TeleportKind::PlayerToPosition, 0, ROD_STYLE));
        assert!(event.is_cancelled());
        assert_eq!(
            f.sent_to(0),
            vec![Packet::Teleport {
                player: 0,
                x: 1600.0,
                y: 1600.0
            }]
        );

        f.session.group = "default".into();
        let (event, _) = f.run(handle_teleport, tp(TeleportKind::PlayerToPosition, 0, ROD_STYLE));
        assert!(!event.is_cancelled());
        assert_eq!(f.session.position, (320.0, 480.0));
    }

    #[test]
    fn wormhole_needs_live_target() {
        let mut f = Fixture::new();
        let (event, _) = f.run(handle_teleport, tp(TeleportKind::PlayerToPlayer, 9, 1));
        assert!(event.is_cancelled());
        let (event, _) = f.run(handle_teleport, tp(TeleportKind::PlayerToPlayer, 1, 1));
        assert!(!event.is_cancelled());
    }

    #[test]
    fn npc_teleport_and_bad_destination_rejected() {
        let mut f = Fixture::new();
        let (event, _) = f.run(handle_teleport, tp(TeleportKind::NpcToPosition, 3, 1));
        assert!(event.is_cancelled());

        let far = Payload::Teleport(Teleport {
            kind: TeleportKind::PlayerToPosition,
            target: 0,
            x: -50.0,
            y: 10.0,
            style: 2,
        });
        let (event, _) = f.run(handle_teleport, far);
        assert!(event.is_cancelled());
    }
}
