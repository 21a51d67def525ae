//! Boss summons, invasions, pet licences and world upgrades.

use super::core::{Context, DispatchEvent, HandlerResult};
use super::helpers::{owns, payload, reject};
use crate::security::perms;
use std::borrow::Cow;
use tileguard_proto::Packet;
use tileguard_proto::message::SummonBoss;
use tracing::info;

/// What a summon code starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummonCategory {
    Boss,
    Invasion,
    Pet,
    WorldUpgrade,
}

impl SummonCategory {
    pub const fn permission(self) -> &'static str {
        match self {
            Self::Boss => perms::SUMMON_BOSS,
            Self::Invasion => perms::START_INVASION,
            Self::Pet => perms::SUMMON_PET,
            Self::WorldUpgrade => perms::WORLD_UPGRADES,
        }
    }
}

/// Negative codes and the event each starts.
const EVENTS: &[(i16, SummonCategory, &str)] = &[
    (-1, SummonCategory::Invasion, "the Goblin Army"),
    (-2, SummonCategory::Invasion, "the Frost Legion"),
    (-3, SummonCategory::Invasion, "the Pirates"),
    (-4, SummonCategory::Invasion, "the Pumpkin Moon"),
    (-5, SummonCategory::Invasion, "the Frost Moon"),
    (-6, SummonCategory::Invasion, "a Solar Eclipse"),
    (-7, SummonCategory::Invasion, "the Martian Madness"),
    (-8, SummonCategory::Invasion, "the Lunar Events"),
    (-10, SummonCategory::Invasion, "a Blood Moon"),
    (-11, SummonCategory::WorldUpgrade, "the Advanced Combat Techniques"),
    (-12, SummonCategory::Pet, "the Town Cat license"),
    (-13, SummonCategory::Pet, "the Town Dog license"),
    (-14, SummonCategory::Pet, "the Town Bunny license"),
    (-15, SummonCategory::Pet, "the Town Slime license"),
    (-16, SummonCategory::WorldUpgrade, "the Advanced Combat Techniques: Volume Two"),
    (-17, SummonCategory::WorldUpgrade, "the Peddler's Satchel"),
    (-18, SummonCategory::WorldUpgrade, "the Gummy Worm"),
];

/// NPC types with a display name.
const BOSSES: &[(i16, &str)] = &[
    (4, "Eye of Cthulhu"),
    (13, "Eater of Worlds"),
    (35, "Skeletron"),
    (50, "King Slime"),
    (113, "Wall of Flesh"),
    (125, "The Twins"),
    (127, "Skeletron Prime"),
    (134, "The Destroyer"),
    (222, "Queen Bee"),
    (245, "Golem"),
    (262, "Plantera"),
    (266, "Brain of Cthulhu"),
    (370, "Duke Fishron"),
    (398, "Moon Lord"),
    (636, "Empress of Light"),
    (657, "Queen Slime"),
    (668, "Deerclops"),
];

/// Category and display name of a summon code. Zero and unlisted negative
/// codes are unknown.
pub fn classify(code: i16) -> Option<(SummonCategory, Cow<'static, str>)> {
    if code > 0 {
        let name = BOSSES
            .iter()
            .find(|(id, _)| *id == code)
            .map_or_else(|| Cow::Owned(format!("NPC #{code}")), |(_, n)| Cow::Borrowed(*n));
        return Some((SummonCategory::Boss, name));
    }
    EVENTS
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, category, name)| (*category, Cow::Borrowed(*name)))
}

pub fn handle_summon(ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
    let summon = payload!(event, SummonBoss);
    if !owns(ctx, summon.player) {
        reject(ctx, event, "summon for another player");
        return Ok(());
    }
    let Some((category, name)) = classify(summon.code) else {
        reject(ctx, event, "unknown summon code");
        ctx.reply(Packet::error("That cannot be summoned here."));
        return Ok(());
    };
    if !ctx.can(category.permission()) {
        reject(ctx, event, "missing summon permission");
        ctx.reply(Packet::error(format!(
            "You do not have permission to summon {name}."
        )));
    }
    Ok(())
}

pub(super) fn apply(ctx: &mut Context<'_>, summon: &SummonBoss) {
    let Some((category, name)) = classify(summon.code) else {
        return;
    };
    info!(
        instance = %ctx.instance,
        player = %ctx.session.label(),
        code = summon.code,
        ?category,
        "Summon"
    );
    let text = match (category, ctx.settings.announce_summons) {
        (SummonCategory::Boss, true) => format!("{} summoned {name}!", ctx.session.label()),
        (SummonCategory::Boss, false) => format!("{name} has awoken!"),
        (_, true) => format!("{} activated {name}!", ctx.session.label()),
        (_, false) => format!("{name} has been activated!"),
    };
    ctx.broadcast(&Packet::info(text));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::Fixture;
    use tileguard_proto::Payload;

    fn summon(code: i16) -> Payload {
        Payload::SummonBoss(SummonBoss { player: 0, code })
    }

    #[test]
    fn code_table() {
        assert_eq!(classify(50).map(|c| c.0), Some(SummonCategory::Boss));
        assert_eq!(classify(-1).map(|c| c.0), Some(SummonCategory::Invasion));
        assert_eq!(classify(-13).map(|c| c.0), Some(SummonCategory::Pet));
        assert_eq!(classify(-17).map(|c| c.0), Some(SummonCategory::WorldUpgrade));
        assert!(classify(0).is_none());
        assert!(classify(-9).is_none());
        assert!(classify(-99).is_none());
    }

    #[test]
    fn guest_cannot_summon_boss() {
        let mut f = Fixture::new();
        f.session.group = "guest".into();
        let (event, _) = f.run(handle_summon, summon(50));
        assert!(event.is_cancelled());
        assert!(matches!(f.sent_to(0)[0], Packet::ServerMessage { .. }));
        assert!(f.sent_to(1).is_empty());
    }

    #[test]
    fn boss_announced_publicly_or_anonymously() {
        let mut f = Fixture::new();
        f.run(handle_summon, summon(50));
        assert_eq!(f.sent_to(1), vec![Packet::info("alice summoned King Slime!")]);

        f.outbound.clear();
        f.settings.announce_summons = false;
        f.run(handle_summon, summon(50));
        assert_eq!(f.sent_to(1), vec![Packet::info("King Slime has awoken!")]);
    }
}
