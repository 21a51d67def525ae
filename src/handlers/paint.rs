//! Block and wall painting.

use super::core::{Context, DispatchEvent, HandlerResult};
use super::helpers::{payload, reject};
use crate::security::perms;
use crate::state::Category;
use tileguard_proto::item::ids;
use tileguard_proto::message::Paint;
use tileguard_proto::{ItemId, Packet};

/// Which layer a paint message targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Block,
    Wall,
}

impl Layer {
    fn tools(self) -> &'static [ItemId] {
        match self {
            Layer::Block => &[
                ids::PAINTBRUSH,
                ids::SPECTRE_PAINTBRUSH,
                ids::PAINT_SCRAPER,
                ids::SPECTRE_PAINT_SCRAPER,
            ],
            Layer::Wall => &[
                ids::PAINT_ROLLER,
                ids::SPECTRE_PAINT_ROLLER,
                ids::PAINT_SCRAPER,
                ids::SPECTRE_PAINT_SCRAPER,
            ],
        }
    }

    /// Packet carrying the server's colour for (x, y).
    fn current(self, ctx: &Context<'_>, x: i32, y: i32) -> Option<Packet> {
        let tile = ctx.world.tile(x, y)?;
        Some(match self {
            Layer::Block => Packet::PaintTile {
                x,
                y,
                color: tile.paint,
            },
            Layer::Wall => Packet::PaintWall {
                x,
                y,
                color: tile.wall_paint,
            },
        })
    }
}

fn check(ctx: &Context<'_>, layer: Layer, paint: &Paint) -> Option<&'static str> {
    let held = ctx.session.inventory.selected(ctx.session.selected_slot);
    if !layer.tools().contains(&held.id) {
        return Some("no paint tool in hand");
    }
    if ctx.session.is_disabled() {
        return Some("disabled");
    }
    if !ctx.can(perms::PAINT) || !ctx.may_build_at(paint.x, paint.y) {
        return Some("no build permission");
    }
    if !ctx
        .session
        .in_range(paint.x, paint.y, ctx.settings.security.build_range)
    {
        return Some("out of range");
    }
    if ctx.throttled() {
        return Some("throttled");
    }
    None
}

fn validate(ctx: &mut Context<'_>, event: &mut DispatchEvent, layer: Layer, paint: Paint) {
    if !ctx.world.in_bounds(paint.x, paint.y) {
        reject(ctx, event, "out of bounds");
        return;
    }
    if let Some(reason) = check(ctx, layer, &paint) {
        reject(ctx, event, reason);
        if let Some(current) = layer.current(ctx, paint.x, paint.y) {
            ctx.reply(current);
        }
        return;
    }
    ctx.count(Category::Paint);
}

pub fn handle_paint_tile(ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
    let paint = payload!(event, PaintTile);
    validate(ctx, event, Layer::Block, paint);
    Ok(())
}

pub fn handle_paint_wall(ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
    let paint = payload!(event, PaintWall);
    validate(ctx, event, Layer::Wall, paint);
    Ok(())
}

pub(super) fn apply_tile(ctx: &mut Context<'_>, paint: &Paint) {
    if let Some(tile) = ctx.world.tile_mut(paint.x, paint.y) {
        tile.paint = paint.color;
        ctx.relay(&Packet::PaintTile {
            x: paint.x,
            y: paint.y,
            color: paint.color,
        });
    }
}

pub(super) fn apply_wall(ctx: &mut Context<'_>, paint: &Paint) {
    if let Some(tile) = ctx.world.tile_mut(paint.x, paint.y) {
        tile.wall_paint = paint.color;
        ctx.relay(&Packet::PaintWall {
            x: paint.x,
            y: paint.y,
            color: paint.color,
        });
    }
}
