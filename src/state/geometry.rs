//! World/screen coordinate conversion and the offset clamp.
//!
//! The world-to-screen transform is `screen = world * scale + offset`, applied
//! per component. Everything here is pure and total.

use crate::config::{CLAMP_MARGIN_FRACTION, CLAMP_VISIBLE_FRACTION};
use crate::model::{Position, WORLD_HEIGHT, WORLD_WIDTH, ZONES, Zone};

/// Pixel size of the visible board area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Position {
        Position::new(self.width / 2.0, self.height / 2.0)
    }
}

pub fn world_to_screen(world: Position, scale: f64, offset: Position) -> Position {
    Position::new(world.x * scale + offset.x, world.y * scale + offset.y)
}

/// Inverse of [`world_to_screen`]. `scale` must be non-zero.
pub fn screen_to_world(screen: Position, scale: f64, offset: Position) -> Position {
    Position::new((screen.x - offset.x) / scale, (screen.y - offset.y) / scale)
}

/// First zone, in layout order, whose rectangle holds `world`.
pub fn zone_containing(world: Position) -> Option<&'static Zone> {
    ZONES.iter().find(|z| z.bounds.contains(world))
}

fn clamp_axis(value: f64, world_extent: f64, view_extent: f64, scale: f64) -> f64 {
    let min = -(world_extent * scale - view_extent * CLAMP_VISIBLE_FRACTION);
    let max = view_extent * CLAMP_MARGIN_FRACTION;
    // When the scaled world is smaller than the viewport `min > max`; the
    // upper bound wins so the result stays deterministic.
    value.max(min).min(max)
}

/// Bounds an offset so the world keeps covering most of the viewport.
pub fn clamp_offset(offset: Position, scale: f64, size: ViewportSize) -> Position {
    Position::new(
        clamp_axis(offset.x, WORLD_WIDTH, size.width, scale),
        clamp_axis(offset.y, WORLD_HEIGHT, size.height, scale),
    )
}

/// Offset that keeps the world point under `anchor` fixed when the scale
/// changes from `old_scale` to `new_scale`.
pub fn anchored_offset(anchor: Position, offset: Position, old_scale: f64, new_scale: f64) -> Position {
    let ratio = new_scale / old_scale;
    Position::new(
        anchor.x - (anchor.x - offset.x) * ratio,
        anchor.y - (anchor.y - offset.y) * ratio,
    )
}
