// Scale and offset of the world-to-screen transform. Every mutator re-clamps,
// so no caller can store an out-of-range value.
use crate::config::{INITIAL_SCALE, MAX_SCALE, MIN_SCALE};
use crate::model::Position;

use super::geometry::{ViewportSize, anchored_offset, clamp_offset, screen_to_world, world_to_screen};

pub fn clamp_scale(scale: f64) -> f64 {
    scale.max(MIN_SCALE).min(MAX_SCALE)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    scale: f64,
    offset: Position,
    size: ViewportSize,
}

impl Viewport {
    pub fn new(size: ViewportSize) -> Self {
        let mut vp = Self { scale: INITIAL_SCALE, offset: Position::default(), size };
        vp.set_offset(Position::default());
        vp
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> Position {
        self.offset
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    /// Clamps to `[MIN_SCALE, MAX_SCALE]`; the offset is re-clamped for the new scale.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = clamp_scale(scale);
        self.offset = clamp_offset(self.offset, self.scale, self.size);
    }

    pub fn set_offset(&mut self, offset: Position) {
        self.offset = clamp_offset(offset, self.scale, self.size);
    }

    /// Scale first, then an offset clamped against that scale.
    pub fn set_transform(&mut self, scale: f64, offset: Position) {
        self.set_scale(scale);
        self.set_offset(offset);
    }

    /// Multiplies the scale by `factor` keeping the world point under `anchor` in place.
    pub fn zoom_at(&mut self, anchor: Position, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let new_scale = clamp_scale(self.scale * factor);
        let offset = anchored_offset(anchor, self.offset, self.scale, new_scale);
        self.set_transform(new_scale, offset);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.set_offset(Position::new(self.offset.x + dx, self.offset.y + dy));
    }

    pub fn resize(&mut self, size: ViewportSize) {
        self.size = size;
        self.offset = clamp_offset(self.offset, self.scale, self.size);
    }

    pub fn to_screen(&self, world: Position) -> Position {
        world_to_screen(world, self.scale, self.offset)
    }

    pub fn to_world(&self, screen: Position) -> Position {
        screen_to_world(screen, self.scale, self.offset)
    }
}
