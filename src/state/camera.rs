// Camera director: frames zones and remembers which one is exactly in view.
use tracing::{debug, info};

use crate::config::{FOCUS_PADDING, MAX_SCALE};
use crate::model::{Position, Zone, zone_by_id};

use super::geometry::ViewportSize;
use super::viewport::Viewport;

/// Scale and (unclamped) offset that center `zone` with a 10% margin.
pub fn focus_transform(zone: &Zone, size: ViewportSize) -> (f64, Position) {
    let b = zone.bounds;
    let scale = (size.width * FOCUS_PADDING / b.width)
        .min(size.height * FOCUS_PADDING / b.height)
        .min(MAX_SCALE);
    let mid = b.center();
    let view_mid = size.center();
    (scale, Position::new(view_mid.x - mid.x * scale, view_mid.y - mid.y * scale))
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    viewport: Viewport,
    active_zone: Option<&'static str>,
}

impl Camera {
    pub fn new(size: ViewportSize) -> Self {
        Self { viewport: Viewport::new(size), active_zone: None }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Manual mutation; callers decide whether it clears the active zone.
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Zone currently framed by the last focus, until something moves the camera.
    pub fn active_zone(&self) -> Option<&'static str> {
        self.active_zone
    }

    pub fn clear_active_zone(&mut self) {
        if let Some(z) = self.active_zone.take() {
            debug!(zone = z, "active zone cleared");
        }
    }

    /// Frames `zone_id`. Unknown ids leave the camera untouched.
    pub fn focus_zone(&mut self, zone_id: &str) -> bool {
        let Some(zone) = zone_by_id(zone_id) else {
            debug!(zone = zone_id, "focus on unknown zone ignored");
            return false;
        };
        let (scale, offset) = focus_transform(zone, self.viewport.size());
        self.viewport.set_transform(scale, offset);
        self.active_zone = Some(zone.id);
        info!(zone = zone.id, scale = self.viewport.scale(), "focused zone");
        true
    }
}
