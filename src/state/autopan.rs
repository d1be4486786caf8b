//! Edge-triggered auto-pan while a note is dragged.
//!
//! A drag session owns at most one [`AutoPan`]; the repeating timer lives in
//! its handle, so dropping the session (release, cancel, blur) stops the timer.

use std::rc::Rc;

use gloo_timers::callback::Interval;
use tracing::debug;

use crate::config::{AUTO_PAN_STEP, AUTO_PAN_TICK_MS, EDGE_MARGIN};
use crate::model::Position;

use super::geometry::ViewportSize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanDirection {
    Up,
    Down,
    Left,
    Right,
}

impl PanDirection {
    /// Offset change for one tick. Panning "left" reveals what is left of the
    /// view, which moves the world right on screen.
    pub fn offset_delta(self, step: f64) -> (f64, f64) {
        match self {
            PanDirection::Up => (0.0, step),
            PanDirection::Down => (0.0, -step),
            PanDirection::Left => (step, 0.0),
            PanDirection::Right => (-step, 0.0),
        }
    }
}

/// Edge the pointer is near, checked left, right, up, down; first match wins.
pub fn edge_direction(pointer: Position, size: ViewportSize) -> Option<PanDirection> {
    if pointer.x < EDGE_MARGIN {
        Some(PanDirection::Left)
    } else if pointer.x > size.width - EDGE_MARGIN {
        Some(PanDirection::Right)
    } else if pointer.y < EDGE_MARGIN {
        Some(PanDirection::Up)
    } else if pointer.y > size.height - EDGE_MARGIN {
        Some(PanDirection::Down)
    } else {
        None
    }
}

/// Starts repeating timers. Dropping the returned handle must cancel the timer.
pub trait Scheduler {
    type Handle;

    fn start_repeating(&mut self, period_ms: u32) -> Self::Handle;
}

/// A running nudge: one direction, one timer.
#[derive(Debug)]
pub struct AutoPan<H> {
    direction: PanDirection,
    _timer: H,
}

impl<H> AutoPan<H> {
    pub fn direction(&self) -> PanDirection {
        self.direction
    }

    pub fn step(&self) -> (f64, f64) {
        self.direction.offset_delta(AUTO_PAN_STEP)
    }
}

/// Points `slot` at `direction`, reusing a running timer when there is one.
/// Returns true when the slot went from idle to running.
pub fn steer<S: Scheduler>(
    slot: &mut Option<AutoPan<S::Handle>>,
    direction: Option<PanDirection>,
    scheduler: &mut S,
) -> bool {
    match (direction, slot.as_mut()) {
        (None, Some(_)) => {
            debug!("auto-pan stopped");
            *slot = None;
            false
        }
        (None, None) => false,
        (Some(d), Some(running)) => {
            if running.direction != d {
                debug!(direction = ?d, "auto-pan direction changed");
                running.direction = d;
            }
            false
        }
        (Some(d), None) => {
            debug!(direction = ?d, "auto-pan started");
            *slot = Some(AutoPan { direction: d, _timer: scheduler.start_repeating(AUTO_PAN_TICK_MS) });
            true
        }
    }
}

/// Browser scheduler backed by `setInterval`.
#[derive(Clone)]
pub struct IntervalScheduler {
    on_tick: Rc<dyn Fn()>,
}

impl IntervalScheduler {
    pub fn new(on_tick: Rc<dyn Fn()>) -> Self {
        Self { on_tick }
    }
}

impl Scheduler for IntervalScheduler {
    type Handle = Interval;

    fn start_repeating(&mut self, period_ms: u32) -> Interval {
        let on_tick = self.on_tick.clone();
        Interval::new(period_ms, move || on_tick())
    }
}
