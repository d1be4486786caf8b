//! Gesture controller: turns raw pointer, touch, wheel and key input into
//! viewport changes and note moves.
//!
//! At most one [`GestureSession`] is active. Sessions start and end only at
//! gesture boundaries (button/touch down and up, Escape, forced cleanup), and
//! handlers dispatch on the active variant. Input that does not fit the active
//! session is ignored rather than reported.

use tracing::{debug, trace};

use crate::config::{MIN_PINCH_DISTANCE, WHEEL_ZOOM_FACTOR};
use crate::model::Position;

use super::autopan::{AutoPan, Scheduler, edge_direction, steer};
use super::camera::Camera;
use super::geometry::ViewportSize;
use super::input::{KeyInput, MouseButton, NoteControl, PointerInput, PointerTarget, TouchInput, WheelInput};
use super::store::{ConnectionStore, NoteStore};
use super::touch::two_finger_geometry;
use super::viewport::Viewport;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanSession {
    pub anchor_screen: Position,
    pub anchor_offset: Position,
}

impl PanSession {
    fn offset_for(&self, pointer: Position) -> Position {
        Position::new(
            self.anchor_offset.x + pointer.x - self.anchor_screen.x,
            self.anchor_offset.y + pointer.y - self.anchor_screen.y,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchSession {
    /// Finger distance at the start; below `MIN_PINCH_DISTANCE` the session
    /// re-anchors on the next usable move instead of scaling.
    pub anchor_distance: f64,
    pub anchor_scale: f64,
    pub anchor_offset: Position,
}

#[derive(Debug)]
pub struct DragSession<H> {
    pub note_id: String,
    /// Pointer world position minus the note's top-left at grab time.
    pub grab_offset: Position,
    /// Where the note is shown while dragging; committed on release only.
    pub overlay: Option<Position>,
    auto_pan: Option<AutoPan<H>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConnectSession {
    pub source: String,
    /// Endpoint of the rubber-band line in world space, once the pointer moved.
    pub current: Option<Position>,
}

#[derive(Debug)]
pub enum GestureSession<H> {
    Pan(PanSession),
    Pinch(PinchSession),
    Drag(DragSession<H>),
    Connect(ConnectSession),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureMode {
    Idle,
    Panning,
    Pinching,
    DraggingNote,
    DrawingConnection,
}

impl<H> GestureSession<H> {
    pub fn mode(&self) -> GestureMode {
        match self {
            GestureSession::Pan(_) => GestureMode::Panning,
            GestureSession::Pinch(_) => GestureMode::Pinching,
            GestureSession::Drag(_) => GestureMode::DraggingNote,
            GestureSession::Connect(_) => GestureMode::DrawingConnection,
        }
    }
}

/// Owns the camera and the single active gesture session.
pub struct BoardController<S: Scheduler> {
    camera: Camera,
    session: Option<GestureSession<S::Handle>>,
    scheduler: S,
}

impl<S: Scheduler> BoardController<S> {
    pub fn new(size: ViewportSize, scheduler: S) -> Self {
        Self { camera: Camera::new(size), session: None, scheduler }
    }

    // ---------------- Read side -----------------

    pub fn viewport(&self) -> &Viewport {
        self.camera.viewport()
    }

    pub fn active_zone(&self) -> Option<&'static str> {
        self.camera.active_zone()
    }

    pub fn mode(&self) -> GestureMode {
        self.session.as_ref().map_or(GestureMode::Idle, GestureSession::mode)
    }

    /// Note being dragged and its uncommitted position, once it has moved.
    pub fn drag_overlay(&self) -> Option<(&str, Position)> {
        match &self.session {
            Some(GestureSession::Drag(d)) => d.overlay.map(|p| (d.note_id.as_str(), p)),
            _ => None,
        }
    }

    /// Source note and current line endpoint of an in-progress connection.
    pub fn connecting(&self) -> Option<(&str, Option<Position>)> {
        match &self.session {
            Some(GestureSession::Connect(c)) => Some((c.source.as_str(), c.current)),
            _ => None,
        }
    }

    // ---------------- Camera -----------------

    pub fn focus_zone(&mut self, zone_id: &str) -> bool {
        self.camera.focus_zone(zone_id)
    }

    pub fn resize(&mut self, size: ViewportSize) {
        self.camera.viewport_mut().resize(size);
    }

    /// Wheel zoom works in every mode and never opens a session.
    pub fn on_wheel(&mut self, ev: WheelInput) {
        self.camera.clear_active_zone();
        let factor = if ev.delta_y < 0.0 { WHEEL_ZOOM_FACTOR } else { 1.0 / WHEEL_ZOOM_FACTOR };
        self.camera.viewport_mut().zoom_at(ev.position, factor);
        trace!(scale = self.viewport().scale(), "wheel zoom");
    }

    // ---------------- Session bookkeeping -----------------

    fn begin(&mut self, session: GestureSession<S::Handle>) {
        debug!(mode = ?session.mode(), "session started");
        self.session = Some(session);
    }

    /// Drops the session; a drag's auto-pan timer goes with it.
    fn end(&mut self) -> Option<GestureSession<S::Handle>> {
        let ended = self.session.take();
        if let Some(s) = &ended {
            debug!(mode = ?s.mode(), "session ended");
        }
        ended
    }

    fn begin_pan(&mut self, at: Position) {
        self.camera.clear_active_zone();
        let anchor_offset = self.viewport().offset();
        self.begin(GestureSession::Pan(PanSession { anchor_screen: at, anchor_offset }));
    }

    fn begin_pinch(&mut self, distance: f64) {
        self.camera.clear_active_zone();
        let vp = self.viewport();
        let pinch = PinchSession { anchor_distance: distance, anchor_scale: vp.scale(), anchor_offset: vp.offset() };
        self.begin(GestureSession::Pinch(pinch));
    }

    fn begin_drag<N: NoteStore>(&mut self, note_id: &str, at: Position, notes: &N) {
        let Some(top_left) = notes.note_position(note_id) else {
            debug!(note = note_id, "drag on unknown note ignored");
            return;
        };
        self.camera.clear_active_zone();
        let world = self.viewport().to_world(at);
        let grab_offset = Position::new(world.x - top_left.x, world.y - top_left.y);
        self.begin(GestureSession::Drag(DragSession {
            note_id: note_id.to_string(),
            grab_offset,
            overlay: None,
            auto_pan: None,
        }));
    }

    fn finish_connection<C: ConnectionStore>(&mut self, target: &str, connections: &mut C) {
        if let Some(GestureSession::Connect(c)) = self.end() {
            if c.source != target {
                debug!(source = %c.source, target, "connection created");
                connections.create_connection(&c.source, target);
            }
        }
    }

    /// A primary press on a note, from mouse or touch.
    fn press_note<N: NoteStore, C: ConnectionStore>(
        &mut self,
        note_id: &str,
        at: Position,
        notes: &mut N,
        connections: &mut C,
    ) {
        notes.bring_to_front(note_id);
        match self.mode() {
            GestureMode::DrawingConnection => self.finish_connection(note_id, connections),
            GestureMode::Idle => self.begin_drag(note_id, at, notes),
            _ => {}
        }
    }

    fn press_control<N: NoteStore>(&mut self, note_id: &str, control: NoteControl, notes: &mut N) {
        notes.bring_to_front(note_id);
        if control == NoteControl::Link && self.mode() == GestureMode::Idle {
            self.begin(GestureSession::Connect(ConnectSession { source: note_id.to_string(), current: None }));
        }
    }

    fn drag_to(&mut self, pointer: Position) {
        let world = self.camera.viewport().to_world(pointer);
        let size = self.camera.viewport().size();
        let Some(GestureSession::Drag(drag)) = self.session.as_mut() else { return };
        drag.overlay = Some(Position::new(world.x - drag.grab_offset.x, world.y - drag.grab_offset.y));
        if steer(&mut drag.auto_pan, edge_direction(pointer, size), &mut self.scheduler) {
            self.camera.clear_active_zone();
        }
    }

    fn commit_drag<N: NoteStore>(&mut self, notes: &mut N) {
        if let Some(GestureSession::Drag(drag)) = self.end() {
            if let Some(p) = drag.overlay {
                debug!(note = %drag.note_id, x = p.x, y = p.y, "drag committed");
                notes.update_note_position(&drag.note_id, p);
            }
        }
    }

    // ---------------- Mouse -----------------

    pub fn on_pointer_down<N: NoteStore, C: ConnectionStore>(
        &mut self,
        ev: &PointerInput,
        notes: &mut N,
        connections: &mut C,
    ) {
        match (&ev.target, ev.button) {
            (PointerTarget::Chrome, _) => {}
            (PointerTarget::Background, MouseButton::Middle) => {
                if self.mode() == GestureMode::Idle {
                    self.begin_pan(ev.position);
                }
            }
            (PointerTarget::Background, MouseButton::Primary) => {
                if self.mode() == GestureMode::DrawingConnection {
                    debug!("connection cancelled by background click");
                    self.end();
                }
            }
            (PointerTarget::Note(id), MouseButton::Primary) => {
                self.press_note(id, ev.position, notes, connections);
            }
            (PointerTarget::Control { note, control }, MouseButton::Primary) => {
                self.press_control(note, *control, notes);
            }
            (PointerTarget::Editor(id), _) | (PointerTarget::Note(id), _) | (PointerTarget::Control { note: id, .. }, _) => {
                notes.bring_to_front(id);
            }
            (PointerTarget::Background, _) => {}
        }
    }

    pub fn on_pointer_move(&mut self, position: Position) {
        match self.session.as_mut() {
            Some(GestureSession::Pan(pan)) => {
                let offset = pan.offset_for(position);
                self.camera.viewport_mut().set_offset(offset);
            }
            Some(GestureSession::Drag(_)) => self.drag_to(position),
            Some(GestureSession::Connect(c)) => {
                c.current = Some(self.camera.viewport().to_world(position));
            }
            Some(GestureSession::Pinch(_)) | None => {}
        }
    }

    pub fn on_pointer_up<N: NoteStore>(&mut self, notes: &mut N) {
        match self.mode() {
            GestureMode::Panning => {
                self.end();
            }
            GestureMode::DraggingNote => self.commit_drag(notes),
            _ => {}
        }
    }

    // ---------------- Touch -----------------

    pub fn on_touch_start<N: NoteStore, C: ConnectionStore>(
        &mut self,
        ev: &TouchInput,
        notes: &mut N,
        connections: &mut C,
    ) {
        if ev.target == PointerTarget::Chrome {
            return;
        }
        if let Some((_, distance)) = two_finger_geometry(&ev.touches) {
            // A second finger turns a pan into a pinch; drags and link drawing keep going.
            if matches!(self.mode(), GestureMode::Idle | GestureMode::Panning) {
                self.end();
                self.begin_pinch(distance);
            }
            return;
        }
        let [first] = ev.touches.as_slice() else { return };
        match &ev.target {
            PointerTarget::Note(id) => self.press_note(id, *first, notes, connections),
            PointerTarget::Control { note, control } => self.press_control(note, *control, notes),
            PointerTarget::Editor(id) => {
                notes.bring_to_front(id);
            }
            PointerTarget::Background => match self.mode() {
                GestureMode::Idle => self.begin_pan(*first),
                GestureMode::DrawingConnection => {
                    debug!("connection cancelled by background tap");
                    self.end();
                }
                _ => {}
            },
            PointerTarget::Chrome => {}
        }
    }

    pub fn on_touch_move(&mut self, ev: &TouchInput) {
        let Some(first) = ev.touches.first().copied() else { return };
        match self.session.as_mut() {
            Some(GestureSession::Pinch(pinch)) => {
                let Some((mid, distance)) = two_finger_geometry(&ev.touches) else { return };
                if pinch.anchor_distance < MIN_PINCH_DISTANCE {
                    if distance >= MIN_PINCH_DISTANCE {
                        pinch.anchor_distance = distance;
                        pinch.anchor_scale = self.camera.viewport().scale();
                        pinch.anchor_offset = self.camera.viewport().offset();
                    }
                    return;
                }
                let target = pinch.anchor_scale * distance / pinch.anchor_distance;
                let vp = self.camera.viewport_mut();
                let factor = target / vp.scale();
                vp.zoom_at(mid, factor);
            }
            Some(GestureSession::Pan(pan)) => {
                if ev.touches.len() == 1 {
                    let offset = pan.offset_for(first);
                    self.camera.viewport_mut().set_offset(offset);
                }
            }
            Some(GestureSession::Drag(_)) | Some(GestureSession::Connect(_)) => self.on_pointer_move(first),
            None => {}
        }
    }

    /// `ev.touches` lists the touches still down after the release.
    pub fn on_touch_end<N: NoteStore>(&mut self, ev: &TouchInput, notes: &mut N) {
        let remaining = ev.touches.len();
        if let Some(GestureSession::Pinch(pinch)) = &self.session {
            if remaining < 2 {
                let vp = self.camera.viewport();
                debug!(
                    from_scale = pinch.anchor_scale,
                    to_scale = vp.scale(),
                    from_offset = ?pinch.anchor_offset,
                    to_offset = ?vp.offset(),
                    "pinch finished"
                );
            }
        }
        match self.mode() {
            GestureMode::Pinching | GestureMode::Panning => match ev.touches.as_slice() {
                [] => {
                    self.end();
                }
                // Re-anchor on the finger that stayed so the pan continues from here.
                [only] => {
                    let only = *only;
                    self.end();
                    self.begin_pan(only);
                }
                _ => {}
            },
            GestureMode::DraggingNote if remaining == 0 => self.commit_drag(notes),
            _ => {}
        }
    }

    // ---------------- Keyboard & cleanup -----------------

    pub fn on_key_down(&mut self, ev: &KeyInput) {
        if ev.is_escape() {
            self.cancel_active_gesture();
        }
    }

    /// Returns to idle, discarding any uncommitted drag position or link line.
    pub fn cancel_active_gesture(&mut self) {
        if self.end().is_some() {
            debug!("gesture cancelled");
        }
    }

    /// One auto-pan timer tick; a no-op unless a drag is nudging the view.
    pub fn auto_pan_tick(&mut self) {
        let step = match &self.session {
            Some(GestureSession::Drag(DragSession { auto_pan: Some(ap), .. })) => {
                trace!(direction = ?ap.direction(), "auto-pan tick");
                ap.step()
            }
            _ => return,
        };
        self.camera.clear_active_zone();
        self.camera.viewport_mut().pan_by(step.0, step.1);
    }
}

#[cfg(test)]
mod tests {
    use super::super::autopan::PanDirection;
    use super::super::autopan::test_support::ManualScheduler;
    use super::*;
    use crate::config::{MAX_SCALE, MIN_SCALE};
    use crate::model::BoardState;
    use proptest::prelude::*;

    const VIEW: ViewportSize = ViewportSize::new(1000.0, 800.0);

    impl<S: Scheduler> BoardController<S> {
        fn auto_pan_direction(&self) -> Option<PanDirection> {
            match &self.session {
                Some(GestureSession::Drag(d)) => d.auto_pan.as_ref().map(AutoPan::direction),
                _ => None,
            }
        }
    }

    fn p(x: f64, y: f64) -> Position {
        Position::new(x, y)
    }

    fn controller() -> (BoardController<ManualScheduler>, ManualScheduler) {
        let sched = ManualScheduler::default();
        (BoardController::new(VIEW, sched.clone()), sched)
    }

    fn board_with_note() -> (BoardState, String) {
        let mut board = BoardState::default();
        let id = board.add_note(0.5, 0.5);
        (board, id)
    }

    fn mouse(target: PointerTarget, button: MouseButton, x: f64, y: f64) -> PointerInput {
        PointerInput { position: p(x, y), button, target }
    }

    fn touches(target: PointerTarget, pts: &[(f64, f64)]) -> TouchInput {
        TouchInput { touches: pts.iter().map(|&(x, y)| p(x, y)).collect(), target }
    }

    fn at_scale(c: &mut BoardController<ManualScheduler>, scale: f64, offset: Position) {
        c.camera.viewport_mut().set_transform(scale, offset);
    }

    #[test]
    fn wheel_zoom_from_point_eight() {
        let (mut c, _) = controller();
        at_scale(&mut c, 0.8, p(0.0, 0.0));
        c.on_wheel(WheelInput { position: p(400.0, 300.0), delta_y: -10.0 });
        assert!((c.viewport().scale() - 0.88).abs() < 1e-12);
        let o = c.viewport().offset();
        assert!((o.x - (400.0 - 400.0 * 1.1)).abs() < 1e-9);
        assert!((o.y - (300.0 - 300.0 * 1.1)).abs() < 1e-9);

        let mut scales = Vec::new();
        for _ in 0..12 {
            c.on_wheel(WheelInput { position: p(400.0, 300.0), delta_y: -10.0 });
            scales.push(c.viewport().scale());
        }
        // 0.8 * 1.1^10 > 2.0, so the ninth extra tick hits the cap and it stays there.
        assert!(scales[7] < MAX_SCALE);
        assert!(scales[8..].iter().all(|&s| s == MAX_SCALE));
        assert_eq!(c.mode(), GestureMode::Idle);
    }

    #[test]
    fn wheel_down_zooms_out() {
        let (mut c, _) = controller();
        at_scale(&mut c, 1.1, p(0.0, 0.0));
        c.on_wheel(WheelInput { position: p(0.0, 0.0), delta_y: 3.0 });
        assert!((c.viewport().scale() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn focus_then_wheel_or_pan_clears_active_zone() {
        let (mut c, _) = controller();
        let (mut board, _) = board_with_note();
        assert!(c.focus_zone("TASKS"));
        assert_eq!(c.active_zone(), Some("TASKS"));
        c.on_wheel(WheelInput { position: p(1.0, 1.0), delta_y: 1.0 });
        assert_eq!(c.active_zone(), None);

        c.focus_zone("DONE");
        let mut links = BoardState::default();
        c.on_pointer_down(&mouse(PointerTarget::Background, MouseButton::Middle, 10.0, 10.0), &mut board, &mut links);
        assert_eq!(c.active_zone(), None);
    }

    #[test]
    fn middle_button_pans_and_release_without_motion_keeps_offset() {
        let (mut c, _) = controller();
        let (mut board, _) = board_with_note();
        let mut links = BoardState::default();
        at_scale(&mut c, 1.0, p(-100.0, -50.0));
        let before = c.viewport().offset();
        c.on_pointer_down(&mouse(PointerTarget::Background, MouseButton::Middle, 300.0, 300.0), &mut board, &mut links);
        assert_eq!(c.mode(), GestureMode::Panning);
        c.on_pointer_up(&mut board);
        assert_eq!(c.mode(), GestureMode::Idle);
        assert_eq!(c.viewport().offset(), before);
    }

    #[test]
    fn pan_follows_pointer_and_clamps() {
        let (mut c, _) = controller();
        let (mut board, _) = board_with_note();
        let mut links = BoardState::default();
        at_scale(&mut c, 1.0, p(-100.0, -50.0));
        c.on_pointer_down(&mouse(PointerTarget::Background, MouseButton::Middle, 300.0, 300.0), &mut board, &mut links);
        c.on_pointer_move(p(320.0, 290.0));
        assert_eq!(c.viewport().offset(), p(-80.0, -60.0));
        c.on_pointer_move(p(5000.0, 300.0));
        assert_eq!(c.viewport().offset().x, 200.0);
    }

    #[test]
    fn middle_press_on_a_note_only_raises_it() {
        let (mut c, _) = controller();
        let (mut board, id) = board_with_note();
        let mut links = BoardState::default();
        let before = board.note(&id).and_then(|n| n.z_index);
        c.on_pointer_down(&mouse(PointerTarget::Note(id.clone()), MouseButton::Middle, 300.0, 300.0), &mut board, &mut links);
        assert_eq!(c.mode(), GestureMode::Idle);
        assert!(board.note(&id).and_then(|n| n.z_index) > before);
        c.on_pointer_down(&mouse(PointerTarget::Editor(id.clone()), MouseButton::Middle, 300.0, 300.0), &mut board, &mut links);
        assert_eq!(c.mode(), GestureMode::Idle);
    }

    #[test]
    fn primary_on_background_does_not_pan() {
        let (mut c, _) = controller();
        let (mut board, _) = board_with_note();
        let mut links = BoardState::default();
        c.on_pointer_down(&mouse(PointerTarget::Background, MouseButton::Primary, 10.0, 10.0), &mut board, &mut links);
        assert_eq!(c.mode(), GestureMode::Idle);
    }

    #[test]
    fn drag_commits_overlay_on_release() {
        let (mut c, _) = controller();
        let (mut board, id) = board_with_note();
        let mut links = BoardState::default();
        at_scale(&mut c, 1.0, p(0.0, 0.0));
        // Note top-left is (200, 175); grab it 10 units in.
        c.on_pointer_down(&mouse(PointerTarget::Note(id.clone()), MouseButton::Primary, 210.0, 185.0), &mut board, &mut links);
        assert_eq!(c.mode(), GestureMode::DraggingNote);
        assert_eq!(c.drag_overlay(), None);
        c.on_pointer_move(p(310.0, 235.0));
        assert_eq!(c.drag_overlay(), Some((id.as_str(), p(300.0, 225.0))));
        // Not committed while dragging.
        assert_eq!(board.note_position(&id), Some(p(200.0, 175.0)));
        c.on_pointer_up(&mut board);
        assert_eq!(board.note_position(&id), Some(p(300.0, 225.0)));
        assert_eq!(c.mode(), GestureMode::Idle);
        assert_eq!(c.drag_overlay(), None);
    }

    #[test]
    fn drag_start_raises_note() {
        let (mut c, _) = controller();
        let (mut board, id) = board_with_note();
        let other = board.add_note(0.1, 0.1);
        let mut links = BoardState::default();
        c.on_pointer_down(&mouse(PointerTarget::Note(id.clone()), MouseButton::Primary, 1.0, 1.0), &mut board, &mut links);
        let z = |b: &BoardState, n: &str| b.note(n).and_then(|n| n.z_index);
        assert!(z(&board, &id) > z(&board, &other));
    }

    #[test]
    fn release_without_motion_leaves_note_in_place() {
        let (mut c, _) = controller();
        let (mut board, id) = board_with_note();
        let mut links = BoardState::default();
        c.on_pointer_down(&mouse(PointerTarget::Note(id.clone()), MouseButton::Primary, 250.0, 250.0), &mut board, &mut links);
        c.on_pointer_up(&mut board);
        assert_eq!(board.note_position(&id), Some(p(200.0, 175.0)));
    }

    #[test]
    fn cancelled_drag_commits_nothing() {
        let (mut c, sched) = controller();
        let (mut board, id) = board_with_note();
        let mut links = BoardState::default();
        at_scale(&mut c, 1.0, p(0.0, 0.0));
        c.on_pointer_down(&mouse(PointerTarget::Note(id.clone()), MouseButton::Primary, 210.0, 185.0), &mut board, &mut links);
        c.on_pointer_move(p(10.0, 400.0));
        assert_eq!(sched.live(), 1);
        c.cancel_active_gesture();
        c.on_pointer_up(&mut board);
        assert_eq!(board.note_position(&id), Some(p(200.0, 175.0)));
        assert_eq!(sched.live(), 0);
        assert_eq!(c.mode(), GestureMode::Idle);
    }

    #[test]
    fn unknown_note_does_not_start_a_drag() {
        let (mut c, _) = controller();
        let (mut board, _) = board_with_note();
        let mut links = BoardState::default();
        c.on_pointer_down(&mouse(PointerTarget::Note("ghost".into()), MouseButton::Primary, 5.0, 5.0), &mut board, &mut links);
        assert_eq!(c.mode(), GestureMode::Idle);
    }

    #[test]
    fn editing_and_controls_raise_without_dragging() {
        let (mut c, _) = controller();
        let (mut board, id) = board_with_note();
        let mut links = BoardState::default();
        let z0 = board.note(&id).and_then(|n| n.z_index);
        c.on_pointer_down(&mouse(PointerTarget::Editor(id.clone()), MouseButton::Primary, 5.0, 5.0), &mut board, &mut links);
        c.on_pointer_down(
            &mouse(PointerTarget::Control { note: id.clone(), control: NoteControl::Delete }, MouseButton::Primary, 5.0, 5.0),
            &mut board,
            &mut links,
        );
        assert_eq!(c.mode(), GestureMode::Idle);
        assert!(board.note(&id).and_then(|n| n.z_index) > z0);
    }

    #[test]
    fn auto_pan_runs_one_timer_while_near_an_edge() {
        let (mut c, sched) = controller();
        let (mut board, id) = board_with_note();
        let mut links = BoardState::default();
        at_scale(&mut c, 1.0, p(-100.0, -100.0));
        c.on_pointer_down(&mouse(PointerTarget::Note(id.clone()), MouseButton::Primary, 150.0, 100.0), &mut board, &mut links);

        c.on_pointer_move(p(20.0, 400.0));
        c.on_pointer_move(p(25.0, 410.0));
        assert_eq!(sched.live(), 1);
        assert_eq!(sched.started(), 1);
        assert_eq!(c.auto_pan_direction(), Some(PanDirection::Left));

        c.auto_pan_tick();
        assert_eq!(c.viewport().offset(), p(-90.0, -100.0));

        // Switching edges keeps the same timer.
        c.on_pointer_move(p(500.0, 790.0));
        assert_eq!(c.auto_pan_direction(), Some(PanDirection::Down));
        assert_eq!(sched.started(), 1);

        c.on_pointer_move(p(500.0, 400.0));
        assert_eq!(sched.live(), 0);
        assert_eq!(c.auto_pan_direction(), None);
        c.auto_pan_tick();
        assert_eq!(c.viewport().offset(), p(-90.0, -100.0));
    }

    #[test]
    fn ending_a_drag_stops_auto_pan_even_at_the_edge() {
        let (mut c, sched) = controller();
        let (mut board, id) = board_with_note();
        let mut links = BoardState::default();
        c.on_pointer_down(&mouse(PointerTarget::Note(id), MouseButton::Primary, 300.0, 300.0), &mut board, &mut links);
        c.on_pointer_move(p(990.0, 400.0));
        assert_eq!(sched.live(), 1);
        c.on_pointer_up(&mut board);
        assert_eq!(sched.live(), 0);
        let before = c.viewport().offset();
        c.auto_pan_tick();
        assert_eq!(c.viewport().offset(), before);
    }

    #[test]
    fn escape_ends_auto_panning_drag() {
        let (mut c, sched) = controller();
        let (mut board, id) = board_with_note();
        let mut links = BoardState::default();
        c.on_pointer_down(&mouse(PointerTarget::Note(id), MouseButton::Primary, 300.0, 300.0), &mut board, &mut links);
        c.on_pointer_move(p(500.0, 10.0));
        c.on_key_down(&KeyInput { key: "Escape".into() });
        assert_eq!(sched.live(), 0);
        assert_eq!(c.mode(), GestureMode::Idle);
    }

    #[test]
    fn link_then_click_other_note_connects() {
        let (mut c, _) = controller();
        let (mut board, a) = board_with_note();
        let b = board.add_note(0.1, 0.1);
        let mut links = board.clone();
        let link = PointerTarget::Control { note: a.clone(), control: NoteControl::Link };
        c.on_pointer_down(&mouse(link, MouseButton::Primary, 1.0, 1.0), &mut board, &mut links);
        assert_eq!(c.mode(), GestureMode::DrawingConnection);
        assert_eq!(c.connecting(), Some((a.as_str(), None)));

        at_scale(&mut c, 2.0, p(0.0, 0.0));
        c.on_pointer_move(p(100.0, 60.0));
        assert_eq!(c.connecting(), Some((a.as_str(), Some(p(50.0, 30.0)))));

        let z_before = board.note(&b).and_then(|n| n.z_index);
        c.on_pointer_down(&mouse(PointerTarget::Note(b.clone()), MouseButton::Primary, 1.0, 1.0), &mut board, &mut links);
        assert_eq!(c.mode(), GestureMode::Idle);
        assert_eq!(links.connections.len(), 1);
        assert_eq!(links.connections[0].start_note_id, a);
        assert_eq!(links.connections[0].end_note_id, b);
        // Raised, but no drag opened.
        assert!(board.note(&b).and_then(|n| n.z_index) > z_before);
        assert_eq!(c.drag_overlay(), None);
    }

    #[test]
    fn clicking_the_source_note_ends_without_a_link() {
        let (mut c, _) = controller();
        let (mut board, a) = board_with_note();
        let mut links = board.clone();
        let link = PointerTarget::Control { note: a.clone(), control: NoteControl::Link };
        c.on_pointer_down(&mouse(link, MouseButton::Primary, 1.0, 1.0), &mut board, &mut links);
        c.on_pointer_down(&mouse(PointerTarget::Note(a), MouseButton::Primary, 1.0, 1.0), &mut board, &mut links);
        assert_eq!(c.mode(), GestureMode::Idle);
        assert!(links.connections.is_empty());
    }

    #[test]
    fn background_click_or_escape_cancels_connection() {
        let (mut c, _) = controller();
        let (mut board, a) = board_with_note();
        let mut links = board.clone();
        let link = PointerTarget::Control { note: a.clone(), control: NoteControl::Link };

        c.on_pointer_down(&mouse(link.clone(), MouseButton::Primary, 1.0, 1.0), &mut board, &mut links);
        c.on_pointer_move(p(10.0, 10.0));
        c.on_pointer_down(&mouse(PointerTarget::Background, MouseButton::Primary, 1.0, 1.0), &mut board, &mut links);
        assert_eq!(c.mode(), GestureMode::Idle);
        assert_eq!(c.connecting(), None);

        c.on_pointer_down(&mouse(link, MouseButton::Primary, 1.0, 1.0), &mut board, &mut links);
        c.on_key_down(&KeyInput { key: "a".into() });
        assert_eq!(c.mode(), GestureMode::DrawingConnection);
        c.on_key_down(&KeyInput { key: "Escape".into() });
        assert_eq!(c.mode(), GestureMode::Idle);
        assert!(links.connections.is_empty());
    }

    #[test]
    fn connection_mode_blocks_pan() {
        let (mut c, _) = controller();
        let (mut board, a) = board_with_note();
        let mut links = board.clone();
        let link = PointerTarget::Control { note: a, control: NoteControl::Link };
        c.on_pointer_down(&mouse(link, MouseButton::Primary, 1.0, 1.0), &mut board, &mut links);
        c.on_pointer_down(&mouse(PointerTarget::Background, MouseButton::Middle, 1.0, 1.0), &mut board, &mut links);
        assert_eq!(c.mode(), GestureMode::DrawingConnection);
    }

    #[test]
    fn chrome_input_is_ignored() {
        let (mut c, _) = controller();
        let (mut board, _) = board_with_note();
        let mut links = BoardState::default();
        c.on_pointer_down(&mouse(PointerTarget::Chrome, MouseButton::Middle, 1.0, 1.0), &mut board, &mut links);
        c.on_touch_start(&touches(PointerTarget::Chrome, &[(1.0, 1.0)]), &mut board, &mut links);
        assert_eq!(c.mode(), GestureMode::Idle);
    }

    #[test]
    fn stray_moves_and_releases_are_no_ops() {
        let (mut c, _) = controller();
        let (mut board, _) = board_with_note();
        let before = *c.viewport();
        c.on_pointer_move(p(10.0, 10.0));
        c.on_pointer_up(&mut board);
        c.on_touch_move(&touches(PointerTarget::Background, &[]));
        c.on_touch_move(&touches(PointerTarget::Background, &[(3.0, 3.0)]));
        c.on_touch_end(&touches(PointerTarget::Background, &[]), &mut board);
        c.cancel_active_gesture();
        assert_eq!(*c.viewport(), before);
        assert_eq!(c.mode(), GestureMode::Idle);
    }

    #[test]
    fn single_touch_on_background_pans() {
        let (mut c, _) = controller();
        let (mut board, _) = board_with_note();
        let mut links = BoardState::default();
        at_scale(&mut c, 1.0, p(-100.0, -100.0));
        c.on_touch_start(&touches(PointerTarget::Background, &[(200.0, 200.0)]), &mut board, &mut links);
        assert_eq!(c.mode(), GestureMode::Panning);
        c.on_touch_move(&touches(PointerTarget::Background, &[(230.0, 180.0)]));
        assert_eq!(c.viewport().offset(), p(-70.0, -120.0));
        c.on_touch_end(&touches(PointerTarget::Background, &[]), &mut board);
        assert_eq!(c.mode(), GestureMode::Idle);
    }

    #[test]
    fn tapping_a_note_keeps_the_focused_zone() {
        let (mut c, _) = controller();
        let (mut board, id) = board_with_note();
        let mut links = BoardState::default();
        assert!(c.focus_zone("TASKS"));
        c.on_touch_start(&touches(PointerTarget::Editor(id.clone()), &[(200.0, 200.0)]), &mut board, &mut links);
        assert_eq!(c.active_zone(), Some("TASKS"));
        assert_eq!(c.mode(), GestureMode::Idle);
        let control = PointerTarget::Control { note: id.clone(), control: NoteControl::Palette };
        c.on_touch_start(&touches(control, &[(200.0, 200.0)]), &mut board, &mut links);
        assert_eq!(c.active_zone(), Some("TASKS"));
        // Starting a drag is a manual move and drops the focus.
        c.on_touch_start(&touches(PointerTarget::Note(id), &[(200.0, 200.0)]), &mut board, &mut links);
        assert_eq!(c.mode(), GestureMode::DraggingNote);
        assert_eq!(c.active_zone(), None);
    }

    #[test]
    fn pinch_halving_distance_halves_scale() {
        let (mut c, _) = controller();
        let (mut board, _) = board_with_note();
        let mut links = BoardState::default();
        at_scale(&mut c, 1.0, p(-100.0, -100.0));
        c.on_touch_start(&touches(PointerTarget::Background, &[(450.0, 400.0), (550.0, 400.0)]), &mut board, &mut links);
        assert_eq!(c.mode(), GestureMode::Pinching);
        c.on_touch_move(&touches(PointerTarget::Background, &[(475.0, 400.0), (525.0, 400.0)]));
        assert!((c.viewport().scale() - 0.5).abs() < 1e-12);

        // Pinching further in stops at the floor.
        c.on_touch_move(&touches(PointerTarget::Background, &[(499.0, 400.0), (501.0, 400.0)]));
        assert_eq!(c.viewport().scale(), MIN_SCALE);
    }

    #[test]
    fn pinch_keeps_midpoint_world_point_when_unclamped() {
        let (mut c, _) = controller();
        let (mut board, _) = board_with_note();
        let mut links = BoardState::default();
        at_scale(&mut c, 1.0, p(-100.0, -100.0));
        let mid = p(500.0, 400.0);
        let before = c.viewport().to_world(mid);
        c.on_touch_start(&touches(PointerTarget::Background, &[(450.0, 400.0), (550.0, 400.0)]), &mut board, &mut links);
        c.on_touch_move(&touches(PointerTarget::Background, &[(440.0, 400.0), (560.0, 400.0)]));
        assert!((c.viewport().scale() - 1.2).abs() < 1e-12);
        let after = c.viewport().to_world(mid);
        assert!((before.x - after.x).abs() < 1e-9 && (before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn second_finger_turns_pan_into_pinch_and_lifting_one_resumes_pan() {
        let (mut c, _) = controller();
        let (mut board, _) = board_with_note();
        let mut links = BoardState::default();
        at_scale(&mut c, 1.0, p(-100.0, -100.0));
        c.on_touch_start(&touches(PointerTarget::Background, &[(400.0, 400.0)]), &mut board, &mut links);
        c.on_touch_start(&touches(PointerTarget::Background, &[(400.0, 400.0), (600.0, 400.0)]), &mut board, &mut links);
        assert_eq!(c.mode(), GestureMode::Pinching);

        c.on_touch_end(&touches(PointerTarget::Background, &[(600.0, 400.0)]), &mut board);
        assert_eq!(c.mode(), GestureMode::Panning);
        // Re-anchored on the remaining finger: no jump.
        let before = c.viewport().offset();
        c.on_touch_move(&touches(PointerTarget::Background, &[(600.0, 400.0)]));
        assert_eq!(c.viewport().offset(), before);
        c.on_touch_move(&touches(PointerTarget::Background, &[(610.0, 400.0)]));
        assert_eq!(c.viewport().offset(), p(before.x + 10.0, before.y));

        c.on_touch_end(&touches(PointerTarget::Background, &[]), &mut board);
        assert_eq!(c.mode(), GestureMode::Idle);
    }

    #[test]
    fn degenerate_pinch_waits_for_usable_distance() {
        let (mut c, _) = controller();
        let (mut board, _) = board_with_note();
        let mut links = BoardState::default();
        at_scale(&mut c, 1.0, p(-100.0, -100.0));
        c.on_touch_start(&touches(PointerTarget::Background, &[(500.0, 400.0), (500.0, 400.0)]), &mut board, &mut links);
        c.on_touch_move(&touches(PointerTarget::Background, &[(500.0, 400.0), (501.0, 400.0)]));
        assert_eq!(c.viewport().scale(), 1.0);
        // First usable distance anchors; the next one scales relative to it.
        c.on_touch_move(&touches(PointerTarget::Background, &[(450.0, 400.0), (550.0, 400.0)]));
        assert_eq!(c.viewport().scale(), 1.0);
        c.on_touch_move(&touches(PointerTarget::Background, &[(400.0, 400.0), (600.0, 400.0)]));
        assert!((c.viewport().scale() - 2.0).abs() < 1e-12);
        assert!(c.viewport().scale().is_finite());
    }

    #[test]
    fn touch_drag_commits_on_last_finger_up() {
        let (mut c, sched) = controller();
        let (mut board, id) = board_with_note();
        let mut links = BoardState::default();
        at_scale(&mut c, 1.0, p(0.0, 0.0));
        c.on_touch_start(&touches(PointerTarget::Note(id.clone()), &[(200.0, 175.0)]), &mut board, &mut links);
        assert_eq!(c.mode(), GestureMode::DraggingNote);
        c.on_touch_move(&touches(PointerTarget::Note(id.clone()), &[(250.0, 200.0)]));
        c.on_touch_move(&touches(PointerTarget::Note(id.clone()), &[(5.0, 200.0)]));
        assert_eq!(sched.live(), 1);
        c.on_touch_move(&touches(PointerTarget::Note(id.clone()), &[(260.0, 210.0)]));
        assert_eq!(sched.live(), 0);
        c.on_touch_end(&touches(PointerTarget::Note(id.clone()), &[]), &mut board);
        assert_eq!(board.note_position(&id), Some(p(260.0, 210.0)));
        assert_eq!(c.mode(), GestureMode::Idle);
    }

    #[test]
    fn tap_on_background_cancels_connection_instead_of_panning() {
        let (mut c, _) = controller();
        let (mut board, a) = board_with_note();
        let mut links = board.clone();
        let link = PointerTarget::Control { note: a, control: NoteControl::Link };
        c.on_touch_start(&touches(link, &[(1.0, 1.0)]), &mut board, &mut links);
        assert_eq!(c.mode(), GestureMode::DrawingConnection);
        c.on_touch_start(&touches(PointerTarget::Background, &[(1.0, 1.0)]), &mut board, &mut links);
        assert_eq!(c.mode(), GestureMode::Idle);
    }

    #[test]
    fn resize_reclamps() {
        let (mut c, _) = controller();
        at_scale(&mut c, 1.0, p(200.0, 160.0));
        c.resize(ViewportSize::new(500.0, 400.0));
        assert_eq!(c.viewport().offset(), p(100.0, 80.0));
    }

    #[derive(Clone, Debug)]
    enum Step {
        Wheel(f64, f64, bool),
        TwoDown(f64, f64, f64, f64),
        TwoMove(f64, f64, f64, f64),
        OneUp(f64, f64),
        AllUp,
    }

    fn step() -> impl Strategy<Value = Step> {
        let c = 0.0f64..1000.0;
        prop_oneof![
            (c.clone(), c.clone(), any::<bool>()).prop_map(|(x, y, up)| Step::Wheel(x, y, up)),
            (c.clone(), c.clone(), c.clone(), c.clone()).prop_map(|(a, b, x, y)| Step::TwoDown(a, b, x, y)),
            (c.clone(), c.clone(), c.clone(), c.clone()).prop_map(|(a, b, x, y)| Step::TwoMove(a, b, x, y)),
            (c.clone(), c).prop_map(|(x, y)| Step::OneUp(x, y)),
            Just(Step::AllUp),
        ]
    }

    proptest! {
        #[test]
        fn scale_and_offset_stay_valid_under_wheel_and_pinch(steps in proptest::collection::vec(step(), 1..60)) {
            let (mut c, _) = controller();
            let mut board = BoardState::default();
            let mut links = BoardState::default();
            for s in steps {
                match s {
                    Step::Wheel(x, y, up) => c.on_wheel(WheelInput { position: p(x, y), delta_y: if up { -1.0 } else { 1.0 } }),
                    Step::TwoDown(a, b, x, y) => c.on_touch_start(&touches(PointerTarget::Background, &[(a, b), (x, y)]), &mut board, &mut links),
                    Step::TwoMove(a, b, x, y) => c.on_touch_move(&touches(PointerTarget::Background, &[(a, b), (x, y)])),
                    Step::OneUp(x, y) => c.on_touch_end(&touches(PointerTarget::Background, &[(x, y)]), &mut board),
                    Step::AllUp => c.on_touch_end(&touches(PointerTarget::Background, &[]), &mut board),
                }
                let vp = c.viewport();
                prop_assert!(vp.scale() >= MIN_SCALE && vp.scale() <= MAX_SCALE);
                prop_assert!(vp.offset().x.is_finite() && vp.offset().y.is_finite());
                prop_assert_eq!(crate::state::geometry::clamp_offset(vp.offset(), vp.scale(), VIEW), vp.offset());
            }
        }
    }
}
