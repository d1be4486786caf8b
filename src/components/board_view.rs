use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Element, EventTarget, HtmlElement, KeyboardEvent, MouseEvent, TouchEvent, TouchList, WheelEvent};
use yew::prelude::*;

use crate::config::{DEFAULT_ZONE, FALLBACK_VIEWPORT_HEIGHT, FALLBACK_VIEWPORT_WIDTH};
use crate::model::{BoardAction, BoardState, CORKBOARD, Note, Position, WORLD_HEIGHT, WORLD_WIDTH, ZONES};
use crate::state::input::{KeyInput, MouseButton, NoteControl, PointerInput, PointerTarget, TouchInput, WheelInput};
use crate::state::store::{ConnectionStore, NoteStore};
use crate::state::{BoardController, GestureMode, IntervalScheduler, Viewport, ViewportSize};

use super::{
    add_note_button::AddNoteButton, connecting_banner::ConnectingBanner, connections::Connections,
    customization_panel::CustomizationPanel, note_card::NoteCard, zone_navigator::ZoneNavigator,
};

type Controller = BoardController<IntervalScheduler>;

const CORKBOARD_TEXTURE: &str = r#"url("data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='100' height='100'%3E%3Cfilter id='n'%3E%3CfeTurbulence type='fractalNoise' baseFrequency='0.65' numOctaves='3' stitchTiles='stitch'/%3E%3C/filter%3E%3Crect width='100%25' height='100%25' fill='%23D2B48C'/%3E%3Crect width='100%25' height='100%25' filter='url(%23n)' opacity='0.15'/%3E%3C/svg%3E")"#;

/// CSS `background` declarations for a palette entry.
pub fn board_background(color: &str) -> String {
    if color == CORKBOARD {
        format!("background-color:#d2b48c; background-image:{CORKBOARD_TEXTURE};")
    } else {
        format!("background:{color};")
    }
}

#[derive(Properties, PartialEq, Clone)]
pub struct BoardViewProps {
    pub board: UseReducerHandle<BoardState>,
    pub on_clear_board: Callback<()>,
}

/// Reads the last rendered board and queues writes until the controller
/// borrow is released, so a dispatch never re-enters a render mid-gesture.
struct QueuedStore {
    board: UseReducerHandle<BoardState>,
    queued: Vec<BoardAction>,
}

impl QueuedStore {
    fn new(board: UseReducerHandle<BoardState>) -> Self {
        Self { board, queued: Vec::new() }
    }

    fn flush(self) {
        let QueuedStore { board, queued } = self;
        for action in queued {
            board.dispatch(action);
        }
    }
}

impl NoteStore for QueuedStore {
    fn notes(&self) -> &[Note] {
        &self.board.notes
    }

    fn update_note_position(&mut self, id: &str, position: Position) {
        self.queued.push(BoardAction::UpdatePosition { id: id.to_string(), position });
    }

    /// The token is the one the reducer will hand out once the queue flushes.
    fn bring_to_front(&mut self, id: &str) -> Option<u32> {
        self.board.note(id)?;
        let pending = self.queued.iter().filter(|a| matches!(a, BoardAction::BringToFront { .. })).count() as u32;
        self.queued.push(BoardAction::BringToFront { id: id.to_string() });
        Some(self.board.next_z + pending)
    }
}

impl ConnectionStore for QueuedStore {
    fn create_connection(&mut self, source: &str, target: &str) {
        self.queued.push(BoardAction::CreateConnection { source: source.to_string(), target: target.to_string() });
    }
}

/// Runs `f` against the controller with fresh stores, then applies the writes.
fn drive(
    controller: &RefCell<Option<Controller>>,
    board: &RefCell<UseReducerHandle<BoardState>>,
    f: impl FnOnce(&mut Controller, &mut QueuedStore, &mut QueuedStore),
) {
    let mut notes = QueuedStore::new(board.borrow().clone());
    let mut links = QueuedStore::new(board.borrow().clone());
    if let Some(ctl) = controller.borrow_mut().as_mut() {
        f(ctl, &mut notes, &mut links);
    }
    notes.flush();
    links.flush();
}

fn is_active(controller: &RefCell<Option<Controller>>) -> bool {
    controller.borrow().as_ref().is_some_and(|c| c.mode() != GestureMode::Idle)
}

fn measure(el: &Element) -> ViewportSize {
    let (w, h) = (el.client_width() as f64, el.client_height() as f64);
    if w > 0.0 && h > 0.0 {
        ViewportSize::new(w, h)
    } else {
        ViewportSize::new(FALLBACK_VIEWPORT_WIDTH, FALLBACK_VIEWPORT_HEIGHT)
    }
}

fn local_point(el: &Element, client_x: i32, client_y: i32) -> Position {
    let rect = el.get_bounding_client_rect();
    Position::new(client_x as f64 - rect.left(), client_y as f64 - rect.top())
}

fn touch_points(el: &Element, list: &TouchList) -> Vec<Position> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .map(|t| local_point(el, t.client_x(), t.client_y()))
        .collect()
}

fn closest(el: &Element, selector: &str) -> Option<Element> {
    el.closest(selector).ok().flatten()
}

/// What the DOM says about the element under the pointer.
#[derive(Default)]
struct TargetTags {
    chrome: bool,
    note: Option<String>,
    control: Option<NoteControl>,
    /// Inside a textarea or a note that is being edited.
    editing: bool,
}

fn classify(tags: TargetTags) -> PointerTarget {
    if tags.chrome {
        return PointerTarget::Chrome;
    }
    let Some(note) = tags.note else { return PointerTarget::Background };
    match tags.control {
        Some(control) => PointerTarget::Control { note, control },
        None if tags.editing => PointerTarget::Editor(note),
        None => PointerTarget::Note(note),
    }
}

/// Classifies an event target by walking up to the nearest tagged element.
fn resolve_target(target: Option<EventTarget>) -> PointerTarget {
    let Some(el) = target.and_then(|t| t.dyn_into::<Element>().ok()) else {
        return PointerTarget::Background;
    };
    classify(TargetTags {
        chrome: closest(&el, "[data-chrome]").is_some(),
        note: closest(&el, "[data-note-id]").and_then(|n| n.get_attribute("data-note-id")),
        control: closest(&el, "[data-control]")
            .and_then(|c| c.get_attribute("data-control"))
            .and_then(|raw| NoteControl::parse(&raw)),
        editing: closest(&el, "[data-editing]").is_some() || closest(&el, "textarea").is_some(),
    })
}

fn listen<T: ?Sized>(target: &EventTarget, event: &'static str, cb: &Closure<T>) {
    if let Err(e) = target.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref()) {
        warn!(event, error = ?e, "could not attach listener");
    }
}

fn unlisten<T: ?Sized>(target: &EventTarget, event: &'static str, cb: &Closure<T>) {
    let _ = target.remove_event_listener_with_callback(event, cb.as_ref().unchecked_ref());
}

/// What one render needs from the controller.
struct Frame {
    viewport: Viewport,
    active_zone: Option<&'static str>,
    mode: GestureMode,
    dragged: Option<(String, Position)>,
    pending: Option<(String, Option<Position>)>,
}

impl Frame {
    fn capture(ctl: &Controller) -> Self {
        Frame {
            viewport: *ctl.viewport(),
            active_zone: ctl.active_zone(),
            mode: ctl.mode(),
            dragged: ctl.drag_overlay().map(|(id, p)| (id.to_string(), p)),
            pending: ctl.connecting().map(|(id, p)| (id.to_string(), p)),
        }
    }

    fn before_mount() -> Self {
        Frame {
            viewport: Viewport::new(ViewportSize::new(FALLBACK_VIEWPORT_WIDTH, FALLBACK_VIEWPORT_HEIGHT)),
            active_zone: None,
            mode: GestureMode::Idle,
            dragged: None,
            pending: None,
        }
    }
}

#[function_component(BoardView)]
pub fn board_view(props: &BoardViewProps) -> Html {
    let board_ref = use_node_ref();
    let controller = use_mut_ref(|| None::<Controller>);
    let board_handle = use_mut_ref(|| props.board.clone());
    let panel_open = use_state(|| false);
    let redraw = use_force_update();

    // Effect: keep the handle the listeners read from current
    {
        let board_handle = board_handle.clone();
        let current = props.board.clone();
        use_effect_with(props.board.version, move |_| {
            *board_handle.borrow_mut() = current;
            || ()
        });
    }

    {
        let board_ref = board_ref.clone();
        let controller = controller.clone();
        let board_handle = board_handle.clone();
        let redraw = redraw.clone();

        use_effect_with((), move |_| {
            let window = web_sys::window().expect("no global `window` exists");
            let board_el: HtmlElement = board_ref
                .cast::<HtmlElement>()
                .expect("board_ref not attached to an element");

            let on_tick: Rc<dyn Fn()> = {
                let weak = Rc::downgrade(&controller);
                let redraw = redraw.clone();
                Rc::new(move || {
                    let Some(cell) = weak.upgrade() else { return };
                    if let Some(ctl) = cell.borrow_mut().as_mut() {
                        ctl.auto_pan_tick();
                    }
                    redraw.force_update();
                })
            };
            let mut ctl = BoardController::new(measure(&board_el), IntervalScheduler::new(on_tick));
            ctl.focus_zone(DEFAULT_ZONE);
            *controller.borrow_mut() = Some(ctl);
            debug!("board mounted");
            redraw.force_update();

            let mousedown_cb = {
                let el = board_el.clone();
                let controller = controller.clone();
                let board_handle = board_handle.clone();
                let redraw = redraw.clone();
                Closure::wrap(Box::new(move |e: MouseEvent| {
                    let input = PointerInput {
                        position: local_point(&el, e.client_x(), e.client_y()),
                        button: MouseButton::from_dom(e.button()),
                        target: resolve_target(e.target()),
                    };
                    if input.button == MouseButton::Middle {
                        e.prevent_default();
                    }
                    drive(&controller, &board_handle, |c, notes, links| c.on_pointer_down(&input, notes, links));
                    redraw.force_update();
                }) as Box<dyn FnMut(_)>)
            };
            listen(&board_el, "mousedown", &mousedown_cb);

            // Move and release go on the window so a drag survives leaving a note.
            let mousemove_cb = {
                let el = board_el.clone();
                let controller = controller.clone();
                let redraw = redraw.clone();
                Closure::wrap(Box::new(move |e: MouseEvent| {
                    if !is_active(&controller) {
                        return;
                    }
                    let at = local_point(&el, e.client_x(), e.client_y());
                    if let Some(ctl) = controller.borrow_mut().as_mut() {
                        ctl.on_pointer_move(at);
                    }
                    redraw.force_update();
                }) as Box<dyn FnMut(_)>)
            };
            listen(&window, "mousemove", &mousemove_cb);

            let mouseup_cb = {
                let controller = controller.clone();
                let board_handle = board_handle.clone();
                let redraw = redraw.clone();
                Closure::wrap(Box::new(move |_e: MouseEvent| {
                    if !is_active(&controller) {
                        return;
                    }
                    drive(&controller, &board_handle, |c, notes, _| c.on_pointer_up(notes));
                    redraw.force_update();
                }) as Box<dyn FnMut(_)>)
            };
            listen(&window, "mouseup", &mouseup_cb);

            let wheel_cb = {
                let el = board_el.clone();
                let controller = controller.clone();
                let redraw = redraw.clone();
                Closure::wrap(Box::new(move |e: WheelEvent| {
                    if resolve_target(e.target()) == PointerTarget::Chrome {
                        return;
                    }
                    e.prevent_default();
                    let input = WheelInput { position: local_point(&el, e.client_x(), e.client_y()), delta_y: e.delta_y() };
                    if let Some(ctl) = controller.borrow_mut().as_mut() {
                        ctl.on_wheel(input);
                    }
                    redraw.force_update();
                }) as Box<dyn FnMut(_)>)
            };
            listen(&board_el, "wheel", &wheel_cb);

            let contextmenu_cb = {
                Closure::wrap(Box::new(move |e: web_sys::Event| {
                    e.prevent_default();
                }) as Box<dyn FnMut(_)>)
            };
            listen(&board_el, "contextmenu", &contextmenu_cb);

            let keydown_cb = {
                let controller = controller.clone();
                let redraw = redraw.clone();
                Closure::wrap(Box::new(move |e: KeyboardEvent| {
                    let input = KeyInput { key: e.key() };
                    if !input.is_escape() {
                        return;
                    }
                    if let Some(ctl) = controller.borrow_mut().as_mut() {
                        ctl.on_key_down(&input);
                    }
                    redraw.force_update();
                }) as Box<dyn FnMut(_)>)
            };
            listen(&window, "keydown", &keydown_cb);

            // Blur, leaving the board and cancelled touches all drop the gesture uncommitted.
            let cancel_cb = {
                let controller = controller.clone();
                let redraw = redraw.clone();
                Closure::wrap(Box::new(move |_e: web_sys::Event| {
                    if !is_active(&controller) {
                        return;
                    }
                    if let Some(ctl) = controller.borrow_mut().as_mut() {
                        ctl.cancel_active_gesture();
                    }
                    redraw.force_update();
                }) as Box<dyn FnMut(_)>)
            };
            listen(&window, "blur", &cancel_cb);
            listen(&board_el, "mouseleave", &cancel_cb);
            listen(&board_el, "touchcancel", &cancel_cb);

            let resize_cb = {
                let el = board_el.clone();
                let controller = controller.clone();
                let redraw = redraw.clone();
                Closure::wrap(Box::new(move |_e: web_sys::Event| {
                    if let Some(ctl) = controller.borrow_mut().as_mut() {
                        ctl.resize(measure(&el));
                    }
                    redraw.force_update();
                }) as Box<dyn FnMut(_)>)
            };
            listen(&window, "resize", &resize_cb);

            // Touch
            let touch_start_cb = {
                let el = board_el.clone();
                let controller = controller.clone();
                let board_handle = board_handle.clone();
                let redraw = redraw.clone();
                Closure::wrap(Box::new(move |e: TouchEvent| {
                    let input = TouchInput { touches: touch_points(&el, &e.touches()), target: resolve_target(e.target()) };
                    // Notes and panels keep their default so taps still become clicks.
                    if input.target == PointerTarget::Background {
                        e.prevent_default();
                    }
                    drive(&controller, &board_handle, |c, notes, links| c.on_touch_start(&input, notes, links));
                    redraw.force_update();
                }) as Box<dyn FnMut(_)>)
            };
            listen(&board_el, "touchstart", &touch_start_cb);

            let touch_move_cb = {
                let el = board_el.clone();
                let controller = controller.clone();
                let redraw = redraw.clone();
                Closure::wrap(Box::new(move |e: TouchEvent| {
                    if !is_active(&controller) {
                        return;
                    }
                    e.prevent_default();
                    let input = TouchInput { touches: touch_points(&el, &e.touches()), target: PointerTarget::Background };
                    if let Some(ctl) = controller.borrow_mut().as_mut() {
                        ctl.on_touch_move(&input);
                    }
                    redraw.force_update();
                }) as Box<dyn FnMut(_)>)
            };
            listen(&board_el, "touchmove", &touch_move_cb);

            let touch_end_cb = {
                let el = board_el.clone();
                let controller = controller.clone();
                let board_handle = board_handle.clone();
                let redraw = redraw.clone();
                Closure::wrap(Box::new(move |e: TouchEvent| {
                    if !is_active(&controller) {
                        return;
                    }
                    let input = TouchInput { touches: touch_points(&el, &e.touches()), target: PointerTarget::Background };
                    drive(&controller, &board_handle, |c, notes, _| c.on_touch_end(&input, notes));
                    redraw.force_update();
                }) as Box<dyn FnMut(_)>)
            };
            listen(&board_el, "touchend", &touch_end_cb);

            // Cleanup
            move || {
                unlisten(&board_el, "mousedown", &mousedown_cb);
                unlisten(&window, "mousemove", &mousemove_cb);
                unlisten(&window, "mouseup", &mouseup_cb);
                unlisten(&board_el, "wheel", &wheel_cb);
                unlisten(&board_el, "contextmenu", &contextmenu_cb);
                unlisten(&window, "keydown", &keydown_cb);
                unlisten(&window, "blur", &cancel_cb);
                unlisten(&board_el, "mouseleave", &cancel_cb);
                unlisten(&board_el, "touchcancel", &cancel_cb);
                unlisten(&window, "resize", &resize_cb);
                unlisten(&board_el, "touchstart", &touch_start_cb);
                unlisten(&board_el, "touchmove", &touch_move_cb);
                unlisten(&board_el, "touchend", &touch_end_cb);
                // Dropping the controller also stops a running auto-pan timer.
                controller.borrow_mut().take();
            }
        });
    }

    let frame = controller.borrow().as_ref().map(Frame::capture).unwrap_or_else(Frame::before_mount);
    let board = &*props.board;
    let vp = frame.viewport;

    let focus = {
        let controller = controller.clone();
        let redraw = redraw.clone();
        move |zone: &'static str| {
            if let Some(ctl) = controller.borrow_mut().as_mut() {
                ctl.focus_zone(zone);
            }
            redraw.force_update();
        }
    };
    let on_navigate = Callback::from(focus.clone());
    let on_add = {
        let handle = props.board.clone();
        Callback::from(move |_| {
            handle.dispatch(BoardAction::AddNote { fx: js_sys::Math::random(), fy: js_sys::Math::random() });
            focus(DEFAULT_ZONE);
        })
    };
    let on_default_color = {
        let handle = props.board.clone();
        Callback::from(move |color: String| handle.dispatch(BoardAction::SetDefaultNoteColor(color)))
    };
    let on_customize = {
        let handle = props.board.clone();
        Callback::from(move |c| handle.dispatch(BoardAction::SetCustomization(c)))
    };
    let on_note_action = {
        let handle = props.board.clone();
        Callback::from(move |a: BoardAction| handle.dispatch(a))
    };
    let toggle_panel = {
        let panel_open = panel_open.clone();
        Callback::from(move |_| panel_open.set(!*panel_open))
    };
    let close_panel = {
        let panel_open = panel_open.clone();
        Callback::from(move |_| panel_open.set(false))
    };

    let corkboard = board.customization.board_color == CORKBOARD;
    let (zone_border, zone_label) = if corkboard { ("#4b5563", "#374151") } else { ("#9ca3af", "#9ca3af") };
    let zones = ZONES.iter().map(|zone| {
        let b = zone.bounds;
        html! {<div key={zone.id} style={format!("position:absolute; left:{}px; top:{}px; width:{}px; height:{}px; pointer-events:none;", b.x, b.y, b.width, b.height)}>
            <div style={format!("width:100%; height:100%; box-sizing:border-box; border:2px dashed {zone_border}; border-radius:12px;")}></div>
            <div style={format!("position:absolute; bottom:-32px; left:50%; transform:translateX(-50%); font:bold 24px monospace; color:{zone_label}; white-space:nowrap; user-select:none;")}>
                { zone.name }
            </div>
        </div>}
    });
    let connecting = frame.pending.is_some();
    let notes = board.notes.iter().map(|note| {
        let overlay = frame.dragged.as_ref().filter(|(id, _)| *id == note.id).map(|(_, p)| *p);
        html! { <NoteCard key={note.id.clone()} note={note.clone()} {overlay} {connecting} on_action={on_note_action.clone()} /> }
    });

    let cursor = match frame.mode {
        GestureMode::Panning | GestureMode::Pinching | GestureMode::DraggingNote => "grabbing",
        GestureMode::DrawingConnection => "crosshair",
        GestureMode::Idle => "default",
    };
    let world_style = format!(
        "position:absolute; top:0; left:0; width:{WORLD_WIDTH}px; height:{WORLD_HEIGHT}px; transform-origin:0 0; transform:translate({}px, {}px) scale({});",
        vp.offset().x,
        vp.offset().y,
        vp.scale()
    );

    html! {<div ref={board_ref}
        style={format!("position:relative; width:100vw; height:100vh; overflow:hidden; touch-action:none; cursor:{cursor}; {}", board_background(&board.customization.board_color))}>
        <Connections
            notes={board.notes.clone()}
            connections={board.connections.clone()}
            color={board.customization.connection_color.clone()}
            viewport={vp}
            dragged={frame.dragged.clone()}
            pending={frame.pending.clone()}
        />
        <div style={world_style}>
            { for zones }
            { for notes }
        </div>
        <AddNoteButton {on_add} current_color={board.customization.note_color.clone()} on_color_change={on_default_color} />
        <ZoneNavigator
            active_zone={frame.active_zone}
            {on_navigate}
            panel_open={*panel_open}
            on_toggle_panel={toggle_panel}
            accent={board.customization.note_color.clone()}
        />
        <CustomizationPanel
            open={*panel_open}
            options={board.customization.clone()}
            on_change={on_customize}
            on_close={close_panel}
            on_clear_board={props.on_clear_board.clone()}
        />
        <ConnectingBanner show={connecting} />
    </div>}
}
