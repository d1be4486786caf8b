//! Board data model: notes, connections, customization and the fixed zone layout.
//! Snapshots serialize with the same camelCase field names the saved board uses.

use serde::{Deserialize, Serialize};
use std::rc::Rc;
use yew::Reducible;

use crate::state::store::{ConnectionStore, NoteStore};

pub const NOTE_DEFAULT_WIDTH: f64 = 200.0;
pub const NOTE_DEFAULT_HEIGHT: f64 = 150.0;
pub const NOTE_DEFAULT_FONT_SIZE: f64 = 16.0;

pub const NOTE_MIN_WIDTH: f64 = 100.0;
pub const NOTE_MIN_HEIGHT: f64 = 75.0;
pub const NOTE_MIN_FONT_SIZE: f64 = 10.0;

/// Horizontal gap between a note and one spawned from it.
pub const CONNECTED_NOTE_GAP: f64 = 40.0;
pub const NEW_NOTE_CONTENT: &str = "New idea...";

const ZONE_WIDTH: f64 = 600.0;
const ZONE_HEIGHT: f64 = 500.0;
const ZONE_GAP: f64 = 150.0;

pub const WORLD_WIDTH: f64 = ZONE_WIDTH * 2.0 + ZONE_GAP;
pub const WORLD_HEIGHT: f64 = ZONE_HEIGHT * 2.0 + ZONE_GAP;

/// A point in either world or screen space; which one is up to the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Half-open containment: the right and bottom edges belong to the neighbour.
    pub fn contains(&self, p: Position) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Zone {
    pub id: &'static str,
    pub name: &'static str,
    pub bounds: Bounds,
}

/// The four zones in enumeration order; lookups return the first match.
pub const ZONES: [Zone; 4] = [
    Zone {
        id: "BRAIN_DUMP",
        name: "Brain Dump",
        bounds: Bounds { x: 0.0, y: 0.0, width: ZONE_WIDTH, height: ZONE_HEIGHT },
    },
    Zone {
        id: "TASKS",
        name: "Tasks",
        bounds: Bounds { x: ZONE_WIDTH + ZONE_GAP, y: 0.0, width: ZONE_WIDTH, height: ZONE_HEIGHT },
    },
    Zone {
        id: "NOW",
        name: "Now",
        bounds: Bounds { x: 0.0, y: ZONE_HEIGHT + ZONE_GAP, width: ZONE_WIDTH, height: ZONE_HEIGHT },
    },
    Zone {
        id: "DONE",
        name: "Done",
        bounds: Bounds {
            x: ZONE_WIDTH + ZONE_GAP,
            y: ZONE_HEIGHT + ZONE_GAP,
            width: ZONE_WIDTH,
            height: ZONE_HEIGHT,
        },
    },
];

pub fn zone_by_id(id: &str) -> Option<&'static Zone> {
    ZONES.iter().find(|z| z.id == id)
}

// ---------------- Palette -----------------
pub const CORKBOARD: &str = "corkboard";
pub const BOARD_COLORS: [&str; 5] = [CORKBOARD, "#ffffff", "#f1f5f9", "#1f2937", "#fafaf9"];
pub const NOTE_COLORS: [&str; 5] = ["#fef3c7", "#ffe4e6", "#ccfbf1", "#e0f2fe", "#ede9fe"];
pub const CONNECTION_COLORS: [&str; 4] = ["#0f172a", "#0284c7", "#e11d48", "#059669"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customization {
    pub board_color: String,
    pub note_color: String,
    pub connection_color: String,
}

impl Default for Customization {
    fn default() -> Self {
        Self {
            board_color: BOARD_COLORS[1].to_string(),
            note_color: NOTE_COLORS[0].to_string(),
            connection_color: CONNECTION_COLORS[0].to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    /// Top-left corner in world space.
    pub position: Position,
    pub content: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<u32>,
}

impl Note {
    pub fn width(&self) -> f64 {
        self.width.unwrap_or(NOTE_DEFAULT_WIDTH)
    }

    pub fn height(&self) -> f64 {
        self.height.unwrap_or(NOTE_DEFAULT_HEIGHT)
    }

    pub fn font_size(&self) -> f64 {
        self.font_size.unwrap_or(NOTE_DEFAULT_FONT_SIZE)
    }

    /// Centre of the note at its current size, used as a connection endpoint.
    pub fn center(&self) -> Position {
        Position::new(self.position.x + self.width() / 2.0, self.position.y + self.height() / 2.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub start_note_id: String,
    pub end_note_id: String,
}

/// Zone membership uses the centre of a default-sized note, so resizing a
/// note never moves it into another zone.
pub fn zone_for_note_position(position: Position) -> Option<&'static Zone> {
    crate::state::geometry::zone_containing(Position::new(
        position.x + NOTE_DEFAULT_WIDTH / 2.0,
        position.y + NOTE_DEFAULT_HEIGHT / 2.0,
    ))
}

/// Note dimensions for a zone holding `count` notes: (width, height, font size).
pub fn note_size_for_count(count: usize) -> (f64, f64, f64) {
    let factor = (1.0 - (count as f64 * 0.1).ln_1p() * 0.2).max(0.0);
    (
        (NOTE_DEFAULT_WIDTH * factor).max(NOTE_MIN_WIDTH),
        (NOTE_DEFAULT_HEIGHT * factor).max(NOTE_MIN_HEIGHT),
        (NOTE_DEFAULT_FONT_SIZE * factor).max(NOTE_MIN_FONT_SIZE),
    )
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Everything that is persisted between sessions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoardSnapshot {
    pub notes: Vec<Note>,
    pub connections: Vec<Connection>,
    pub customization: Customization,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoardState {
    pub notes: Vec<Note>,
    pub connections: Vec<Connection>,
    pub customization: Customization,
    /// Next stacking-order token handed out by `bring_to_front`/new notes.
    pub next_z: u32,
    /// Bumped on every change; effects key off it.
    pub version: u64,
}

impl Default for BoardState {
    fn default() -> Self {
        Self {
            notes: Vec::new(),
            connections: Vec::new(),
            customization: Customization::default(),
            next_z: 1,
            version: 0,
        }
    }
}

impl BoardState {
    pub fn note(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    fn note_mut(&mut self, id: &str) -> Option<&mut Note> {
        self.notes.iter_mut().find(|n| n.id == id)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            notes: self.notes.clone(),
            connections: self.connections.clone(),
            customization: self.customization.clone(),
        }
    }

    fn take_z(&mut self) -> u32 {
        let z = self.next_z;
        self.next_z = self.next_z.saturating_add(1);
        z
    }

    /// Adds a note at a spot inside Brain Dump. `fx`/`fy` in `[0, 1)` pick the spot.
    pub fn add_note(&mut self, fx: f64, fy: f64) -> String {
        let zone = &ZONES[0].bounds;
        let position = Position::new(
            zone.x + fx.clamp(0.0, 1.0) * (zone.width - NOTE_DEFAULT_WIDTH),
            zone.y + fy.clamp(0.0, 1.0) * (zone.height - NOTE_DEFAULT_HEIGHT),
        );
        self.push_note(position)
    }

    fn push_note(&mut self, position: Position) -> String {
        let id = new_id();
        let z = self.take_z();
        self.notes.push(Note {
            id: id.clone(),
            position,
            content: NEW_NOTE_CONTENT.to_string(),
            color: self.customization.note_color.clone(),
            width: None,
            height: None,
            font_size: None,
            z_index: Some(z),
        });
        id
    }

    /// Spawns a note to the right of `parent` and links parent -> new note.
    pub fn add_connected_note(&mut self, parent: &str) -> Option<String> {
        let p = self.note(parent)?;
        let position = Position::new(p.position.x + p.width() + CONNECTED_NOTE_GAP, p.position.y);
        let child = self.push_note(position);
        self.connections.push(Connection {
            id: new_id(),
            start_note_id: parent.to_string(),
            end_note_id: child.clone(),
        });
        Some(child)
    }

    pub fn delete_note(&mut self, id: &str) {
        self.notes.retain(|n| n.id != id);
        self.connections.retain(|c| c.start_note_id != id && c.end_note_id != id);
    }

    pub fn connect(&mut self, source: &str, target: &str) -> bool {
        if source == target || self.note(source).is_none() || self.note(target).is_none() {
            return false;
        }
        self.connections.push(Connection {
            id: new_id(),
            start_note_id: source.to_string(),
            end_note_id: target.to_string(),
        });
        true
    }

    pub fn raise(&mut self, id: &str) -> Option<u32> {
        self.note(id)?;
        let z = self.take_z();
        if let Some(n) = self.note_mut(id) {
            n.z_index = Some(z);
        }
        Some(z)
    }

    pub fn load(&mut self, snap: BoardSnapshot) {
        let max_z = snap.notes.iter().filter_map(|n| n.z_index).max().unwrap_or(0);
        self.notes = snap.notes;
        self.connections = snap.connections;
        self.customization = snap.customization;
        self.next_z = max_z.saturating_add(1);
    }

    /// Shrinks notes in crowded zones. Returns whether any note changed.
    pub fn resize_notes(&mut self) -> bool {
        let mut counts = [0usize; ZONES.len()];
        let membership: Vec<Option<usize>> = self
            .notes
            .iter()
            .map(|n| {
                zone_for_note_position(n.position)
                    .and_then(|z| ZONES.iter().position(|candidate| candidate.id == z.id))
            })
            .collect();
        for zi in membership.iter().flatten() {
            counts[*zi] += 1;
        }
        let mut changed = false;
        for (note, zi) in self.notes.iter_mut().zip(membership) {
            let Some(zi) = zi else { continue };
            let (w, h, f) = note_size_for_count(counts[zi]);
            if note.width != Some(w) || note.height != Some(h) || note.font_size != Some(f) {
                note.width = Some(w);
                note.height = Some(h);
                note.font_size = Some(f);
                changed = true;
            }
        }
        changed
    }
}

// ---------------- Collaborator traits -----------------
impl NoteStore for BoardState {
    fn notes(&self) -> &[Note] {
        &self.notes
    }

    fn update_note_position(&mut self, id: &str, position: Position) {
        if let Some(n) = self.note_mut(id) {
            n.position = position;
            self.resize_notes();
            self.version += 1;
        }
    }

    fn bring_to_front(&mut self, id: &str) -> Option<u32> {
        let z = self.raise(id);
        if z.is_some() {
            self.version += 1;
        }
        z
    }
}

impl ConnectionStore for BoardState {
    fn create_connection(&mut self, source: &str, target: &str) {
        if self.connect(source, target) {
            self.version += 1;
        }
    }
}

// ---------------- Reducer & Actions -----------------
#[derive(Clone, Debug)]
pub enum BoardAction {
    /// Fractions in `[0, 1)` choosing the spot inside Brain Dump.
    AddNote { fx: f64, fy: f64 },
    AddConnectedNote { parent: String },
    UpdatePosition { id: String, position: Position },
    UpdateContent { id: String, content: String },
    UpdateColor { id: String, color: String },
    DeleteNote { id: String },
    BringToFront { id: String },
    CreateConnection { source: String, target: String },
    SetCustomization(Customization),
    SetDefaultNoteColor(String),
    ClearBoard,
    Load(BoardSnapshot),
}

impl Reducible for BoardState {
    type Action = BoardAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        use BoardAction::*;
        let mut new = (*self).clone();
        match action {
            AddNote { fx, fy } => {
                new.add_note(fx, fy);
                new.resize_notes();
            }
            AddConnectedNote { parent } => {
                if new.add_connected_note(&parent).is_none() {
                    return self;
                }
                new.resize_notes();
            }
            UpdatePosition { id, position } => {
                let Some(n) = new.note_mut(&id) else { return self };
                n.position = position;
                new.resize_notes();
            }
            UpdateContent { id, content } => {
                let Some(n) = new.note_mut(&id) else { return self };
                n.content = content;
            }
            UpdateColor { id, color } => {
                let Some(n) = new.note_mut(&id) else { return self };
                n.color = color;
            }
            DeleteNote { id } => {
                new.delete_note(&id);
                new.resize_notes();
            }
            BringToFront { id } => {
                if new.raise(&id).is_none() {
                    return self;
                }
            }
            CreateConnection { source, target } => {
                if !new.connect(&source, &target) {
                    return self;
                }
            }
            SetCustomization(c) => new.customization = c,
            SetDefaultNoteColor(color) => new.customization.note_color = color,
            ClearBoard => {
                new.notes.clear();
                new.connections.clear();
                new.customization = Customization::default();
            }
            Load(snap) => {
                new.load(snap);
                new.resize_notes();
            }
        }
        new.version = self.version + 1;
        Rc::new(new)
    }
}
