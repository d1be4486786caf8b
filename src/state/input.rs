// Host-neutral input events. The board view translates DOM events into these.
use crate::model::Position;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Middle,
    Secondary,
    Other(i16),
}

impl MouseButton {
    /// Maps `MouseEvent.button`.
    pub fn from_dom(button: i16) -> Self {
        match button {
            0 => MouseButton::Primary,
            1 => MouseButton::Middle,
            2 => MouseButton::Secondary,
            other => MouseButton::Other(other),
        }
    }
}

/// The buttons floating over a note's corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteControl {
    Delete,
    Link,
    Palette,
    AddConnected,
}

impl NoteControl {
    pub fn as_str(self) -> &'static str {
        match self {
            NoteControl::Delete => "delete",
            NoteControl::Link => "link",
            NoteControl::Palette => "palette",
            NoteControl::AddConnected => "add-connected",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "delete" => Some(NoteControl::Delete),
            "link" => Some(NoteControl::Link),
            "palette" => Some(NoteControl::Palette),
            "add-connected" => Some(NoteControl::AddConnected),
            _ => None,
        }
    }
}

/// What the pointer landed on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PointerTarget {
    Background,
    Note(String),
    Control { note: String, control: NoteControl },
    /// A note whose text is being edited.
    Editor(String),
    /// Toolbars and panels layered over the board.
    Chrome,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointerInput {
    /// Screen space.
    pub position: Position,
    pub button: MouseButton,
    pub target: PointerTarget,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TouchInput {
    /// Screen positions of the touches still on the surface, in DOM order.
    pub touches: Vec<Position>,
    pub target: PointerTarget,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelInput {
    pub position: Position,
    pub delta_y: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyInput {
    pub key: String,
}

impl KeyInput {
    pub fn is_escape(&self) -> bool {
        self.key == "Escape" || self.key == "Esc"
    }
}
