// Collaborators the gesture controller reads and writes during a session.
use crate::model::{Note, Position};

pub trait NoteStore {
    fn notes(&self) -> &[Note];

    fn note_position(&self, id: &str) -> Option<Position> {
        self.notes().iter().find(|n| n.id == id).map(|n| n.position)
    }

    /// Unknown ids are ignored.
    fn update_note_position(&mut self, id: &str, position: Position);

    /// Raises the note above every other one and returns its new z-order token.
    fn bring_to_front(&mut self, id: &str) -> Option<u32>;
}

pub trait ConnectionStore {
    /// Self-links and unknown ids are ignored.
    fn create_connection(&mut self, source: &str, target: &str);
}
