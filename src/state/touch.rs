// Two-finger geometry for pinch gestures.
use crate::model::Position;

pub fn distance(a: Position, b: Position) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

pub fn midpoint(a: Position, b: Position) -> Position {
    Position::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Returns (midpoint, distance) of the first two touches, if there are two.
pub fn two_finger_geometry(touches: &[Position]) -> Option<(Position, f64)> {
    match touches {
        [a, b, ..] => Some((midpoint(*a, *b), distance(*a, *b))),
        _ => None,
    }
}
