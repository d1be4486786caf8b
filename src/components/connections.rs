use std::collections::HashMap;

use yew::prelude::*;

use crate::model::{Connection, Note, Position};
use crate::state::Viewport;

#[derive(Properties, PartialEq, Clone)]
pub struct ConnectionsProps {
    pub notes: Vec<Note>,
    pub connections: Vec<Connection>,
    pub color: AttrValue,
    pub viewport: Viewport,
    /// Note being dragged and where it is shown.
    pub dragged: Option<(String, Position)>,
    /// Source note and world endpoint of the line being drawn.
    pub pending: Option<(String, Option<Position>)>,
}

/// Centre of `note`, following the drag overlay when the note is being moved.
fn anchor(note: &Note, dragged: &Option<(String, Position)>) -> Position {
    match dragged {
        Some((id, at)) if *id == note.id => {
            Position::new(at.x + note.width() / 2.0, at.y + note.height() / 2.0)
        }
        _ => note.center(),
    }
}

#[function_component(Connections)]
pub fn connections(props: &ConnectionsProps) -> Html {
    let by_id: HashMap<&str, &Note> = props.notes.iter().map(|n| (n.id.as_str(), n)).collect();
    let vp = &props.viewport;

    let lines = props.connections.iter().filter_map(|c| {
        let start = by_id.get(c.start_note_id.as_str())?;
        let end = by_id.get(c.end_note_id.as_str())?;
        let a = vp.to_screen(anchor(start, &props.dragged));
        let b = vp.to_screen(anchor(end, &props.dragged));
        Some(html! {
            <line key={c.id.clone()} x1={a.x.to_string()} y1={a.y.to_string()} x2={b.x.to_string()} y2={b.y.to_string()}
                stroke={props.color.clone()} stroke-width="3" />
        })
    });

    let pending = props.pending.as_ref().and_then(|(source, current)| {
        let start = vp.to_screen(anchor(by_id.get(source.as_str())?, &props.dragged));
        let end = vp.to_screen((*current)?);
        Some(html! {
            <line x1={start.x.to_string()} y1={start.y.to_string()} x2={end.x.to_string()} y2={end.y.to_string()}
                stroke={props.color.clone()} stroke-width="3" stroke-dasharray="5,5" opacity="0.7" />
        })
    });

    html! {<svg style="position:absolute; top:0; left:0; width:100%; height:100%; pointer-events:none; z-index:0;">
        { for lines }
        { for pending }
    </svg>}
}
