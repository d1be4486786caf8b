use web_sys::HtmlTextAreaElement;
use yew::prelude::*;

use crate::model::{BoardAction, NOTE_COLORS, Note, Position};
use crate::state::input::NoteControl;

#[derive(Properties, PartialEq, Clone)]
pub struct NoteCardProps {
    pub note: Note,
    /// Uncommitted drag position, shown instead of the stored one.
    pub overlay: Option<Position>,
    pub connecting: bool,
    pub on_action: Callback<BoardAction>,
}

const CONTROL_STYLE: &str = "padding:2px 6px; background:#fff; border:2px solid #000; border-radius:50%; box-shadow:2px 2px 0 #000; cursor:pointer; font-size:12px;";

fn control_button(control: NoteControl, label: &'static str, onclick: Option<Callback<MouseEvent>>) -> Html {
    html! { <button data-control={control.as_str()} {onclick} style={CONTROL_STYLE}>{ label }</button> }
}

#[function_component(NoteCard)]
pub fn note_card(props: &NoteCardProps) -> Html {
    let editing = use_state(|| false);
    let draft = use_state(|| props.note.content.clone());
    let palette_open = use_state(|| false);
    let textarea_ref = use_node_ref();

    // Focus and select the text as soon as the editor appears.
    {
        let textarea_ref = textarea_ref.clone();
        use_effect_with(*editing, move |editing| {
            if *editing {
                if let Some(area) = textarea_ref.cast::<HtmlTextAreaElement>() {
                    let _ = area.focus();
                    area.select();
                }
            }
            || ()
        });
    }

    let note = &props.note;
    let id = note.id.clone();

    let start_edit = {
        let editing = editing.clone();
        let draft = draft.clone();
        let content = note.content.clone();
        Callback::from(move |_: MouseEvent| {
            draft.set(content.clone());
            editing.set(true);
        })
    };
    let on_input = {
        let draft = draft.clone();
        Callback::from(move |e: InputEvent| {
            let area: HtmlTextAreaElement = e.target_unchecked_into();
            draft.set(area.value());
        })
    };
    let finish_edit = {
        let editing = editing.clone();
        let draft = draft.clone();
        let cb = props.on_action.clone();
        let id = id.clone();
        Callback::from(move |_: FocusEvent| {
            editing.set(false);
            cb.emit(BoardAction::UpdateContent { id: id.clone(), content: (*draft).clone() });
        })
    };
    let delete = {
        let cb = props.on_action.clone();
        let id = id.clone();
        Callback::from(move |_| cb.emit(BoardAction::DeleteNote { id: id.clone() }))
    };
    let toggle_palette = {
        let palette_open = palette_open.clone();
        Callback::from(move |_| palette_open.set(!*palette_open))
    };
    let add_connected = {
        let cb = props.on_action.clone();
        let id = id.clone();
        Callback::from(move |_| cb.emit(BoardAction::AddConnectedNote { parent: id.clone() }))
    };
    let swatches = NOTE_COLORS.iter().map(|&color| {
        let onclick = {
            let cb = props.on_action.clone();
            let palette_open = palette_open.clone();
            let id = id.clone();
            Callback::from(move |_| {
                cb.emit(BoardAction::UpdateColor { id: id.clone(), color: color.to_string() });
                palette_open.set(false);
            })
        };
        html! { <button key={color} {onclick}
            style={format!("width:24px; height:24px; border:2px solid #000; box-shadow:2px 2px 0 #000; cursor:pointer; background:{color};")} /> }
    });

    let at = props.overlay.unwrap_or(note.position);
    let font = note.font_size();
    let cursor = if props.connecting { "crosshair" } else { "grab" };
    // No easing while dragging or the note trails the pointer.
    let transition = if props.overlay.is_some() {
        "none"
    } else {
        "width 0.2s, height 0.2s, font-size 0.2s, background-color 0.2s"
    };
    let style = format!(
        "position:absolute; left:{}px; top:{}px; width:{}px; height:{}px; font-size:{font}px; z-index:{}; \
         background:{}; cursor:{cursor}; transition:{transition}; box-sizing:border-box; display:flex; \
         flex-direction:column; padding:16px; border:2px solid #000; box-shadow:4px 4px 0 #000; user-select:none;",
        at.x,
        at.y,
        note.width(),
        note.height(),
        note.z_index.unwrap_or(1),
        note.color,
    );

    html! {<div data-note-id={id.clone()} data-editing={(*editing).then_some("true")} {style} ondblclick={start_edit}>
        if *editing {
            <textarea ref={textarea_ref} value={(*draft).clone()} oninput={on_input} onblur={finish_edit}
                style="width:100%; height:100%; background:transparent; resize:none; border:none; outline:none; font-family:monospace; font-size:inherit;" />
        } else {
            <div style={format!("width:100%; height:100%; overflow-wrap:break-word; white-space:pre-wrap; font-family:monospace; line-height:{}px;", font * 1.5)}>
                { note.content.clone() }
            </div>
        }
        <div style="position:absolute; top:-12px; right:-12px; display:flex; gap:4px;">
            { control_button(NoteControl::Delete, "🗑", Some(delete)) }
            { control_button(NoteControl::Link, "🔗", None) }
            { control_button(NoteControl::Palette, "🎨", Some(toggle_palette)) }
            { control_button(NoteControl::AddConnected, "+", Some(add_connected)) }
        </div>
        if *palette_open {
            <div data-control={NoteControl::Palette.as_str()}
                style="position:absolute; top:32px; right:-12px; display:flex; flex-direction:column; gap:8px; padding:8px; background:#fff; border:2px solid #000; box-shadow:2px 2px 0 #000; z-index:10;">
                { for swatches }
            </div>
        }
    </div>}
}
