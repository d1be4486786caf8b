use yew::prelude::*;

use crate::model::NOTE_COLORS;

#[derive(Properties, PartialEq, Clone)]
pub struct AddNoteButtonProps {
    pub on_add: Callback<()>,
    pub current_color: AttrValue,
    pub on_color_change: Callback<String>,
}

#[function_component(AddNoteButton)]
pub fn add_note_button(props: &AddNoteButtonProps) -> Html {
    let picker_open = use_state(|| false);

    let add = {
        let cb = props.on_add.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let toggle = {
        let picker_open = picker_open.clone();
        Callback::from(move |_| picker_open.set(!*picker_open))
    };
    let swatches = NOTE_COLORS.iter().map(|&color| {
        let onclick = {
            let cb = props.on_color_change.clone();
            let picker_open = picker_open.clone();
            Callback::from(move |_| {
                cb.emit(color.to_string());
                picker_open.set(false);
            })
        };
        html! { <button key={color} {onclick}
            style={format!("width:24px; height:24px; border:2px solid #000; box-shadow:2px 2px 0 #000; cursor:pointer; background:{color};")} /> }
    });
    let button_style = format!(
        "padding:12px; font-weight:bold; border:2px solid #000; cursor:pointer; background:{};",
        props.current_color
    );

    html! {<div data-chrome="true" style="position:fixed; top:20px; left:20px; z-index:10;">
        <div style="display:flex; box-shadow:4px 4px 0 #000;">
            <button onclick={add} aria-label="Add a new note" style={button_style.clone()}>{"+ Add Note"}</button>
            <button onclick={toggle} aria-label="Default note color" style={format!("{button_style} border-left:none;")}>{"🎨"}</button>
        </div>
        if *picker_open {
            <div style="position:absolute; top:100%; margin-top:8px; padding:8px; background:#fff; border:2px solid #000; box-shadow:2px 2px 0 #000; display:flex; gap:8px;">
                { for swatches }
            </div>
        }
    </div>}
}
