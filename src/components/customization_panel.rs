use yew::prelude::*;

use crate::model::{BOARD_COLORS, CONNECTION_COLORS, Customization, NOTE_COLORS};

use super::board_view::board_background;

#[derive(Properties, PartialEq, Clone)]
pub struct CustomizationPanelProps {
    pub open: bool,
    pub options: Customization,
    pub on_change: Callback<Customization>,
    pub on_close: Callback<()>,
    pub on_clear_board: Callback<()>,
}

fn swatch(background: String, selected: bool, onclick: Callback<MouseEvent>) -> Html {
    let ring = if selected { "outline:2px solid #000; outline-offset:2px;" } else { "" };
    html! { <button {onclick}
        style={format!("width:32px; height:32px; border:2px solid #000; box-shadow:2px 2px 0 #000; cursor:pointer; {background} {ring}")} /> }
}

fn row<F>(title: &str, colors: &[&'static str], selected: &str, on_pick: F) -> Html
where
    F: Fn(&'static str) -> Callback<MouseEvent>,
{
    html! {<div>
        <h3 style="font-weight:bold; margin:0 0 8px 0; font-family:monospace;">{ title }</h3>
        <div style="display:flex; gap:8px;">
            { for colors.iter().map(|&c| swatch(board_background(c), c == selected, on_pick(c))) }
        </div>
    </div>}
}

#[function_component]
pub fn CustomizationPanel(props: &CustomizationPanelProps) -> Html {
    let close_cb = {
        let cb = props.on_close.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let clear_cb = {
        let cb = props.on_clear_board.clone();
        Callback::from(move |_| {
            let confirmed = web_sys::window()
                .map(|win| {
                    win.confirm_with_message(
                        "Are you sure you want to clear the entire board? This action cannot be undone.",
                    )
                    .unwrap_or(false)
                })
                .unwrap_or(true);
            if confirmed {
                cb.emit(());
            }
        })
    };
    // Each picker clones the current options and swaps one field.
    let pick = |apply: fn(&mut Customization, &'static str)| {
        let options = props.options.clone();
        let on_change = props.on_change.clone();
        move |color: &'static str| {
            let mut next = options.clone();
            apply(&mut next, color);
            let on_change = on_change.clone();
            Callback::from(move |_| on_change.emit(next.clone()))
        }
    };
    let translate = if props.open { "translateX(0)" } else { "translateX(100%)" };

    html! {<aside data-chrome="true"
        style={format!("position:fixed; top:0; right:0; height:100%; width:300px; box-sizing:border-box; padding:24px; z-index:20; border-left:2px solid #000; transition:transform 0.3s ease-in-out; transform:{translate}; background:{};", props.options.note_color)}>
        <div style="display:flex; justify-content:space-between; align-items:center; margin-bottom:24px;">
            <h2 style="margin:0; font-family:monospace;">{"Customize"}</h2>
            <button onclick={close_cb} style="padding:4px 8px; border:2px solid #000; border-radius:50%; background:#fff; cursor:pointer;">{"✕"}</button>
        </div>
        <div style="display:flex; flex-direction:column; gap:24px;">
            { row("Board Color", &BOARD_COLORS, &props.options.board_color, pick(|o: &mut Customization, c: &'static str| o.board_color = c.to_string())) }
            { row("Default Note Color", &NOTE_COLORS, &props.options.note_color, pick(|o: &mut Customization, c: &'static str| o.note_color = c.to_string())) }
            { row("Connection Color", &CONNECTION_COLORS, &props.options.connection_color, pick(|o: &mut Customization, c: &'static str| o.connection_color = c.to_string())) }
        </div>
        <div style="margin-top:48px;">
            <button onclick={clear_cb} style="width:100%; text-align:left; padding:12px; font-weight:bold; background:#f87171; border:2px solid #000; box-shadow:4px 4px 0 #000; cursor:pointer;">
                {"Clear Board"}
            </button>
        </div>
    </aside>}
}
