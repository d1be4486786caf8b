use yew::prelude::*;

use crate::model::ZONES;

#[derive(Properties, PartialEq, Clone)]
pub struct ZoneNavigatorProps {
    pub active_zone: Option<&'static str>,
    pub on_navigate: Callback<&'static str>,
    pub panel_open: bool,
    pub on_toggle_panel: Callback<()>,
    pub accent: AttrValue,
}

#[function_component(ZoneNavigator)]
pub fn zone_navigator(props: &ZoneNavigatorProps) -> Html {
    let toggle = {
        let cb = props.on_toggle_panel.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let buttons = ZONES.iter().map(|zone| {
        let id = zone.id;
        let onclick = {
            let cb = props.on_navigate.clone();
            Callback::from(move |_| cb.emit(id))
        };
        // Only the framed zone shows its name; the rest are dots.
        let label = if props.active_zone == Some(id) {
            html! { <span>{ zone.name }</span> }
        } else {
            html! { <span style="display:inline-block; width:14px; height:14px; border-radius:50%; border:2px solid #000; background:#f5f5f4;"></span> }
        };
        html! {
            <button key={id} {onclick} aria-label={format!("Navigate to {} zone", zone.name)}
                style="padding:4px 12px; font-family:monospace; font-weight:bold; background:transparent; border:2px solid transparent; cursor:pointer;">
                { label }
            </button>
        }
    });
    html! {<div data-chrome="true" style="position:fixed; right:20px; bottom:20px; z-index:30; display:flex; box-shadow:4px 4px 0 #000;">
        <div style={format!("display:flex; align-items:center; gap:12px; padding:8px; border:2px solid #000; border-right:none; background:{};", props.accent)}>
            { for buttons }
        </div>
        <button onclick={toggle} aria-label="Toggle customization panel"
            style={format!("padding:12px 16px; border:2px solid #000; font-weight:bold; cursor:pointer; background:{};", props.accent)}>
            { if props.panel_open { "✕" } else { "🎨" } }
        </button>
    </div>}
}
