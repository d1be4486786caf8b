use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ConnectingBannerProps {
    pub show: bool,
}

#[function_component]
pub fn ConnectingBanner(props: &ConnectingBannerProps) -> Html {
    if !props.show {
        return html! {};
    }
    html! {<div data-chrome="true" style="position:fixed; top:20px; right:20px; z-index:10; background:#bfdbfe; border:2px solid #000; padding:12px; box-shadow:4px 4px 0 #000; font-family:monospace;">
        {"Connecting... Click a note to link, or ESC to cancel."}
    </div>}
}
