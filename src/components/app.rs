use gloo_timers::callback::Timeout;
use tracing::{info, warn};
use yew::prelude::*;

use super::board_view::BoardView;
use crate::config::SAVE_DEBOUNCE_MS;
use crate::model::{BoardAction, BoardState};
use crate::storage;

#[function_component(App)]
pub fn app() -> Html {
    let board = use_reducer(BoardState::default);
    let save_timer = use_mut_ref(|| None::<Timeout>);

    // Load the saved board once
    {
        let board = board.clone();
        use_effect_with((), move |_| {
            match storage::load_board() {
                Ok(snap) => {
                    info!(notes = snap.notes.len(), "restored saved board");
                    board.dispatch(BoardAction::Load(snap));
                }
                Err(e) => warn!(error = %e, "failed to load from local storage"),
            }
            || ()
        });
    }
    // Save after changes settle; replacing the timeout cancels the previous one.
    {
        let save_timer = save_timer.clone();
        let board = board.clone();
        use_effect_with(board.version, move |&version| {
            if version > 0 {
                let snap = board.snapshot();
                let pending = Timeout::new(SAVE_DEBOUNCE_MS, move || {
                    if let Err(e) = storage::save_board(&snap) {
                        warn!(error = %e, "failed to save to local storage");
                    }
                });
                *save_timer.borrow_mut() = Some(pending);
            }
            || ()
        });
    }

    let clear_board = {
        let board = board.clone();
        let save_timer = save_timer.clone();
        Callback::from(move |_| {
            save_timer.borrow_mut().take();
            if let Err(e) = storage::clear_board() {
                warn!(error = %e, "failed to clear local storage");
            }
            info!("board cleared");
            board.dispatch(BoardAction::ClearBoard);
        })
    };

    html! { <BoardView board={board.clone()} on_clear_board={clear_board} /> }
}
