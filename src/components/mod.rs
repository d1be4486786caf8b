pub mod add_note_button;
pub mod app;
pub mod board_view;
pub mod connecting_banner;
pub mod connections;
pub mod customization_panel;
pub mod note_card;
pub mod zone_navigator;
