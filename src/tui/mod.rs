//! Terminal front-end for the fund-flow explorer.
//!
//! Renders the address graph and the classified transaction list with
//! Ratatui and turns mouse and key input into expansion and fetch actions.

pub mod app;
pub mod components;
pub mod event;
pub mod input;
pub mod tabs;
pub mod terminal;
pub mod ui;

pub use app::App;
pub use event::{Action, Event, Message};
pub use terminal::{Tui, restore_terminal, setup_terminal};
pub use ui::render;
