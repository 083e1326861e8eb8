//! Component trait — the interface every UI panel implements.
//!
//! Components own their local state, read shared data from `AppState`, and
//! report what the user asked for as `Action`s; the App performs them.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::action::Action;
use crate::app_state::AppState;

pub trait Component {
    /// Handle a key event. Only called for the component holding input.
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action>;

    /// React to an action dispatched by the App.
    fn on_action(&mut self, _action: &Action, _state: &AppState) {}

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState);
}
