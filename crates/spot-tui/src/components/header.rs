//! Title bar, one row.

use ratatui::{
    layout::{Alignment, Rect},
    text::Line,
    widgets::Paragraph,
    Frame,
};

use crate::app_state::AppState;

pub const TITLE: &str = "Spotify Terminal Player";

pub fn draw_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = Line::styled(TITLE, state.palette.style_title());
    frame.render_widget(Paragraph::new(title).alignment(Alignment::Center), area);
}
