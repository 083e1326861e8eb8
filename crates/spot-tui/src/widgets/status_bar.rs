//! Bottom help line.

use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::Line,
    widgets::Paragraph,
    Frame,
};

pub const HELP_TEXT: &str = "Press 'I' to search, 'Q' to quit";

pub fn draw_help_line(frame: &mut Frame, area: Rect, style: Style) {
    let line = Line::styled(HELP_TEXT, style);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}
