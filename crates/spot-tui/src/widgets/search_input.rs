//! SearchInput — single-line query editor on top of tui-input.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

const PROMPT: &str = "Search: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Enter pressed; carries the query as typed.
    Submitted(String),
    Cancelled,
    Edited,
    None,
}

#[derive(Default)]
pub struct SearchInput {
    input: Input,
}

impl SearchInput {
    pub fn clear(&mut self) {
        self.input.reset();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        match key.code {
            KeyCode::Esc => InputAction::Cancelled,
            KeyCode::Enter => InputAction::Submitted(self.input.value().to_string()),
            _ => match self.input.handle_event(&Event::Key(key)) {
                Some(change) if change.value => InputAction::Edited,
                _ => InputAction::None,
            },
        }
    }

    /// Draw the prompt and query. Places the cursor when `focused`.
    pub fn draw(&self, frame: &mut Frame, area: Rect, focused: bool, style: Style, muted: Style) {
        let prompt_w = PROMPT.len() as u16;
        let text_w = area.width.saturating_sub(prompt_w + 1) as usize;
        let scroll = self.input.visual_scroll(text_w);
        let value: String = self.input.value().chars().skip(scroll).collect();

        let line = Line::from(vec![
            Span::styled(PROMPT, if focused { style } else { muted }),
            Span::styled(value, style),
        ]);
        frame.render_widget(Paragraph::new(line), area);

        if focused && area.width > prompt_w {
            let cursor_x = area.x + prompt_w + (self.input.visual_cursor() - scroll) as u16;
            frame.set_cursor_position((cursor_x.min(area.x + area.width - 1), area.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_then_enter_submits_query() {
        let mut input = SearchInput::default();
        for c in "daft punk".chars() {
            assert_eq!(input.handle_key(key(KeyCode::Char(c))), InputAction::Edited);
        }
        assert_eq!(input.handle_key(key(KeyCode::Backspace)), InputAction::Edited);
        assert_eq!(
            input.handle_key(key(KeyCode::Enter)),
            InputAction::Submitted("daft pun".into())
        );
    }

    #[test]
    fn test_esc_cancels_and_clear_resets() {
        let mut input = SearchInput::default();
        input.handle_key(key(KeyCode::Char('x')));
        assert_eq!(input.handle_key(key(KeyCode::Esc)), InputAction::Cancelled);
        input.clear();
        assert_eq!(input.input.value(), "");
    }
}
