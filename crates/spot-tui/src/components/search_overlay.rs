//! SearchOverlay — query box plus a selectable list of results.
//!
//! Two focus modes. While editing, every key goes to the query box and
//! Enter submits it. Once results arrive focus moves to the list, where
//! Up/Down select and Enter plays the selection; `i` returns to the query.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use spot_core::protocol::TrackSummary;

use crate::action::Action;
use crate::app_state::AppState;
use crate::component::Component;
use crate::widgets::search_input::{InputAction, SearchInput};
use crate::widgets::truncate_to_width;

const TITLE: &str = " Search [ESC to close] ";
const SELECTED_PREFIX: &str = "► ";
const PLAIN_PREFIX: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Query,
    Results,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Status {
    Idle,
    Searching(String),
    NoResults(String),
    Failed(String),
}

pub struct SearchOverlay {
    visible: bool,
    focus: Focus,
    input: SearchInput,
    results: Vec<TrackSummary>,
    selected: usize,
    status: Status,
}

impl SearchOverlay {
    pub fn new() -> Self {
        Self {
            visible: false,
            focus: Focus::Query,
            input: SearchInput::default(),
            results: Vec::new(),
            selected: 0,
            status: Status::Idle,
        }
    }

    /// True while the query box owns the keyboard.
    pub fn is_editing(&self) -> bool {
        self.visible && self.focus == Focus::Query
    }

    pub fn selected(&self) -> Option<&TrackSummary> {
        self.results.get(self.selected)
    }

    fn open(&mut self) {
        self.visible = true;
        self.focus = Focus::Query;
    }

    /// Previous results stay around for the next open.
    fn close(&mut self) {
        self.visible = false;
        self.focus = Focus::Query;
        self.input.clear();
    }

    /// Apply a finished search. Results for a query other than the one
    /// currently awaited are stale and dropped.
    pub fn on_results(&mut self, query: &str, result: Result<Vec<TrackSummary>, String>) {
        match &self.status {
            Status::Searching(awaited) if awaited == query => {}
            _ => return,
        }
        match result {
            Ok(results) if results.is_empty() => {
                self.status = Status::NoResults(query.to_string());
            }
            Ok(results) => {
                self.results = results;
                self.selected = 0;
                self.status = Status::Idle;
                if self.visible {
                    self.focus = Focus::Results;
                }
            }
            Err(message) => self.status = Status::Failed(message),
        }
    }

    fn handle_query_key(&mut self, key: KeyEvent) -> Vec<Action> {
        match self.input.handle_key(key) {
            InputAction::Submitted(query) => {
                let query = query.trim().to_string();
                if query.is_empty() {
                    if !self.results.is_empty() {
                        self.focus = Focus::Results;
                    }
                    return vec![];
                }
                self.status = Status::Searching(query.clone());
                vec![Action::SubmitSearch(query)]
            }
            InputAction::Cancelled => vec![Action::CloseSearch],
            InputAction::Edited | InputAction::None => vec![],
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) -> Vec<Action> {
        match key.code {
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                vec![]
            }
            KeyCode::Down => {
                if self.selected + 1 < self.results.len() {
                    self.selected += 1;
                }
                vec![]
            }
            KeyCode::Enter => match self.selected().cloned() {
                Some(track) => vec![Action::PlayTrack(track), Action::CloseSearch],
                None => vec![],
            },
            KeyCode::Esc => vec![Action::CloseSearch],
            _ => vec![],
        }
    }

    fn status_line(&self, state: &AppState) -> Option<Line<'static>> {
        let palette = &state.palette;
        match &self.status {
            Status::Idle => None,
            Status::Searching(q) => Some(Line::styled(
                format!("Searching for \"{q}\"…"),
                palette.style_pending(),
            )),
            Status::NoResults(q) => Some(Line::styled(
                format!("No tracks found for \"{q}\""),
                palette.style_muted(),
            )),
            Status::Failed(e) => Some(Line::styled(
                format!("Search failed: {e}"),
                palette.style_error(),
            )),
        }
    }
}

impl Default for SearchOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for SearchOverlay {
    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if !self.visible {
            return vec![];
        }
        match self.focus {
            Focus::Query => self.handle_query_key(key),
            Focus::Results => self.handle_results_key(key),
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) {
        match action {
            Action::OpenSearch => self.open(),
            Action::CloseSearch => self.close(),
            _ => {}
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        if !self.visible || area.height < 3 || area.width < 6 {
            return;
        }
        let palette = &state.palette;
        let block = Block::default()
            .borders(Borders::ALL)
            .title(TITLE)
            .border_style(palette.style_muted());
        let inner = block.inner(area);
        frame.render_widget(Clear, area);
        frame.render_widget(block, area);
        if inner.height == 0 {
            return;
        }

        let row = |y: u16| Rect::new(inner.x + 1, inner.y + y, inner.width.saturating_sub(2), 1);
        self.input.draw(
            frame,
            row(0),
            self.focus == Focus::Query,
            palette.style_input(),
            palette.style_muted(),
        );

        if inner.height < 2 {
            return;
        }
        if let Some(status) = self.status_line(state) {
            frame.render_widget(Paragraph::new(status), row(1));
        }

        // Results start on the third row; scroll to keep the selection visible.
        let list_rows = inner.height.saturating_sub(2) as usize;
        if list_rows == 0 {
            return;
        }
        let offset = self.selected.saturating_sub(list_rows - 1);
        let max_cols = row(0).width as usize;
        for (i, track) in self.results.iter().enumerate().skip(offset).take(list_rows) {
            let is_selected = i == self.selected;
            let prefix = if is_selected { SELECTED_PREFIX } else { PLAIN_PREFIX };
            let text = truncate_to_width(
                &format!("{}{} - {}", prefix, track.name, track.artist),
                max_cols,
            );
            let style = if is_selected && self.focus == Focus::Results {
                palette.style_selected()
            } else {
                ratatui::style::Style::default()
            };
            let y = 2 + (i - offset) as u16;
            frame.render_widget(Paragraph::new(Line::from(Span::styled(text, style))), row(y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Palette;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(overlay: &mut SearchOverlay, state: &AppState, text: &str) {
        for c in text.chars() {
            overlay.handle_key(key(KeyCode::Char(c)), state);
        }
    }

    fn track(id: &str) -> TrackSummary {
        TrackSummary {
            id: id.into(),
            name: format!("Song {id}"),
            artist: "Band".into(),
            uri: format!("spotify:track:{id}"),
        }
    }

    fn opened() -> (SearchOverlay, AppState) {
        let state = AppState::new(Palette::default());
        let mut overlay = SearchOverlay::new();
        overlay.on_action(&Action::OpenSearch, &state);
        (overlay, state)
    }

    #[test]
    fn test_enter_submits_trimmed_query() {
        let (mut overlay, state) = opened();
        assert!(overlay.is_editing());
        type_str(&mut overlay, &state, "  abba ");
        let actions = overlay.handle_key(key(KeyCode::Enter), &state);
        assert_eq!(actions, vec![Action::SubmitSearch("abba".into())]);
    }

    #[test]
    fn test_blank_query_submits_nothing() {
        let (mut overlay, state) = opened();
        type_str(&mut overlay, &state, "   ");
        assert!(overlay.handle_key(key(KeyCode::Enter), &state).is_empty());
        assert!(overlay.is_editing());
    }

    #[test]
    fn test_results_navigation_and_play() {
        let (mut overlay, state) = opened();
        type_str(&mut overlay, &state, "abba");
        overlay.handle_key(key(KeyCode::Enter), &state);
        overlay.on_results("abba", Ok(vec![track("a"), track("b"), track("c")]));
        assert!(!overlay.is_editing());

        overlay.handle_key(key(KeyCode::Up), &state);
        assert_eq!(overlay.selected().map(|t| t.id.as_str()), Some("a"));
        for _ in 0..5 {
            overlay.handle_key(key(KeyCode::Down), &state);
        }
        assert_eq!(overlay.selected().map(|t| t.id.as_str()), Some("c"));

        let actions = overlay.handle_key(key(KeyCode::Enter), &state);
        assert_eq!(actions, vec![Action::PlayTrack(track("c")), Action::CloseSearch]);
    }

    #[test]
    fn test_stale_results_are_dropped() {
        let (mut overlay, state) = opened();
        type_str(&mut overlay, &state, "first");
        overlay.handle_key(key(KeyCode::Enter), &state);
        overlay.on_results("other", Ok(vec![track("x")]));
        assert!(overlay.results.is_empty());
        assert!(overlay.is_editing());
    }

    #[test]
    fn test_empty_and_failed_results_keep_query_focus() {
        let (mut overlay, state) = opened();
        type_str(&mut overlay, &state, "zzz");
        overlay.handle_key(key(KeyCode::Enter), &state);
        overlay.on_results("zzz", Ok(vec![]));
        assert!(overlay.is_editing());
        assert_eq!(overlay.status, Status::NoResults("zzz".into()));

        overlay.handle_key(key(KeyCode::Enter), &state);
        overlay.on_results("zzz", Err("network error".into()));
        assert_eq!(overlay.status, Status::Failed("network error".into()));
    }

    #[test]
    fn test_esc_closes_and_keeps_results() {
        let (mut overlay, state) = opened();
        type_str(&mut overlay, &state, "abba");
        overlay.handle_key(key(KeyCode::Enter), &state);
        overlay.on_results("abba", Ok(vec![track("a")]));

        let actions = overlay.handle_key(key(KeyCode::Esc), &state);
        assert_eq!(actions, vec![Action::CloseSearch]);
        overlay.on_action(&Action::CloseSearch, &state);
        assert!(!overlay.visible);

        overlay.on_action(&Action::OpenSearch, &state);
        assert!(overlay.is_editing());
        assert_eq!(overlay.results.len(), 1);
        // Blank Enter moves straight to the kept results.
        overlay.handle_key(key(KeyCode::Enter), &state);
        assert!(!overlay.is_editing());
    }
}
