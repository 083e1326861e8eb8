//! NowPlaying — track line, progress bar and transport controls.
//!
//! Draws into a 4-row area:
//!   row 0  `♪ name - artist`
//!   row 1  progress bar
//!   row 2  (blank)
//!   row 3  controls, centered

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app_state::AppState;
use crate::intent::RenderHint;
use crate::widgets::{progress_bar::draw_progress, truncate_to_width};

pub const HEIGHT: u16 = 4;

pub fn track_line(name: &str, artist: &str) -> String {
    format!("♪ {} - {}", name, artist)
}

/// The play/pause glyph for the displayed state, with a `?` once a toggle
/// went unconfirmed.
pub fn play_glyph(playing: bool, hint: RenderHint) -> String {
    let glyph = if playing { "⏸" } else { "▶" };
    match hint {
        RenderHint::TimedOut => format!("{glyph}?"),
        _ => glyph.to_string(),
    }
}

pub fn draw_now_playing(frame: &mut Frame, area: Rect, state: &AppState) {
    if area.height < HEIGHT || area.width < 4 {
        return;
    }
    let palette = &state.palette;
    let inner_w = area.width.saturating_sub(4);
    let row = |y: u16| Rect::new(area.x + 2, area.y + y, inner_w, 1);

    let Some(track) = &state.snapshot.track else {
        let idle = Line::styled("Nothing playing", palette.style_muted());
        frame.render_widget(Paragraph::new(idle), row(0));
        return;
    };

    let info = truncate_to_width(&track_line(&track.name, &track.artist), inner_w as usize);
    frame.render_widget(Paragraph::new(info), row(0));

    draw_progress(
        frame,
        row(1),
        state.snapshot.progress_ms,
        track.duration_ms,
        palette.style_controls(),
        palette.style_muted(),
    );

    let glyph_style = match state.pause_hint {
        RenderHint::Normal => palette.style_controls(),
        RenderHint::PendingVisible => palette.style_pending(),
        RenderHint::PendingHidden => palette.style_muted(),
        RenderHint::TimedOut => palette.style_error(),
    };
    let controls = Line::from(vec![
        Span::styled("⏮ [J]    ", palette.style_controls()),
        Span::styled(play_glyph(state.shown_playing, state.pause_hint), glyph_style),
        Span::styled(" [K]    ⏭ [L]", palette.style_controls()),
    ]);
    let controls_row = Rect::new(area.x, area.y + 3, area.width, 1);
    frame.render_widget(
        Paragraph::new(controls).alignment(Alignment::Center),
        controls_row,
    );
}
