//! Shaded-block progress bar with `MM:SS` labels.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const FILLED: char = '▓';
const EMPTY: char = '░';

/// Columns used by the two time labels and their padding.
const LABELS_W: u16 = 12;

/// `floor(progress / total * width)` filled cells, capped at `width`; none
/// when `total_ms` is zero.
pub fn filled_cells(progress_ms: u64, total_ms: u64, width: usize) -> usize {
    if total_ms == 0 {
        return 0;
    }
    let filled = (progress_ms as u128 * width as u128) / total_ms as u128;
    (filled as usize).min(width)
}

pub fn render_bar(progress_ms: u64, total_ms: u64, width: usize) -> String {
    let filled = filled_cells(progress_ms, total_ms, width);
    let mut bar = String::with_capacity(width * 3);
    bar.extend(std::iter::repeat(FILLED).take(filled));
    bar.extend(std::iter::repeat(EMPTY).take(width - filled));
    bar
}

/// `MM:SS`; minutes keep counting past 59 rather than wrapping.
pub fn fmt_time(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

pub fn draw_progress(
    frame: &mut Frame,
    area: Rect,
    progress_ms: u64,
    total_ms: u64,
    bar_style: Style,
    label_style: Style,
) {
    if area.width <= LABELS_W || area.height == 0 {
        return;
    }
    let bar_w = (area.width - LABELS_W) as usize;
    let line = Line::from(vec![
        Span::styled(format!("{} ", fmt_time(progress_ms)), label_style),
        Span::styled(render_bar(progress_ms, total_ms, bar_w), bar_style),
        Span::styled(format!(" {}", fmt_time(total_ms)), label_style),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
