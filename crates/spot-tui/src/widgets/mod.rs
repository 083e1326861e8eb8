pub mod progress_bar;
pub mod search_input;
pub mod status_bar;

use unicode_width::UnicodeWidthChar;

/// Cut `text` to at most `max_cols` terminal columns. Wide glyphs that
/// would straddle the edge are dropped whole.
pub fn truncate_to_width(text: &str, max_cols: usize) -> String {
    let mut used = 0;
    let mut out = String::with_capacity(text.len().min(max_cols * 4));
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max_cols {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}
