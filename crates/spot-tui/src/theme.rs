//! Color palette for the player.
//!
//! Three roles are user-configurable (title, controls, selection) by basic
//! terminal color name. Everything else uses the fixed constants below.

use ratatui::style::{Color, Modifier, Style};

use spot_core::config::ThemeConfig;

// ── Fixed colors ──────────────────────────────────────────────────────────────

pub const C_MUTED: Color = Color::DarkGray;
pub const C_PENDING: Color = Color::Rgb(255, 184, 80);
pub const C_ERROR: Color = Color::Rgb(255, 80, 80);
pub const C_INPUT_FG: Color = Color::Rgb(255, 200, 80);

// ── Role defaults ─────────────────────────────────────────────────────────────

pub const DEFAULT_TITLE: Color = Color::Green;
pub const DEFAULT_CONTROLS: Color = Color::Cyan;
pub const DEFAULT_SELECTION: Color = Color::Yellow;

/// The eight basic terminal colors, case-insensitive.
pub fn color_from_name(name: &str) -> Option<Color> {
    match name.trim().to_ascii_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        _ => None,
    }
}

/// Resolved styles, built once at startup from the `[theme]` section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    /// `use_default_terminal_theme`: every style is the terminal default.
    plain: bool,
    title: Color,
    controls: Color,
    selection: Color,
}

impl Palette {
    pub fn from_config(theme: &ThemeConfig) -> Self {
        let colors = &theme.custom_colors;
        let pick = |name: &str, fallback: Color| {
            color_from_name(name).unwrap_or_else(|| {
                tracing::warn!("theme: unknown color {:?}, using {:?}", name, fallback);
                fallback
            })
        };
        Self {
            plain: theme.use_default_terminal_theme,
            title: pick(&colors.title, DEFAULT_TITLE),
            controls: pick(&colors.controls, DEFAULT_CONTROLS),
            selection: pick(&colors.selection, DEFAULT_SELECTION),
        }
    }

    fn fg(&self, color: Color) -> Style {
        if self.plain {
            Style::default()
        } else {
            Style::default().fg(color)
        }
    }

    pub fn style_title(&self) -> Style {
        self.fg(self.title).add_modifier(Modifier::BOLD)
    }

    pub fn style_controls(&self) -> Style {
        self.fg(self.controls)
    }

    pub fn style_selected(&self) -> Style {
        self.fg(self.selection).add_modifier(Modifier::BOLD)
    }

    pub fn style_muted(&self) -> Style {
        self.fg(C_MUTED)
    }

    pub fn style_pending(&self) -> Style {
        self.fg(C_PENDING)
    }

    pub fn style_error(&self) -> Style {
        self.fg(C_ERROR)
    }

    pub fn style_input(&self) -> Style {
        self.fg(C_INPUT_FG)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default())
    }
}
