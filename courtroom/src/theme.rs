//! Color themes for courtroom.
//!
//! A `Theme` holds named `ratatui::style::Color` fields for every surface the
//! TUI draws. Two built-in themes:
//!
//! - `dark` uses ANSI 16 colors and works on any terminal.
//! - `catppuccin_mocha` uses the Catppuccin Mocha palette in RGB; needs truecolor.

use ratatui::style::Color;
use tracing::warn;

use courtroom_core::types::{ExchangeRole, Grade};

#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    pub border_active: Color,
    pub border_inactive: Color,

    // Text
    pub text: Color,
    pub muted: Color,
    /// Titles, selected rows, the current stage in the breadcrumb.
    pub accent: Color,

    // Transcript speakers
    pub speaker_user: Color,
    pub speaker_opponent: Color,
    pub speaker_system: Color,
    pub speaker_objection: Color,

    // Debate clock
    pub clock_ok: Color,
    pub clock_low: Color,
    pub clock_critical: Color,
    pub clock_paused: Color,

    // Results
    pub score_bar: Color,
    pub grade_high: Color,
    pub grade_mid: Color,
    pub grade_low: Color,
    pub badge_unlocked: Color,
    pub badge_locked: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub status_mode_normal: Color,
    pub status_mode_insert: Color,
    pub status_error: Color,

    pub background: Color,
}

impl Theme {
    /// Built-in dark theme using ANSI 16 colors.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            text: Color::Reset,
            muted: Color::DarkGray,
            accent: Color::Cyan,

            speaker_user: Color::Blue,
            speaker_opponent: Color::Red,
            speaker_system: Color::Yellow,
            speaker_objection: Color::Magenta,

            clock_ok: Color::Green,
            clock_low: Color::Yellow,
            clock_critical: Color::Red,
            clock_paused: Color::Blue,

            score_bar: Color::Cyan,
            grade_high: Color::Green,
            grade_mid: Color::Yellow,
            grade_low: Color::Red,
            badge_unlocked: Color::Yellow,
            badge_locked: Color::DarkGray,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode_normal: Color::Cyan,
            status_mode_insert: Color::Green,
            status_error: Color::LightRed,

            background: Color::Reset,
        }
    }

    /// Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161);    // #a6e3a1
        let red = Color::Rgb(243, 139, 168);      // #f38ba8
        let yellow = Color::Rgb(249, 226, 175);   // #f9e2af
        let blue = Color::Rgb(137, 180, 250);     // #89b4fa
        let mauve = Color::Rgb(203, 166, 247);    // #cba6f7
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let sapphire = Color::Rgb(116, 199, 236); // #74c7ec
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface1 = Color::Rgb(69, 71, 90);    // #45475a
        let base = Color::Rgb(30, 30, 46);        // #1e1e2e
        let text = Color::Rgb(205, 214, 244);     // #cdd6f4
        let peach = Color::Rgb(250, 179, 135);    // #fab387

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            text,
            muted: overlay1,
            accent: lavender,

            speaker_user: blue,
            speaker_opponent: red,
            speaker_system: yellow,
            speaker_objection: mauve,

            clock_ok: green,
            clock_low: peach,
            clock_critical: red,
            clock_paused: sapphire,

            score_bar: sapphire,
            grade_high: green,
            grade_mid: yellow,
            grade_low: red,
            badge_unlocked: yellow,
            badge_locked: surface1,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode_normal: lavender,
            status_mode_insert: green,
            status_error: red,

            background: base,
        }
    }

    /// Resolves a theme name from config. Unknown names fall back to `dark()`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }

    pub fn speaker(&self, role: ExchangeRole) -> Color {
        match role {
            ExchangeRole::User => self.speaker_user,
            ExchangeRole::Opponent => self.speaker_opponent,
            ExchangeRole::System => self.speaker_system,
            ExchangeRole::Objection => self.speaker_objection,
        }
    }

    pub fn grade(&self, grade: Grade) -> Color {
        match grade {
            Grade::S | Grade::A => self.grade_high,
            Grade::B | Grade::C => self.grade_mid,
            Grade::D => self.grade_low,
        }
    }

    /// Clock color for the fraction of time left.
    pub fn clock(&self, fraction_remaining: f64, paused: bool) -> Color {
        if paused {
            self.clock_paused
        } else if fraction_remaining > 0.5 {
            self.clock_ok
        } else if fraction_remaining > 0.2 {
            self.clock_low
        } else {
            self.clock_critical
        }
    }
}
