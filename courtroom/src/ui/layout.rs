//! Layout arithmetic and shared chrome (header, panel blocks, status bar).
//!
//! Called inside `terminal.draw()` on every render, so each frame gets a layout
//! that reflects the current terminal size. Nothing here holds state.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use crate::app::{AppState, Mode, Screen};
use crate::theme::Theme;

/// Width below which the hearing sidebar collapses.
const SIDEBAR_MIN_WIDTH: u16 = 90;
const SIDEBAR_WIDTH: u16 = 32;

/// Returns `[header, body, status_bar]` for the current frame.
pub fn compute_layout(frame: &Frame) -> [Rect; 3] {
    frame.area().layout(&Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ]))
}

/// Splits the hearing body into `[transcript, input, sidebar]`.
///
/// Below [`SIDEBAR_MIN_WIDTH`] columns the sidebar gets zero width and the
/// transcript fills the row.
pub fn hearing_layout(body: Rect) -> [Rect; 3] {
    let horizontal = if body.width >= SIDEBAR_MIN_WIDTH {
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(SIDEBAR_WIDTH)])
            .spacing(Spacing::Overlap(1))
    } else {
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(0)])
    };
    let [main, sidebar] = body.layout(&horizontal);
    let [transcript, input] =
        main.layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(3)]));
    [transcript, input, sidebar]
}

/// Returns the inner `Rect` of a panel after removing its 1-cell border.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Builds a bordered `Block` for a panel.
///
/// Focused panels get a thick border in `border_active`. `MergeStrategy::Fuzzy`
/// is required when mixing `Thick` and `Plain` borders.
pub fn panel_block<'a>(title: &'a str, is_focused: bool, theme: &'a Theme) -> Block<'a> {
    let border_style = if is_focused {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_focused { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Fuzzy)
}

/// Renders the one-row breadcrumb of flow steps, highlighting the current screen.
pub fn render_header(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let mut spans = vec![Span::styled(
        " ⚖ Courtroom ",
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
    )];
    for (i, screen) in Screen::FLOW.iter().enumerate() {
        let style = if *screen == state.screen {
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(theme.muted)
        };
        if i > 0 {
            spans.push(Span::styled(" › ", Style::default().fg(theme.muted)));
        }
        spans.push(Span::styled(screen.title(), style));
    }
    if state.screen == Screen::Badges {
        spans.push(Span::styled(
            "   Badges",
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Renders the one-row status bar: mode indicator, then the latest status message
/// or the key hints for the current screen.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let (mode_text, mode_fg) = match state.mode {
        Mode::Insert => (" INSERT ", theme.status_mode_insert),
        Mode::Normal | Mode::HelpOverlay | Mode::ConfirmEndEarly | Mode::ConfirmQuit => {
            (" NORMAL ", theme.status_mode_normal)
        }
    };

    let mut spans = vec![Span::styled(
        mode_text,
        Style::default().fg(mode_fg).add_modifier(Modifier::BOLD),
    )];

    match &state.status {
        Some(status) if status.is_error => spans.push(Span::styled(
            format!(" {} ", status.text),
            Style::default().fg(theme.status_error).add_modifier(Modifier::BOLD),
        )),
        Some(status) => spans.push(Span::raw(format!(" {} ", status.text))),
        None => spans.push(Span::raw(format!(" {} ", key_hints(state)))),
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}

fn key_hints(state: &AppState) -> &'static str {
    if state.mode == Mode::Insert {
        return "Enter commit · Esc cancel";
    }
    match state.screen {
        Screen::ScenarioList => "j/k move · Enter open · b badges · ? help · q quit",
        Screen::ScenarioDetail => "d/p role · Enter confirm · Esc back",
        Screen::Coach => "t type · h/l tone · 1-4 options · r recap · Enter next · Esc back",
        Screen::CaseFile => "o objective · t time · x objections · p pause · Enter next · Esc back",
        Screen::Strategy => "Tab section · a add · d delete · 1-9 link · c coach · Enter begin",
        Screen::Hearing => "i argue · o object · p pause · c conclude · e end early · ? help",
        Screen::Results => "Enter finish · b badges",
        Screen::Badges => "j/k move · Esc back",
    }
}
