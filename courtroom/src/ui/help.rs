//! Help overlay and confirmation dialogs.
//!
//! Both are modals drawn over the current screen inside the same
//! `terminal.draw()` closure: `Clear` erases the area, then a bordered
//! `Paragraph` is drawn on top.

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;

/// Renders the help overlay, scrolled by `help_scroll` rows.
///
/// Skipped on terminals narrower than 60 columns.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 60 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(80), Constraint::Percentage(80));

    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help  · j/k scroll, ? or Esc to dismiss ")
        .border_style(Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(build_help_text())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn build_help_text() -> Text<'static> {
    Text::from(vec![
        Line::from("Preparation"),
        Line::from("  j / k         Move selection"),
        Line::from("  Enter         Confirm this step and continue"),
        Line::from("  Esc           Back to the previous step"),
        Line::from("  d / p         Case screen: argue as defendant / plaintiff"),
        Line::from("  t, h / l      Coach screen: coach type, tone down / up"),
        Line::from("  1-4, r        Coach screen: toggle options, cycle recap style"),
        Line::from("  o t x p       Case file: objective, time limit, objections, pauses"),
        Line::from(""),
        Line::from("Strategy"),
        Line::from("  Tab           Switch between arguments, evidence, requirements"),
        Line::from("  a / d         Add / delete in the focused section"),
        Line::from("  1-9           Link the selected evidence to argument N"),
        Line::from("  c             Ask your coach about the current draft"),
        Line::from("  Enter         Enter the courtroom"),
        Line::from(""),
        Line::from("Hearing"),
        Line::from("  i             Address the court (4 rounds)"),
        Line::from("  o             Raise an objection (limited per session)"),
        Line::from("  p             Pause the clock for 10 seconds (3 per session)"),
        Line::from("  c             Deliver your conclusion after the last round"),
        Line::from("  e             End the hearing early (asks to confirm)"),
        Line::from("  j / k, G      Scroll the transcript, follow newest"),
        Line::from(""),
        Line::from("General"),
        Line::from("  b             Badge collection (case list and results)"),
        Line::from("  ?             Open / close this help overlay"),
        Line::from("  q             Quit (confirms during a hearing)"),
    ])
}

/// Renders a small yes/no dialog centred on the screen.
pub fn render_confirm(frame: &mut Frame, theme: &Theme, title: &str, question: &str) {
    let area = dialog_area(frame.area());
    frame.render_widget(Clear, area);

    let block = Block::bordered()
        .title(format!(" {title} "))
        .border_style(Style::default().fg(theme.border_active));
    let text = Text::from(vec![
        Line::from(""),
        Line::from(question.to_owned()),
        Line::from(""),
        Line::styled("[y] yes    [n] no", Style::default().add_modifier(Modifier::BOLD)),
    ]);
    frame.render_widget(
        Paragraph::new(text)
            .block(block)
            .centered()
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn dialog_area(screen: Rect) -> Rect {
    screen.centered(Constraint::Length(50.min(screen.width)), Constraint::Length(7))
}
