//! Results and badge collection screens.

use chrono::DateTime;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize as _},
    text::{Line, Span, Text},
    widgets::{Gauge, List, ListItem, Paragraph},
};

use courtroom_core::catalog;
use courtroom_core::types::{BadgeRecord, ScoreVector};

use crate::app::AppState;
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

pub fn render_results(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let Some(verdict) = &state.verdict else {
        frame.render_widget(Paragraph::new("No verdict yet."), area);
        return;
    };

    let [grade_area, scores_area, badges_area] = area.layout(&Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(12),
        Constraint::Fill(1),
    ]));

    let total = verdict.scores.total();
    let grade_line = Line::from(vec![
        Span::styled(
            format!(" {:?} ", verdict.grade),
            Style::default()
                .fg(theme.grade(verdict.grade))
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        ),
        Span::raw("  "),
        Span::styled(verdict.grade.label(), Style::default().fg(theme.grade(verdict.grade)).bold()),
        Span::styled(format!("   {total}/500"), Style::default().fg(theme.muted)),
    ]);
    frame.render_widget(panel_block("Verdict", true, theme), grade_area);
    frame.render_widget(Paragraph::new(grade_line).centered(), inner_rect(grade_area));

    frame.render_widget(panel_block("Scores", false, theme), scores_area);
    let rows = score_rows(&verdict.scores);
    let row_areas = Layout::vertical(rows.iter().map(|_| Constraint::Length(2)))
        .split(inner_rect(scores_area));
    for ((label, value), row) in rows.iter().zip(row_areas.iter()) {
        let [label_area, gauge_area] = row.layout(&Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
        ]));
        frame.render_widget(Paragraph::new(*label), label_area);
        frame.render_widget(
            Gauge::default()
                .gauge_style(Style::default().fg(theme.score_bar))
                .percent(u16::try_from(*value).unwrap_or(100).min(100))
                .label(format!("{value}")),
            gauge_area,
        );
    }

    let badge_lines: Vec<Line> = if verdict.earned_badges.is_empty() {
        vec![Line::from("No badges this time.").fg(theme.muted)]
    } else {
        verdict
            .earned_badges
            .iter()
            .map(|id| match catalog::badge(id) {
                Some(info) => Line::from(vec![
                    Span::raw(format!("{} ", info.icon)),
                    Span::styled(info.name, Style::default().fg(theme.badge_unlocked).bold()),
                    Span::styled(format!("  {}", info.description), Style::default().fg(theme.muted)),
                ]),
                None => Line::from(id.as_str()),
            })
            .collect()
    };
    frame.render_widget(panel_block("Badges earned", false, theme), badges_area);
    frame.render_widget(Paragraph::new(Text::from(badge_lines)), inner_rect(badges_area));
}

fn score_rows(scores: &ScoreVector) -> [(&'static str, u32); 5] {
    [
        ("Legal accuracy", scores.legal_accuracy),
        ("Evidence use", scores.evidence_use),
        ("Persuasion", scores.persuasion),
        ("Time management", scores.time_management),
        ("Courtroom etiquette", scores.etiquette),
    ]
}

pub fn render_badges(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let [summary_area, list_area] =
        area.layout(&Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]));

    let summary = match &state.badge_summary {
        Some(s) => format!(
            "{} of {} unlocked · {} earned in total",
            s.unlocked, s.catalog_size, s.total_earned
        ),
        None => "Collection not loaded.".to_owned(),
    };
    frame.render_widget(panel_block("Collection", false, theme), summary_area);
    frame.render_widget(Paragraph::new(summary).centered(), inner_rect(summary_area));

    let items: Vec<ListItem> = catalog::badges()
        .iter()
        .map(|info| badge_item(info, find_record(&state.badges, info.id), theme))
        .collect();
    let list = List::new(items)
        .block(panel_block("Badges", true, theme))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");
    frame.render_stateful_widget(list, list_area, &mut state.badge_list);
}

fn find_record<'a>(records: &'a [BadgeRecord], id: &str) -> Option<&'a BadgeRecord> {
    records.iter().find(|r| r.id == id)
}

fn badge_item<'a>(
    info: &'a catalog::BadgeInfo,
    record: Option<&BadgeRecord>,
    theme: &Theme,
) -> ListItem<'a> {
    match record {
        Some(record) => {
            let earned = DateTime::from_timestamp(record.last_earned_at, 0)
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            ListItem::new(vec![
                Line::from(vec![
                    Span::raw(format!("{} ", info.icon)),
                    Span::styled(info.name, Style::default().fg(theme.badge_unlocked).bold()),
                    Span::styled(format!("  ×{}", record.count), Style::default().fg(theme.accent)),
                    Span::styled(format!("  last {earned}"), Style::default().fg(theme.muted)),
                ]),
                Line::from(format!("   {}", info.description)).fg(theme.muted),
            ])
        }
        None => ListItem::new(vec![
            Line::from(vec![
                Span::raw("🔒 "),
                Span::styled(info.name, Style::default().fg(theme.badge_locked)),
            ]),
            Line::from(format!("   {}", info.description)).fg(theme.badge_locked),
        ]),
    }
}
