//! Case list and case detail (role choice) screens.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize as _},
    text::{Line, Span, Text},
    widgets::{List, ListItem, Paragraph, Wrap},
};

use courtroom_core::catalog;
use courtroom_core::types::{Role, Scenario};

use crate::app::AppState;
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

pub fn render_scenario_list(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let [list_area, preview_area] = area.layout(&Layout::horizontal([
        Constraint::Percentage(40),
        Constraint::Percentage(60),
    ]));

    let items: Vec<ListItem> = catalog::scenarios()
        .iter()
        .map(|s| {
            ListItem::new(vec![
                Line::from(s.name).bold(),
                Line::from(format!(
                    "  {} · {} min",
                    difficulty_stars(s),
                    s.duration_minutes
                ))
                .fg(theme.muted),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(panel_block("Choose a case", true, theme))
        .highlight_style(Style::default().fg(theme.accent).add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");
    frame.render_stateful_widget(list, list_area, &mut state.scenario_list);

    let scenario = state.highlighted_scenario();
    let mut lines = vec![
        Line::from(scenario.name).fg(theme.accent).bold(),
        Line::from(scenario.description),
        Line::from(""),
        Line::from(vec![
            Span::raw("Difficulty: "),
            Span::raw(scenario.difficulty_label()).bold(),
            Span::raw(format!("   Duration: {} minutes", scenario.duration_minutes)),
        ]),
        Line::from(""),
        Line::from("Skills practised:").bold(),
    ];
    lines.extend(scenario.skills.iter().map(|skill| Line::from(format!("  • {skill}"))));

    frame.render_widget(panel_block("Preview", false, theme), preview_area);
    frame.render_widget(
        Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false }),
        inner_rect(preview_area),
    );
}

pub fn render_scenario_detail(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    scenario: Option<&Scenario>,
    theme: &Theme,
) {
    let Some(scenario) = scenario else {
        frame.render_widget(Paragraph::new("No case selected."), area);
        return;
    };

    let [case_area, role_area] =
        area.layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(5)]));

    let mut lines: Vec<Line> = scenario.summary.lines().map(Line::from).collect();
    lines.push(Line::from(""));
    lines.push(Line::from("Facts").bold());
    lines.extend(
        scenario
            .facts
            .iter()
            .enumerate()
            .map(|(i, fact)| Line::from(format!("  {}. {fact}", i + 1))),
    );

    frame.render_widget(panel_block(scenario.name, false, theme), case_area);
    frame.render_widget(
        Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false }),
        inner_rect(case_area),
    );

    let role_line = Line::from(vec![
        role_choice("[d] Defendant", state.role == Role::Defendant, theme),
        Span::raw("     "),
        role_choice("[p] Plaintiff", state.role == Role::Plaintiff, theme),
    ]);
    let hint = Line::from(format!("You will argue as {}.", state.role.counsel_title())).fg(theme.muted);

    frame.render_widget(panel_block("Your role", true, theme), role_area);
    frame.render_widget(
        Paragraph::new(Text::from(vec![role_line, Line::from(""), hint])).centered(),
        inner_rect(role_area),
    );
}

fn role_choice<'a>(label: &'a str, selected: bool, theme: &Theme) -> Span<'a> {
    if selected {
        Span::styled(
            label,
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD | Modifier::REVERSED),
        )
    } else {
        Span::styled(label, Style::default().fg(theme.muted))
    }
}

fn difficulty_stars(scenario: &Scenario) -> String {
    let filled = usize::from(scenario.difficulty.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}
