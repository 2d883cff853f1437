//! Coach, case file and strategy screens.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize as _},
    text::{Line, Span, Text},
    widgets::{Gauge, List, ListItem, ListState, Paragraph, Wrap},
};

use courtroom_core::types::{CoachType, Objective, RecapStyle};

use crate::app::{AppState, InsertTarget, Mode, StrategySection};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

pub fn render_coach(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let coach = &state.coach;
    let [type_area, tone_area, options_area] = area.layout(&Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Fill(1),
    ]));

    let type_line = Line::from(vec![
        choice("Lawyer (formal)", coach.coach_type == CoachType::Lawyer, theme),
        Span::raw("    "),
        choice("Friend (plain language)", coach.coach_type == CoachType::Normal, theme),
    ]);
    frame.render_widget(panel_block("[t] Coach type", false, theme), type_area);
    frame.render_widget(Paragraph::new(type_line), inner_rect(type_area));

    frame.render_widget(panel_block("[h/l] Tone: legal ↔ casual", false, theme), tone_area);
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(theme.accent))
            .percent(u16::from(coach.tone.min(100)))
            .label(format!("{}", coach.tone)),
        inner_rect(tone_area),
    );

    let options = &coach.options;
    let lines = vec![
        toggle_line("1", "Opening suggestions", options.opening_suggestion, theme),
        toggle_line("2", "Evidence reminders", options.evidence_reminder, theme),
        toggle_line("3", "Automatic objections", options.auto_objection, theme),
        toggle_line("4", "Risk warnings", options.risk_warning, theme),
        Line::from(""),
        Line::from(vec![
            Span::raw("[r] Recap style: "),
            Span::styled(recap_label(coach.recap_style), Style::default().fg(theme.accent)),
        ]),
    ];
    frame.render_widget(panel_block("Options", true, theme), options_area);
    frame.render_widget(Paragraph::new(Text::from(lines)), inner_rect(options_area));
}

pub fn render_case_file(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let settings = &state.settings;
    let objective = match state.objective {
        Objective::Compensation => "Claim compensation",
        Objective::Mediation => "Seek mediation",
    };
    let lines = vec![
        setting_line("o", "Objective", objective.to_owned(), theme),
        Line::from(""),
        setting_line("t", "Time limit", format!("{} minutes", settings.time_limit_minutes), theme),
        setting_line("x", "Objections", format!("{} per session", settings.objection_limit), theme),
        setting_line(
            "p",
            "Pauses",
            if settings.pause_enabled { "allowed (3 × 10 s)" } else { "disabled" }.to_owned(),
            theme,
        ),
    ];
    frame.render_widget(panel_block("Case file", true, theme), area);
    frame.render_widget(Paragraph::new(Text::from(lines)), inner_rect(area));
}

pub fn render_strategy(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let draft = &state.draft;
    let [lists_area, lower_area] =
        area.layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(7)]));
    let [arguments_area, evidence_area] = lists_area.layout(&Layout::horizontal([
        Constraint::Percentage(55),
        Constraint::Percentage(45),
    ]));
    let [requirements_area, coach_area] = lower_area.layout(&Layout::horizontal([
        Constraint::Percentage(55),
        Constraint::Percentage(45),
    ]));

    let arguments: Vec<ListItem> = draft
        .strategy
        .arguments
        .iter()
        .enumerate()
        .map(|(i, a)| ListItem::new(format!("{}. {}", i + 1, a.text)))
        .collect();
    render_section(
        frame,
        arguments_area,
        "Arguments",
        arguments,
        draft.section == StrategySection::Arguments,
        draft.selected_argument,
        theme,
    );

    let evidence: Vec<ListItem> = draft
        .strategy
        .evidences
        .iter()
        .map(|e| {
            let links: Vec<String> = e
                .linked_argument_ids
                .iter()
                .filter_map(|id| draft.strategy.arguments.iter().position(|a| a.id == *id))
                .map(|index| format!("#{}", index + 1))
                .collect();
            let links = if links.is_empty() { "unlinked".to_owned() } else { links.join(" ") };
            ListItem::new(vec![
                Line::from(e.name.as_str()),
                Line::from(format!("  → {links}")).fg(theme.muted),
            ])
        })
        .collect();
    render_section(
        frame,
        evidence_area,
        "Evidence",
        evidence,
        draft.section == StrategySection::Evidence,
        draft.selected_evidence,
        theme,
    );

    let editing_requirements =
        state.mode == Mode::Insert && state.insert_target == InsertTarget::Requirements;
    let requirements = if editing_requirements {
        state.input.as_str()
    } else {
        draft.strategy.requirements.as_str()
    };
    frame.render_widget(
        panel_block(
            "Requirements",
            draft.section == StrategySection::Requirements,
            theme,
        ),
        requirements_area,
    );
    frame.render_widget(
        Paragraph::new(requirements).wrap(Wrap { trim: false }),
        inner_rect(requirements_area),
    );

    let advice = if state.coach_pending {
        Line::from("Your coach is reading the draft...").fg(theme.muted)
    } else if let Some(advice) = &state.coach_advice {
        Line::from(advice.as_str())
    } else {
        Line::from("Press c to ask your coach for feedback.").fg(theme.muted)
    };
    frame.render_widget(panel_block("Coach", false, theme), coach_area);
    frame.render_widget(
        Paragraph::new(advice).wrap(Wrap { trim: true }),
        inner_rect(coach_area),
    );

    if state.mode == Mode::Insert
        && matches!(state.insert_target, InsertTarget::Argument | InsertTarget::Evidence)
    {
        render_input_line(frame, lists_area, state, theme);
    }
}

fn render_section(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    items: Vec<ListItem>,
    focused: bool,
    selected: usize,
    theme: &Theme,
) {
    let empty = items.is_empty();
    let list = List::new(items)
        .block(panel_block(title, focused, theme))
        .highlight_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ");
    let mut list_state = ListState::default().with_selected((focused && !empty).then_some(selected));
    frame.render_stateful_widget(list, area, &mut list_state);
    if empty {
        frame.render_widget(
            Paragraph::new(Line::from("Press a to add.").fg(theme.muted)),
            inner_rect(area),
        );
    }
}

/// Draws the insert buffer as a one-line box at the bottom of `area`.
fn render_input_line(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let [_, input_area] =
        area.layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(3)]));
    let title = match state.insert_target {
        InsertTarget::Evidence => "New evidence",
        _ => "New argument",
    };
    frame.render_widget(ratatui::widgets::Clear, input_area);
    frame.render_widget(
        Paragraph::new(state.input.as_str()).block(panel_block(title, true, theme)),
        input_area,
    );
}

fn choice(label: &str, selected: bool, theme: &Theme) -> Span<'static> {
    let marker_style = if selected {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.muted)
    };
    Span::styled(if selected { format!("◉ {label}") } else { format!("○ {label}") }, marker_style)
}

fn toggle_line(key: &str, label: &str, on: bool, theme: &Theme) -> Line<'static> {
    let (mark, color) = if on { ("[x]", theme.accent) } else { ("[ ]", theme.muted) };
    Line::from(vec![
        Span::raw(format!("{key}  ")),
        Span::styled(mark, Style::default().fg(color)),
        Span::raw(format!(" {label}")),
    ])
}

fn setting_line(key: &str, label: &str, value: String, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("[{key}] "), Style::default().fg(theme.muted)),
        Span::raw(format!("{label:<12}")),
        Span::styled(value, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
    ])
}

fn recap_label(style: RecapStyle) -> &'static str {
    match style {
        RecapStyle::Detailed => "detailed",
        RecapStyle::Summary => "summary",
        RecapStyle::Visual => "visual",
    }
}
