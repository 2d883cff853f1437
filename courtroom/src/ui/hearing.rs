//! The live hearing: transcript, argument input and the clock sidebar.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Modifier, Style, Stylize as _},
    text::{Line, Span, Text},
    widgets::{Gauge, Paragraph, Wrap},
};

use courtroom_core::clock::{ClockState, PAUSE_BUDGET};
use courtroom_core::flow::LiveRound;
use courtroom_core::types::{Exchange, ExchangeRole, TOTAL_ROUNDS};

use crate::app::{AppState, InsertTarget, Mode};
use crate::theme::Theme;
use crate::ui::layout::{hearing_layout, inner_rect, panel_block};

pub fn render_hearing(
    frame: &mut Frame,
    body: Rect,
    state: &mut AppState,
    live: Option<&LiveRound>,
    theme: &Theme,
) {
    let Some(live) = live else {
        frame.render_widget(Paragraph::new("No hearing in progress."), body);
        return;
    };

    let [transcript_area, input_area, sidebar_area] = hearing_layout(body);
    render_transcript(frame, transcript_area, state, live, theme);
    render_input(frame, input_area, state, live, theme);
    if sidebar_area.width > 0 {
        render_sidebar(frame, sidebar_area, live, theme);
    }
}

fn render_transcript(
    frame: &mut Frame,
    area: Rect,
    state: &mut AppState,
    live: &LiveRound,
    theme: &Theme,
) {
    let title = format!("{} · {}", live.scenario().name, live.record().role.map_or("", |r| r.counsel_title()));
    let inner = inner_rect(area);

    let mut lines = Vec::new();
    for exchange in live.transcript() {
        lines.extend(exchange_lines(exchange, theme));
        lines.push(Line::from(""));
    }
    if live.awaiting_opponent() {
        lines.push(Line::from("Opposing counsel is preparing a response...").fg(theme.muted).italic());
    }

    let height = wrapped_height(&lines, inner.width);
    let max_scroll = height.saturating_sub(inner.height);
    if state.follow_transcript || state.transcript_scroll >= max_scroll {
        state.transcript_scroll = max_scroll;
        state.follow_transcript = true;
    }

    frame.render_widget(panel_block(&title, true, theme), area);
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .scroll((state.transcript_scroll, 0)),
        inner,
    );
}

fn exchange_lines<'a>(exchange: &'a Exchange, theme: &Theme) -> Vec<Line<'a>> {
    let speaker = match exchange.role {
        ExchangeRole::User => "You",
        ExchangeRole::Opponent => "Opposing counsel",
        ExchangeRole::System => "Judge",
        ExchangeRole::Objection => "Objection",
    };
    let header = Line::from(vec![
        Span::styled(
            speaker,
            Style::default()
                .fg(theme.speaker(exchange.role))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            if exchange.round > 0 { format!("  round {}", exchange.round) } else { String::new() },
            Style::default().fg(theme.muted),
        ),
    ]);
    let mut lines = vec![header];
    lines.extend(exchange.text.lines().map(|l| Line::from(format!("  {l}"))));
    lines
}

/// Approximate rendered height of `lines` when word-wrapped to `width` columns.
fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    if width == 0 {
        return 0;
    }
    let width = usize::from(width);
    let rows: usize = lines
        .iter()
        .map(|line| line.width().div_ceil(width).max(1))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn render_input(frame: &mut Frame, area: Rect, state: &AppState, live: &LiveRound, theme: &Theme) {
    let typing = state.mode == Mode::Insert && state.insert_target == InsertTarget::Plea;
    let (title, body) = if typing {
        ("Address the court (Enter to submit)", Line::from(state.input.as_str()))
    } else if live.is_concluded() {
        ("Hearing closed", Line::from("").fg(theme.muted))
    } else if live.can_conclude() {
        ("Closing", Line::from("All rounds argued. Press c to conclude.").fg(theme.muted))
    } else if live.awaiting_opponent() {
        ("Waiting", Line::from("Opposing counsel has the floor.").fg(theme.muted))
    } else {
        ("Your turn", Line::from("Press i to present your argument.").fg(theme.muted))
    };

    frame.render_widget(
        Paragraph::new(body).block(panel_block(title, typing, theme)),
        area,
    );

    if typing {
        let inner = inner_rect(area);
        let typed = u16::try_from(state.input.chars().count()).unwrap_or(u16::MAX);
        let x = inner.x.saturating_add(typed.min(inner.width.saturating_sub(1)));
        frame.set_cursor_position(Position::new(x, inner.y));
    }
}

fn render_sidebar(frame: &mut Frame, area: Rect, live: &LiveRound, theme: &Theme) {
    let clock = live.clock();
    let [clock_area, status_area] =
        area.layout(&Layout::vertical([Constraint::Length(5), Constraint::Fill(1)]));

    let remaining = clock.remaining();
    let clock_color = theme.clock(clock.fraction_remaining(), clock.is_paused());
    frame.render_widget(panel_block("Clock", false, theme), clock_area);
    let [time_row, gauge_row] = inner_rect(clock_area)
        .layout(&Layout::vertical([Constraint::Length(1), Constraint::Length(1)]));
    frame.render_widget(
        Paragraph::new(Line::from(format!("{:02}:{:02}", remaining / 60, remaining % 60)))
            .style(Style::default().fg(clock_color).add_modifier(Modifier::BOLD))
            .centered(),
        time_row,
    );
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(clock_color))
            .ratio(clock.fraction_remaining().clamp(0.0, 1.0))
            .label(""),
        gauge_row,
    );

    let round = live.current_round().min(TOTAL_ROUNDS);
    let mut lines = vec![
        stat_line("Round", format!("{round}/{TOTAL_ROUNDS}"), theme),
        stat_line("Argued", format!("{}/{TOTAL_ROUNDS}", live.rounds_completed()), theme),
        stat_line("Objections", live.objections_left().to_string(), theme),
        stat_line(
            "Pauses",
            if live.record().settings.is_some_and(|s| s.pause_enabled) {
                format!("{}/{PAUSE_BUDGET}", clock.pauses_left())
            } else {
                "off".to_owned()
            },
            theme,
        ),
        Line::from(""),
    ];
    match clock.state() {
        ClockState::Paused { resumes_in } => {
            lines.push(Line::from(format!("⏸ Paused, resumes in {resumes_in}s")).fg(theme.clock_paused));
        }
        ClockState::Expired => lines.push(Line::from("Time is up").fg(theme.clock_critical).bold()),
        _ if live.awaiting_opponent() => {
            lines.push(Line::from("Opponent speaking").fg(theme.speaker_opponent));
        }
        _ => {}
    }

    frame.render_widget(panel_block("Hearing", false, theme), status_area);
    frame.render_widget(Paragraph::new(Text::from(lines)), inner_rect(status_area));
}

fn stat_line(label: &str, value: String, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<11}"), Style::default().fg(theme.muted)),
        Span::styled(value, Style::default().fg(theme.text).add_modifier(Modifier::BOLD)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_height_counts_wrapped_rows() {
        let lines = vec![Line::from("a".repeat(25)), Line::from(""), Line::from("short")];
        assert_eq!(wrapped_height(&lines, 10), 5);
        assert_eq!(wrapped_height(&lines, 0), 0);
    }
}
