//! UI rendering for courtroom.
//!
//! `render()` is the single entry point called by the event loop's
//! `terminal.draw()` closure. Layout arithmetic and shared chrome live in
//! `layout.rs`; each screen has its own module.

mod hearing;
mod layout;
mod preparation;
mod results;
mod scenarios;
pub mod help;
pub mod keybindings;

use ratatui::Frame;

use courtroom_core::catalog;
use courtroom_core::flow::LiveRound;

use crate::app::{AppState, Mode, Screen};
use crate::theme::Theme;
use layout::{compute_layout, render_header, render_status_bar};

/// Renders one complete frame: breadcrumb header, the current screen, the status
/// bar, then any modal on top.
///
/// `live` is the running hearing, if any. Rendering may adjust scroll offsets in
/// `state` to keep them within the content drawn this frame.
pub fn render(frame: &mut Frame, state: &mut AppState, live: Option<&LiveRound>, theme: &Theme) {
    let [header, body, status_bar] = compute_layout(frame);

    render_header(frame, header, state, theme);

    match state.screen {
        Screen::ScenarioList => scenarios::render_scenario_list(frame, body, state, theme),
        Screen::ScenarioDetail => {
            let scenario = state.scenario_id.and_then(catalog::scenario);
            scenarios::render_scenario_detail(frame, body, state, scenario, theme);
        }
        Screen::Coach => preparation::render_coach(frame, body, state, theme),
        Screen::CaseFile => preparation::render_case_file(frame, body, state, theme),
        Screen::Strategy => preparation::render_strategy(frame, body, state, theme),
        Screen::Hearing => hearing::render_hearing(frame, body, state, live, theme),
        Screen::Results => results::render_results(frame, body, state, theme),
        Screen::Badges => results::render_badges(frame, body, state, theme),
    }

    render_status_bar(frame, status_bar, state, theme);

    match state.mode {
        Mode::HelpOverlay => help::render_help_overlay(frame, theme, state.help_scroll),
        Mode::ConfirmEndEarly => help::render_confirm(
            frame,
            theme,
            "End hearing",
            "End the hearing now? It will be scored as it stands.",
        ),
        Mode::ConfirmQuit => help::render_confirm(
            frame,
            theme,
            "Quit",
            "A hearing is in progress. Quit and discard it?",
        ),
        Mode::Normal | Mode::Insert => {}
    }
}
