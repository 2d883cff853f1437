//! Keybinding dispatcher for courtroom.
//!
//! Translates crossterm `KeyEvent`s into `AppState` mutations and returns a
//! `KeyAction` telling the event loop whether to continue, quit, or run a
//! session [`Command`]. The dispatcher branches first on `state.mode`, then on
//! `state.screen`, so each screen has an isolated handler.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use courtroom_core::flow::{ConclusionReason, LiveRound};
use courtroom_core::types::{
    CoachType, Objective, RecapStyle, Role, OBJECTION_LIMIT_CHOICES, TIME_LIMIT_CHOICES,
};

use crate::app::{cycle, AppState, InsertTarget, Mode, Screen, StrategySection};
use crate::command::Command;

const TONE_STEP: u8 = 10;

/// Control-flow signal returned from the key dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    Continue,
    Quit,
    /// Run a command against the session flow controller.
    Run(Command),
}

/// Dispatches a key event to the handler matching the current mode.
///
/// `live` is the running hearing, if any; it gates the in-round actions.
pub fn handle_key(key: KeyEvent, state: &mut AppState, live: Option<&LiveRound>) -> KeyAction {
    match state.mode {
        Mode::HelpOverlay => handle_help(key, state),
        Mode::ConfirmEndEarly => handle_confirm_end_early(key, state),
        Mode::ConfirmQuit => handle_confirm_quit(key, state),
        Mode::Insert => handle_insert(key, state),
        Mode::Normal => handle_normal(key, state, live),
    }
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_normal(key: KeyEvent, state: &mut AppState, live: Option<&LiveRound>) -> KeyAction {
    let hearing_open = live.is_some_and(|l| !l.is_concluded());
    match key.code {
        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
            return KeyAction::Continue;
        }
        KeyCode::Char('q') => {
            if hearing_open {
                state.mode = Mode::ConfirmQuit;
                return KeyAction::Continue;
            }
            return KeyAction::Quit;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return KeyAction::Quit;
        }
        _ => {}
    }

    match state.screen {
        Screen::ScenarioList => handle_scenario_list(key, state),
        Screen::ScenarioDetail => handle_scenario_detail(key, state),
        Screen::Coach => handle_coach(key, state),
        Screen::CaseFile => handle_case_file(key, state),
        Screen::Strategy => handle_strategy(key, state),
        Screen::Hearing => handle_hearing(key, state, live),
        Screen::Results => handle_results(key),
        Screen::Badges => handle_badges(key, state),
    }
}

fn handle_scenario_list(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.next_scenario(),
        KeyCode::Char('k') | KeyCode::Up => state.prev_scenario(),
        KeyCode::Enter => {
            return KeyAction::Run(Command::SelectScenario(state.highlighted_scenario().id));
        }
        KeyCode::Char('b') => return KeyAction::Run(Command::OpenBadges),
        _ => {}
    }
    KeyAction::Continue
}

fn handle_scenario_detail(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('d') => state.role = Role::Defendant,
        KeyCode::Char('p') => state.role = Role::Plaintiff,
        KeyCode::Char('h') | KeyCode::Char('l') | KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
            state.role = match state.role {
                Role::Defendant => Role::Plaintiff,
                Role::Plaintiff => Role::Defendant,
            };
        }
        KeyCode::Enter => return KeyAction::Run(Command::ChooseRole(state.role)),
        KeyCode::Esc => state.screen = Screen::ScenarioList,
        _ => {}
    }
    KeyAction::Continue
}

fn handle_coach(key: KeyEvent, state: &mut AppState) -> KeyAction {
    let coach = &mut state.coach;
    match key.code {
        KeyCode::Char('t') => {
            coach.coach_type = cycle(&[CoachType::Lawyer, CoachType::Normal], coach.coach_type);
        }
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Char('-') => {
            coach.tone = coach.tone.saturating_sub(TONE_STEP);
        }
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Char('+') => {
            coach.tone = coach.tone.saturating_add(TONE_STEP).min(100);
        }
        KeyCode::Char('1') => coach.options.opening_suggestion ^= true,
        KeyCode::Char('2') => coach.options.evidence_reminder ^= true,
        KeyCode::Char('3') => coach.options.auto_objection ^= true,
        KeyCode::Char('4') => coach.options.risk_warning ^= true,
        KeyCode::Char('r') => {
            coach.recap_style = cycle(
                &[RecapStyle::Detailed, RecapStyle::Summary, RecapStyle::Visual],
                coach.recap_style,
            );
        }
        KeyCode::Enter => return KeyAction::Run(Command::ConfigureCoach(state.coach)),
        KeyCode::Esc => state.screen = Screen::ScenarioDetail,
        _ => {}
    }
    KeyAction::Continue
}

fn handle_case_file(key: KeyEvent, state: &mut AppState) -> KeyAction {
    let settings = &mut state.settings;
    match key.code {
        KeyCode::Char('o') => {
            state.objective =
                cycle(&[Objective::Compensation, Objective::Mediation], state.objective);
        }
        KeyCode::Char('t') => {
            settings.time_limit_minutes = cycle(&TIME_LIMIT_CHOICES, settings.time_limit_minutes);
        }
        KeyCode::Char('x') => {
            settings.objection_limit = cycle(&OBJECTION_LIMIT_CHOICES, settings.objection_limit);
        }
        KeyCode::Char('p') => settings.pause_enabled ^= true,
        KeyCode::Enter => {
            return KeyAction::Run(Command::ConfigureCase {
                objective: state.objective,
                settings: state.settings,
            });
        }
        KeyCode::Esc => state.screen = Screen::Coach,
        _ => {}
    }
    KeyAction::Continue
}

fn handle_strategy(key: KeyEvent, state: &mut AppState) -> KeyAction {
    let draft = &mut state.draft;
    match key.code {
        KeyCode::Tab => draft.section = draft.section.next(),
        KeyCode::Char('j') | KeyCode::Down => draft.select_next(),
        KeyCode::Char('k') | KeyCode::Up => draft.select_prev(),
        KeyCode::Char('a') => {
            let target = match draft.section {
                StrategySection::Arguments => InsertTarget::Argument,
                StrategySection::Evidence => InsertTarget::Evidence,
                StrategySection::Requirements => InsertTarget::Requirements,
            };
            state.begin_insert(target);
        }
        KeyCode::Char('d') => draft.delete_selected(),
        KeyCode::Char(c @ '1'..='9') if draft.section == StrategySection::Evidence => {
            let index = c as usize - '1' as usize;
            draft.toggle_link(index);
        }
        KeyCode::Char('c') => {
            if state.coach_pending {
                state.notify("The coach is still thinking...");
            } else {
                return KeyAction::Run(Command::AskCoach(draft.strategy.clone()));
            }
        }
        KeyCode::Enter => return KeyAction::Run(Command::BeginHearing(draft.strategy.clone())),
        KeyCode::Esc => state.screen = Screen::CaseFile,
        _ => {}
    }
    KeyAction::Continue
}

fn handle_hearing(key: KeyEvent, state: &mut AppState, live: Option<&LiveRound>) -> KeyAction {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            state.scroll_transcript_down(1);
            return KeyAction::Continue;
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.scroll_transcript_up(1);
            return KeyAction::Continue;
        }
        KeyCode::Char('G') => {
            state.follow_transcript = true;
            return KeyAction::Continue;
        }
        _ => {}
    }

    let Some(live) = live.filter(|l| !l.is_concluded()) else {
        if key.code == KeyCode::Enter && live.is_some() {
            return KeyAction::Run(Command::ShowResults);
        }
        return KeyAction::Continue;
    };

    match key.code {
        KeyCode::Char('i') | KeyCode::Enter => {
            if live.accepts_arguments() {
                state.begin_insert(InsertTarget::Plea);
            } else if live.awaiting_opponent() {
                state.notify("Opposing counsel is responding...");
            } else {
                state.notify("All rounds argued. Press c to conclude.");
            }
        }
        KeyCode::Char('o') => return KeyAction::Run(Command::RaiseObjection),
        KeyCode::Char('p') => return KeyAction::Run(Command::Pause),
        KeyCode::Char('c') => {
            if live.can_conclude() {
                return KeyAction::Run(Command::Conclude(ConclusionReason::AllRoundsCompleted));
            }
            state.notify("Argue every round first, or press e to end early.");
        }
        KeyCode::Char('e') => state.mode = Mode::ConfirmEndEarly,
        _ => {}
    }
    KeyAction::Continue
}

fn handle_results(key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => {
            KeyAction::Run(Command::LeaveResults { show_badges: false })
        }
        KeyCode::Char('b') => KeyAction::Run(Command::LeaveResults { show_badges: true }),
        _ => KeyAction::Continue,
    }
}

fn handle_badges(key: KeyEvent, state: &mut AppState) -> KeyAction {
    let len = courtroom_core::catalog::badges().len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            let next = state.badge_list.selected().map_or(0, |i| (i + 1).min(len - 1));
            state.badge_list.select(Some(next));
        }
        KeyCode::Char('k') | KeyCode::Up => {
            let prev = state.badge_list.selected().map_or(0, |i| i.saturating_sub(1));
            state.badge_list.select(Some(prev));
        }
        KeyCode::Esc | KeyCode::Enter => state.screen = Screen::ScenarioList,
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Overlays and dialogs
// ---------------------------------------------------------------------------

fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') => state.help_scroll = state.help_scroll.saturating_add(1),
        KeyCode::Char('k') => state.help_scroll = state.help_scroll.saturating_sub(1),
        KeyCode::Char('g') => state.help_scroll = 0,
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.mode = Mode::Normal,
        _ => {}
    }
    KeyAction::Continue
}

fn handle_confirm_end_early(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            state.mode = Mode::Normal;
            KeyAction::Run(Command::Conclude(ConclusionReason::EndedEarly))
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            state.mode = Mode::Normal;
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

fn handle_confirm_quit(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => KeyAction::Quit,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            state.mode = Mode::Normal;
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

// ---------------------------------------------------------------------------
// Insert mode
// ---------------------------------------------------------------------------

/// Edits the input buffer; Enter commits it to the current insert target.
fn handle_insert(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Esc => {
            state.input.clear();
            state.mode = Mode::Normal;
        }
        KeyCode::Backspace => {
            state.input.pop();
        }
        KeyCode::Enter => {
            let text = state.take_input();
            match state.insert_target {
                InsertTarget::Requirements => state.draft.strategy.requirements = text,
                _ if text.is_empty() => {}
                InsertTarget::Argument => state.draft.add_argument(text),
                InsertTarget::Evidence => state.draft.add_evidence(text),
                InsertTarget::Plea => return KeyAction::Run(Command::SubmitArgument(text)),
            }
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => state.input.push(c),
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Scroll wheel moves the help overlay or the hearing transcript by 3 lines.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) -> KeyAction {
    let up = match mouse.kind {
        MouseEventKind::ScrollUp => true,
        MouseEventKind::ScrollDown => false,
        _ => return KeyAction::Continue,
    };
    if state.mode == Mode::HelpOverlay {
        state.help_scroll = if up {
            state.help_scroll.saturating_sub(3)
        } else {
            state.help_scroll.saturating_add(3)
        };
    } else if state.screen == Screen::Hearing {
        if up {
            state.scroll_transcript_up(3);
        } else {
            state.scroll_transcript_down(3);
        }
    }
    KeyAction::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtroom_core::types::{CoachConfig, SessionSettings};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            handle_key(press(KeyCode::Char(c)), state, None);
        }
    }

    #[test]
    fn enter_on_case_list_selects_highlighted_scenario() {
        let mut state = AppState::default();
        handle_key(press(KeyCode::Char('j')), &mut state, None);
        let action = handle_key(press(KeyCode::Enter), &mut state, None);
        assert_eq!(action, KeyAction::Run(Command::SelectScenario(2)));
    }

    #[test]
    fn help_overlay_opens_and_closes() {
        let mut state = AppState::default();
        handle_key(press(KeyCode::Char('?')), &mut state, None);
        assert_eq!(state.mode, Mode::HelpOverlay);
        handle_key(press(KeyCode::Char('j')), &mut state, None);
        assert_eq!(state.help_scroll, 1);
        handle_key(press(KeyCode::Esc), &mut state, None);
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn coach_tone_stays_in_range() {
        let mut state = AppState {
            screen: Screen::Coach,
            ..AppState::default()
        };
        for _ in 0..8 {
            handle_key(press(KeyCode::Char('l')), &mut state, None);
        }
        assert_eq!(state.coach.tone, 100);
        for _ in 0..12 {
            handle_key(press(KeyCode::Char('h')), &mut state, None);
        }
        assert_eq!(state.coach.tone, 0);

        handle_key(press(KeyCode::Char('t')), &mut state, None);
        handle_key(press(KeyCode::Char('3')), &mut state, None);
        let expected = CoachConfig {
            coach_type: CoachType::Normal,
            tone: 0,
            options: courtroom_core::types::CoachOptions {
                auto_objection: true,
                ..Default::default()
            },
            ..CoachConfig::default()
        };
        assert_eq!(
            handle_key(press(KeyCode::Enter), &mut state, None),
            KeyAction::Run(Command::ConfigureCoach(expected))
        );
    }

    #[test]
    fn case_file_cycles_allowed_values() {
        let mut state = AppState {
            screen: Screen::CaseFile,
            ..AppState::default()
        };
        handle_key(press(KeyCode::Char('t')), &mut state, None);
        handle_key(press(KeyCode::Char('x')), &mut state, None);
        handle_key(press(KeyCode::Char('p')), &mut state, None);
        assert_eq!(
            state.settings,
            SessionSettings {
                time_limit_minutes: 15,
                objection_limit: 5,
                pause_enabled: false,
            }
        );
    }

    #[test]
    fn strategy_editor_adds_and_links() {
        let mut state = AppState {
            screen: Screen::Strategy,
            ..AppState::default()
        };
        handle_key(press(KeyCode::Char('a')), &mut state, None);
        assert_eq!(state.mode, Mode::Insert);
        type_text(&mut state, "The deposit was never returned");
        handle_key(press(KeyCode::Enter), &mut state, None);
        assert_eq!(state.mode, Mode::Normal);

        handle_key(press(KeyCode::Tab), &mut state, None);
        handle_key(press(KeyCode::Char('a')), &mut state, None);
        type_text(&mut state, "Bank statement");
        handle_key(press(KeyCode::Enter), &mut state, None);
        handle_key(press(KeyCode::Char('1')), &mut state, None);

        let strategy = &state.draft.strategy;
        assert_eq!(strategy.arguments.len(), 1);
        assert_eq!(strategy.evidences[0].name, "Bank statement");
        assert_eq!(strategy.evidences[0].linked_argument_ids, vec![strategy.arguments[0].id]);

        let action = handle_key(press(KeyCode::Enter), &mut state, None);
        assert!(matches!(action, KeyAction::Run(Command::BeginHearing(_))));
    }

    #[test]
    fn blank_input_adds_nothing() {
        let mut state = AppState {
            screen: Screen::Strategy,
            ..AppState::default()
        };
        handle_key(press(KeyCode::Char('a')), &mut state, None);
        type_text(&mut state, "   ");
        handle_key(press(KeyCode::Enter), &mut state, None);
        assert!(state.draft.strategy.arguments.is_empty());
    }

    #[test]
    fn end_early_requires_confirmation() {
        let mut state = AppState {
            screen: Screen::Hearing,
            mode: Mode::ConfirmEndEarly,
            ..AppState::default()
        };
        assert_eq!(
            handle_key(press(KeyCode::Char('n')), &mut state, None),
            KeyAction::Continue
        );
        assert_eq!(state.mode, Mode::Normal);

        state.mode = Mode::ConfirmEndEarly;
        assert_eq!(
            handle_key(press(KeyCode::Char('y')), &mut state, None),
            KeyAction::Run(Command::Conclude(ConclusionReason::EndedEarly))
        );
    }

    #[test]
    fn quit_without_hearing_is_immediate() {
        let mut state = AppState::default();
        assert_eq!(handle_key(press(KeyCode::Char('q')), &mut state, None), KeyAction::Quit);
    }

    #[test]
    fn enter_without_a_round_stays_on_hearing() {
        let mut state = AppState {
            screen: Screen::Hearing,
            ..AppState::default()
        };
        assert_eq!(handle_key(press(KeyCode::Enter), &mut state, None), KeyAction::Continue);
        assert_eq!(state.screen, Screen::Hearing);
    }

    #[test]
    fn results_leave_to_badges() {
        let mut state = AppState {
            screen: Screen::Results,
            ..AppState::default()
        };
        assert_eq!(
            handle_key(press(KeyCode::Char('b')), &mut state, None),
            KeyAction::Run(Command::LeaveResults { show_badges: true })
        );
    }
}
