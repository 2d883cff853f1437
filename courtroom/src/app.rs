//! Central UI state for courtroom.
//!
//! `AppState` holds everything the screens display that is not owned by the
//! session flow controller: the current screen and mode, form values being edited
//! before they are committed, the text input buffer, cached results, and the
//! status line. No rendering lives here; `ui` reads this state and
//! `ui::keybindings` mutates it.

use ratatui::widgets::ListState;

use courtroom_core::catalog;
use courtroom_core::types::{
    Argument, BadgeRecord, BadgeSummary, CoachConfig, Evidence, Objective, Role, Scenario,
    SessionSettings, Strategy, Verdict,
};
use courtroom_core::CourtroomError;

/// The screen sequence, in flow order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    #[default]
    ScenarioList,
    /// Case summary, facts and role choice.
    ScenarioDetail,
    Coach,
    CaseFile,
    Strategy,
    Hearing,
    Results,
    Badges,
}

impl Screen {
    pub const FLOW: [Screen; 7] = [
        Screen::ScenarioList,
        Screen::ScenarioDetail,
        Screen::Coach,
        Screen::CaseFile,
        Screen::Strategy,
        Screen::Hearing,
        Screen::Results,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Screen::ScenarioList => "Cases",
            Screen::ScenarioDetail => "Case & role",
            Screen::Coach => "Coach",
            Screen::CaseFile => "Case file",
            Screen::Strategy => "Strategy",
            Screen::Hearing => "Hearing",
            Screen::Results => "Results",
            Screen::Badges => "Badges",
        }
    }
}

/// Which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    /// Typing into the input buffer.
    Insert,
    HelpOverlay,
    /// "End the hearing now?" dialog.
    ConfirmEndEarly,
    /// Quit requested while a hearing is in progress.
    ConfirmQuit,
}

/// Where the input buffer goes when Enter is pressed in insert mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InsertTarget {
    #[default]
    Argument,
    Evidence,
    Requirements,
    /// An argument spoken in the live hearing.
    Plea,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StrategySection {
    #[default]
    Arguments,
    Evidence,
    Requirements,
}

impl StrategySection {
    pub fn next(self) -> Self {
        match self {
            StrategySection::Arguments => StrategySection::Evidence,
            StrategySection::Evidence => StrategySection::Requirements,
            StrategySection::Requirements => StrategySection::Arguments,
        }
    }
}

/// The strategy being prepared, before it is committed to the session.
#[derive(Debug, Clone, Default)]
pub struct StrategyDraft {
    pub strategy: Strategy,
    pub section: StrategySection,
    pub selected_argument: usize,
    pub selected_evidence: usize,
    next_argument_id: u32,
    next_evidence_id: u32,
}

impl StrategyDraft {
    pub fn add_argument(&mut self, text: String) {
        self.next_argument_id += 1;
        self.strategy.arguments.push(Argument {
            id: self.next_argument_id,
            text,
        });
        self.selected_argument = self.strategy.arguments.len() - 1;
    }

    pub fn add_evidence(&mut self, name: String) {
        self.next_evidence_id += 1;
        self.strategy.evidences.push(Evidence {
            id: self.next_evidence_id,
            name,
            linked_argument_ids: Vec::new(),
        });
        self.selected_evidence = self.strategy.evidences.len() - 1;
    }

    /// Removes the selected item of the focused section.
    ///
    /// Deleting an argument also unlinks it from every piece of evidence.
    pub fn delete_selected(&mut self) {
        match self.section {
            StrategySection::Arguments => {
                if self.selected_argument >= self.strategy.arguments.len() {
                    return;
                }
                let removed = self.strategy.arguments.remove(self.selected_argument);
                for evidence in &mut self.strategy.evidences {
                    evidence.linked_argument_ids.retain(|id| *id != removed.id);
                }
                self.selected_argument = self
                    .selected_argument
                    .min(self.strategy.arguments.len().saturating_sub(1));
            }
            StrategySection::Evidence => {
                if self.selected_evidence >= self.strategy.evidences.len() {
                    return;
                }
                self.strategy.evidences.remove(self.selected_evidence);
                self.selected_evidence = self
                    .selected_evidence
                    .min(self.strategy.evidences.len().saturating_sub(1));
            }
            StrategySection::Requirements => self.strategy.requirements.clear(),
        }
    }

    /// Links or unlinks the selected evidence and the argument at `argument_index`.
    pub fn toggle_link(&mut self, argument_index: usize) {
        let Some(argument_id) = self.strategy.arguments.get(argument_index).map(|a| a.id) else {
            return;
        };
        let Some(evidence) = self.strategy.evidences.get_mut(self.selected_evidence) else {
            return;
        };
        if let Some(pos) = evidence
            .linked_argument_ids
            .iter()
            .position(|id| *id == argument_id)
        {
            evidence.linked_argument_ids.remove(pos);
        } else {
            evidence.linked_argument_ids.push(argument_id);
        }
    }

    pub fn select_next(&mut self) {
        match self.section {
            StrategySection::Arguments => {
                step_index(&mut self.selected_argument, self.strategy.arguments.len(), 1)
            }
            StrategySection::Evidence => {
                step_index(&mut self.selected_evidence, self.strategy.evidences.len(), 1)
            }
            StrategySection::Requirements => {}
        }
    }

    pub fn select_prev(&mut self) {
        match self.section {
            StrategySection::Arguments => {
                step_index(&mut self.selected_argument, self.strategy.arguments.len(), -1)
            }
            StrategySection::Evidence => {
                step_index(&mut self.selected_evidence, self.strategy.evidences.len(), -1)
            }
            StrategySection::Requirements => {}
        }
    }
}

fn step_index(index: &mut usize, len: usize, delta: isize) {
    if len == 0 {
        *index = 0;
        return;
    }
    *index = (*index as isize + delta).clamp(0, len as isize - 1) as usize;
}

/// Returns the choice after `current`, wrapping around. Unknown values map to the first.
pub fn cycle<T: Copy + PartialEq>(choices: &[T], current: T) -> T {
    match choices.iter().position(|c| *c == current) {
        Some(i) => choices[(i + 1) % choices.len()],
        None => choices[0],
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

/// All mutable UI state passed through every render cycle.
pub struct AppState {
    pub screen: Screen,
    pub mode: Mode,
    pub help_scroll: u16,

    pub scenario_list: ListState,
    /// Scenario of the session in progress.
    pub scenario_id: Option<u32>,
    /// Role highlighted on the detail screen.
    pub role: Role,
    pub coach: CoachConfig,
    pub objective: Objective,
    pub settings: SessionSettings,
    pub draft: StrategyDraft,

    /// Latest coach feedback on the strategy draft.
    pub coach_advice: Option<String>,
    /// A coach request is in flight.
    pub coach_pending: bool,

    pub input: String,
    pub insert_target: InsertTarget,

    pub transcript_scroll: u16,
    /// Keep the transcript scrolled to the newest exchange.
    pub follow_transcript: bool,

    pub verdict: Option<Verdict>,
    pub badges: Vec<BadgeRecord>,
    pub badge_summary: Option<BadgeSummary>,
    pub badge_list: ListState,

    pub status: Option<StatusLine>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            screen: Screen::default(),
            mode: Mode::default(),
            help_scroll: 0,
            scenario_list: ListState::default().with_selected(Some(0)),
            scenario_id: None,
            role: Role::Plaintiff,
            coach: CoachConfig::default(),
            objective: Objective::default(),
            settings: SessionSettings::default(),
            draft: StrategyDraft::default(),
            coach_advice: None,
            coach_pending: false,
            input: String::new(),
            insert_target: InsertTarget::default(),
            transcript_scroll: 0,
            follow_transcript: true,
            verdict: None,
            badges: Vec::new(),
            badge_summary: None,
            badge_list: ListState::default().with_selected(Some(0)),
            status: None,
        }
    }
}

impl AppState {
    /// The scenario highlighted in the case list.
    pub fn highlighted_scenario(&self) -> &'static Scenario {
        let scenarios = catalog::scenarios();
        let index = self
            .scenario_list
            .selected()
            .unwrap_or(0)
            .min(scenarios.len() - 1);
        &scenarios[index]
    }

    pub fn next_scenario(&mut self) {
        let len = catalog::scenarios().len();
        let mut index = self.scenario_list.selected().unwrap_or(0);
        step_index(&mut index, len, 1);
        self.scenario_list.select(Some(index));
    }

    pub fn prev_scenario(&mut self) {
        let len = catalog::scenarios().len();
        let mut index = self.scenario_list.selected().unwrap_or(0);
        step_index(&mut index, len, -1);
        self.scenario_list.select(Some(index));
    }

    /// Clears every form for a freshly selected scenario.
    pub fn reset_forms(&mut self) {
        self.role = Role::Plaintiff;
        self.coach = CoachConfig::default();
        self.objective = Objective::default();
        self.settings = SessionSettings::default();
        self.draft = StrategyDraft::default();
        self.coach_advice = None;
        self.coach_pending = false;
        self.input.clear();
        self.transcript_scroll = 0;
        self.follow_transcript = true;
        self.verdict = None;
    }

    pub fn begin_insert(&mut self, target: InsertTarget) {
        self.insert_target = target;
        self.input = match target {
            InsertTarget::Requirements => self.draft.strategy.requirements.clone(),
            _ => String::new(),
        };
        self.mode = Mode::Insert;
    }

    /// Leaves insert mode and returns the trimmed buffer.
    pub fn take_input(&mut self) -> String {
        self.mode = Mode::Normal;
        std::mem::take(&mut self.input).trim().to_owned()
    }

    pub fn notify(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            is_error: false,
        });
    }

    /// Shows `err` in the status line. A missing session sends the user back
    /// to the case list.
    pub fn report(&mut self, err: &CourtroomError) {
        if err.requires_restart() {
            self.screen = Screen::ScenarioList;
            self.mode = Mode::Normal;
        }
        self.status = Some(StatusLine {
            text: err.to_string(),
            is_error: true,
        });
    }

    pub fn scroll_transcript_up(&mut self, lines: u16) {
        self.follow_transcript = false;
        self.transcript_scroll = self.transcript_scroll.saturating_sub(lines);
    }

    pub fn scroll_transcript_down(&mut self, lines: u16) {
        self.transcript_scroll = self.transcript_scroll.saturating_add(lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_wraps_and_recovers() {
        assert_eq!(cycle(&[5, 10, 15, 20], 10), 15);
        assert_eq!(cycle(&[5, 10, 15, 20], 20), 5);
        assert_eq!(cycle(&[2, 3, 5], 4), 2);
    }

    #[test]
    fn deleting_an_argument_unlinks_it() {
        let mut draft = StrategyDraft::default();
        draft.add_argument("first".into());
        draft.add_argument("second".into());
        draft.add_evidence("lease".into());
        draft.toggle_link(0);
        draft.toggle_link(1);
        assert_eq!(draft.strategy.evidences[0].linked_argument_ids, vec![1, 2]);

        draft.section = StrategySection::Arguments;
        draft.selected_argument = 0;
        draft.delete_selected();

        assert_eq!(draft.strategy.arguments.len(), 1);
        assert_eq!(draft.strategy.evidences[0].linked_argument_ids, vec![2]);

        draft.toggle_link(0);
        assert!(draft.strategy.evidences[0].linked_argument_ids.is_empty());
    }

    #[test]
    fn ids_are_never_reused() {
        let mut draft = StrategyDraft::default();
        draft.add_argument("a".into());
        draft.delete_selected();
        draft.add_argument("b".into());
        assert_eq!(draft.strategy.arguments[0].id, 2);
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut draft = StrategyDraft::default();
        draft.select_next();
        assert_eq!(draft.selected_argument, 0);
        draft.add_argument("a".into());
        draft.add_argument("b".into());
        draft.select_next();
        draft.select_next();
        assert_eq!(draft.selected_argument, 1);
        draft.select_prev();
        draft.select_prev();
        assert_eq!(draft.selected_argument, 0);
    }

    #[test]
    fn missing_session_returns_to_case_list() {
        let mut state = AppState {
            screen: Screen::Strategy,
            ..AppState::default()
        };
        state.report(&CourtroomError::SessionNotFound);
        assert_eq!(state.screen, Screen::ScenarioList);
        assert!(state.status.as_ref().is_some_and(|s| s.is_error));

        state.screen = Screen::Hearing;
        state.report(&CourtroomError::Network("timeout".into()));
        assert_eq!(state.screen, Screen::Hearing);
    }
}
