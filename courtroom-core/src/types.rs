use serde::{Deserialize, Serialize};

/// Number of argument/rebuttal rounds in every live session.
pub const TOTAL_ROUNDS: u32 = 4;

/// Allowed values for `SessionSettings::time_limit_minutes`.
pub const TIME_LIMIT_CHOICES: [u32; 4] = [5, 10, 15, 20];

/// Allowed values for `SessionSettings::objection_limit`.
pub const OBJECTION_LIMIT_CHOICES: [u32; 3] = [2, 3, 5];

/// A static case description used to seed a session. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub id: u32,
    pub name: &'static str,
    /// Difficulty from 1 to 5.
    pub difficulty: u8,
    pub duration_minutes: u32,
    pub skills: &'static [&'static str],
    pub description: &'static str,
    pub summary: &'static str,
    pub facts: &'static [&'static str],
}

impl Scenario {
    /// Human label for `difficulty`.
    pub fn difficulty_label(&self) -> &'static str {
        match self.difficulty {
            0 | 1 => "Easy",
            2 => "Medium",
            _ => "Hard",
        }
    }
}

/// Which side of the case the user argues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Defendant,
    Plaintiff,
}

impl Role {
    /// Counsel title shown in the opening announcement.
    pub fn counsel_title(self) -> &'static str {
        match self {
            Role::Defendant => "defence counsel",
            Role::Plaintiff => "counsel for the plaintiff",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoachType {
    /// Formal legal register.
    #[default]
    Lawyer,
    /// Plain-language register.
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecapStyle {
    #[default]
    Detailed,
    Summary,
    Visual,
}

/// The named coaching toggles offered on the coach screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachOptions {
    pub opening_suggestion: bool,
    pub evidence_reminder: bool,
    pub auto_objection: bool,
    pub risk_warning: bool,
}

impl Default for CoachOptions {
    fn default() -> Self {
        Self {
            opening_suggestion: true,
            evidence_reminder: true,
            auto_objection: false,
            risk_warning: true,
        }
    }
}

/// Coaching configuration written by the coach screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachConfig {
    #[serde(rename = "type")]
    pub coach_type: CoachType,
    /// 0 is strictly legal, 100 fully casual.
    pub tone: u8,
    pub options: CoachOptions,
    pub recap_style: RecapStyle,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            coach_type: CoachType::default(),
            tone: 50,
            options: CoachOptions::default(),
            recap_style: RecapStyle::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Objective {
    #[default]
    Compensation,
    Mediation,
}

/// Live-round limits chosen on the case-file screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSettings {
    pub time_limit_minutes: u32,
    pub objection_limit: u32,
    pub pause_enabled: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            time_limit_minutes: 10,
            objection_limit: 3,
            pause_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub id: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub id: u32,
    pub name: String,
    pub linked_argument_ids: Vec<u32>,
}

/// Arguments, evidence and requirements prepared before the live round.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Strategy {
    pub arguments: Vec<Argument>,
    pub evidences: Vec<Evidence>,
    pub requirements: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeRole {
    User,
    Opponent,
    System,
    Objection,
}

/// One transcript entry. Append-only during a live round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub role: ExchangeRole,
    pub text: String,
    pub round: u32,
}

/// The five scored dimensions, each clamped to 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreVector {
    pub legal_accuracy: u32,
    pub evidence_use: u32,
    pub persuasion: u32,
    pub time_management: u32,
    pub etiquette: u32,
}

impl ScoreVector {
    pub fn total(&self) -> u32 {
        self.legal_accuracy
            + self.evidence_use
            + self.persuasion
            + self.time_management
            + self.etiquette
    }
}

/// Letter grade derived from the score total (out of 500).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
}

impl Grade {
    pub fn from_total(total: u32) -> Self {
        match total {
            450.. => Grade::S,
            400..=449 => Grade::A,
            350..=399 => Grade::B,
            300..=349 => Grade::C,
            _ => Grade::D,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Grade::S => "Outstanding",
            Grade::A => "Very good",
            Grade::B => "Good",
            Grade::C => "Fair",
            Grade::D => "Needs improvement",
        }
    }
}

/// Scores, grade and badges produced when a session concludes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub scores: ScoreVector,
    pub grade: Grade,
    pub earned_badges: Vec<String>,
}

/// How far through the flow a record has progressed.
///
/// Derived from which fields are populated; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    ScenarioChosen,
    RoleChosen,
    CoachConfigured,
    CaseConfigured,
    StrategyBuilt,
    RoundActive,
    RoundConcluded,
}

/// The mutable aggregate carried from scenario selection to the results screen.
///
/// Persisted as one JSON blob with camelCase keys. Stages only ever add or
/// overwrite their own fields; a new scenario selection replaces the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub scenario_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coach: Option<CoachConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<Objective>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<SessionSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,

    // Runtime/result fields, populated once the live round starts.
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_remaining_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounds_completed: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transcript: Vec<Exchange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
}

impl SessionRecord {
    pub fn new(scenario_id: u32) -> Self {
        Self {
            scenario_id,
            role: None,
            coach: None,
            objective: None,
            settings: None,
            strategy: None,
            completed: false,
            time_remaining_seconds: None,
            rounds_completed: None,
            transcript: Vec::new(),
            verdict: None,
        }
    }

    pub fn stage(&self) -> Stage {
        if self.completed {
            Stage::RoundConcluded
        } else if self.time_remaining_seconds.is_some() {
            Stage::RoundActive
        } else if self.strategy.is_some() {
            Stage::StrategyBuilt
        } else if self.settings.is_some() {
            Stage::CaseConfigured
        } else if self.coach.is_some() {
            Stage::CoachConfigured
        } else if self.role.is_some() {
            Stage::RoleChosen
        } else {
            Stage::ScenarioChosen
        }
    }

    pub fn argument_count(&self) -> usize {
        self.strategy.as_ref().map_or(0, |s| s.arguments.len())
    }

    pub fn evidence_count(&self) -> usize {
        self.strategy.as_ref().map_or(0, |s| s.evidences.len())
    }
}

/// Cumulative earn record for one catalog badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeRecord {
    pub id: String,
    /// Times earned; never zero.
    pub count: u32,
    /// Unix seconds.
    pub last_earned_at: i64,
}

/// Collection-screen statistics over the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeSummary {
    pub unlocked: usize,
    pub catalog_size: usize,
    pub total_earned: u32,
}

impl BadgeSummary {
    pub fn from_records(records: &[BadgeRecord], catalog_size: usize) -> Self {
        Self {
            unlocked: records.len(),
            catalog_size,
            total_earned: records.iter().map(|r| r.count).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_boundaries() {
        assert_eq!(Grade::from_total(450), Grade::S);
        assert_eq!(Grade::from_total(449), Grade::A);
        assert_eq!(Grade::from_total(400), Grade::A);
        assert_eq!(Grade::from_total(350), Grade::B);
        assert_eq!(Grade::from_total(300), Grade::C);
        assert_eq!(Grade::from_total(299), Grade::D);
    }

    #[test]
    fn stage_follows_populated_fields() {
        let mut record = SessionRecord::new(1);
        assert_eq!(record.stage(), Stage::ScenarioChosen);
        record.role = Some(Role::Plaintiff);
        assert_eq!(record.stage(), Stage::RoleChosen);
        record.coach = Some(CoachConfig::default());
        assert_eq!(record.stage(), Stage::CoachConfigured);
        record.settings = Some(SessionSettings::default());
        assert_eq!(record.stage(), Stage::CaseConfigured);
        record.strategy = Some(Strategy::default());
        assert_eq!(record.stage(), Stage::StrategyBuilt);
        record.time_remaining_seconds = Some(600);
        assert_eq!(record.stage(), Stage::RoundActive);
        record.completed = true;
        assert_eq!(record.stage(), Stage::RoundConcluded);
    }

    #[test]
    fn record_json_uses_camel_case_keys() {
        let mut record = SessionRecord::new(2);
        record.role = Some(Role::Defendant);
        record.settings = Some(SessionSettings::default());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["scenarioId"], 2);
        assert_eq!(json["role"], "defendant");
        assert_eq!(json["settings"]["timeLimitMinutes"], 10);
        assert!(json.get("coach").is_none());
    }

    #[test]
    fn badge_summary_counts_earns() {
        let records = vec![
            BadgeRecord { id: "excellent".into(), count: 2, last_earned_at: 10 },
            BadgeRecord { id: "speed".into(), count: 1, last_earned_at: 20 },
        ];
        let summary = BadgeSummary::from_records(&records, 12);
        assert_eq!(summary.unlocked, 2);
        assert_eq!(summary.catalog_size, 12);
        assert_eq!(summary.total_earned, 3);
    }
}
