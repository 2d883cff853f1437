//! Score derivation and badge awarding for a concluded session.
//!
//! Three of the five dimensions are random draws. The random source sits behind
//! the [`Dice`] trait so tests can pin exact values.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::catalog;
use crate::error::Result;
use crate::store::BadgeLedger;
use crate::types::{BadgeRecord, BadgeSummary, Grade, ScoreVector, SessionRecord, Verdict};

/// Bonus added to persuasion when more than two arguments were prepared.
pub const ARGUMENT_BONUS: u32 = 10;
/// Bonus added to evidence use when more than one piece of evidence was prepared.
pub const EVIDENCE_BONUS: u32 = 15;

const MAX_SCORE: u32 = 100;

/// Source of uniform integer draws.
pub trait Dice: Send {
    /// Returns a value in `low..high`.
    fn roll(&mut self, low: u32, high: u32) -> u32;
}

/// [`Dice`] backed by a seedable `StdRng`.
#[derive(Debug)]
pub struct SeededDice(StdRng);

impl SeededDice {
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Dice for SeededDice {
    fn roll(&mut self, low: u32, high: u32) -> u32 {
        self.0.gen_range(low..high)
    }
}

/// Derives the five scores for `record`.
///
/// Legal accuracy, evidence use and persuasion are drawn from 60..90, etiquette
/// from 75..95. Time management is 50 when no time was left, otherwise 80 plus
/// one point per ten seconds remaining. Bonuses apply once each, and every
/// component is clamped to 100.
pub fn calculate_scores(record: &SessionRecord, dice: &mut dyn Dice) -> ScoreVector {
    let legal_accuracy = dice.roll(60, 90);
    let mut evidence_use = dice.roll(60, 90);
    let mut persuasion = dice.roll(60, 90);
    let etiquette = dice.roll(75, 95);

    let remaining = record.time_remaining_seconds.unwrap_or(0);
    let time_management = if remaining == 0 { 50 } else { 80 + remaining / 10 };

    if record.argument_count() > 2 {
        persuasion += ARGUMENT_BONUS;
    }
    if record.evidence_count() > 1 {
        evidence_use += EVIDENCE_BONUS;
    }

    ScoreVector {
        legal_accuracy: legal_accuracy.min(MAX_SCORE),
        evidence_use: evidence_use.min(MAX_SCORE),
        persuasion: persuasion.min(MAX_SCORE),
        time_management: time_management.min(MAX_SCORE),
        etiquette: etiquette.min(MAX_SCORE),
    }
}

/// Badge ids whose thresholds `scores` meets, in catalog-check order.
///
/// `first_win`, `streak_3`, `master`, `defender`, `prosecutor` and `comeback`
/// have no award rule yet and are never returned.
pub fn earned_badges(scores: &ScoreVector) -> Vec<&'static str> {
    let mut earned = Vec::new();
    if scores.total() > 400 {
        earned.push("excellent");
    }
    if scores.evidence_use > 90 {
        earned.push("evidence");
    }
    if scores.persuasion > 90 {
        earned.push("persuader");
    }
    if scores.legal_accuracy > 95 {
        earned.push("accurate");
    }
    if scores.etiquette == 100 {
        earned.push("polite");
    }
    if scores.time_management > 90 {
        earned.push("speed");
    }
    earned
}

/// Scores concluded sessions and records earned badges in the ledger.
pub struct ScoringEngine {
    ledger: Arc<dyn BadgeLedger>,
    dice: Box<dyn Dice>,
}

impl ScoringEngine {
    pub fn new(ledger: Arc<dyn BadgeLedger>, dice: impl Dice + 'static) -> Self {
        Self {
            ledger,
            dice: Box::new(dice),
        }
    }

    /// Scores `record`, grades it, and adds every earned badge to the ledger.
    ///
    /// # Errors
    ///
    /// Returns the ledger's error if a badge cannot be recorded.
    pub async fn finalize(&mut self, record: &SessionRecord) -> Result<Verdict> {
        let scores = calculate_scores(record, self.dice.as_mut());
        let badges = earned_badges(&scores);
        for badge_id in &badges {
            self.ledger.add(badge_id).await?;
        }
        let grade = Grade::from_total(scores.total());
        info!(
            total = scores.total(),
            ?grade,
            badges = badges.len(),
            "session scored"
        );
        Ok(Verdict {
            scores,
            grade,
            earned_badges: badges.into_iter().map(str::to_owned).collect(),
        })
    }

    /// Ledger contents and summary for the badge collection screen.
    pub async fn collection(&self) -> Result<(Vec<BadgeRecord>, BadgeSummary)> {
        let records = self.ledger.get_all().await?;
        let summary = BadgeSummary::from_records(&records, catalog::badges().len());
        Ok((records, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBadgeLedger;
    use crate::types::{Argument, Evidence, Strategy};

    /// Always rolls `low + offset`, capped below `high`.
    struct Loaded(u32);

    impl Dice for Loaded {
        fn roll(&mut self, low: u32, high: u32) -> u32 {
            (low + self.0).min(high - 1)
        }
    }

    fn record_with(arguments: usize, evidences: usize, remaining: Option<u32>) -> SessionRecord {
        let mut record = SessionRecord::new(1);
        record.strategy = Some(Strategy {
            arguments: (0..arguments as u32)
                .map(|id| Argument { id, text: format!("argument {id}") })
                .collect(),
            evidences: (0..evidences as u32)
                .map(|id| Evidence { id, name: format!("exhibit {id}"), linked_argument_ids: vec![] })
                .collect(),
            requirements: String::new(),
        });
        record.time_remaining_seconds = remaining;
        record
    }

    #[test]
    fn argument_bonus_applies_once() {
        let none = calculate_scores(&record_with(0, 0, Some(0)), &mut Loaded(5));
        let three = calculate_scores(&record_with(3, 0, Some(0)), &mut Loaded(5));
        let ten = calculate_scores(&record_with(10, 0, Some(0)), &mut Loaded(5));

        assert_eq!(three.persuasion, none.persuasion + ARGUMENT_BONUS);
        assert_eq!(ten.persuasion, three.persuasion);
        assert_eq!(three.evidence_use, none.evidence_use);
    }

    #[test]
    fn evidence_bonus_needs_two_items_and_clamps() {
        let one = calculate_scores(&record_with(0, 1, None), &mut Loaded(0));
        let two = calculate_scores(&record_with(0, 2, None), &mut Loaded(0));
        assert_eq!(one.evidence_use, 60);
        assert_eq!(two.evidence_use, 75);

        let high = calculate_scores(&record_with(0, 2, None), &mut Loaded(29));
        assert_eq!(high.evidence_use, 100);
    }

    #[test]
    fn time_management_follows_remaining_seconds() {
        assert_eq!(calculate_scores(&record_with(0, 0, Some(0)), &mut Loaded(0)).time_management, 50);
        assert_eq!(calculate_scores(&record_with(0, 0, None), &mut Loaded(0)).time_management, 50);
        assert_eq!(calculate_scores(&record_with(0, 0, Some(95)), &mut Loaded(0)).time_management, 89);
        assert_eq!(calculate_scores(&record_with(0, 0, Some(1200)), &mut Loaded(0)).time_management, 100);
    }

    #[test]
    fn seeded_dice_stay_in_range() {
        let mut dice = SeededDice::seeded(7);
        for _ in 0..1000 {
            let v = dice.roll(60, 90);
            assert!((60..90).contains(&v));
        }
    }

    #[test]
    fn accuracy_badge_alone() {
        let scores = ScoreVector {
            legal_accuracy: 96,
            evidence_use: 50,
            persuasion: 50,
            time_management: 50,
            etiquette: 50,
        };
        assert_eq!(earned_badges(&scores), vec!["accurate"]);
    }

    #[test]
    fn all_threshold_badges() {
        let scores = ScoreVector {
            legal_accuracy: 100,
            evidence_use: 100,
            persuasion: 100,
            time_management: 100,
            etiquette: 100,
        };
        assert_eq!(
            earned_badges(&scores),
            vec!["excellent", "evidence", "persuader", "accurate", "polite", "speed"]
        );
    }

    #[test]
    fn thresholds_are_strict() {
        let scores = ScoreVector {
            legal_accuracy: 95,
            evidence_use: 90,
            persuasion: 90,
            time_management: 90,
            etiquette: 99,
        };
        // total = 464 > 400
        assert_eq!(earned_badges(&scores), vec!["excellent"]);
    }

    #[tokio::test]
    async fn finalize_records_badges_in_ledger() {
        let ledger = Arc::new(MemoryBadgeLedger::new());
        let mut engine = ScoringEngine::new(ledger.clone(), Loaded(29));
        // legal 89, evidence 89+15 -> 100, persuasion 89+10 = 99, etiquette 94, time 100
        let verdict = engine.finalize(&record_with(3, 2, Some(600))).await.unwrap();

        assert_eq!(verdict.scores.evidence_use, 100);
        assert_eq!(verdict.scores.persuasion, 99);
        assert_eq!(verdict.grade, Grade::S);
        assert_eq!(verdict.earned_badges, vec!["excellent", "evidence", "persuader", "speed"]);

        let (records, summary) = engine.collection().await.unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(summary.total_earned, 4);
        assert_eq!(summary.catalog_size, 12);
    }
}
