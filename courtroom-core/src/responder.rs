//! Simulated adversary and advisor.
//!
//! Both are request/response generators with a fixed artificial latency. The
//! opponent cycles through its rebuttals by round number so transcripts are
//! reproducible; the coach picks a random line for its register.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::Result;
use crate::types::{CoachType, Scenario};

/// Default latency of the simulated opponent.
pub const OPPONENT_LATENCY: Duration = Duration::from_millis(1500);
/// Default latency of the simulated coach.
pub const COACH_LATENCY: Duration = Duration::from_millis(800);

/// The opponent's rebuttals, selected by `round % len`.
pub const OPPONENT_REBUTTALS: [&str; 4] = [
    "Objection to this line of argument. Under the law, the plaintiff has not produced \
     enough evidence to prove any actual loss.",
    "The evidence presented is not persuasive. I ask the court to re-examine the facts \
     of the case.",
    "This position contradicts established precedent. In Precedent No. 42/2023 the court \
     ruled the opposite way on similar facts.",
    "I move that the court dismiss the claim for compensation as it has no clear legal basis.",
];

const LAWYER_ADVICE: [&str; 3] = [
    "This point has a solid legal footing. Cite the specific statutory provision.",
    "Important evidence. Tie it more explicitly to the compensation claim.",
    "Spell out the causal link between the breach and the loss.",
];

const PLAIN_ADVICE: [&str; 3] = [
    "Nice idea! Try explaining it a little more simply.",
    "This evidence would land better with a photo or document attached.",
    "Sounds reasonable! But the other side may push back on this point.",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpponentReply {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoachAdvice {
    pub text: String,
}

/// Produces the opposing counsel's reply to one user argument.
#[async_trait]
pub trait OpponentResponder: Send + Sync {
    async fn respond(&self, round: u32, argument: &str, scenario: &Scenario)
        -> Result<OpponentReply>;
}

/// Produces coaching feedback on prepared strategy content.
#[async_trait]
pub trait CoachAdvisor: Send + Sync {
    /// `tone` is accepted for interface stability but does not affect selection.
    async fn advise(&self, content: &str, coach_type: CoachType, tone: u8) -> Result<CoachAdvice>;
}

/// The rebuttal for `round`, cycling through [`OPPONENT_REBUTTALS`].
pub fn rebuttal_for_round(round: u32) -> &'static str {
    OPPONENT_REBUTTALS[round as usize % OPPONENT_REBUTTALS.len()]
}

/// Advice lines available for a coach register.
pub fn advice_pool(coach_type: CoachType) -> &'static [&'static str] {
    match coach_type {
        CoachType::Lawyer => &LAWYER_ADVICE,
        CoachType::Normal => &PLAIN_ADVICE,
    }
}

#[derive(Debug, Clone)]
pub struct MockOpponent {
    latency: Duration,
}

impl MockOpponent {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for MockOpponent {
    fn default() -> Self {
        Self::new(OPPONENT_LATENCY)
    }
}

#[async_trait]
impl OpponentResponder for MockOpponent {
    async fn respond(
        &self,
        round: u32,
        _argument: &str,
        _scenario: &Scenario,
    ) -> Result<OpponentReply> {
        tokio::time::sleep(self.latency).await;
        Ok(OpponentReply {
            text: rebuttal_for_round(round).to_owned(),
        })
    }
}

#[derive(Debug)]
pub struct MockCoach {
    latency: Duration,
    rng: Mutex<StdRng>,
}

impl MockCoach {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(latency: Duration, seed: u64) -> Self {
        Self {
            latency,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for MockCoach {
    fn default() -> Self {
        Self::new(COACH_LATENCY)
    }
}

#[async_trait]
impl CoachAdvisor for MockCoach {
    async fn advise(&self, _content: &str, coach_type: CoachType, _tone: u8) -> Result<CoachAdvice> {
        tokio::time::sleep(self.latency).await;
        let pool = advice_pool(coach_type);
        let text = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            pool.choose(&mut *rng).copied().unwrap_or_default()
        };
        Ok(CoachAdvice {
            text: text.to_owned(),
        })
    }
}
