//! Static scenario and badge registries.
//!
//! Both catalogs are compiled in and read-only. Badge ids are the keys used by
//! the badge ledger.

use crate::types::Scenario;

/// A badge that can appear in the collection screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

static SCENARIOS: [Scenario; 3] = [
    Scenario {
        id: 1,
        name: "Residential lease dispute",
        difficulty: 1,
        duration_minutes: 15,
        skills: &["Basic argumentation", "Evidence gathering"],
        description: "A tenant claims compensation after the landlord broke the lease.",
        summary: "Minh rented Mrs. Hoa's apartment on a one-year lease. Three months in, \
Mrs. Hoa asked him to move out because she wanted to sell the flat. Minh had paid a \
two-month deposit and now claims damages.\n\n\
Parties:\n- Plaintiff: Minh (tenant)\n- Defendant: Mrs. Hoa (landlord)\n\n\
Claim: return of the deposit plus the cost of the forced move.",
        facts: &[
            "Lease signed 01/01/2024 for a term of 12 months",
            "Deposit: 20 million VND",
            "Monthly rent: 10 million VND",
            "Mrs. Hoa served notice to vacate on 01/04/2024",
            "Minh spent 5 million VND finding a new flat and moving",
        ],
    },
    Scenario {
        id: 2,
        name: "Traffic accident compensation",
        difficulty: 2,
        duration_minutes: 25,
        skills: &["Evidence analysis", "Argumentation", "Objections"],
        description: "An injured motorcyclist claims compensation from the driver at fault.",
        summary: "Tuan was riding his motorbike when he collided with Ms. Lan's car at an \
intersection. He spent two weeks in hospital. A traffic camera recorded the incident.\n\n\
Parties:\n- Plaintiff: Tuan (victim)\n- Defendant: Ms. Lan (car driver)\n\n\
Claim: medical costs, emotional distress and lost income.",
        facts: &[
            "The accident happened on 15/03/2024 at 8 a.m.",
            "Tuan was in the correct lane on a green light",
            "Medical costs: 50 million VND",
            "Lost income: 15 million VND per month for one month",
            "The camera shows Ms. Lan running a red light",
        ],
    },
    Scenario {
        id: 3,
        name: "Divorce asset division",
        difficulty: 3,
        duration_minutes: 40,
        skills: &["Advanced argumentation", "Objections", "Strategy", "Negotiation"],
        description: "Dividing shared property after a divorce.",
        summary: "Hung and Mai married in 2015 and have two children. In 2024 they agreed \
to divorce but dispute how to divide the house and their savings.\n\n\
Parties:\n- Plaintiff: Mai\n- Defendant: Hung\n\n\
Claim: a fair split of shared assets and custody of the children.",
        facts: &[
            "Married in 2015, two children (aged 8 and 5)",
            "House worth 3 billion VND, registered to the husband",
            "Savings: 500 million VND",
            "Mai is the children's primary carer",
            "Hung earns 30 million VND a month, Mai 15 million",
        ],
    },
];

static BADGES: [BadgeInfo; 12] = [
    BadgeInfo { id: "excellent", name: "Star Advocate", icon: "🥇", description: "Total score above 400" },
    BadgeInfo { id: "evidence", name: "Evidence Master", icon: "📊", description: "Evidence use above 90" },
    BadgeInfo { id: "persuader", name: "Orator", icon: "🎤", description: "Persuasion above 90" },
    BadgeInfo { id: "speed", name: "Lightning Fast", icon: "⚡", description: "Finished well ahead of time" },
    BadgeInfo { id: "accurate", name: "Pinpoint", icon: "🎯", description: "Legal accuracy above 95" },
    BadgeInfo { id: "polite", name: "Courteous", icon: "🤝", description: "Perfect etiquette" },
    BadgeInfo { id: "first_win", name: "First Victory", icon: "🏆", description: "Win your first trial" },
    BadgeInfo { id: "streak_3", name: "Hat Trick", icon: "🔥", description: "Win three trials in a row" },
    BadgeInfo { id: "master", name: "Litigation Master", icon: "👑", description: "Complete ten trials" },
    BadgeInfo { id: "defender", name: "Defender", icon: "🛡️", description: "Win as defence counsel" },
    BadgeInfo { id: "prosecutor", name: "Prosecutor", icon: "⚔️", description: "Win as counsel for the plaintiff" },
    BadgeInfo { id: "comeback", name: "Comeback", icon: "🌊", description: "Win after trailing on points" },
];

pub fn scenarios() -> &'static [Scenario] {
    &SCENARIOS
}

pub fn scenario(id: u32) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.id == id)
}

pub fn badges() -> &'static [BadgeInfo] {
    &BADGES
}

pub fn badge(id: &str) -> Option<&'static BadgeInfo> {
    BADGES.iter().find(|b| b.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_ids_are_unique_and_resolvable() {
        for s in scenarios() {
            assert_eq!(scenario(s.id), Some(s));
            assert!((1..=5).contains(&s.difficulty));
            assert_eq!(s.facts.len(), 5);
        }
        assert!(scenario(99).is_none());
    }

    #[test]
    fn every_scored_badge_is_cataloged() {
        for id in ["excellent", "evidence", "persuader", "accurate", "polite", "speed"] {
            assert!(badge(id).is_some(), "{id} missing from catalog");
        }
        assert_eq!(badges().len(), 12);
    }
}
