//! Storage seams for the active session record and the badge ledger.
//!
//! The flow controller and scoring engine only see these traits. SQLite-backed
//! implementations live in [`crate::db`]; the in-memory ones here back tests and
//! runs without a database file.

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{BadgeRecord, SessionRecord};

/// Returns the current Unix timestamp in seconds.
pub(crate) fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Persistence for the single active session record of one run.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Replaces the stored record.
    async fn save(&self, record: &SessionRecord) -> Result<()>;

    /// Returns the stored record, or `None` when no session is in progress.
    async fn load(&self) -> Result<Option<SessionRecord>>;

    /// Drops the stored record.
    async fn clear(&self) -> Result<()>;
}

/// Cross-session badge earn counts.
#[async_trait]
pub trait BadgeLedger: Send + Sync {
    /// All badge records, in first-earned order.
    async fn get_all(&self) -> Result<Vec<BadgeRecord>>;

    /// Upserts `badge_id`: creates it with count 1, or increments the count.
    /// Either way `last_earned_at` becomes `earned_at`.
    async fn add_at(&self, badge_id: &str, earned_at: i64) -> Result<BadgeRecord>;

    /// [`add_at`](Self::add_at) stamped with the current time.
    async fn add(&self, badge_id: &str) -> Result<BadgeRecord> {
        self.add_at(badge_id, now_secs()).await
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    record: Mutex<Option<SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, record: &SessionRecord) -> Result<()> {
        *self.record.lock().unwrap_or_else(|e| e.into_inner()) = Some(record.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<SessionRecord>> {
        Ok(self.record.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn clear(&self) -> Result<()> {
        *self.record.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryBadgeLedger {
    records: Mutex<Vec<BadgeRecord>>,
}

impl MemoryBadgeLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BadgeLedger for MemoryBadgeLedger {
    async fn get_all(&self) -> Result<Vec<BadgeRecord>> {
        Ok(self.records.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn add_at(&self, badge_id: &str, earned_at: i64) -> Result<BadgeRecord> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = records.iter_mut().find(|r| r.id == badge_id) {
            existing.count += 1;
            existing.last_earned_at = earned_at;
            return Ok(existing.clone());
        }
        let record = BadgeRecord {
            id: badge_id.to_owned(),
            count: 1,
            last_earned_at: earned_at,
        };
        records.push(record.clone());
        Ok(record)
    }
}
