use std::time::Duration;

use async_trait::async_trait;
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::error::Result;
use crate::store::{now_secs, BadgeLedger, SessionStore};
use crate::types::{BadgeRecord, SessionRecord};

/// Opens (or creates) the SQLite database at `path`, configures WAL mode,
/// and applies schema migrations via the `schema_version` table.
///
/// This function is the single entry point for all database connections.
/// It sets `busy_timeout` via the `Connection` method (not a PRAGMA string) to
/// ensure the setting takes effect regardless of pragma caching.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the file cannot be opened, WAL configuration
/// fails, or schema DDL fails.
pub async fn open_db(path: &str) -> Result<Connection, tokio_rusqlite::Error> {
    let conn = Connection::open(path).await?;

    conn.call(|db| {
        db.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA foreign_keys=ON;",
        )?;
        db.busy_timeout(Duration::from_secs(5))?;
        Ok(())
    })
    .await?;

    // Fold any WAL left by a previous run back into the main file.
    conn.call(|db| {
        db.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    })
    .await?;

    conn.call(|db| {
        crate::schema::migrate(db)?;
        Ok(())
    })
    .await?;

    debug!(path, "courtroom database ready");
    Ok(conn)
}

/// Deletes session rows written by runs other than `keep_run_id`.
///
/// Rows are normally removed when their run exits; anything still present at
/// startup belongs to a run that crashed. Returns the number of rows removed.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the delete transaction fails.
pub async fn prune_stale_sessions(
    conn: &Connection,
    keep_run_id: &str,
) -> Result<usize, tokio_rusqlite::Error> {
    let keep_run_id = keep_run_id.to_owned();

    conn.call(move |db| {
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        let removed = tx.execute(
            "DELETE FROM session_store WHERE run_id <> ?1",
            rusqlite::params![&keep_run_id],
        )?;
        tx.commit()?;
        Ok(removed)
    })
    .await
}

/// Session store scoped to one run of the application.
///
/// Each run gets a fresh UUID v4 `run_id`; the record lives in the
/// `session_store` row with that key until [`SessionStore::clear`] is called.
#[derive(Clone)]
pub struct SqliteSessionStore {
    conn: Connection,
    run_id: String,
}

impl SqliteSessionStore {
    /// Creates a store with a newly generated run id.
    pub fn new(conn: Connection) -> Self {
        Self::with_run_id(conn, uuid::Uuid::new_v4().to_string())
    }

    /// Creates a store bound to an existing run id.
    pub fn with_run_id(conn: Connection, run_id: impl Into<String>) -> Self {
        Self {
            conn,
            run_id: run_id.into(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn save(&self, record: &SessionRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        let run_id = self.run_id.clone();

        self.conn
            .call(move |db| {
                let now = now_secs();
                let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
                tx.execute(
                    "INSERT INTO session_store (run_id, record, updated_at)
                     VALUES (?1, ?2, ?3)
                     ON CONFLICT(run_id)
                     DO UPDATE SET record = excluded.record,
                                   updated_at = excluded.updated_at",
                    rusqlite::params![&run_id, &json, now],
                )?;
                tx.commit()?;
                Ok::<_, rusqlite::Error>(())
            })
            .await?;
        Ok(())
    }

    async fn load(&self) -> Result<Option<SessionRecord>> {
        let run_id = self.run_id.clone();

        let json: Option<String> = self
            .conn
            .call(move |db| {
                let json = db
                    .query_row(
                        "SELECT record FROM session_store WHERE run_id = ?1",
                        rusqlite::params![&run_id],
                        |r| r.get::<_, String>(0),
                    )
                    .optional()?;
                Ok::<_, rusqlite::Error>(json)
            })
            .await?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn clear(&self) -> Result<()> {
        let run_id = self.run_id.clone();

        self.conn
            .call(move |db| {
                let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
                tx.execute(
                    "DELETE FROM session_store WHERE run_id = ?1",
                    rusqlite::params![&run_id],
                )?;
                tx.commit()?;
                Ok::<_, rusqlite::Error>(())
            })
            .await?;
        Ok(())
    }
}

/// Badge ledger kept in the `badges` table across runs.
#[derive(Clone)]
pub struct SqliteBadgeLedger {
    conn: Connection,
}

impl SqliteBadgeLedger {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl BadgeLedger for SqliteBadgeLedger {
    async fn get_all(&self) -> Result<Vec<BadgeRecord>> {
        let records = self
            .conn
            .call(|db| {
                let mut stmt = db.prepare(
                    "SELECT id, count, last_earned_at FROM badges ORDER BY rowid",
                )?;
                let rows = stmt
                    .query_map([], |r| {
                        Ok(BadgeRecord {
                            id: r.get(0)?,
                            count: r.get(1)?,
                            last_earned_at: r.get(2)?,
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok::<_, rusqlite::Error>(rows)
            })
            .await?;
        Ok(records)
    }

    /// Uses an upsert (`INSERT ... ON CONFLICT DO UPDATE`) inside `BEGIN IMMEDIATE`.
    /// One row per badge id; `rowid` is kept on update so ordering is stable.
    async fn add_at(&self, badge_id: &str, earned_at: i64) -> Result<BadgeRecord> {
        let badge_id = badge_id.to_owned();

        let record = self
            .conn
            .call(move |db| {
                let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
                let record = tx.query_row(
                    "INSERT INTO badges (id, count, last_earned_at)
                     VALUES (?1, 1, ?2)
                     ON CONFLICT(id)
                     DO UPDATE SET count = badges.count + 1,
                                   last_earned_at = excluded.last_earned_at
                     RETURNING id, count, last_earned_at",
                    rusqlite::params![&badge_id, earned_at],
                    |r| {
                        Ok(BadgeRecord {
                            id: r.get(0)?,
                            count: r.get(1)?,
                            last_earned_at: r.get(2)?,
                        })
                    },
                )?;
                tx.commit()?;
                Ok::<_, rusqlite::Error>(record)
            })
            .await?;
        Ok(record)
    }
}
