use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::games::error::GameError;
use crate::games::score::Status;

/// One backlog entry. `id`, `user_id` and `created_at` are immutable after
/// creation; `play_score` is derived and recomputed on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub genre: String,
    pub hours: f64,
    #[sqlx(try_from = "String")]
    pub status: Status,
    pub priority: i32,
    pub play_score: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Replacement fields for a full-record update. `id`, `user_id` and
/// `created_at` stay as stored.
#[derive(Debug, Clone)]
pub struct GamePatch {
    pub title: String,
    pub genre: String,
    pub hours: f64,
    pub status: Status,
    pub priority: i32,
    pub play_score: i32,
}

/// Document-store handle the repository talks to. Every lookup filters on
/// `(id, owner)` so one user can never reach another's records by guessing
/// an identifier. Each call is a single atomic round-trip; concurrent
/// replacements are last-writer-wins.
#[async_trait]
pub trait GameStore: Send + Sync {
    async fn insert(&self, record: GameRecord) -> Result<GameRecord, GameError>;

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<GameRecord>, GameError>;

    /// Replaces the mutable fields of the record matching `(id, owner)`.
    /// `None` when nothing matched.
    async fn replace(
        &self,
        id: Uuid,
        owner: Uuid,
        patch: GamePatch,
    ) -> Result<Option<GameRecord>, GameError>;

    /// Deletes the record matching `(id, owner)`; `false` when nothing
    /// matched.
    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<bool, GameError>;
}

pub struct PgGameStore {
    db: PgPool,
}

impl PgGameStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GameStore for PgGameStore {
    async fn insert(&self, record: GameRecord) -> Result<GameRecord, GameError> {
        let row = sqlx::query_as::<_, GameRecord>(
            r#"
            INSERT INTO games (id, user_id, title, genre, hours, status, priority, play_score, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, user_id, title, genre, hours, status, priority, play_score, created_at
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.title)
        .bind(&record.genre)
        .bind(record.hours)
        .bind(record.status.as_str())
        .bind(record.priority)
        .bind(record.play_score)
        .bind(record.created_at)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<GameRecord>, GameError> {
        let rows = sqlx::query_as::<_, GameRecord>(
            r#"
            SELECT id, user_id, title, genre, hours, status, priority, play_score, created_at
            FROM games
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn replace(
        &self,
        id: Uuid,
        owner: Uuid,
        patch: GamePatch,
    ) -> Result<Option<GameRecord>, GameError> {
        let row = sqlx::query_as::<_, GameRecord>(
            r#"
            UPDATE games
            SET title = $3, genre = $4, hours = $5, status = $6, priority = $7, play_score = $8
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, genre, hours, status, priority, play_score, created_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(&patch.title)
        .bind(&patch.genre)
        .bind(patch.hours)
        .bind(patch.status.as_str())
        .bind(patch.priority)
        .bind(patch.play_score)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<bool, GameError> {
        let result = sqlx::query(
            r#"
            DELETE FROM games
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// In-memory stand-in used by repository tests, mirroring the filtered
/// semantics of the Postgres store.
#[cfg(test)]
pub(crate) struct MemoryGameStore {
    records: std::sync::Mutex<Vec<GameRecord>>,
    unavailable: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl MemoryGameStore {
    pub(crate) fn new() -> Self {
        Self {
            records: std::sync::Mutex::new(Vec::new()),
            unavailable: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub(crate) fn set_unavailable(&self) {
        self.unavailable
            .store(true, std::sync::atomic::Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), GameError> {
        if self.unavailable.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(GameError::Store(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

#[cfg(test)]
#[async_trait]
impl GameStore for MemoryGameStore {
    async fn insert(&self, record: GameRecord) -> Result<GameRecord, GameError> {
        self.check_available()?;
        let mut records = self.records.lock().unwrap();
        records.push(record.clone());
        Ok(record)
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<GameRecord>, GameError> {
        self.check_available()?;
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| r.user_id == owner)
            .cloned()
            .collect())
    }

    async fn replace(
        &self,
        id: Uuid,
        owner: Uuid,
        patch: GamePatch,
    ) -> Result<Option<GameRecord>, GameError> {
        self.check_available()?;
        let mut records = self.records.lock().unwrap();
        match records
            .iter_mut()
            .find(|r| r.id == id && r.user_id == owner)
        {
            Some(record) => {
                record.title = patch.title;
                record.genre = patch.genre;
                record.hours = patch.hours;
                record.status = patch.status;
                record.priority = patch.priority;
                record.play_score = patch.play_score;
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<bool, GameError> {
        self.check_available()?;
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| !(r.id == id && r.user_id == owner));
        Ok(records.len() < before)
    }
}
