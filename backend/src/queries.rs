use std::collections::BTreeMap;
use shared::{Poll, Tally};
use sqlx::{types::Json, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::{CommitOutcome, PollStore, StoreError, Versioned};

const POLL_COLUMNS: &str =
    "id, author_id, author_name, question, options, description, votes, voted_by, created_at, version";

/// One `idea_polls` row as stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PollRow {
    pub id: Uuid,
    pub author_id: String,
    pub author_name: String,
    pub question: String,
    pub options: Vec<String>,
    pub description: Option<String>,
    pub votes: Json<BTreeMap<String, u32>>,
    pub voted_by: Json<BTreeMap<String, usize>>,
    pub created_at: OffsetDateTime,
    pub version: i64,
}

impl TryFrom<PollRow> for Versioned<Poll> {
    type Error = StoreError;

    fn try_from(row: PollRow) -> Result<Self, Self::Error> {
        let option_count = row.options.len();
        let corrupt = |reason: String| StoreError::Corrupt { id: row.id, reason };

        for key in row.votes.0.keys() {
            match key.parse::<usize>() {
                Ok(index) if index < option_count => {}
                _ => return Err(corrupt(format!("vote key {key:?} outside {option_count} options"))),
            }
        }
        if let Some((user, index)) = row.voted_by.0.iter().find(|(_, index)| **index >= option_count) {
            return Err(corrupt(format!("{user} voted for option {index} of {option_count}")));
        }

        Ok(Versioned {
            version: row.version,
            value: Poll {
                poll_id: row.id,
                author_id: row.author_id,
                author_name: row.author_name,
                question: row.question,
                options: row.options,
                tally: Tally { votes: row.votes.0, voted_by: row.voted_by.0 },
                description: row.description.unwrap_or_default(),
                created_at: row.created_at,
            },
        })
    }
}

/// Poll documents kept in PostgreSQL. The `version` column carries the
/// optimistic-concurrency revision that `commit_tally` conditions on.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

#[rocket::async_trait]
impl PollStore for PgStore {
    async fn create(&self, poll: &Poll) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO idea_polls
             (id, author_id, author_name, question, options, description, votes, voted_by, created_at, version)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0)",
        )
        .bind(poll.poll_id)
        .bind(&poll.author_id)
        .bind(&poll.author_name)
        .bind(&poll.question)
        .bind(poll.options.as_slice())
        .bind(&poll.description)
        .bind(Json(&poll.tally.votes))
        .bind(Json(&poll.tally.voted_by))
        .bind(poll.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::Duplicate(poll.poll_id),
            e => db_error(e),
        })?;
        Ok(())
    }

    async fn list_newest_first(&self) -> Result<Vec<Poll>, StoreError> {
        let rows: Vec<PollRow> = sqlx::query_as(&format!("SELECT {POLL_COLUMNS} FROM idea_polls ORDER BY created_at DESC"))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter()
            .map(|row| Versioned::try_from(row).map(|doc| doc.value))
            .collect()
    }

    async fn fetch(&self, poll_id: Uuid) -> Result<Option<Versioned<Poll>>, StoreError> {
        let row: Option<PollRow> = sqlx::query_as(&format!("SELECT {POLL_COLUMNS} FROM idea_polls WHERE id = $1"))
            .bind(poll_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(Versioned::try_from).transpose()
    }

    async fn commit_tally(&self, poll_id: Uuid, expected_version: i64, tally: &Tally) -> Result<CommitOutcome, StoreError> {
        let result = sqlx::query(
            "UPDATE idea_polls SET votes = $3, voted_by = $4, version = version + 1
             WHERE id = $1 AND version = $2",
        )
        .bind(poll_id)
        .bind(expected_version)
        .bind(Json(&tally.votes))
        .bind(Json(&tally.voted_by))
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            Ok(CommitOutcome::Conflict)
        } else {
            Ok(CommitOutcome::Committed(expected_version + 1))
        }
    }
}
