use std::collections::HashMap;
use std::sync::Mutex;
use shared::{Poll, Tally};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::EngineError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Poll {0} already exists")]
    Duplicate(Uuid),
    #[error("Failed to acquire store lock")]
    LockFailed,
    #[error("Database error: {0}")]
    Database(String),
    #[error("Corrupt poll document {id}: {reason}")]
    Corrupt { id: Uuid, reason: String },
}

/// A document together with the revision it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub version: i64,
    pub value: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed(i64),
    Conflict,
}

#[rocket::async_trait]
pub trait PollStore: Send + Sync {
    async fn create(&self, poll: &Poll) -> Result<(), StoreError>;

    async fn list_newest_first(&self) -> Result<Vec<Poll>, StoreError>;

    async fn fetch(&self, poll_id: Uuid) -> Result<Option<Versioned<Poll>>, StoreError>;

    /// Writes `tally` only if the document is still at `expected_version`.
    async fn commit_tally(&self, poll_id: Uuid, expected_version: i64, tally: &Tally) -> Result<CommitOutcome, StoreError>;
}

/// Optimistic read-modify-write over one poll document.
///
/// Each attempt reads a fresh snapshot, hands it to `apply` and commits the
/// returned tally conditioned on the snapshot's version. A conflict reruns the
/// whole cycle; an error from `apply` aborts without writing.
pub async fn run_transaction<S, F, T>(
    store: &S,
    poll_id: Uuid,
    max_attempts: u32,
    mut apply: F,
) -> Result<T, EngineError>
where
    S: PollStore + ?Sized,
    F: FnMut(&Poll) -> Result<(Tally, T), EngineError> + Send,
    T: Send,
{
    for attempt in 1..=max_attempts {
        let snapshot = store.fetch(poll_id).await?.ok_or(EngineError::NotFound)?;
        let (tally, result) = apply(&snapshot.value)?;

        match store.commit_tally(poll_id, snapshot.version, &tally).await? {
            CommitOutcome::Committed(version) => {
                debug!(%poll_id, attempt, version, "Tally committed");
                return Ok(result);
            }
            CommitOutcome::Conflict => {
                debug!(%poll_id, attempt, "Tally write conflicted, retrying");
            }
        }
    }

    warn!(%poll_id, max_attempts, "Giving up on contended poll");
    Err(EngineError::ConflictRetryExhausted { attempts: max_attempts })
}

/// In-process store used by tests and local runs without a database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    polls: Mutex<HashMap<Uuid, Versioned<Poll>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[rocket::async_trait]
impl PollStore for MemoryStore {
    async fn create(&self, poll: &Poll) -> Result<(), StoreError> {
        let mut polls = self.polls.lock().map_err(|_| StoreError::LockFailed)?;
        if polls.contains_key(&poll.poll_id) {
            return Err(StoreError::Duplicate(poll.poll_id));
        }
        polls.insert(poll.poll_id, Versioned { version: 0, value: poll.clone() });
        Ok(())
    }

    async fn list_newest_first(&self) -> Result<Vec<Poll>, StoreError> {
        let polls = self.polls.lock().map_err(|_| StoreError::LockFailed)?;
        let mut list: Vec<Poll> = polls.values().map(|v| v.value.clone()).collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn fetch(&self, poll_id: Uuid) -> Result<Option<Versioned<Poll>>, StoreError> {
        let polls = self.polls.lock().map_err(|_| StoreError::LockFailed)?;
        Ok(polls.get(&poll_id).cloned())
    }

    async fn commit_tally(&self, poll_id: Uuid, expected_version: i64, tally: &Tally) -> Result<CommitOutcome, StoreError> {
        let mut polls = self.polls.lock().map_err(|_| StoreError::LockFailed)?;
        match polls.get_mut(&poll_id) {
            Some(doc) if doc.version == expected_version => {
                doc.version += 1;
                doc.value.tally = tally.clone();
                Ok(CommitOutcome::Committed(doc.version))
            }
            _ => Ok(CommitOutcome::Conflict),
        }
    }
}
