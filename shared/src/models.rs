use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::tally::{aggregate, PollSummary, Tally, VoteAction};

pub const DEFAULT_AUTHOR_NAME: &str = "Anonymous";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub poll_id: Uuid,
    pub author_id: String,
    pub author_name: String,
    pub question: String,
    pub options: Vec<String>,
    #[serde(flatten)]
    pub tally: Tally,
    #[serde(default)]
    pub description: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    pub question: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub option_index: usize,
}

/// Result of a committed vote: the fresh tally and where the caller ended up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    pub poll_id: Uuid,
    pub votes: BTreeMap<String, u32>,
    pub selection: Option<usize>,
    pub action: VoteAction,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollView {
    pub poll: Poll,
    pub summary: PollSummary,
}

impl PollView {
    pub fn new(poll: Poll, viewer: Option<&str>) -> Self {
        let summary = aggregate(&poll, viewer);
        Self { poll, summary }
    }
}

impl Poll {
    /// Builds a fresh document from an already validated request. Text fields
    /// are stored trimmed and the tally starts empty.
    pub fn new(author_id: impl Into<String>, author_name: Option<&str>, request: &CreatePollRequest) -> Self {
        let author_name = author_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_AUTHOR_NAME);

        Self {
            poll_id: Uuid::new_v4(),
            author_id: author_id.into(),
            author_name: author_name.to_string(),
            question: request.question.trim().to_string(),
            options: request.options.iter().map(|opt| opt.trim().to_string()).collect(),
            tally: Tally::default(),
            description: request.description.as_deref().map(str::trim).unwrap_or_default().to_string(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    pub fn total_votes(&self) -> u64 {
        self.tally.total_votes()
    }
}
