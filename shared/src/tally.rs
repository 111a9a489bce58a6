use std::collections::BTreeMap;
use thiserror::Error;
use serde::{Serialize, Deserialize};

use crate::models::Poll;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TallyError {
    #[error("Invalid option {index}: poll has {option_count} options")]
    InvalidOption { index: usize, option_count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum VoteAction {
    Cast,
    Retracted,
    Changed { from: usize },
}

/// The mutable part of a poll document.
///
/// `votes` is keyed by the option index rendered as a decimal string, which is
/// how the document store persists it. Missing keys count as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    #[serde(default)]
    pub votes: BTreeMap<String, u32>,
    #[serde(default)]
    pub voted_by: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteOutcome {
    pub tally: Tally,
    pub selection: Option<usize>,
    pub action: VoteAction,
}

pub fn option_key(index: usize) -> String {
    index.to_string()
}

impl Tally {
    pub fn count(&self, index: usize) -> u32 {
        self.votes.get(&option_key(index)).copied().unwrap_or(0)
    }

    pub fn total_votes(&self) -> u64 {
        self.votes.values().map(|&c| u64::from(c)).sum()
    }

    /// Votes recorded in `votes` match the voters in `voted_by`, and every
    /// selection points at a real option.
    pub fn is_consistent(&self, option_count: usize) -> bool {
        self.total_votes() == self.voted_by.len() as u64
            && self.voted_by.values().all(|&idx| idx < option_count)
    }

    /// Applies one tap from `user_id` on `option_index`.
    ///
    /// Tapping with no prior vote casts it, tapping the current selection
    /// retracts it, tapping another option moves the vote. The receiver is left
    /// untouched so the caller can retry against a fresh read.
    pub fn apply(&self, user_id: &str, option_index: usize, option_count: usize) -> Result<VoteOutcome, TallyError> {
        if option_index >= option_count {
            return Err(TallyError::InvalidOption { index: option_index, option_count });
        }

        let mut next = self.clone();
        let action = match next.voted_by.get(user_id).copied() {
            None => {
                next.increment(option_index);
                next.voted_by.insert(user_id.to_string(), option_index);
                VoteAction::Cast
            }
            Some(previous) if previous == option_index => {
                next.decrement(previous);
                next.voted_by.remove(user_id);
                VoteAction::Retracted
            }
            Some(previous) => {
                next.decrement(previous);
                next.increment(option_index);
                next.voted_by.insert(user_id.to_string(), option_index);
                VoteAction::Changed { from: previous }
            }
        };

        let selection = next.voted_by.get(user_id).copied();
        Ok(VoteOutcome { tally: next, selection, action })
    }

    fn increment(&mut self, index: usize) {
        *self.votes.entry(option_key(index)).or_insert(0) += 1;
    }

    // Floored at zero even if the stored count was already wrong.
    fn decrement(&mut self, index: usize) {
        let count = self.votes.entry(option_key(index)).or_insert(0);
        *count = count.saturating_sub(1);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptionSummary {
    pub index: usize,
    pub label: String,
    pub count: u32,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollSummary {
    pub total_votes: u64,
    pub options: Vec<OptionSummary>,
    pub selected: Option<usize>,
}

/// Display aggregates for one poll as seen by `viewer`.
pub fn aggregate(poll: &Poll, viewer: Option<&str>) -> PollSummary {
    let total_votes = poll.tally.total_votes();

    let options = poll.options.iter()
        .enumerate()
        .map(|(index, label)| {
            let count = poll.tally.count(index);
            let percent = if total_votes == 0 {
                0.0
            } else {
                f64::from(count) / total_votes as f64
            };
            OptionSummary { index, label: label.clone(), count, percent }
        })
        .collect();

    PollSummary {
        total_votes,
        options,
        selected: viewer.and_then(|user| poll.tally.voted_by.get(user).copied()),
    }
}
