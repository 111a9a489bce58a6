use std::sync::Arc;
use shared::{validate_poll_request, AuthUser, CreatePollRequest, Poll, VoteReceipt};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::EngineError;
use crate::moderation::ModerationGate;
use crate::rate_limiter::RateLimiter;
use crate::store::{run_transaction, PollStore};

/// Entry point for everything the API does with polls: creation behind
/// validation and moderation, reads, and transactional voting.
pub struct PollProcessor {
    store: Arc<dyn PollStore>,
    moderation: ModerationGate,
    max_attempts: u32,
    poll_limiter: Option<RateLimiter>,
}

impl PollProcessor {
    pub fn new(store: Arc<dyn PollStore>, moderation: ModerationGate, max_attempts: u32) -> Self {
        Self {
            store,
            moderation,
            max_attempts: max_attempts.max(1),
            poll_limiter: None,
        }
    }

    /// Caps, per author, creations that pass validation and moderation.
    pub fn with_poll_limiter(mut self, limiter: RateLimiter) -> Self {
        self.poll_limiter = Some(limiter);
        self
    }

    #[instrument(skip(self, user, request))]
    pub async fn create_poll(&self, user: Option<&AuthUser>, request: CreatePollRequest) -> Result<Poll, EngineError> {
        let user = user.ok_or(EngineError::Unauthenticated)?;
        validate_poll_request(&request)?;

        let mut fields = vec![
            ("question".to_string(), request.question.as_str()),
            ("description".to_string(), request.description.as_deref().unwrap_or_default()),
        ];
        fields.extend(
            request.options.iter()
                .enumerate()
                .map(|(i, opt)| (format!("option {}", i + 1), opt.as_str())),
        );

        if let Some(field) = self.moderation.first_rejected(&fields).await {
            info!(user = %user.id, %field, "Poll rejected by moderation");
            return Err(EngineError::Moderation { field });
        }

        // Only requests that would be stored count against the limit.
        if let Some(limiter) = &self.poll_limiter {
            limiter.check_rate_limit(&format!("create_poll:{}", user.id))?;
        }

        let poll = Poll::new(user.id.clone(), user.display_name.as_deref(), &request);
        self.store.create(&poll).await?;

        info!(poll_id = %poll.poll_id, author = %poll.author_id, "Poll created");
        Ok(poll)
    }

    pub async fn list_polls(&self) -> Result<Vec<Poll>, EngineError> {
        Ok(self.store.list_newest_first().await?)
    }

    pub async fn get_poll(&self, poll_id: Uuid) -> Result<Poll, EngineError> {
        self.store.fetch(poll_id).await?
            .map(|doc| doc.value)
            .ok_or(EngineError::NotFound)
    }

    /// Casts, moves or retracts `user`'s vote in one optimistic transaction.
    #[instrument(skip(self, user), fields(user = ?user.map(|u| &u.id)))]
    pub async fn cast_vote(&self, poll_id: Uuid, user: Option<&AuthUser>, option_index: usize) -> Result<VoteReceipt, EngineError> {
        let user = user.ok_or(EngineError::Unauthenticated)?;

        let outcome = run_transaction(&*self.store, poll_id, self.max_attempts, |poll| {
            let outcome = poll.tally.apply(&user.id, option_index, poll.option_count())?;
            Ok((outcome.tally.clone(), outcome))
        })
        .await?;

        info!(%poll_id, action = ?outcome.action, selection = ?outcome.selection, "Vote applied");

        Ok(VoteReceipt {
            poll_id,
            votes: outcome.tally.votes,
            selection: outcome.selection,
            action: outcome.action,
        })
    }
}
