use std::sync::Arc;

use quiz_core::hydrate::{self, PersistedFields};
use quiz_core::model::{Answers, Language, QuizLayout, QuizResult, QuizSession, StorageKey};
use quiz_core::reducer::{Action, reduce};
use storage::repository::KeyValueRepository;
use tracing::{debug, warn};

/// Everything a submission needs, captured at the moment it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTicket {
    pub(crate) epoch: u64,
    pub answers: Answers,
    pub birth_year: Option<i32>,
}

/// Owns the quiz session and keeps the device store in sync with it.
///
/// All mutations go through [`SessionStore::dispatch`]. Persistence failures
/// are logged and swallowed; the in-memory session stays authoritative.
pub struct SessionStore {
    session: QuizSession,
    repo: Arc<dyn KeyValueRepository>,
    epoch: u64,
    hydrated: bool,
}

impl SessionStore {
    /// A store with default state that has not read from the device yet.
    #[must_use]
    pub fn new(layout: QuizLayout, language: Language, repo: Arc<dyn KeyValueRepository>) -> Self {
        Self {
            session: QuizSession::new(layout, language),
            repo,
            epoch: 0,
            hydrated: false,
        }
    }

    /// Start a session: language first, then the remaining persisted fields.
    pub async fn open(
        layout: QuizLayout,
        default_language: Language,
        repo: Arc<dyn KeyValueRepository>,
    ) -> Self {
        let stored = read_key(repo.as_ref(), StorageKey::Language).await;
        let language = hydrate::parse_language(stored.as_deref()).unwrap_or(default_language);

        let mut store = Self::new(layout, language, repo);
        store.hydrate().await;
        store
    }

    /// Restore answers, result and birth year from the device. Runs once.
    pub async fn hydrate(&mut self) {
        if self.hydrated {
            return;
        }
        self.hydrated = true;

        let fields = PersistedFields {
            answers: read_key(self.repo.as_ref(), StorageKey::Answers).await,
            result: read_key(self.repo.as_ref(), StorageKey::Result).await,
            birth_year: read_key(self.repo.as_ref(), StorageKey::BirthYear).await,
        };

        let (patch, issues) = hydrate::validate(&fields, self.session.layout());
        for issue in &issues {
            warn!(%issue, "discarding persisted session field");
        }
        if !patch.is_empty() {
            debug!(
                answers = patch.answers.is_some(),
                result = patch.result.is_some(),
                birth_year = patch.birth_year.is_some(),
                "hydrating session"
            );
            self.dispatch(Action::Hydrate(patch)).await;
        }
    }

    /// Apply a transition, then persist what it changed, in order.
    pub async fn dispatch(&mut self, action: Action) {
        if matches!(action, Action::Reset) {
            self.epoch += 1;
        }
        let ops = reduce(&mut self.session, action);
        for op in &ops {
            if let Err(err) = self.repo.apply(op).await {
                warn!(key = %op.key(), error = %err, "failed to persist session field");
            }
        }
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Reset counter; a result computed in an older epoch is stale.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn submission_ticket(&self) -> SubmissionTicket {
        SubmissionTicket {
            epoch: self.epoch,
            answers: self.session.answers().clone(),
            birth_year: self.session.birth_year(),
        }
    }

    /// Store a received result unless the session was reset after `ticket` was taken.
    ///
    /// Returns `true` if the result was applied.
    pub async fn apply_result(&mut self, ticket: &SubmissionTicket, result: QuizResult) -> bool {
        if ticket.epoch != self.epoch {
            debug!(
                ticket_epoch = ticket.epoch,
                epoch = self.epoch,
                "dropping result from a reset session"
            );
            return false;
        }
        self.dispatch(Action::SetResult(result)).await;
        true
    }
}

async fn read_key(repo: &dyn KeyValueRepository, key: StorageKey) -> Option<String> {
    match repo.get(key).await {
        Ok(value) => value,
        Err(err) => {
            warn!(%key, error = %err, "failed to read persisted session field");
            None
        }
    }
}
