use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use quiz_core::model::QuizResult;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ScoringConfig;
use crate::error::SubmitError;
use crate::session_store::{SessionStore, SubmissionTicket};

/// Body of `POST /api/result`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreRequest {
    pub answers: Vec<u8>,
    pub birth_year: Option<i32>,
}

impl ScoreRequest {
    #[must_use]
    pub fn from_ticket(ticket: &SubmissionTicket) -> Self {
        Self {
            answers: ticket.answers.to_wire(),
            birth_year: ticket.birth_year,
        }
    }
}

/// Remote scoring contract: one request in, one result out.
#[async_trait]
pub trait ScoringBackend: Send + Sync {
    /// Score a completed answer sheet.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError` for transport failures, non-2xx responses and
    /// unreadable bodies.
    async fn score(&self, request: &ScoreRequest) -> Result<QuizResult, SubmitError>;
}

/// `ScoringBackend` over HTTP.
#[derive(Clone)]
pub struct HttpScoringBackend {
    client: Client,
    config: ScoringConfig,
}

impl HttpScoringBackend {
    /// # Errors
    ///
    /// Returns `SubmitError::Http` if the HTTP client cannot be built.
    pub fn new(config: ScoringConfig) -> Result<Self, SubmitError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }
}

#[async_trait]
impl ScoringBackend for HttpScoringBackend {
    async fn score(&self, request: &ScoreRequest) -> Result<QuizResult, SubmitError> {
        let url = self.config.result_endpoint();
        debug!(%url, answers = request.answers.len(), "submitting answers");

        let response = self.client.post(url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SubmitError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|err| SubmitError::InvalidBody(err.to_string()))
    }
}

/// Sends the current answers for scoring, at most one request at a time.
#[derive(Clone)]
pub struct ResultSubmitter {
    backend: Arc<dyn ScoringBackend>,
    in_flight: Arc<AtomicBool>,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ResultSubmitter {
    #[must_use]
    pub fn new(backend: Arc<dyn ScoringBackend>) -> Self {
        Self {
            backend,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Issue exactly one scoring request for `ticket`.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::InFlight` without issuing a request if another
    /// submission has not finished; otherwise propagates backend errors.
    pub async fn score(&self, ticket: &SubmissionTicket) -> Result<QuizResult, SubmitError> {
        let _guard = self.acquire()?;
        let request = ScoreRequest::from_ticket(ticket);
        self.backend.score(&request).await
    }

    /// Score the store's current answers and record the result.
    ///
    /// On failure the session is left untouched so the user can retry.
    ///
    /// # Errors
    ///
    /// Returns the `SubmitError` from [`ResultSubmitter::score`], or
    /// `SubmitError::Superseded` if the session was reset meanwhile.
    pub async fn submit(&self, store: &mut SessionStore) -> Result<QuizResult, SubmitError> {
        let ticket = store.submission_ticket();
        match self.score(&ticket).await {
            Ok(result) => {
                if !store.apply_result(&ticket, result.clone()).await {
                    return Err(SubmitError::Superseded);
                }
                info!(code = ?result.code(), "result received");
                Ok(result)
            }
            Err(err) => {
                warn!(error = %err, "submission failed");
                Err(err)
            }
        }
    }

    fn acquire(&self) -> Result<InFlightGuard<'_>, SubmitError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlightGuard(&self.in_flight))
            .map_err(|_| SubmitError::InFlight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Language, QuizLayout};
    use quiz_core::reducer::Action;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use storage::repository::InMemoryRepository;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct RecordingBackend {
        calls: AtomicUsize,
        requests: Mutex<Vec<ScoreRequest>>,
        fail_with: Option<u16>,
    }

    #[async_trait]
    impl ScoringBackend for RecordingBackend {
        async fn score(&self, request: &ScoreRequest) -> Result<QuizResult, SubmitError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            match self.fail_with {
                Some(status) => Err(SubmitError::Status {
                    status,
                    body: "Internal Server Error".into(),
                }),
                None => Ok(QuizResult::new(3).with_image("/assets/result-3.png")),
            }
        }
    }

    struct BlockingBackend {
        release: Arc<Notify>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ScoringBackend for BlockingBackend {
        async fn score(&self, _request: &ScoreRequest) -> Result<QuizResult, SubmitError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            Ok(QuizResult::new(1))
        }
    }

    async fn answered_store(layout: QuizLayout) -> SessionStore {
        let repo = Arc::new(InMemoryRepository::new());
        let mut store = SessionStore::new(layout, Language::Eng, repo);
        for index in 0..layout.question_count() {
            store.dispatch(Action::SetAnswer { index, value: 1 }).await;
        }
        store
    }

    #[tokio::test]
    async fn server_error_leaves_session_untouched() {
        let backend = Arc::new(RecordingBackend {
            fail_with: Some(500),
            ..RecordingBackend::default()
        });
        let submitter = ResultSubmitter::new(backend.clone());
        let mut store = answered_store(QuizLayout::classic()).await;
        let before = store.session().clone();

        let err = submitter.submit(&mut store).await.unwrap_err();

        assert!(matches!(err, SubmitError::Status { status: 500, .. }));
        assert_eq!(err.user_message(), "Internal Server Error");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert!(store.session().result().is_none());
        assert_eq!(store.session(), &before);
        assert!(!submitter.is_in_flight());
    }

    #[tokio::test]
    async fn success_records_result_and_sends_sentinels() {
        let backend = Arc::new(RecordingBackend::default());
        let submitter = ResultSubmitter::new(backend.clone());
        let mut store = SessionStore::new(
            QuizLayout::extended(),
            Language::Eng,
            Arc::new(InMemoryRepository::new()),
        );
        store.dispatch(Action::SetAnswer { index: 0, value: 2 }).await;
        store.dispatch(Action::SetBirthYear(Some(1995))).await;

        let result = submitter.submit(&mut store).await.unwrap();

        assert_eq!(result.code(), Some(3));
        assert_eq!(store.session().result(), Some(&result));
        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].answers, vec![2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(requests[0].birth_year, Some(1995));
    }

    #[tokio::test]
    async fn concurrent_submission_is_refused() {
        let release = Arc::new(Notify::new());
        let backend = Arc::new(BlockingBackend {
            release: Arc::clone(&release),
            calls: AtomicUsize::new(0),
        });
        let submitter = ResultSubmitter::new(backend.clone());
        let store = answered_store(QuizLayout::classic()).await;
        let ticket = store.submission_ticket();

        let first = submitter.score(&ticket);
        let second = async {
            let outcome = submitter.score(&ticket).await;
            release.notify_one();
            outcome
        };
        let (first, second) = tokio::join!(first, second);

        assert!(first.is_ok());
        assert!(matches!(second, Err(SubmitError::InFlight)));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert!(!submitter.is_in_flight());
    }

    #[test]
    fn request_serializes_null_birth_year() {
        let request = ScoreRequest {
            answers: vec![1; 9],
            birth_year: None,
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"answers":[1,1,1,1,1,1,1,1,1],"birth_year":null}"#
        );
    }
}
