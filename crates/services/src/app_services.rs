use std::sync::Arc;

use storage::repository::Storage;
use tracing::info;

use crate::Clock;
use crate::config::QuizConfig;
use crate::error::AppServicesError;
use crate::quiz_flow::QuizFlow;
use crate::session_store::SessionStore;
use crate::share::{SharePlatform, ShareNegotiator};
use crate::submit::{HttpScoringBackend, ResultSubmitter, ScoringBackend};

/// Assembles the quiz services from configuration.
#[derive(Clone)]
pub struct AppServices {
    config: QuizConfig,
    storage: Storage,
    submitter: ResultSubmitter,
    clock: Clock,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the HTTP scoring backend.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the HTTP
    /// client cannot be built.
    pub async fn new_sqlite(config: QuizConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.db_url).await?;
        let backend = HttpScoringBackend::new(config.scoring.clone())?;
        info!(
            db = %config.db_url,
            endpoint = %config.scoring.result_endpoint(),
            "quiz services ready"
        );
        Ok(Self::with_parts(config, storage, Arc::new(backend), clock))
    }

    /// Build services from already constructed parts.
    #[must_use]
    pub fn with_parts(
        config: QuizConfig,
        storage: Storage,
        backend: Arc<dyn ScoringBackend>,
        clock: Clock,
    ) -> Self {
        Self {
            config,
            storage,
            submitter: ResultSubmitter::new(backend),
            clock,
        }
    }

    #[must_use]
    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    /// Hydrate the persisted session and start a flow over it.
    pub async fn open_flow(&self) -> QuizFlow {
        let store = SessionStore::open(
            self.config.layout,
            self.config.default_language,
            Arc::clone(&self.storage.session),
        )
        .await;
        let mut flow = QuizFlow::new(
            store,
            self.submitter.clone(),
            self.clock,
            self.config.forced_language,
        );
        flow.enter().await;
        flow
    }

    #[must_use]
    pub fn share_negotiator(&self, platform: Arc<dyn SharePlatform>) -> ShareNegotiator {
        ShareNegotiator::new(platform)
    }
}
