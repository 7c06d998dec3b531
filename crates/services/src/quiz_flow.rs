use quiz_core::model::{Language, QuizResult, is_choice};
use quiz_core::reducer::Action;
use quiz_core::share::ShareArtifact;
use tracing::{debug, info};

use crate::Clock;
use crate::config::ShareConfig;
use crate::error::{SubmitError, ValidationError};
use crate::session_store::SessionStore;
use crate::submit::ResultSubmitter;

/// What the user should be looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Question { index: usize },
    Result,
}

/// Outcome of a user intent.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowStep {
    /// Moved to another question.
    Moved { index: usize },
    /// The last question was answered and scored.
    Completed(QuizResult),
    /// Scoring failed; answers are kept so the user can retry.
    SubmissionFailed { message: String },
    /// Back was pressed on the first question; the session was reset.
    Restarted,
}

/// Question-by-question controller over a [`SessionStore`].
pub struct QuizFlow {
    store: SessionStore,
    submitter: ResultSubmitter,
    clock: Clock,
    forced_language: Option<Language>,
}

impl QuizFlow {
    #[must_use]
    pub fn new(
        store: SessionStore,
        submitter: ResultSubmitter,
        clock: Clock,
        forced_language: Option<Language>,
    ) -> Self {
        Self {
            store,
            submitter,
            clock,
            forced_language,
        }
    }

    /// Entering the quiz applies a forced language, if one is configured.
    pub async fn enter(&mut self) {
        if let Some(language) = self.forced_language
            && self.store.session().language() != language
        {
            debug!(%language, "forcing quiz language");
            self.store.dispatch(Action::SetLanguage(language)).await;
        }
    }

    /// Switch language. Ignored while a language is forced.
    pub async fn set_language(&mut self, language: Language) -> bool {
        if self.forced_language.is_some() {
            return false;
        }
        self.store.dispatch(Action::SetLanguage(language)).await;
        true
    }

    /// Answer the current choice question with option `choice` (1-based).
    ///
    /// Answering the last question submits the sheet.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if `choice` is not offered, the current
    /// question asks for a birth year, or the quiz was already scored.
    pub async fn pick(&mut self, choice: u8) -> Result<FlowStep, ValidationError> {
        if !is_choice(choice) {
            return Err(ValidationError::InvalidChoice(choice));
        }
        let session = self.store.session();
        if session.result().is_some() {
            return Err(ValidationError::AlreadyScored);
        }
        let index = session.current_index();
        if session.on_birth_year_question() {
            return Err(ValidationError::NotAChoiceQuestion { index });
        }

        self.store
            .dispatch(Action::SetAnswer {
                index,
                value: choice,
            })
            .await;
        Ok(self.advance().await)
    }

    /// Select (or clear) the birth year on the birth-year question.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the current question is not the birth-year
    /// question or the year is outside the offered range.
    pub async fn select_birth_year(&mut self, year: Option<i32>) -> Result<(), ValidationError> {
        let session = self.store.session();
        if !session.on_birth_year_question() {
            return Err(ValidationError::NotABirthYearQuestion {
                index: session.current_index(),
            });
        }
        if let Some(year) = year
            && !self.clock.is_plausible_birth_year(year)
        {
            return Err(ValidationError::ImplausibleBirthYear(year));
        }
        self.store.dispatch(Action::SetBirthYear(year)).await;
        Ok(())
    }

    /// Leave the birth-year question.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::BirthYearRequired` until a year is selected.
    pub async fn confirm_birth_year(&mut self) -> Result<FlowStep, ValidationError> {
        let session = self.store.session();
        if session.result().is_some() {
            return Err(ValidationError::AlreadyScored);
        }
        if !session.on_birth_year_question() {
            return Err(ValidationError::NotABirthYearQuestion {
                index: session.current_index(),
            });
        }
        if session.birth_year().is_none() {
            return Err(ValidationError::BirthYearRequired);
        }
        Ok(self.advance().await)
    }

    /// Go back one question; on the first question this starts over.
    pub async fn back(&mut self) -> FlowStep {
        if self.store.session().current_index() == 0 {
            self.restart().await;
            return FlowStep::Restarted;
        }
        self.store.dispatch(Action::Prev).await;
        FlowStep::Moved {
            index: self.store.session().current_index(),
        }
    }

    /// Clear answers, result and birth year. Language is kept.
    pub async fn restart(&mut self) {
        info!("restarting quiz");
        self.store.dispatch(Action::Reset).await;
    }

    /// Score the current answers again after a failed submission.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` unless the user is on the last question and
    /// no result has been recorded yet.
    pub async fn submit(&mut self) -> Result<FlowStep, ValidationError> {
        let session = self.store.session();
        if session.result().is_some() {
            return Err(ValidationError::AlreadyScored);
        }
        if !session.on_last_question() {
            return Err(ValidationError::NotOnLastQuestion {
                index: session.current_index(),
            });
        }
        Ok(self.score().await)
    }

    async fn score(&mut self) -> FlowStep {
        match self.submitter.submit(&mut self.store).await {
            Ok(result) => FlowStep::Completed(result),
            Err(SubmitError::Superseded) => FlowStep::Restarted,
            Err(err) => FlowStep::SubmissionFailed {
                message: err.user_message(),
            },
        }
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        let session = self.store.session();
        if session.result().is_some() {
            Screen::Result
        } else {
            Screen::Question {
                index: session.current_index(),
            }
        }
    }

    /// Artifact for sharing the current result, if there is one.
    #[must_use]
    pub fn share_artifact(&self, config: &ShareConfig) -> Option<ShareArtifact> {
        let session = self.store.session();
        session.result().map(|result| {
            ShareArtifact::for_result(result, session.language(), &config.origin, &config.title)
        })
    }

    #[must_use]
    pub fn birth_year_options(&self) -> Vec<i32> {
        self.clock.birth_year_options()
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    async fn advance(&mut self) -> FlowStep {
        if self.store.session().on_last_question() {
            return self.score().await;
        }
        self.store.dispatch(Action::Next).await;
        FlowStep::Moved {
            index: self.store.session().current_index(),
        }
    }
}
