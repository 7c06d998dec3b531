//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{LanguageError, LayoutError};
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ResultSubmitter` and scoring backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubmitError {
    #[error("a submission is already in flight")]
    InFlight,
    #[error("scoring request failed with status {status}")]
    Status { status: u16, body: String },
    #[error("scoring response could not be read: {0}")]
    InvalidBody(String),
    #[error("session was reset before the result arrived")]
    Superseded,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl SubmitError {
    /// Text shown to the user in the blocking failure notice.
    ///
    /// Non-2xx responses surface the raw response body when there is one.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Status { body, .. } if !body.trim().is_empty() => body.trim().to_string(),
            other => other.to_string(),
        }
    }
}

/// Input problems caught before a transition is dispatched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("please select your birth year")]
    BirthYearRequired,
    #[error("birth year {0} is outside the selectable range")]
    ImplausibleBirthYear(i32),
    #[error("choice {0} is not one of the offered options")]
    InvalidChoice(u8),
    #[error("question {index} takes a birth year, not a choice")]
    NotAChoiceQuestion { index: usize },
    #[error("question {index} is not the birth-year question")]
    NotABirthYearQuestion { index: usize },
    #[error("question {index} is not the last question; answers are scored from there")]
    NotOnLastQuestion { index: usize },
    #[error("this quiz has already been scored")]
    AlreadyScored,
}

/// Errors emitted while reading configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{var} is not a valid URL: {raw}")]
    InvalidUrl { var: &'static str, raw: String },
    #[error("{var} is not a whole number of seconds: {raw}")]
    InvalidTimeout { var: &'static str, raw: String },
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Language(#[from] LanguageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
}
