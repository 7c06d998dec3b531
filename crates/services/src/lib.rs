#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod quiz_flow;
pub mod session_store;
pub mod share;
pub mod submit;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use config::{QuizConfig, ScoringConfig, ShareConfig};
pub use error::{AppServicesError, ConfigError, SubmitError, ValidationError};
pub use quiz_flow::{FlowStep, QuizFlow, Screen};
pub use session_store::{SessionStore, SubmissionTicket};
pub use share::{
    PlatformError, ShareCapabilities, ShareNegotiator, ShareOutcome, SharePayload, SharePlatform,
    ShareState, ShareTier, SharedFile, UrlField,
};
pub use submit::{HttpScoringBackend, ResultSubmitter, ScoreRequest, ScoringBackend};
