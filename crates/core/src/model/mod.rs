mod answers;
mod keys;
mod language;
mod layout;
mod result;
mod session;

pub use answers::{Answers, CHOICE_COUNT, UNANSWERED_SENTINEL, is_choice};
pub use keys::StorageKey;
pub use language::{Language, LanguageError};
pub use layout::{LayoutError, QuizLayout};
pub use result::{DerivedMetrics, FALLBACK_RESULT_CODE, QuizResult};
pub use session::QuizSession;
