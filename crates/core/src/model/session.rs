use crate::model::{Answers, Language, QuizLayout, QuizResult};

/// In-memory progress through the question sequence.
///
/// Fields are private; the only way to change a session is through
/// [`crate::reducer::reduce`], which keeps the index and answer-length
/// invariants intact.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    layout: QuizLayout,
    pub(crate) language: Language,
    pub(crate) current_index: usize,
    pub(crate) answers: Answers,
    pub(crate) birth_year: Option<i32>,
    pub(crate) result: Option<QuizResult>,
}

impl QuizSession {
    #[must_use]
    pub fn new(layout: QuizLayout, language: Language) -> Self {
        Self {
            layout,
            language,
            current_index: 0,
            answers: Answers::unanswered(layout.question_count()),
            birth_year: None,
            result: None,
        }
    }

    #[must_use]
    pub fn layout(&self) -> QuizLayout {
        self.layout
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    #[must_use]
    pub fn birth_year(&self) -> Option<i32> {
        self.birth_year
    }

    #[must_use]
    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn current_answer(&self) -> Option<u8> {
        self.answers.get(self.current_index)
    }

    #[must_use]
    pub fn on_birth_year_question(&self) -> bool {
        self.layout.is_birth_year_question(self.current_index)
    }

    #[must_use]
    pub fn on_last_question(&self) -> bool {
        self.layout.is_last(self.current_index)
    }

    /// Completion percentage shown in the progress bar (0 on the first question).
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        let total = self.layout.question_count();
        let pct = (self.current_index * 100 + total / 2) / total;
        u8::try_from(pct).unwrap_or(100)
    }
}
