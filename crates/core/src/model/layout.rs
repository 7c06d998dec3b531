use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LayoutError {
    #[error("a quiz needs at least one question")]
    Empty,

    #[error("birth-year question index {index} is outside {question_count} questions")]
    BirthYearOutOfRange { index: usize, question_count: usize },

    #[error("unknown layout: {0}")]
    Unknown(String),
}

/// Shape of the question sequence, fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizLayout {
    question_count: usize,
    birth_year_index: Option<usize>,
}

impl QuizLayout {
    /// Build a layout.
    ///
    /// # Errors
    ///
    /// Returns `LayoutError::Empty` for zero questions and
    /// `LayoutError::BirthYearOutOfRange` if the birth-year slot does not exist.
    pub fn new(question_count: usize, birth_year_index: Option<usize>) -> Result<Self, LayoutError> {
        if question_count == 0 {
            return Err(LayoutError::Empty);
        }
        if let Some(index) = birth_year_index {
            if index >= question_count {
                return Err(LayoutError::BirthYearOutOfRange {
                    index,
                    question_count,
                });
            }
        }
        Ok(Self {
            question_count,
            birth_year_index,
        })
    }

    /// Twelve questions; the second one asks for the birth year.
    #[must_use]
    pub const fn extended() -> Self {
        Self {
            question_count: 12,
            birth_year_index: Some(1),
        }
    }

    /// Nine multiple-choice questions, no date-of-birth step.
    #[must_use]
    pub const fn classic() -> Self {
        Self {
            question_count: 9,
            birth_year_index: None,
        }
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.question_count
    }

    #[must_use]
    pub fn last_index(&self) -> usize {
        self.question_count - 1
    }

    #[must_use]
    pub fn birth_year_index(&self) -> Option<usize> {
        self.birth_year_index
    }

    #[must_use]
    pub fn is_birth_year_question(&self, index: usize) -> bool {
        self.birth_year_index == Some(index)
    }

    #[must_use]
    pub fn is_last(&self, index: usize) -> bool {
        index == self.last_index()
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        index < self.question_count
    }
}

impl Default for QuizLayout {
    fn default() -> Self {
        Self::extended()
    }
}

impl FromStr for QuizLayout {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "extended" => Ok(Self::extended()),
            "classic" => Ok(Self::classic()),
            other => Err(LayoutError::Unknown(other.to_string())),
        }
    }
}
