//! Validation of persisted session fields before they are merged into state.
//!
//! Persisted data may be missing, truncated, from an older layout, or written
//! by hand. Each field is checked on its own; a bad field is reported and
//! dropped while the others still hydrate.

use thiserror::Error;

use crate::model::{Answers, Language, QuizLayout, QuizResult, StorageKey, is_choice};

/// Fields restored from storage. `None` means "leave the current value".
///
/// Language is not part of the patch: it is read before the session exists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    pub answers: Option<Answers>,
    pub birth_year: Option<i32>,
    pub result: Option<QuizResult>,
}

impl SessionPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_none()
            && self.birth_year.is_none()
            && self.result.is_none()
    }
}

/// Raw values as read from the device store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedFields {
    pub answers: Option<String>,
    pub result: Option<String>,
    pub birth_year: Option<String>,
}

/// Why a persisted field was discarded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HydrateIssue {
    #[error("{key}: not valid JSON of the expected shape: {reason}")]
    Malformed { key: StorageKey, reason: String },

    #[error("answers: expected {expected} slots, found {found}")]
    AnswerCount { expected: usize, found: usize },

    #[error("answers: slot {index} holds {value}, which is not an offered choice")]
    AnswerValue { index: usize, value: u8 },

    #[error("birthYear: not a year: {raw:?}")]
    BirthYear { raw: String },

    #[error("birthYear: {raw:?} stored, but this quiz does not ask for it")]
    BirthYearNotAsked { raw: String },
}

/// Read the persisted language code. Unknown codes count as "not set".
#[must_use]
pub fn parse_language(raw: Option<&str>) -> Option<Language> {
    raw.and_then(|code| code.parse().ok())
}

/// Validate persisted answers, result and birth year against `layout`.
///
/// Returns the patch of accepted fields together with every rejected field.
#[must_use]
pub fn validate(fields: &PersistedFields, layout: QuizLayout) -> (SessionPatch, Vec<HydrateIssue>) {
    let mut patch = SessionPatch::default();
    let mut issues = Vec::new();

    if let Some(raw) = non_empty(fields.answers.as_deref()) {
        match serde_json::from_str::<Option<Vec<Option<u8>>>>(raw) {
            Ok(Some(slots)) => match check_answers(slots, layout) {
                Ok(answers) => patch.answers = Some(answers),
                Err(issue) => issues.push(issue),
            },
            Ok(None) => {}
            Err(err) => issues.push(HydrateIssue::Malformed {
                key: StorageKey::Answers,
                reason: err.to_string(),
            }),
        }
    }

    if let Some(raw) = non_empty(fields.result.as_deref()) {
        match serde_json::from_str::<Option<QuizResult>>(raw) {
            Ok(result) => patch.result = result,
            Err(err) => issues.push(HydrateIssue::Malformed {
                key: StorageKey::Result,
                reason: err.to_string(),
            }),
        }
    }

    if let Some(raw) = non_empty(fields.birth_year.as_deref()) {
        match raw.trim().parse::<i32>() {
            Ok(year) if year > 0 && layout.birth_year_index().is_some() => {
                patch.birth_year = Some(year);
            }
            Ok(year) if year > 0 => issues.push(HydrateIssue::BirthYearNotAsked {
                raw: raw.to_string(),
            }),
            _ => issues.push(HydrateIssue::BirthYear {
                raw: raw.to_string(),
            }),
        }
    }

    (patch, issues)
}

fn check_answers(slots: Vec<Option<u8>>, layout: QuizLayout) -> Result<Answers, HydrateIssue> {
    let found = slots.len();
    let bad = slots
        .iter()
        .enumerate()
        .find_map(|(index, slot)| slot.filter(|value| !is_choice(*value)).map(|value| (index, value)));
    if let Some((index, value)) = bad {
        return Err(HydrateIssue::AnswerValue { index, value });
    }
    Answers::from_persisted(slots, layout.question_count()).ok_or(HydrateIssue::AnswerCount {
        expected: layout.question_count(),
        found,
    })
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(answers: Option<&str>, result: Option<&str>, birth_year: Option<&str>) -> PersistedFields {
        PersistedFields {
            answers: answers.map(str::to_string),
            result: result.map(str::to_string),
            birth_year: birth_year.map(str::to_string),
        }
    }

    #[test]
    fn accepts_well_formed_fields() {
        let (patch, issues) = validate(
            &fields(
                Some("[1,null,2,3,4,1,2,3,4,1,2,3]"),
                Some(r#"{"code":4,"image":"/assets/result-4.png"}"#),
                Some("1994"),
            ),
            QuizLayout::extended(),
        );
        assert!(issues.is_empty());
        assert_eq!(patch.answers.unwrap().get(0), Some(1));
        assert_eq!(patch.result.unwrap().code(), Some(4));
        assert_eq!(patch.birth_year, Some(1994));
    }

    #[test]
    fn birth_year_is_dropped_when_the_layout_has_no_such_question() {
        let (patch, issues) = validate(
            &fields(Some("[1,null,2,3,4,1,2,3,4]"), None, Some("1994")),
            QuizLayout::classic(),
        );
        assert!(patch.answers.is_some());
        assert_eq!(patch.birth_year, None);
        assert_eq!(
            issues,
            vec![HydrateIssue::BirthYearNotAsked { raw: "1994".into() }]
        );
    }

    #[test]
    fn answers_outside_the_offered_choices_are_rejected() {
        let (patch, issues) = validate(
            &fields(Some("[1,null,9,3,4,1,2,3,4]"), None, None),
            QuizLayout::classic(),
        );
        assert!(patch.answers.is_none());
        assert_eq!(issues, vec![HydrateIssue::AnswerValue { index: 2, value: 9 }]);

        let (patch, issues) = validate(
            &fields(Some("[0,1,1,1,1,1,1,1,1]"), None, None),
            QuizLayout::classic(),
        );
        assert!(patch.answers.is_none());
        assert_eq!(issues, vec![HydrateIssue::AnswerValue { index: 0, value: 0 }]);
    }

    #[test]
    fn result_without_a_code_key_is_malformed() {
        let (patch, issues) = validate(&fields(None, Some("{}"), None), QuizLayout::classic());
        assert!(patch.result.is_none());
        assert!(matches!(
            issues.as_slice(),
            [HydrateIssue::Malformed {
                key: StorageKey::Result,
                ..
            }]
        ));

        let (patch, issues) = validate(&fields(None, Some(r#"{"code":null}"#), None), QuizLayout::classic());
        assert!(issues.is_empty());
        assert_eq!(patch.result.unwrap().code(), None);
    }

    #[test]
    fn wrong_length_answers_are_reported() {
        let (patch, issues) = validate(&fields(Some("[1,2,3]"), None, None), QuizLayout::classic());
        assert!(patch.answers.is_none());
        assert_eq!(
            issues,
            vec![HydrateIssue::AnswerCount {
                expected: 9,
                found: 3
            }]
        );
    }

    #[test]
    fn non_array_answers_are_malformed() {
        let (patch, issues) = validate(
            &fields(Some(r#"{"0":1}"#), Some("not json"), Some("abc")),
            QuizLayout::extended(),
        );
        assert!(patch.is_empty());
        assert_eq!(issues.len(), 3);
        assert!(matches!(
            issues[0],
            HydrateIssue::Malformed {
                key: StorageKey::Answers,
                ..
            }
        ));
    }

    #[test]
    fn null_and_empty_values_mean_not_set() {
        let (patch, issues) = validate(&fields(Some("null"), Some("null"), Some("")), QuizLayout::extended());
        assert!(patch.is_empty());
        assert!(issues.is_empty());
    }

    #[test]
    fn language_parsing_ignores_unknown_codes() {
        assert_eq!(parse_language(Some("ENG")), Some(Language::Eng));
        assert_eq!(parse_language(Some("fr")), None);
        assert_eq!(parse_language(None), None);
    }
}
