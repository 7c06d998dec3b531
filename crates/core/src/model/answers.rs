use serde::{Deserialize, Serialize};

/// Choice code sent for a question the user skipped.
pub const UNANSWERED_SENTINEL: u8 = 0;

/// Number of options offered by every choice question. Choices are 1-based.
pub const CHOICE_COUNT: u8 = 4;

/// Whether `value` names one of the offered options.
#[must_use]
pub fn is_choice(value: u8) -> bool {
    (1..=CHOICE_COUNT).contains(&value)
}

/// Fixed-length answer sheet. `None` marks an unanswered slot.
///
/// The length is decided at construction and never changes afterwards; writes
/// outside the sheet are refused rather than growing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers(Vec<Option<u8>>);

impl Answers {
    #[must_use]
    pub fn unanswered(len: usize) -> Self {
        Self(vec![None; len])
    }

    /// Accept a persisted sheet only if it has exactly `expected_len` slots.
    #[must_use]
    pub fn from_persisted(slots: Vec<Option<u8>>, expected_len: usize) -> Option<Self> {
        (slots.len() == expected_len).then_some(Self(slots))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<u8> {
        self.0.get(index).copied().flatten()
    }

    /// Replace a single slot. Returns `false` when `index` is outside the sheet
    /// or `value` is not an offered option.
    pub fn set(&mut self, index: usize, value: Option<u8>) -> bool {
        if value.is_some_and(|choice| !is_choice(choice)) {
            return false;
        }
        match self.0.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn slots(&self) -> &[Option<u8>] {
        &self.0
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.0.iter().filter(|slot| slot.is_some()).count()
    }

    /// Wire form for the scoring backend, which does not accept nulls.
    #[must_use]
    pub fn to_wire(&self) -> Vec<u8> {
        self.0
            .iter()
            .map(|slot| slot.unwrap_or(UNANSWERED_SENTINEL))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_outside_sheet_is_refused() {
        let mut answers = Answers::unanswered(3);
        assert!(!answers.set(3, Some(2)));
        assert_eq!(answers.len(), 3);
    }

    #[test]
    fn set_refuses_choices_that_are_not_offered() {
        let mut answers = Answers::unanswered(3);
        assert!(!answers.set(0, Some(0)));
        assert!(!answers.set(0, Some(5)));
        assert!(answers.set(0, Some(4)));
        assert!(answers.set(0, None));
        assert_eq!(answers.answered_count(), 0);
    }

    #[test]
    fn wire_form_uses_sentinel() {
        let mut answers = Answers::unanswered(3);
        answers.set(0, Some(4));
        answers.set(2, Some(1));
        assert_eq!(answers.to_wire(), vec![4, 0, 1]);
        assert_eq!(answers.answered_count(), 2);
    }

    #[test]
    fn persisted_sheet_must_match_length() {
        assert!(Answers::from_persisted(vec![Some(1), None], 3).is_none());
        let sheet = Answers::from_persisted(vec![Some(1), None, Some(2)], 3).unwrap();
        assert_eq!(sheet.get(2), Some(2));
    }
}
