use crate::hydrate::SessionPatch;
use crate::model::{Answers, Language, QuizResult, QuizSession, StorageKey};

/// Closed set of transitions a session accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetLanguage(Language),
    SetBirthYear(Option<i32>),
    SetAnswer { index: usize, value: u8 },
    Next,
    Prev,
    SetResult(QuizResult),
    Reset,
    Hydrate(SessionPatch),
}

/// A durable write implied by a transition, applied in order by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOp {
    Set { key: StorageKey, value: String },
    Remove { key: StorageKey },
}

impl PersistOp {
    #[must_use]
    pub fn key(&self) -> StorageKey {
        match self {
            PersistOp::Set { key, .. } | PersistOp::Remove { key } => *key,
        }
    }
}

/// Apply `action` to `session` and return the writes that keep storage in sync.
///
/// Every action is total: out-of-range answers, boundary moves and birth years
/// on a layout that never asks for one are no-ops and produce no writes.
pub fn reduce(session: &mut QuizSession, action: Action) -> Vec<PersistOp> {
    match action {
        Action::SetLanguage(language) => {
            session.language = language;
            vec![PersistOp::Set {
                key: StorageKey::Language,
                value: language.code().to_string(),
            }]
        }
        Action::SetBirthYear(year) => {
            if session.layout().birth_year_index().is_none() {
                return Vec::new();
            }
            session.birth_year = year;
            // Empty string records "cleared", as opposed to a missing key.
            let value = year.map(|y| y.to_string()).unwrap_or_default();
            vec![PersistOp::Set {
                key: StorageKey::BirthYear,
                value,
            }]
        }
        Action::SetAnswer { index, value } => {
            if !session.answers.set(index, Some(value)) {
                return Vec::new();
            }
            persist_answers(&session.answers).into_iter().collect()
        }
        Action::Next => {
            let last = session.layout().last_index();
            session.current_index = (session.current_index + 1).min(last);
            Vec::new()
        }
        Action::Prev => {
            session.current_index = session.current_index.saturating_sub(1);
            Vec::new()
        }
        Action::SetResult(result) => {
            let op = serde_json::to_string(&result)
                .ok()
                .map(|value| PersistOp::Set {
                    key: StorageKey::Result,
                    value,
                });
            session.result = Some(result);
            op.into_iter().collect()
        }
        Action::Reset => {
            let layout = session.layout();
            session.current_index = 0;
            session.answers = Answers::unanswered(layout.question_count());
            session.birth_year = None;
            session.result = None;

            let mut ops: Vec<PersistOp> = persist_answers(&session.answers).into_iter().collect();
            ops.push(PersistOp::Remove {
                key: StorageKey::Result,
            });
            ops.push(PersistOp::Remove {
                key: StorageKey::BirthYear,
            });
            ops
        }
        Action::Hydrate(patch) => {
            apply_patch(session, patch);
            Vec::new()
        }
    }
}

fn persist_answers(answers: &Answers) -> Option<PersistOp> {
    serde_json::to_string(answers)
        .ok()
        .map(|value| PersistOp::Set {
            key: StorageKey::Answers,
            value,
        })
}

fn apply_patch(session: &mut QuizSession, patch: SessionPatch) {
    if let Some(answers) = patch.answers {
        if answers.len() == session.layout().question_count() {
            session.answers = answers;
        }
    }
    if let Some(year) = patch.birth_year
        && session.layout().birth_year_index().is_some()
    {
        session.birth_year = Some(year);
    }
    if let Some(result) = patch.result {
        session.result = Some(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuizLayout;

    fn session() -> QuizSession {
        QuizSession::new(QuizLayout::classic(), Language::Kor)
    }

    fn extended_session() -> QuizSession {
        QuizSession::new(QuizLayout::extended(), Language::Kor)
    }

    #[test]
    fn set_answer_touches_only_its_slot() {
        let mut s = session();
        reduce(&mut s, Action::SetAnswer { index: 0, value: 2 });
        let before = s.clone();

        let ops = reduce(&mut s, Action::SetAnswer { index: 4, value: 3 });

        for i in 0..s.answers().len() {
            if i == 4 {
                assert_eq!(s.answers().get(i), Some(3));
            } else {
                assert_eq!(s.answers().get(i), before.answers().get(i));
            }
        }
        assert_eq!(s.language(), before.language());
        assert_eq!(s.current_index(), before.current_index());
        assert_eq!(
            ops,
            vec![PersistOp::Set {
                key: StorageKey::Answers,
                value: "[2,null,null,null,3,null,null,null,null]".into(),
            }]
        );
    }

    #[test]
    fn set_answer_out_of_range_is_a_noop() {
        let mut s = session();
        let before = s.clone();
        let ops = reduce(&mut s, Action::SetAnswer { index: 9, value: 1 });
        assert!(ops.is_empty());
        assert_eq!(s, before);
    }

    #[test]
    fn navigation_clamps_at_both_ends() {
        let mut s = session();
        reduce(&mut s, Action::Prev);
        assert_eq!(s.current_index(), 0);

        for _ in 0..20 {
            reduce(&mut s, Action::Next);
        }
        assert_eq!(s.current_index(), 8);
        reduce(&mut s, Action::Next);
        assert_eq!(s.current_index(), 8);
    }

    #[test]
    fn reset_keeps_language() {
        for language in [Language::Kor, Language::Eng] {
            let mut s = extended_session();
            reduce(&mut s, Action::SetLanguage(language));
            reduce(&mut s, Action::SetAnswer { index: 1, value: 4 });
            reduce(&mut s, Action::SetBirthYear(Some(1990)));
            reduce(&mut s, Action::SetResult(QuizResult::new(2)));
            reduce(&mut s, Action::Next);

            let ops = reduce(&mut s, Action::Reset);

            assert_eq!(s.language(), language);
            assert_eq!(s.current_index(), 0);
            assert_eq!(s.answers().answered_count(), 0);
            assert_eq!(s.birth_year(), None);
            assert!(s.result().is_none());
            let keys: Vec<StorageKey> = ops.iter().map(PersistOp::key).collect();
            assert_eq!(
                keys,
                vec![StorageKey::Answers, StorageKey::Result, StorageKey::BirthYear]
            );
            assert!(!keys.contains(&StorageKey::Language));
        }
    }

    #[test]
    fn cleared_birth_year_persists_empty_string() {
        let mut s = extended_session();
        reduce(&mut s, Action::SetBirthYear(Some(2001)));
        let ops = reduce(&mut s, Action::SetBirthYear(None));
        assert_eq!(s.birth_year(), None);
        assert_eq!(
            ops,
            vec![PersistOp::Set {
                key: StorageKey::BirthYear,
                value: String::new(),
            }]
        );
    }

    #[test]
    fn birth_year_is_ignored_without_a_birth_year_question() {
        let mut s = session();
        let before = s.clone();
        assert!(reduce(&mut s, Action::SetBirthYear(Some(1990))).is_empty());
        assert!(reduce(&mut s, Action::SetBirthYear(None)).is_empty());
        assert_eq!(s, before);

        let patch = SessionPatch {
            birth_year: Some(1985),
            ..SessionPatch::default()
        };
        reduce(&mut s, Action::Hydrate(patch));
        assert_eq!(s.birth_year(), None);
    }

    #[test]
    fn set_answer_with_unoffered_choice_is_a_noop() {
        let mut s = session();
        let before = s.clone();
        assert!(reduce(&mut s, Action::SetAnswer { index: 0, value: 7 }).is_empty());
        assert_eq!(s, before);
    }

    #[test]
    fn hydrate_rejects_wrong_length_answers() {
        let mut s = session();
        reduce(&mut s, Action::SetAnswer { index: 0, value: 1 });
        let before = s.answers().clone();

        let patch = SessionPatch {
            answers: Some(Answers::unanswered(12)),
            ..SessionPatch::default()
        };
        let ops = reduce(&mut s, Action::Hydrate(patch));

        assert!(ops.is_empty());
        assert_eq!(s.answers(), &before);
    }

    #[test]
    fn hydrate_merges_only_present_fields() {
        let mut s = extended_session();
        reduce(&mut s, Action::SetLanguage(Language::Eng));
        let patch = SessionPatch {
            birth_year: Some(1985),
            ..SessionPatch::default()
        };
        reduce(&mut s, Action::Hydrate(patch));
        assert_eq!(s.birth_year(), Some(1985));
        assert_eq!(s.language(), Language::Eng);
        assert_eq!(s.answers().answered_count(), 0);
    }
}
