use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LanguageError {
    #[error("unknown language code: {0}")]
    Unknown(String),
}

/// The two locales the quiz ships with.
///
/// Codes are the upper-case identifiers used both in persisted state and in
/// share links (`?lang=ENG`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "KOR")]
    Kor,
    #[serde(rename = "ENG")]
    Eng,
}

impl Language {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Language::Kor => "KOR",
            Language::Eng => "ENG",
        }
    }

    /// Suffix appended to localized asset names (`result-3_eng.png`).
    #[must_use]
    pub fn asset_suffix(self) -> &'static str {
        match self {
            Language::Kor => "",
            Language::Eng => "_eng",
        }
    }
}

impl FromStr for Language {
    type Err = LanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "KOR" => Ok(Language::Kor),
            "ENG" => Ok(Language::Eng),
            other => Err(LanguageError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_codes() {
        assert_eq!("ENG".parse::<Language>().unwrap(), Language::Eng);
        assert_eq!(" KOR ".parse::<Language>().unwrap(), Language::Kor);
    }

    #[test]
    fn rejects_lowercase_codes() {
        assert!(matches!(
            "eng".parse::<Language>(),
            Err(LanguageError::Unknown(code)) if code == "eng"
        ));
    }
}
