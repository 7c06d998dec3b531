use std::env;
use std::time::Duration;

use quiz_core::model::{Language, QuizLayout};
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";
pub const DEFAULT_SHARE_ORIGIN: &str = "https://acne-eraser.vercel.app";
pub const DEFAULT_SHARE_TITLE: &str = "Spot Eraser";
pub const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Where and how to reach the scoring backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoringConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ScoringConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn result_endpoint(&self) -> String {
        format!("{}/api/result", self.base_url.trim_end_matches('/'))
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

/// Origin and title used to build canonical share links.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareConfig {
    pub origin: Url,
    pub title: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            origin: Url::parse(DEFAULT_SHARE_ORIGIN).expect("default share origin is a valid URL"),
            title: DEFAULT_SHARE_TITLE.to_string(),
        }
    }
}

/// Everything the quiz needs at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizConfig {
    pub scoring: ScoringConfig,
    pub share: ShareConfig,
    pub db_url: String,
    pub layout: QuizLayout,
    pub default_language: Language,
    /// When set, the quiz switches to this language on entry and ignores toggles.
    pub forced_language: Option<Language>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            share: ShareConfig::default(),
            db_url: DEFAULT_DB_URL.to_string(),
            layout: QuizLayout::default(),
            default_language: Language::default(),
            forced_language: None,
        }
    }
}

impl QuizConfig {
    /// Read configuration from `QUIZ_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is present but unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`QuizConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a value is present but unparsable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(base) = get("QUIZ_API_BASE") {
            Url::parse(&base).map_err(|_| ConfigError::InvalidUrl {
                var: "QUIZ_API_BASE",
                raw: base.clone(),
            })?;
            config.scoring.base_url = base;
        }
        if let Some(raw) = get("QUIZ_API_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidTimeout {
                var: "QUIZ_API_TIMEOUT_SECS",
                raw: raw.clone(),
            })?;
            config.scoring.timeout = Duration::from_secs(secs);
        }
        if let Some(origin) = get("QUIZ_SHARE_ORIGIN") {
            config.share.origin = Url::parse(&origin).map_err(|_| ConfigError::InvalidUrl {
                var: "QUIZ_SHARE_ORIGIN",
                raw: origin.clone(),
            })?;
        }
        if let Some(title) = get("QUIZ_SHARE_TITLE") {
            config.share.title = title;
        }
        if let Some(db_url) = get("QUIZ_DB_URL") {
            config.db_url = db_url;
        }
        if let Some(layout) = get("QUIZ_LAYOUT") {
            config.layout = layout.parse()?;
        }
        if let Some(language) = get("QUIZ_DEFAULT_LANG") {
            config.default_language = language.parse()?;
        }
        if let Some(language) = get("QUIZ_FORCE_LANG") {
            config.forced_language = Some(language.parse()?);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = QuizConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, QuizConfig::default());
        assert_eq!(
            config.scoring.result_endpoint(),
            "http://127.0.0.1:8000/api/result"
        );
    }

    #[test]
    fn reads_overrides() {
        let config = QuizConfig::from_lookup(lookup(&[
            ("QUIZ_API_BASE", "https://api.example.com/"),
            ("QUIZ_API_TIMEOUT_SECS", "3"),
            ("QUIZ_LAYOUT", "classic"),
            ("QUIZ_FORCE_LANG", "ENG"),
            ("QUIZ_SHARE_TITLE", "Quiz"),
        ]))
        .unwrap();
        assert_eq!(
            config.scoring.result_endpoint(),
            "https://api.example.com/api/result"
        );
        assert_eq!(config.scoring.timeout, Duration::from_secs(3));
        assert_eq!(config.layout, QuizLayout::classic());
        assert_eq!(config.forced_language, Some(Language::Eng));
        assert_eq!(config.share.title, "Quiz");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            QuizConfig::from_lookup(lookup(&[("QUIZ_API_BASE", "not a url")])),
            Err(ConfigError::InvalidUrl { var: "QUIZ_API_BASE", .. })
        ));
        assert!(matches!(
            QuizConfig::from_lookup(lookup(&[("QUIZ_LAYOUT", "huge")])),
            Err(ConfigError::Layout(_))
        ));
        assert!(matches!(
            QuizConfig::from_lookup(lookup(&[("QUIZ_FORCE_LANG", "fr")])),
            Err(ConfigError::Language(_))
        ));
    }
}
