use chrono::{DateTime, Datelike, Utc};

/// How many years back the birth-year picker reaches.
pub const BIRTH_YEAR_SPAN: i32 = 80;

/// Where "now" comes from. Only the birth-year question reads it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    Pinned(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    #[must_use]
    pub fn pinned(at: DateTime<Utc>) -> Self {
        Self::Pinned(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Pinned(at) => *at,
        }
    }

    #[must_use]
    pub fn current_year(&self) -> i32 {
        self.now().year()
    }

    /// Years offered by the birth-year question, newest first.
    #[must_use]
    pub fn birth_year_options(&self) -> Vec<i32> {
        let now = self.current_year();
        (now - BIRTH_YEAR_SPAN..=now).rev().collect()
    }

    /// Whether `year` is one the picker would have offered.
    #[must_use]
    pub fn is_plausible_birth_year(&self, year: i32) -> bool {
        let now = self.current_year();
        (now - BIRTH_YEAR_SPAN..=now).contains(&year)
    }
}

/// Clock pinned to 2023-11-14T22:13:20Z, for tests.
#[must_use]
pub fn fixed_clock() -> Clock {
    DateTime::from_timestamp(1_700_000_000, 0).map_or(Clock::System, Clock::Pinned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn birth_years_run_newest_first() {
        let years = fixed_clock().birth_year_options();
        assert_eq!(years.first(), Some(&2023));
        assert_eq!(years.last(), Some(&1943));
        assert_eq!(years.len(), 81);
    }

    #[test]
    fn plausibility_matches_options() {
        let clock = fixed_clock();
        assert!(clock.is_plausible_birth_year(1990));
        assert!(!clock.is_plausible_birth_year(2024));
        assert!(!clock.is_plausible_birth_year(1900));
    }
}
