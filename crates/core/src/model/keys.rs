use std::fmt;

/// Keys under which session fields are persisted on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageKey {
    Language,
    Answers,
    Result,
    BirthYear,
}

impl StorageKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::Language => "lang",
            StorageKey::Answers => "answers",
            StorageKey::Result => "result",
            StorageKey::BirthYear => "birthYear",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
