use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Languages the catalog is organised by.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
    Kannada,
    Bhojpuri,
    Malayalam,
    Telugu,
    Punjabi,
    Tamil,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown language: {0}")]
pub struct UnknownLanguage(pub String);

impl Language {
    pub const ALL: [Language; 8] = [
        Language::English,
        Language::Hindi,
        Language::Kannada,
        Language::Bhojpuri,
        Language::Malayalam,
        Language::Telugu,
        Language::Punjabi,
        Language::Tamil,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Hindi => "hindi",
            Language::Kannada => "kannada",
            Language::Bhojpuri => "bhojpuri",
            Language::Malayalam => "malayalam",
            Language::Telugu => "telugu",
            Language::Punjabi => "punjabi",
            Language::Tamil => "tamil",
        }
    }

    /// Capitalized name used in titles.
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Kannada => "Kannada",
            Language::Bhojpuri => "Bhojpuri",
            Language::Malayalam => "Malayalam",
            Language::Telugu => "Telugu",
            Language::Punjabi => "Punjabi",
            Language::Tamil => "Tamil",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Language::ALL
            .iter()
            .copied()
            .find(|l| l.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_languages() {
        for lang in Language::ALL {
            assert_eq!(lang.as_str().parse::<Language>().unwrap(), lang);
        }
        assert_eq!("Tamil".parse::<Language>().unwrap(), Language::Tamil);
    }

    #[test]
    fn test_unknown_language() {
        let err = "klingon".parse::<Language>().unwrap_err();
        assert_eq!(err.to_string(), "unknown language: klingon");
    }
}
