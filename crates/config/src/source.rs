use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Product area a ticket belongs to. Each source maps to one Jira instance
/// and project in [`crate::Settings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    A,
    B,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::A, Source::B];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::A => "a",
            Source::B => "b",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized source '{0}' (expected one of: a, b)")]
pub struct UnknownSource(pub String);

impl FromStr for Source {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(Source::A),
            "b" => Ok(Source::B),
            _ => Err(UnknownSource(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("a".parse::<Source>().unwrap(), Source::A);
        assert_eq!(" B ".parse::<Source>().unwrap(), Source::B);
    }

    #[test]
    fn test_unknown_source_is_rejected() {
        let err = "c".parse::<Source>().unwrap_err();
        assert_eq!(err, UnknownSource("c".to_string()));
        assert!(err.to_string().contains("'c'"));
    }

    #[test]
    fn test_display_round_trips() {
        for source in Source::ALL {
            assert_eq!(source.to_string().parse::<Source>().unwrap(), source);
        }
    }
}
