use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Difficulty level of a quiz session.
///
/// Scales template parameter ranges and the points awarded per correct
/// answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Points awarded for a correct answer before any streak bonus.
    #[must_use]
    pub fn base_points(self) -> u32 {
        match self {
            Difficulty::Easy => 15,
            Difficulty::Medium => 20,
            Difficulty::Hard => 30,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown difficulty: {raw}")]
pub struct ParseDifficultyError {
    raw: String,
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseDifficultyError { raw: s.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_points_table() {
        assert_eq!(Difficulty::Easy.base_points(), 15);
        assert_eq!(Difficulty::Medium.base_points(), 20);
        assert_eq!(Difficulty::Hard.base_points(), 30);
    }

    #[test]
    fn parse_roundtrip() {
        for difficulty in Difficulty::ALL {
            let parsed: Difficulty = difficulty.to_string().parse().unwrap();
            assert_eq!(parsed, difficulty);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(" Medium ".parse::<Difficulty>().unwrap(), Difficulty::Medium);
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("brutal".parse::<Difficulty>().is_err());
    }
}
