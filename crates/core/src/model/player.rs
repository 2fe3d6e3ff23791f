use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::UserId;

/// Longest accepted player name, counted in characters.
pub const MAX_PLAYER_NAME_CHARS: usize = 15;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PlayerNameError {
    #[error("player name cannot be empty")]
    Empty,

    #[error("player name is {len} characters, limit is {max}")]
    TooLong { len: usize, max: usize },
}

/// Validated display name shown on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerName(String);

impl PlayerName {
    /// Trim and validate a raw name.
    ///
    /// # Errors
    ///
    /// Returns `PlayerNameError::Empty` for blank input and
    /// `PlayerNameError::TooLong` above `MAX_PLAYER_NAME_CHARS`.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, PlayerNameError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PlayerNameError::Empty);
        }
        let len = trimmed.chars().count();
        if len > MAX_PLAYER_NAME_CHARS {
            return Err(PlayerNameError::TooLong {
                len,
                max: MAX_PLAYER_NAME_CHARS,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PlayerName {
    type Error = PlayerNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<PlayerName> for String {
    fn from(value: PlayerName) -> Self {
        value.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registered account. Usernames follow the same rules as leaderboard names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: PlayerName,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_accepts_fifteen_chars() {
        let name = PlayerName::parse("  abcdefghijklmno  ").unwrap();
        assert_eq!(name.as_str(), "abcdefghijklmno");
    }

    #[test]
    fn rejects_blank_and_long_names() {
        assert_eq!(PlayerName::parse("   "), Err(PlayerNameError::Empty));
        assert_eq!(
            PlayerName::parse("abcdefghijklmnop"),
            Err(PlayerNameError::TooLong { len: 16, max: 15 })
        );
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert!(PlayerName::parse("ÅÄÖÅÄÖÅÄÖÅÄÖÅÄÖ").is_ok());
    }

    #[test]
    fn deserialization_validates() {
        let err = serde_json::from_str::<PlayerName>("\"\"");
        assert!(err.is_err());
        let ok: PlayerName = serde_json::from_str("\"Ada\"").unwrap();
        assert_eq!(ok.as_str(), "Ada");
    }
}
