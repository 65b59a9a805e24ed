//! User online status

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User online status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// User is online and active
    Online,
    /// User is connected but idle
    Away,
    /// User is offline
    Offline,
}

impl Default for UserStatus {
    fn default() -> Self {
        Self::Offline
    }
}

impl UserStatus {
    /// All statuses, in decay order
    pub const ALL: [Self; 3] = [Self::Online, Self::Away, Self::Offline];

    /// Check if this status should be shown as present to others
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Offline)
    }

    /// Lowercase wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Away => "away",
            Self::Offline => "offline",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing a status from string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid status: {0}")]
pub struct StatusParseError(pub String);

impl FromStr for UserStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "away" => Ok(Self::Away),
            "offline" => Ok(Self::Offline),
            _ => Err(StatusParseError(s.to_string())),
        }
    }
}
