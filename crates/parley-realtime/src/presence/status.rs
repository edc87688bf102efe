//! Presence status definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use parley_core::AppError;

/// Aggregate presence status of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    /// Connected and available.
    Online,
    /// Connected but away from keyboard.
    Idle,
    /// Do not disturb.
    Dnd,
    /// Connected but hidden; others see the user as offline.
    Invisible,
    /// No live connections.
    Offline,
}

impl PresenceStatus {
    /// Converts to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Idle => "idle",
            Self::Dnd => "dnd",
            Self::Invisible => "invisible",
            Self::Offline => "offline",
        }
    }

    /// The status other users are allowed to see.
    pub fn visible(self) -> Self {
        match self {
            Self::Invisible => Self::Offline,
            other => other,
        }
    }
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status the user may select explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplicitStatus {
    /// Available.
    #[default]
    Online,
    /// Away.
    Idle,
    /// Do not disturb.
    Dnd,
    /// Hidden.
    Invisible,
}

impl ExplicitStatus {
    /// The aggregate status for a user with `connections` live connections.
    pub fn aggregate(self, connections: usize) -> PresenceStatus {
        if connections == 0 {
            return PresenceStatus::Offline;
        }
        match self {
            Self::Online => PresenceStatus::Online,
            Self::Idle => PresenceStatus::Idle,
            Self::Dnd => PresenceStatus::Dnd,
            Self::Invisible => PresenceStatus::Invisible,
        }
    }
}

impl FromStr for ExplicitStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(Self::Online),
            "idle" => Ok(Self::Idle),
            "dnd" => Ok(Self::Dnd),
            "invisible" => Ok(Self::Invisible),
            other => Err(AppError::validation(format!(
                "Invalid status '{other}': expected one of online, idle, dnd, invisible"
            ))),
        }
    }
}
