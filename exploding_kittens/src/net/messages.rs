//! HTTP message bodies exchanged with the score service.
//!
//! | Endpoint | Request | Response |
//! |---|---|---|
//! | `GET /leaderboard` | – | `[LeaderboardEntry]` |
//! | `POST /getScore` | [`UsernameRequest`] | [`ScoreResponse`] |
//! | `POST /updateScore` | [`ScoreUpdate`] | [`ScoreResponse`] |
//! | `POST /register` | [`UsernameRequest`] | [`RegisterResponse`] |
//! | `POST /login` | [`UsernameRequest`] | free-form JSON |
//! | `POST /updateLeaderboard` | [`LeaderboardUpdate`] | free-form JSON |

use serde::{Deserialize, Serialize};

/// Body carrying only a username.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct UsernameRequest {
    pub username: String,
}

impl UsernameRequest {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// New score for a user.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ScoreUpdate {
    pub username: String,
    pub score: u32,
}

impl ScoreUpdate {
    /// Build the body for a single win on top of `last_known_score`.
    ///
    /// The increment is computed here, from whatever score this client last
    /// saw, not by the server. Two clients for the same user can race.
    #[must_use]
    pub fn increment(username: impl Into<String>, last_known_score: u32) -> Self {
        Self {
            username: username.into(),
            score: last_known_score.saturating_add(1),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ScoreResponse {
    pub score: u32,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: Option<String>,
}

impl RegisterResponse {
    /// Server message, or a generic confirmation when it sent none.
    pub fn message_or_default(&self) -> &str {
        self.message.as_deref().unwrap_or("Registration successful!")
    }
}

/// Points to add to a user's leaderboard entry.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LeaderboardUpdate {
    pub username: String,
    pub points: u32,
}
