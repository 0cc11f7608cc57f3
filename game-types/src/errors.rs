use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Failures reported by calls against the remote game server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, thiserror::Error)]
#[ts(export)]
pub enum GameApiError {
    /// The call did not complete. Never retried automatically.
    #[error("Network error: {message}")]
    Network { message: String },
    #[error("Invalid word: {word}")]
    InvalidWord { word: String },
    #[error("Game not found: {game_id}")]
    GameNotFound { game_id: String },
    /// The server answered with something we could not decode.
    #[error("Unexpected response: {message}")]
    Unexpected { message: String },
}

impl GameApiError {
    pub fn network(message: impl Into<String>) -> Self {
        GameApiError::Network {
            message: message.into(),
        }
    }

    pub fn is_invalid_word(&self) -> bool {
        matches!(self, GameApiError::InvalidWord { .. })
    }
}
