use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{GameId, GameStatus};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateGameResponse {
    pub game_id: GameId,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct JoinGameRequest {
    pub name: String,
}

/// Body shared by the pick-word and guess-word calls.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WordRequest {
    pub word: String,
    pub secret_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusResponse {
    pub status: GameStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateQuery {
    pub secret_id: String,
}
