use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::GameId;

/// Credentials handed out by the server when a player joins a game.
///
/// `secret_id` authenticates every later call made on behalf of this player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerInfo {
    pub name: String,
    pub secret_id: String,
}

/// Who we are within one game. Created once on a successful join and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionIdentity {
    pub game_id: GameId,
    pub player: PlayerInfo,
    pub is_player_one: bool,
}

impl SessionIdentity {
    pub fn new(game_id: GameId, player: PlayerInfo, is_player_one: bool) -> Self {
        Self {
            game_id,
            player,
            is_player_one,
        }
    }

    pub fn secret_id(&self) -> &str {
        &self.player.secret_id
    }
}
