use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub type GameId = String;

/// Readiness flags reported by the info endpoint.
///
/// The server sends a timestamp for each milestone once it has been reached,
/// so a flag is "set" when its timestamp is present. Both flags are monotonic
/// within a game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameStatus {
    #[serde(default)]
    pub utc_ready: Option<String>, // ISO 8601 string, set when the opponent joined
    #[serde(default)]
    pub utc_started: Option<String>, // ISO 8601 string, set when both words are picked
}

impl GameStatus {
    pub fn is_ready(&self) -> bool {
        self.utc_ready.is_some()
    }

    pub fn is_started(&self) -> bool {
        self.utc_started.is_some()
    }

    /// Combine a newer report with this one without ever clearing a flag.
    ///
    /// Responses from different call paths are applied in arrival order, so a
    /// late answer may carry an older view of the game than the one we hold.
    pub fn merged_with(&self, newer: &GameStatus) -> GameStatus {
        GameStatus {
            utc_ready: newer.utc_ready.clone().or_else(|| self.utc_ready.clone()),
            utc_started: newer.utc_started.clone().or_else(|| self.utc_started.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LetterState {
    Correct,   // right letter, right position
    Misplaced, // letter is in the word elsewhere
    Absent,    // letter not in the word
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GuessResult {
    #[serde(rename = "guess_word")]
    pub word: String,
    pub letter_results: Vec<LetterState>,
}

impl GuessResult {
    /// One letter state per letter of the guessed word.
    pub fn is_well_formed(&self) -> bool {
        self.word.chars().count() == self.letter_results.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EndOutcome {
    Won,
    Lost,
    Draw,
}

/// Server-reported outcome marking the game as concluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EndResult {
    pub outcome: EndOutcome,
    #[serde(default)]
    pub opponent_word: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerProgress {
    /// A guess is outstanding and waits for the opponent's move.
    pub pending_guess: bool,
}

/// The requesting player's view of an in-progress game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClientGameState {
    #[serde(default)]
    pub end_state: Option<EndResult>,
    #[serde(default)]
    pub player: PlayerProgress,
    #[serde(default)]
    pub opponent_submitted_guess: bool,
    #[serde(default)]
    pub guesses: Vec<GuessResult>,
}

impl ClientGameState {
    pub fn is_ended(&self) -> bool {
        self.end_state.is_some()
    }

    pub fn has_pending_guess(&self) -> bool {
        self.player.pending_guess
    }

    /// Whether this state can follow `previous` in a single session: the
    /// guess list only grows and a reported end result is never withdrawn.
    pub fn extends(&self, previous: &ClientGameState) -> bool {
        if previous.is_ended() && !self.is_ended() {
            return false;
        }
        self.guesses.starts_with(&previous.guesses)
    }
}
