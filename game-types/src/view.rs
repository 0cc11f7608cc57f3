use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{EndResult, GuessResult};

/// Stage of the session lifecycle. Variants are declared in lifecycle order,
/// so `Ord` follows the only direction a session may move in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum SessionPhase {
    NoSession,
    AwaitingOpponent,
    AwaitingWordSelection,
    AwaitingGameStart,
    InProgress,
    Ended,
}

/// The two timer-driven loops a session can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PollLoop {
    /// Polls the game info for `ready` / `started`.
    Info,
    /// Polls the player's game state while a game is in progress.
    State,
}

impl std::fmt::Display for PollLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollLoop::Info => write!(f, "info"),
            PollLoop::State => write!(f, "state"),
        }
    }
}

/// Main panel a front end should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Panel {
    CreateOrJoin,
    Waiting,
    PickWord,
    Board,
    EndGame,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BoardView {
    pub player_name: String,
    pub is_player_one: bool,
    pub guesses: Vec<GuessResult>,
    pub opponent_submitted_guess: bool,
    pub can_guess: bool,
}

/// Render-ready snapshot of a session. Recomputed after every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ViewModel {
    pub phase: SessionPhase,
    pub panel: Panel,
    pub waiting_message: Option<String>,
    pub invalid_word: bool,
    /// Set when a loop gave up after exhausting its iteration budget.
    pub timed_out: Option<PollLoop>,
    pub board: Option<BoardView>,
    pub end_state: Option<EndResult>,
}

impl Default for ViewModel {
    fn default() -> Self {
        Self {
            phase: SessionPhase::NoSession,
            panel: Panel::CreateOrJoin,
            waiting_message: None,
            invalid_word: false,
            timed_out: None,
            board: None,
            end_state: None,
        }
    }
}
