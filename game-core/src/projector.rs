use game_types::{
    BoardView, ClientGameState, Panel, PollLoop, SessionIdentity, SessionPhase, ViewModel,
};

pub const WAITING_FOR_WORD_MESSAGE: &str = "...opponent is choosing a very secret word.";
pub const WAITING_FOR_GUESS_MESSAGE: &str = "Waiting for opponent guess...";

/// Everything a view is computed from. Borrowed straight out of the state
/// machine so projecting never copies session data it does not render.
#[derive(Debug, Clone, Copy)]
pub struct ViewInputs<'a> {
    pub phase: SessionPhase,
    pub identity: Option<&'a SessionIdentity>,
    pub client_state: Option<&'a ClientGameState>,
    pub invalid_word: bool,
    pub timed_out: Option<PollLoop>,
}

pub fn waiting_for_opponent_message(game_id: &str) -> String {
    format!("Game Code: {}", game_id)
}

/// Derive the render-ready snapshot. Pure: no I/O, safe to call after every
/// update.
pub fn project(inputs: ViewInputs<'_>) -> ViewModel {
    let pending_guess = inputs
        .client_state
        .is_some_and(ClientGameState::has_pending_guess);

    let (panel, waiting_message) = match inputs.phase {
        SessionPhase::NoSession => (Panel::CreateOrJoin, None),
        SessionPhase::AwaitingOpponent => (
            Panel::Waiting,
            inputs
                .identity
                .map(|identity| waiting_for_opponent_message(&identity.game_id)),
        ),
        SessionPhase::AwaitingWordSelection => (Panel::PickWord, None),
        SessionPhase::AwaitingGameStart => {
            (Panel::Waiting, Some(WAITING_FOR_WORD_MESSAGE.to_string()))
        }
        SessionPhase::InProgress => (
            Panel::Board,
            pending_guess.then(|| WAITING_FOR_GUESS_MESSAGE.to_string()),
        ),
        SessionPhase::Ended => (Panel::EndGame, None),
    };

    let board = if inputs.phase >= SessionPhase::InProgress {
        inputs.identity.map(|identity| {
            let state = inputs.client_state;
            BoardView {
                player_name: identity.player.name.clone(),
                is_player_one: identity.is_player_one,
                guesses: state.map(|s| s.guesses.clone()).unwrap_or_default(),
                opponent_submitted_guess: state.is_some_and(|s| s.opponent_submitted_guess),
                can_guess: inputs.phase == SessionPhase::InProgress && !pending_guess,
            }
        })
    } else {
        None
    };

    ViewModel {
        phase: inputs.phase,
        panel,
        waiting_message,
        invalid_word: inputs.invalid_word,
        timed_out: inputs.timed_out,
        board,
        end_state: inputs.client_state.and_then(|s| s.end_state.clone()),
    }
}
