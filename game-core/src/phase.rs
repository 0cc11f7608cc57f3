use game_types::{ClientGameState, GameStatus, SessionPhase};

/// Facts the session phase is derived from.
#[derive(Debug, Clone, Copy)]
pub struct PhaseInputs<'a> {
    pub has_identity: bool,
    pub status: &'a GameStatus,
    pub word_picked: bool,
    pub client_state: Option<&'a ClientGameState>,
}

/// Phase is never stored on its own; it is recomputed from what the server
/// has told us so far. Every input only ever moves one way within a session,
/// which keeps the result monotonic.
pub fn derive_phase(inputs: PhaseInputs<'_>) -> SessionPhase {
    if !inputs.has_identity {
        return SessionPhase::NoSession;
    }
    if inputs.client_state.is_some_and(ClientGameState::is_ended) {
        return SessionPhase::Ended;
    }
    if inputs.word_picked {
        if inputs.status.is_started() {
            SessionPhase::InProgress
        } else {
            SessionPhase::AwaitingGameStart
        }
    } else if inputs.status.is_ready() {
        SessionPhase::AwaitingWordSelection
    } else {
        SessionPhase::AwaitingOpponent
    }
}
