#![allow(dead_code)]

use game_core::{
    LoopCommand, PollIssue, PollStamp, SessionEvent, SessionEventHandler, SessionStateMachine,
    SessionUpdate, Transition,
};
use game_types::{
    ClientGameState, EndOutcome, EndResult, GameStatus, GuessResult, LetterState, PlayerInfo,
    PollLoop, SessionIdentity,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

pub const GAME_ID: &str = "ABCD";

/// Creates the identity handed out when "Alice" creates and joins a game
pub fn create_test_identity() -> SessionIdentity {
    SessionIdentity::new(
        GAME_ID.to_string(),
        PlayerInfo {
            name: "Alice".to_string(),
            secret_id: "alice-secret".to_string(),
        },
        true,
    )
}

pub fn status(ready: bool, started: bool) -> GameStatus {
    GameStatus {
        utc_ready: ready.then(|| "2024-01-01T12:00:00Z".to_string()),
        utc_started: started.then(|| "2024-01-01T12:01:00Z".to_string()),
    }
}

pub fn guess(word: &str) -> GuessResult {
    GuessResult {
        word: word.to_string(),
        letter_results: word
            .chars()
            .enumerate()
            .map(|(idx, _)| match idx % 3 {
                0 => LetterState::Correct,
                1 => LetterState::Misplaced,
                _ => LetterState::Absent,
            })
            .collect(),
    }
}

pub fn client_state(words: &[&str], pending_guess: bool) -> ClientGameState {
    let mut state = ClientGameState {
        guesses: words.iter().map(|word| guess(word)).collect(),
        ..Default::default()
    };
    state.player.pending_guess = pending_guess;
    state
}

pub fn ended_state(words: &[&str], outcome: EndOutcome) -> ClientGameState {
    ClientGameState {
        end_state: Some(EndResult {
            outcome,
            opponent_word: Some("CRANE".to_string()),
        }),
        ..client_state(words, false)
    }
}

pub fn issue(machine: &mut SessionStateMachine, poll_loop: PollLoop) -> PollStamp {
    match machine.issue_poll(poll_loop) {
        PollIssue::Issued(ticket) => ticket.stamp,
        other => panic!("Expected an issued {} poll, got {:?}", poll_loop, other),
    }
}

/// Machine that has joined and seen the opponent arrive.
pub fn machine_awaiting_word() -> SessionStateMachine {
    let mut machine = SessionStateMachine::new();
    machine.apply(SessionUpdate::Joined {
        identity: create_test_identity(),
    });
    let stamp = issue(&mut machine, PollLoop::Info);
    machine.apply(SessionUpdate::InfoPolled {
        stamp,
        status: status(true, false),
    });
    machine
}

/// Machine with both words picked and the state loop running.
pub fn machine_in_progress() -> SessionStateMachine {
    let mut machine = machine_awaiting_word();
    machine.apply(SessionUpdate::WordPicked {
        status: status(true, true),
    });
    machine
}

/// Event collector for testing event emissions
#[derive(Clone)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn get_events(&self) -> Vec<SessionEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn has_event_type(&self, check_fn: impl Fn(&SessionEvent) -> bool) -> bool {
        self.events.lock().unwrap().iter().any(check_fn)
    }
}

impl SessionEventHandler for EventCollector {
    fn handle_event(&mut self, event: SessionEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Stands in for the timer owner: applies loop commands and checks that a
/// loop is only ever started while nothing else runs.
#[derive(Debug, Default)]
pub struct LoopTracker {
    pub active: HashSet<PollLoop>,
    pub starts: Vec<PollLoop>,
}

impl LoopTracker {
    pub fn run(&mut self, transition: &Transition) {
        for command in &transition.commands {
            match command {
                LoopCommand::Start(poll_loop) => {
                    assert!(
                        self.active.is_empty(),
                        "started {} while {:?} still active",
                        poll_loop,
                        self.active
                    );
                    self.active.insert(*poll_loop);
                    self.starts.push(*poll_loop);
                }
                LoopCommand::Stop(poll_loop) => {
                    assert!(self.active.remove(poll_loop), "stopped idle {} loop", poll_loop);
                }
            }
        }
        assert!(self.active.len() <= 1);
    }
}
