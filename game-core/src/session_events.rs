use game_types::{PollLoop, SessionPhase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    PhaseChanged {
        from: SessionPhase,
        to: SessionPhase,
    },
    LoopStarted {
        poll_loop: PollLoop,
    },
    LoopStopped {
        poll_loop: PollLoop,
    },
    StaleResponseDiscarded {
        poll_loop: PollLoop,
        stamp: u64,
        current: u64,
    },
    /// A game state that would shrink the known guesses or drop the end result.
    StaleStateDiscarded {
        known_guesses: usize,
        received_guesses: usize,
    },
    WordRejected {
        word: String,
    },
    PollTimedOut {
        poll_loop: PollLoop,
        iterations: u32,
    },
}

impl SessionEvent {
    pub fn poll_loop(&self) -> Option<PollLoop> {
        match self {
            SessionEvent::LoopStarted { poll_loop }
            | SessionEvent::LoopStopped { poll_loop }
            | SessionEvent::StaleResponseDiscarded { poll_loop, .. }
            | SessionEvent::PollTimedOut { poll_loop, .. } => Some(*poll_loop),
            SessionEvent::PhaseChanged { .. }
            | SessionEvent::StaleStateDiscarded { .. }
            | SessionEvent::WordRejected { .. } => None,
        }
    }
}

/// Observer of one session. Called synchronously from inside
/// `SessionStateMachine::apply`, before the caller sees the transition's
/// loop commands, so handlers must not block.
pub trait SessionEventHandler: Send {
    fn handle_event(&mut self, event: SessionEvent);

    /// Poll loop this handler follows. `None` receives every event; `Some`
    /// receives that loop's events plus the ones tied to no loop.
    fn poll_loop_filter(&self) -> Option<PollLoop> {
        None
    }
}

/// Delivers session events to handlers in the order the machine produced them.
pub struct SessionEventBus {
    handlers: Vec<Box<dyn SessionEventHandler>>,
}

impl SessionEventBus {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Box<dyn SessionEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn publish(&mut self, event: SessionEvent) {
        let event_loop = event.poll_loop();
        for handler in &mut self.handlers {
            let follows = match (handler.poll_loop_filter(), event_loop) {
                (Some(wanted), Some(actual)) => wanted == actual,
                _ => true,
            };
            if follows {
                handler.handle_event(event.clone());
            }
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for SessionEventBus {
    fn default() -> Self {
        Self::new()
    }
}
