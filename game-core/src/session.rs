use game_types::{
    ClientGameState, GameStatus, PollLoop, SessionIdentity, SessionPhase, ViewModel,
};
use tracing::{debug, info, warn};

use crate::{
    PhaseInputs, PollGuard, PollStamp, SessionEvent, SessionEventBus, SessionEventHandler,
    ViewInputs, derive_phase, project,
};

pub const DEFAULT_MAX_POLL_ITERATIONS: u32 = 10_000;

/// A proposed change to the session, produced by a user call or a poll
/// response. `SessionStateMachine::apply` is the only way session data
/// changes.
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    Joined { identity: SessionIdentity },
    WordPicked { status: GameStatus },
    WordRejected { word: String },
    GuessAccepted { state: ClientGameState },
    GuessRejected { word: String },
    InfoPolled { stamp: PollStamp, status: GameStatus },
    StatePolled { stamp: PollStamp, state: ClientGameState },
}

/// Instruction for whoever owns the timers. Stops always precede starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopCommand {
    Start(PollLoop),
    Stop(PollLoop),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// False when the update was discarded as stale or out of place.
    pub applied: bool,
    pub from: SessionPhase,
    pub to: SessionPhase,
    pub commands: Vec<LoopCommand>,
}

impl Transition {
    pub fn phase_changed(&self) -> bool {
        self.from != self.to
    }
}

/// Everything needed to send one poll request.
#[derive(Debug, Clone)]
pub struct PollTicket {
    pub poll_loop: PollLoop,
    pub stamp: PollStamp,
    pub identity: SessionIdentity,
}

#[derive(Debug, Clone)]
pub enum PollIssue {
    Issued(PollTicket),
    /// The loop is not running (a tick raced its cancellation).
    Inactive,
    /// The iteration budget ran out; the loop has been stopped.
    Exhausted(Transition),
}

#[derive(Debug, Clone, Copy)]
struct ActiveLoop {
    poll_loop: PollLoop,
    iterations: u32,
}

/// Owns one game session: identity, last known status and game state, and
/// which poll loop should be running.
pub struct SessionStateMachine {
    identity: Option<SessionIdentity>,
    status: GameStatus,
    client_state: Option<ClientGameState>,
    word_picked: bool,
    invalid_word: bool,
    timed_out: Option<PollLoop>,
    phase: SessionPhase,
    active_loop: Option<ActiveLoop>,
    info_guard: PollGuard,
    state_guard: PollGuard,
    max_poll_iterations: u32,
    event_bus: SessionEventBus,
}

impl SessionStateMachine {
    pub fn new() -> Self {
        Self::with_max_poll_iterations(DEFAULT_MAX_POLL_ITERATIONS)
    }

    pub fn with_max_poll_iterations(max_poll_iterations: u32) -> Self {
        Self {
            identity: None,
            status: GameStatus::default(),
            client_state: None,
            word_picked: false,
            invalid_word: false,
            timed_out: None,
            phase: SessionPhase::NoSession,
            active_loop: None,
            info_guard: PollGuard::new(),
            state_guard: PollGuard::new(),
            max_poll_iterations,
            event_bus: SessionEventBus::new(),
        }
    }

    pub fn add_event_handler(&mut self, handler: Box<dyn SessionEventHandler>) {
        self.event_bus.add_handler(handler);
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn identity(&self) -> Option<&SessionIdentity> {
        self.identity.as_ref()
    }

    pub fn status(&self) -> &GameStatus {
        &self.status
    }

    pub fn client_state(&self) -> Option<&ClientGameState> {
        self.client_state.as_ref()
    }

    pub fn active_loop(&self) -> Option<PollLoop> {
        self.active_loop.map(|active| active.poll_loop)
    }

    pub fn invalid_word(&self) -> bool {
        self.invalid_word
    }

    pub fn timed_out(&self) -> Option<PollLoop> {
        self.timed_out
    }

    pub fn current_view(&self) -> ViewModel {
        project(ViewInputs {
            phase: self.phase,
            identity: self.identity.as_ref(),
            client_state: self.client_state.as_ref(),
            invalid_word: self.invalid_word,
            timed_out: self.timed_out,
        })
    }

    /// Take a stamp for the next request of `poll_loop`.
    pub fn issue_poll(&mut self, poll_loop: PollLoop) -> PollIssue {
        let Some(active) = self.active_loop.as_mut() else {
            return PollIssue::Inactive;
        };
        if active.poll_loop != poll_loop {
            return PollIssue::Inactive;
        }
        let Some(identity) = self.identity.clone() else {
            return PollIssue::Inactive;
        };

        if active.iterations >= self.max_poll_iterations {
            let iterations = active.iterations;
            warn!(
                "{} poll gave up after {} iterations in phase {:?}",
                poll_loop, iterations, self.phase
            );
            let mut commands = Vec::new();
            self.stop_loop(poll_loop, &mut commands);
            self.timed_out = Some(poll_loop);
            self.event_bus.publish(SessionEvent::PollTimedOut {
                poll_loop,
                iterations,
            });
            return PollIssue::Exhausted(Transition {
                applied: true,
                from: self.phase,
                to: self.phase,
                commands,
            });
        }

        active.iterations += 1;
        let stamp = self.guard_mut(poll_loop).issue();
        PollIssue::Issued(PollTicket {
            poll_loop,
            stamp,
            identity,
        })
    }

    /// Restart the loop the current phase waits on after a timeout. Does
    /// nothing unless a loop has timed out.
    pub fn resume_polling(&mut self) -> Transition {
        let from = self.phase;
        let mut commands = Vec::new();
        let wanted = match self.phase {
            SessionPhase::AwaitingOpponent | SessionPhase::AwaitingGameStart => {
                Some(PollLoop::Info)
            }
            SessionPhase::InProgress => Some(PollLoop::State),
            _ => None,
        };

        let applied = match (self.timed_out, wanted) {
            (Some(_), Some(poll_loop)) => {
                info!("Resuming {} poll in phase {:?}", poll_loop, self.phase);
                self.start_loop(poll_loop, &mut commands);
                true
            }
            _ => false,
        };

        Transition {
            applied,
            from,
            to: self.phase,
            commands,
        }
    }

    /// Stop whichever loop runs, keeping all session data.
    pub fn stop_polling(&mut self) -> Transition {
        let mut commands = Vec::new();
        if let Some(active) = self.active_loop {
            self.stop_loop(active.poll_loop, &mut commands);
        }
        Transition {
            applied: !commands.is_empty(),
            from: self.phase,
            to: self.phase,
            commands,
        }
    }

    /// End the session and return to `NoSession` so a new game can be
    /// created or joined. Event handlers and the iteration budget are kept.
    /// Poll guards keep counting, so answers to polls of the old session
    /// never match a stamp of the next one.
    pub fn reset(&mut self) -> Transition {
        let from = self.phase;
        let mut commands = Vec::new();
        if let Some(active) = self.active_loop {
            self.stop_loop(active.poll_loop, &mut commands);
        }

        let Some(identity) = self.identity.take() else {
            return Transition {
                applied: false,
                from,
                to: from,
                commands,
            };
        };

        info!("Left game {} in phase {:?}", identity.game_id, from);
        self.status = GameStatus::default();
        self.client_state = None;
        self.word_picked = false;
        self.invalid_word = false;
        self.timed_out = None;
        self.phase = SessionPhase::NoSession;
        self.event_bus.publish(SessionEvent::PhaseChanged {
            from,
            to: SessionPhase::NoSession,
        });

        Transition {
            applied: true,
            from,
            to: SessionPhase::NoSession,
            commands,
        }
    }

    pub fn apply(&mut self, update: SessionUpdate) -> Transition {
        let from = self.phase;
        let mut commands = Vec::new();

        let applied = match update {
            SessionUpdate::Joined { identity } => self.on_joined(identity, &mut commands),
            SessionUpdate::WordPicked { status } => self.on_word_picked(status, &mut commands),
            SessionUpdate::WordRejected { word } | SessionUpdate::GuessRejected { word } => {
                debug!("Server rejected word '{}' in phase {:?}", word, from);
                self.invalid_word = true;
                self.event_bus.publish(SessionEvent::WordRejected { word });
                true
            }
            SessionUpdate::GuessAccepted { .. } if self.phase < SessionPhase::InProgress => {
                warn!("Ignoring guess result in phase {:?}", self.phase);
                false
            }
            SessionUpdate::GuessAccepted { state } => {
                // Polls issued before this answer know less than it does.
                self.state_guard.invalidate();
                self.invalid_word = false;
                self.accept_client_state(state, &mut commands)
            }
            SessionUpdate::InfoPolled { stamp, status } => {
                if self.discard_if_stale(PollLoop::Info, stamp) {
                    false
                } else {
                    self.on_info_polled(status, &mut commands);
                    true
                }
            }
            SessionUpdate::StatePolled { stamp, state } => {
                if self.discard_if_stale(PollLoop::State, stamp) {
                    false
                } else {
                    self.accept_client_state(state, &mut commands)
                }
            }
        };

        self.refresh_phase();

        Transition {
            applied,
            from,
            to: self.phase,
            commands,
        }
    }

    fn on_joined(&mut self, identity: SessionIdentity, commands: &mut Vec<LoopCommand>) -> bool {
        if let Some(existing) = &self.identity {
            warn!(
                "Ignoring join of game {}: already in game {}",
                identity.game_id, existing.game_id
            );
            return false;
        }

        info!(
            "Joined game {} as {}",
            identity.game_id, identity.player.name
        );
        self.identity = Some(identity);
        self.invalid_word = false;
        self.start_loop(PollLoop::Info, commands);
        true
    }

    fn on_word_picked(&mut self, status: GameStatus, commands: &mut Vec<LoopCommand>) -> bool {
        if self.phase != SessionPhase::AwaitingWordSelection {
            warn!("Ignoring word pick result in phase {:?}", self.phase);
            return false;
        }

        self.word_picked = true;
        self.invalid_word = false;
        self.status = self.status.merged_with(&status);

        if self.status.is_started() {
            self.start_loop(PollLoop::State, commands);
        } else {
            self.start_loop(PollLoop::Info, commands);
        }
        true
    }

    fn on_info_polled(&mut self, status: GameStatus, commands: &mut Vec<LoopCommand>) {
        self.status = self.status.merged_with(&status);

        match self.phase {
            SessionPhase::AwaitingOpponent if self.status.is_ready() => {
                self.stop_loop(PollLoop::Info, commands);
            }
            SessionPhase::AwaitingGameStart if self.status.is_started() => {
                self.start_loop(PollLoop::State, commands);
            }
            _ => {}
        }
    }

    fn accept_client_state(
        &mut self,
        state: ClientGameState,
        commands: &mut Vec<LoopCommand>,
    ) -> bool {
        if let Some(known) = &self.client_state {
            if !state.extends(known) {
                debug!(
                    "Discarding game state with {} guesses, already know {}",
                    state.guesses.len(),
                    known.guesses.len()
                );
                self.event_bus.publish(SessionEvent::StaleStateDiscarded {
                    known_guesses: known.guesses.len(),
                    received_guesses: state.guesses.len(),
                });
                return false;
            }
        }

        if state.guesses.iter().any(|guess| !guess.is_well_formed()) {
            warn!("Game state contains a guess whose letter results do not match its word");
        }

        let ended = state.is_ended();
        self.client_state = Some(state);
        if ended {
            self.stop_loop(PollLoop::State, commands);
        }
        true
    }

    fn discard_if_stale(&mut self, poll_loop: PollLoop, stamp: PollStamp) -> bool {
        let guard = self.guard_mut(poll_loop);
        if guard.is_current(stamp) {
            return false;
        }

        let current = guard.current();
        debug!(
            "Discarding stale {} poll response {} (current #{})",
            poll_loop, stamp, current
        );
        self.event_bus.publish(SessionEvent::StaleResponseDiscarded {
            poll_loop,
            stamp: stamp.value(),
            current,
        });
        true
    }

    /// Cancel whatever runs, then start `poll_loop` as a new generation.
    fn start_loop(&mut self, poll_loop: PollLoop, commands: &mut Vec<LoopCommand>) {
        if let Some(active) = self.active_loop {
            self.stop_loop(active.poll_loop, commands);
        }

        self.guard_mut(poll_loop).invalidate();
        self.active_loop = Some(ActiveLoop {
            poll_loop,
            iterations: 0,
        });
        self.timed_out = None;
        commands.push(LoopCommand::Start(poll_loop));
        info!("Started {} poll", poll_loop);
        self.event_bus.publish(SessionEvent::LoopStarted { poll_loop });
    }

    fn stop_loop(&mut self, poll_loop: PollLoop, commands: &mut Vec<LoopCommand>) {
        if self.active_loop.map(|active| active.poll_loop) != Some(poll_loop) {
            return;
        }

        self.active_loop = None;
        self.guard_mut(poll_loop).invalidate();
        commands.push(LoopCommand::Stop(poll_loop));
        info!("Stopped {} poll", poll_loop);
        self.event_bus.publish(SessionEvent::LoopStopped { poll_loop });
    }

    fn refresh_phase(&mut self) {
        let derived = derive_phase(PhaseInputs {
            has_identity: self.identity.is_some(),
            status: &self.status,
            word_picked: self.word_picked,
            client_state: self.client_state.as_ref(),
        });

        debug_assert!(derived >= self.phase, "phase regressed from {:?} to {:?}", self.phase, derived);
        if derived <= self.phase {
            return;
        }

        let from = self.phase;
        self.phase = derived;
        info!("Session phase {:?} -> {:?}", from, derived);
        self.event_bus.publish(SessionEvent::PhaseChanged { from, to: derived });
    }

    fn guard_mut(&mut self, poll_loop: PollLoop) -> &mut PollGuard {
        match poll_loop {
            PollLoop::Info => &mut self.info_guard,
            PollLoop::State => &mut self.state_guard,
        }
    }
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
