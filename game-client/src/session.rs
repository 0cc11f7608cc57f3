use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::api::RemoteGameApi;
use crate::clock::{ClockHandle, SessionClock};
use crate::config::Config;
use game_core::{
    LoopCommand, PollIssue, SessionEventHandler, SessionStateMachine, SessionUpdate, Transition,
};
use game_types::{GameApiError, PollLoop, SessionIdentity, SessionPhase, ViewModel};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] GameApiError),
    #[error("Cannot {action} while in phase {actual:?}")]
    WrongPhase {
        action: &'static str,
        actual: SessionPhase,
    },
}

impl SessionError {
    pub fn is_invalid_word(&self) -> bool {
        matches!(self, SessionError::Api(error) if error.is_invalid_word())
    }
}

/// State machine plus the timers it asked for, guarded together so loop
/// commands run in the same critical section that produced them.
struct SessionCore {
    machine: SessionStateMachine,
    timers: HashMap<PollLoop, ClockHandle>,
}

struct SessionInner {
    api: Arc<dyn RemoteGameApi>,
    core: Mutex<SessionCore>,
    clock: SessionClock,
    poll_interval: Duration,
    views: watch::Sender<ViewModel>,
}

/// One player's connection to one game.
///
/// User actions call the server directly and hand the answer to the state
/// machine; the poll loops it requests run on a [`SessionClock`]. Every
/// change is re-projected and published to subscribers.
#[derive(Clone)]
pub struct GameSession {
    inner: Arc<SessionInner>,
}

impl GameSession {
    pub fn new(api: Arc<dyn RemoteGameApi>, config: &Config) -> Self {
        Self::with_machine(
            api,
            config.poll_interval(),
            SessionStateMachine::with_max_poll_iterations(config.max_poll_iterations),
        )
    }

    pub fn with_machine(
        api: Arc<dyn RemoteGameApi>,
        poll_interval: Duration,
        machine: SessionStateMachine,
    ) -> Self {
        let (views, _) = watch::channel(machine.current_view());
        Self {
            inner: Arc::new(SessionInner {
                api,
                core: Mutex::new(SessionCore {
                    machine,
                    timers: HashMap::new(),
                }),
                clock: SessionClock::new(),
                poll_interval,
                views,
            }),
        }
    }

    pub async fn add_event_handler(&self, handler: Box<dyn SessionEventHandler>) {
        self.inner.core.lock().await.machine.add_event_handler(handler);
    }

    /// Latest published view. Never blocks on the session lock.
    pub fn current_view(&self) -> ViewModel {
        self.inner.views.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewModel> {
        self.inner.views.subscribe()
    }

    pub async fn phase(&self) -> SessionPhase {
        self.inner.core.lock().await.machine.phase()
    }

    pub async fn active_loop(&self) -> Option<PollLoop> {
        self.inner.core.lock().await.machine.active_loop()
    }

    pub fn active_timers(&self) -> usize {
        self.inner.clock.active_count()
    }

    pub async fn create_and_join(&self, name: &str) -> Result<(), SessionError> {
        self.require_phase("create a game", SessionPhase::NoSession)
            .await?;

        let game_id = self.inner.api.create_game().await?;
        info!("Created game {}", game_id);
        self.join_as(name, &game_id, true).await
    }

    pub async fn join(&self, name: &str, game_id: &str) -> Result<(), SessionError> {
        self.require_phase("join a game", SessionPhase::NoSession)
            .await?;
        self.join_as(name, game_id, false).await
    }

    async fn join_as(
        &self,
        name: &str,
        game_id: &str,
        is_player_one: bool,
    ) -> Result<(), SessionError> {
        let player = self.inner.api.join_game(game_id, name).await?;
        let identity = SessionIdentity::new(game_id.to_string(), player, is_player_one);
        let transition = self
            .inner
            .apply(SessionUpdate::Joined { identity })
            .await;
        recorded("join a game", &transition)
    }

    pub async fn pick_word(&self, word: &str) -> Result<(), SessionError> {
        let identity = self
            .require_identity("pick a word", SessionPhase::AwaitingWordSelection)
            .await?;

        match self
            .inner
            .api
            .pick_word(&identity.game_id, word, identity.secret_id())
            .await
        {
            Ok(status) => {
                let transition = self.inner.apply(SessionUpdate::WordPicked { status }).await;
                recorded("pick a word", &transition)
            }
            Err(error) => {
                let rejected = SessionUpdate::WordRejected {
                    word: word.to_string(),
                };
                Err(self.fail_word_call(rejected, error).await)
            }
        }
    }

    pub async fn submit_guess(&self, word: &str) -> Result<(), SessionError> {
        let identity = self
            .require_identity("guess", SessionPhase::InProgress)
            .await?;

        match self
            .inner
            .api
            .guess_word(&identity.game_id, word, identity.secret_id())
            .await
        {
            Ok(state) => {
                let transition = self
                    .inner
                    .apply(SessionUpdate::GuessAccepted { state })
                    .await;
                // A discarded answer during the game is covered by a newer state.
                if transition.applied || transition.to >= SessionPhase::InProgress {
                    Ok(())
                } else {
                    recorded("guess", &transition)
                }
            }
            Err(error) => {
                let rejected = SessionUpdate::GuessRejected {
                    word: word.to_string(),
                };
                Err(self.fail_word_call(rejected, error).await)
            }
        }
    }

    /// Restart polling after the iteration budget ran out.
    pub async fn resume_polling(&self) -> bool {
        let mut core = self.inner.core.lock().await;
        let transition = core.machine.resume_polling();
        self.inner.settle(&mut core, &transition);
        transition.applied
    }

    /// Leave the current game and go back to `NoSession`. Returns false when
    /// there was no session.
    pub async fn reset(&self) -> bool {
        let mut core = self.inner.core.lock().await;
        let transition = core.machine.reset();
        self.inner.settle(&mut core, &transition);
        transition.applied
    }

    /// Cancel every running loop. The session keeps its data.
    pub async fn shutdown(&self) {
        let mut core = self.inner.core.lock().await;
        let transition = core.machine.stop_polling();
        self.inner.settle(&mut core, &transition);
        for (poll_loop, handle) in core.timers.drain() {
            debug!("Cancelling {} poll on shutdown", poll_loop);
            self.inner.clock.cancel(handle);
        }
    }

    async fn require_phase(
        &self,
        action: &'static str,
        expected: SessionPhase,
    ) -> Result<Option<SessionIdentity>, SessionError> {
        let core = self.inner.core.lock().await;
        let actual = core.machine.phase();
        if actual != expected {
            return Err(SessionError::WrongPhase { action, actual });
        }
        Ok(core.machine.identity().cloned())
    }

    async fn require_identity(
        &self,
        action: &'static str,
        expected: SessionPhase,
    ) -> Result<SessionIdentity, SessionError> {
        self.require_phase(action, expected)
            .await?
            .ok_or(SessionError::WrongPhase {
                action,
                actual: SessionPhase::NoSession,
            })
    }

    async fn fail_word_call(&self, rejected: SessionUpdate, error: GameApiError) -> SessionError {
        if error.is_invalid_word() {
            self.inner.apply(rejected).await;
        } else {
            warn!("Word call failed: {}", error);
        }
        SessionError::Api(error)
    }
}

/// Turn an update the machine ignored into an error. The server already
/// acted on the call, but the session did not record it, usually because a
/// concurrent call got there first.
fn recorded(action: &'static str, transition: &Transition) -> Result<(), SessionError> {
    if transition.applied {
        Ok(())
    } else {
        warn!("Result of '{}' was not recorded in phase {:?}", action, transition.to);
        Err(SessionError::WrongPhase {
            action,
            actual: transition.to,
        })
    }
}

impl SessionInner {
    async fn apply(self: &Arc<Self>, update: SessionUpdate) -> Transition {
        let mut core = self.core.lock().await;
        let transition = core.machine.apply(update);
        self.settle(&mut core, &transition);
        transition
    }

    /// Carry out the loop commands of a transition and publish the new view.
    fn settle(self: &Arc<Self>, core: &mut SessionCore, transition: &Transition) {
        for command in &transition.commands {
            match *command {
                LoopCommand::Stop(poll_loop) => {
                    if let Some(handle) = core.timers.remove(&poll_loop) {
                        self.clock.cancel(handle);
                    }
                }
                LoopCommand::Start(poll_loop) => {
                    if let Some(stale) = core.timers.remove(&poll_loop) {
                        self.clock.cancel(stale);
                    }
                    let session = Arc::downgrade(self);
                    let handle = self.clock.start(self.poll_interval, move || {
                        spawn_poll(&session, poll_loop);
                    });
                    core.timers.insert(poll_loop, handle);
                }
            }
        }

        let view = core.machine.current_view();
        self.views.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }
}

fn spawn_poll(session: &Weak<SessionInner>, poll_loop: PollLoop) {
    if let Some(inner) = session.upgrade() {
        tokio::spawn(poll_once(inner, poll_loop));
    }
}

/// One tick of a poll loop: take a stamp, ask the server, hand the answer
/// back. Ticks overlap freely; the stamp sorts out which answer counts.
async fn poll_once(inner: Arc<SessionInner>, poll_loop: PollLoop) {
    let ticket = {
        let mut core = inner.core.lock().await;
        match core.machine.issue_poll(poll_loop) {
            PollIssue::Issued(ticket) => ticket,
            PollIssue::Inactive => return,
            PollIssue::Exhausted(transition) => {
                inner.settle(&mut core, &transition);
                return;
            }
        }
    };

    let identity = &ticket.identity;
    let update = match poll_loop {
        PollLoop::Info => inner
            .api
            .get_info(&identity.game_id)
            .await
            .map(|status| SessionUpdate::InfoPolled {
                stamp: ticket.stamp,
                status,
            }),
        PollLoop::State => inner
            .api
            .get_state(&identity.game_id, identity.secret_id())
            .await
            .map(|state| SessionUpdate::StatePolled {
                stamp: ticket.stamp,
                state,
            }),
    };

    match update {
        Ok(update) => {
            inner.apply(update).await;
        }
        Err(error) => {
            // Left for the next tick to retry.
            warn!("{} poll {} failed: {}", poll_loop, ticket.stamp, error);
        }
    }
}
