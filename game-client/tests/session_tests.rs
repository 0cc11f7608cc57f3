
use game_client::SessionError;
use game_types::{EndOutcome, GameApiError, Panel, PollLoop, SessionPhase};
use test_helpers::*;

#[tokio::test]
async fn test_full_game_against_scripted_server() {
    let api = ScriptedGameApi::new();
    let session = create_session(&api);

    session.create_and_join("Alice").await.unwrap();
    let view = session.current_view();
    assert_eq!(view.phase, SessionPhase::AwaitingOpponent);
    assert!(view.waiting_message.unwrap().contains(GAME_ID));
    assert_eq!(session.active_loop().await, Some(PollLoop::Info));
    assert_eq!(session.active_timers(), 1);

    api.opponent_joins();
    let view = wait_for_view(&session, |v| v.phase == SessionPhase::AwaitingWordSelection).await;
    assert_eq!(view.panel, Panel::PickWord);
    assert_eq!(session.active_timers(), 0);

    session.pick_word("CRANE").await.unwrap();
    assert_eq!(session.phase().await, SessionPhase::AwaitingGameStart);
    assert_eq!(session.active_timers(), 1);

    api.opponent_picks();
    wait_for_view(&session, |v| v.phase == SessionPhase::InProgress).await;
    assert_eq!(session.active_loop().await, Some(PollLoop::State));
    assert_eq!(session.active_timers(), 1);

    session.submit_guess("SLATE").await.unwrap();
    let view = session.current_view();
    assert_eq!(view.phase, SessionPhase::InProgress);
    let board = view.board.unwrap();
    assert_eq!(board.guesses.len(), 1);
    assert!(board.is_player_one);
    assert!(!board.can_guess);

    api.opponent_guesses();
    let view = wait_for_view(&session, |v| {
        v.board.as_ref().is_some_and(|board| board.can_guess)
    })
    .await;
    assert!(view.waiting_message.is_none());

    api.end_game(EndOutcome::Won);
    let view = wait_for_view(&session, |v| v.phase == SessionPhase::Ended).await;
    assert_eq!(view.panel, Panel::EndGame);
    assert_eq!(view.end_state.unwrap().outcome, EndOutcome::Won);
    assert_eq!(session.active_loop().await, None);
    assert_eq!(session.active_timers(), 0);
}

#[tokio::test]
async fn test_invalid_word_keeps_phase_and_clears_on_success() {
    let api = ScriptedGameApi::new();
    let session = create_session(&api);
    session.join("Bob", GAME_ID).await.unwrap();
    api.opponent_joins();
    wait_for_view(&session, |v| v.phase == SessionPhase::AwaitingWordSelection).await;

    let result = session.pick_word("XQZTP").await;
    assert!(result.as_ref().unwrap_err().is_invalid_word());
    let view = session.current_view();
    assert_eq!(view.phase, SessionPhase::AwaitingWordSelection);
    assert!(view.invalid_word);

    // The notice stays across poll ticks
    let_ticks_pass(3).await;
    assert!(session.current_view().invalid_word);

    session.pick_word("CRANE").await.unwrap();
    assert!(!session.current_view().invalid_word);
}

#[tokio::test]
async fn test_invalid_guess_keeps_game_running() {
    let api = ScriptedGameApi::new();
    api.opponent_joins();
    api.opponent_picks();
    let session = create_session(&api);
    session.join("Bob", GAME_ID).await.unwrap();
    wait_for_view(&session, |v| v.phase == SessionPhase::AwaitingWordSelection).await;
    session.pick_word("CRANE").await.unwrap();
    assert_eq!(session.phase().await, SessionPhase::InProgress);

    let result = session.submit_guess("AAAAA").await;
    assert!(matches!(
        result,
        Err(SessionError::Api(GameApiError::InvalidWord { .. }))
    ));
    let view = session.current_view();
    assert_eq!(view.phase, SessionPhase::InProgress);
    assert!(view.invalid_word);
    assert_eq!(session.active_loop().await, Some(PollLoop::State));

    session.submit_guess("SLATE").await.unwrap();
    assert!(!session.current_view().invalid_word);
}

#[tokio::test]
async fn test_join_unknown_game_creates_no_session() {
    let api = ScriptedGameApi::new();
    let session = create_session(&api);

    let result = session.join("Bob", "NOPE").await;
    assert!(matches!(
        result,
        Err(SessionError::Api(GameApiError::GameNotFound { .. }))
    ));
    assert_eq!(session.current_view().phase, SessionPhase::NoSession);
    assert_eq!(session.current_view().panel, Panel::CreateOrJoin);
    assert_eq!(session.active_timers(), 0);
}

#[tokio::test]
async fn test_network_failure_on_create_leaves_no_session() {
    let api = ScriptedGameApi::new();
    api.set_offline(true);
    let session = create_session(&api);

    let result = session.create_and_join("Alice").await;
    assert!(matches!(
        result,
        Err(SessionError::Api(GameApiError::Network { .. }))
    ));
    assert_eq!(session.phase().await, SessionPhase::NoSession);
    assert_eq!(api.calls(), vec!["create_game".to_string()]);
}

#[tokio::test]
async fn test_calls_in_wrong_phase_never_reach_server() {
    let api = ScriptedGameApi::new();
    let session = create_session(&api);

    let pick = session.pick_word("CRANE").await;
    let guess = session.submit_guess("SLATE").await;

    assert!(matches!(
        pick,
        Err(SessionError::WrongPhase {
            actual: SessionPhase::NoSession,
            ..
        })
    ));
    assert!(matches!(guess, Err(SessionError::WrongPhase { .. })));
    assert!(api.calls().is_empty());

    session.create_and_join("Alice").await.unwrap();
    let again = session.join("Alice", GAME_ID).await;
    assert!(matches!(
        again,
        Err(SessionError::WrongPhase {
            actual: SessionPhase::AwaitingOpponent,
            ..
        })
    ));
}

#[tokio::test]
async fn test_poll_failures_do_not_change_phase() {
    let api = ScriptedGameApi::new();
    let session = create_session(&api);
    session.create_and_join("Alice").await.unwrap();

    api.set_offline(true);
    let_ticks_pass(5).await;
    assert_eq!(session.phase().await, SessionPhase::AwaitingOpponent);
    assert_eq!(session.active_loop().await, Some(PollLoop::Info));

    api.set_offline(false);
    api.opponent_joins();
    wait_for_view(&session, |v| v.phase == SessionPhase::AwaitingWordSelection).await;
}

#[tokio::test]
async fn test_poll_budget_exhaustion_is_reported_and_resumable() {
    let api = ScriptedGameApi::new();
    let session = create_session_with_budget(&api, 3);
    session.create_and_join("Alice").await.unwrap();

    let view = wait_for_view(&session, |v| v.timed_out.is_some()).await;
    assert_eq!(view.timed_out, Some(PollLoop::Info));
    assert_eq!(view.phase, SessionPhase::AwaitingOpponent);
    assert_eq!(session.active_timers(), 0);
    assert_eq!(api.call_count("get_info"), 3);

    api.opponent_joins();
    assert!(session.resume_polling().await);
    assert_eq!(session.current_view().timed_out, None);
    wait_for_view(&session, |v| v.phase == SessionPhase::AwaitingWordSelection).await;
}

#[tokio::test]
async fn test_shutdown_cancels_polling() {
    let api = ScriptedGameApi::new();
    let session = create_session(&api);
    session.create_and_join("Alice").await.unwrap();
    let_ticks_pass(3).await;

    session.shutdown().await;
    assert_eq!(session.active_timers(), 0);

    let polls = api.call_count("get_info");
    let_ticks_pass(5).await;
    assert_eq!(api.call_count("get_info"), polls);
}

#[tokio::test]
async fn test_overlapping_joins_record_only_one() {
    let api = ScriptedGameApi::new();
    let session = create_yielding_session(&api);

    let (alice, bob) = tokio::join!(session.join("Alice", GAME_ID), session.join("Bob", GAME_ID));

    assert_eq!(api.call_count("join_game"), 2);
    assert_eq!([alice.is_ok(), bob.is_ok()].iter().filter(|ok| **ok).count(), 1);
    let rejected = if alice.is_err() { alice } else { bob };
    assert!(matches!(
        rejected,
        Err(SessionError::WrongPhase {
            actual: SessionPhase::AwaitingOpponent,
            ..
        })
    ));
    assert_eq!(session.phase().await, SessionPhase::AwaitingOpponent);
}

#[tokio::test]
async fn test_overlapping_word_picks_record_only_one() {
    let api = ScriptedGameApi::new();
    api.opponent_joins();
    let session = create_yielding_session(&api);
    session.join("Alice", GAME_ID).await.unwrap();
    wait_for_view(&session, |v| v.phase == SessionPhase::AwaitingWordSelection).await;

    let (crane, slate) = tokio::join!(session.pick_word("CRANE"), session.pick_word("SLATE"));

    assert_eq!(api.call_count("pick_word"), 2);
    assert_eq!([crane.is_ok(), slate.is_ok()].iter().filter(|ok| **ok).count(), 1);
    let rejected = if crane.is_err() { crane } else { slate };
    assert!(matches!(
        rejected,
        Err(SessionError::WrongPhase {
            actual: SessionPhase::AwaitingGameStart,
            ..
        })
    ));
}

#[tokio::test]
async fn test_reset_after_game_allows_new_game() {
    let api = ScriptedGameApi::new();
    api.opponent_joins();
    api.opponent_picks();
    let session = create_session(&api);
    session.join("Bob", GAME_ID).await.unwrap();
    wait_for_view(&session, |v| v.phase == SessionPhase::AwaitingWordSelection).await;
    session.pick_word("CRANE").await.unwrap();
    api.end_game(EndOutcome::Lost);
    wait_for_view(&session, |v| v.phase == SessionPhase::Ended).await;

    let blocked = session.create_and_join("Bob").await;
    assert!(matches!(
        blocked,
        Err(SessionError::WrongPhase {
            actual: SessionPhase::Ended,
            ..
        })
    ));

    assert!(session.reset().await);
    let view = session.current_view();
    assert_eq!(view.phase, SessionPhase::NoSession);
    assert_eq!(view.panel, Panel::CreateOrJoin);
    assert!(view.end_state.is_none());
    assert!(view.board.is_none());
    assert_eq!(session.active_timers(), 0);

    session.create_and_join("Bob").await.unwrap();
    let view = session.current_view();
    assert_eq!(view.phase, SessionPhase::AwaitingOpponent);
    assert!(view.end_state.is_none());
    assert_eq!(session.active_loop().await, Some(PollLoop::Info));
}

#[tokio::test]
async fn test_reset_stops_polling() {
    let api = ScriptedGameApi::new();
    let session = create_session(&api);
    session.create_and_join("Alice").await.unwrap();
    let_ticks_pass(3).await;

    assert!(session.reset().await);
    assert_eq!(session.active_timers(), 0);
    assert_eq!(session.active_loop().await, None);

    let polls = api.call_count("get_info");
    let_ticks_pass(5).await;
    assert_eq!(api.call_count("get_info"), polls);
    assert!(!session.reset().await);
}
