use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use captionparty::api::router;
use captionparty::assets::MemoryAssets;
use captionparty::clock::ManualClock;
use captionparty::protocol::{ErrorBody, JoinResponse, PLAYER_ID_HEADER};
use captionparty::state::{AppState, NextRound};
use captionparty::types::{GameConfig, GamePhase, RoundResults, StatusView};
use chrono::Duration;
use image::{ImageFormat, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::Arc;
use tower::ServiceExt;

fn poster_png(color: [u8; 3]) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbImage::from_pixel(160, 120, Rgb(color))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn game_state(config: GameConfig, posters: &[&str]) -> (Arc<AppState>, Arc<ManualClock>) {
    let mut assets = MemoryAssets::default();
    for (i, poster) in posters.iter().enumerate() {
        assets.add_poster(poster, poster_png([20 * i as u8, 40, 200]));
    }
    let clock = Arc::new(ManualClock::default());
    let state = AppState::with_parts(
        config,
        Arc::new(assets),
        clock.clone(),
        StdRng::seed_from_u64(42),
    );
    (Arc::new(state), clock)
}

async fn named(state: &AppState, names: &[&str]) -> Vec<String> {
    let mut ids = Vec::new();
    for name in names {
        let player = state.join(None).await.unwrap();
        state.set_name(&player.id, name).await.unwrap();
        ids.push(player.id);
    }
    ids
}

/// End-to-end game driven through the state API
#[tokio::test]
async fn test_full_game_flow() {
    let config = GameConfig {
        max_rounds: 2,
        ..GameConfig::default()
    };
    let (state, clock) = game_state(config, &["one.png", "two.png", "three.png"]);
    let ids = named(&state, &["Alice", "Bob", "Cara"]).await;

    // Round 1: everyone submits, everyone votes
    let round = state.start_game(&ids[0]).await.unwrap();
    assert_eq!(round.round_no, 1);
    assert!(!round.recycled_posters);
    assert_eq!(state.phase().await, GamePhase::Writing);

    for id in &ids {
        state.submit_caption(id, "When the", "coffee kicks in").await.unwrap();
    }
    assert_eq!(state.phase().await, GamePhase::Voting);

    for voter in &ids {
        let ballot = state.ballot(voter).await.unwrap();
        assert_eq!(ballot.authors.len(), 2);
        assert!(ballot.authors.iter().all(|e| &e.author_id != voter));
    }
    state.submit_vote(&ids[0], &ids[1]).await.unwrap();
    state.submit_vote(&ids[1], &ids[2]).await.unwrap();
    let outcome = state.submit_vote(&ids[2], &ids[1]).await.unwrap();
    assert!(outcome.phase_changed);
    assert_eq!(outcome.phase, GamePhase::RoundResults);

    let results = state.round_results().await.unwrap();
    assert_eq!(results.winner.as_deref(), Some(ids[1].as_str()));
    assert!(!results.is_game_over);
    assert_eq!(results.standings[0].display_name, "Bob");

    // Round 2: writing deadline lapses with a single caption
    let next = state.next_round(&ids[0]).await.unwrap();
    let NextRound::Started { round } = next else {
        panic!("expected a new round, got {:?}", next);
    };
    assert_eq!(round.round_no, 2);
    assert_ne!(Some(round.poster), results.poster);

    state.submit_caption(&ids[2], "", "only me").await.unwrap();
    clock.advance(Duration::seconds(31));
    let status = state.status().await;
    assert_eq!(status.phase, GamePhase::Voting);
    assert_eq!(status.seconds_remaining, Some(30));

    // Cara has nothing to vote for and is skipped, which ends voting
    let ballot = state.ballot(&ids[2]).await.unwrap();
    assert!(ballot.auto_skipped);
    assert_eq!(ballot.outcome.phase, GamePhase::RoundResults);

    let results = state.round_results().await.unwrap();
    assert!(results.is_game_over);
    assert!(results.winner.is_none());
    assert_eq!(state.phase().await, GamePhase::GameOver);

    let standings = state.final_standings().await.unwrap();
    assert_eq!(standings[0].display_name, "Bob");
    assert_eq!(standings[0].score, 2);

    // Nothing starts after the game is over
    assert!(state.next_round(&ids[0]).await.is_err());

    state.reset().await;
    assert_eq!(state.phase().await, GamePhase::Lobby);
    assert!(state.list_players().await.players.is_empty());
}

/// Simultaneous last submissions must open voting exactly once
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions_transition_once() {
    let (state, _clock) = game_state(GameConfig::default(), &["one.png"]);
    let names: Vec<String> = (0..8).map(|i| format!("Player {}", i)).collect();
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let ids = named(&state, &name_refs).await;
    state.start_game(&ids[0]).await.unwrap();

    let tasks = ids.iter().cloned().map(|id| {
        let state = state.clone();
        tokio::spawn(async move { state.submit_caption(&id, "SAME", "TIME").await })
    });
    let outcomes = futures::future::join_all(tasks).await;

    let transitions = outcomes
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .filter(|outcome| outcome.phase_changed)
        .count();
    assert_eq!(transitions, 1);

    let session = state.session.read().await;
    assert_eq!(session.phase, GamePhase::Voting);
    assert_eq!(session.captions.len(), 8);
}

async fn send(app: &Router, method: &str, uri: &str, player: Option<&str>, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(player) = player {
        builder = builder.header(PLAYER_ID_HEADER, player);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn join_named(app: &Router, name: &str) -> String {
    let (status, body) = send(app, "POST", "/api/join", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let joined: JoinResponse = serde_json::from_slice(&body).unwrap();

    let (status, _) = send(
        app,
        "POST",
        "/api/name",
        Some(&joined.player_id),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    joined.player_id
}

fn error_code(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body).unwrap().code
}

#[tokio::test]
async fn test_http_round() {
    let (state, _clock) = game_state(GameConfig::default(), &["one.png"]);
    let app = router(state, "static");

    let (status, body) = send(&app, "GET", "/api/status", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let view: StatusView = serde_json::from_slice(&body).unwrap();
    assert_eq!(view.phase, GamePhase::Lobby);

    let alice = join_named(&app, "Alice").await;
    let (status, body) = send(&app, "POST", "/api/start", Some(&alice), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "NOT_ENOUGH_PLAYERS");

    let bob = join_named(&app, "Bob").await;
    let (status, _) = send(&app, "POST", "/api/start", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "POST", "/api/join", None, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "GAME_IN_PROGRESS");

    let (status, body) = send(
        &app,
        "POST",
        "/api/captions",
        None,
        Some(json!({ "line1": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "UNKNOWN_PLAYER");

    let (status, body) = send(
        &app,
        "POST",
        "/api/captions",
        Some(&alice),
        Some(json!({ "line1": " ", "line2": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), "EMPTY_SUBMISSION");

    for (player, line) in [(&alice, "Monday"), (&bob, "Friday")] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/captions",
            Some(player),
            Some(json!({ "line1": line, "line2": "again" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, "GET", "/api/ballot", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let ballot: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(ballot["authors"][0]["author_id"], Value::String(bob.clone()));

    let (status, body) = send(
        &app,
        "POST",
        "/api/votes",
        Some(&alice),
        Some(json!({ "target": alice })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), "INVALID_TARGET");

    send(&app, "POST", "/api/votes", Some(&alice), Some(json!({ "target": bob }))).await;
    let (status, _) = send(&app, "POST", "/api/votes", Some(&bob), Some(json!({ "target": alice }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/api/results", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let results: RoundResults = serde_json::from_slice(&body).unwrap();
    assert_eq!(results.entries.len(), 2);
    assert!(results.entries.iter().all(|e| e.votes == 1));

    let (status, body) = send(&app, "GET", &format!("/api/captions/{}/image", bob), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let image = image::load_from_memory(&body).unwrap();
    assert_eq!((image.width(), image.height()), (160, 120));

    let (status, body) = send(&app, "GET", "/api/captions/nobody/image", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "CAPTION_NOT_FOUND");

    let (status, body) = send(&app, "POST", "/api/next", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    let next: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(next["result"], "started");
    assert_eq!(next["round"]["round_no"], 2);
}

#[tokio::test]
async fn test_http_late_submission_is_gone() {
    let (state, clock) = game_state(GameConfig::default(), &["one.png"]);
    let app = router(state, "static");
    let alice = join_named(&app, "Alice").await;
    join_named(&app, "Bob").await;
    send(&app, "POST", "/api/start", Some(&alice), None).await;

    clock.advance(Duration::seconds(31));
    let (status, body) = send(
        &app,
        "POST",
        "/api/captions",
        Some(&alice),
        Some(json!({ "line1": "too late" })),
    )
    .await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(error_code(&body), "DEADLINE_PASSED");

    let (_, body) = send(&app, "GET", "/api/status", None, None).await;
    let view: StatusView = serde_json::from_slice(&body).unwrap();
    assert_eq!(view.phase, GamePhase::Voting);
}

#[tokio::test]
async fn test_http_start_without_posters() {
    let (state, _clock) = game_state(GameConfig::default(), &[]);
    let app = router(state, "static");
    let alice = join_named(&app, "Alice").await;
    join_named(&app, "Bob").await;

    let (status, body) = send(&app, "POST", "/api/start", Some(&alice), None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error_code(&body), "NO_POSTERS");

    let (_, body) = send(&app, "GET", "/api/players", None, None).await;
    let players: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(players["phase"], "LOBBY");
    assert_eq!(players["players"].as_array().unwrap().len(), 2);
}
