//! Integration tests for the arena server.
//!
//! These tests start a real game loop and talk to it over its command and
//! broadcast channels to verify end-to-end behavior.

use arena_server::body::BodyId;
use arena_server::config::ServerConfig;
use arena_server::game_loop::{run_game_loop, GameBroadcast, GameCommand};
use arena_server::player::PlayerId;
use arena_server::world::WorldStats;
use arena_shared::protocol::{BodyKind, Control, GlobalUpdate, ViewUpdate};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};

const TIMEOUT: Duration = Duration::from_secs(2);

struct TestServer {
    game_tx: mpsc::Sender<GameCommand>,
    broadcast_tx: broadcast::Sender<GameBroadcast>,
    handle: tokio::task::JoinHandle<()>,
}

/// Start a game loop with a fast tick and return its channels.
fn start_test_server() -> TestServer {
    let config = ServerConfig {
        tick_rate_hz: 60,
        broadcast_rate_hz: 20,
        max_players: 4,
        ..ServerConfig::default()
    };

    let (game_tx, game_rx) = mpsc::channel::<GameCommand>(256);
    let (broadcast_tx, _) = broadcast::channel::<GameBroadcast>(64);

    let bc_tx = broadcast_tx.clone();
    let handle = tokio::spawn(async move {
        run_game_loop(game_rx, bc_tx, config).await;
    });

    TestServer {
        game_tx,
        broadcast_tx,
        handle,
    }
}

async fn join(server: &TestServer, player_id: PlayerId) -> Result<BodyId, String> {
    let (response, rx) = oneshot::channel();
    server
        .game_tx
        .send(GameCommand::Join { player_id, response })
        .await
        .expect("game loop alive");
    tokio::time::timeout(TIMEOUT, rx)
        .await
        .expect("join answered in time")
        .expect("join response sent")
}

async fn control(
    server: &TestServer,
    player_id: PlayerId,
    control: Control,
    seconds: f64,
) -> Result<Option<BodyId>, String> {
    let (response, rx) = oneshot::channel();
    server
        .game_tx
        .send(GameCommand::Control {
            player_id,
            control,
            seconds,
            response,
        })
        .await
        .expect("game loop alive");
    rx.await.expect("control response sent")
}

async fn view(server: &TestServer, player_id: PlayerId) -> ViewUpdate {
    let (response, rx) = oneshot::channel();
    server
        .game_tx
        .send(GameCommand::View { player_id, response })
        .await
        .expect("game loop alive");
    rx.await.expect("view response sent")
}

async fn cannon_view(server: &TestServer, player_id: PlayerId) -> ViewUpdate {
    let (response, rx) = oneshot::channel();
    server
        .game_tx
        .send(GameCommand::CannonView { player_id, response })
        .await
        .expect("game loop alive");
    rx.await.expect("cannon view response sent")
}

async fn global(server: &TestServer, player_id: PlayerId) -> GlobalUpdate {
    let (response, rx) = oneshot::channel();
    server
        .game_tx
        .send(GameCommand::Global { player_id, response })
        .await
        .expect("game loop alive");
    rx.await.expect("global response sent")
}

async fn stats(server: &TestServer) -> WorldStats {
    let (response, rx) = oneshot::channel();
    server
        .game_tx
        .send(GameCommand::Stats { response })
        .await
        .expect("game loop alive");
    rx.await.expect("stats response sent")
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_join_spawns_robot() {
    let server = start_test_server();
    let robot = join(&server, 1).await.expect("join accepted");
    assert!(robot > 0);

    let update = view(&server, 1).await;
    assert!(!update.is_empty());
    assert!(update
        .objects
        .iter()
        .any(|o| o.kind == BodyKind::Planet));
    assert!(update.objects.iter().all(|o| o.id != robot));
    assert_eq!(stats(&server).await.robots, 1);
}

#[tokio::test]
async fn test_duplicate_join_is_rejected() {
    let server = start_test_server();
    join(&server, 7).await.expect("first join accepted");
    let err = join(&server, 7).await.unwrap_err();
    assert!(err.contains("already"), "unexpected error: {}", err);
}

#[tokio::test]
async fn test_full_arena_rejects_join() {
    let server = start_test_server();
    for player_id in 1..=4 {
        join(&server, player_id).await.expect("join accepted");
    }
    assert!(join(&server, 5).await.is_err());
}

#[tokio::test]
async fn test_unknown_player_gets_empty_snapshots() {
    let server = start_test_server();
    assert!(view(&server, 99).await.is_empty());
    assert!(cannon_view(&server, 99).await.is_empty());
    assert!(global(&server, 99).await.is_empty());
    assert!(control(&server, 99, Control::Accelerate, 0.1).await.is_err());
}

#[tokio::test]
async fn test_shoot_spawns_one_projectile() {
    let server = start_test_server();
    join(&server, 1).await.expect("join accepted");

    let first = control(&server, 1, Control::Shoot, 0.0).await.unwrap();
    let second = control(&server, 1, Control::Shoot, 0.0).await.unwrap();
    assert!(first.is_some());
    // Cooldown is 0.25 s; the two calls are handled back to back.
    assert!(second.is_none());

    let snapshot = global(&server, 1).await;
    let projectiles = snapshot
        .objects
        .iter()
        .filter(|o| o.kind == BodyKind::Projectile)
        .count();
    assert_eq!(projectiles, 1);
    assert!(snapshot.arrow.is_some());
}

#[tokio::test]
async fn test_invalid_control_time_is_rejected() {
    let server = start_test_server();
    join(&server, 1).await.expect("join accepted");
    assert!(control(&server, 1, Control::TurnLeft, -0.5).await.is_err());
    assert!(control(&server, 1, Control::TurnLeft, f64::INFINITY).await.is_err());
    assert_eq!(control(&server, 1, Control::TurnLeft, 0.1).await, Ok(None));
}

#[tokio::test]
async fn test_global_snapshots_are_broadcast() {
    let server = start_test_server();
    join(&server, 1).await.expect("join accepted");
    // Every snapshot sent from now on includes the robot
    let mut rx = server.broadcast_tx.subscribe();

    let update = tokio::time::timeout(TIMEOUT, async {
        loop {
            match rx.recv().await {
                Ok(GameBroadcast::Global(update)) => return update,
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(e) => panic!("broadcast closed: {}", e),
            }
        }
    })
    .await
    .expect("global snapshot within timeout");

    assert!(update.seconds > 0.0);
    assert!(update.arrow.is_none());
    assert!(update.objects.iter().any(|o| o.kind == BodyKind::Robot));
}

#[tokio::test]
async fn test_simulation_advances_between_queries() {
    let server = start_test_server();
    join(&server, 1).await.expect("join accepted");
    let before = stats(&server).await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    let after = stats(&server).await;
    assert!(after.tick > before.tick);
    assert!(after.seconds > before.seconds);
}

#[tokio::test]
async fn test_leave_removes_robot() {
    let server = start_test_server();
    join(&server, 1).await.expect("join accepted");
    server
        .game_tx
        .send(GameCommand::Leave { player_id: 1 })
        .await
        .unwrap();
    assert!(view(&server, 1).await.is_empty());
    assert_eq!(stats(&server).await.robots, 0);
    // The slot is free again.
    join(&server, 1).await.expect("rejoin accepted");
}

#[tokio::test]
async fn test_loop_ends_when_senders_drop() {
    let server = start_test_server();
    let TestServer { game_tx, handle, .. } = server;
    drop(game_tx);
    tokio::time::timeout(TIMEOUT, handle)
        .await
        .expect("game loop ended in time")
        .expect("game loop did not panic");
}
