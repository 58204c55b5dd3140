use crate::body::BodyId;
use crate::config::ServerConfig;
use crate::player::PlayerId;
use crate::world::{World, WorldStats};
use arena_shared::protocol::{Control, GlobalUpdate, ViewUpdate};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Commands from player sessions to the game loop
pub enum GameCommand {
    Join {
        player_id: PlayerId,
        response: oneshot::Sender<Result<BodyId, String>>,
    },
    Leave {
        player_id: PlayerId,
    },
    Control {
        player_id: PlayerId,
        control: Control,
        /// Time the control was held (s)
        seconds: f64,
        response: oneshot::Sender<Result<Option<BodyId>, String>>,
    },
    View {
        player_id: PlayerId,
        response: oneshot::Sender<ViewUpdate>,
    },
    CannonView {
        player_id: PlayerId,
        response: oneshot::Sender<ViewUpdate>,
    },
    Global {
        player_id: PlayerId,
        response: oneshot::Sender<GlobalUpdate>,
    },
    Stats {
        response: oneshot::Sender<WorldStats>,
    },
}

/// Broadcasts from game loop to all sessions
#[derive(Debug, Clone)]
pub enum GameBroadcast {
    Global(GlobalUpdate),
    Eliminated { player_id: PlayerId },
}

/// Run the main game loop. Owns the world.
pub async fn run_game_loop(
    mut cmd_rx: mpsc::Receiver<GameCommand>,
    broadcast_tx: broadcast::Sender<GameBroadcast>,
    server_config: ServerConfig,
) {
    let mut world = World::new(server_config.arena, server_config.max_players);

    let dt = server_config.tick_seconds();
    let broadcast_every_n = server_config.broadcast_every_n_ticks();

    let mut tick_interval = tokio::time::interval(Duration::from_secs_f64(dt));
    tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    tracing::info!(
        "Game loop started: {} Hz tick, global snapshot every {} ticks",
        server_config.tick_rate_hz,
        broadcast_every_n
    );

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                let report = world.short_loop(dt);
                if report.collisions > 0 {
                    tracing::debug!(
                        "Tick {}: {} collisions",
                        world.tick_count(),
                        report.collisions
                    );
                }
                for player_id in report.eliminated {
                    let _ = broadcast_tx.send(GameBroadcast::Eliminated { player_id });
                }

                if world.tick_count() % broadcast_every_n == 0 {
                    let _ = broadcast_tx.send(GameBroadcast::Global(world.spectator_update()));
                }
            }

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(cmd) => handle_command(&mut world, cmd),
                    // Every sender is gone
                    None => break,
                }
            }
        }
    }

    tracing::info!("Game loop ended after {} ticks", world.tick_count());
}

fn handle_command(world: &mut World, cmd: GameCommand) {
    match cmd {
        GameCommand::Join { player_id, response } => {
            let result = world.add_robot(player_id);
            if let Err(e) = &result {
                tracing::warn!("Player {} could not join: {}", player_id, e);
            }
            let _ = response.send(result);
        }
        GameCommand::Leave { player_id } => {
            world.remove_player(player_id);
        }
        GameCommand::Control {
            player_id,
            control,
            seconds,
            response,
        } => {
            let result = world.control(player_id, control, seconds);
            if let Err(e) = &result {
                tracing::debug!("Rejected {} from player {}: {}", control, player_id, e);
            }
            let _ = response.send(result);
        }
        GameCommand::View { player_id, response } => {
            let _ = response.send(world.view_update(player_id));
        }
        GameCommand::CannonView { player_id, response } => {
            let _ = response.send(world.cannon_update(player_id));
        }
        GameCommand::Global { player_id, response } => {
            let _ = response.send(world.global_update(player_id));
        }
        GameCommand::Stats { response } => {
            let _ = response.send(world.stats());
        }
    }
}
