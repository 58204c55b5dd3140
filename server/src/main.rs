use arena_server::config::ServerConfig;
use arena_server::game_loop::{run_game_loop, GameBroadcast, GameCommand};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::default();

    // Validate configuration before starting
    if let Err(e) = config.validate() {
        eprintln!("Invalid server configuration: {}", e);
        std::process::exit(1);
    }

    let (game_tx, game_rx) = mpsc::channel::<GameCommand>(256);
    let (broadcast_tx, mut broadcast_rx) = broadcast::channel::<GameBroadcast>(64);

    // Spawn game loop
    let bc_tx = broadcast_tx.clone();
    let game = tokio::spawn(async move {
        run_game_loop(game_rx, bc_tx, config).await;
    });

    // Headless: log what a spectator would receive
    tokio::spawn(async move {
        loop {
            match broadcast_rx.recv().await {
                Ok(GameBroadcast::Global(update)) => {
                    tracing::debug!(
                        "Global snapshot at {}s with {} objects",
                        update.seconds,
                        update.objects.len()
                    );
                }
                Ok(GameBroadcast::Eliminated { player_id }) => {
                    tracing::info!("Player {} eliminated", player_id);
                }
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!("Spectator lagged, skipped {} broadcasts", n);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    tracing::info!("Orbital arena running, press Ctrl-C to stop");
    println!("Orbital arena running");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
    }

    // Closing the command channel ends the loop
    drop(game_tx);
    drop(broadcast_tx);
    let _ = game.await;
}
