//! Soak test for the arena simulation.
//!
//! Drives a world directly (no game loop, no wall clock) with randomly
//! steering robots and reports throughput and what happened.
//!
//! Usage: cargo run --bin soak -- [OPTIONS]
//!
//! Options:
//!   --robots N   Number of robots to spawn (default: 8)
//!   --ticks N    Number of ticks to simulate (default: 18000)
//!   --seed S     RNG seed for the steering (default: 42)

use arena_server::config::ServerConfig;
use arena_server::world::{World, WorldStats};
use arena_shared::protocol::Control;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::time::Instant;

/// Chance per robot per tick of issuing a control
const CONTROL_PROBABILITY: f64 = 0.2;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SoakReport {
    robots: u32,
    ticks: u64,
    seed: u64,
    controls_sent: u64,
    controls_rejected: u64,
    shots_fired: u64,
    collisions: u64,
    bodies_removed: u64,
    eliminated: Vec<u32>,
    elapsed_ms: f64,
    ticks_per_second: f64,
    final_state: WorldStats,
}

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();

    let mut num_robots: u32 = 8;
    let mut num_ticks: u64 = 18_000;
    let mut seed: u64 = 42;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--robots" => {
                i += 1;
                num_robots = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(8);
            }
            "--ticks" => {
                i += 1;
                num_ticks = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(18_000);
            }
            "--seed" => {
                i += 1;
                seed = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(42);
            }
            _ => {}
        }
        i += 1;
    }

    let config = ServerConfig {
        max_players: num_robots.max(1) as usize,
        ..ServerConfig::default()
    };
    if let Err(e) = config.validate() {
        eprintln!("Invalid server configuration: {}", e);
        std::process::exit(1);
    }

    let mut world = World::new(config.arena, config.max_players);
    for player_id in 1..=num_robots {
        if let Err(e) = world.add_robot(player_id) {
            eprintln!("Could not spawn robot for player {}: {}", player_id, e);
            std::process::exit(1);
        }
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let dt = config.tick_seconds();
    let mut report = SoakReport {
        robots: num_robots,
        ticks: num_ticks,
        seed,
        controls_sent: 0,
        controls_rejected: 0,
        shots_fired: 0,
        collisions: 0,
        bodies_removed: 0,
        eliminated: Vec::new(),
        elapsed_ms: 0.0,
        ticks_per_second: 0.0,
        final_state: WorldStats::default(),
    };

    let start = Instant::now();
    for _ in 0..num_ticks {
        for player_id in 1..=num_robots {
            if !rng.gen_bool(CONTROL_PROBABILITY) {
                continue;
            }
            let control = Control::ALL[rng.gen_range(0..Control::ALL.len())];
            report.controls_sent += 1;
            match world.control(player_id, control, dt) {
                Ok(Some(_)) => report.shots_fired += 1,
                Ok(None) => {}
                Err(_) => report.controls_rejected += 1,
            }
        }

        let tick = world.short_loop(dt);
        report.collisions += tick.collisions as u64;
        report.bodies_removed += tick.removed.len() as u64;
        report.eliminated.extend(tick.eliminated);
    }
    let elapsed = start.elapsed();

    report.elapsed_ms = elapsed.as_secs_f64() * 1000.0;
    report.ticks_per_second = num_ticks as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
    report.final_state = world.stats();

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize report: {}", e);
            std::process::exit(1);
        }
    }
}
