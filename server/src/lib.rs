//! Orbital arena server library.
//!
//! This module exposes the simulation and the game-loop actor for use in
//! tests and binaries.

pub mod body;
pub mod config;
pub mod game_loop;
pub mod player;
pub mod projectile;
pub mod robot;
pub mod view;
pub mod world;
