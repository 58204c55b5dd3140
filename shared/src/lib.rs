//! Shared math and wire types for the orbital arena.
//!
//! Everything here is free of simulation state so it can be used by the
//! server as well as by any client that projects or renders snapshots.

pub mod config;
pub mod frame;
pub mod protocol;
pub mod quaternion;
pub mod vec3;
