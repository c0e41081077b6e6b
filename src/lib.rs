//! Village Defense - simulation core for a first-person arena shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (world store, entity physics, enemy AI)
//! - `tuning`: Data-driven game balance
//!
//! Rendering, audio, input capture and HUD presentation live outside this
//! crate. They drive [`sim::tick`] once per frame and read the world back.

pub mod sim;
pub mod tuning;

pub use tuning::{Tuning, TuningError};

use glam::{Vec2, Vec3};

/// Game configuration constants
pub mod consts {
    use glam::Vec3;

    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Downward acceleration shared by the player and grenades (m/s²)
    pub const GRAVITY: f32 = 9.8;

    /// Where the player's eye starts each session
    pub const PLAYER_SPAWN: Vec3 = Vec3::new(0.0, 1.7, 5.0);

    /// Offset from a spawn point to an enemy's first patrol target
    pub const FIRST_PATROL_OFFSET: Vec3 = Vec3::new(5.0, 0.0, 5.0);
}

/// Normalized angle to [-π, π); non-finite input maps to 0
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    // rem_euclid can round up to exactly TAU
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped >= PI { -PI } else { wrapped }
}

/// Project a world position onto the ground plane (x, z)
#[inline]
pub fn planar(pos: Vec3) -> Vec2 {
    Vec2::new(pos.x, pos.z)
}

/// Distance between two points ignoring height
#[inline]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    planar(a).distance(planar(b))
}

/// Yaw (radians about +Y) that makes the -Z forward axis point along `dir`
#[inline]
pub fn yaw_towards(dir: Vec2) -> f32 {
    (-dir.x).atan2(-dir.y)
}
