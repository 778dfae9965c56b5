//! Tank Battle - a real-time 2D multiplayer tank game
//!
//! Core modules:
//! - `sim`: Stage simulation (registry, fixed-step update, collisions, entities)
//! - `engine`: Dedicated simulation thread with fixed tick pacing
//! - `net`: Line protocol, relay server and network client
//! - `bot`: Scripted tank drivers for the demo screen
//! - `assets`: Startup asset registry
//! - `settings`: Runtime configuration

pub mod assets;
pub mod bot;
pub mod engine;
pub mod error;
pub mod net;
pub mod settings;
pub mod sim;

pub use error::{AssetError, ConfigError, NetError, ProtocolError};
pub use settings::Settings;

use glam::Vec2;
use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Simulation ticks per second
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Default stage dimensions (pixels)
    pub const STAGE_WIDTH: f32 = 1200.0;
    pub const STAGE_HEIGHT: f32 = 800.0;

    /// Tank defaults
    pub const TANK_INITIAL_HP: i32 = 50;
    pub const TANK_WIDTH: f32 = 40.0;
    pub const TANK_HEIGHT: f32 = 40.0;
    /// Pixels per tick at full input
    pub const TANK_VELOCITY: f32 = 3.0;
    /// Length of the gun sprite, measured from the tank center outward on both sides
    pub const GUN_LENGTH: f32 = 36.0;

    /// Bullet defaults
    pub const BULLET_RADIUS: f32 = 4.0;
    pub const BULLET_SPEED: f32 = 8.0;
    pub const BULLET_LIFE_TICKS: u32 = 45;
    pub const BULLET_DAMAGE: i32 = 10;

    /// Missile defaults
    pub const MISSILE_RADIUS: f32 = 8.0;
    pub const MISSILE_SPEED: f32 = 5.0;
    pub const MISSILE_LIFE_TICKS: u32 = 240;
    pub const MISSILE_DAMAGE_PER_SECOND: i32 = 10;
    pub const MISSILE_MAX_DAMAGE: i32 = 200;

    /// Base defaults
    pub const BASE_INITIAL_HP: i32 = 1000;
    pub const BASE_BROKEN_HP: i32 = 500;
    pub const BASE_RADIUS: f32 = 48.0;

    /// Block defaults
    pub const BLOCK_SIZE: f32 = 30.0;
    pub const BLOCK_INITIAL_HP: i32 = 50;
    pub const BLOCK_BABY_TICKS: u32 = 30;

    /// Wall tile edge length
    pub const WALL_SIZE: f32 = 30.0;

    /// Cosmetic countdowns (ticks)
    pub const DAMAGE_FLUSH_TICKS: u32 = 8;
    pub const DEBRIS_TICKS: u32 = 30;
    pub const RESPAWN_LAG_TICKS: u32 = 180;
    pub const RESPAWN_ANIMATION_TICKS: u32 = 60;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector pointing along `angle` (radians)
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle (radians) of the vector from `from` to `to`
#[inline]
pub fn angle_to(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Uniformly distributed unit vector
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    let theta = rng.random_range(-std::f32::consts::PI..std::f32::consts::PI);
    direction(theta)
}

/// Text carried by a caught panic
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
