//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod bullet;
pub mod collision;
pub mod enemy;
pub mod events;
pub mod explosion;
pub mod grenade;
pub mod player;
pub mod state;
pub mod tick;

pub use collision::{Circle, CoverBox, Obstacles, Probe};
pub use events::GameEvent;
pub use state::{
    AmmoPickup, Bullet, BulletOwner, Enemy, EnemyUpdate, EntityId, Explosion, GamePhase, Grenade,
    HudSnapshot, Player, Weapon, World,
};
pub use tick::{TickInput, tick};
