//! Game events
//!
//! Things that happened during a tick, for audio and HUD feedback. The
//! simulation never reads these back.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::{EntityId, GamePhase, Weapon};

/// A perceivable happening, in the order it occurred
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player rifle discharged
    RifleFired { bullet_id: EntityId, ammo_left: u32 },
    /// Trigger pulled on an empty magazine
    DryFire,
    /// An enemy shot at the player from `origin`
    EnemyFired { bullet_id: EntityId, origin: Vec3 },
    /// Spear thrust, with how many enemies it connected with
    SpearSwing { hits: u32 },
    GrenadeThrown { grenade_id: EntityId, grenades_left: u32 },
    GrenadeDetonated {
        grenade_id: EntityId,
        explosion_id: EntityId,
        position: Vec3,
    },
    /// Non-lethal damage on an enemy
    EnemyHit {
        enemy_id: EntityId,
        damage: u32,
        health: u32,
    },
    EnemyKilled {
        enemy_id: EntityId,
        kills: u32,
        total: u32,
    },
    PlayerHit { damage: u32, health: u32 },
    AmmoCollected { amount: u32, ammo: u32 },
    WeaponSwitched { weapon: Weapon },
    Jumped,
    PhaseChanged { from: GamePhase, to: GamePhase },
}

impl GameEvent {
    /// Whether the HUD should flash a hit marker for this event
    pub fn is_hit_confirm(&self) -> bool {
        matches!(
            self,
            GameEvent::EnemyHit { .. } | GameEvent::EnemyKilled { .. } | GameEvent::SpearSwing { hits: 1.. }
        )
    }
}
