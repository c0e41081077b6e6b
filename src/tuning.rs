//! Game balance and tuning values
//!
//! Everything a designer might want to tweak without touching simulation
//! code. Defaults reproduce the shipped balance; a JSON document only needs
//! to name the fields it overrides.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::Context;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Player movement, survivability and melee values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_health: u32,
    /// Horizontal run speed (m/s)
    pub move_speed: f32,
    /// Per-frame velocity multiplier while no movement key is held
    pub skid_decay: f32,
    /// Eye height when standing on the ground
    pub eye_height: f32,
    pub jump_impulse: f32,
    /// Half-extent of the square play area
    pub boundary: f32,
    pub spear_range: f32,
    /// Minimum dot(facing, to_target) for a spear hit (~37° cone)
    pub spear_cone: f32,
    pub spear_damage: u32,
    /// Eye-to-pickup distance that collects ammo
    pub pickup_radius: f32,
    /// How far below the eye grenades leave the hand
    pub throw_drop: f32,
    /// Mouse-look pitch limit (radians)
    pub max_pitch: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_health: 100,
            move_speed: 8.0,
            skid_decay: 0.9,
            eye_height: 1.7,
            jump_impulse: 8.0,
            boundary: 23.0,
            spear_range: 3.0,
            spear_cone: 0.8,
            spear_damage: 50,
            pickup_radius: 1.5,
            throw_drop: 0.3,
            max_pitch: std::f32::consts::FRAC_PI_2,
        }
    }
}

/// Enemy soldier behavior values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub max_health: u32,
    pub patrol_speed: f32,
    pub chase_speed: f32,
    pub aggro_range: f32,
    pub shoot_range: f32,
    pub attack_range: f32,
    pub shoot_cooldown: f32,
    pub attack_cooldown: f32,
    pub melee_damage: u32,
    /// Distance at which a patrol target counts as reached
    pub patrol_arrival: f32,
    /// Patrol targets land within ± this of the enemy's anchor on each axis
    pub patrol_wander: f32,
    /// Patrol anchors are rolled within ± this of the world origin
    pub anchor_spread: f32,
    /// Height enemies walk at once they start moving
    pub walk_height: f32,
    /// Muzzle position relative to the enemy origin
    pub muzzle_offset: Vec3,
    /// Seconds a dead enemy lingers before leaving the world
    pub removal_delay: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            max_health: 100,
            patrol_speed: 2.0,
            chase_speed: 4.0,
            aggro_range: 15.0,
            shoot_range: 20.0,
            attack_range: 2.0,
            shoot_cooldown: 2.5,
            attack_cooldown: 1.5,
            melee_damage: 10,
            patrol_arrival: 1.0,
            patrol_wander: 5.0,
            anchor_spread: 10.0,
            walk_height: 0.3,
            muzzle_offset: Vec3::new(0.35, 1.0, 0.0),
            removal_delay: 0.5,
        }
    }
}

/// Rifle, grenade and explosion values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTuning {
    pub rifle_ammo: u32,
    pub max_rifle_ammo: u32,
    pub rifle_bullet_speed: f32,
    pub rifle_damage: u32,
    /// Bullet-to-enemy distance that counts as a hit
    pub rifle_hit_radius: f32,
    pub enemy_bullet_speed: f32,
    pub enemy_bullet_damage: u32,
    /// Bullet-to-eye distance that counts as a hit on the player
    pub enemy_hit_radius: f32,
    pub bullet_lifetime: f32,
    pub grenades: u32,
    pub grenade_speed: f32,
    pub grenade_fuse: f32,
    /// Resting height of a grenade on the ground
    pub grenade_ground: f32,
    pub explosion_start_radius: f32,
    pub explosion_max_radius: f32,
    pub explosion_damage: u32,
    /// Normalized expansion progress per second
    pub explosion_rate: f32,
    /// Half-thickness of the damaging shockwave shell
    pub shockwave_thickness: f32,
    /// Rounds dropped by each dead enemy
    pub ammo_drop: u32,
}

impl Default for WeaponTuning {
    fn default() -> Self {
        Self {
            rifle_ammo: 30,
            max_rifle_ammo: 30,
            rifle_bullet_speed: 50.0,
            rifle_damage: 35,
            rifle_hit_radius: 1.2,
            enemy_bullet_speed: 40.0,
            enemy_bullet_damage: 15,
            enemy_hit_radius: 1.5,
            bullet_lifetime: 3.0,
            grenades: 3,
            grenade_speed: 25.0,
            grenade_fuse: 1.0,
            grenade_ground: 0.3,
            explosion_start_radius: 0.5,
            explosion_max_radius: 10.0,
            explosion_damage: 50,
            explosion_rate: 12.0,
            shockwave_thickness: 0.5,
            ammo_drop: 10,
        }
    }
}

/// Session composition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTuning {
    pub total_enemies: u32,
    /// Spawn points, used in order; must hold at least `total_enemies`
    pub enemy_spawns: Vec<Vec3>,
}

impl Default for SessionTuning {
    fn default() -> Self {
        Self {
            total_enemies: 5,
            enemy_spawns: vec![
                Vec3::new(10.0, 1.0, -15.0),
                Vec3::new(-12.0, 1.0, -20.0),
                Vec3::new(15.0, 1.0, -10.0),
                Vec3::new(-8.0, 1.0, -25.0),
                Vec3::new(0.0, 1.0, -30.0),
            ],
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub enemy: EnemyTuning,
    pub weapons: WeaponTuning,
    pub session: SessionTuning,
}

/// Why a tuning document was rejected
#[derive(Debug)]
pub enum TuningError {
    /// Not valid JSON, or a field had the wrong type
    Parse(serde_json::Error),
    /// Parsed fine but a value makes no sense
    Invalid(String),
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Parse(e) => write!(f, "failed to parse tuning: {e}"),
            TuningError::Invalid(msg) => write!(f, "invalid tuning: {msg}"),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuningError::Parse(e) => Some(e),
            TuningError::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(e: serde_json::Error) -> Self {
        TuningError::Parse(e)
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON document over the defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read and validate a tuning file from disk
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let txt = fs::read_to_string(path).with_context(|| format!("read tuning: {}", path.display()))?;
        let tuning = Self::from_json(&txt).with_context(|| format!("parse tuning: {}", path.display()))?;
        Ok(tuning)
    }

    /// Serialize to pretty JSON (handy for dumping the defaults)
    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("player.move_speed", self.player.move_speed),
            ("player.eye_height", self.player.eye_height),
            ("player.boundary", self.player.boundary),
            ("enemy.patrol_speed", self.enemy.patrol_speed),
            ("enemy.chase_speed", self.enemy.chase_speed),
            ("weapons.rifle_bullet_speed", self.weapons.rifle_bullet_speed),
            ("weapons.enemy_bullet_speed", self.weapons.enemy_bullet_speed),
            ("weapons.bullet_lifetime", self.weapons.bullet_lifetime),
            ("weapons.explosion_rate", self.weapons.explosion_rate),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(TuningError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }

        if !(0.0..1.0).contains(&self.player.skid_decay) {
            return Err(TuningError::Invalid(format!(
                "player.skid_decay must be in [0, 1), got {}",
                self.player.skid_decay
            )));
        }
        if self.player.max_health == 0 {
            return Err(TuningError::Invalid("player.max_health must be non-zero".into()));
        }
        if self.weapons.rifle_ammo > self.weapons.max_rifle_ammo {
            return Err(TuningError::Invalid(format!(
                "weapons.rifle_ammo ({}) exceeds weapons.max_rifle_ammo ({})",
                self.weapons.rifle_ammo, self.weapons.max_rifle_ammo
            )));
        }
        if self.weapons.explosion_max_radius < self.weapons.explosion_start_radius {
            return Err(TuningError::Invalid(
                "weapons.explosion_max_radius is smaller than the start radius".into(),
            ));
        }
        if self.session.total_enemies == 0 {
            return Err(TuningError::Invalid("session.total_enemies must be non-zero".into()));
        }
        if self.session.enemy_spawns.len() < self.session.total_enemies as usize {
            return Err(TuningError::Invalid(format!(
                "session.enemy_spawns has {} points for {} enemies",
                self.session.enemy_spawns.len(),
                self.session.total_enemies
            )));
        }
        Ok(())
    }
}
