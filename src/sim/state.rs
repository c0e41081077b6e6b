//! World state and store operations
//!
//! The [`World`] owns every entity and all session status. Each public
//! operation is a single read-modify-write: either it applies completely
//! or it leaves the world untouched (firing with no ammo, damaging a dead
//! enemy, removing an id that is already gone).

use std::collections::BTreeSet;

use glam::{EulerRot, Quat, Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Obstacles;
use super::events::GameEvent;
use crate::consts::{FIRST_PATROL_OFFSET, PLAYER_SPAWN};
use crate::tuning::{Tuning, TuningError};

/// Entity identifier, unique for the lifetime of a [`World`]
pub type EntityId = u32;

/// Top-level session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, nothing simulated
    Intro,
    /// Active gameplay
    Playing,
    /// Every enemy is down
    Victory,
    /// Player health reached zero
    Defeat,
}

impl GamePhase {
    /// Victory or defeat
    pub fn is_over(self) -> bool {
        matches!(self, GamePhase::Victory | GamePhase::Defeat)
    }
}

/// Weapon in the player's hands. Grenades are thrown, never held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weapon {
    Rifle,
    Spear,
}

impl Weapon {
    pub fn toggled(self) -> Self {
        match self {
            Weapon::Rifle => Weapon::Spear,
            Weapon::Spear => Weapon::Rifle,
        }
    }
}

/// Who fired a bullet, which decides what it can hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    Player,
    Enemy,
}

/// An enemy soldier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub position: Vec3,
    pub health: u32,
    pub patrol_target: Vec3,
    /// Fixed per-enemy center that patrol targets scatter around (x, z)
    pub patrol_anchor: Vec2,
    /// Facing yaw (radians, same convention as the player)
    pub heading: f32,
    pub is_aggro: bool,
    pub is_dead: bool,
    /// Seconds until the next rifle shot is allowed
    pub shoot_cooldown: f32,
    /// Seconds until the next melee strike is allowed
    pub attack_cooldown: f32,
}

impl Enemy {
    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }
}

/// A straight-flying round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: EntityId,
    pub position: Vec3,
    /// Unit vector
    pub direction: Vec3,
    pub speed: f32,
    pub owner: BulletOwner,
    /// Seconds since it was fired
    pub age: f32,
}

/// A thrown grenade in flight or at rest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grenade {
    pub id: EntityId,
    pub position: Vec3,
    /// Unit throw direction
    pub direction: Vec3,
    pub speed: f32,
    /// Current velocity, starts at `direction * speed`
    pub velocity: Vec3,
    /// Seconds until detonation
    pub fuse: f32,
}

/// An expanding shockwave
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub id: EntityId,
    pub position: Vec3,
    pub start_radius: f32,
    /// Shell radius as of the last update
    pub radius: f32,
    pub max_radius: f32,
    pub damage: u32,
    /// Normalized expansion, done at 1.0
    pub progress: f32,
    /// Enemies already damaged by this shockwave
    pub hit_enemies: BTreeSet<EntityId>,
}

/// Ammunition dropped by a dead enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmmoPickup {
    pub id: EntityId,
    pub position: Vec3,
    pub amount: u32,
}

/// The player's body. `position` is the eye/camera position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub position: Vec3,
    /// Horizontal velocity (y unused)
    pub velocity: Vec3,
    pub vertical_velocity: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub airborne: bool,
}

impl Player {
    pub fn at_spawn() -> Self {
        Self {
            position: PLAYER_SPAWN,
            velocity: Vec3::ZERO,
            vertical_velocity: 0.0,
            yaw: 0.0,
            pitch: 0.0,
            airborne: false,
        }
    }

    /// Unit look direction (yaw then pitch applied to -Z)
    pub fn facing(&self) -> Vec3 {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0) * Vec3::NEG_Z
    }
}

/// Partial enemy update, applied field by field
#[derive(Debug, Clone, Copy, Default)]
pub struct EnemyUpdate {
    pub position: Option<Vec3>,
    pub heading: Option<f32>,
    pub patrol_target: Option<Vec3>,
    pub is_aggro: Option<bool>,
    pub shoot_cooldown: Option<f32>,
    pub attack_cooldown: Option<f32>,
}

/// Read-only view for the HUD and audio layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub phase: GamePhase,
    pub health: u32,
    pub max_health: u32,
    pub weapon: Weapon,
    pub rifle_ammo: u32,
    pub max_rifle_ammo: u32,
    pub grenades: u32,
    pub enemies_killed: u32,
    pub total_enemies: u32,
}

/// Enemy removal due at a simulated time
#[derive(Debug, Clone, Copy)]
struct ScheduledRemoval {
    at: f64,
    enemy_id: EntityId,
}

/// The authoritative game world
#[derive(Debug, Clone)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub tuning: Tuning,
    pub obstacles: Obstacles,
    pub phase: GamePhase,
    pub player: Player,
    pub player_health: u32,
    pub current_weapon: Weapon,
    pub rifle_ammo: u32,
    pub grenade_count: u32,
    pub enemies_killed: u32,
    /// Entity collections, each in spawn (= id) order
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub grenades: Vec<Grenade>,
    pub explosions: Vec<Explosion>,
    pub ammo_pickups: Vec<AmmoPickup>,
    /// Simulated seconds since the world was created
    clock: f64,
    pending_removals: Vec<ScheduledRemoval>,
    events: Vec<GameEvent>,
    next_id: EntityId,
}

impl World {
    /// Village layout and default balance
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, Tuning::default(), Obstacles::village())
    }

    /// Build a world from tuning that already passed [`Tuning::validate`].
    ///
    /// The wave spawns one enemy per entry of `session.enemy_spawns` up to
    /// `session.total_enemies`, so a short spawn list would leave victory
    /// unreachable. Use [`World::try_with_config`] for unchecked input.
    pub fn with_config(seed: u64, tuning: Tuning, obstacles: Obstacles) -> Self {
        debug_assert!(tuning.validate().is_ok(), "World built from invalid tuning");
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player_health: tuning.player.max_health,
            rifle_ammo: tuning.weapons.rifle_ammo,
            grenade_count: tuning.weapons.grenades,
            tuning,
            obstacles,
            phase: GamePhase::Intro,
            player: Player::at_spawn(),
            current_weapon: Weapon::Rifle,
            enemies_killed: 0,
            enemies: Vec::new(),
            bullets: Vec::new(),
            grenades: Vec::new(),
            explosions: Vec::new(),
            ammo_pickups: Vec::new(),
            clock: 0.0,
            pending_removals: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Validate `tuning` first, then build the world
    pub fn try_with_config(seed: u64, tuning: Tuning, obstacles: Obstacles) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self::with_config(seed, tuning, obstacles))
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Simulated seconds elapsed
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub(crate) fn advance_clock(&mut self, dt: f32) {
        self.clock += f64::from(dt);
    }

    pub fn total_enemies(&self) -> u32 {
        self.tuning.session.total_enemies
    }

    pub fn max_rifle_ammo(&self) -> u32 {
        self.tuning.weapons.max_rifle_ammo
    }

    pub fn player_max_health(&self) -> u32 {
        self.tuning.player.max_health
    }

    // --- Session ---

    /// Fresh session with a full enemy wave, straight into play
    pub fn start(&mut self) {
        self.reset_session();
        self.spawn_wave();
        self.set_phase(GamePhase::Playing);
        log::info!(
            "Session started: {} enemies, {} rounds, {} grenades",
            self.enemies.len(),
            self.rifle_ammo,
            self.grenade_count
        );
    }

    /// Fresh session parked on the title screen
    pub fn restart(&mut self) {
        self.reset_session();
        self.set_phase(GamePhase::Intro);
        log::info!("Session reset to intro");
    }

    fn reset_session(&mut self) {
        self.player = Player::at_spawn();
        self.player.position.y = self.tuning.player.eye_height;
        self.player_health = self.tuning.player.max_health;
        self.current_weapon = Weapon::Rifle;
        self.rifle_ammo = self.tuning.weapons.rifle_ammo;
        self.grenade_count = self.tuning.weapons.grenades;
        self.enemies_killed = 0;
        self.enemies.clear();
        self.bullets.clear();
        self.grenades.clear();
        self.explosions.clear();
        self.ammo_pickups.clear();
        self.pending_removals.clear();
    }

    fn set_phase(&mut self, to: GamePhase) {
        let from = self.phase;
        self.phase = to;
        if from != to {
            log::info!("Phase {:?} -> {:?}", from, to);
            self.events.push(GameEvent::PhaseChanged { from, to });
        }
    }

    fn spawn_wave(&mut self) {
        let count = self.tuning.session.total_enemies as usize;
        let spawns: Vec<Vec3> = self.tuning.session.enemy_spawns.iter().take(count).copied().collect();
        for position in spawns {
            self.add_enemy(position);
        }
    }

    /// Add a patrolling enemy at `position`
    pub fn add_enemy(&mut self, position: Vec3) -> EntityId {
        let id = self.next_entity_id();
        let spread = self.tuning.enemy.anchor_spread;
        let patrol_anchor = self.roll_offset(spread);
        self.enemies.push(Enemy {
            id,
            position,
            health: self.tuning.enemy.max_health,
            patrol_target: position + FIRST_PATROL_OFFSET,
            patrol_anchor,
            heading: 0.0,
            is_aggro: false,
            is_dead: false,
            shoot_cooldown: 0.0,
            attack_cooldown: 0.0,
        });
        id
    }

    /// Uniform offset in [-spread, spread] on both ground axes
    pub(crate) fn roll_offset(&mut self, spread: f32) -> Vec2 {
        let spread = spread.abs();
        Vec2::new(
            self.rng.random_range(-spread..=spread),
            self.rng.random_range(-spread..=spread),
        )
    }

    // --- Player ---

    /// Subtract health, flooring at zero. Zero health while playing is defeat.
    pub fn damage_player(&mut self, amount: u32) {
        let health = self.player_health.saturating_sub(amount);
        self.player_health = health;
        self.events.push(GameEvent::PlayerHit { damage: amount, health });
        log::debug!("Player took {} damage, health {}", amount, health);

        if health == 0 && self.phase == GamePhase::Playing {
            self.set_phase(GamePhase::Defeat);
        }
    }

    /// Add health, capped at the maximum
    pub fn heal_player(&mut self, amount: u32) {
        self.player_health = self
            .player_health
            .saturating_add(amount)
            .min(self.tuning.player.max_health);
    }

    /// Toggle rifle and spear
    pub fn switch_weapon(&mut self) -> Weapon {
        self.current_weapon = self.current_weapon.toggled();
        log::debug!("Switched weapon to {:?}", self.current_weapon);
        self.events.push(GameEvent::WeaponSwitched {
            weapon: self.current_weapon,
        });
        self.current_weapon
    }

    // --- Bullets ---

    /// Fire one rifle round. Does nothing without ammo.
    pub fn shoot_rifle(&mut self, position: Vec3, direction: Vec3) -> Option<EntityId> {
        if self.rifle_ammo == 0 {
            log::debug!("Out of ammo");
            self.events.push(GameEvent::DryFire);
            return None;
        }

        let speed = self.tuning.weapons.rifle_bullet_speed;
        let id = self.spawn_bullet(position, direction, speed, BulletOwner::Player);
        self.rifle_ammo -= 1;
        self.events.push(GameEvent::RifleFired {
            bullet_id: id,
            ammo_left: self.rifle_ammo,
        });
        log::trace!("Rifle fired, {} rounds left", self.rifle_ammo);
        Some(id)
    }

    /// Enemy rifle shot. Enemies never run dry.
    pub fn shoot_enemy(&mut self, position: Vec3, direction: Vec3) -> EntityId {
        let speed = self.tuning.weapons.enemy_bullet_speed;
        let id = self.spawn_bullet(position, direction, speed, BulletOwner::Enemy);
        self.events.push(GameEvent::EnemyFired {
            bullet_id: id,
            origin: position,
        });
        id
    }

    fn spawn_bullet(&mut self, position: Vec3, direction: Vec3, speed: f32, owner: BulletOwner) -> EntityId {
        let id = self.next_entity_id();
        self.bullets.push(Bullet {
            id,
            position,
            direction: direction.normalize_or_zero(),
            speed,
            owner,
            age: 0.0,
        });
        id
    }

    pub fn update_bullet(&mut self, id: EntityId, position: Vec3, age: f32) {
        if let Some(bullet) = self.bullets.iter_mut().find(|b| b.id == id) {
            bullet.position = position;
            bullet.age = age;
        }
    }

    pub fn remove_bullet(&mut self, id: EntityId) {
        self.bullets.retain(|b| b.id != id);
    }

    // --- Grenades and explosions ---

    /// Throw a grenade. Does nothing with none left.
    pub fn throw_grenade(&mut self, position: Vec3, direction: Vec3) -> Option<EntityId> {
        if self.grenade_count == 0 {
            return None;
        }

        let id = self.next_entity_id();
        let direction = direction.normalize_or_zero();
        let speed = self.tuning.weapons.grenade_speed;
        self.grenades.push(Grenade {
            id,
            position,
            direction,
            speed,
            velocity: direction * speed,
            fuse: self.tuning.weapons.grenade_fuse,
        });
        self.grenade_count -= 1;
        self.events.push(GameEvent::GrenadeThrown {
            grenade_id: id,
            grenades_left: self.grenade_count,
        });
        log::debug!("Grenade thrown, {} left", self.grenade_count);
        Some(id)
    }

    pub fn update_grenade(&mut self, id: EntityId, position: Vec3, velocity: Vec3, fuse: f32) {
        if let Some(grenade) = self.grenades.iter_mut().find(|g| g.id == id) {
            grenade.position = position;
            grenade.velocity = velocity;
            grenade.fuse = fuse;
        }
    }

    /// Replace a grenade with an explosion at its current position
    pub fn explode_grenade(&mut self, id: EntityId) -> Option<EntityId> {
        let index = self.grenades.iter().position(|g| g.id == id)?;
        let grenade = self.grenades.remove(index);

        let explosion_id = self.next_entity_id();
        let weapons = &self.tuning.weapons;
        self.explosions.push(Explosion {
            id: explosion_id,
            position: grenade.position,
            start_radius: weapons.explosion_start_radius,
            radius: weapons.explosion_start_radius,
            max_radius: weapons.explosion_max_radius,
            damage: weapons.explosion_damage,
            progress: 0.0,
            hit_enemies: BTreeSet::new(),
        });
        self.events.push(GameEvent::GrenadeDetonated {
            grenade_id: id,
            explosion_id,
            position: grenade.position,
        });
        log::info!("Grenade {} exploded at {:?}", id, grenade.position);
        Some(explosion_id)
    }

    pub fn remove_grenade(&mut self, id: EntityId) {
        self.grenades.retain(|g| g.id != id);
    }

    pub fn update_explosion(
        &mut self,
        id: EntityId,
        radius: f32,
        progress: f32,
        hit_enemies: BTreeSet<EntityId>,
    ) {
        if let Some(explosion) = self.explosions.iter_mut().find(|e| e.id == id) {
            explosion.radius = radius;
            explosion.progress = progress;
            explosion.hit_enemies = hit_enemies;
        }
    }

    pub fn remove_explosion(&mut self, id: EntityId) {
        self.explosions.retain(|e| e.id != id);
    }

    // --- Enemies ---

    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn live_enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.is_alive())
    }

    /// Apply the set fields of `update`. Dead enemies stay frozen.
    pub fn update_enemy(&mut self, id: EntityId, update: EnemyUpdate) {
        let Some(enemy) = self.enemies.iter_mut().find(|e| e.id == id && e.is_alive()) else {
            return;
        };
        if let Some(position) = update.position {
            enemy.position = position;
        }
        if let Some(heading) = update.heading {
            enemy.heading = heading;
        }
        if let Some(target) = update.patrol_target {
            enemy.patrol_target = target;
        }
        if let Some(aggro) = update.is_aggro {
            enemy.is_aggro = aggro;
        }
        if let Some(cooldown) = update.shoot_cooldown {
            enemy.shoot_cooldown = cooldown;
        }
        if let Some(cooldown) = update.attack_cooldown {
            enemy.attack_cooldown = cooldown;
        }
    }

    /// Damage a live enemy. Returns whether anything happened.
    ///
    /// A kill marks the enemy dead, bumps the kill count (switching to
    /// victory on the last one while playing), drops an ammo pickup where it
    /// stood and schedules its removal after the grace delay. A survivor
    /// always turns aggressive.
    pub fn damage_enemy(&mut self, id: EntityId, amount: u32) -> bool {
        let Some(enemy) = self.enemies.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        if enemy.is_dead {
            return false;
        }

        let health = enemy.health.saturating_sub(amount);
        enemy.health = health;

        if health > 0 {
            enemy.is_aggro = true;
            log::debug!("Enemy {} hit for {}, health {}", id, amount, health);
            self.events.push(GameEvent::EnemyHit {
                enemy_id: id,
                damage: amount,
                health,
            });
            return true;
        }

        enemy.is_dead = true;
        let position = enemy.position;
        self.enemies_killed += 1;
        let total = self.total_enemies();
        log::info!("Enemy {} killed ({}/{})", id, self.enemies_killed, total);
        self.events.push(GameEvent::EnemyKilled {
            enemy_id: id,
            kills: self.enemies_killed,
            total,
        });

        let drop = self.tuning.weapons.ammo_drop;
        self.add_ammo_pickup(position, drop);
        self.pending_removals.push(ScheduledRemoval {
            at: self.clock + f64::from(self.tuning.enemy.removal_delay),
            enemy_id: id,
        });

        if self.enemies_killed >= total && self.phase == GamePhase::Playing {
            self.set_phase(GamePhase::Victory);
        }
        true
    }

    pub fn remove_enemy(&mut self, id: EntityId) {
        self.enemies.retain(|e| e.id != id);
    }

    /// Drop enemies whose grace delay has run out
    pub fn process_removals(&mut self) {
        let now = self.clock;
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending_removals)
            .into_iter()
            .partition(|r| r.at <= now);
        self.pending_removals = waiting;
        for removal in due {
            log::trace!("Removing enemy {}", removal.enemy_id);
            self.remove_enemy(removal.enemy_id);
        }
    }

    /// Number of enemy removals still waiting on their grace delay
    pub fn pending_removal_count(&self) -> usize {
        self.pending_removals.len()
    }

    // --- Pickups ---

    pub fn add_ammo_pickup(&mut self, position: Vec3, amount: u32) -> EntityId {
        let id = self.next_entity_id();
        self.ammo_pickups.push(AmmoPickup { id, position, amount });
        id
    }

    /// Take a pickup's rounds (capped at the magazine size). Returns whether
    /// the pickup existed.
    pub fn collect_ammo(&mut self, id: EntityId) -> bool {
        let Some(index) = self.ammo_pickups.iter().position(|p| p.id == id) else {
            return false;
        };
        let pickup = self.ammo_pickups.remove(index);
        self.rifle_ammo = self
            .rifle_ammo
            .saturating_add(pickup.amount)
            .min(self.tuning.weapons.max_rifle_ammo);
        log::debug!("Collected {} ammo, total {}", pickup.amount, self.rifle_ammo);
        self.events.push(GameEvent::AmmoCollected {
            amount: pickup.amount,
            ammo: self.rifle_ammo,
        });
        true
    }

    // --- Feedback ---

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Events since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Hand all pending events to the caller
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            phase: self.phase,
            health: self.player_health,
            max_health: self.tuning.player.max_health,
            weapon: self.current_weapon,
            rifle_ammo: self.rifle_ammo,
            max_rifle_ammo: self.tuning.weapons.max_rifle_ammo,
            grenades: self.grenade_count,
            enemies_killed: self.enemies_killed,
            total_enemies: self.tuning.session.total_enemies,
        }
    }
}
