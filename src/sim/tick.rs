//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use glam::Vec2;

use super::state::{BulletOwner, GamePhase, Weapon, World};
use super::{bullet, enemy, explosion, grenade, player};
use crate::{normalize_angle, planar, planar_distance, yaw_towards};

/// Autopilot opens fire inside this planar range
const AUTOPILOT_FIRE_RANGE: f32 = 25.0;
/// Autopilot lobs grenades at targets inside this planar band
const AUTOPILOT_GRENADE_BAND: (f32, f32) = (15.0, 30.0);
/// How close the autopilot walks before holding position
const AUTOPILOT_RIFLE_STANDOFF: f32 = 8.0;
const AUTOPILOT_SPEAR_STANDOFF: f32 = 2.0;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Rifle shot or spear thrust, depending on the held weapon
    pub fire: bool,
    pub switch_weapon: bool,
    pub throw_grenade: bool,
    /// Look delta in radians (yaw, pitch)
    pub look: Vec2,
    /// Idle/demo mode - AI plays the game
    pub idle_mode: bool,
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput, dt: f32) {
    // Nothing moves on the title screen
    if world.phase == GamePhase::Intro {
        return;
    }

    world.advance_clock(dt);

    let mut input = input.clone();
    if input.idle_mode {
        autopilot(world, &mut input);
    }

    player::update(world, &input, dt);
    enemy::update_all(world, dt);
    bullet::update_all(world, dt);
    grenade::update_all(world, dt);
    explosion::update_all(world, dt);
    world.process_removals();
}

/// Fill `input` so the player hunts the nearest live enemy
fn autopilot(world: &World, input: &mut TickInput) {
    if world.phase != GamePhase::Playing {
        return;
    }

    let eye = world.player.position;
    let Some(target) = world.live_enemies().min_by(|a, b| {
        planar_distance(a.position, eye)
            .partial_cmp(&planar_distance(b.position, eye))
            .unwrap_or(std::cmp::Ordering::Equal)
    }) else {
        return;
    };

    let offset = target.position - eye;
    let flat = planar(offset);
    let distance = flat.length();

    // Snap the view onto the target; the look delta lands before the trigger
    let yaw_error = if flat == Vec2::ZERO {
        0.0
    } else {
        normalize_angle(yaw_towards(flat.normalize()) - world.player.yaw)
    };
    let pitch = offset.y.atan2(distance);
    input.look = Vec2::new(yaw_error, pitch - world.player.pitch);

    let weapon = match (world.current_weapon, world.rifle_ammo) {
        (Weapon::Rifle, 0) => {
            input.switch_weapon = true;
            Weapon::Spear
        }
        (Weapon::Spear, ammo) if ammo > 0 => {
            input.switch_weapon = true;
            Weapon::Rifle
        }
        (held, _) => held,
    };

    let standoff = match weapon {
        Weapon::Rifle => AUTOPILOT_RIFLE_STANDOFF,
        Weapon::Spear => AUTOPILOT_SPEAR_STANDOFF,
    };
    input.forward = distance > standoff;

    // One rifle round in the air at a time keeps the magazine from emptying in a blink
    let round_in_flight = world.bullets.iter().any(|b| b.owner == BulletOwner::Player);
    input.fire = match weapon {
        Weapon::Rifle => distance < AUTOPILOT_FIRE_RANGE && !round_in_flight,
        Weapon::Spear => distance < world.tuning.player.spear_range,
    };

    let (near, far) = AUTOPILOT_GRENADE_BAND;
    input.throw_grenade = world.grenade_count > 0
        && world.grenades.is_empty()
        && world.explosions.is_empty()
        && (near..far).contains(&distance);
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::collision::Obstacles;
    use crate::tuning::Tuning;

    fn open_world(seed: u64) -> World {
        let mut world = World::with_config(seed, Tuning::default(), Obstacles::empty());
        world.start();
        world
    }

    #[test]
    fn test_intro_does_not_tick() {
        let mut world = World::new(12345);
        let input = TickInput {
            forward: true,
            ..Default::default()
        };
        tick(&mut world, &input, SIM_DT);
        assert_eq!(world.phase, GamePhase::Intro);
        assert_eq!(world.clock(), 0.0);
        assert_eq!(world.player.position, Vec3::new(0.0, 1.7, 5.0));
    }

    #[test]
    fn test_tick_moves_player_and_enemies() {
        let mut world = open_world(12345);
        let before: Vec<Vec3> = world.enemies.iter().map(|e| e.position).collect();
        let input = TickInput {
            forward: true,
            ..Default::default()
        };
        for _ in 0..12 {
            tick(&mut world, &input, SIM_DT);
        }
        assert!(world.player.position.z < 5.0);
        let after: Vec<Vec3> = world.enemies.iter().map(|e| e.position).collect();
        assert_ne!(before, after);
    }

    #[test]
    fn test_dead_enemy_removed_after_grace_delay() {
        let mut world = open_world(1);
        let id = world.enemies[0].id;
        world.damage_enemy(id, 100);

        tick(&mut world, &TickInput::default(), 0.25);
        assert!(world.enemy(id).is_some());
        tick(&mut world, &TickInput::default(), 0.25);
        assert!(world.enemy(id).is_none());
        assert_eq!(world.ammo_pickups.len(), 1);
    }

    #[test]
    fn test_thrown_grenade_blasts_nearby_enemy() {
        let mut world = open_world(2);
        world.player.position = Vec3::new(0.0, 1.7, 0.0);
        world.enemies.truncate(1);
        // Out of aggro range, near where the grenade ends up
        world.enemies[0].position = Vec3::new(0.0, 0.3, -24.0);
        world.enemies[0].patrol_target = world.enemies[0].position;
        let id = world.enemies[0].id;

        let throw = TickInput {
            throw_grenade: true,
            ..Default::default()
        };
        tick(&mut world, &throw, SIM_DT);
        assert_eq!(world.grenade_count, 2);

        for _ in 0..150 {
            tick(&mut world, &TickInput::default(), SIM_DT);
        }
        assert!(world.grenades.is_empty());
        assert!(world.explosions.is_empty());
        assert_eq!(world.enemy(id).map(|e| e.health), Some(50));
    }

    #[test]
    fn test_game_over_freezes_controls_but_not_world() {
        let mut world = open_world(3);
        world.damage_player(100);
        assert_eq!(world.phase, GamePhase::Defeat);

        let input = TickInput {
            fire: true,
            forward: true,
            ..Default::default()
        };
        let clock = world.clock();
        tick(&mut world, &input, SIM_DT);
        assert!(world.clock() > clock);
        assert_eq!(world.rifle_ammo, 30);
        assert_eq!(world.player.position, Vec3::new(0.0, 1.7, 5.0));
    }

    #[test]
    fn test_autopilot_engages_nearest_enemy() {
        let mut world = open_world(4);
        world.player.position = Vec3::new(0.0, 1.7, 0.0);
        world.enemies.truncate(1);
        world.enemies[0].position = Vec3::new(10.0, 1.0, 0.0);

        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        tick(&mut world, &input, SIM_DT);
        assert_eq!(world.rifle_ammo, 29);
        assert!(world.player.facing().x > 0.99);
        // One round at a time
        tick(&mut world, &input, SIM_DT);
        assert_eq!(world.rifle_ammo, 29);
    }

    #[test]
    fn test_autopilot_switches_to_spear_when_dry() {
        let mut world = open_world(5);
        world.rifle_ammo = 0;
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        tick(&mut world, &input, SIM_DT);
        assert_eq!(world.current_weapon, Weapon::Spear);
    }

    #[test]
    fn test_determinism() {
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        let mut a = World::new(99999);
        let mut b = World::new(99999);
        a.start();
        b.start();

        for _ in 0..2400 {
            tick(&mut a, &input, SIM_DT);
            tick(&mut b, &input, SIM_DT);
        }

        assert_eq!(a.hud(), b.hud());
        assert_eq!(a.enemies.len(), b.enemies.len());
        for (ea, eb) in a.enemies.iter().zip(&b.enemies) {
            assert_eq!(ea.id, eb.id);
            assert_eq!(ea.position, eb.position);
            assert_eq!(ea.patrol_target, eb.patrol_target);
        }
        assert_eq!(a.player.position, b.player.position);
        assert_eq!(a.drain_events(), b.drain_events());
    }
}
