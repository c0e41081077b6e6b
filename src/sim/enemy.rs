//! Enemy behavior
//!
//! Two states. Patrolling enemies wander between random points around a
//! fixed anchor. Once the player comes within aggro range (or shoots them)
//! they chase for the rest of their life, firing from range and striking in
//! melee on independent cooldowns. Movement that would clip an obstacle is
//! simply skipped for that frame.

use glam::{Vec2, Vec3};

use super::collision::Probe;
use super::state::{Enemy, EnemyUpdate, EntityId, World};
use crate::{planar, planar_distance, yaw_towards};

/// Advance one enemy by `dt`. Dead or unknown enemies are ignored.
pub fn update(world: &mut World, id: EntityId, dt: f32) {
    let Some(enemy) = world.enemy(id).filter(|e| e.is_alive()).cloned() else {
        return;
    };

    let player = world.player.position;
    let distance = planar_distance(enemy.position, player);
    let mut update = EnemyUpdate::default();

    if !enemy.is_aggro && distance < world.tuning.enemy.aggro_range {
        log::debug!("Enemy {} spotted the player at {:.1}m", id, distance);
        update.is_aggro = Some(true);
    }

    if enemy.is_aggro || update.is_aggro == Some(true) {
        chase(world, &enemy, player, distance, dt, &mut update);
    } else {
        patrol(world, &enemy, dt, &mut update);
    }

    world.update_enemy(id, update);
}

/// Advance every enemy
pub fn update_all(world: &mut World, dt: f32) {
    let ids: Vec<EntityId> = world.enemies.iter().map(|e| e.id).collect();
    for id in ids {
        update(world, id, dt);
    }
}

fn chase(world: &mut World, enemy: &Enemy, player: Vec3, distance: f32, dt: f32, update: &mut EnemyUpdate) {
    let tuning = world.tuning.enemy.clone();

    let dir = (planar(player) - planar(enemy.position)).normalize_or_zero();
    if dir != Vec2::ZERO {
        update.heading = Some(yaw_towards(dir));
    }
    step(world, enemy, dir, tuning.chase_speed * dt, tuning.walk_height, update);

    let mut shoot_cooldown = (enemy.shoot_cooldown - dt).max(0.0);
    if distance < tuning.shoot_range && shoot_cooldown <= 0.0 {
        let muzzle = enemy.position + tuning.muzzle_offset;
        let aim = (player - enemy.position).normalize_or_zero();
        world.shoot_enemy(muzzle, aim);
        log::trace!("Enemy {} fired", enemy.id);
        shoot_cooldown = tuning.shoot_cooldown;
    }
    update.shoot_cooldown = Some(shoot_cooldown);

    let mut attack_cooldown = (enemy.attack_cooldown - dt).max(0.0);
    if distance < tuning.attack_range && attack_cooldown <= 0.0 {
        log::debug!("Enemy {} struck the player", enemy.id);
        world.damage_player(tuning.melee_damage);
        attack_cooldown = tuning.attack_cooldown;
    }
    update.attack_cooldown = Some(attack_cooldown);
}

fn patrol(world: &mut World, enemy: &Enemy, dt: f32, update: &mut EnemyUpdate) {
    let tuning = &world.tuning.enemy;
    let (arrival, wander, speed, height) = (
        tuning.patrol_arrival,
        tuning.patrol_wander,
        tuning.patrol_speed,
        tuning.walk_height,
    );

    let to_target = planar(enemy.patrol_target) - planar(enemy.position);
    if to_target.length() < arrival {
        let offset = world.roll_offset(wander);
        let spot = enemy.patrol_anchor + offset;
        update.patrol_target = Some(Vec3::new(spot.x, enemy.patrol_target.y, spot.y));
        return;
    }

    let dir = to_target.normalize_or_zero();
    update.heading = Some(yaw_towards(dir));
    step(world, enemy, dir, speed * dt, height, update);
}

/// Move `distance` along planar `dir` unless that lands inside an obstacle
fn step(world: &World, enemy: &Enemy, dir: Vec2, distance: f32, height: f32, update: &mut EnemyUpdate) {
    let delta = dir * distance;
    let candidate = Vec3::new(enemy.position.x + delta.x, height, enemy.position.z + delta.y);
    if !world.obstacles.blocks(candidate, Probe::WALKER) {
        update.position = Some(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::{CoverBox, Obstacles};
    use crate::sim::state::BulletOwner;
    use crate::tuning::Tuning;

    /// Open world with one enemy at `at` and the player at `player`
    fn duel(at: Vec3, player: Vec3) -> (World, EntityId) {
        let mut world = World::with_config(4, Tuning::default(), Obstacles::empty());
        world.start();
        world.enemies.truncate(1);
        world.enemies[0].position = at;
        world.player.position = player;
        let id = world.enemies[0].id;
        (world, id)
    }

    fn enemy(world: &World, id: EntityId) -> &Enemy {
        world.enemy(id).expect("enemy exists")
    }

    #[test]
    fn test_patrol_walks_toward_target() {
        let (mut world, id) = duel(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.7, 100.0));
        world.enemies[0].patrol_target = Vec3::new(10.0, 1.0, 0.0);
        update(&mut world, id, 0.5);
        let e = enemy(&world, id);
        assert!((e.position - Vec3::new(1.0, 0.3, 0.0)).length() < 1e-5);
        assert!(!e.is_aggro);
        assert!(world.bullets.is_empty());
    }

    #[test]
    fn test_arrival_rolls_new_target_near_anchor() {
        let (mut world, id) = duel(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.7, 100.0));
        world.enemies[0].patrol_target = Vec3::new(0.5, 1.0, 0.0);
        let anchor = world.enemies[0].patrol_anchor;
        for _ in 0..20 {
            let here = enemy(&world, id).position;
            world.enemies[0].patrol_target = here;
            update(&mut world, id, 0.1);
            let e = enemy(&world, id);
            // Arrival frame picks a target but does not move
            assert_eq!(e.position, here);
            assert!((e.patrol_target.x - anchor.x).abs() <= 5.0);
            assert!((e.patrol_target.z - anchor.y).abs() <= 5.0);
        }
    }

    #[test]
    fn test_aggro_is_permanent() {
        let (mut world, id) = duel(Vec3::new(0.0, 0.3, 0.0), Vec3::new(0.0, 1.7, 14.0));
        update(&mut world, id, 0.01);
        assert!(enemy(&world, id).is_aggro);

        world.player.position = Vec3::new(0.0, 1.7, 500.0);
        update(&mut world, id, 0.01);
        assert!(enemy(&world, id).is_aggro);
    }

    #[test]
    fn test_aggro_uses_planar_distance() {
        // 14.9m away on the ground, far above: still inside aggro range
        let (mut world, id) = duel(Vec3::new(0.0, 0.3, 0.0), Vec3::new(0.0, 40.0, 14.9));
        update(&mut world, id, 0.01);
        assert!(enemy(&world, id).is_aggro);
    }

    #[test]
    fn test_chase_moves_at_chase_speed_and_faces_player() {
        let (mut world, id) = duel(Vec3::new(0.0, 0.3, 0.0), Vec3::new(0.0, 1.7, 30.0));
        world.enemies[0].is_aggro = true;
        update(&mut world, id, 0.5);
        let e = enemy(&world, id);
        assert!((e.position - Vec3::new(0.0, 0.3, 2.0)).length() < 1e-5);
        // Facing +Z is a half turn
        assert!((e.heading.abs() - std::f32::consts::PI).abs() < 1e-5);
        // Out of shooting range
        assert!(world.bullets.is_empty());
    }

    #[test]
    fn test_ranged_fire_on_cooldown() {
        let (mut world, id) = duel(Vec3::new(0.0, 0.3, 0.0), Vec3::new(0.0, 1.7, 10.0));
        update(&mut world, id, 0.1);
        assert_eq!(world.bullets.len(), 1);
        let bullet = &world.bullets[0];
        assert_eq!(bullet.owner, BulletOwner::Enemy);
        assert!((bullet.position - Vec3::new(0.35, 1.3, 0.0)).length() < 1e-5);
        assert!(bullet.direction.z > 0.9);

        // Nothing more until 2.5s have passed
        world.bullets.clear();
        for _ in 0..24 {
            world.enemies[0].position = Vec3::new(0.0, 0.3, 0.0);
            update(&mut world, id, 0.1);
        }
        assert!(world.bullets.is_empty());
        world.enemies[0].position = Vec3::new(0.0, 0.3, 0.0);
        update(&mut world, id, 0.11);
        assert_eq!(world.bullets.len(), 1);
    }

    #[test]
    fn test_melee_and_ranged_in_same_frame() {
        let (mut world, id) = duel(Vec3::new(0.0, 0.3, 0.0), Vec3::new(0.0, 1.7, 1.5));
        update(&mut world, id, 0.01);
        assert_eq!(world.bullets.len(), 1);
        assert_eq!(world.player_health, 90);

        // Melee again only after 1.5s
        world.enemies[0].position = Vec3::new(0.0, 0.3, 0.0);
        world.enemies[0].attack_cooldown = 0.05;
        update(&mut world, id, 0.01);
        assert_eq!(world.player_health, 90);
        world.enemies[0].position = Vec3::new(0.0, 0.3, 0.0);
        update(&mut world, id, 0.05);
        assert_eq!(world.player_health, 80);
    }

    #[test]
    fn test_blocked_step_stalls() {
        let obstacles = Obstacles {
            covers: vec![CoverBox::new(0.0, 1.0, 4.0, 2.0, 0.5)],
            ..Obstacles::empty()
        };
        let mut world = World::with_config(4, Tuning::default(), obstacles);
        world.start();
        world.enemies.truncate(1);
        world.enemies[0].position = Vec3::new(0.0, 0.3, 0.0);
        world.enemies[0].is_aggro = true;
        world.player.position = Vec3::new(0.0, 1.7, 30.0);
        let id = world.enemies[0].id;

        update(&mut world, id, 0.1);
        let e = enemy(&world, id);
        assert_eq!(e.position, Vec3::new(0.0, 0.3, 0.0));
        assert!(e.heading.abs() > 3.0);
    }

    #[test]
    fn test_blocked_patrol_step_stalls() {
        let obstacles = Obstacles {
            covers: vec![CoverBox::new(0.0, 1.0, 4.0, 2.0, 0.5)],
            ..Obstacles::empty()
        };
        let mut world = World::with_config(4, Tuning::default(), obstacles);
        world.start();
        world.enemies.truncate(1);
        world.enemies[0].position = Vec3::new(0.0, 0.3, 0.0);
        world.enemies[0].patrol_target = Vec3::new(0.0, 0.3, 10.0);
        // Far outside aggro range
        world.player.position = Vec3::new(0.0, 1.7, 100.0);
        let id = world.enemies[0].id;

        // A full step would put the walker inside the crate's padded footprint
        update(&mut world, id, 0.5);
        let e = enemy(&world, id);
        assert!(!e.is_aggro);
        assert_eq!(e.position, Vec3::new(0.0, 0.3, 0.0));
        assert_eq!(e.patrol_target, Vec3::new(0.0, 0.3, 10.0));
        assert!(e.heading.abs() > 3.0);

        // Turning away clears the obstacle again
        world.enemies[0].patrol_target = Vec3::new(0.0, 0.3, -10.0);
        update(&mut world, id, 0.5);
        assert!((enemy(&world, id).position - Vec3::new(0.0, 0.3, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_dead_enemy_does_nothing() {
        let (mut world, id) = duel(Vec3::new(0.0, 0.3, 0.0), Vec3::new(0.0, 1.7, 1.0));
        world.damage_enemy(id, 100);
        update(&mut world, id, 0.1);
        assert!(world.bullets.is_empty());
        assert_eq!(world.player_health, 100);
        assert_eq!(enemy(&world, id).position, Vec3::new(0.0, 0.3, 0.0));
    }
}
