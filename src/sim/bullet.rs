//! Per-frame bullet flight
//!
//! Bullets fly in a straight line. Each frame they age, probe their next
//! position against the level, then against whatever their owner can hit.

use super::collision::Probe;
use super::state::{BulletOwner, EntityId, World};

/// Advance one bullet by `dt`. Unknown ids are ignored.
pub fn update(world: &mut World, id: EntityId, dt: f32) {
    let Some(bullet) = world.bullets.iter().find(|b| b.id == id) else {
        return;
    };
    let (position, direction, speed, owner) =
        (bullet.position, bullet.direction, bullet.speed, bullet.owner);

    let age = bullet.age + dt;
    if age > world.tuning.weapons.bullet_lifetime {
        world.remove_bullet(id);
        return;
    }

    let next = position + direction * speed * dt;

    if world.obstacles.blocks(next, Probe::BULLET) {
        world.remove_bullet(id);
        return;
    }

    let weapons = &world.tuning.weapons;
    match owner {
        BulletOwner::Enemy => {
            if next.distance(world.player.position) < weapons.enemy_hit_radius {
                let damage = weapons.enemy_bullet_damage;
                log::debug!("Enemy bullet {} hit the player", id);
                world.damage_player(damage);
                world.remove_bullet(id);
                return;
            }
        }
        BulletOwner::Player => {
            // First live enemy in spawn order takes the hit
            let victim = world
                .live_enemies()
                .find(|e| next.distance(e.position) < weapons.rifle_hit_radius)
                .map(|e| e.id);
            if let Some(enemy_id) = victim {
                let damage = weapons.rifle_damage;
                log::debug!("Bullet {} hit enemy {}", id, enemy_id);
                world.damage_enemy(enemy_id, damage);
                world.remove_bullet(id);
                return;
            }
        }
    }

    if next.y < 0.0 {
        world.remove_bullet(id);
        return;
    }

    world.update_bullet(id, next, age);
}

/// Advance every bullet alive at the start of the frame
pub fn update_all(world: &mut World, dt: f32) {
    let ids: Vec<EntityId> = world.bullets.iter().map(|b| b.id).collect();
    for id in ids {
        update(world, id, dt);
    }
}
