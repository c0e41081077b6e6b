//! Per-frame shockwave expansion
//!
//! An explosion is a thin spherical shell growing from its start radius to
//! its max radius over a fixed time, whatever the size. Enemies take the
//! damage once, when the shell reaches them. The shell is swept between
//! frames so a long frame cannot skip over anyone.

use super::state::{EntityId, World};

/// Advance one explosion by `dt`. Unknown ids are ignored.
pub fn update(world: &mut World, id: EntityId, dt: f32) {
    let Some(explosion) = world.explosions.iter().find(|e| e.id == id) else {
        return;
    };
    let center = explosion.position;
    let damage = explosion.damage;
    let previous_radius = explosion.radius;
    let mut hit_enemies = explosion.hit_enemies.clone();

    let progress = explosion.progress + dt * world.tuning.weapons.explosion_rate;
    let radius = explosion.start_radius
        + (explosion.max_radius - explosion.start_radius) * progress.min(1.0);

    let thickness = world.tuning.weapons.shockwave_thickness;
    let inner = previous_radius - thickness;
    let outer = radius + thickness;
    let victims: Vec<EntityId> = world
        .live_enemies()
        .filter(|e| !hit_enemies.contains(&e.id))
        .filter(|e| {
            let distance = e.position.distance(center);
            distance >= inner && distance <= outer
        })
        .map(|e| e.id)
        .collect();

    for enemy_id in victims {
        log::debug!("Shockwave {} hit enemy {}", id, enemy_id);
        world.damage_enemy(enemy_id, damage);
        hit_enemies.insert(enemy_id);
    }

    world.update_explosion(id, radius, progress, hit_enemies);
    if progress >= 1.0 {
        world.remove_explosion(id);
    }
}

/// Advance every explosion alive at the start of the frame
pub fn update_all(world: &mut World, dt: f32) {
    let ids: Vec<EntityId> = world.explosions.iter().map(|e| e.id).collect();
    for id in ids {
        update(world, id, dt);
    }
}
