//! Per-frame grenade flight
//!
//! Ballistic arc with a ground clamp. A grenade goes off when its fuse runs
//! out or the moment it touches an obstacle.

use super::collision::Probe;
use super::state::{EntityId, World};
use crate::consts::GRAVITY;

/// Advance one grenade by `dt`. Unknown ids are ignored.
pub fn update(world: &mut World, id: EntityId, dt: f32) {
    let Some(grenade) = world.grenades.iter().find(|g| g.id == id) else {
        return;
    };
    if grenade.fuse <= 0.0 {
        return;
    }

    let mut velocity = grenade.velocity;
    let mut position = grenade.position + velocity * dt;
    let fuse = grenade.fuse - dt;
    velocity.y -= GRAVITY * dt;

    let ground = world.tuning.weapons.grenade_ground;
    if position.y < ground {
        position.y = ground;
        velocity.y = 0.0;
    }

    if world.obstacles.blocks(position, Probe::GRENADE) {
        log::debug!("Grenade {} hit an obstacle", id);
        world.explode_grenade(id);
        return;
    }

    world.update_grenade(id, position, velocity, fuse);
    if fuse <= 0.0 {
        world.explode_grenade(id);
    }
}

/// Advance every grenade alive at the start of the frame
pub fn update_all(world: &mut World, dt: f32) {
    let ids: Vec<EntityId> = world.grenades.iter().map(|g| g.id).collect();
    for id in ids {
        update(world, id, dt);
    }
}
