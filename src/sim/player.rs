//! Player movement and attacks
//!
//! Only the parts of the player that touch the world: walking with obstacle
//! checks, jumping, the rifle, the spear, grenades and ammo pickup. Device
//! handling stays with the driver, which hands us a [`TickInput`].

use glam::{Quat, Vec2, Vec3};

use super::collision::Probe;
use super::events::GameEvent;
use super::state::{EntityId, GamePhase, Weapon, World};
use super::tick::TickInput;
use crate::consts::GRAVITY;

/// Apply one frame of input and physics to the player
pub fn update(world: &mut World, input: &TickInput, dt: f32) {
    // Controls only respond during play; physics keeps running
    let idle = TickInput::default();
    let input = if world.phase == GamePhase::Playing { input } else { &idle };

    look(world, input.look);

    if input.switch_weapon {
        world.switch_weapon();
    }
    if input.jump {
        jump(world);
    }
    if input.fire {
        attack(world);
    }
    if input.throw_grenade {
        throw_grenade(world);
    }

    walk(world, input, dt);
    fall(world, dt);
    collect_pickups(world);
}

/// Turn the head by (yaw, pitch) radians
fn look(world: &mut World, delta: Vec2) {
    let max_pitch = world.tuning.player.max_pitch;
    let player = &mut world.player;
    player.yaw = crate::normalize_angle(player.yaw + delta.x);
    player.pitch = (player.pitch + delta.y).clamp(-max_pitch, max_pitch);
}

fn jump(world: &mut World) {
    let eye = world.tuning.player.eye_height;
    let impulse = world.tuning.player.jump_impulse;
    let player = &mut world.player;
    if player.airborne || player.position.y > eye {
        return;
    }
    player.vertical_velocity = impulse;
    player.airborne = true;
    world.push_event(GameEvent::Jumped);
}

/// Horizontal movement. Each axis is checked on its own so the player
/// slides along obstacles instead of sticking to them.
fn walk(world: &mut World, input: &TickInput, dt: f32) {
    let tuning = &world.tuning.player;
    let (speed, decay, boundary) = (tuning.move_speed, tuning.skid_decay, tuning.boundary);

    let mut wish = Vec2::ZERO;
    if input.forward {
        wish.y -= 1.0;
    }
    if input.back {
        wish.y += 1.0;
    }
    if input.left {
        wish.x -= 1.0;
    }
    if input.right {
        wish.x += 1.0;
    }

    let player = &mut world.player;
    if wish != Vec2::ZERO {
        let wish = wish.normalize();
        let dir = Quat::from_rotation_y(player.yaw) * Vec3::new(wish.x, 0.0, wish.y);
        player.velocity.x = dir.x * speed;
        player.velocity.z = dir.z * speed;
    } else {
        player.velocity.x *= decay;
        player.velocity.z *= decay;
    }

    let pos = player.position;
    let new_x = pos.x + player.velocity.x * dt;
    let new_z = pos.z + player.velocity.z * dt;

    let x = if world.obstacles.blocks(Vec3::new(new_x, pos.y, pos.z), Probe::WALKER) {
        pos.x
    } else {
        new_x.clamp(-boundary, boundary)
    };
    let z = if world.obstacles.blocks(Vec3::new(pos.x, pos.y, new_z), Probe::WALKER) {
        pos.z
    } else {
        new_z.clamp(-boundary, boundary)
    };

    world.player.position.x = x;
    world.player.position.z = z;
}

/// Gravity and landing
fn fall(world: &mut World, dt: f32) {
    let eye = world.tuning.player.eye_height;
    let player = &mut world.player;
    player.vertical_velocity -= GRAVITY * dt;
    if player.position.y + player.vertical_velocity * dt <= eye {
        player.position.y = eye;
        player.vertical_velocity = 0.0;
        player.airborne = false;
    } else {
        player.position.y += player.vertical_velocity * dt;
    }
}

/// Fire or thrust with whatever is in hand
fn attack(world: &mut World) {
    match world.current_weapon {
        Weapon::Rifle => {
            let origin = world.player.position;
            let facing = world.player.facing();
            world.shoot_rifle(origin, facing);
        }
        Weapon::Spear => {
            spear_attack(world);
        }
    }
}

/// Stab every live enemy in reach and inside the forward cone. Returns the
/// number of enemies hit.
pub fn spear_attack(world: &mut World) -> u32 {
    let origin = world.player.position;
    let facing = world.player.facing();
    let tuning = &world.tuning.player;
    let (range, cone, damage) = (tuning.spear_range, tuning.spear_cone, tuning.spear_damage);

    let victims: Vec<EntityId> = world
        .live_enemies()
        .filter(|e| {
            let to_enemy = e.position - origin;
            to_enemy.length() < range && facing.dot(to_enemy.normalize_or_zero()) > cone
        })
        .map(|e| e.id)
        .collect();

    let hits = victims.len() as u32;
    for id in victims {
        world.damage_enemy(id, damage);
    }
    log::debug!("Spear swing hit {} enemies", hits);
    world.push_event(GameEvent::SpearSwing { hits });
    hits
}

fn throw_grenade(world: &mut World) -> Option<EntityId> {
    let origin = world.player.position - Vec3::new(0.0, world.tuning.player.throw_drop, 0.0);
    let facing = world.player.facing();
    world.throw_grenade(origin, facing)
}

/// Pick up any ammo within reach of the player's eye
pub fn collect_pickups(world: &mut World) {
    let eye = world.player.position;
    let radius = world.tuning.player.pickup_radius;
    let reachable: Vec<EntityId> = world
        .ammo_pickups
        .iter()
        .filter(|p| p.position.distance(eye) < radius)
        .map(|p| p.id)
        .collect();
    for id in reachable {
        world.collect_ammo(id);
    }
}
