//! Village Defense entry point
//!
//! Headless driver: runs one autopilot session on the fixed-timestep loop,
//! logs what happens and prints the final HUD as JSON.
//!
//! Usage: `village-defense [seed] [tuning.json]`

use std::process::ExitCode;

use anyhow::Result;
use village_defense::Tuning;
use village_defense::consts::{MAX_SUBSTEPS, SIM_DT};
use village_defense::sim::{GameEvent, Obstacles, TickInput, World, tick};

/// Display refresh the driver pretends to run at
const FRAME_DT: f32 = 1.0 / 60.0;
/// Give up on sessions that never end
const MAX_SESSION_SECS: f32 = 600.0;

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Village Defense (headless) starting...");

    let mut args = std::env::args().skip(1);

    let seed = match args.next() {
        Some(arg) => match arg.parse::<u64>() {
            Ok(seed) => seed,
            Err(e) => {
                log::error!("Seed must be an unsigned integer, got {arg:?}: {e}");
                return ExitCode::from(2);
            }
        },
        None => 12345,
    };

    let tuning = match args.next() {
        Some(path) => match load_tuning(&path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("{e:#}");
                return ExitCode::FAILURE;
            }
        },
        None => Tuning::default(),
    };

    let mut world = World::with_config(seed, tuning, Obstacles::village());
    world.start();
    run(&mut world);

    match serde_json::to_string_pretty(&world.hud()) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            log::error!("Failed to serialize HUD: {e}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

fn load_tuning(path: &str) -> Result<Tuning> {
    let tuning = Tuning::load(path)?;
    log::info!("Loaded tuning from {path}");
    Ok(tuning)
}

/// Step the world frame by frame until the session ends
fn run(world: &mut World) {
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };

    let mut accumulator: f32 = 0.0;
    let mut elapsed: f32 = 0.0;
    while !world.phase.is_over() && elapsed < MAX_SESSION_SECS {
        accumulator += FRAME_DT;
        elapsed += FRAME_DT;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(world, &input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;
        }

        for event in world.drain_events() {
            report(&event);
        }
    }

    if world.phase.is_over() {
        log::info!("Session ended in {:?} after {:.1}s", world.phase, world.clock());
    } else {
        log::warn!("Session still running after {MAX_SESSION_SECS}s, stopping");
    }
}

fn report(event: &GameEvent) {
    match event {
        GameEvent::EnemyKilled { kills, total, .. } => log::info!("Kill {kills}/{total}"),
        GameEvent::PlayerHit { health, .. } => log::info!("Player hit, health {health}"),
        GameEvent::PhaseChanged { .. } => {}
        other if other.is_hit_confirm() => log::debug!("Hit: {other:?}"),
        other => log::trace!("{other:?}"),
    }
}
