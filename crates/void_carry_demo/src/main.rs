//! Void Carry Demo
//!
//! Headless run of the carry controller in a small Rapier room. A fixed
//! script looks around, picks things up, carries, throws and drops them, and
//! tries a couple of pickups that must be refused. Everything that happens is
//! logged.
//!
//! Run with: cargo run -p void_carry_demo
//!      or: RUST_LOG=debug VOID_CARRY_FIX=make_kinematic cargo run --bin carry-demo

mod demo_config;
mod scene;

use demo_config::DemoConfig;
use scene::DemoScene;
use void_carry::{CarryController, CarryEvent, CarryIntent, Viewer};
use void_carry_physics::PhysicsWorld;

/// What the script does on a given frame
fn script(frame: u32, scene: &DemoScene) -> (Option<Viewer>, CarryIntent) {
    match frame {
        0..=29 => (scene.look_at(scene.crate_box), CarryIntent::NONE),
        30 => (scene.look_at(scene.crate_box), CarryIntent::pickup()),
        90 => (scene.look_ahead(), CarryIntent::adjust(0.25)),
        150 => (scene.look_ahead(), CarryIntent::throw()),
        151..=209 => (scene.look_at(scene.barrel), CarryIntent::NONE),
        210 => (scene.look_at(scene.barrel), CarryIntent::pickup()),
        270 => (scene.look_ahead(), CarryIntent::pickup()),
        271..=299 => (scene.look_at(scene.anvil), CarryIntent::NONE),
        300 => (scene.look_at(scene.anvil), CarryIntent::pickup()),
        301..=329 => (scene.look_at(scene.statue), CarryIntent::NONE),
        330 => (scene.look_at(scene.statue), CarryIntent::pickup()),
        // Camera detached for a moment
        331..=359 => (None, CarryIntent::NONE),
        _ => (scene.look_ahead(), CarryIntent::NONE),
    }
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DemoConfig::load();
    config.print_summary();

    if let Err(err) = run(&config) {
        log::error!("Carry demo failed: {}", err);
        std::process::exit(1);
    }
}

fn run(config: &DemoConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;

    let mut scene = DemoScene::build(config)?;
    let mut carry = CarryController::<PhysicsWorld>::new(config.carry.clone(), scene.player_colliders.clone())?;
    let dt = config.physics.timestep;
    let mut player_contacts = 0usize;

    for frame in 0..config.frames {
        let (viewer, intent) = script(frame, &scene);
        carry.step(&mut scene.physics, viewer, &intent, dt);
        scene.physics.step(dt);

        for event in carry.drain_events() {
            log_event(frame, &event);
        }

        if let Some(held) = carry.held_body() {
            let held_colliders = scene.physics.body_colliders(held);
            for contact in scene.physics.contacts().began_between(&scene.player_colliders, &held_colliders) {
                log::warn!("[{:>4}] held body touched the player ({:?})", frame, contact);
                player_contacts += 1;
            }
        }
    }

    if player_contacts > 0 {
        log::warn!("Held bodies touched the player {} times", player_contacts);
    }
    log::info!("Finished after {} frames in phase {:?}", config.frames, carry.phase());
    for (name, body) in [
        ("crate", scene.crate_box),
        ("barrel", scene.barrel),
        ("anvil", scene.anvil),
        ("statue", scene.statue),
    ] {
        if let Ok(pose) = scene.physics.body_pose(body) {
            let p = pose.position;
            log::info!("  {:<7} at ({:.2}, {:.2}, {:.2})", name, p.x, p.y, p.z);
        }
    }
    Ok(())
}

fn log_event<B: std::fmt::Debug>(frame: u32, event: &CarryEvent<B>) {
    match event {
        CarryEvent::LockOnChanged { candidate } => {
            log::debug!("[{:>4}] lock-on: {:?}", frame, candidate)
        }
        CarryEvent::Thrown { body, velocity } => log::info!(
            "[{:>4}] thrown {:?} at {:.1} m/s",
            frame,
            body,
            velocity.length()
        ),
        other => log::info!("[{:>4}] {:?}", frame, other),
    }
}
