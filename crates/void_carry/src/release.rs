//! Drop and throw

use crate::backend::{CarryBackend, Viewer};
use crate::config::CarryConfig;
use crate::error::Result;
use crate::session::CarrySession;
use glam::Vec3;

/// Throw speed for a body of `mass` moving at `carried_speed`.
///
/// The force is `base + speed * bonus` clamped into `[base, max]`, then
/// divided by mass. Non-positive masses are treated as 1.
pub fn throw_speed(carried_speed: f32, mass: f32, config: &CarryConfig) -> f32 {
    let force = (config.base_throw_force + carried_speed.max(0.0) * config.throw_speed_bonus)
        .clamp(config.base_throw_force, config.max_throw_force);
    let mass = if mass > 0.0 { mass } else { 1.0 };
    force / mass
}

/// Reverse the collision fix, then restore the saved properties.
///
/// Returns the released body. If it no longer exists nothing is touched.
pub fn drop_body<W: CarryBackend>(world: &mut W, session: CarrySession<W::Body, W::Collider>) -> Result<W::Body> {
    let (body, saved, fix) = session.into_parts();
    if !world.contains_body(body) {
        return Ok(body);
    }
    fix.reverse(world, body)?;
    saved.restore(world, body)?;
    Ok(body)
}

/// Release like [`drop_body`], then launch the body along the view direction.
///
/// The speed uses the mass captured at pickup.
///
/// Returns the body and the velocity it was given.
pub fn throw_body<W: CarryBackend>(
    world: &mut W,
    session: CarrySession<W::Body, W::Collider>,
    viewer: &Viewer,
    config: &CarryConfig,
) -> Result<(W::Body, Vec3)> {
    let state = world.body_state(session.body())?;
    let speed = throw_speed(state.linear_velocity.length(), session.mass(), config);

    let body = drop_body(world, session)?;
    let velocity = viewer.forward * speed;
    world.set_linear_velocity(body, velocity)?;
    Ok((body, velocity))
}
