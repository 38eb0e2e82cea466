//! Driving a held body toward the hold pose
//!
//! The force drive is a spring-damper on position plus a spring-damper on
//! orientation. Both terms are scaled by a clamped inverse mass so light and
//! heavy bodies respond alike, and the linear force is capped so a large
//! displacement never turns into a large acceleration spike.

use crate::backend::{BodyState, CarryBackend, Pose, Viewer};
use crate::config::CarryConfig;
use crate::error::Result;
use crate::session::CarrySession;
use glam::{Mat3, Quat, Vec3};
use std::f32::consts::{PI, TAU};

/// Lower bound of the inverse-mass response scale
pub const MASS_SCALER_MIN: f32 = 0.1;
/// Upper bound of the inverse-mass response scale
pub const MASS_SCALER_MAX: f32 = 2.0;

/// Leveled directions shorter than this have no usable heading
const MIN_HEADING_LENGTH: f32 = 1e-4;

/// Where the held body should be this step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldTarget {
    /// Desired position
    pub position: Vec3,
    /// Desired orientation, `None` when the body sits on the viewer's vertical axis
    pub rotation: Option<Quat>,
}

impl HoldTarget {
    /// Target pose, keeping `fallback` when there is no orientation target
    pub fn pose_or(&self, fallback: Quat) -> Pose {
        Pose::new(self.position, self.rotation.unwrap_or(fallback))
    }
}

/// Inverse mass clamped to `[0.1, 2.0]`
pub fn mass_scaler(mass: f32) -> f32 {
    if mass > 0.0 {
        (1.0 / mass).clamp(MASS_SCALER_MIN, MASS_SCALER_MAX)
    } else {
        MASS_SCALER_MAX
    }
}

/// Orientation facing away from the viewer on the horizontal plane, upright.
///
/// Returns `None` when the body is directly above or below the viewer.
pub fn upright_facing(body_position: Vec3, viewer_position: Vec3) -> Option<Quat> {
    let mut to_viewer = viewer_position - body_position;
    to_viewer.y = 0.0;
    if to_viewer.length() < MIN_HEADING_LENGTH {
        return None;
    }
    let forward = -to_viewer.normalize();
    let up = Vec3::Y;
    let right = up.cross(forward).normalize();
    Some(Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize())
}

/// Hold target for a body currently at `body_position`
pub fn hold_target(viewer: &Viewer, body_position: Vec3, hold_distance: f32) -> HoldTarget {
    HoldTarget {
        position: viewer.point_at(hold_distance),
        rotation: upright_facing(body_position, viewer.position),
    }
}

/// Spring-damper force toward the target, capped at `pickup_force * 2 * scaler`
pub fn spring_force(displacement: Vec3, velocity: Vec3, mass: f32, config: &CarryConfig) -> Vec3 {
    let scaler = mass_scaler(mass);
    let spring = displacement * config.pickup_force * scaler;
    let damping = -velocity * config.damping_force * scaler;
    (spring + damping).clamp_length_max(config.pickup_force * 2.0 * scaler)
}

/// Shortest rotation from `current` to `desired` as (unit axis, signed radians)
pub fn shortest_arc(current: Quat, desired: Quat) -> (Vec3, f32) {
    let delta = (desired * current.inverse()).normalize();
    let (axis, mut angle) = delta.to_axis_angle();
    if angle > PI {
        angle -= TAU;
    }
    (axis, angle)
}

/// Spring-damper torque rotating `current` toward `desired`
pub fn correction_torque(
    current: Quat,
    desired: Quat,
    angular_velocity: Vec3,
    mass: f32,
    config: &CarryConfig,
) -> Vec3 {
    let scaler = mass_scaler(mass);
    let (axis, angle) = shortest_arc(current, desired);
    axis * angle * config.rotation_force * scaler
        - angular_velocity * config.rotation_damping * scaler
}

/// Run one hold step for the session's body and return the target it was
/// driven toward. `state` is the body's current state; its mass is ignored in
/// favour of the session's.
pub fn drive<W: CarryBackend>(
    world: &mut W,
    session: &CarrySession<W::Body, W::Collider>,
    state: &BodyState,
    viewer: &Viewer,
    dt: f32,
    config: &CarryConfig,
) -> Result<HoldTarget> {
    let body = session.body();
    let target = hold_target(viewer, state.pose.position, session.hold_distance());

    if config.collision_fix.is_kinematic_drive() {
        drive_kinematic(world, body, state, &target, dt, config)?;
    } else {
        drive_force(world, body, state, session.mass(), &target, config)?;
    }
    Ok(target)
}

fn drive_kinematic<W: CarryBackend>(
    world: &mut W,
    body: W::Body,
    state: &BodyState,
    target: &HoldTarget,
    dt: f32,
    config: &CarryConfig,
) -> Result<()> {
    let follow = (config.kinematic_follow_rate * dt).clamp(0.0, 1.0);
    let turn = (config.kinematic_rotation_rate * dt).clamp(0.0, 1.0);

    let position = state.pose.position.lerp(target.position, follow);
    let rotation = match target.rotation {
        Some(desired) => state.pose.rotation.slerp(desired, turn).normalize(),
        None => state.pose.rotation,
    };
    world.move_kinematic(body, Pose::new(position, rotation))
}

fn drive_force<W: CarryBackend>(
    world: &mut W,
    body: W::Body,
    state: &BodyState,
    mass: f32,
    target: &HoldTarget,
    config: &CarryConfig,
) -> Result<()> {
    let displacement = target.position - state.pose.position;
    let force = spring_force(displacement, state.linear_velocity, mass, config);
    world.add_force(body, force)?;

    if let Some(desired) = target.rotation {
        let torque = correction_torque(
            state.pose.rotation,
            desired,
            state.angular_velocity,
            mass,
            config,
        );
        world.add_torque(body, torque)?;
    }
    Ok(())
}
