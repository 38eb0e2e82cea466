//! The world seen from the carry controller
//!
//! The controller never owns bodies. Everything it reads or mutates goes
//! through [`CarryBackend`], keyed by handles the backend hands out. Handles
//! are expected to be generational: once a body is removed, its handle must
//! stop resolving instead of aliasing a new body.

use crate::error::Result;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// World-space position and orientation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position in world space
    pub position: Vec3,
    /// Orientation in world space
    pub rotation: Quat,
}

impl Pose {
    /// Create a pose
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Pose at `position` with identity orientation
    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

/// The viewer (eye/camera) of the carrier for one step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewer {
    /// Eye position
    pub position: Vec3,
    /// Unit view direction
    pub forward: Vec3,
}

impl Viewer {
    /// Create a viewer; `forward` is normalized, falling back to -Z when degenerate
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self {
            position,
            forward: forward.try_normalize().unwrap_or(Vec3::NEG_Z),
        }
    }

    /// Point `distance` units along the view direction
    pub fn point_at(&self, distance: f32) -> Vec3 {
        self.position + self.forward * distance
    }
}

/// First collider struck by a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit<C> {
    /// The collider that was hit
    pub collider: C,
    /// Distance from the ray origin
    pub distance: f32,
}

/// Snapshot of everything the controller reads from a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    /// Mass in kilograms
    pub mass: f32,
    /// Linear velocity
    pub linear_velocity: Vec3,
    /// Angular velocity (axis scaled by radians per second)
    pub angular_velocity: Vec3,
    /// Linear drag
    pub linear_drag: f32,
    /// Angular drag
    pub angular_drag: f32,
    /// Whether gravity acts on the body
    pub use_gravity: bool,
    /// Whether the body is driven by position rather than forces
    pub is_kinematic: bool,
    /// Layer index
    pub layer: u32,
    /// World pose
    pub pose: Pose,
}

/// Access to bodies, colliders and queries of the simulated world
pub trait CarryBackend {
    /// Weak handle to a rigid body
    type Body: Copy + Eq + Hash + Debug;
    /// Weak handle to a collider
    type Collider: Copy + Eq + Hash + Debug;

    // ==================== Queries ====================

    /// Cast a ray and return the nearest hit among colliders whose layer is in `mask`
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: u32,
        exclude: &[Self::Collider],
    ) -> Option<RayHit<Self::Collider>>;

    /// Body a collider is attached to
    fn body_of(&self, collider: Self::Collider) -> Option<Self::Body>;

    /// Whether the body still exists
    fn contains_body(&self, body: Self::Body) -> bool;

    /// Read the physical state of a body
    fn body_state(&self, body: Self::Body) -> Result<BodyState>;

    /// Whether the body carries `tag`
    fn has_tag(&self, body: Self::Body, tag: &str) -> bool;

    /// Colliders attached to a body
    fn colliders_of(&self, body: Self::Body) -> Vec<Self::Collider>;

    /// Whether a collider currently takes part in collision detection
    fn is_collider_enabled(&self, collider: Self::Collider) -> Result<bool>;

    // ==================== Mutation ====================

    /// Set linear velocity
    fn set_linear_velocity(&mut self, body: Self::Body, velocity: Vec3) -> Result<()>;

    /// Set angular velocity
    fn set_angular_velocity(&mut self, body: Self::Body, velocity: Vec3) -> Result<()>;

    /// Set linear and angular drag
    fn set_drag(&mut self, body: Self::Body, linear: f32, angular: f32) -> Result<()>;

    /// Enable or disable gravity for a body
    fn set_use_gravity(&mut self, body: Self::Body, enabled: bool) -> Result<()>;

    /// Switch a body between kinematic and dynamic
    fn set_kinematic(&mut self, body: Self::Body, kinematic: bool) -> Result<()>;

    /// Move a body (all of its colliders) to a layer
    fn set_layer(&mut self, body: Self::Body, layer: u32) -> Result<()>;

    /// Place a body directly
    fn set_pose(&mut self, body: Self::Body, pose: Pose) -> Result<()>;

    /// Move a kinematic body to `pose` over the next step, sweeping through contacts
    fn move_kinematic(&mut self, body: Self::Body, pose: Pose) -> Result<()>;

    /// Add a force at the center of mass for the next step
    fn add_force(&mut self, body: Self::Body, force: Vec3) -> Result<()>;

    /// Add a torque for the next step
    fn add_torque(&mut self, body: Self::Body, torque: Vec3) -> Result<()>;

    /// Enable or disable a collider
    fn set_collider_enabled(&mut self, collider: Self::Collider, enabled: bool) -> Result<()>;

    /// Mark or unmark a collider pair as exempt from contact
    fn set_pair_ignored(&mut self, a: Self::Collider, b: Self::Collider, ignored: bool);
}
