//! Colliders: shapes and creation descriptors

use crate::convert::to_vector;
use crate::layers::CollisionGroups;
use glam::Vec3;
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// Collider in a `PhysicsWorld`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub(crate) rapier::ColliderHandle);

/// Supported shapes. Capsules and cylinders stand along Y.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ColliderShape {
    Sphere { radius: f32 },
    Box { half_extents: [f32; 3] },
    CapsuleY { half_height: f32, radius: f32 },
    CylinderY { half_height: f32, radius: f32 },
}

impl ColliderShape {
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Box from half-extents
    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Self {
        Self::Box {
            half_extents: [hx, hy, hz],
        }
    }

    pub fn capsule(half_height: f32, radius: f32) -> Self {
        Self::CapsuleY { half_height, radius }
    }

    pub fn cylinder(half_height: f32, radius: f32) -> Self {
        Self::CylinderY { half_height, radius }
    }

    fn to_shared_shape(&self) -> rapier::SharedShape {
        match *self {
            Self::Sphere { radius } => rapier::SharedShape::ball(radius),
            Self::Box { half_extents: [hx, hy, hz] } => rapier::SharedShape::cuboid(hx, hy, hz),
            Self::CapsuleY { half_height, radius } => rapier::SharedShape::capsule_y(half_height, radius),
            Self::CylinderY { half_height, radius } => rapier::SharedShape::cylinder(half_height, radius),
        }
    }
}

/// Collider to attach to a body (or leave free)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColliderDesc {
    pub shape: ColliderShape,
    /// Offset from the parent body's origin
    pub offset: Vec3,
    pub friction: f32,
    pub restitution: f32,
    /// Used when `mass` is not set
    pub density: f32,
    /// Mass this collider gives its body, overriding density
    pub mass: Option<f32>,
}

impl ColliderDesc {
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            offset: Vec3::ZERO,
            friction: 0.5,
            restitution: 0.0,
            density: 1.0,
            mass: None,
        }
    }

    pub fn with_offset(mut self, x: f32, y: f32, z: f32) -> Self {
        self.offset = Vec3::new(x, y, z);
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = Some(mass);
        self
    }

    /// Friction and restitution
    pub fn with_surface(mut self, friction: f32, restitution: f32) -> Self {
        self.friction = friction;
        self.restitution = restitution;
        self
    }

    /// Every collider runs through the world's contact filter hook and
    /// reports contact events.
    pub(crate) fn to_rapier_builder(&self, groups: CollisionGroups) -> rapier::ColliderBuilder {
        let builder = rapier::ColliderBuilder::new(self.shape.to_shared_shape())
            .translation(to_vector(self.offset))
            .friction(self.friction)
            .restitution(self.restitution)
            .collision_groups(groups.to_rapier())
            .active_hooks(rapier::ActiveHooks::FILTER_CONTACT_PAIRS)
            .active_events(rapier::ActiveEvents::COLLISION_EVENTS);

        match self.mass {
            Some(mass) => builder.mass(mass),
            None => builder.density(self.density),
        }
    }
}
