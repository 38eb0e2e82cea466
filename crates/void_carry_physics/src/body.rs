//! Rigid bodies: handles and creation descriptors

use crate::convert::to_isometry;
use crate::layers::CollisionLayer;
use glam::{Quat, Vec3};
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// Rigid body in a `PhysicsWorld`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RigidBodyHandle(pub(crate) rapier::RigidBodyHandle);

/// How a body moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyKind {
    /// Floors and walls
    Fixed,
    /// Props; carryable when light enough
    #[default]
    Dynamic,
    /// Moved by pose targets only (player capsules, platforms)
    Kinematic,
}

impl From<BodyKind> for rapier::RigidBodyType {
    fn from(kind: BodyKind) -> Self {
        match kind {
            BodyKind::Fixed => rapier::RigidBodyType::Fixed,
            BodyKind::Dynamic => rapier::RigidBodyType::Dynamic,
            BodyKind::Kinematic => rapier::RigidBodyType::KinematicPositionBased,
        }
    }
}

/// Everything needed to insert a body. Colliders are added separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidBodyDesc {
    pub kind: BodyKind,
    pub position: Vec3,
    pub rotation: Quat,
    /// 0 = floats, 1 = normal gravity
    pub gravity_scale: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Applied to every collider attached later
    pub layer: CollisionLayer,
    /// Gameplay tags, e.g. the carry exclusion tag
    pub tags: Vec<String>,
    /// Continuous collision detection, for things that get thrown hard
    pub ccd: bool,
}

impl Default for RigidBodyDesc {
    fn default() -> Self {
        Self {
            kind: BodyKind::Dynamic,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            gravity_scale: 1.0,
            linear_damping: 0.0,
            angular_damping: 0.05,
            layer: CollisionLayer::DEFAULT,
            tags: Vec::new(),
            ccd: false,
        }
    }
}

impl RigidBodyDesc {
    /// Static level geometry on the environment layer
    pub fn fixed() -> Self {
        Self {
            kind: BodyKind::Fixed,
            layer: CollisionLayer::ENVIRONMENT,
            ..Default::default()
        }
    }

    pub fn dynamic() -> Self {
        Self::default()
    }

    pub fn kinematic() -> Self {
        Self {
            kind: BodyKind::Kinematic,
            ..Default::default()
        }
    }

    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    /// Linear and angular damping
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    pub fn with_layer(mut self, layer: CollisionLayer) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_ccd(mut self) -> Self {
        self.ccd = true;
        self
    }

    pub(crate) fn to_rapier_builder(&self) -> rapier::RigidBodyBuilder {
        rapier::RigidBodyBuilder::new(self.kind.into())
            .position(to_isometry(self.position, self.rotation))
            .gravity_scale(self.gravity_scale)
            .linear_damping(self.linear_damping)
            .angular_damping(self.angular_damping)
            .ccd_enabled(self.ccd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let desc = RigidBodyDesc::dynamic()
            .with_position(1.0, 2.0, 3.0)
            .with_layer(CollisionLayer::PROPS)
            .with_tag("no_carry")
            .with_ccd();

        assert_eq!(desc.kind, BodyKind::Dynamic);
        assert_eq!(desc.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(desc.layer, CollisionLayer::PROPS);
        assert_eq!(desc.tags, vec!["no_carry".to_string()]);
        assert!(desc.ccd);
        assert_eq!(RigidBodyDesc::fixed().layer, CollisionLayer::ENVIRONMENT);
        assert_eq!(RigidBodyDesc::kinematic().kind, BodyKind::Kinematic);
    }

    #[test]
    fn test_builder_carries_pose_and_damping() {
        let rotation = Quat::from_rotation_y(0.5);
        let body = RigidBodyDesc::dynamic()
            .with_position(0.0, 1.0, -2.0)
            .with_rotation(rotation)
            .with_damping(0.2, 0.4)
            .to_rapier_builder()
            .build();

        assert!(body.is_dynamic());
        assert!((body.translation().z + 2.0).abs() < 1e-6);
        assert!((body.rotation().angle() - 0.5).abs() < 1e-5);
        assert_eq!(body.linear_damping(), 0.2);
        assert_eq!(body.angular_damping(), 0.4);
    }
}
