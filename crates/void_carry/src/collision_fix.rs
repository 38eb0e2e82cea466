//! Suppressing carrier/object collision while holding
//!
//! A fix is applied once at pickup and produces an [`AppliedFix`] record
//! holding whatever is needed to undo it. The record is consumed by
//! [`AppliedFix::reverse`], so a fix cannot be reversed twice.

use crate::backend::CarryBackend;
use crate::error::{CarryError, Result};
use serde::{Deserialize, Serialize};

/// Strategy used to keep the carrier from colliding with the held body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionFix {
    /// Exempt every carrier/object collider pair from contact
    #[default]
    IgnoreCollision,
    /// Disable the object's colliders
    DisableCollider,
    /// Move the object to a layer that does not collide with the carrier
    ChangeLayer,
    /// Make the object kinematic and drive it directly
    MakeKinematic,
}

impl CollisionFix {
    /// All strategies
    pub const ALL: [CollisionFix; 4] = [
        CollisionFix::IgnoreCollision,
        CollisionFix::DisableCollider,
        CollisionFix::ChangeLayer,
        CollisionFix::MakeKinematic,
    ];

    /// Whether the held body is driven kinematically instead of by forces
    pub fn is_kinematic_drive(&self) -> bool {
        matches!(self, CollisionFix::MakeKinematic)
    }

    /// Apply the fix to `body`.
    ///
    /// `held_layer` is only read by [`CollisionFix::ChangeLayer`].
    pub fn apply<W: CarryBackend>(
        &self,
        world: &mut W,
        body: W::Body,
        carrier: &[W::Collider],
        held_layer: u32,
    ) -> Result<AppliedFix<W::Collider>> {
        match self {
            CollisionFix::IgnoreCollision => {
                let object = world.colliders_of(body);
                let mut pairs = Vec::with_capacity(carrier.len() * object.len());
                for &c in carrier {
                    for &o in &object {
                        world.set_pair_ignored(c, o, true);
                        pairs.push((c, o));
                    }
                }
                Ok(AppliedFix::IgnoreCollision { pairs })
            }
            CollisionFix::DisableCollider => {
                let mut disabled = Vec::new();
                for collider in world.colliders_of(body) {
                    // Colliders that were already off stay off on reverse
                    if world.is_collider_enabled(collider)? {
                        world.set_collider_enabled(collider, false)?;
                        disabled.push(collider);
                    }
                }
                Ok(AppliedFix::DisableCollider { colliders: disabled })
            }
            CollisionFix::ChangeLayer => {
                let original_layer = world.body_state(body)?.layer;
                world.set_layer(body, held_layer)?;
                Ok(AppliedFix::ChangeLayer { original_layer })
            }
            CollisionFix::MakeKinematic => {
                let was_kinematic = world.body_state(body)?.is_kinematic;
                world.set_kinematic(body, true)?;
                world.set_use_gravity(body, false)?;
                Ok(AppliedFix::MakeKinematic { was_kinematic })
            }
        }
    }
}

impl std::fmt::Display for CollisionFix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IgnoreCollision => write!(f, "ignore_collision"),
            Self::DisableCollider => write!(f, "disable_collider"),
            Self::ChangeLayer => write!(f, "change_layer"),
            Self::MakeKinematic => write!(f, "make_kinematic"),
        }
    }
}

impl std::str::FromStr for CollisionFix {
    type Err = CarryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "ignore_collision" | "ignore" => Ok(Self::IgnoreCollision),
            "disable_collider" | "disable" => Ok(Self::DisableCollider),
            "change_layer" | "layer" => Ok(Self::ChangeLayer),
            "make_kinematic" | "kinematic" => Ok(Self::MakeKinematic),
            other => Err(CarryError::InvalidConfig(format!("Unknown collision fix: {}", other))),
        }
    }
}

/// Undo record of an applied [`CollisionFix`]
#[derive(Debug, Clone, PartialEq)]
pub enum AppliedFix<C> {
    /// Pairs marked as non-colliding
    IgnoreCollision { pairs: Vec<(C, C)> },
    /// Colliders that were disabled
    DisableCollider { colliders: Vec<C> },
    /// Layer the body was on before
    ChangeLayer { original_layer: u32 },
    /// Kinematic flag before pickup
    MakeKinematic { was_kinematic: bool },
}

impl<C: Copy> AppliedFix<C> {
    /// The strategy this record came from
    pub fn strategy(&self) -> CollisionFix {
        match self {
            AppliedFix::IgnoreCollision { .. } => CollisionFix::IgnoreCollision,
            AppliedFix::DisableCollider { .. } => CollisionFix::DisableCollider,
            AppliedFix::ChangeLayer { .. } => CollisionFix::ChangeLayer,
            AppliedFix::MakeKinematic { .. } => CollisionFix::MakeKinematic,
        }
    }

    /// Undo the fix. A body that no longer exists is left alone.
    pub fn reverse<W>(self, world: &mut W, body: W::Body) -> Result<()>
    where
        W: CarryBackend<Collider = C>,
    {
        if !world.contains_body(body) {
            log::debug!("Skipping collision fix reversal for removed body {:?}", body);
            return Ok(());
        }

        match self {
            AppliedFix::IgnoreCollision { pairs } => {
                for (c, o) in pairs {
                    world.set_pair_ignored(c, o, false);
                }
            }
            AppliedFix::DisableCollider { colliders } => {
                for collider in colliders {
                    world.set_collider_enabled(collider, true)?;
                }
            }
            AppliedFix::ChangeLayer { original_layer } => {
                world.set_layer(body, original_layer)?;
            }
            AppliedFix::MakeKinematic { was_kinematic } => {
                world.set_kinematic(body, was_kinematic)?;
            }
        }
        Ok(())
    }
}
