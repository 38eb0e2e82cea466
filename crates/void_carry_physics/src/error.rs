//! Error types for the physics backend

use crate::body::RigidBodyHandle;
use crate::collider::ColliderHandle;
use thiserror::Error;
use void_carry::CarryError;

/// Physics backend errors
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// Rigid body not found
    #[error("Rigid body not found: {0:?}")]
    BodyNotFound(RigidBodyHandle),

    /// Collider not found
    #[error("Collider not found: {0:?}")]
    ColliderNotFound(ColliderHandle),

    /// Invalid configuration
    #[error("Invalid physics configuration: {0}")]
    InvalidConfig(String),

    /// Invalid collision layer
    #[error("Invalid collision layer: {0}")]
    InvalidLayer(u32),
}

impl From<PhysicsError> for CarryError {
    fn from(err: PhysicsError) -> Self {
        match err {
            PhysicsError::BodyNotFound(handle) => CarryError::body_not_found(handle),
            PhysicsError::ColliderNotFound(handle) => CarryError::collider_not_found(handle),
            PhysicsError::InvalidConfig(msg) => CarryError::InvalidConfig(msg),
            PhysicsError::InvalidLayer(layer) => {
                CarryError::InvalidConfig(format!("collision layer {} is out of range", layer))
            }
        }
    }
}

/// Result type for physics operations
pub type Result<T> = std::result::Result<T, PhysicsError>;
