//! Error types for the carry controller

use thiserror::Error;

/// Carry controller errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CarryError {
    /// The body behind a handle no longer exists in the world
    #[error("Rigid body not found: {0}")]
    BodyNotFound(String),

    /// The collider behind a handle no longer exists in the world
    #[error("Collider not found: {0}")]
    ColliderNotFound(String),

    /// Invalid configuration
    #[error("Invalid carry configuration: {0}")]
    InvalidConfig(String),
}

impl CarryError {
    /// Build a `BodyNotFound` error from any debuggable handle
    pub fn body_not_found(handle: impl std::fmt::Debug) -> Self {
        Self::BodyNotFound(format!("{:?}", handle))
    }

    /// Build a `ColliderNotFound` error from any debuggable handle
    pub fn collider_not_found(handle: impl std::fmt::Debug) -> Self {
        Self::ColliderNotFound(format!("{:?}", handle))
    }

    /// Whether this error means the world object went away
    pub fn is_missing_object(&self) -> bool {
        matches!(self, Self::BodyNotFound(_) | Self::ColliderNotFound(_))
    }
}

/// Result type for carry operations
pub type Result<T> = std::result::Result<T, CarryError>;
