//! Void Carry Physics - Rapier 3D Backend
//!
//! Runs the `void_carry` controller against a Rapier 3D simulation.
//!
//! # Features
//!
//! - Rigid bodies (static, dynamic, kinematic) with layers and tags
//! - Box, sphere, capsule and cylinder colliders
//! - Raycasting with layer masks and collider exclusion
//! - Collision layers, plus per-pair contact suppression through a hook
//! - Contact began/ended events per step
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 PhysicsWorld                    │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────┐  │
//! │  │ RigidBodySet│  │ ColliderSet │  │ Queries │  │
//! │  └─────────────┘  └─────────────┘  └─────────┘  │
//! │  ┌──────────────┐  ┌──────────────────────────┐ │
//! │  │ContactFilter │  │ layers / tags / gravity  │ │
//! │  └──────────────┘  └──────────────────────────┘ │
//! └─────────────────────────────────────────────────┘
//!                        │
//!                        ▼
//!              impl CarryBackend (backend.rs)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use void_carry::prelude::*;
//! use void_carry_physics::prelude::*;
//!
//! let mut physics = PhysicsWorld::new(PhysicsConfig::default());
//!
//! let crate_body = physics.create_rigid_body(
//!     RigidBodyDesc::dynamic()
//!         .with_position(0.0, 1.0, -2.0)
//!         .with_layer(CollisionLayer::PROPS),
//! );
//! physics.create_collider(
//!     ColliderDesc::new(ColliderShape::cuboid(0.3, 0.3, 0.3)).with_mass(5.0),
//!     Some(crate_body),
//! );
//! physics.sync_query_pipeline();
//!
//! let mut carry = CarryController::new(CarryConfig::default(), player_colliders)?;
//! carry.step(&mut physics, Some(viewer), &CarryIntent::pickup(), 1.0 / 60.0);
//! physics.step(1.0 / 60.0);
//! ```

pub mod backend;
pub mod body;
pub mod collider;
pub mod config;
mod convert;
pub mod error;
pub mod events;
pub mod layers;
pub mod query;
pub mod world;

pub mod prelude {
    //! Common imports for physics functionality
    pub use crate::body::{BodyKind, RigidBodyDesc, RigidBodyHandle};
    pub use crate::collider::{ColliderDesc, ColliderHandle, ColliderShape};
    pub use crate::config::PhysicsConfig;
    pub use crate::error::{PhysicsError, Result};
    pub use crate::events::{ContactEvent, ContactLog, ContactPhase};
    pub use crate::layers::{CollisionGroups, CollisionLayer, CollisionMatrix};
    pub use crate::query::{RaycastHit, RaycastOptions};
    pub use crate::world::PhysicsWorld;
}

pub use prelude::*;
