//! Void Carry - Physics Pickup, Hold and Throw
//!
//! A first-person style "grab the object in front of you" controller. The
//! carrier looks at a dynamic body, picks it up, holds it floating in front
//! of the view with a spring-damper drive, and finally drops or throws it.
//!
//! # Features
//!
//! - Ray-cast lock-on with eligibility filtering (mass, tag, kinematic)
//! - Four collision fixes keeping the held body off the carrier
//! - Force-based or kinematic hold drive
//! - Adjustable hold distance, automatic release when dragged too far
//! - Drop and throw with exact restoration of the body's properties
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │                CarryController                  │
//! │  ┌───────────────┐   ┌───────────────────────┐ │
//! │  │ Idle          │   │ Holding               │ │
//! │  │ (acquisition) │──▶│ (session, fix, drive) │ │
//! │  └───────────────┘◀──└───────────────────────┘ │
//! └────────────────────────────────────────────────┘
//!                        │
//!                        ▼
//!              ┌───────────────────┐
//!              │ impl CarryBackend │  (void_carry_physics: Rapier)
//!              └───────────────────┘
//! ```
//!
//! The controller never owns bodies. It talks to the simulation through the
//! [`CarryBackend`] trait and holds only handles.
//!
//! # Example
//!
//! ```ignore
//! use void_carry::prelude::*;
//!
//! let mut carry = CarryController::new(CarryConfig::default(), carrier_colliders)?;
//!
//! // Once per fixed step, before the world steps
//! let intent = CarryIntent { pickup: input.pressed(Key::E), ..CarryIntent::NONE };
//! carry.step(&mut world, Some(Viewer::new(eye, look)), &intent, dt);
//! world.step(dt);
//!
//! for event in carry.drain_events() {
//!     log::info!("{:?}", event);
//! }
//! ```

pub mod acquisition;
pub mod backend;
pub mod collision_fix;
pub mod config;
pub mod controller;
pub mod eligibility;
pub mod error;
pub mod events;
pub mod hold;
pub mod release;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub mod prelude {
    //! Common imports for carry functionality
    pub use crate::acquisition::TargetAcquisition;
    pub use crate::backend::{BodyState, CarryBackend, Pose, RayHit, Viewer};
    pub use crate::collision_fix::{AppliedFix, CollisionFix};
    pub use crate::config::CarryConfig;
    pub use crate::controller::{
        CarryController, CarryDebug, CarryIntent, CarryPhase, CarryState, ViewRay,
    };
    pub use crate::error::{CarryError, Result};
    pub use crate::events::{CarryEvent, ReleaseReason};
    pub use crate::hold::HoldTarget;
    pub use crate::session::{CarrySession, SavedPhysicalProperties};
}

pub use prelude::*;
