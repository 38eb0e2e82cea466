//! Data that exists only while a body is held

use crate::backend::{BodyState, CarryBackend};
use crate::collision_fix::AppliedFix;
use crate::error::Result;

/// Physical properties of a body captured at pickup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavedPhysicalProperties {
    /// Gravity flag
    pub use_gravity: bool,
    /// Linear drag
    pub linear_drag: f32,
    /// Angular drag
    pub angular_drag: f32,
    /// Kinematic flag
    pub is_kinematic: bool,
    /// Layer index
    pub layer: u32,
}

impl SavedPhysicalProperties {
    /// Capture from a body state
    pub fn capture(state: &BodyState) -> Self {
        Self {
            use_gravity: state.use_gravity,
            linear_drag: state.linear_drag,
            angular_drag: state.angular_drag,
            is_kinematic: state.is_kinematic,
            layer: state.layer,
        }
    }

    /// Whether `state` carries exactly these properties
    pub fn matches(&self, state: &BodyState) -> bool {
        *self == Self::capture(state)
    }

    /// Write the properties back onto `body`
    pub fn restore<W: CarryBackend>(&self, world: &mut W, body: W::Body) -> Result<()> {
        world.set_kinematic(body, self.is_kinematic)?;
        world.set_use_gravity(body, self.use_gravity)?;
        world.set_drag(body, self.linear_drag, self.angular_drag)?;
        world.set_layer(body, self.layer)?;
        Ok(())
    }
}

/// An active carry: the held body plus everything needed to let it go cleanly
#[derive(Debug, Clone, PartialEq)]
pub struct CarrySession<B, C> {
    body: B,
    hold_distance: f32,
    mass: f32,
    saved: SavedPhysicalProperties,
    fix: AppliedFix<C>,
}

impl<B: Copy, C: Copy> CarrySession<B, C> {
    pub(crate) fn new(
        body: B,
        hold_distance: f32,
        mass: f32,
        saved: SavedPhysicalProperties,
        fix: AppliedFix<C>,
    ) -> Self {
        Self {
            body,
            hold_distance,
            mass,
            saved,
            fix,
        }
    }

    /// The held body
    pub fn body(&self) -> B {
        self.body
    }

    /// Current hold distance
    pub fn hold_distance(&self) -> f32 {
        self.hold_distance
    }

    /// Mass read at pickup. Drive forces and the throw use this, not the
    /// backend's current value, which may change while a fix is applied.
    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub(crate) fn set_hold_distance(&mut self, distance: f32) {
        self.hold_distance = distance;
    }

    /// Properties captured at pickup
    pub fn saved(&self) -> &SavedPhysicalProperties {
        &self.saved
    }

    /// The collision fix in effect
    pub fn fix(&self) -> &AppliedFix<C> {
        &self.fix
    }

    pub(crate) fn into_parts(self) -> (B, SavedPhysicalProperties, AppliedFix<C>) {
        (self.body, self.saved, self.fix)
    }
}
