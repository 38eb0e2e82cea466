//! Carry controller configuration

use crate::collision_fix::CollisionFix;
use crate::error::{CarryError, Result};
use serde::{Deserialize, Serialize};

/// Tuning for acquisition, holding and throwing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarryConfig {
    /// Length of the acquisition ray and upper bound of the hold distance
    pub pickup_range: f32,

    /// Carrier-to-body distance beyond which the hold is released
    pub release_distance: f32,

    /// Bitmask of layer indices the acquisition ray can hit
    pub pickup_mask: u32,

    /// Heaviest body that can be picked up
    pub max_carry_mass: f32,

    /// Bodies carrying this tag are never eligible
    pub exclusion_tag: String,

    /// How carrier/object collision is suppressed while holding
    pub collision_fix: CollisionFix,

    /// Layer index used by [`CollisionFix::ChangeLayer`]
    pub held_layer: u32,

    /// Spring stiffness of the force drive
    pub pickup_force: f32,

    /// Linear velocity damping of the force drive
    pub damping_force: f32,

    /// Angular spring stiffness of the force drive
    pub rotation_force: f32,

    /// Angular velocity damping of the force drive
    pub rotation_damping: f32,

    /// Linear drag applied to the body while held
    pub held_linear_drag: f32,

    /// Angular drag applied to the body while held
    pub held_angular_drag: f32,

    /// Hold distance set at pickup
    pub default_hold_distance: f32,

    /// Lower bound of the hold distance
    pub min_hold_distance: f32,

    /// Multiplier applied to the distance-adjust input
    pub scroll_sensitivity: f32,

    /// Fraction of the way the body is moved toward the target pose at pickup
    pub pickup_nudge: f32,

    /// Position follow rate of the kinematic drive (per second)
    pub kinematic_follow_rate: f32,

    /// Rotation follow rate of the kinematic drive (per second)
    pub kinematic_rotation_rate: f32,

    /// Throw force before the speed bonus
    pub base_throw_force: f32,

    /// Extra throw force per unit of carried speed
    pub throw_speed_bonus: f32,

    /// Upper bound of the throw force
    pub max_throw_force: f32,
}

impl Default for CarryConfig {
    fn default() -> Self {
        Self {
            pickup_range: 3.0,
            release_distance: 6.0,
            pickup_mask: u32::MAX,
            max_carry_mass: 50.0,
            exclusion_tag: "no_carry".to_string(),
            collision_fix: CollisionFix::IgnoreCollision,
            held_layer: 7,
            pickup_force: 800.0,
            damping_force: 60.0,
            rotation_force: 40.0,
            rotation_damping: 8.0,
            held_linear_drag: 1.0,
            held_angular_drag: 5.0,
            default_hold_distance: 2.0,
            min_hold_distance: 1.0,
            scroll_sensitivity: 2.0,
            pickup_nudge: 0.5,
            kinematic_follow_rate: 10.0,
            kinematic_rotation_rate: 5.0,
            base_throw_force: 500.0,
            throw_speed_bonus: 50.0,
            max_throw_force: 1500.0,
        }
    }
}

impl CarryConfig {
    /// Set the pickup range; the release distance follows at twice the range
    pub fn with_pickup_range(mut self, range: f32) -> Self {
        self.pickup_range = range;
        self.release_distance = range * 2.0;
        self
    }

    /// Set the release distance independently of the pickup range
    pub fn with_release_distance(mut self, distance: f32) -> Self {
        self.release_distance = distance;
        self
    }

    /// Set the collision fix strategy
    pub fn with_collision_fix(mut self, fix: CollisionFix) -> Self {
        self.collision_fix = fix;
        self
    }

    /// Set the maximum carry mass
    pub fn with_max_carry_mass(mut self, mass: f32) -> Self {
        self.max_carry_mass = mass;
        self
    }

    /// Set the pickup layer mask
    pub fn with_pickup_mask(mut self, mask: u32) -> Self {
        self.pickup_mask = mask;
        self
    }

    /// Set the layer used by [`CollisionFix::ChangeLayer`]
    pub fn with_held_layer(mut self, layer: u32) -> Self {
        self.held_layer = layer;
        self
    }

    /// Set the exclusion tag
    pub fn with_exclusion_tag(mut self, tag: impl Into<String>) -> Self {
        self.exclusion_tag = tag.into();
        self
    }

    /// Set throw force bounds
    pub fn with_throw(mut self, base: f32, speed_bonus: f32, max: f32) -> Self {
        self.base_throw_force = base;
        self.throw_speed_bonus = speed_bonus;
        self.max_throw_force = max;
        self
    }

    /// Clamp a hold distance into `[min_hold_distance, pickup_range]`
    pub fn clamp_hold_distance(&self, distance: f32) -> f32 {
        distance.clamp(self.min_hold_distance, self.pickup_range)
    }

    /// Check that the configuration describes a usable controller
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("pickup_range", self.pickup_range),
            ("release_distance", self.release_distance),
            ("max_carry_mass", self.max_carry_mass),
            ("min_hold_distance", self.min_hold_distance),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(CarryError::InvalidConfig(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }

        let non_negative = [
            ("pickup_force", self.pickup_force),
            ("damping_force", self.damping_force),
            ("rotation_force", self.rotation_force),
            ("rotation_damping", self.rotation_damping),
            ("held_linear_drag", self.held_linear_drag),
            ("held_angular_drag", self.held_angular_drag),
            ("scroll_sensitivity", self.scroll_sensitivity),
            ("kinematic_follow_rate", self.kinematic_follow_rate),
            ("kinematic_rotation_rate", self.kinematic_rotation_rate),
            ("base_throw_force", self.base_throw_force),
            ("throw_speed_bonus", self.throw_speed_bonus),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(CarryError::InvalidConfig(format!(
                    "{} must be zero or positive, got {}",
                    name, value
                )));
            }
        }

        if self.min_hold_distance > self.pickup_range {
            return Err(CarryError::InvalidConfig(format!(
                "min_hold_distance ({}) exceeds pickup_range ({})",
                self.min_hold_distance, self.pickup_range
            )));
        }
        if !(0.0..=1.0).contains(&self.pickup_nudge) {
            return Err(CarryError::InvalidConfig(format!(
                "pickup_nudge must lie in [0, 1], got {}",
                self.pickup_nudge
            )));
        }
        if !(self.max_throw_force.is_finite() && self.max_throw_force >= self.base_throw_force) {
            return Err(CarryError::InvalidConfig(format!(
                "max_throw_force ({}) is below base_throw_force ({})",
                self.max_throw_force, self.base_throw_force
            )));
        }
        if self.held_layer >= 32 {
            return Err(CarryError::InvalidConfig(format!(
                "held_layer must be a layer index below 32, got {}",
                self.held_layer
            )));
        }

        Ok(())
    }
}
