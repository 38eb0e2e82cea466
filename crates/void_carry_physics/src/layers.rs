//! Collision layers and the layer-to-layer matrix
//!
//! Every body sits on one layer. A collider's Rapier interaction groups are
//! derived from its body's layer through the [`CollisionMatrix`], so moving a
//! body to another layer rewrites the groups of all its colliders.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of usable layers (one bit each in a `u32` mask)
pub const LAYER_COUNT: u32 = 32;

/// Layer index, `0..LAYER_COUNT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollisionLayer(pub u32);

impl CollisionLayer {
    pub const DEFAULT: Self = Self(0);
    /// Player / carrier layer
    pub const PLAYER: Self = Self(1);
    /// Loose props
    pub const PROPS: Self = Self(2);
    /// Level geometry
    pub const ENVIRONMENT: Self = Self(5);
    /// Bodies currently held by a carrier
    pub const HELD: Self = Self(7);

    pub const fn custom(id: u32) -> Self {
        Self(id)
    }

    /// Whether the layer fits in a mask
    pub fn is_valid(&self) -> bool {
        self.0 < LAYER_COUNT
    }

    /// Single-bit mask; 0 for out of range layers
    pub fn as_mask(&self) -> u32 {
        1u32.checked_shl(self.0).unwrap_or(0)
    }
}

impl Default for CollisionLayer {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Membership and filter masks, mirroring Rapier's `InteractionGroups`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionGroups {
    pub memberships: u32,
    pub filter: u32,
}

impl CollisionGroups {
    /// Collide with everything
    pub const ALL: Self = Self {
        memberships: u32::MAX,
        filter: u32::MAX,
    };

    pub fn new(memberships: u32, filter: u32) -> Self {
        Self { memberships, filter }
    }

    /// Groups of a ray or shape query that only sees the layers in `mask`
    pub fn query_mask(mask: u32) -> Self {
        Self {
            memberships: u32::MAX,
            filter: mask,
        }
    }

    /// Both sides must accept the other
    pub fn can_collide(&self, other: &CollisionGroups) -> bool {
        (self.memberships & other.filter) != 0 && (other.memberships & self.filter) != 0
    }

    pub(crate) fn to_rapier(self) -> rapier3d::prelude::InteractionGroups {
        use rapier3d::prelude::{Group, InteractionGroups};
        InteractionGroups::new(
            Group::from_bits_truncate(self.memberships),
            Group::from_bits_truncate(self.filter),
        )
    }
}

impl Default for CollisionGroups {
    fn default() -> Self {
        Self::ALL
    }
}

/// Which layers collide with which
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionMatrix {
    /// Layers a layer collides with, as a mask. Missing = everything.
    rules: HashMap<CollisionLayer, u32>,
}

impl Default for CollisionMatrix {
    fn default() -> Self {
        let mut matrix = Self::new();
        // Held bodies pass through whoever is holding them
        matrix.ignore_pair(CollisionLayer::PLAYER, CollisionLayer::HELD);
        matrix
    }
}

impl CollisionMatrix {
    /// A matrix where every layer collides with every layer
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Set which layers a given layer collides with
    pub fn set_collides_with(&mut self, layer: CollisionLayer, collides_with: &[CollisionLayer]) {
        let mask = collides_with.iter().fold(0u32, |acc, l| acc | l.as_mask());
        self.rules.insert(layer, mask);
    }

    /// Stop `a` and `b` from colliding (both directions)
    pub fn ignore_pair(&mut self, a: CollisionLayer, b: CollisionLayer) {
        *self.rules.entry(a).or_insert(u32::MAX) &= !b.as_mask();
        *self.rules.entry(b).or_insert(u32::MAX) &= !a.as_mask();
    }

    /// Get collision groups for a layer
    pub fn groups(&self, layer: CollisionLayer) -> CollisionGroups {
        CollisionGroups {
            memberships: layer.as_mask(),
            filter: self.rules.get(&layer).copied().unwrap_or(u32::MAX),
        }
    }

    /// Check if two layers can collide
    pub fn can_collide(&self, a: CollisionLayer, b: CollisionLayer) -> bool {
        self.groups(a).can_collide(&self.groups(b))
    }
}
