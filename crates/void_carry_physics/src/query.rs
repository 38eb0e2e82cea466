//! Ray casts against the world, filtered by layer and by collider

use crate::body::RigidBodyHandle;
use crate::collider::ColliderHandle;
use crate::convert::{from_vector, to_point, to_vector};
use crate::layers::CollisionGroups;
use glam::Vec3;
use rapier3d::prelude as rapier;

/// First collider along a ray
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    pub collider: ColliderHandle,
    /// Owning body (`None` for free colliders)
    pub body: Option<RigidBodyHandle>,
    pub point: Vec3,
    /// Along the normalized ray
    pub distance: f32,
}

/// What a ray may hit
#[derive(Debug, Clone)]
pub struct RaycastOptions {
    pub max_distance: f32,
    /// Sensors are skipped unless set
    pub hit_sensors: bool,
    /// Layers the ray sees
    pub groups: CollisionGroups,
    /// Colliders the ray passes through (the caster's own body, usually)
    pub ignored: Vec<ColliderHandle>,
}

impl Default for RaycastOptions {
    fn default() -> Self {
        Self {
            max_distance: f32::MAX,
            hit_sensors: false,
            groups: CollisionGroups::ALL,
            ignored: Vec::new(),
        }
    }
}

impl RaycastOptions {
    pub fn with_max_distance(mut self, distance: f32) -> Self {
        self.max_distance = distance;
        self
    }

    /// Only see the layers in `mask`
    pub fn with_layer_mask(mut self, mask: u32) -> Self {
        self.groups = CollisionGroups::query_mask(mask);
        self
    }

    /// Let the ray pass through `collider`
    pub fn exclude(mut self, collider: ColliderHandle) -> Self {
        self.ignored.push(collider);
        self
    }

    /// Let the ray pass through all of `colliders`
    pub fn exclude_all(mut self, colliders: &[ColliderHandle]) -> Self {
        self.ignored.extend_from_slice(colliders);
        self
    }
}

/// Borrowed view of the world for queries, see `PhysicsWorld::query`
pub struct PhysicsQuery<'a> {
    pub(crate) query_pipeline: &'a rapier::QueryPipeline,
    pub(crate) colliders: &'a rapier::ColliderSet,
    pub(crate) bodies: &'a rapier::RigidBodySet,
}

impl<'a> PhysicsQuery<'a> {
    /// Cast a ray and get the first hit.
    ///
    /// `direction` does not need to be normalized; a zero direction hits nothing.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, options: &RaycastOptions) -> Option<RaycastHit> {
        let direction = direction.try_normalize()?;
        let ray = rapier::Ray::new(to_point(origin), to_vector(direction));

        // QueryFilter::exclude_collider holds a single handle
        let passes = |handle: rapier::ColliderHandle, _: &rapier::Collider| {
            !options.ignored.iter().any(|c| c.0 == handle)
        };
        let mut filter = rapier::QueryFilter::new()
            .groups(options.groups.to_rapier())
            .predicate(&passes);
        if !options.hit_sensors {
            filter = filter.exclude_sensors();
        }

        let (handle, toi) = self.query_pipeline.cast_ray(
            self.bodies,
            self.colliders,
            &ray,
            options.max_distance,
            true,
            filter,
        )?;
        let hit = self.colliders.get(handle)?;

        Some(RaycastHit {
            collider: ColliderHandle(handle),
            body: hit.parent().map(RigidBodyHandle),
            point: from_vector(&ray.point_at(toi).coords),
            distance: toi,
        })
    }
}
