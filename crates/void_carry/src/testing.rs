//! In-memory world used by the unit tests
//!
//! Bodies are spheres; ray casts and contact checks are analytic. Forces and
//! torques are recorded per step instead of being integrated.

use crate::backend::{BodyState, CarryBackend, Pose, RayHit};
use crate::error::{CarryError, Result};
use glam::{Quat, Vec3};
use std::collections::{HashMap, HashSet};

/// Layer of the carrier's colliders in the test world
pub const CARRIER_LAYER: u32 = 1;
/// Layer that never touches [`CARRIER_LAYER`]
pub const HELD_LAYER: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TestBody(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TestCollider(pub u32);

#[derive(Debug, Clone)]
pub struct TestBodyData {
    pub state: BodyState,
    pub tags: HashSet<String>,
    pub colliders: Vec<TestCollider>,
    pub force: Vec3,
    pub torque: Vec3,
    pub kinematic_target: Option<Pose>,
}

#[derive(Debug, Clone)]
pub struct TestColliderData {
    pub body: TestBody,
    pub radius: f32,
    pub enabled: bool,
}

#[derive(Debug, Default)]
pub struct TestWorld {
    pub bodies: HashMap<TestBody, TestBodyData>,
    pub colliders: HashMap<TestCollider, TestColliderData>,
    pub ignored_pairs: HashSet<(TestCollider, TestCollider)>,
    next_id: u32,
}

fn pair_key(a: TestCollider, b: TestCollider) -> (TestCollider, TestCollider) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl TestWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a dynamic sphere with a single collider
    pub fn spawn(&mut self, position: Vec3, mass: f32, radius: f32) -> (TestBody, TestCollider) {
        self.next_id += 1;
        let body = TestBody(self.next_id);
        self.next_id += 1;
        let collider = TestCollider(self.next_id);

        self.bodies.insert(
            body,
            TestBodyData {
                state: BodyState {
                    mass,
                    linear_velocity: Vec3::ZERO,
                    angular_velocity: Vec3::ZERO,
                    linear_drag: 0.0,
                    angular_drag: 0.05,
                    use_gravity: true,
                    is_kinematic: false,
                    layer: 0,
                    pose: Pose::from_position(position),
                },
                tags: HashSet::new(),
                colliders: vec![collider],
                force: Vec3::ZERO,
                torque: Vec3::ZERO,
                kinematic_target: None,
            },
        );
        self.colliders.insert(
            collider,
            TestColliderData {
                body,
                radius,
                enabled: true,
            },
        );
        (body, collider)
    }

    /// Spawn the carrier: a kinematic sphere on [`CARRIER_LAYER`]
    pub fn spawn_carrier(&mut self, position: Vec3) -> (TestBody, TestCollider) {
        let (body, collider) = self.spawn(position, 80.0, 0.5);
        let data = self.body_mut(body);
        data.state.is_kinematic = true;
        data.state.layer = CARRIER_LAYER;
        (body, collider)
    }

    pub fn remove(&mut self, body: TestBody) {
        if let Some(data) = self.bodies.remove(&body) {
            for collider in data.colliders {
                self.colliders.remove(&collider);
                self.ignored_pairs.retain(|(a, b)| *a != collider && *b != collider);
            }
        }
    }

    pub fn body(&self, body: TestBody) -> &TestBodyData {
        &self.bodies[&body]
    }

    pub fn body_mut(&mut self, body: TestBody) -> &mut TestBodyData {
        self.bodies.get_mut(&body).expect("test body exists")
    }

    pub fn tag(&mut self, body: TestBody, tag: &str) {
        self.body_mut(body).tags.insert(tag.to_string());
    }

    /// Clear per-step force/torque accumulators
    pub fn end_step(&mut self) {
        for data in self.bodies.values_mut() {
            data.force = Vec3::ZERO;
            data.torque = Vec3::ZERO;
            if let Some(target) = data.kinematic_target.take() {
                data.state.pose = target;
            }
        }
    }

    /// Whether two colliders would generate a contact response right now
    pub fn collides(&self, a: TestCollider, b: TestCollider) -> bool {
        let (Some(ca), Some(cb)) = (self.colliders.get(&a), self.colliders.get(&b)) else {
            return false;
        };
        if !ca.enabled || !cb.enabled || self.ignored_pairs.contains(&pair_key(a, b)) {
            return false;
        }
        let sa = &self.bodies[&ca.body].state;
        let sb = &self.bodies[&cb.body].state;
        if sa.is_kinematic && sb.is_kinematic {
            return false;
        }
        let layers = [sa.layer, sb.layer];
        if layers.contains(&CARRIER_LAYER) && layers.contains(&HELD_LAYER) {
            return false;
        }
        sa.pose.position.distance(sb.pose.position) <= ca.radius + cb.radius
    }

    fn data(&self, body: TestBody) -> Result<&TestBodyData> {
        self.bodies.get(&body).ok_or_else(|| CarryError::body_not_found(body))
    }

    fn data_mut(&mut self, body: TestBody) -> Result<&mut TestBodyData> {
        self.bodies.get_mut(&body).ok_or_else(|| CarryError::body_not_found(body))
    }
}

impl CarryBackend for TestWorld {
    type Body = TestBody;
    type Collider = TestCollider;

    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: u32,
        exclude: &[TestCollider],
    ) -> Option<RayHit<TestCollider>> {
        let dir = direction.try_normalize()?;
        let mut best: Option<RayHit<TestCollider>> = None;

        for (handle, collider) in &self.colliders {
            if !collider.enabled || exclude.contains(handle) {
                continue;
            }
            let state = &self.bodies[&collider.body].state;
            if state.layer >= 32 || mask & (1 << state.layer) == 0 {
                continue;
            }
            let to_center = state.pose.position - origin;
            let along = to_center.dot(dir);
            let closest_sq = to_center.length_squared() - along * along;
            let radius_sq = collider.radius * collider.radius;
            if closest_sq > radius_sq {
                continue;
            }
            let distance = (along - (radius_sq - closest_sq).sqrt()).max(0.0);
            if along < 0.0 && to_center.length() > collider.radius {
                continue;
            }
            if distance <= max_distance && best.map_or(true, |b| distance < b.distance) {
                best = Some(RayHit {
                    collider: *handle,
                    distance,
                });
            }
        }
        best
    }

    fn body_of(&self, collider: TestCollider) -> Option<TestBody> {
        self.colliders.get(&collider).map(|c| c.body)
    }

    fn contains_body(&self, body: TestBody) -> bool {
        self.bodies.contains_key(&body)
    }

    fn body_state(&self, body: TestBody) -> Result<BodyState> {
        self.data(body).map(|d| d.state)
    }

    fn has_tag(&self, body: TestBody, tag: &str) -> bool {
        self.bodies.get(&body).map_or(false, |d| d.tags.contains(tag))
    }

    fn colliders_of(&self, body: TestBody) -> Vec<TestCollider> {
        self.bodies
            .get(&body)
            .map(|d| d.colliders.clone())
            .unwrap_or_default()
    }

    fn is_collider_enabled(&self, collider: TestCollider) -> Result<bool> {
        self.colliders
            .get(&collider)
            .map(|c| c.enabled)
            .ok_or_else(|| CarryError::collider_not_found(collider))
    }

    fn set_linear_velocity(&mut self, body: TestBody, velocity: Vec3) -> Result<()> {
        self.data_mut(body)?.state.linear_velocity = velocity;
        Ok(())
    }

    fn set_angular_velocity(&mut self, body: TestBody, velocity: Vec3) -> Result<()> {
        self.data_mut(body)?.state.angular_velocity = velocity;
        Ok(())
    }

    fn set_drag(&mut self, body: TestBody, linear: f32, angular: f32) -> Result<()> {
        let data = self.data_mut(body)?;
        data.state.linear_drag = linear;
        data.state.angular_drag = angular;
        Ok(())
    }

    fn set_use_gravity(&mut self, body: TestBody, enabled: bool) -> Result<()> {
        self.data_mut(body)?.state.use_gravity = enabled;
        Ok(())
    }

    fn set_kinematic(&mut self, body: TestBody, kinematic: bool) -> Result<()> {
        self.data_mut(body)?.state.is_kinematic = kinematic;
        Ok(())
    }

    fn set_layer(&mut self, body: TestBody, layer: u32) -> Result<()> {
        self.data_mut(body)?.state.layer = layer;
        Ok(())
    }

    fn set_pose(&mut self, body: TestBody, pose: Pose) -> Result<()> {
        self.data_mut(body)?.state.pose = pose;
        Ok(())
    }

    fn move_kinematic(&mut self, body: TestBody, pose: Pose) -> Result<()> {
        self.data_mut(body)?.kinematic_target = Some(pose);
        Ok(())
    }

    fn add_force(&mut self, body: TestBody, force: Vec3) -> Result<()> {
        self.data_mut(body)?.force += force;
        Ok(())
    }

    fn add_torque(&mut self, body: TestBody, torque: Vec3) -> Result<()> {
        self.data_mut(body)?.torque += torque;
        Ok(())
    }

    fn set_collider_enabled(&mut self, collider: TestCollider, enabled: bool) -> Result<()> {
        self.colliders
            .get_mut(&collider)
            .map(|c| c.enabled = enabled)
            .ok_or_else(|| CarryError::collider_not_found(collider))
    }

    fn set_pair_ignored(&mut self, a: TestCollider, b: TestCollider, ignored: bool) {
        if ignored {
            self.ignored_pairs.insert(pair_key(a, b));
        } else {
            self.ignored_pairs.remove(&pair_key(a, b));
        }
    }
}

/// Orientation used when a test needs a non-trivial starting rotation
pub fn tilted() -> Quat {
    Quat::from_rotation_x(0.4) * Quat::from_rotation_z(-0.3)
}
