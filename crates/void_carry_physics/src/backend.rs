//! [`CarryBackend`] implementation for [`PhysicsWorld`]
//!
//! Maps the controller's view of a body onto Rapier:
//!
//! | controller        | Rapier                                  |
//! |-------------------|-----------------------------------------|
//! | `use_gravity`     | gravity scale (stashed while disabled)  |
//! | `linear_drag`     | linear damping                          |
//! | `angular_drag`    | angular damping                         |
//! | `is_kinematic`    | body type != dynamic                    |
//! | `layer`           | collision groups via the matrix         |
//! | ignored pair      | contact filter hook                     |

use crate::body::RigidBodyHandle;
use crate::collider::ColliderHandle;
use crate::convert::{from_isometry, from_vector, to_isometry, to_vector};
use crate::layers::CollisionLayer;
use crate::query::RaycastOptions;
use crate::world::PhysicsWorld;
use glam::Vec3;
use rapier3d::prelude as rapier;
use void_carry::{BodyState, CarryBackend, Pose, RayHit};

type CarryResult<T> = void_carry::Result<T>;

impl CarryBackend for PhysicsWorld {
    type Body = RigidBodyHandle;
    type Collider = ColliderHandle;

    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: u32,
        exclude: &[ColliderHandle],
    ) -> Option<RayHit<ColliderHandle>> {
        let options = RaycastOptions::default()
            .with_max_distance(max_distance)
            .with_layer_mask(mask)
            .exclude_all(exclude);

        self.query()
            .raycast(origin, direction, &options)
            .map(|hit| RayHit {
                collider: hit.collider,
                distance: hit.distance,
            })
    }

    fn body_of(&self, collider: ColliderHandle) -> Option<RigidBodyHandle> {
        self.collider_parent(collider)
    }

    fn contains_body(&self, body: RigidBodyHandle) -> bool {
        PhysicsWorld::contains_body(self, body)
    }

    fn body_state(&self, body: RigidBodyHandle) -> CarryResult<BodyState> {
        let layer = self.body_layer(body)?;
        let b = self.body(body)?;
        Ok(BodyState {
            mass: b.mass(),
            linear_velocity: from_vector(b.linvel()),
            angular_velocity: from_vector(b.angvel()),
            linear_drag: b.linear_damping(),
            angular_drag: b.angular_damping(),
            use_gravity: b.gravity_scale() != 0.0,
            is_kinematic: !b.is_dynamic(),
            layer: layer.0,
            pose: from_isometry(b.position()),
        })
    }

    fn has_tag(&self, body: RigidBodyHandle, tag: &str) -> bool {
        PhysicsWorld::has_tag(self, body, tag)
    }

    fn colliders_of(&self, body: RigidBodyHandle) -> Vec<ColliderHandle> {
        self.body_colliders(body)
    }

    fn is_collider_enabled(&self, collider: ColliderHandle) -> CarryResult<bool> {
        Ok(self.collider(collider)?.is_enabled())
    }

    fn set_linear_velocity(&mut self, body: RigidBodyHandle, velocity: Vec3) -> CarryResult<()> {
        self.body_mut(body)?.set_linvel(to_vector(velocity), true);
        Ok(())
    }

    fn set_angular_velocity(&mut self, body: RigidBodyHandle, velocity: Vec3) -> CarryResult<()> {
        self.body_mut(body)?.set_angvel(to_vector(velocity), true);
        Ok(())
    }

    fn set_drag(&mut self, body: RigidBodyHandle, linear: f32, angular: f32) -> CarryResult<()> {
        let b = self.body_mut(body)?;
        b.set_linear_damping(linear);
        b.set_angular_damping(angular);
        Ok(())
    }

    fn set_use_gravity(&mut self, body: RigidBodyHandle, enabled: bool) -> CarryResult<()> {
        Ok(self.set_gravity_enabled(body, enabled)?)
    }

    fn set_kinematic(&mut self, body: RigidBodyHandle, kinematic: bool) -> CarryResult<()> {
        let body_type = if kinematic {
            rapier::RigidBodyType::KinematicPositionBased
        } else {
            rapier::RigidBodyType::Dynamic
        };
        let b = self.body_mut(body)?;
        if b.body_type() != body_type {
            b.set_body_type(body_type, true);
        }
        Ok(())
    }

    fn set_layer(&mut self, body: RigidBodyHandle, layer: u32) -> CarryResult<()> {
        Ok(self.set_body_layer(body, CollisionLayer(layer))?)
    }

    fn set_pose(&mut self, body: RigidBodyHandle, pose: Pose) -> CarryResult<()> {
        self.body_mut(body)?
            .set_position(to_isometry(pose.position, pose.rotation), true);
        Ok(())
    }

    fn move_kinematic(&mut self, body: RigidBodyHandle, pose: Pose) -> CarryResult<()> {
        self.body_mut(body)?
            .set_next_kinematic_position(to_isometry(pose.position, pose.rotation));
        Ok(())
    }

    fn add_force(&mut self, body: RigidBodyHandle, force: Vec3) -> CarryResult<()> {
        self.body_mut(body)?.add_force(to_vector(force), true);
        Ok(())
    }

    fn add_torque(&mut self, body: RigidBodyHandle, torque: Vec3) -> CarryResult<()> {
        self.body_mut(body)?.add_torque(to_vector(torque), true);
        Ok(())
    }

    fn set_collider_enabled(&mut self, collider: ColliderHandle, enabled: bool) -> CarryResult<()> {
        Ok(PhysicsWorld::set_collider_enabled(self, collider, enabled)?)
    }

    fn set_pair_ignored(&mut self, a: ColliderHandle, b: ColliderHandle, ignored: bool) {
        PhysicsWorld::set_pair_ignored(self, a, b, ignored);
    }
}
