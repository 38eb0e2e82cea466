//! glam <-> nalgebra conversions

use glam::{Quat, Vec3};
use rapier3d::na::{Quaternion, UnitQuaternion};
use rapier3d::prelude as rapier;
use void_carry::Pose;

pub(crate) fn to_vector(v: Vec3) -> rapier::Vector<f32> {
    rapier::Vector::new(v.x, v.y, v.z)
}

pub(crate) fn to_point(v: Vec3) -> rapier::Point<f32> {
    rapier::Point::new(v.x, v.y, v.z)
}

pub(crate) fn from_vector(v: &rapier::Vector<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub(crate) fn to_rotation(q: Quat) -> UnitQuaternion<f32> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

pub(crate) fn from_rotation(q: &UnitQuaternion<f32>) -> Quat {
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

pub(crate) fn to_isometry(position: Vec3, rotation: Quat) -> rapier::Isometry<f32> {
    rapier::Isometry::from_parts(
        rapier::Translation::new(position.x, position.y, position.z),
        to_rotation(rotation),
    )
}

pub(crate) fn from_isometry(iso: &rapier::Isometry<f32>) -> Pose {
    Pose::new(from_vector(&iso.translation.vector), from_rotation(&iso.rotation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pose_survives_isometry() {
        let rotation = Quat::from_rotation_y(0.7) * Quat::from_rotation_x(-0.2);
        let pose = from_isometry(&to_isometry(Vec3::new(1.0, 2.0, 3.0), rotation));

        assert_relative_eq!(pose.position.y, 2.0);
        assert!(pose.rotation.dot(rotation).abs() > 0.9999);
    }
}
