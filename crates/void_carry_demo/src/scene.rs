//! The demo room: a floor, a player capsule and a few props

use crate::demo_config::DemoConfig;
use glam::Vec3;
use void_carry::Viewer;
use void_carry_physics::{
    ColliderDesc, ColliderHandle, ColliderShape, CollisionLayer, PhysicsWorld, RigidBodyDesc,
    RigidBodyHandle,
};

/// Eye height above the player body's origin
const EYE_OFFSET: Vec3 = Vec3::new(0.0, 0.6, 0.0);

/// Handles of everything the script looks at
pub struct DemoScene {
    pub physics: PhysicsWorld,
    pub player: RigidBodyHandle,
    pub player_colliders: Vec<ColliderHandle>,
    /// 5 kg crate
    pub crate_box: RigidBodyHandle,
    /// 20 kg barrel
    pub barrel: RigidBodyHandle,
    /// 200 kg, too heavy to lift
    pub anvil: RigidBodyHandle,
    /// Light but tagged as not carryable
    pub statue: RigidBodyHandle,
}

impl DemoScene {
    /// Build the room
    pub fn build(config: &DemoConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let mut physics =
            PhysicsWorld::try_new(config.physics.clone())?.with_collision_matrix(config.collision_matrix());

        let floor = physics.create_rigid_body(RigidBodyDesc::fixed().with_position(0.0, -0.5, 0.0));
        physics.create_collider(ColliderDesc::new(ColliderShape::cuboid(20.0, 0.5, 20.0)), Some(floor));

        let player = physics.create_rigid_body(
            RigidBodyDesc::kinematic()
                .with_position(0.0, 1.0, 0.0)
                .with_layer(CollisionLayer::PLAYER),
        );
        let player_colliders = vec![physics.create_collider(
            ColliderDesc::new(ColliderShape::capsule(0.5, 0.3)),
            Some(player),
        )];

        let crate_box = prop(
            &mut physics,
            Vec3::new(0.0, 0.25, -2.0),
            ColliderShape::cuboid(0.25, 0.25, 0.25),
            5.0,
        );
        let barrel = prop(
            &mut physics,
            Vec3::new(1.2, 0.4, -2.2),
            ColliderShape::cylinder(0.4, 0.3),
            20.0,
        );
        let anvil = prop(
            &mut physics,
            Vec3::new(-1.0, 0.2, -2.0),
            ColliderShape::cuboid(0.3, 0.2, 0.2),
            200.0,
        );
        let statue = prop(
            &mut physics,
            Vec3::new(-2.0, 0.5, -1.0),
            ColliderShape::cuboid(0.2, 0.5, 0.2),
            10.0,
        );
        physics.add_tag(statue, &config.carry.exclusion_tag)?;

        physics.sync_query_pipeline();
        log::info!(
            "Scene ready: {} bodies, {} colliders",
            physics.body_count(),
            physics.collider_count()
        );

        Ok(Self {
            physics,
            player,
            player_colliders,
            crate_box,
            barrel,
            anvil,
            statue,
        })
    }

    /// Player's eye looking straight ahead
    pub fn look_ahead(&self) -> Option<Viewer> {
        let eye = self.physics.body_position(self.player).ok()? + EYE_OFFSET;
        Some(Viewer::new(eye, Vec3::NEG_Z))
    }

    /// Player's eye looking at the centre of `body` (ahead if it is gone)
    pub fn look_at(&self, body: RigidBodyHandle) -> Option<Viewer> {
        let eye = self.physics.body_position(self.player).ok()? + EYE_OFFSET;
        match self.physics.body_position(body) {
            Ok(target) => Some(Viewer::new(eye, target - eye)),
            Err(_) => self.look_ahead(),
        }
    }
}

fn prop(physics: &mut PhysicsWorld, position: Vec3, shape: ColliderShape, mass: f32) -> RigidBodyHandle {
    let body = physics.create_rigid_body(
        RigidBodyDesc::dynamic()
            .with_position(position.x, position.y, position.z)
            .with_layer(CollisionLayer::PROPS)
            .with_ccd(),
    );
    physics.create_collider(ColliderDesc::new(shape).with_mass(mass), Some(body));
    body
}
