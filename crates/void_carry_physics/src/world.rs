//! The Rapier world behind the carry backend

use crate::body::{RigidBodyDesc, RigidBodyHandle};
use crate::collider::{ColliderDesc, ColliderHandle};
use crate::config::PhysicsConfig;
use crate::convert::{from_isometry, from_vector};
use crate::error::{PhysicsError, Result};
use crate::events::ContactLog;
use crate::layers::{CollisionLayer, CollisionMatrix};
use crate::query::PhysicsQuery;
use glam::Vec3;
use rapier3d::prelude as rapier;
use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use void_carry::Pose;

type PairKey = (rapier::ColliderHandle, rapier::ColliderHandle);

fn pair_key(a: rapier::ColliderHandle, b: rapier::ColliderHandle) -> PairKey {
    if a.into_raw_parts() <= b.into_raw_parts() {
        (a, b)
    } else {
        (b, a)
    }
}

/// Contact hook dropping collider pairs marked as ignored
#[derive(Debug, Default)]
struct ContactFilter {
    ignored: HashSet<PairKey>,
}

impl rapier::PhysicsHooks for ContactFilter {
    fn filter_contact_pair(&self, context: &rapier::PairFilterContext) -> Option<rapier::SolverFlags> {
        if self.ignored.contains(&pair_key(context.collider1, context.collider2)) {
            None
        } else {
            Some(rapier::SolverFlags::COMPUTE_IMPULSES)
        }
    }
}

/// A Rapier world plus the bookkeeping the carry controller needs: layers,
/// tags, stashed gravity scales and ignored collider pairs.
pub struct PhysicsWorld {
    config: PhysicsConfig,

    // Rapier state
    pipeline: rapier::PhysicsPipeline,
    gravity: rapier::Vector<f32>,
    integration_params: rapier::IntegrationParameters,
    islands: rapier::IslandManager,
    broad_phase: rapier::DefaultBroadPhase,
    narrow_phase: rapier::NarrowPhase,
    impulse_joints: rapier::ImpulseJointSet,
    multibody_joints: rapier::MultibodyJointSet,
    ccd_solver: rapier::CCDSolver,
    query_pipeline: rapier::QueryPipeline,
    bodies: rapier::RigidBodySet,
    colliders: rapier::ColliderSet,

    /// Per-pair contact suppression
    contact_filter: ContactFilter,

    /// Layer rules
    matrix: CollisionMatrix,

    /// Layer of each body
    layers: HashMap<RigidBodyHandle, CollisionLayer>,

    /// Gameplay tags of each body
    tags: HashMap<RigidBodyHandle, HashSet<String>>,

    /// Gravity scales stashed while gravity is switched off
    suppressed_gravity: HashMap<RigidBodyHandle, f32>,

    /// Body-local mass of disabled colliders, still counted on their body
    parked_mass: HashMap<ColliderHandle, (RigidBodyHandle, rapier::MassProperties)>,

    /// Contacts reported by the last `step`
    contacts: ContactLog,

    /// Accumulated time for fixed timestep
    accumulated_time: f32,
}

impl PhysicsWorld {
    /// Build an empty world. `config` is trusted; see `try_new`.
    pub fn new(config: PhysicsConfig) -> Self {
        let gravity = rapier::Vector::new(config.gravity[0], config.gravity[1], config.gravity[2]);

        let mut integration_params = rapier::IntegrationParameters::default();
        integration_params.dt = config.timestep;
        integration_params.num_solver_iterations =
            NonZeroUsize::new(config.solver_iterations).unwrap_or(NonZeroUsize::MIN);

        Self {
            config,
            pipeline: rapier::PhysicsPipeline::new(),
            gravity,
            integration_params,
            islands: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            impulse_joints: rapier::ImpulseJointSet::new(),
            multibody_joints: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
            query_pipeline: rapier::QueryPipeline::new(),
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            contact_filter: ContactFilter::default(),
            matrix: CollisionMatrix::default(),
            layers: HashMap::new(),
            tags: HashMap::new(),
            suppressed_gravity: HashMap::new(),
            parked_mass: HashMap::new(),
            contacts: ContactLog::default(),
            accumulated_time: 0.0,
        }
    }

    /// Validate `config`, then create a world from it
    pub fn try_new(config: PhysicsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Replace the layer rules. Only affects colliders created afterwards.
    pub fn with_collision_matrix(mut self, matrix: CollisionMatrix) -> Self {
        self.matrix = matrix;
        self
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn collision_matrix(&self) -> &CollisionMatrix {
        &self.matrix
    }

    pub fn gravity(&self) -> Vec3 {
        from_vector(&self.gravity)
    }

    // ==================== Rigid Bodies ====================

    /// Insert a body and record its layer and tags
    pub fn create_rigid_body(&mut self, desc: RigidBodyDesc) -> RigidBodyHandle {
        let mut builder = desc.to_rapier_builder();
        if !self.config.sleeping_enabled {
            builder = builder.can_sleep(false);
        }
        let handle = RigidBodyHandle(self.bodies.insert(builder));

        self.layers.insert(handle, desc.layer);
        if !desc.tags.is_empty() {
            self.tags.insert(handle, desc.tags.into_iter().collect());
        }
        handle
    }

    /// Remove a rigid body and its colliders
    pub fn remove_rigid_body(&mut self, handle: RigidBodyHandle) {
        let attached: Vec<rapier::ColliderHandle> = self
            .bodies
            .get(handle.0)
            .map(|b| b.colliders().to_vec())
            .unwrap_or_default();

        self.bodies.remove(
            handle.0,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );

        self.contact_filter
            .ignored
            .retain(|(a, b)| !attached.contains(a) && !attached.contains(b));
        self.layers.remove(&handle);
        self.tags.remove(&handle);
        self.suppressed_gravity.remove(&handle);
        self.parked_mass.retain(|_, (body, _)| *body != handle);
    }

    /// Whether the body exists
    pub fn contains_body(&self, handle: RigidBodyHandle) -> bool {
        self.bodies.contains(handle.0)
    }

    pub(crate) fn body(&self, handle: RigidBodyHandle) -> Result<&rapier::RigidBody> {
        self.bodies.get(handle.0).ok_or(PhysicsError::BodyNotFound(handle))
    }

    pub(crate) fn body_mut(&mut self, handle: RigidBodyHandle) -> Result<&mut rapier::RigidBody> {
        self.bodies
            .get_mut(handle.0)
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    pub fn body_position(&self, handle: RigidBodyHandle) -> Result<Vec3> {
        self.body(handle).map(|b| from_vector(b.translation()))
    }

    /// Position and rotation as a carry `Pose`
    pub fn body_pose(&self, handle: RigidBodyHandle) -> Result<Pose> {
        self.body(handle).map(|b| from_isometry(b.position()))
    }

    pub fn body_linear_velocity(&self, handle: RigidBodyHandle) -> Result<Vec3> {
        self.body(handle).map(|b| from_vector(b.linvel()))
    }

    /// Current Rapier gravity scale (0 while gravity is switched off)
    pub fn body_gravity_scale(&self, handle: RigidBodyHandle) -> Result<f32> {
        self.body(handle).map(|b| b.gravity_scale())
    }

    /// Layer of a body
    pub fn body_layer(&self, handle: RigidBodyHandle) -> Result<CollisionLayer> {
        self.body(handle)?;
        Ok(self.layers.get(&handle).copied().unwrap_or_default())
    }

    /// Move a body and all its colliders to another layer
    pub fn set_body_layer(&mut self, handle: RigidBodyHandle, layer: CollisionLayer) -> Result<()> {
        if !layer.is_valid() {
            return Err(PhysicsError::InvalidLayer(layer.0));
        }
        let groups = self.matrix.groups(layer).to_rapier();
        let attached = self.body(handle)?.colliders().to_vec();
        for collider in attached {
            if let Some(c) = self.colliders.get_mut(collider) {
                c.set_collision_groups(groups);
            }
        }
        self.layers.insert(handle, layer);
        Ok(())
    }

    /// Tag a body
    pub fn add_tag(&mut self, handle: RigidBodyHandle, tag: &str) -> Result<()> {
        self.body(handle)?;
        self.tags.entry(handle).or_default().insert(tag.to_string());
        Ok(())
    }

    /// Whether a body carries `tag`
    pub fn has_tag(&self, handle: RigidBodyHandle, tag: &str) -> bool {
        self.tags.get(&handle).map_or(false, |tags| tags.contains(tag))
    }

    /// Switch gravity off (stashing the scale) or back on
    pub fn set_gravity_enabled(&mut self, handle: RigidBodyHandle, enabled: bool) -> Result<()> {
        let current = self.body(handle)?.gravity_scale();
        let scale = match (enabled, current == 0.0) {
            (false, false) => {
                self.suppressed_gravity.insert(handle, current);
                0.0
            }
            (true, true) => self.suppressed_gravity.remove(&handle).unwrap_or(1.0),
            _ => return Ok(()),
        };
        self.body_mut(handle)?.set_gravity_scale(scale, true);
        Ok(())
    }

    // ==================== Colliders ====================

    /// Create a collider attached to a rigid body. Its groups follow the body's layer.
    pub fn create_collider(&mut self, desc: ColliderDesc, parent: Option<RigidBodyHandle>) -> ColliderHandle {
        let layer = parent
            .and_then(|body| self.layers.get(&body).copied())
            .unwrap_or_default();
        let builder = desc.to_rapier_builder(self.matrix.groups(layer));

        let handle = match parent {
            Some(body) => {
                let handle = self.colliders.insert_with_parent(builder, body.0, &mut self.bodies);
                if let Some(b) = self.bodies.get_mut(body.0) {
                    b.recompute_mass_properties_from_colliders(&self.colliders);
                }
                handle
            }
            None => self.colliders.insert(builder),
        };
        ColliderHandle(handle)
    }

    pub(crate) fn collider(&self, handle: ColliderHandle) -> Result<&rapier::Collider> {
        self.colliders
            .get(handle.0)
            .ok_or(PhysicsError::ColliderNotFound(handle))
    }

    pub(crate) fn collider_mut(&mut self, handle: ColliderHandle) -> Result<&mut rapier::Collider> {
        self.colliders
            .get_mut(handle.0)
            .ok_or(PhysicsError::ColliderNotFound(handle))
    }

    /// Body a collider is attached to
    pub fn collider_parent(&self, handle: ColliderHandle) -> Option<RigidBodyHandle> {
        self.colliders
            .get(handle.0)
            .and_then(|c| c.parent())
            .map(RigidBodyHandle)
    }

    /// Colliders attached to a body
    pub fn body_colliders(&self, handle: RigidBodyHandle) -> Vec<ColliderHandle> {
        self.bodies
            .get(handle.0)
            .map(|b| b.colliders().iter().copied().map(ColliderHandle).collect())
            .unwrap_or_default()
    }

    /// Enable or disable a collider.
    ///
    /// A disabled collider stops colliding but its mass stays on the parent
    /// body, so a held body with collisions switched off still weighs the same.
    pub fn set_collider_enabled(&mut self, handle: ColliderHandle, enabled: bool) -> Result<()> {
        let collider = self.collider_mut(handle)?;
        if collider.is_enabled() == enabled {
            return Ok(());
        }
        collider.set_enabled(enabled);

        let parent = match collider.parent() {
            Some(parent) => RigidBodyHandle(parent),
            None => return Ok(()),
        };
        if enabled {
            self.parked_mass.remove(&handle);
        } else {
            let local = match collider.position_wrt_parent() {
                Some(offset) => collider.mass_properties().transform_by(offset),
                None => collider.mass_properties(),
            };
            self.parked_mass.insert(handle, (parent, local));
        }

        let parked: rapier::MassProperties = self
            .parked_mass
            .values()
            .filter(|(body, _)| *body == parent)
            .map(|(_, mass)| *mass)
            .sum();
        if let Some(body) = self.bodies.get_mut(parent.0) {
            body.set_additional_mass_properties(parked, true);
            body.recompute_mass_properties_from_colliders(&self.colliders);
        }
        Ok(())
    }

    // ==================== Contact Filtering ====================

    /// Stop (or resume) contact generation between two colliders
    pub fn set_pair_ignored(&mut self, a: ColliderHandle, b: ColliderHandle, ignored: bool) {
        let key = pair_key(a.0, b.0);
        if ignored {
            self.contact_filter.ignored.insert(key);
        } else {
            self.contact_filter.ignored.remove(&key);
        }
    }

    /// Whether contacts between two colliders are suppressed
    pub fn is_pair_ignored(&self, a: ColliderHandle, b: ColliderHandle) -> bool {
        self.contact_filter.ignored.contains(&pair_key(a.0, b.0))
    }

    /// Number of suppressed pairs
    pub fn ignored_pair_count(&self) -> usize {
        self.contact_filter.ignored.len()
    }

    /// Whether two colliders were touching after the last step
    pub fn contact_between(&self, a: ColliderHandle, b: ColliderHandle) -> bool {
        self.narrow_phase
            .contact_pair(a.0, b.0)
            .map_or(false, |pair| pair.has_any_active_contact)
    }

    // ==================== Simulation ====================

    /// Step the physics simulation with fixed timestep.
    ///
    /// Forces and torques added since the last call act during every substep
    /// of this call and are cleared afterwards.
    pub fn step(&mut self, delta_time: f32) {
        self.contacts.clear();
        self.accumulated_time += delta_time;

        let mut steps = 0;
        while self.accumulated_time >= self.config.timestep && steps < self.config.max_substeps {
            self.step_internal();
            self.accumulated_time -= self.config.timestep;
            steps += 1;
        }
        if steps == self.config.max_substeps && self.accumulated_time >= self.config.timestep {
            log::debug!(
                "Physics fell behind by {:.4}s; dropping the backlog",
                self.accumulated_time
            );
            self.accumulated_time = 0.0;
        }

        for (_, body) in self.bodies.iter_mut() {
            body.reset_forces(false);
            body.reset_torques(false);
        }

        self.query_pipeline.update(&self.colliders);
    }

    /// Ray casts only see colliders added before the last sync or step
    pub fn sync_query_pipeline(&mut self) {
        self.query_pipeline.update(&self.colliders);
    }

    fn step_internal(&mut self) {
        let (collision_send, collision_recv) = crossbeam_channel::unbounded();
        let (force_send, _force_recv) = crossbeam_channel::unbounded();
        let event_handler = rapier::ChannelEventCollector::new(collision_send, force_send);

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &self.contact_filter,
            &event_handler,
        );

        self.contacts.collect(&collision_recv);
    }

    // ==================== Queries ====================

    pub fn query(&self) -> PhysicsQuery<'_> {
        PhysicsQuery {
            query_pipeline: &self.query_pipeline,
            colliders: &self.colliders,
            bodies: &self.bodies,
        }
    }

    // ==================== Contacts ====================

    /// Contacts that began or ended during the last `step`
    pub fn contacts(&self) -> &ContactLog {
        &self.contacts
    }

    // ==================== Stats ====================

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}
