//! The carry state machine
//!
//! ```text
//!            pickup (eligible candidate)
//!   ┌──────┐ ───────────────────────────▶ ┌─────────┐
//!   │ Idle │                              │ Holding │
//!   └──────┘ ◀─────────────────────────── └─────────┘
//!      ▲      drop / throw / out of range      │
//!      └──────────── held body removed ────────┘
//! ```
//!
//! The lock-on candidate lives inside `Idle` and the carry session inside
//! `Holding`, so neither can outlive the state it belongs to.

use crate::acquisition::TargetAcquisition;
use crate::backend::{CarryBackend, Pose, Viewer};
use crate::config::CarryConfig;
use crate::error::{CarryError, Result};
use crate::events::{CarryEvent, EventCollector, ReleaseReason};
use crate::hold::{self, HoldTarget};
use crate::release;
use crate::session::{CarrySession, SavedPhysicalProperties};
use glam::Vec3;

/// Carrier intent polled once per step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CarryIntent {
    /// Pick up the lock-on candidate, or drop what is held
    pub pickup: bool,
    /// Throw what is held
    pub throw: bool,
    /// Hold distance adjustment (scroll wheel ticks or similar)
    pub distance_delta: f32,
}

impl CarryIntent {
    /// No intent this step
    pub const NONE: Self = Self {
        pickup: false,
        throw: false,
        distance_delta: 0.0,
    };

    /// Pickup/drop toggle
    pub fn pickup() -> Self {
        Self {
            pickup: true,
            ..Self::NONE
        }
    }

    /// Throw
    pub fn throw() -> Self {
        Self {
            throw: true,
            ..Self::NONE
        }
    }

    /// Hold distance adjustment
    pub fn adjust(delta: f32) -> Self {
        Self {
            distance_delta: delta,
            ..Self::NONE
        }
    }
}

/// Coarse carry state for prompts and HUDs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarryPhase {
    /// Nothing held, nothing pickable under the view ray
    Idle,
    /// Nothing held, an eligible body is under the view ray
    LockedOn,
    /// A body is held
    Holding,
}

/// Controller state
#[derive(Debug, Clone)]
pub enum CarryState<B, C> {
    /// Not holding; tracking the body under the view ray
    Idle(TargetAcquisition<B>),
    /// Holding a body
    Holding(CarrySession<B, C>),
}

impl<B: Copy + PartialEq, C: Copy> CarryState<B, C> {
    fn idle() -> Self {
        CarryState::Idle(TargetAcquisition::new())
    }
}

/// View ray of the last step, for debug drawing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRay {
    /// Ray origin
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
    /// Ray length
    pub length: f32,
}

/// What the controller looked at and aimed for in the last step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CarryDebug {
    /// Acquisition ray (present whenever a viewer was available)
    pub view_ray: Option<ViewRay>,
    /// Hold target (present while holding)
    pub target: Option<HoldTarget>,
}

/// Pickup/hold/throw controller for one carrier
pub struct CarryController<W: CarryBackend> {
    config: CarryConfig,
    carrier: Vec<W::Collider>,
    state: CarryState<W::Body, W::Collider>,
    events: EventCollector<W::Body>,
    debug: CarryDebug,
    viewer_missing_reported: bool,
}

impl<W: CarryBackend> CarryController<W> {
    /// Create a controller for a carrier made of `carrier` colliders
    pub fn new(config: CarryConfig, carrier: Vec<W::Collider>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            carrier,
            state: CarryState::idle(),
            events: EventCollector::new(),
            debug: CarryDebug::default(),
            viewer_missing_reported: false,
        })
    }

    // ==================== Accessors ====================

    /// Configuration
    pub fn config(&self) -> &CarryConfig {
        &self.config
    }

    /// Colliders of the carrier
    pub fn carrier_colliders(&self) -> &[W::Collider] {
        &self.carrier
    }

    /// Full state
    pub fn state(&self) -> &CarryState<W::Body, W::Collider> {
        &self.state
    }

    /// Coarse state
    pub fn phase(&self) -> CarryPhase {
        match &self.state {
            CarryState::Holding(_) => CarryPhase::Holding,
            CarryState::Idle(acquisition) if acquisition.candidate().is_some() => CarryPhase::LockedOn,
            CarryState::Idle(_) => CarryPhase::Idle,
        }
    }

    /// Whether a body is held
    pub fn is_holding(&self) -> bool {
        matches!(self.state, CarryState::Holding(_))
    }

    /// Current lock-on candidate
    pub fn lock_on(&self) -> Option<W::Body> {
        match &self.state {
            CarryState::Idle(acquisition) => acquisition.candidate(),
            CarryState::Holding(_) => None,
        }
    }

    /// Active carry session
    pub fn session(&self) -> Option<&CarrySession<W::Body, W::Collider>> {
        match &self.state {
            CarryState::Holding(session) => Some(session),
            CarryState::Idle(_) => None,
        }
    }

    /// Held body
    pub fn held_body(&self) -> Option<W::Body> {
        self.session().map(|s| s.body())
    }

    /// Current hold distance
    pub fn hold_distance(&self) -> Option<f32> {
        self.session().map(|s| s.hold_distance())
    }

    /// View ray and hold target of the last step
    pub fn debug(&self) -> &CarryDebug {
        &self.debug
    }

    /// Events recorded since the last drain
    pub fn pending_events(&self) -> &[CarryEvent<W::Body>] {
        self.events.pending()
    }

    /// Take the recorded events.
    ///
    /// Events pile up until drained, and lock-on changes alone add one per
    /// change of candidate. Call this once per step, after `step`.
    pub fn drain_events(&mut self) -> Vec<CarryEvent<W::Body>> {
        self.events.drain()
    }

    // ==================== Step ====================

    /// Run one simulation step. Call before the world integrates.
    ///
    /// With no viewer the controller does nothing (and holds nothing up).
    pub fn step(&mut self, world: &mut W, viewer: Option<Viewer>, intent: &CarryIntent, dt: f32) {
        let Some(viewer) = viewer else {
            if !self.viewer_missing_reported {
                log::warn!("Carry controller has no viewer pose; staying inactive");
                self.viewer_missing_reported = true;
            }
            self.debug = CarryDebug::default();
            return;
        };
        self.viewer_missing_reported = false;
        self.debug = CarryDebug {
            view_ray: Some(ViewRay {
                origin: viewer.position,
                direction: viewer.forward,
                length: self.config.pickup_range,
            }),
            target: None,
        };

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        if self.is_holding() {
            self.step_holding(world, &viewer, intent, dt);
        } else {
            self.step_idle(world, &viewer, intent);
        }
    }

    fn step_idle(&mut self, world: &mut W, viewer: &Viewer, intent: &CarryIntent) {
        if let CarryState::Idle(acquisition) = &mut self.state {
            if acquisition.refresh(&*world, viewer, &self.config, &self.carrier) {
                log::debug!("Lock-on candidate: {:?}", acquisition.candidate());
                self.events.push(CarryEvent::LockOnChanged {
                    candidate: acquisition.candidate(),
                });
            }
        }

        if intent.pickup {
            self.pickup(world, viewer);
        }
    }

    fn step_holding(&mut self, world: &mut W, viewer: &Viewer, intent: &CarryIntent, dt: f32) {
        let Some(body) = self.held_body() else {
            return;
        };
        let state = match world.body_state(body) {
            Ok(state) => state,
            Err(_) => {
                self.lose_held_body(body);
                return;
            }
        };

        if intent.pickup {
            self.release(world, ReleaseReason::Requested);
            return;
        }
        if intent.throw {
            self.throw(world, viewer);
            return;
        }

        let delta = if intent.distance_delta.is_nan() {
            0.0
        } else {
            intent.distance_delta * self.config.scroll_sensitivity
        };
        if let CarryState::Holding(session) = &mut self.state {
            let distance = self.config.clamp_hold_distance(session.hold_distance() + delta);
            session.set_hold_distance(distance);
        }

        let separation = viewer.position.distance(state.pose.position);
        if separation > self.config.release_distance {
            log::info!(
                "Held body {:?} is {:.2} from the carrier (limit {:.2}); dropping",
                body,
                separation,
                self.config.release_distance
            );
            self.release(world, ReleaseReason::OutOfRange);
            return;
        }

        let CarryState::Holding(session) = &self.state else {
            return;
        };
        match hold::drive(world, session, &state, viewer, dt, &self.config) {
            Ok(target) => self.debug.target = Some(target),
            Err(err) if err.is_missing_object() => self.lose_held_body(body),
            Err(err) => log::warn!("Hold step for {:?} failed: {}", body, err),
        }
    }

    // ==================== Transitions ====================

    /// Pickup/drop toggle. Returns `true` if the state changed.
    pub fn toggle(&mut self, world: &mut W, viewer: &Viewer) -> bool {
        if self.is_holding() {
            self.release(world, ReleaseReason::Requested)
        } else {
            self.pickup(world, viewer)
        }
    }

    /// Pick up the lock-on candidate.
    ///
    /// Ignored (returns `false`) while holding, with no candidate, or when the
    /// candidate became ineligible or vanished since it was acquired.
    pub fn pickup(&mut self, world: &mut W, viewer: &Viewer) -> bool {
        let Some(body) = self.lock_on() else {
            return false;
        };
        if !crate::eligibility::is_body_eligible(&*world, body, &self.config) {
            log::debug!("Pickup of {:?} ignored: no longer eligible", body);
            self.state = CarryState::idle();
            return false;
        }

        match self.begin_carry(world, body, viewer) {
            Ok(session) => {
                log::info!("Picked up {:?} ({:?})", body, self.config.collision_fix);
                self.state = CarryState::Holding(session);
                self.events.push(CarryEvent::PickedUp { body });
                true
            }
            Err(err) => {
                log::warn!("Pickup of {:?} failed: {}", body, err);
                self.state = CarryState::idle();
                false
            }
        }
    }

    fn begin_carry(
        &self,
        world: &mut W,
        body: W::Body,
        viewer: &Viewer,
    ) -> Result<CarrySession<W::Body, W::Collider>> {
        let state = world.body_state(body)?;
        let saved = SavedPhysicalProperties::capture(&state);
        let fix = self
            .config
            .collision_fix
            .apply(world, body, &self.carrier, self.config.held_layer)?;
        let distance = self.config.clamp_hold_distance(self.config.default_hold_distance);
        let session = CarrySession::new(body, distance, state.mass, saved, fix);

        if let Err(err) = self.settle_for_carry(world, body, &state.pose, viewer, distance) {
            // Leave the body as we found it
            if let Err(undo) = release::drop_body(world, session) {
                log::warn!("Could not undo partial pickup of {:?}: {}", body, undo);
            }
            return Err(err);
        }
        Ok(session)
    }

    fn settle_for_carry(
        &self,
        world: &mut W,
        body: W::Body,
        pose: &Pose,
        viewer: &Viewer,
        distance: f32,
    ) -> Result<()> {
        world.set_linear_velocity(body, Vec3::ZERO)?;
        world.set_angular_velocity(body, Vec3::ZERO)?;
        if !self.config.collision_fix.is_kinematic_drive() {
            world.set_use_gravity(body, false)?;
            world.set_drag(body, self.config.held_linear_drag, self.config.held_angular_drag)?;
        }

        // Start part of the way there so the first hold step is not a yank
        let target = hold::hold_target(viewer, pose.position, distance);
        let nudge = self.config.pickup_nudge;
        let rotation = match target.rotation {
            Some(desired) => pose.rotation.slerp(desired, nudge).normalize(),
            None => pose.rotation,
        };
        world.set_pose(body, Pose::new(pose.position.lerp(target.position, nudge), rotation))
    }

    /// Drop the held body. Returns `false` if nothing was held.
    pub fn drop(&mut self, world: &mut W) -> bool {
        self.release(world, ReleaseReason::Requested)
    }

    /// Drop the held body on behalf of the controller's owner
    pub fn force_release(&mut self, world: &mut W) -> bool {
        self.release(world, ReleaseReason::Forced)
    }

    fn release(&mut self, world: &mut W, reason: ReleaseReason) -> bool {
        let CarryState::Holding(session) = std::mem::replace(&mut self.state, CarryState::idle()) else {
            return false;
        };
        let body = session.body();
        if !world.contains_body(body) {
            self.events.push(CarryEvent::HeldBodyLost { body });
            return true;
        }

        if let Err(err) = release::drop_body(world, session) {
            log::warn!("Dropping {:?} left it partially restored: {}", body, err);
        }
        log::info!("Dropped {:?} ({:?})", body, reason);
        self.events.push(CarryEvent::Dropped { body, reason });
        true
    }

    /// Throw the held body along the view direction.
    ///
    /// Returns the launch velocity, or `None` if nothing was thrown.
    pub fn throw(&mut self, world: &mut W, viewer: &Viewer) -> Option<Vec3> {
        let CarryState::Holding(session) = std::mem::replace(&mut self.state, CarryState::idle()) else {
            return None;
        };
        let body = session.body();

        match release::throw_body(world, session, viewer, &self.config) {
            Ok((body, velocity)) => {
                log::info!("Threw {:?} at {:.2} m/s", body, velocity.length());
                self.events.push(CarryEvent::Thrown { body, velocity });
                Some(velocity)
            }
            Err(CarryError::BodyNotFound(_)) => {
                self.events.push(CarryEvent::HeldBodyLost { body });
                None
            }
            Err(err) => {
                log::warn!("Throwing {:?} failed: {}", body, err);
                self.events.push(CarryEvent::Dropped {
                    body,
                    reason: ReleaseReason::Requested,
                });
                None
            }
        }
    }

    fn lose_held_body(&mut self, body: W::Body) {
        log::warn!("Held body {:?} was removed from the world; releasing", body);
        self.state = CarryState::idle();
        self.events.push(CarryEvent::HeldBodyLost { body });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision_fix::CollisionFix;
    use crate::testing::{tilted, TestBody, TestCollider, TestWorld, HELD_LAYER};
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    struct Scene {
        world: TestWorld,
        carrier: TestCollider,
        crate_body: TestBody,
        crate_collider: TestCollider,
        viewer: Viewer,
    }

    fn scene() -> Scene {
        let mut world = TestWorld::new();
        let (_, carrier) = world.spawn_carrier(Vec3::new(0.0, 1.0, 0.0));
        let (crate_body, crate_collider) = world.spawn(Vec3::new(0.0, 1.6, -2.5), 4.0, 0.4);
        world.body_mut(crate_body).state.pose.rotation = tilted();
        world.body_mut(crate_body).state.linear_drag = 0.2;
        Scene {
            world,
            carrier,
            crate_body,
            crate_collider,
            viewer: Viewer::new(Vec3::new(0.0, 1.6, 0.0), Vec3::NEG_Z),
        }
    }

    fn controller(scene: &Scene, config: CarryConfig) -> CarryController<TestWorld> {
        CarryController::new(config.with_held_layer(HELD_LAYER), vec![scene.carrier]).unwrap()
    }

    fn step(c: &mut CarryController<TestWorld>, s: &mut Scene, intent: CarryIntent) {
        c.step(&mut s.world, Some(s.viewer), &intent, DT);
    }

    #[test]
    fn test_locks_on_then_picks_up() {
        let mut s = scene();
        let mut c = controller(&s, CarryConfig::default());

        step(&mut c, &mut s, CarryIntent::NONE);
        assert_eq!(c.phase(), CarryPhase::LockedOn);
        assert_eq!(c.lock_on(), Some(s.crate_body));

        step(&mut c, &mut s, CarryIntent::pickup());
        assert_eq!(c.phase(), CarryPhase::Holding);
        assert_eq!(c.held_body(), Some(s.crate_body));
        assert_eq!(c.lock_on(), None);
        assert_eq!(c.hold_distance(), Some(2.0));

        let events = c.drain_events();
        assert_eq!(
            events,
            vec![
                CarryEvent::LockOnChanged {
                    candidate: Some(s.crate_body)
                },
                CarryEvent::PickedUp { body: s.crate_body },
            ]
        );
    }

    #[test]
    fn test_pickup_without_candidate_mutates_nothing() {
        let mut s = scene();
        s.viewer = Viewer::new(Vec3::new(0.0, 1.6, 0.0), Vec3::Z);
        let before = s.world.body_state(s.crate_body).unwrap();
        let mut c = controller(&s, CarryConfig::default());

        step(&mut c, &mut s, CarryIntent::pickup());
        assert_eq!(c.phase(), CarryPhase::Idle);
        assert_eq!(s.world.body_state(s.crate_body).unwrap(), before);
        assert!(s.world.ignored_pairs.is_empty());
        assert!(c.drain_events().is_empty());
    }

    #[test]
    fn test_pickup_settles_body() {
        let mut s = scene();
        s.world.body_mut(s.crate_body).state.linear_velocity = Vec3::new(3.0, 0.0, 0.0);
        s.world.body_mut(s.crate_body).state.angular_velocity = Vec3::ONE;
        let config = CarryConfig::default();
        let mut c = controller(&s, config.clone());

        step(&mut c, &mut s, CarryIntent::pickup());
        let state = s.world.body_state(s.crate_body).unwrap();
        assert_eq!(state.linear_velocity, Vec3::ZERO);
        assert_eq!(state.angular_velocity, Vec3::ZERO);
        assert!(!state.use_gravity);
        assert_eq!(state.linear_drag, config.held_linear_drag);
        assert_eq!(state.angular_drag, config.held_angular_drag);
        // Nudged half way from z=-2.5 toward the 2.0 hold point
        assert_relative_eq!(state.pose.position.z, -2.25, epsilon = 1e-5);
    }

    #[test]
    fn test_pickup_then_drop_restores_properties_for_every_fix() {
        for fix in CollisionFix::ALL {
            let mut s = scene();
            let before = s.world.body_state(s.crate_body).unwrap();
            let saved = SavedPhysicalProperties::capture(&before);
            let mut c = controller(&s, CarryConfig::default().with_collision_fix(fix));

            step(&mut c, &mut s, CarryIntent::NONE);
            assert!(c.pickup(&mut s.world, &s.viewer), "{:?}", fix);
            assert!(c.drop(&mut s.world), "{:?}", fix);

            let after = s.world.body_state(s.crate_body).unwrap();
            assert!(saved.matches(&after), "{:?}: {:?} vs {:?}", fix, before, after);
            assert!(s.world.is_collider_enabled(s.crate_collider).unwrap());
            assert!(s.world.ignored_pairs.is_empty());
            assert_eq!(c.phase(), CarryPhase::Idle);
        }
    }

    #[test]
    fn test_no_carrier_contact_while_held_for_every_fix() {
        for fix in CollisionFix::ALL {
            let mut s = scene();
            let mut c = controller(&s, CarryConfig::default().with_collision_fix(fix));
            step(&mut c, &mut s, CarryIntent::NONE);
            step(&mut c, &mut s, CarryIntent::pickup());

            // Shove the held body into the carrier
            s.world.body_mut(s.crate_body).state.pose.position = Vec3::new(0.0, 1.2, -0.3);
            assert!(!s.world.collides(s.carrier, s.crate_collider), "{:?}", fix);

            step(&mut c, &mut s, CarryIntent::pickup());
            assert!(!c.is_holding());
            assert!(s.world.collides(s.carrier, s.crate_collider), "{:?}", fix);
        }
    }

    #[test]
    fn test_pickup_while_holding_drops() {
        let mut s = scene();
        let mut c = controller(&s, CarryConfig::default());
        step(&mut c, &mut s, CarryIntent::pickup());
        step(&mut c, &mut s, CarryIntent::NONE);
        assert!(c.is_holding());

        step(&mut c, &mut s, CarryIntent::pickup());
        assert!(!c.is_holding());
        assert!(c.drain_events().contains(&CarryEvent::Dropped {
            body: s.crate_body,
            reason: ReleaseReason::Requested
        }));
    }

    #[test]
    fn test_hold_distance_stays_in_range() {
        let mut s = scene();
        let mut c = controller(&s, CarryConfig::default());
        step(&mut c, &mut s, CarryIntent::NONE);
        step(&mut c, &mut s, CarryIntent::pickup());

        for delta in [1.0e6, -3.0, -1.0e6, 0.25, 7.0, -0.1, f32::MAX, -f32::MAX, f32::NAN] {
            step(&mut c, &mut s, CarryIntent::adjust(delta));
            let distance = c.hold_distance().unwrap();
            assert!((1.0..=3.0).contains(&distance), "delta {} -> {}", delta, distance);
            s.world.end_step();
        }
    }

    #[test]
    fn test_scroll_saturates_at_pickup_range() {
        let mut s = scene();
        let config = CarryConfig {
            default_hold_distance: 2.5,
            ..Default::default()
        };
        let mut c = controller(&s, config);
        step(&mut c, &mut s, CarryIntent::NONE);
        step(&mut c, &mut s, CarryIntent::pickup());
        assert_eq!(c.hold_distance(), Some(2.5));

        step(&mut c, &mut s, CarryIntent::adjust(5.0));
        assert_eq!(c.hold_distance(), Some(3.0));
    }

    #[test]
    fn test_hold_step_applies_force_toward_target() {
        let mut s = scene();
        let mut c = controller(&s, CarryConfig::default());
        step(&mut c, &mut s, CarryIntent::NONE);
        step(&mut c, &mut s, CarryIntent::pickup());
        step(&mut c, &mut s, CarryIntent::NONE);

        let target = c.debug().target.unwrap();
        assert_relative_eq!(target.position.z, -2.0, epsilon = 1e-5);
        // Body sits at z=-2.25, target is nearer the viewer
        assert!(s.world.body(s.crate_body).force.z > 0.0);
        assert!(c.debug().view_ray.is_some());
    }

    #[test]
    fn test_out_of_range_drops_before_force() {
        let mut s = scene();
        let mut c = controller(&s, CarryConfig::default());
        step(&mut c, &mut s, CarryIntent::NONE);
        step(&mut c, &mut s, CarryIntent::pickup());
        c.drain_events();

        s.world.body_mut(s.crate_body).state.pose.position = Vec3::new(0.0, 1.6, -6.5);
        step(&mut c, &mut s, CarryIntent::NONE);

        assert_eq!(c.phase(), CarryPhase::Idle);
        assert_eq!(s.world.body(s.crate_body).force, Vec3::ZERO);
        assert!(s.world.body_state(s.crate_body).unwrap().use_gravity);
        assert_eq!(
            c.drain_events(),
            vec![CarryEvent::Dropped {
                body: s.crate_body,
                reason: ReleaseReason::OutOfRange
            }]
        );
    }

    #[test]
    fn test_release_distance_is_independent_of_range() {
        let mut s = scene();
        let config = CarryConfig::default().with_release_distance(10.0);
        let mut c = controller(&s, config);
        step(&mut c, &mut s, CarryIntent::NONE);
        step(&mut c, &mut s, CarryIntent::pickup());

        s.world.body_mut(s.crate_body).state.pose.position = Vec3::new(0.0, 1.6, -6.5);
        step(&mut c, &mut s, CarryIntent::NONE);
        assert!(c.is_holding());
    }

    #[test]
    fn test_throw_restores_then_launches() {
        let mut s = scene();
        let config = CarryConfig::default().with_throw(500.0, 50.0, 1500.0);
        let mut c = controller(&s, config);
        step(&mut c, &mut s, CarryIntent::NONE);
        step(&mut c, &mut s, CarryIntent::pickup());
        s.world.body_mut(s.crate_body).state.linear_velocity = Vec3::new(0.0, 0.0, -2.0);

        step(&mut c, &mut s, CarryIntent::throw());
        assert!(!c.is_holding());

        let state = s.world.body_state(s.crate_body).unwrap();
        assert!(state.use_gravity);
        assert_relative_eq!(state.linear_drag, 0.2);
        // (500 + 2 * 50) / 4
        assert_relative_eq!(state.linear_velocity.z, -150.0, epsilon = 1e-3);
        assert_relative_eq!(state.linear_velocity.x, 0.0);
        assert!(matches!(c.drain_events().last(), Some(CarryEvent::Thrown { .. })));
    }

    #[test]
    fn test_throw_uses_mass_from_pickup() {
        let mut s = scene();
        let config = CarryConfig::default().with_throw(500.0, 50.0, 1500.0);
        let mut c = controller(&s, config);
        step(&mut c, &mut s, CarryIntent::NONE);
        step(&mut c, &mut s, CarryIntent::pickup());
        assert_relative_eq!(c.session().unwrap().mass(), 4.0);
        s.world.body_mut(s.crate_body).state.mass = 0.0;

        step(&mut c, &mut s, CarryIntent::throw());
        // 500 / 4, not 500 / 1
        let velocity = s.world.body_state(s.crate_body).unwrap().linear_velocity;
        assert_relative_eq!(velocity.z, -125.0, epsilon = 1e-3);
    }

    #[test]
    fn test_throw_while_idle_is_ignored() {
        let mut s = scene();
        let mut c = controller(&s, CarryConfig::default());
        step(&mut c, &mut s, CarryIntent::throw());
        assert_eq!(c.phase(), CarryPhase::LockedOn);
        assert_eq!(s.world.body_state(s.crate_body).unwrap().linear_velocity, Vec3::ZERO);
    }

    #[test]
    fn test_removed_held_body_returns_to_idle() {
        let mut s = scene();
        let mut c = controller(&s, CarryConfig::default().with_collision_fix(CollisionFix::IgnoreCollision));
        step(&mut c, &mut s, CarryIntent::NONE);
        step(&mut c, &mut s, CarryIntent::pickup());
        c.drain_events();

        s.world.remove(s.crate_body);
        step(&mut c, &mut s, CarryIntent::NONE);

        assert_eq!(c.phase(), CarryPhase::Idle);
        assert_eq!(c.drain_events(), vec![CarryEvent::HeldBodyLost { body: s.crate_body }]);
        // Later steps keep working
        step(&mut c, &mut s, CarryIntent::pickup());
        assert_eq!(c.phase(), CarryPhase::Idle);
    }

    #[test]
    fn test_vanished_candidate_is_ignored() {
        let mut s = scene();
        let mut c = controller(&s, CarryConfig::default());
        step(&mut c, &mut s, CarryIntent::NONE);
        assert_eq!(c.lock_on(), Some(s.crate_body));

        s.world.remove(s.crate_body);
        assert!(!c.pickup(&mut s.world, &s.viewer));
        assert_eq!(c.phase(), CarryPhase::Idle);
    }

    #[test]
    fn test_candidate_turned_ineligible_is_ignored() {
        let mut s = scene();
        let mut c = controller(&s, CarryConfig::default());
        step(&mut c, &mut s, CarryIntent::NONE);

        s.world.body_mut(s.crate_body).state.mass = 1000.0;
        assert!(!c.pickup(&mut s.world, &s.viewer));
        assert!(!c.is_holding());
        assert!(s.world.body_state(s.crate_body).unwrap().use_gravity);
    }

    #[test]
    fn test_missing_viewer_does_nothing() {
        let mut s = scene();
        let mut c = controller(&s, CarryConfig::default());
        c.step(&mut s.world, None, &CarryIntent::pickup(), DT);
        assert_eq!(c.phase(), CarryPhase::Idle);
        assert!(c.debug().view_ray.is_none());

        step(&mut c, &mut s, CarryIntent::NONE);
        step(&mut c, &mut s, CarryIntent::pickup());
        c.step(&mut s.world, None, &CarryIntent::pickup(), DT);
        assert!(c.is_holding());
    }

    #[test]
    fn test_kinematic_mode_leaves_drag_and_drives_directly() {
        let mut s = scene();
        let mut c = controller(&s, CarryConfig::default().with_collision_fix(CollisionFix::MakeKinematic));
        step(&mut c, &mut s, CarryIntent::NONE);
        step(&mut c, &mut s, CarryIntent::pickup());

        let state = s.world.body_state(s.crate_body).unwrap();
        assert!(state.is_kinematic);
        assert!(!state.use_gravity);
        assert_relative_eq!(state.linear_drag, 0.2);

        step(&mut c, &mut s, CarryIntent::NONE);
        let data = s.world.body(s.crate_body);
        assert_eq!(data.force, Vec3::ZERO);
        assert!(data.kinematic_target.is_some());

        c.force_release(&mut s.world);
        let state = s.world.body_state(s.crate_body).unwrap();
        assert!(!state.is_kinematic);
        assert!(state.use_gravity);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let s = scene();
        let config = CarryConfig {
            pickup_range: -1.0,
            ..Default::default()
        };
        assert!(CarryController::<TestWorld>::new(config, vec![s.carrier]).is_err());
    }
}
