//! Lock-on target acquisition

use crate::backend::{CarryBackend, Viewer};
use crate::config::CarryConfig;
use crate::eligibility::is_body_eligible;

/// Per-step ray cast from the viewer resolving to at most one candidate.
///
/// The candidate is a cache: it is overwritten on every refresh and never
/// keeps the body alive.
#[derive(Debug, Clone)]
pub struct TargetAcquisition<B> {
    candidate: Option<B>,
}

impl<B: Copy + PartialEq> TargetAcquisition<B> {
    /// Create with no candidate
    pub fn new() -> Self {
        Self { candidate: None }
    }

    /// Current lock-on candidate
    pub fn candidate(&self) -> Option<B> {
        self.candidate
    }

    /// Forget the candidate
    pub fn clear(&mut self) {
        self.candidate = None;
    }

    /// Cast once along the view ray and update the candidate.
    ///
    /// Returns `true` when the candidate changed.
    pub fn refresh<W>(
        &mut self,
        world: &W,
        viewer: &Viewer,
        config: &CarryConfig,
        exclude: &[W::Collider],
    ) -> bool
    where
        W: CarryBackend<Body = B>,
    {
        let found = world
            .cast_ray(
                viewer.position,
                viewer.forward,
                config.pickup_range,
                config.pickup_mask,
                exclude,
            )
            .and_then(|hit| world.body_of(hit.collider))
            .filter(|body| is_body_eligible(world, *body, config));

        let changed = found != self.candidate;
        self.candidate = found;
        changed
    }
}

impl<B: Copy + PartialEq> Default for TargetAcquisition<B> {
    fn default() -> Self {
        Self::new()
    }
}
