//! Which bodies may be picked up

use crate::backend::{BodyState, CarryBackend};
use crate::config::CarryConfig;

/// Check a body's properties against the carry limits.
///
/// Rejects bodies heavier than `max_carry_mass`, bodies carrying the
/// exclusion tag, kinematic bodies and bodies with a degenerate mass.
pub fn is_eligible(state: &BodyState, excluded: bool, config: &CarryConfig) -> bool {
    if excluded || state.is_kinematic {
        return false;
    }
    if !(state.mass.is_finite() && state.mass > 0.0) {
        return false;
    }
    state.mass <= config.max_carry_mass
}

/// Look a body up in the world and check it. Missing bodies are ineligible.
pub fn is_body_eligible<W: CarryBackend>(world: &W, body: W::Body, config: &CarryConfig) -> bool {
    match world.body_state(body) {
        Ok(state) => is_eligible(&state, world.has_tag(body, &config.exclusion_tag), config),
        Err(_) => false,
    }
}
