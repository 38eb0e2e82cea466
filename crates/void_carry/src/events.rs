//! Carry events (lock-on, pickup, release)

use glam::Vec3;

/// Why a held body was let go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseReason {
    /// The carrier asked to drop it
    Requested,
    /// The body got further from the carrier than the release distance
    OutOfRange,
    /// Released by the owner of the controller (teardown, cutscene)
    Forced,
}

/// Something the controller did during a step
#[derive(Debug, Clone, PartialEq)]
pub enum CarryEvent<B> {
    /// The lock-on candidate changed (`None` = nothing under the view ray)
    LockOnChanged { candidate: Option<B> },
    /// A body was picked up
    PickedUp { body: B },
    /// A body was dropped with its properties restored
    Dropped { body: B, reason: ReleaseReason },
    /// A body was thrown with its properties restored
    Thrown { body: B, velocity: Vec3 },
    /// The held body disappeared from the world while held
    HeldBodyLost { body: B },
}

impl<B> CarryEvent<B> {
    /// Whether this event ends a carry
    pub fn ends_carry(&self) -> bool {
        matches!(
            self,
            CarryEvent::Dropped { .. } | CarryEvent::Thrown { .. } | CarryEvent::HeldBodyLost { .. }
        )
    }
}

/// Buffer of events collected between drains
#[derive(Debug, Clone)]
pub struct EventCollector<B> {
    events: Vec<CarryEvent<B>>,
}

impl<B> EventCollector<B> {
    /// Create an empty collector
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Record an event
    pub fn push(&mut self, event: CarryEvent<B>) {
        self.events.push(event);
    }

    /// Events recorded since the last drain
    pub fn pending(&self) -> &[CarryEvent<B>] {
        &self.events
    }

    /// Take all recorded events
    pub fn drain(&mut self) -> Vec<CarryEvent<B>> {
        std::mem::take(&mut self.events)
    }
}

impl<B> Default for EventCollector<B> {
    fn default() -> Self {
        Self::new()
    }
}
