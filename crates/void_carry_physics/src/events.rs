//! Contact events reported by the last world step

use crate::collider::ColliderHandle;
use crossbeam_channel::Receiver;
use rapier3d::prelude as rapier;

/// Whether two colliders started or stopped touching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Began,
    Ended,
}

/// Two colliders starting or stopping contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub a: ColliderHandle,
    pub b: ColliderHandle,
    pub phase: ContactPhase,
    /// One of the two is a sensor
    pub sensor: bool,
}

impl ContactEvent {
    pub fn began(&self) -> bool {
        self.phase == ContactPhase::Began
    }

    /// Whether one side is in `left` and the other in `right`
    pub fn links(&self, left: &[ColliderHandle], right: &[ColliderHandle]) -> bool {
        (left.contains(&self.a) && right.contains(&self.b)) || (left.contains(&self.b) && right.contains(&self.a))
    }
}

impl From<rapier::CollisionEvent> for ContactEvent {
    fn from(event: rapier::CollisionEvent) -> Self {
        Self {
            a: ColliderHandle(event.collider1()),
            b: ColliderHandle(event.collider2()),
            phase: if event.started() {
                ContactPhase::Began
            } else {
                ContactPhase::Ended
            },
            sensor: event.sensor(),
        }
    }
}

/// Contact events of one `PhysicsWorld::step` call, across all its substeps
#[derive(Debug, Default)]
pub struct ContactLog {
    events: Vec<ContactEvent>,
}

impl ContactLog {
    pub(crate) fn clear(&mut self) {
        self.events.clear();
    }

    /// Move everything Rapier queued on the channel into the log
    pub(crate) fn collect(&mut self, receiver: &Receiver<rapier::CollisionEvent>) {
        self.events.extend(receiver.try_iter().map(ContactEvent::from));
    }

    pub fn events(&self) -> &[ContactEvent] {
        &self.events
    }

    /// Contacts that began between a collider of `left` and one of `right`
    pub fn began_between<'a>(
        &'a self,
        left: &'a [ColliderHandle],
        right: &'a [ColliderHandle],
    ) -> impl Iterator<Item = &'a ContactEvent> + 'a {
        self.events
            .iter()
            .filter(move |event| event.began() && event.links(left, right))
    }
}
