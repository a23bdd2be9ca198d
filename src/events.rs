//! Controller events.
//!
//! Backends write one event per occurrence after each controller's step: one
//! [`ControllerCollided`] per recorded hit, horizontal sweep first, then the trigger
//! changes in ascending trigger order.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::collision::RaycastHit;
use crate::triggers::TriggerEvent;

/// A controller's sweep hit a surface.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerCollided {
    /// The moving controller.
    pub controller: Entity,
    /// What it hit.
    pub hit: RaycastHit,
}

/// A controller started overlapping a trigger volume.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEntered {
    /// The moving controller.
    pub controller: Entity,
    /// The trigger volume.
    pub trigger: Entity,
}

/// A controller is still overlapping a trigger volume.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerStayed {
    /// The moving controller.
    pub controller: Entity,
    /// The trigger volume.
    pub trigger: Entity,
}

/// A controller stopped overlapping a trigger volume.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerExited {
    /// The moving controller.
    pub controller: Entity,
    /// The trigger volume.
    pub trigger: Entity,
}

/// Writers for every controller event, for use in backend movement systems.
#[derive(SystemParam)]
pub struct ControllerEvents<'w> {
    collided: EventWriter<'w, ControllerCollided>,
    entered: EventWriter<'w, TriggerEntered>,
    stayed: EventWriter<'w, TriggerStayed>,
    exited: EventWriter<'w, TriggerExited>,
}

impl ControllerEvents<'_> {
    /// One [`ControllerCollided`] per hit, in order.
    pub fn write_hits(&mut self, controller: Entity, hits: &[RaycastHit]) {
        for &hit in hits {
            self.collided.write(ControllerCollided { controller, hit });
        }
    }

    /// Translate tracker output into trigger events, in order.
    pub fn write_triggers(&mut self, controller: Entity, changes: &[TriggerEvent]) {
        for change in changes {
            match *change {
                TriggerEvent::Enter(trigger) => {
                    self.entered.write(TriggerEntered { controller, trigger });
                }
                TriggerEvent::Stay(trigger) => {
                    self.stayed.write(TriggerStayed { controller, trigger });
                }
                TriggerEvent::Exit(trigger) => {
                    self.exited.write(TriggerExited { controller, trigger });
                }
            }
        }
    }
}
