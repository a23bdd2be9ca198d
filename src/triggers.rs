//! Trigger volume enter / stay / exit tracking.

use std::collections::BTreeSet;

use bevy::prelude::*;

/// A change in the set of trigger volumes overlapping a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    /// The trigger started overlapping this step.
    Enter(Entity),
    /// The trigger overlapped last step and still does.
    Stay(Entity),
    /// The trigger stopped overlapping this step.
    Exit(Entity),
}

impl TriggerEvent {
    /// The trigger entity the event is about.
    pub fn trigger(&self) -> Entity {
        match *self {
            Self::Enter(entity) | Self::Stay(entity) | Self::Exit(entity) => entity,
        }
    }
}

/// Remembers which triggers overlapped the controller at the end of the last step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerTracker {
    inside: BTreeSet<Entity>,
}

impl TriggerTracker {
    /// Replace the overlap set and return the resulting events in ascending entity
    /// order.
    pub fn update(&mut self, current: impl IntoIterator<Item = Entity>) -> Vec<TriggerEvent> {
        let current: BTreeSet<Entity> = current.into_iter().collect();
        let events = self
            .inside
            .union(&current)
            .map(|&entity| match (self.inside.contains(&entity), current.contains(&entity)) {
                (true, true) => TriggerEvent::Stay(entity),
                (false, _) => TriggerEvent::Enter(entity),
                (true, false) => TriggerEvent::Exit(entity),
            })
            .collect();
        self.inside = current;
        events
    }

    /// Triggers overlapping at the end of the last update.
    pub fn inside(&self) -> impl Iterator<Item = Entity> + '_ {
        self.inside.iter().copied()
    }

    /// Forget every overlap without emitting exits.
    pub fn clear(&mut self) {
        self.inside.clear();
    }
}
