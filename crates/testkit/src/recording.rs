//! In-memory change sink for assertions.

use serde::Serialize;
use slotinv_core::{ChangeSink, ContentChanges, SlotChange};

/// A notification received by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// Capacity notification.
    Capacity {
        /// New capacity.
        capacity: usize,
    },
    /// Slot batch notification.
    Slots {
        /// Capacity when the batch was built.
        capacity: usize,
        /// Changed slots.
        slots: Vec<SlotChange>,
    },
}

/// Records every notification in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Vec<ChangeEvent>,
}

impl RecordingSink {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far.
    pub fn events(&self) -> &[ChangeEvent] {
        &self.events
    }

    /// Take the received events, leaving the recorder empty.
    pub fn take(&mut self) -> Vec<ChangeEvent> {
        std::mem::take(&mut self.events)
    }

    /// Capacities announced, in order.
    pub fn capacity_changes(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ChangeEvent::Capacity { capacity } => Some(*capacity),
                ChangeEvent::Slots { .. } => None,
            })
            .collect()
    }

    /// Every slot index announced, in order, across all batches.
    pub fn changed_indices(&self) -> Vec<usize> {
        self.events
            .iter()
            .flat_map(|event| match event {
                ChangeEvent::Slots { slots, .. } => slots.iter().map(|c| c.index).collect(),
                ChangeEvent::Capacity { .. } => Vec::new(),
            })
            .collect()
    }

    /// Number of slot batches received.
    pub fn slot_batches(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, ChangeEvent::Slots { .. }))
            .count()
    }
}

impl ChangeSink for RecordingSink {
    fn capacity_changed(&mut self, capacity: usize) {
        self.events.push(ChangeEvent::Capacity { capacity });
    }

    fn slots_changed(&mut self, changes: &ContentChanges) {
        self.events.push(ChangeEvent::Slots {
            capacity: changes.capacity,
            slots: changes.slots.clone(),
        });
    }
}
