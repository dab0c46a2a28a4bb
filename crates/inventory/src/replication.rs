//! Replicating inventory changes to remote copies.
//!
//! Frame format: `[length: u32 LE][message_type: u8][payload: postcard]`,
//! where `length` counts the type byte and payload.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use slotinv_core::{ChangeSink, ContentChanges, InventoryError};
use tracing::{debug, warn};

use crate::inventory::SlotInventory;

const TAG_CAPACITY: u8 = 0;
const TAG_SLOTS: u8 = 1;

/// Maximum capacity a replica accepts from a frame.
///
/// A [`ReplicationMessage::Slots`] batch may carry at most one update per
/// slot of its announced capacity.
pub const MAX_REPLICATED_CAPACITY: usize = 4096;

/// One replicated update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplicationMessage {
    /// The inventory was resized.
    Capacity(usize),
    /// Slot values changed.
    Slots(ContentChanges),
}

impl ReplicationMessage {
    /// Check the announced sizes against the replication limits.
    pub fn verify(&self) -> Result<(), InventoryError> {
        let capacity = match self {
            ReplicationMessage::Capacity(capacity) => *capacity,
            ReplicationMessage::Slots(changes) => changes.capacity,
        };
        if capacity > MAX_REPLICATED_CAPACITY {
            return Err(InventoryError::CapacityTooLarge {
                capacity,
                max: MAX_REPLICATED_CAPACITY,
            });
        }
        if let ReplicationMessage::Slots(changes) = self {
            if changes.slots.len() > changes.capacity {
                return Err(InventoryError::TooManySlotUpdates {
                    count: changes.slots.len(),
                    max: changes.capacity,
                });
            }
        }
        Ok(())
    }
}

fn message_type_tag(msg: &ReplicationMessage) -> u8 {
    match msg {
        ReplicationMessage::Capacity(_) => TAG_CAPACITY,
        ReplicationMessage::Slots(_) => TAG_SLOTS,
    }
}

/// Encode a message with length prefix.
pub fn encode_message(msg: &ReplicationMessage) -> Result<Vec<u8>> {
    let payload = postcard::to_allocvec(msg).context("Failed to serialize replication message")?;

    let length = u32::try_from(1 + payload.len()).context("Replication message too large")?;
    let mut frame = Vec::with_capacity(4 + 1 + payload.len());
    frame.extend_from_slice(&length.to_le_bytes());
    frame.push(message_type_tag(msg));
    frame.extend_from_slice(&payload);

    Ok(frame)
}

/// Decode a message from one frame.
pub fn decode_message(frame: &[u8]) -> Result<ReplicationMessage> {
    if frame.len() < 5 {
        anyhow::bail!("Frame too short: {} bytes", frame.len());
    }

    let length = u32::from_le_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize;
    if frame.len() != 4 + length {
        anyhow::bail!(
            "Frame length mismatch: expected {}, got {}",
            4 + length,
            frame.len()
        );
    }

    let tag = frame[4];
    let msg: ReplicationMessage = postcard::from_bytes(&frame[5..])
        .context("Failed to deserialize replication message")?;
    if message_type_tag(&msg) != tag {
        anyhow::bail!("Frame tag {tag} does not match payload");
    }
    msg.verify().context("Replication message exceeds limits")?;

    Ok(msg)
}

/// Apply a decoded message to a replica.
///
/// The replica's own dirty tracking records the change, so its local
/// listeners see it on their next flush. Updates for slots outside the
/// announced capacity are skipped and reported. Messages over the
/// replication limits are rejected before the replica is touched.
pub fn apply_message(inventory: &mut SlotInventory, msg: ReplicationMessage) -> Result<(), InventoryError> {
    msg.verify()?;
    match msg {
        ReplicationMessage::Capacity(capacity) => inventory.set_capacity(capacity),
        ReplicationMessage::Slots(changes) => {
            inventory.set_capacity(changes.capacity);
            let mut invalid = None;
            for change in changes.slots {
                let index = change.index;
                if !inventory.set_slot(index, change.slot) {
                    warn!(index, capacity = changes.capacity, "dropping update for out-of-range slot");
                    invalid.get_or_insert(index);
                }
            }
            if let Some(index) = invalid {
                return Err(InventoryError::InvalidIndex {
                    index,
                    capacity: changes.capacity,
                });
            }
        }
    }
    Ok(())
}

/// Change sink that turns flushed notifications into encoded frames.
#[derive(Debug, Default)]
pub struct ReplicationSink {
    frames: Vec<Vec<u8>>,
    errors: usize,
}

impl ReplicationSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the queued frames, oldest first.
    pub fn drain_frames(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.frames)
    }

    /// Number of messages that failed to encode.
    pub fn encode_errors(&self) -> usize {
        self.errors
    }

    fn push(&mut self, msg: &ReplicationMessage) {
        match encode_message(msg) {
            Ok(frame) => {
                debug!(bytes = frame.len(), "queued replication frame");
                self.frames.push(frame);
            }
            Err(err) => {
                warn!("Failed to encode replication frame: {err:#}");
                self.errors += 1;
            }
        }
    }
}

impl ChangeSink for ReplicationSink {
    fn capacity_changed(&mut self, capacity: usize) {
        self.push(&ReplicationMessage::Capacity(capacity));
    }

    fn slots_changed(&mut self, changes: &ContentChanges) {
        self.push(&ReplicationMessage::Slots(changes.clone()));
    }
}
