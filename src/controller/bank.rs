//! Device Bank Coordinator
//!
//! Owns the snapshot source and one [`SlotTracker`] per physical slot. All
//! indices here are 0-based; the 1-based block ordinals are translated by
//! [`crate::blocks`].
//!
//! # Threading
//!
//! Every operation takes `&mut self`, so a bank has a single writer and the
//! refresh-then-read sequence of a slot is never interleaved with another
//! caller. Share it behind a mutex if several tasks evaluate blocks.

use tracing::{debug, warn};

use super::frame::FrameId;
use super::slot_tracker::{AxisHistory, Edge, SlotTracker};
use super::snapshot::{DualRumble, SnapshotSource};

/// Number of pads the block pad menu offers by default.
pub const DEFAULT_SLOT_COUNT: usize = 4;

#[derive(Debug)]
pub struct DeviceBank<S> {
    source: S,
    slots: Vec<SlotTracker>,
}

impl<S: SnapshotSource> DeviceBank<S> {
    pub fn new(source: S, slot_count: usize, axis_history: AxisHistory) -> Self {
        debug!(
            "Creating device bank with {} slots, axis history {:?}",
            slot_count, axis_history
        );
        let slots = (0..slot_count)
            .map(|slot| SlotTracker::new(slot, axis_history))
            .collect();
        Self { source, slots }
    }

    pub fn with_defaults(source: S) -> Self {
        Self::new(source, DEFAULT_SLOT_COUNT, AxisHistory::default())
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Read-only view of a slot's tracker as of its last refresh.
    pub fn slot(&self, slot: usize) -> Option<&SlotTracker> {
        self.slots.get(slot)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Refresh `slot` for `frame` without reading anything. Returns `false`
    /// for an out-of-bank slot.
    pub fn refresh(&mut self, frame: FrameId, slot: usize) -> bool {
        match self.slots.get_mut(slot) {
            Some(tracker) => {
                tracker.refresh(frame, &mut self.source);
                true
            }
            None => {
                warn!("Slot {} is outside the bank of {}", slot, self.slots.len());
                false
            }
        }
    }

    pub fn pressed_or_released(
        &mut self,
        frame: FrameId,
        slot: usize,
        button: usize,
        edge: Edge,
    ) -> bool {
        let Self { source, slots } = self;
        with_slot(slots, slot, |tracker| {
            tracker.pressed_or_released(frame, button, edge, source)
        })
        .unwrap_or(false)
    }

    pub fn button_level(&mut self, frame: FrameId, slot: usize, button: usize) -> bool {
        let Self { source, slots } = self;
        with_slot(slots, slot, |tracker| {
            tracker.button_level(frame, button, source)
        })
        .unwrap_or(false)
    }

    pub fn axis_changed(&mut self, frame: FrameId, slot: usize, axis: usize) -> bool {
        let Self { source, slots } = self;
        with_slot(slots, slot, |tracker| tracker.axis_changed(frame, axis, source))
            .unwrap_or(false)
    }

    pub fn axis_value(&mut self, frame: FrameId, slot: usize, axis: usize) -> Option<f32> {
        let Self { source, slots } = self;
        with_slot(slots, slot, |tracker| tracker.axis_value(frame, axis, source)).flatten()
    }

    /// Best-effort dual rumble on whatever occupies `slot` right now.
    ///
    /// Looks the pad up live instead of using the tracker's cached frame, and
    /// leaves button and axis state untouched. Unsupported pads, empty slots
    /// and rejected effects are all silent no-ops.
    pub fn rumble(&mut self, slot: usize, effect: DualRumble) {
        if slot >= self.slots.len() {
            warn!("Rumble on slot {} outside the bank of {}", slot, self.slots.len());
            return;
        }

        let Some(handle) = self.source.poll(slot).and_then(|snap| snap.haptic) else {
            debug!("Slot {} has no haptic-capable device, skipping rumble", slot);
            return;
        };

        match self.source.play_rumble(handle, effect) {
            Ok(()) => debug!(
                "Rumble on slot {}: strong {:.2}, weak {:.2}, {} ms",
                slot, effect.strong_magnitude, effect.weak_magnitude, effect.duration_ms
            ),
            Err(e) => debug!("Rumble on slot {} ignored: {}", slot, e),
        }
    }
}

fn with_slot<T>(
    slots: &mut [SlotTracker],
    slot: usize,
    op: impl FnOnce(&mut SlotTracker) -> T,
) -> Option<T> {
    let len = slots.len();
    match slots.get_mut(slot) {
        Some(tracker) => Some(op(tracker)),
        None => {
            warn!("Slot {} is outside the bank of {}", slot, len);
            None
        }
    }
}
