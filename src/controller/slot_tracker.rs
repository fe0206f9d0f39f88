//! Device Slot Tracker
//!
//! Owns one slot's double-buffered button and axis state. All reads go through
//! [`SlotTracker::refresh`] first, which consults the snapshot source at most
//! once per distinct [`FrameId`]. Within a frame every query sees the same
//! `current`/`previous` pair.
//!
//! # Refresh outcomes
//!
//! ```text
//! poll -> None                         clear all four buffers, identity = None
//! poll -> Some, identity unchanged     previous_buttons := current_buttons
//! poll -> Some, identity differs       previous_* := neutral, sized to new layout
//! then, for any Some                   current_* := snapshot values
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::frame::FrameId;
use super::snapshot::{DeviceIdentity, DeviceSnapshot, SnapshotSource};

/// How `previous_axes` advances while a device stays connected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisHistory {
    /// `previous_axes` keeps the neutral baseline taken on the last identity
    /// change. `axis_changed` then reports "away from rest" rather than "moved
    /// since last frame". Matches the block behavior users already rely on.
    #[default]
    Latched,
    /// `previous_axes` takes the prior frame's values, like buttons do.
    Rolling,
}

/// Which level a button edge query is looking for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Pressed,
    Released,
}

impl Edge {
    fn level(self) -> bool {
        matches!(self, Edge::Pressed)
    }
}

#[derive(Debug, Clone)]
pub struct SlotTracker {
    slot: usize,
    axis_history: AxisHistory,
    last_frame: Option<FrameId>,
    identity: Option<DeviceIdentity>,
    current_buttons: Vec<bool>,
    previous_buttons: Vec<bool>,
    current_axes: Vec<f32>,
    previous_axes: Vec<f32>,
}

impl SlotTracker {
    pub fn new(slot: usize, axis_history: AxisHistory) -> Self {
        Self {
            slot,
            axis_history,
            last_frame: None,
            identity: None,
            current_buttons: Vec::new(),
            previous_buttons: Vec::new(),
            current_axes: Vec::new(),
            previous_axes: Vec::new(),
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn last_frame(&self) -> Option<FrameId> {
        self.last_frame
    }

    pub fn identity(&self) -> Option<&DeviceIdentity> {
        self.identity.as_ref()
    }

    pub fn is_populated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn button_count(&self) -> usize {
        self.current_buttons.len()
    }

    pub fn axis_count(&self) -> usize {
        self.current_axes.len()
    }

    pub fn current_buttons(&self) -> &[bool] {
        &self.current_buttons
    }

    pub fn previous_buttons(&self) -> &[bool] {
        &self.previous_buttons
    }

    pub fn current_axes(&self) -> &[f32] {
        &self.current_axes
    }

    pub fn previous_axes(&self) -> &[f32] {
        &self.previous_axes
    }

    /// Brings the slot up to date for `frame`. A repeated call with the same
    /// frame id is a no-op.
    pub fn refresh<S>(&mut self, frame: FrameId, source: &mut S)
    where
        S: SnapshotSource + ?Sized,
    {
        if self.last_frame == Some(frame) {
            return;
        }
        trace!("Refreshing slot {} for {}", self.slot, frame);

        match source.poll(self.slot) {
            None => self.clear(),
            Some(snapshot) => self.apply(snapshot),
        }

        self.last_frame = Some(frame);
    }

    fn clear(&mut self) {
        if let Some(identity) = self.identity.take() {
            info!("Slot {} disconnected: {}", self.slot, identity.id);
        }
        self.current_buttons.clear();
        self.previous_buttons.clear();
        self.current_axes.clear();
        self.previous_axes.clear();
    }

    fn apply(&mut self, snapshot: DeviceSnapshot) {
        let identity = snapshot.identity();

        if self.identity.as_ref() == Some(&identity) {
            self.previous_buttons.clone_from(&self.current_buttons);
            if self.axis_history == AxisHistory::Rolling {
                self.previous_axes.clone_from(&self.current_axes);
            }
        } else {
            match &self.identity {
                Some(old) => info!(
                    "Slot {} swapped device: {} -> {} ({} buttons, {} axes)",
                    self.slot, old.id, identity.id, identity.button_count, identity.axis_count
                ),
                None => info!(
                    "Slot {} connected: {} ({} buttons, {} axes)",
                    self.slot, identity.id, identity.button_count, identity.axis_count
                ),
            }
            self.previous_buttons.clear();
            self.previous_buttons.resize(identity.button_count, false);
            self.previous_axes.clear();
            self.previous_axes.resize(identity.axis_count, 0.0);
            self.identity = Some(identity);
        }

        self.current_buttons.clear();
        self.current_buttons.extend_from_slice(&snapshot.buttons);
        self.current_axes.clear();
        self.current_axes.extend_from_slice(&snapshot.axes);
    }

    /// One-frame pulse on the transition into `edge`'s level.
    pub fn pressed_or_released<S>(
        &mut self,
        frame: FrameId,
        index: usize,
        edge: Edge,
        source: &mut S,
    ) -> bool
    where
        S: SnapshotSource + ?Sized,
    {
        self.refresh(frame, source);
        match (
            self.current_buttons.get(index),
            self.previous_buttons.get(index),
        ) {
            (Some(&current), Some(&previous)) => current != previous && current == edge.level(),
            _ => false,
        }
    }

    pub fn button_level<S>(&mut self, frame: FrameId, index: usize, source: &mut S) -> bool
    where
        S: SnapshotSource + ?Sized,
    {
        self.refresh(frame, source);
        self.current_buttons.get(index).copied().unwrap_or(false)
    }

    /// Exact comparison, no tolerance: any bit-level difference counts.
    pub fn axis_changed<S>(&mut self, frame: FrameId, index: usize, source: &mut S) -> bool
    where
        S: SnapshotSource + ?Sized,
    {
        self.refresh(frame, source);
        match (self.current_axes.get(index), self.previous_axes.get(index)) {
            (Some(current), Some(previous)) => current != previous,
            _ => false,
        }
    }

    /// `None` when `index` is outside the current axis layout.
    pub fn axis_value<S>(&mut self, frame: FrameId, index: usize, source: &mut S) -> Option<f32>
    where
        S: SnapshotSource + ?Sized,
    {
        self.refresh(frame, source);
        let value = self.current_axes.get(index).copied();
        if value.is_none() {
            debug!(
                "Axis {} out of range on slot {} ({} axes)",
                index,
                self.slot,
                self.current_axes.len()
            );
        }
        value
    }
}
