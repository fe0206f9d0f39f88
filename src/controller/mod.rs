//! Controller subsystem: per-frame gamepad state and edge detection
//!
//! ```text
//! SnapshotSource ──poll(slot)──► SlotTracker ×N ──► DeviceBank ──► blocks
//! (gilrs / virtual)              (double buffer,     (slot routing,
//!                                 frame gating)       haptics)
//! ```
//!
//! 1. [`snapshot`] - Contract with the platform pad service
//! 2. [`slot_tracker`] - One slot's refresh state machine and edge queries
//! 3. [`bank`] - Fixed bank of slots plus rumble routing
//! 4. [`frame`] - Frame identifiers used as the refresh cache key

pub mod bank;
pub mod frame;
pub mod gilrs_source;
pub mod slot_tracker;
pub mod snapshot;
pub mod virtual_source;

pub use bank::{DeviceBank, DEFAULT_SLOT_COUNT};
pub use frame::{FrameClock, FrameId};
pub use gilrs_source::GilrsSource;
pub use slot_tracker::{AxisHistory, Edge, SlotTracker};
pub use snapshot::{
    DeviceIdentity, DeviceSnapshot, DualRumble, HapticError, HapticHandle, SnapshotSource,
    SourceError,
};
pub use virtual_source::VirtualSource;
