//! Per-frame gamepad state synchronisation and edge detection for block-style
//! command handlers.
//!
//! A [`controller::DeviceBank`] keeps one double-buffered tracker per pad slot
//! and refreshes each slot at most once per frame id, so every block evaluated
//! in the same tick sees the same buttons and axes. [`blocks::GamepadBlocks`]
//! exposes the five gamepad blocks on top of it.

pub mod blocks;
pub mod config;
pub mod controller;
pub mod monitor;

pub use blocks::{BlockCall, BlockValue, GamepadBlocks, PressRelease};
pub use config::{BankConfig, ConfigError};
pub use controller::{DeviceBank, FrameId, SnapshotSource};
