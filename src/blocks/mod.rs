//! Edge/Query Facade for block-style command handlers.
//!
//! Blocks speak in 1-based ordinals (`button 1 of pad 1`); the bank speaks in
//! 0-based indices. This module does the translation and nothing else. Any
//! ordinal below 1 or past the bank behaves like an absent device: `false` for
//! queries, a no-op for rumble.

pub mod info;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::controller::{DeviceBank, DualRumble, Edge, FrameId, SnapshotSource};

pub use info::{extension_info, ExtensionInfo};

/// Press/release selector as the `pressReleaseMenu` encodes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PressRelease {
    Press,
    Release,
}

impl PressRelease {
    /// `1` selects press and `0` release. Any other value matches neither
    /// level, so a hat block given one never fires.
    pub fn from_menu(value: i64) -> Option<Self> {
        match value {
            1 => Some(PressRelease::Press),
            0 => Some(PressRelease::Release),
            _ => None,
        }
    }

    pub fn menu_value(self) -> i64 {
        match self {
            PressRelease::Press => 1,
            PressRelease::Release => 0,
        }
    }
}

impl From<PressRelease> for Edge {
    fn from(pr: PressRelease) -> Self {
        match pr {
            PressRelease::Press => Edge::Pressed,
            PressRelease::Release => Edge::Released,
        }
    }
}

/// What a block evaluates to.
///
/// `axisValue` reports a number for a valid axis and `Bool(false)` for an
/// out-of-range one, so a reporter can hand back either type.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BlockValue {
    Bool(bool),
    Number(f64),
    Empty,
}

impl BlockValue {
    /// `Bool(b)` as `b`; numbers and `Empty` are not truthy here.
    pub fn as_bool(self) -> bool {
        matches!(self, BlockValue::Bool(true))
    }

    pub fn as_number(self) -> Option<f64> {
        match self {
            BlockValue::Number(n) => Some(n),
            _ => None,
        }
    }
}

/// One block invocation with its raw arguments, named after the opcodes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BlockCall {
    ButtonPressedReleased { b: i64, pr: i64, i: i64 },
    ButtonDown { b: i64, i: i64 },
    AxisMoved { b: i64, i: i64 },
    AxisValue { b: i64, i: i64 },
    Rumble { s: f64, w: f64, t: f64, i: i64 },
}

impl BlockCall {
    pub fn opcode(&self) -> &'static str {
        match self {
            BlockCall::ButtonPressedReleased { .. } => "buttonPressedReleased",
            BlockCall::ButtonDown { .. } => "buttonDown",
            BlockCall::AxisMoved { .. } => "axisMoved",
            BlockCall::AxisValue { .. } => "axisValue",
            BlockCall::Rumble { .. } => "rumble",
        }
    }
}

/// 1-based ordinal to 0-based index.
fn ordinal_to_index(ordinal: i64) -> Option<usize> {
    usize::try_from(ordinal).ok()?.checked_sub(1)
}

/// The gamepad blocks over a [`DeviceBank`].
#[derive(Debug)]
pub struct GamepadBlocks<S> {
    bank: DeviceBank<S>,
}

impl<S: SnapshotSource> GamepadBlocks<S> {
    pub fn new(bank: DeviceBank<S>) -> Self {
        Self { bank }
    }

    pub fn bank(&self) -> &DeviceBank<S> {
        &self.bank
    }

    pub fn bank_mut(&mut self) -> &mut DeviceBank<S> {
        &mut self.bank
    }

    pub fn into_bank(self) -> DeviceBank<S> {
        self.bank
    }

    fn pad(&self, pad: i64) -> Option<usize> {
        let slot = ordinal_to_index(pad).filter(|slot| *slot < self.bank.slot_count());
        if slot.is_none() {
            warn!(
                "Pad {} is not in 1..={}, treating as absent",
                pad,
                self.bank.slot_count()
            );
        }
        slot
    }

    /// Resolves a pad and a button/axis ordinal. A valid pad is refreshed for
    /// `frame` even when the ordinal is not, so its history stays one frame deep.
    fn target(&mut self, frame: FrameId, pad: i64, ordinal: i64) -> Option<(usize, usize)> {
        let slot = self.pad(pad)?;
        match ordinal_to_index(ordinal) {
            Some(index) => Some((slot, index)),
            None => {
                self.bank.refresh(frame, slot);
                None
            }
        }
    }

    /// `button [b] [pr] of pad [i]`
    pub fn button_pressed_released(
        &mut self,
        frame: FrameId,
        button: i64,
        pr: PressRelease,
        pad: i64,
    ) -> bool {
        let Some((slot, index)) = self.target(frame, pad, button) else {
            return false;
        };
        self.bank.pressed_or_released(frame, slot, index, pr.into())
    }

    /// `button [b] of pad [i] is down`
    pub fn button_down(&mut self, frame: FrameId, button: i64, pad: i64) -> bool {
        let Some((slot, index)) = self.target(frame, pad, button) else {
            return false;
        };
        self.bank.button_level(frame, slot, index)
    }

    /// `axis [b] of pad [i] moved`
    pub fn axis_moved(&mut self, frame: FrameId, axis: i64, pad: i64) -> bool {
        let Some((slot, index)) = self.target(frame, pad, axis) else {
            return false;
        };
        self.bank.axis_changed(frame, slot, index)
    }

    /// `axis [b] of pad [i] value`; `Bool(false)` when there is no such axis.
    pub fn axis_value(&mut self, frame: FrameId, axis: i64, pad: i64) -> BlockValue {
        let Some((slot, index)) = self.target(frame, pad, axis) else {
            return BlockValue::Bool(false);
        };
        match self.bank.axis_value(frame, slot, index) {
            Some(value) => BlockValue::Number(f64::from(value)),
            None => BlockValue::Bool(false),
        }
    }

    /// `rumble strong [s] and weak [w] for [t] sec. on pad [i]`
    pub fn rumble(&mut self, strength: f64, weakness: f64, seconds: f64, pad: i64) {
        if let Some(slot) = self.pad(pad) {
            self.bank
                .rumble(slot, DualRumble::from_seconds(strength, weakness, seconds));
        }
    }

    pub fn handle(&mut self, frame: FrameId, call: BlockCall) -> BlockValue {
        match call {
            BlockCall::ButtonPressedReleased { b, pr, i } => match PressRelease::from_menu(pr) {
                Some(pr) => BlockValue::Bool(self.button_pressed_released(frame, b, pr, i)),
                None => {
                    if let Some(slot) = self.pad(i) {
                        self.bank.refresh(frame, slot);
                    }
                    BlockValue::Bool(false)
                }
            },
            BlockCall::ButtonDown { b, i } => BlockValue::Bool(self.button_down(frame, b, i)),
            BlockCall::AxisMoved { b, i } => BlockValue::Bool(self.axis_moved(frame, b, i)),
            BlockCall::AxisValue { b, i } => self.axis_value(frame, b, i),
            BlockCall::Rumble { s, w, t, i } => {
                self.rumble(s, w, t, i);
                BlockValue::Empty
            }
        }
    }
}
