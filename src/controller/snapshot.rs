//! Device Snapshot Source contract
//!
//! The engine never talks to a platform API directly. Everything it knows about
//! a pad arrives through [`SnapshotSource::poll`], which returns an owned
//! [`DeviceSnapshot`] (or `None` when the slot is empty). Haptics go back out
//! through [`SnapshotSource::play_rumble`] using the [`HapticHandle`] a
//! snapshot advertised.

use serde::{Deserialize, Serialize};

/// Key used to detect hot-plug and hot-swap.
///
/// Two identities are the same device only if the id string, the button count
/// and the axis count all match.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub id: String,
    pub button_count: usize,
    pub axis_count: usize,
}

impl DeviceIdentity {
    pub fn new(id: impl Into<String>, button_count: usize, axis_count: usize) -> Self {
        Self {
            id: id.into(),
            button_count,
            axis_count,
        }
    }
}

/// Backend token for a pad that can play force feedback.
///
/// `device` is whatever the backend needs to find the pad again; it is opaque
/// to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HapticHandle {
    pub device: usize,
}

/// One poll result for an occupied slot.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceSnapshot {
    pub id: String,
    pub buttons: Vec<bool>,
    pub axes: Vec<f32>,
    pub haptic: Option<HapticHandle>,
}

impl DeviceSnapshot {
    pub fn new(id: impl Into<String>, buttons: Vec<bool>, axes: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            buttons,
            axes,
            haptic: None,
        }
    }

    pub fn with_haptic(mut self, handle: HapticHandle) -> Self {
        self.haptic = Some(handle);
        self
    }

    pub fn identity(&self) -> DeviceIdentity {
        DeviceIdentity::new(self.id.clone(), self.buttons.len(), self.axes.len())
    }
}

/// Dual-channel rumble request, already clamped and converted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DualRumble {
    /// Low-frequency motor, 0.0..=1.0
    pub strong_magnitude: f32,
    /// High-frequency motor, 0.0..=1.0
    pub weak_magnitude: f32,
    pub duration_ms: u32,
}

impl DualRumble {
    /// Builds a rumble from block-level inputs: magnitudes are clamped into
    /// `0..=1` and the duration is given in seconds.
    ///
    /// Negative or NaN durations become `0`; durations beyond `u32::MAX` ms
    /// saturate.
    pub fn from_seconds(strength: f64, weakness: f64, duration_secs: f64) -> Self {
        Self {
            strong_magnitude: clamp_unit(strength),
            weak_magnitude: clamp_unit(weakness),
            duration_ms: seconds_to_ms(duration_secs),
        }
    }

    /// Magnitude scaled to the full `u16` range most force-feedback APIs use.
    pub fn strong_u16(&self) -> u16 {
        scale_u16(self.strong_magnitude)
    }

    pub fn weak_u16(&self) -> u16 {
        scale_u16(self.weak_magnitude)
    }
}

fn clamp_unit(value: f64) -> f32 {
    value.max(0.0).min(1.0) as f32
}

fn seconds_to_ms(secs: f64) -> u32 {
    // float-to-int `as` saturates and maps NaN to 0
    (secs * 1000.0) as u32
}

fn scale_u16(magnitude: f32) -> u16 {
    (magnitude * f32::from(u16::MAX)).round() as u16
}

/// Haptic failures. Callers inside the engine log and drop these.
#[derive(Debug, thiserror::Error)]
pub enum HapticError {
    #[error("Force feedback not supported: {0}")]
    Unsupported(String),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Effect rejected: {0}")]
    Rejected(String),
}

/// Failure to bring up a snapshot backend.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to initialize snapshot source: {0}")]
    InitializationError(String),
}

/// Platform service that reports what occupies a slot right now.
///
/// `poll` is expected to be a synchronous read of already-latched state; it
/// takes `&mut self` so backends can pump their event queues first.
pub trait SnapshotSource {
    fn poll(&mut self, slot: usize) -> Option<DeviceSnapshot>;

    /// Fire-and-forget rumble. Must not block the calling tick.
    fn play_rumble(&mut self, handle: HapticHandle, effect: DualRumble)
        -> Result<(), HapticError>;
}

impl<S: SnapshotSource + ?Sized> SnapshotSource for Box<S> {
    fn poll(&mut self, slot: usize) -> Option<DeviceSnapshot> {
        (**self).poll(slot)
    }

    fn play_rumble(
        &mut self,
        handle: HapticHandle,
        effect: DualRumble,
    ) -> Result<(), HapticError> {
        (**self).play_rumble(handle, effect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn identity_covers_id_and_layout() {
        let snap = DeviceSnapshot::new("pad-A", vec![true, false], vec![0.5]);
        assert_eq!(snap.identity(), DeviceIdentity::new("pad-A", 2, 1));
        assert_ne!(snap.identity(), DeviceIdentity::new("pad-A", 2, 2));
        assert_ne!(snap.identity(), DeviceIdentity::new("pad-B", 2, 1));
    }

    #[rstest]
    #[case(0.25, 0.5, 0.25, 0.25, 0.5, 250)]
    #[case(-1.0, 2.0, 1.0, 0.0, 1.0, 1000)]
    #[case(1.0, 0.0, -3.0, 1.0, 0.0, 0)]
    #[case(0.0, 0.0, 0.0015, 0.0, 0.0, 1)]
    fn rumble_clamps_and_converts(
        #[case] strength: f64,
        #[case] weakness: f64,
        #[case] secs: f64,
        #[case] strong: f32,
        #[case] weak: f32,
        #[case] ms: u32,
    ) {
        let rumble = DualRumble::from_seconds(strength, weakness, secs);
        assert!((rumble.strong_magnitude - strong).abs() < f32::EPSILON);
        assert!((rumble.weak_magnitude - weak).abs() < f32::EPSILON);
        assert_eq!(rumble.duration_ms, ms);
    }

    #[test]
    fn rumble_u16_scaling_hits_extremes() {
        let full = DualRumble::from_seconds(1.0, 0.0, 1.0);
        assert_eq!(full.strong_u16(), u16::MAX);
        assert_eq!(full.weak_u16(), 0);
    }

    #[test]
    fn nan_duration_is_zero() {
        assert_eq!(DualRumble::from_seconds(0.5, 0.5, f64::NAN).duration_ms, 0);
    }
}
