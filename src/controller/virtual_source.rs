use super::snapshot::{DeviceSnapshot, DualRumble, HapticError, HapticHandle, SnapshotSource};

#[derive(Debug, Clone, Default)]
struct VirtualPad {
    snapshot: Option<DeviceSnapshot>,
    polls: usize,
}

/// In-memory snapshot source. Pads are plugged, changed and unplugged by code,
/// which makes it the backend for headless runs and tests.
#[derive(Debug, Clone, Default)]
pub struct VirtualSource {
    pads: Vec<VirtualPad>,
    rumbles: Vec<(HapticHandle, DualRumble)>,
    reject_rumble: bool,
}

impl VirtualSource {
    pub fn new(slots: usize) -> Self {
        Self {
            pads: vec![VirtualPad::default(); slots],
            rumbles: Vec::new(),
            reject_rumble: false,
        }
    }

    /// Plug `snapshot` into `slot`, replacing whatever was there.
    pub fn connect(&mut self, slot: usize, snapshot: DeviceSnapshot) {
        if let Some(pad) = self.pads.get_mut(slot) {
            pad.snapshot = Some(snapshot);
        }
    }

    pub fn disconnect(&mut self, slot: usize) {
        if let Some(pad) = self.pads.get_mut(slot) {
            pad.snapshot = None;
        }
    }

    pub fn set_button(&mut self, slot: usize, index: usize, pressed: bool) {
        if let Some(button) = self
            .snapshot_mut(slot)
            .and_then(|snap| snap.buttons.get_mut(index))
        {
            *button = pressed;
        }
    }

    pub fn set_axis(&mut self, slot: usize, index: usize, value: f32) {
        if let Some(axis) = self
            .snapshot_mut(slot)
            .and_then(|snap| snap.axes.get_mut(index))
        {
            *axis = value;
        }
    }

    /// Make every following `play_rumble` fail, as a pad whose driver refuses
    /// effects would.
    pub fn reject_rumble(&mut self, reject: bool) {
        self.reject_rumble = reject;
    }

    /// Rumbles accepted so far, oldest first.
    pub fn rumbles(&self) -> &[(HapticHandle, DualRumble)] {
        &self.rumbles
    }

    pub fn poll_count(&self, slot: usize) -> usize {
        self.pads.get(slot).map_or(0, |pad| pad.polls)
    }

    fn snapshot_mut(&mut self, slot: usize) -> Option<&mut DeviceSnapshot> {
        self.pads
            .get_mut(slot)
            .and_then(|pad| pad.snapshot.as_mut())
    }
}

impl SnapshotSource for VirtualSource {
    fn poll(&mut self, slot: usize) -> Option<DeviceSnapshot> {
        let pad = self.pads.get_mut(slot)?;
        pad.polls += 1;
        pad.snapshot.clone()
    }

    fn play_rumble(
        &mut self,
        handle: HapticHandle,
        effect: DualRumble,
    ) -> Result<(), HapticError> {
        if self.reject_rumble {
            return Err(HapticError::Rejected(format!(
                "virtual device {} refuses effects",
                handle.device
            )));
        }
        self.rumbles.push((handle, effect));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_returns_owned_copies() {
        let mut source = VirtualSource::new(2);
        source.connect(1, DeviceSnapshot::new("virtual:1", vec![false], vec![0.0]));

        let before = source.poll(1);
        source.set_button(1, 0, true);
        assert_eq!(before.map(|s| s.buttons), Some(vec![false]));
        assert_eq!(source.poll(1).map(|s| s.buttons), Some(vec![true]));
        assert_eq!(source.poll_count(1), 2);
    }

    #[test]
    fn unknown_slot_is_absent() {
        let mut source = VirtualSource::new(1);
        assert!(source.poll(0).is_none());
        assert!(source.poll(9).is_none());
    }

    #[test]
    fn rejected_rumble_is_not_recorded() {
        let mut source = VirtualSource::new(1);
        source.reject_rumble(true);
        let result = source.play_rumble(
            HapticHandle { device: 0 },
            DualRumble::from_seconds(1.0, 1.0, 1.0),
        );
        assert!(matches!(result, Err(HapticError::Rejected(_))));
        assert!(source.rumbles().is_empty());
    }
}
