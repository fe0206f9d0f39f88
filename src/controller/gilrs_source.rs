use std::collections::HashMap;

use gilrs::ff::{BaseEffect, BaseEffectType, Effect, EffectBuilder, Repeat, Replay, Ticks};
use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs};
use tracing::{debug, error, info, trace, warn};

use super::snapshot::{
    DeviceSnapshot, DualRumble, HapticError, HapticHandle, SnapshotSource, SourceError,
};

/// Button order of the standard gamepad layout. Index `i` here is button
/// ordinal `i + 1` in the blocks.
pub const STANDARD_BUTTONS: [Button; 17] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
    Button::Mode,
];

pub const STANDARD_AXES: [Axis; 4] = [
    Axis::LeftStickX,
    Axis::LeftStickY,
    Axis::RightStickX,
    Axis::RightStickY,
];

/// Snapshot source backed by gilrs.
///
/// Slot `n` is the gamepad whose gilrs id converts to `n`. gilrs only updates
/// its cached pad state while events are drained, so every poll drains the
/// queue first.
pub struct GilrsSource {
    gilrs: Gilrs,
    // effects stop when dropped, keep the latest one per pad alive
    active_effects: HashMap<usize, Effect>,
}

impl GilrsSource {
    pub fn new() -> Result<Self, SourceError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(SourceError::InitializationError(e.to_string()));
            }
        };

        let source = Self {
            gilrs,
            active_effects: HashMap::new(),
        };
        source.log_gamepads();
        Ok(source)
    }

    fn log_gamepads(&self) {
        let gamepads: Vec<(GamepadId, Gamepad<'_>)> = self.gilrs.gamepads().collect();
        if gamepads.is_empty() {
            warn!("No gamepad connected, slots start empty");
            return;
        }
        info!("Found {} gamepads:", gamepads.len());
        for (id, gamepad) in &gamepads {
            info!(
                "  [slot {}] Name: {}, UUID: {}, FF: {}",
                usize::from(*id),
                gamepad.name(),
                uuid_hex(gamepad.uuid()),
                gamepad.is_ff_supported()
            );
        }
    }

    fn drain_events(&mut self) {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match event {
                EventType::Connected => info!("Gamepad {} connected", usize::from(id)),
                EventType::Disconnected => {
                    warn!("Gamepad {} disconnected", usize::from(id));
                    self.active_effects.remove(&usize::from(id));
                }
                _ => trace!("gilrs event on {}: {:?}", usize::from(id), event),
            }
        }
    }

    fn find(&self, slot: usize) -> Option<(GamepadId, Gamepad<'_>)> {
        self.gilrs
            .gamepads()
            .find(|(id, gamepad)| usize::from(*id) == slot && gamepad.is_connected())
    }
}

impl SnapshotSource for GilrsSource {
    fn poll(&mut self, slot: usize) -> Option<DeviceSnapshot> {
        self.drain_events();
        let (_, gamepad) = self.find(slot)?;

        let buttons = STANDARD_BUTTONS
            .iter()
            .map(|button| gamepad.is_pressed(*button))
            .collect();
        let axes = STANDARD_AXES
            .iter()
            .map(|axis| gamepad.value(*axis))
            .collect();

        let id = format!("{} ({})", gamepad.name(), uuid_hex(gamepad.uuid()));
        let snapshot = DeviceSnapshot::new(id, buttons, axes);
        Some(if gamepad.is_ff_supported() {
            snapshot.with_haptic(HapticHandle { device: slot })
        } else {
            snapshot
        })
    }

    fn play_rumble(
        &mut self,
        handle: HapticHandle,
        effect: DualRumble,
    ) -> Result<(), HapticError> {
        let Some((id, gamepad)) = self.find(handle.device) else {
            return Err(HapticError::DeviceNotFound(format!(
                "no connected gamepad for slot {}",
                handle.device
            )));
        };
        if !gamepad.is_ff_supported() {
            return Err(HapticError::Unsupported(gamepad.name().to_string()));
        }

        let play_for = Ticks::from_ms(effect.duration_ms);
        let scheduling = Replay {
            play_for,
            ..Default::default()
        };
        let ff = EffectBuilder::new()
            .add_effect(BaseEffect {
                kind: BaseEffectType::Strong {
                    magnitude: effect.strong_u16(),
                },
                scheduling,
                envelope: Default::default(),
            })
            .add_effect(BaseEffect {
                kind: BaseEffectType::Weak {
                    magnitude: effect.weak_u16(),
                },
                scheduling,
                envelope: Default::default(),
            })
            .repeat(Repeat::For(play_for))
            .gamepads(&[id])
            .finish(&mut self.gilrs)
            .map_err(|e| HapticError::Rejected(e.to_string()))?;

        ff.play().map_err(|e| HapticError::Rejected(e.to_string()))?;
        debug!(
            "Playing dual rumble on slot {} for {} ms",
            handle.device, effect.duration_ms
        );
        self.active_effects.insert(handle.device, ff);
        Ok(())
    }
}

fn uuid_hex(uuid: [u8; 16]) -> String {
    uuid.iter().map(|b| format!("{:02x}", b)).collect()
}
