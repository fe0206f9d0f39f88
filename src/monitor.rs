//! Pad monitor: drives the bank once per tick and reports what happened.
//!
//! This is the runtime behind the `padsync` binary. Each tick takes one frame
//! id from the [`FrameClock`], sweeps every pad through the block facade and
//! turns the answers into [`PadEvent`]s: hot-plug changes, button edges and
//! axis movement.

use chrono::{DateTime, Local};
use statum::{machine, state};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::blocks::{extension_info, BlockValue, GamepadBlocks, PressRelease};
use crate::config::{Backend, BankConfig};
use crate::controller::{
    DeviceBank, DeviceIdentity, FrameClock, FrameId, GilrsSource, SnapshotSource, SourceError,
    VirtualSource,
};

pub type DynSource = Box<dyn SnapshotSource>;

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Source error: {0}")]
    SourceError(#[from] SourceError),

    #[error("Initialization error: {0}")]
    InitializationError(String),
}

/// Something the monitor saw on one tick. Pads, buttons and axes are the
/// 1-based ordinals the blocks use.
#[derive(Clone, Debug, PartialEq)]
pub enum PadEvent {
    Connected { pad: usize, identity: DeviceIdentity },
    Disconnected { pad: usize },
    Pressed { pad: usize, button: usize },
    Released { pad: usize, button: usize },
    AxisMoved { pad: usize, axis: usize, value: f64 },
}

#[state]
#[derive(Debug, Clone)]
pub enum MonitorState {
    Initializing,
    Monitoring,
}

#[machine]
pub struct PadMonitor<S: MonitorState> {
    blocks: GamepadBlocks<DynSource>,

    clock: FrameClock,

    tick_interval: Duration,

    // Shake a pad when it is plugged in
    rumble_on_connect: bool,

    // Identity last reported per slot, for hot-plug events
    seen: Vec<Option<DeviceIdentity>>,

    edge_count: u64,
}

impl<S: MonitorState> PadMonitor<S> {
    pub fn blocks(&self) -> &GamepadBlocks<DynSource> {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut GamepadBlocks<DynSource> {
        &mut self.blocks
    }
}

impl PadMonitor<Initializing> {
    /// Builds the monitor over the backend named in `config`.
    pub fn create(config: &BankConfig) -> Result<Self, MonitorError> {
        let source: DynSource = match config.backend {
            Backend::Gilrs => Box::new(GilrsSource::new()?),
            Backend::Virtual => {
                info!("Using virtual backend, pads must be connected by code");
                Box::new(VirtualSource::new(config.slot_count))
            }
        };
        Self::with_source(source, config)
    }

    pub fn with_source(source: DynSource, config: &BankConfig) -> Result<Self, MonitorError> {
        config
            .validate()
            .map_err(|e| MonitorError::InitializationError(e.to_string()))?;
        debug!("Creating pad monitor with settings: {:?}", config);

        let bank = DeviceBank::new(source, config.slot_count, config.axis_history);
        Ok(Self::new(
            GamepadBlocks::new(bank),
            FrameClock::start(),
            Duration::from_millis(config.tick_interval_ms),
            config.rumble_on_connect,
            vec![None; config.slot_count],
            0,
        ))
    }

    pub fn initialize(self) -> PadMonitor<Monitoring> {
        let info = extension_info(self.blocks.bank().slot_count());
        info!(
            "Pad monitor ready: extension '{}' with {} blocks, {} pads, tick {:?}",
            info.id,
            info.blocks.len(),
            self.seen.len(),
            self.tick_interval
        );
        self.transition()
    }
}

impl PadMonitor<Monitoring> {
    /// One sweep over every pad at the current clock frame.
    pub fn tick(&mut self) -> Vec<PadEvent> {
        let frame = self.clock.now();
        self.tick_at(frame)
    }

    /// One sweep at an explicit frame id.
    pub fn tick_at(&mut self, frame: FrameId) -> Vec<PadEvent> {
        let mut events = Vec::new();
        for slot in 0..self.seen.len() {
            self.sweep_slot(frame, slot, &mut events);
        }

        for event in &events {
            log_event(event, Local::now());
            if let PadEvent::Connected { pad, .. } = event {
                if self.rumble_on_connect {
                    self.blocks.rumble(0.25, 0.5, 0.25, ordinal(*pad));
                }
            }
        }
        self.edge_count += events
            .iter()
            .filter(|e| matches!(e, PadEvent::Pressed { .. } | PadEvent::Released { .. }))
            .count() as u64;
        events
    }

    fn sweep_slot(&mut self, frame: FrameId, slot: usize, events: &mut Vec<PadEvent>) {
        let pad = slot + 1;
        self.blocks.bank_mut().refresh(frame, slot);

        let (identity, buttons, axes) = match self.blocks.bank().slot(slot) {
            Some(tracker) => (
                tracker.identity().cloned(),
                tracker.button_count(),
                tracker.axis_count(),
            ),
            None => return,
        };

        let Some(seen) = self.seen.get_mut(slot) else {
            return;
        };
        if *seen != identity {
            match &identity {
                Some(identity) => events.push(PadEvent::Connected {
                    pad,
                    identity: identity.clone(),
                }),
                None => events.push(PadEvent::Disconnected { pad }),
            }
            *seen = identity;
        }

        let p = ordinal(pad);
        for button in 1..=buttons {
            let b = ordinal(button);
            if self
                .blocks
                .button_pressed_released(frame, b, PressRelease::Press, p)
            {
                events.push(PadEvent::Pressed { pad, button });
            } else if self
                .blocks
                .button_pressed_released(frame, b, PressRelease::Release, p)
            {
                events.push(PadEvent::Released { pad, button });
            }
        }

        for axis in 1..=axes {
            let a = ordinal(axis);
            if self.blocks.axis_moved(frame, a, p) {
                if let BlockValue::Number(value) = self.blocks.axis_value(frame, a, p) {
                    events.push(PadEvent::AxisMoved { pad, axis, value });
                }
            }
        }
    }

    /// Ticks until Ctrl-C.
    pub async fn run(mut self) -> Result<(), MonitorError> {
        info!("Starting pad monitor loop");
        let mut ticker = interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        let stats_interval = chrono::Duration::seconds(10);
        let mut last_stats = Local::now();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick();

                    let now = Local::now();
                    if now - last_stats > stats_interval {
                        info!(
                            "Pad monitor stats: {} button edges in last {} seconds",
                            self.edge_count,
                            stats_interval.num_seconds()
                        );
                        self.edge_count = 0;
                        last_stats = now;
                    }
                }
                result = &mut shutdown => {
                    match result {
                        Ok(()) => info!("Ctrl-C received, stopping pad monitor"),
                        Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
                    }
                    break;
                }
            }
        }
        Ok(())
    }
}

fn ordinal(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn log_event(event: &PadEvent, at: DateTime<Local>) {
    let at = at.format("%H:%M:%S.%3f");
    match event {
        PadEvent::Connected { pad, identity } => info!(
            "Pad {} connected: {} ({} buttons, {} axes) at {}",
            pad, identity.id, identity.button_count, identity.axis_count, at
        ),
        PadEvent::Disconnected { pad } => info!("Pad {} disconnected at {}", pad, at),
        PadEvent::Pressed { pad, button } => {
            info!("Button {} of pad {} pressed at {}", button, pad, at)
        }
        PadEvent::Released { pad, button } => {
            info!("Button {} of pad {} released at {}", button, pad, at)
        }
        PadEvent::AxisMoved { pad, axis, value } => {
            debug!("Axis {} of pad {} at {:.4} ({})", axis, pad, value, at)
        }
    }
}
