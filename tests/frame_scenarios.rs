use padsync::controller::{AxisHistory, DeviceBank, DeviceSnapshot, HapticHandle, VirtualSource};
use padsync::{BlockCall, BlockValue, FrameId, GamepadBlocks, PressRelease};

fn blocks(axis_history: AxisHistory) -> GamepadBlocks<VirtualSource> {
    GamepadBlocks::new(DeviceBank::new(VirtualSource::new(4), 4, axis_history))
}

fn pad_a(button0: bool, axis0: f32) -> DeviceSnapshot {
    DeviceSnapshot::new("pad-A", vec![button0, false], vec![axis0])
}

#[test]
fn connect_hold_release_on_pad_one() {
    let mut blocks = blocks(AxisHistory::Latched);

    assert!(!blocks.button_down(FrameId(0), 1, 1));

    blocks.bank_mut().source_mut().connect(0, pad_a(true, 0.5));
    assert!(blocks.button_pressed_released(FrameId(1), 1, PressRelease::Press, 1));

    assert!(!blocks.button_pressed_released(FrameId(2), 1, PressRelease::Press, 1));

    blocks.bank_mut().source_mut().set_button(0, 0, false);
    assert!(blocks.button_pressed_released(FrameId(3), 1, PressRelease::Release, 1));
}

#[test]
fn swapping_pads_with_button_held_reports_a_fresh_press() {
    let mut blocks = blocks(AxisHistory::Latched);
    blocks.bank_mut().source_mut().connect(0, pad_a(true, 0.0));
    blocks.button_pressed_released(FrameId(4), 1, PressRelease::Press, 1);
    assert!(!blocks.button_pressed_released(FrameId(5), 1, PressRelease::Press, 1));

    blocks
        .bank_mut()
        .source_mut()
        .connect(0, DeviceSnapshot::new("pad-B", vec![true, false], vec![0.0]));
    assert!(blocks.button_pressed_released(FrameId(6), 1, PressRelease::Press, 1));
}

#[test]
fn held_button_pulses_only_on_the_transition_frame() {
    let mut blocks = blocks(AxisHistory::Latched);
    blocks.bank_mut().source_mut().connect(2, pad_a(false, 0.0));

    let press = |blocks: &mut GamepadBlocks<VirtualSource>, f| {
        (
            blocks.button_pressed_released(FrameId(f), 1, PressRelease::Press, 3),
            blocks.button_pressed_released(FrameId(f), 1, PressRelease::Release, 3),
        )
    };

    assert_eq!(press(&mut blocks, 1), (false, false));
    blocks.bank_mut().source_mut().set_button(2, 0, true);
    assert_eq!(press(&mut blocks, 2), (true, false));
    assert_eq!(press(&mut blocks, 3), (false, false));
    assert_eq!(press(&mut blocks, 4), (false, false));
    blocks.bank_mut().source_mut().set_button(2, 0, false);
    assert_eq!(press(&mut blocks, 5), (false, true));
    assert_eq!(press(&mut blocks, 6), (false, false));
}

#[test]
fn latched_axis_keeps_reporting_movement_from_rest() {
    // previous axes stay at the connect baseline while the pad stays plugged in
    let mut blocks = blocks(AxisHistory::Latched);
    blocks.bank_mut().source_mut().connect(0, pad_a(false, 0.5));

    assert!(blocks.axis_moved(FrameId(1), 1, 1));
    assert!(blocks.axis_moved(FrameId(2), 1, 1));
    assert!(blocks.axis_moved(FrameId(3), 1, 1));
}

#[test]
fn rolling_axis_reports_movement_once() {
    let mut blocks = blocks(AxisHistory::Rolling);
    blocks.bank_mut().source_mut().connect(0, pad_a(false, 0.5));

    assert!(blocks.axis_moved(FrameId(1), 1, 1));
    assert!(!blocks.axis_moved(FrameId(2), 1, 1));
}

#[test]
fn absent_pad_reads_neutral_everywhere() {
    let mut blocks = blocks(AxisHistory::Latched);
    let f = FrameId(10);
    for pad in 1..=4 {
        assert_eq!(
            blocks.handle(f, BlockCall::ButtonDown { b: 1, i: pad }),
            BlockValue::Bool(false)
        );
        assert_eq!(
            blocks.handle(f, BlockCall::AxisValue { b: 1, i: pad }),
            BlockValue::Bool(false)
        );
        assert_eq!(
            blocks.handle(
                f,
                BlockCall::Rumble {
                    s: 1.0,
                    w: 1.0,
                    t: 1.0,
                    i: pad
                }
            ),
            BlockValue::Empty
        );
    }
    assert!(blocks.bank().source().rumbles().is_empty());
}

#[test]
fn rumble_clamps_before_reaching_the_device() {
    let mut blocks = blocks(AxisHistory::Latched);
    blocks.bank_mut().source_mut().connect(
        1,
        pad_a(false, 0.0).with_haptic(HapticHandle { device: 1 }),
    );

    blocks.rumble(3.0, -2.0, 1.5, 2);

    let rumbles = blocks.bank().source().rumbles();
    assert_eq!(rumbles.len(), 1);
    let (handle, effect) = rumbles[0];
    assert_eq!(handle, HapticHandle { device: 1 });
    assert_eq!(effect.strong_magnitude, 1.0);
    assert_eq!(effect.weak_magnitude, 0.0);
    assert_eq!(effect.duration_ms, 1500);
}

#[test]
fn rumble_uses_the_live_device_not_the_cached_frame() {
    let mut blocks = blocks(AxisHistory::Latched);
    blocks.bank_mut().source_mut().connect(0, pad_a(false, 0.0));
    blocks.button_down(FrameId(1), 1, 1);

    // plugged in a rumble-capable pad without advancing the frame
    blocks.bank_mut().source_mut().connect(
        0,
        pad_a(false, 0.0).with_haptic(HapticHandle { device: 7 }),
    );
    blocks.rumble(0.5, 0.5, 0.1, 1);
    assert_eq!(blocks.bank().source().rumbles().len(), 1);
}
