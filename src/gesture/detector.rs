//! Exit gesture recognition
//!
//! Consumes raw input events and decides when the configured escape gesture
//! has been performed. Only the configured method's channel is evaluated; the
//! other channels stay inert for the whole session.

use serde::{Deserialize, Serialize};

use crate::types::{ExitMethod, InputEvent, KeyCode};

/// Max gap between consecutive taps of a triple tap
pub const TAP_WINDOW_MS: u64 = 600;

/// Minimum hold time for a long press
pub const LONG_PRESS_MS: u64 = 3_000;

/// Max gap between consecutive volume-up presses
pub const VOLUME_WINDOW_MS: u64 = 1_000;

/// Minimum spacing between two counted shakes
pub const SHAKE_SPACING_MS: u64 = 500;

/// Acceleration delta magnitude a sample must exceed to count as a shake
pub const SHAKE_THRESHOLD: f64 = 12.0;

/// Taps, presses or shakes needed to fire
pub const REPEAT_COUNT: u32 = 3;

/// Mutable gesture counters for one session.
///
/// A `None` timestamp means the channel has no previous event, which is
/// treated the same as an expired window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GestureState {
    pub tap_count: u32,
    pub last_tap_ms: Option<u64>,
    pub long_press_start_ms: Option<u64>,
    pub volume_count: u32,
    pub last_volume_ms: Option<u64>,
    pub shake_count: u32,
    pub last_shake_ms: Option<u64>,
    pub last_accel: Option<[f32; 3]>,
}

/// Result of feeding one event through the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Detection {
    /// The configured gesture completed on this event
    pub exit_requested: bool,
    /// The event must not be passed on to the platform
    pub consumed: bool,
}

/// Single-method exit gesture recognizer
#[derive(Debug, Clone)]
pub struct GestureExitDetector {
    method: ExitMethod,
    state: GestureState,
}

impl GestureExitDetector {
    pub fn new(method: ExitMethod) -> Self {
        Self {
            method,
            state: GestureState::default(),
        }
    }

    pub fn method(&self) -> ExitMethod {
        self.method
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Feed one raw event. Edge blocking is the caller's job.
    pub fn on_event(&mut self, event: &InputEvent) -> Detection {
        match (*event, self.method) {
            (InputEvent::PointerDown { t_ms, .. }, ExitMethod::TripleTap) => Detection {
                exit_requested: triple_tap(&mut self.state, t_ms),
                consumed: false,
            },
            (InputEvent::PointerDown { t_ms, .. }, ExitMethod::LongPress) => {
                self.state.long_press_start_ms = Some(t_ms);
                Detection::default()
            }
            (InputEvent::PointerUp { t_ms, .. }, ExitMethod::LongPress)
            | (InputEvent::PointerCancel { t_ms }, ExitMethod::LongPress) => Detection {
                exit_requested: long_press_release(&mut self.state, t_ms),
                consumed: false,
            },
            (InputEvent::KeyDown { key, t_ms }, method) => {
                let exit_requested = method == ExitMethod::VolumeUp
                    && key == KeyCode::VolumeUp
                    && volume_press(&mut self.state, t_ms);
                Detection {
                    exit_requested,
                    consumed: key.is_intercepted(),
                }
            }
            (InputEvent::KeyUp { key, .. }, _) => Detection {
                exit_requested: false,
                consumed: key.is_intercepted(),
            },
            (InputEvent::Accelerometer { x, y, z, t_ms }, ExitMethod::Shake) => Detection {
                exit_requested: shake_sample(&mut self.state, [x, y, z], t_ms),
                consumed: false,
            },
            _ => Detection::default(),
        }
    }
}

/// Whether `now` is outside `window` of `last`. No previous event counts as expired.
fn window_expired(last: Option<u64>, now: u64, window: u64) -> bool {
    match last {
        Some(last) => now.saturating_sub(last) > window,
        None => true,
    }
}

fn triple_tap(state: &mut GestureState, now: u64) -> bool {
    if window_expired(state.last_tap_ms, now, TAP_WINDOW_MS) {
        state.tap_count = 1;
    } else {
        state.tap_count += 1;
    }
    state.last_tap_ms = Some(now);

    log::debug!("tap {} of {}", state.tap_count, REPEAT_COUNT);
    if state.tap_count >= REPEAT_COUNT {
        state.tap_count = 0;
        return true;
    }
    false
}

fn long_press_release(state: &mut GestureState, now: u64) -> bool {
    let fired = state
        .long_press_start_ms
        .map(|start| now.saturating_sub(start) >= LONG_PRESS_MS)
        .unwrap_or(false);
    state.long_press_start_ms = None;
    fired
}

fn volume_press(state: &mut GestureState, now: u64) -> bool {
    if window_expired(state.last_volume_ms, now, VOLUME_WINDOW_MS) {
        state.volume_count = 1;
    } else {
        state.volume_count += 1;
    }
    state.last_volume_ms = Some(now);

    log::debug!("volume-up {} of {}", state.volume_count, REPEAT_COUNT);
    if state.volume_count >= REPEAT_COUNT {
        state.volume_count = 0;
        return true;
    }
    false
}

fn shake_sample(state: &mut GestureState, sample: [f32; 3], now: u64) -> bool {
    if !sample.iter().all(|v| v.is_finite()) {
        log::warn!("dropping non-finite accelerometer sample {:?}", sample);
        return false;
    }
    let Some(previous) = state.last_accel.replace(sample) else {
        // First sample only seeds the baseline
        return false;
    };

    // Both samples are finite, so the magnitude is never NaN
    if shake_magnitude(previous, sample) <= SHAKE_THRESHOLD {
        return false;
    }
    if !window_expired(state.last_shake_ms, now, SHAKE_SPACING_MS) {
        return false;
    }

    state.shake_count += 1;
    state.last_shake_ms = Some(now);

    log::debug!("shake {} of {}", state.shake_count, REPEAT_COUNT);
    if state.shake_count >= REPEAT_COUNT {
        state.shake_count = 0;
        return true;
    }
    false
}

/// Euclidean norm of the per-axis change between two accelerometer samples
pub fn shake_magnitude(previous: [f32; 3], current: [f32; 3]) -> f64 {
    previous
        .iter()
        .zip(current.iter())
        .map(|(p, c)| {
            let delta = (*c - *p) as f64;
            delta * delta
        })
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn down(t_ms: u64) -> InputEvent {
        InputEvent::PointerDown {
            x: 500.0,
            y: 1000.0,
            t_ms,
        }
    }

    fn up(t_ms: u64) -> InputEvent {
        InputEvent::PointerUp {
            x: 500.0,
            y: 1000.0,
            t_ms,
        }
    }

    fn key(key: KeyCode, t_ms: u64) -> InputEvent {
        InputEvent::KeyDown { key, t_ms }
    }

    fn accel(x: f32, y: f32, z: f32, t_ms: u64) -> InputEvent {
        InputEvent::Accelerometer { x, y, z, t_ms }
    }

    fn fires(detector: &mut GestureExitDetector, events: &[InputEvent]) -> Vec<bool> {
        events
            .iter()
            .map(|e| detector.on_event(e).exit_requested)
            .collect()
    }

    #[test]
    fn test_triple_tap_fires_once() {
        let mut detector = GestureExitDetector::new(ExitMethod::TripleTap);
        let result = fires(&mut detector, &[down(1000), down(1300), down(1600)]);
        assert_eq!(result, vec![false, false, true]);
        assert_eq!(detector.state().tap_count, 0);
    }

    #[test]
    fn test_fourth_tap_starts_fresh() {
        let mut detector = GestureExitDetector::new(ExitMethod::TripleTap);
        fires(&mut detector, &[down(1000), down(1300), down(1600)]);

        assert!(!detector.on_event(&down(1700)).exit_requested);
        assert_eq!(detector.state().tap_count, 1);
    }

    #[test]
    fn test_slow_taps_never_fire() {
        let mut detector = GestureExitDetector::new(ExitMethod::TripleTap);
        let result = fires(
            &mut detector,
            &[down(1000), down(1601), down(2202), down(2803)],
        );
        assert_eq!(result, vec![false; 4]);
        assert_eq!(detector.state().tap_count, 1);
    }

    #[test]
    fn test_tap_window_is_inclusive() {
        let mut detector = GestureExitDetector::new(ExitMethod::TripleTap);
        let result = fires(&mut detector, &[down(1000), down(1600), down(2200)]);
        assert_eq!(result, vec![false, false, true]);
    }

    #[test]
    fn test_taps_ignored_for_other_methods() {
        let mut detector = GestureExitDetector::new(ExitMethod::VolumeUp);
        let result = fires(&mut detector, &[down(0), down(100), down(200)]);
        assert_eq!(result, vec![false; 3]);
        assert_eq!(detector.state().tap_count, 0);
    }

    #[test]
    fn test_long_press_exact_threshold() {
        let mut detector = GestureExitDetector::new(ExitMethod::LongPress);
        assert!(!detector.on_event(&down(10_000)).exit_requested);
        assert!(detector.on_event(&up(13_000)).exit_requested);
        assert_eq!(detector.state().long_press_start_ms, None);
    }

    #[test]
    fn test_long_press_too_short() {
        let mut detector = GestureExitDetector::new(ExitMethod::LongPress);
        detector.on_event(&down(10_000));
        assert!(!detector.on_event(&up(12_999)).exit_requested);
        assert_eq!(detector.state().long_press_start_ms, None);
    }

    #[test]
    fn test_long_press_cancel_counts_as_release() {
        let mut detector = GestureExitDetector::new(ExitMethod::LongPress);
        detector.on_event(&down(0));
        let detection = detector.on_event(&InputEvent::PointerCancel { t_ms: 4_000 });
        assert!(detection.exit_requested);
    }

    #[test]
    fn test_release_without_press_does_not_fire() {
        let mut detector = GestureExitDetector::new(ExitMethod::LongPress);
        assert!(!detector.on_event(&up(50_000)).exit_requested);
    }

    #[test]
    fn test_volume_up_fires_on_third_press() {
        let mut detector = GestureExitDetector::new(ExitMethod::VolumeUp);
        let events = [
            key(KeyCode::VolumeUp, 0),
            key(KeyCode::VolumeUp, 900),
            key(KeyCode::VolumeUp, 1800),
        ];
        assert_eq!(fires(&mut detector, &events), vec![false, false, true]);
    }

    #[test]
    fn test_volume_up_window_reset() {
        let mut detector = GestureExitDetector::new(ExitMethod::VolumeUp);
        let events = [
            key(KeyCode::VolumeUp, 0),
            key(KeyCode::VolumeUp, 500),
            key(KeyCode::VolumeUp, 1501),
        ];
        assert_eq!(fires(&mut detector, &events), vec![false; 3]);
        assert_eq!(detector.state().volume_count, 1);
    }

    #[test]
    fn test_other_keys_consumed_but_not_counted() {
        let mut detector = GestureExitDetector::new(ExitMethod::VolumeUp);
        detector.on_event(&key(KeyCode::VolumeUp, 0));

        let detection = detector.on_event(&key(KeyCode::VolumeDown, 100));
        assert_eq!(
            detection,
            Detection {
                exit_requested: false,
                consumed: true
            }
        );
        assert_eq!(detector.state().volume_count, 1);
    }

    #[test]
    fn test_keys_intercepted_regardless_of_method() {
        let mut detector = GestureExitDetector::new(ExitMethod::TripleTap);
        for code in [
            KeyCode::VolumeUp,
            KeyCode::VolumeDown,
            KeyCode::VolumeMute,
            KeyCode::Camera,
            KeyCode::Search,
            KeyCode::Menu,
            KeyCode::AppSwitch,
        ] {
            let detection = detector.on_event(&key(code, 0));
            assert!(detection.consumed, "{code:?} should be consumed");
            assert!(!detection.exit_requested);

            let release = detector.on_event(&InputEvent::KeyUp { key: code, t_ms: 10 });
            assert!(release.consumed, "{code:?} release should be consumed");
        }
        assert_eq!(detector.state().volume_count, 0);

        let passthrough = detector.on_event(&key(KeyCode::Other(29), 0));
        assert!(!passthrough.consumed);
    }

    #[test]
    fn test_shake_needs_three_spaced_samples() {
        let mut detector = GestureExitDetector::new(ExitMethod::Shake);
        let events = [
            accel(0.0, 0.0, 9.8, 0),
            accel(15.0, 0.0, 9.8, 100),
            accel(0.0, 0.0, 9.8, 601),
            accel(15.0, 0.0, 9.8, 1102),
        ];
        assert_eq!(fires(&mut detector, &events), vec![false, false, false, true]);
        assert_eq!(detector.state().shake_count, 0);
    }

    #[test]
    fn test_shakes_too_close_count_once() {
        let mut detector = GestureExitDetector::new(ExitMethod::Shake);
        fires(
            &mut detector,
            &[
                accel(0.0, 0.0, 9.8, 0),
                accel(15.0, 0.0, 9.8, 100),
                accel(0.0, 0.0, 9.8, 400),
            ],
        );
        assert_eq!(detector.state().shake_count, 1);
        assert_eq!(detector.state().last_shake_ms, Some(100));
    }

    #[test]
    fn test_first_sample_only_seeds_baseline() {
        let mut detector = GestureExitDetector::new(ExitMethod::Shake);
        detector.on_event(&accel(40.0, 40.0, 40.0, 0));
        assert_eq!(detector.state().shake_count, 0);
        assert_eq!(detector.state().last_accel, Some([40.0, 40.0, 40.0]));
    }

    #[test]
    fn test_gentle_motion_is_not_a_shake() {
        let mut detector = GestureExitDetector::new(ExitMethod::Shake);
        let events: Vec<InputEvent> = (0..10)
            .map(|i| accel((i % 2) as f32 * 5.0, 0.0, 9.8, i * 1_000))
            .collect();
        assert!(fires(&mut detector, &events).iter().all(|f| !f));
        assert_eq!(detector.state().shake_count, 0);
    }

    #[test]
    fn test_accelerometer_ignored_without_shake_method() {
        let mut detector = GestureExitDetector::new(ExitMethod::TripleTap);
        detector.on_event(&accel(0.0, 0.0, 0.0, 0));
        detector.on_event(&accel(30.0, 0.0, 0.0, 1000));
        assert_eq!(detector.state().last_accel, None);
        assert_eq!(detector.state().shake_count, 0);
    }

    #[test]
    fn test_non_finite_samples_are_dropped() {
        let mut detector = GestureExitDetector::new(ExitMethod::Shake);
        let events: Vec<InputEvent> = (0..4)
            .map(|i| accel(f32::INFINITY, 0.0, 9.8, i * 600))
            .collect();
        assert_eq!(fires(&mut detector, &events), vec![false; 4]);
        assert_eq!(detector.state().shake_count, 0);
        assert_eq!(detector.state().last_accel, None);

        // A NaN between real samples neither counts nor replaces the baseline
        detector.on_event(&accel(0.0, 0.0, 9.8, 3_000));
        detector.on_event(&accel(f32::NAN, 0.0, 9.8, 3_600));
        assert_eq!(detector.state().last_accel, Some([0.0, 0.0, 9.8]));
        assert_eq!(detector.state().shake_count, 0);
    }

    #[test]
    fn test_overflowing_json_sample_is_not_a_shake() {
        let mut detector = GestureExitDetector::new(ExitMethod::Shake);
        let fired: Vec<bool> = (0..4)
            .map(|i| {
                let json = format!(
                    r#"{{"kind": "accelerometer", "x": 1e39, "y": 0.0, "z": 9.8, "t_ms": {}}}"#,
                    i * 600
                );
                let event: InputEvent = serde_json::from_str(&json).unwrap();
                detector.on_event(&event).exit_requested
            })
            .collect();
        assert_eq!(fired, vec![false; 4]);
    }

    #[test]
    fn test_shake_magnitude() {
        let magnitude = shake_magnitude([0.0, 0.0, 0.0], [3.0, 4.0, 12.0]);
        assert!((magnitude - 13.0).abs() < 1e-9);
    }
}
