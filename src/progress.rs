//! Stalling progress simulation
//!
//! Maps elapsed-time fraction to the percentage shown on the fake update
//! screen. The curve is fast at first, sticks at two plateaus and rushes at the
//! end, like a real download that keeps stalling.

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::types::TICK_INTERVAL_MS;

/// Highest percentage the curve itself can produce. 100 only appears at completion.
pub const MAX_RUNNING_PERCENT: u8 = 99;

/// Vibrate once every this many milliseconds of elapsed update time
pub const HAPTIC_PERIOD_MS: u64 = 45_000;

/// Percentage shown once the timer runs out
pub const COMPLETE_PERCENT: u8 = 100;

/// Piecewise-linear curve knots as (segment start fraction, percent at start, percent at end).
///
/// Each segment runs until the next knot's start fraction; the last one ends at 1.0.
const KNOTS: [(f64, f64, f64); 10] = [
    (0.00, 0.0, 4.0),
    (0.05, 4.0, 12.0),
    (0.30, 12.0, 30.0),
    (0.35, 30.0, 45.0),
    (0.55, 45.0, 45.0),
    (0.60, 45.0, 65.0),
    (0.70, 65.0, 80.0),
    (0.85, 80.0, 80.0),
    (0.90, 80.0, 95.0),
    (0.95, 95.0, 99.0),
];

/// Map a time fraction in [0, 1] to the displayed percentage in [0, 99].
///
/// Pure and total: negative or NaN fractions give 0, fractions at or above 1 give 99.
pub fn compute_progress(fraction: f64) -> u8 {
    if fraction.is_nan() || fraction <= 0.0 {
        return 0;
    }
    let fraction = fraction.min(1.0);

    let idx = KNOTS
        .iter()
        .rposition(|&(start, _, _)| fraction >= start)
        .unwrap_or(0);
    let (start, from, to) = KNOTS[idx];
    let end = KNOTS.get(idx + 1).map(|k| k.0).unwrap_or(1.0);

    let value = if from == to {
        from
    } else {
        from + (fraction - start) / (end - start) * (to - from)
    };

    (value as i64).clamp(0, MAX_RUNNING_PERCENT as i64) as u8
}

/// "x.x GB / y.y GB" caption that accompanies the bare percentage on some styles
pub fn download_label(percent: u8, total_gb: f64) -> String {
    let downloaded = total_gb * percent as f64 / 100.0;
    format!("{:.1} GB / {:.1} GB", downloaded, total_gb)
}

/// What one timer tick produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Percentage to display after this tick
    pub percent: u8,
    /// Host should fire a short vibration
    pub haptic_pulse: bool,
    /// The configured duration has fully elapsed
    pub completed: bool,
}

/// Progress of one session's fake update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressState {
    elapsed_ms: u64,
    total_duration_ms: u64,
    tick_interval_ms: u64,
    displayed: u8,
}

impl ProgressState {
    /// Create progress for a session of `total_duration_ms` (> 0)
    pub fn new(total_duration_ms: u64) -> Result<Self, SessionError> {
        Self::with_tick_interval(total_duration_ms, TICK_INTERVAL_MS)
    }

    pub fn with_tick_interval(
        total_duration_ms: u64,
        tick_interval_ms: u64,
    ) -> Result<Self, SessionError> {
        if total_duration_ms == 0 {
            return Err(SessionError::InvalidDuration(0));
        }
        Ok(Self {
            elapsed_ms: 0,
            total_duration_ms,
            tick_interval_ms: tick_interval_ms.max(1),
            displayed: 0,
        })
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.total_duration_ms
    }

    pub fn displayed(&self) -> u8 {
        self.displayed
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed_ms >= self.total_duration_ms
    }

    pub fn fraction(&self) -> f64 {
        self.elapsed_ms as f64 / self.total_duration_ms as f64
    }

    /// Advance by one tick interval
    pub fn tick(&mut self) -> TickReport {
        if self.is_complete() {
            return TickReport {
                percent: self.displayed,
                haptic_pulse: false,
                completed: true,
            };
        }

        self.elapsed_ms = (self.elapsed_ms + self.tick_interval_ms).min(self.total_duration_ms);

        if self.is_complete() {
            self.displayed = COMPLETE_PERCENT;
            log::debug!("progress complete after {} ms", self.elapsed_ms);
            return TickReport {
                percent: COMPLETE_PERCENT,
                haptic_pulse: false,
                completed: true,
            };
        }

        self.displayed = self.displayed.max(compute_progress(self.fraction()));
        TickReport {
            percent: self.displayed,
            haptic_pulse: self.elapsed_ms % HAPTIC_PERIOD_MS < self.tick_interval_ms,
            completed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knot_values() {
        assert_eq!(compute_progress(0.0), 0);
        assert_eq!(compute_progress(0.05), 4);
        assert_eq!(compute_progress(0.30), 12);
        assert_eq!(compute_progress(0.35), 30);
        assert_eq!(compute_progress(0.55), 45);
        assert_eq!(compute_progress(0.6), 45);
        assert_eq!(compute_progress(0.70), 65);
        assert_eq!(compute_progress(0.85), 80);
        assert_eq!(compute_progress(0.90), 80);
        assert_eq!(compute_progress(0.95), 95);
        assert_eq!(compute_progress(1.0), 99);
    }

    #[test]
    fn test_plateaus() {
        assert_eq!(compute_progress(0.57), 45);
        assert_eq!(compute_progress(0.5999), 45);
        assert_eq!(compute_progress(0.87), 80);
    }

    #[test]
    fn test_interpolation_truncates() {
        // 0.025 is half way through the first segment -> 2.0
        assert_eq!(compute_progress(0.025), 2);
        // 0.325 is half way through 12 -> 30 -> 21
        assert_eq!(compute_progress(0.325), 21);
        // just under a knot stays below the knot value
        assert_eq!(compute_progress(0.3499), 29);
    }

    #[test]
    fn test_out_of_range_inputs() {
        assert_eq!(compute_progress(-0.5), 0);
        assert_eq!(compute_progress(f64::NAN), 0);
        assert_eq!(compute_progress(1.5), 99);
        assert_eq!(compute_progress(f64::INFINITY), 99);
    }

    #[test]
    fn test_range_and_monotonic() {
        let mut previous = 0;
        for step in 0..=10_000 {
            let fraction = step as f64 / 10_000.0;
            let value = compute_progress(fraction);
            assert!(value <= MAX_RUNNING_PERCENT, "{fraction} -> {value}");
            assert!(value >= previous, "curve dropped at {fraction}: {previous} -> {value}");
            previous = value;
        }
    }

    #[test]
    fn test_download_label() {
        assert_eq!(download_label(50, 5.2), "2.6 GB / 5.2 GB");
        assert_eq!(download_label(0, 5.2), "0.0 GB / 5.2 GB");
    }

    #[test]
    fn test_zero_duration_rejected() {
        assert!(ProgressState::new(0).is_err());
    }

    #[test]
    fn test_ticks_until_completion() {
        let mut progress = ProgressState::new(10_000).unwrap();
        let mut reports = Vec::new();
        for _ in 0..10 {
            reports.push(progress.tick());
        }

        let percents: Vec<u8> = reports.iter().map(|r| r.percent).collect();
        assert_eq!(percents, vec![5, 8, 12, 33, 41, 45, 65, 75, 80, 100]);
        assert!(reports[..9].iter().all(|r| !r.completed));
        assert!(reports[9].completed);
        assert!(progress.is_complete());
        assert_eq!(progress.displayed(), 100);

        // Further ticks are inert
        let after = progress.tick();
        assert!(after.completed);
        assert_eq!(after.percent, 100);
        assert_eq!(progress.elapsed_ms(), 10_000);
    }

    #[test]
    fn test_haptic_pulse_every_45_seconds() {
        let mut progress = ProgressState::new(30 * 60 * 1_000).unwrap();
        let pulses: Vec<u64> = (0..120)
            .filter_map(|_| {
                let report = progress.tick();
                report.haptic_pulse.then_some(progress.elapsed_ms())
            })
            .collect();
        assert_eq!(pulses, vec![45_000, 90_000]);
    }

    #[test]
    fn test_displayed_never_decreases() {
        let mut progress = ProgressState::new(7_000).unwrap();
        let mut last = 0;
        while !progress.is_complete() {
            let report = progress.tick();
            assert!(report.percent >= last);
            last = report.percent;
        }
        assert_eq!(last, 100);
    }
}
