//! Session orchestration
//!
//! A [`SessionController`] owns one run of the fake update screen. The host
//! translates platform callbacks into `on_event` / `on_tick` / `on_teardown`
//! calls and acts on the returned outcomes; the controller never touches the
//! platform itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;
use crate::gesture::{EdgeZone, GestureExitDetector};
use crate::progress::ProgressState;
use crate::types::{ExitMethod, InputEvent, SessionConfig, UpdateStyle};

/// Why the session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// The configured escape gesture was performed
    Gesture,
    /// The fake update ran to 100%
    Completed,
}

/// Platform resources the host must release. Each flag is set at most once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TeardownActions {
    /// Cancel the repeating progress timer
    pub stop_timer: bool,
    /// Unregister the accelerometer listener
    pub unregister_sensors: bool,
    /// Drop pending deferred callbacks (immersive-mode re-entry)
    pub clear_pending_callbacks: bool,
}

impl TeardownActions {
    pub fn is_empty(&self) -> bool {
        !(self.stop_timer || self.unregister_sensors || self.clear_pending_callbacks)
    }
}

/// What the reveal and recap screens need to know about a finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub exit_method: ExitMethod,
    pub style: UpdateStyle,
    pub reason: ExitReason,
    /// Time from session start to exit. The reveal sequence that follows is not included.
    pub duration_ms: u64,
    /// Every pointer-down seen during the session, blocked or not
    pub tap_count: u32,
    pub started_at: DateTime<Utc>,
    /// Percentage on screen when the session ended
    pub final_percent: u8,
}

/// The one-time exit transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionExit {
    pub reason: ExitReason,
    pub teardown: TeardownActions,
    pub summary: SessionSummary,
}

/// Result of one input event
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventOutcome {
    /// Do not pass the event on to the platform
    pub consumed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit: Option<SessionExit>,
}

/// Result of one timer tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickOutcome {
    pub percent: u8,
    pub haptic_pulse: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit: Option<SessionExit>,
}

#[derive(Debug, Clone, Copy)]
struct SessionResources {
    timer_running: bool,
    sensors_registered: bool,
    callbacks_pending: bool,
}

impl SessionResources {
    fn acquire(method: ExitMethod) -> Self {
        Self {
            timer_running: true,
            sensors_registered: method.needs_accelerometer(),
            callbacks_pending: true,
        }
    }

    fn release(&mut self) -> TeardownActions {
        TeardownActions {
            stop_timer: std::mem::take(&mut self.timer_running),
            unregister_sensors: std::mem::take(&mut self.sensors_registered),
            clear_pending_callbacks: std::mem::take(&mut self.callbacks_pending),
        }
    }
}

/// Drives gesture detection and progress for one session
#[derive(Debug)]
pub struct SessionController {
    config: SessionConfig,
    session_id: String,
    started_at: DateTime<Utc>,
    start_ms: u64,
    detector: GestureExitDetector,
    progress: ProgressState,
    edge_zone: Option<EdgeZone>,
    resources: SessionResources,
    tap_count: u32,
    exiting: bool,
}

impl SessionController {
    /// Start a session. `start_ms` is the host's monotonic clock at the moment
    /// the screen is shown, in the same time base as event timestamps.
    pub fn new(config: SessionConfig, start_ms: u64) -> Result<Self, SessionError> {
        config.validate()?;
        let progress = ProgressState::new(config.total_duration_ms)?;
        let edge_zone = config.screen.as_ref().map(EdgeZone::from_geometry);
        let session_id = Uuid::new_v4().to_string();

        log::info!(
            "session {} started: {} via {} for {} ms",
            session_id,
            config.style.as_str(),
            config.exit_method.as_str(),
            config.total_duration_ms
        );

        Ok(Self {
            detector: GestureExitDetector::new(config.exit_method),
            resources: SessionResources::acquire(config.exit_method),
            config,
            session_id,
            started_at: Utc::now(),
            start_ms,
            progress,
            edge_zone,
            tap_count: 0,
            exiting: false,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }

    pub fn detector(&self) -> &GestureExitDetector {
        &self.detector
    }

    pub fn tap_count(&self) -> u32 {
        self.tap_count
    }

    pub fn is_exiting(&self) -> bool {
        self.exiting
    }

    /// Whether the host must register an accelerometer listener for this session
    pub fn wants_accelerometer(&self) -> bool {
        self.config.exit_method.needs_accelerometer()
    }

    /// Feed one raw input event
    pub fn on_event(&mut self, event: &InputEvent) -> EventOutcome {
        if self.exiting {
            return EventOutcome {
                consumed: self.blocks(event),
                exit: None,
            };
        }

        if matches!(event, InputEvent::PointerDown { .. }) {
            self.tap_count = self.tap_count.saturating_add(1);
        }

        // Gestures run first so they work from any position, blocked edges included
        let detection = self.detector.on_event(event);
        let consumed = detection.consumed || self.blocks(event);

        let exit = if detection.exit_requested {
            let duration_ms = event.timestamp_ms().saturating_sub(self.start_ms);
            self.request_exit(ExitReason::Gesture, duration_ms)
        } else {
            None
        };

        EventOutcome { consumed, exit }
    }

    /// Advance the fake update by one timer tick
    pub fn on_tick(&mut self) -> TickOutcome {
        if self.exiting {
            return TickOutcome {
                percent: self.progress.displayed(),
                haptic_pulse: false,
                exit: None,
            };
        }

        let report = self.progress.tick();
        let exit = if report.completed {
            self.request_exit(ExitReason::Completed, self.progress.elapsed_ms())
        } else {
            None
        };

        TickOutcome {
            percent: report.percent,
            haptic_pulse: report.haptic_pulse && self.config.haptic_feedback,
            exit,
        }
    }

    /// Host-initiated teardown (screen destroyed without an exit).
    ///
    /// Safe to call any number of times; resources already released are not
    /// reported again. No exit transition happens after this.
    pub fn on_teardown(&mut self) -> TeardownActions {
        self.exiting = true;
        let actions = self.resources.release();
        if !actions.is_empty() {
            log::info!("session {} torn down by host", self.session_id);
        }
        actions
    }

    fn blocks(&self, event: &InputEvent) -> bool {
        match *event {
            InputEvent::PointerDown { x, y, .. } => self
                .edge_zone
                .map(|zone| zone.contains(x, y))
                .unwrap_or(false),
            InputEvent::KeyDown { key, .. } | InputEvent::KeyUp { key, .. } => {
                key.is_intercepted()
            }
            _ => false,
        }
    }

    fn request_exit(&mut self, reason: ExitReason, duration_ms: u64) -> Option<SessionExit> {
        if self.exiting {
            return None;
        }
        self.exiting = true;

        let teardown = self.resources.release();
        let summary = SessionSummary {
            session_id: self.session_id.clone(),
            exit_method: self.config.exit_method,
            style: self.config.style,
            reason,
            duration_ms,
            tap_count: self.tap_count,
            started_at: self.started_at,
            final_percent: self.progress.displayed(),
        };

        log::info!(
            "session {} exiting ({:?}) after {} ms, {} taps",
            self.session_id,
            reason,
            duration_ms,
            self.tap_count
        );

        Some(SessionExit {
            reason,
            teardown,
            summary,
        })
    }
}
