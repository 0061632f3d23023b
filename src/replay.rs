//! Offline replay of recorded input streams
//!
//! Recorded sessions are NDJSON, one [`InputEvent`] per line. Replaying feeds
//! them through a [`SessionController`] and synthesizes the timer ticks the
//! host would have delivered in between, so a recording reproduces both the
//! gesture exit and the progress curve.

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::session::{EventOutcome, SessionController, TickOutcome};
use crate::types::{InputEvent, SessionConfig, TICK_INTERVAL_MS};

/// Parse a JSON array of events
pub fn parse_array(json: &str) -> Result<Vec<InputEvent>, SessionError> {
    let events: Vec<InputEvent> = serde_json::from_str(json)?;
    Ok(events)
}

/// Parse NDJSON events, skipping blank lines. Errors carry the 1-based line number.
pub fn parse_ndjson(ndjson: &str) -> Result<Vec<InputEvent>, SessionError> {
    let mut events = Vec::new();
    for (line_num, line) in ndjson.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<InputEvent>(trimmed) {
            Ok(event) => events.push(event),
            Err(e) => {
                return Err(SessionError::ParseError(format!(
                    "Failed to parse line {}: {}",
                    line_num + 1,
                    e
                )));
            }
        }
    }
    Ok(events)
}

/// One thing that happened during a replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ReplayStep {
    Tick { at_ms: u64, outcome: TickOutcome },
    Event {
        at_ms: u64,
        event: InputEvent,
        outcome: EventOutcome,
    },
}

impl ReplayStep {
    pub fn is_exit(&self) -> bool {
        match self {
            ReplayStep::Tick { outcome, .. } => outcome.exit.is_some(),
            ReplayStep::Event { outcome, .. } => outcome.exit.is_some(),
        }
    }
}

/// A session driven from recorded timestamps instead of a live clock
#[derive(Debug)]
pub struct Replay {
    controller: SessionController,
    next_tick_ms: u64,
}

impl Replay {
    pub fn new(config: SessionConfig, start_ms: u64) -> Result<Self, SessionError> {
        Ok(Self {
            controller: SessionController::new(config, start_ms)?,
            next_tick_ms: start_ms.saturating_add(TICK_INTERVAL_MS),
        })
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    /// Deliver every tick due at or before `t_ms`
    pub fn advance_to(&mut self, t_ms: u64) -> Vec<ReplayStep> {
        let mut steps = Vec::new();
        while !self.controller.is_exiting() && self.next_tick_ms <= t_ms {
            let at_ms = self.next_tick_ms;
            let outcome = self.controller.on_tick();
            self.next_tick_ms = self.next_tick_ms.saturating_add(TICK_INTERVAL_MS);
            steps.push(ReplayStep::Tick { at_ms, outcome });
        }
        steps
    }

    /// Deliver due ticks, then the event. Nothing happens once the session has exited.
    pub fn feed(&mut self, event: InputEvent) -> Vec<ReplayStep> {
        let at_ms = event.timestamp_ms();
        let mut steps = self.advance_to(at_ms);
        if self.controller.is_exiting() {
            return steps;
        }
        let outcome = self.controller.on_event(&event);
        steps.push(ReplayStep::Event {
            at_ms,
            event,
            outcome,
        });
        steps
    }

    /// Tick until the update completes (or a gesture already ended it)
    pub fn run_to_completion(&mut self) -> Vec<ReplayStep> {
        let mut steps = Vec::new();
        while !self.controller.is_exiting() {
            steps.extend(self.advance_to(self.next_tick_ms));
        }
        steps
    }
}

/// Replay a whole recording
pub fn replay_events(
    config: SessionConfig,
    start_ms: u64,
    events: impl IntoIterator<Item = InputEvent>,
    run_to_completion: bool,
) -> Result<Vec<ReplayStep>, SessionError> {
    let mut replay = Replay::new(config, start_ms)?;
    let mut steps = Vec::new();
    for event in events {
        if replay.controller().is_exiting() {
            break;
        }
        steps.extend(replay.feed(event));
    }
    if run_to_completion {
        steps.extend(replay.run_to_completion());
    }
    Ok(steps)
}
