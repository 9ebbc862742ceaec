//! Bounded ring of event records for post-hoc inspection. On overflow the
//! oldest entry is dropped; `dump(n)` returns the last `n` records as a JSON
//! array in chronological order.

use std::collections::VecDeque;

use serde::Serialize;

use crate::action::ActionType;
use crate::calibration::CalibrationState;
use crate::detection::DetectionState;

/// Default ring capacity. Spec takes precedence over the 128-entry default
/// the original implementation used.
pub const DEFAULT_CAPACITY: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EventRecord {
    pub t: f64,
    pub state: i32,
    pub cal: i32,
    pub score: f64,
    pub rel: f64,
    pub action: i32,
}

impl EventRecord {
    pub fn new(
        timestamp_sec: f64,
        detection_state: DetectionState,
        calibration_state: CalibrationState,
        score: f64,
        relative_motion: f64,
        action_type: ActionType,
    ) -> Self {
        Self {
            t: timestamp_sec,
            state: detection_state_code(detection_state),
            cal: calibration_state_code(calibration_state),
            score,
            rel: relative_motion,
            action: action_type_code(action_type),
        }
    }
}

fn detection_state_code(state: DetectionState) -> i32 {
    match state {
        DetectionState::Idle => 0,
        DetectionState::Observing => 1,
        DetectionState::Triggered => 2,
        DetectionState::Cooldown => 3,
    }
}

fn calibration_state_code(state: CalibrationState) -> i32 {
    match state {
        CalibrationState::Init => 0,
        CalibrationState::Warmup => 1,
        CalibrationState::Calibrating => 2,
        CalibrationState::Armed => 3,
    }
}

fn action_type_code(action_type: ActionType) -> i32 {
    match action_type {
        ActionType::None => 0,
        ActionType::Beep => 1,
        ActionType::LockScreen => 2,
        ActionType::Notify => 3,
    }
}

pub struct EventJournal {
    capacity: usize,
    events: VecDeque<EventRecord>,
}

impl EventJournal {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            events: VecDeque::new(),
        }
    }

    pub fn push(&mut self, record: EventRecord) {
        if self.events.len() >= self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns the last `max_items` records as a JSON array string, in
    /// chronological order.
    pub fn dump_json_array(&self, max_items: usize) -> String {
        let start = self.events.len().saturating_sub(max_items);
        let slice: Vec<&EventRecord> = self.events.iter().skip(start).collect();
        serde_json::to_string(&slice).unwrap_or_else(|_| "[]".to_string())
    }
}

impl Default for EventJournal {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
