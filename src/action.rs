//! Maps detection events to action requests and throttles them: an arming
//! delay at session start, a per-lock cooldown, and a locks-per-minute cap
//! to prevent lock-loops.

use std::collections::VecDeque;

use crate::config::{ActionMode, DetectionConfig};
use crate::detection::{DetectionState, MotionEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    None,
    Beep,
    LockScreen,
    Notify,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub action_type: ActionType,
    pub timestamp_sec: f64,
    pub reason: String,
}

impl ActionRequest {
    fn none(timestamp_sec: f64) -> Self {
        Self {
            action_type: ActionType::None,
            timestamp_sec,
            reason: String::new(),
        }
    }
}

/// Anything that can turn a motion event into an action request — a
/// polymorphic seam mirroring the motion scorer's.
pub trait ActionPolicy {
    fn map(&self, event: &MotionEvent, mode: ActionMode) -> ActionRequest;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultActionPolicy;

impl ActionPolicy for DefaultActionPolicy {
    fn map(&self, event: &MotionEvent, mode: ActionMode) -> ActionRequest {
        if event.detection_state != DetectionState::Triggered {
            return ActionRequest::none(event.timestamp_sec);
        }
        let action_type = match mode {
            ActionMode::Lock => ActionType::LockScreen,
            ActionMode::Notify => ActionType::Notify,
            ActionMode::Soft => ActionType::Beep,
        };
        ActionRequest {
            action_type,
            timestamp_sec: event.timestamp_sec,
            reason: "triggered_motion".to_string(),
        }
    }
}

/// Rate-limits admitted action requests. Owns the lock-times history and
/// the lock cooldown deadline; bounded to `max_locks_per_minute + 1` entries
/// since stale entries are pruned before every admission check.
pub struct ActionSafetyController {
    config: DetectionConfig,
    lock_cooldown_until_sec: f64,
    lock_times: VecDeque<f64>,
}

impl ActionSafetyController {
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            config,
            lock_cooldown_until_sec: 0.0,
            lock_times: VecDeque::new(),
        }
    }

    pub fn set_config(&mut self, config: DetectionConfig) {
        self.config = config;
    }

    /// Returns whether `request` is admitted; rejected requests are the
    /// caller's responsibility to collapse to `None`.
    pub fn allow(&mut self, request: &ActionRequest, manual_disable: bool, now_sec: f64) -> bool {
        if manual_disable || request.action_type == ActionType::None {
            return false;
        }
        if now_sec * 1000.0 < self.config.arming_delay_ms as f64 {
            return false;
        }

        while let Some(&front) = self.lock_times.front() {
            if now_sec - front > 60.0 {
                self.lock_times.pop_front();
            } else {
                break;
            }
        }

        if request.action_type == ActionType::LockScreen {
            if now_sec < self.lock_cooldown_until_sec {
                return false;
            }
            if self.lock_times.len() >= self.config.max_locks_per_minute as usize {
                return false;
            }
            self.lock_times.push_back(now_sec);
            self.lock_cooldown_until_sec = now_sec + self.config.lock_cooldown_ms as f64 / 1000.0;
        }
        true
    }

    /// Applies the safety gate, returning the (possibly suppressed) request.
    pub fn gate(&mut self, request: ActionRequest, manual_disable: bool, now_sec: f64) -> ActionRequest {
        if self.allow(&request, manual_disable, now_sec) {
            request
        } else {
            ActionRequest::none(now_sec)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::CalibrationState;

    fn detection_config() -> DetectionConfig {
        DetectionConfig {
            trigger_threshold: 0.5,
            release_threshold: 0.3,
            debounce_ms: 0,
            cooldown_ms: 0,
            arming_delay_ms: 0,
            lock_cooldown_ms: 1000,
            max_locks_per_minute: 2,
        }
    }

    fn triggered_event(t: f64) -> MotionEvent {
        MotionEvent {
            detection_state: DetectionState::Triggered,
            calibration_state: CalibrationState::Armed,
            score: 0.9,
            confidence: 0.9,
            timestamp_sec: t,
        }
    }

    #[test]
    fn policy_maps_non_triggered_events_to_none() {
        let policy = DefaultActionPolicy;
        let event = MotionEvent {
            detection_state: DetectionState::Idle,
            calibration_state: CalibrationState::Armed,
            score: 0.1,
            confidence: 0.1,
            timestamp_sec: 1.0,
        };
        assert_eq!(policy.map(&event, ActionMode::Lock).action_type, ActionType::None);
    }

    #[test]
    fn policy_maps_triggered_to_mode_specific_action() {
        let policy = DefaultActionPolicy;
        let event = triggered_event(1.0);
        assert_eq!(policy.map(&event, ActionMode::Lock).action_type, ActionType::LockScreen);
        assert_eq!(policy.map(&event, ActionMode::Notify).action_type, ActionType::Notify);
        assert_eq!(policy.map(&event, ActionMode::Soft).action_type, ActionType::Beep);
    }

    #[test]
    fn anti_lock_loop_scenario() {
        // Offer LockScreen requests at t = 3.0, 3.1, 4.2, 4.3 with
        // lock_cooldown_ms=1000, max_locks_per_minute=2.
        // Expect admissions [true, false, true, false].
        let mut gate = ActionSafetyController::new(detection_config());
        let times = [3.0, 3.1, 4.2, 4.3];
        let expected = [true, false, true, false];
        for (t, exp) in times.iter().zip(expected.iter()) {
            let req = ActionRequest {
                action_type: ActionType::LockScreen,
                timestamp_sec: *t,
                reason: "triggered_motion".to_string(),
            };
            assert_eq!(gate.allow(&req, false, *t), *exp, "t={}", t);
        }
    }

    #[test]
    fn manual_disable_suppresses_everything() {
        let mut gate = ActionSafetyController::new(detection_config());
        let req = ActionRequest {
            action_type: ActionType::Beep,
            timestamp_sec: 5.0,
            reason: "triggered_motion".to_string(),
        };
        assert!(!gate.allow(&req, true, 5.0));
    }

    #[test]
    fn arming_delay_suppresses_early_actions() {
        let mut config = detection_config();
        config.arming_delay_ms = 2000;
        let mut gate = ActionSafetyController::new(config);
        let req = ActionRequest {
            action_type: ActionType::Beep,
            timestamp_sec: 1.0,
            reason: "triggered_motion".to_string(),
        };
        assert!(!gate.allow(&req, false, 1.0));
        let req_later = ActionRequest {
            action_type: ActionType::Beep,
            timestamp_sec: 2.5,
            reason: "triggered_motion".to_string(),
        };
        assert!(gate.allow(&req_later, false, 2.5));
    }
}
