//! Idle → Observing → Triggered → Cooldown detection automaton, with
//! debounce on entry and hysteresis against flicker between Idle/Observing.

use crate::calibration::CalibrationState;
use crate::config::DetectionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionState {
    Idle,
    Observing,
    Triggered,
    Cooldown,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionEvent {
    pub detection_state: DetectionState,
    pub calibration_state: CalibrationState,
    pub score: f64,
    pub confidence: f64,
    pub timestamp_sec: f64,
}

pub struct DetectionStateMachine {
    config: DetectionConfig,
    state: DetectionState,
    observe_since_sec: Option<f64>,
    cooldown_until_sec: f64,
    triggered_count: u64,
}

impl DetectionStateMachine {
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            config,
            state: DetectionState::Idle,
            observe_since_sec: None,
            cooldown_until_sec: 0.0,
            triggered_count: 0,
        }
    }

    pub fn state(&self) -> DetectionState {
        self.state
    }

    pub fn triggered_count(&self) -> u64 {
        self.triggered_count
    }

    pub fn set_config(&mut self, config: DetectionConfig) {
        self.config = config;
    }

    pub fn update(
        &mut self,
        score: f64,
        confidence: f64,
        timestamp_sec: f64,
        calibration_state: CalibrationState,
    ) -> MotionEvent {
        if calibration_state != CalibrationState::Armed {
            self.state = DetectionState::Idle;
            return self.event(score, confidence, timestamp_sec, calibration_state);
        }

        if self.state == DetectionState::Cooldown && timestamp_sec >= self.cooldown_until_sec {
            self.state = DetectionState::Idle;
        }

        match self.state {
            DetectionState::Idle => {
                if score >= self.config.release_threshold {
                    self.state = DetectionState::Observing;
                    self.observe_since_sec = Some(timestamp_sec);
                }
            }
            DetectionState::Observing => {
                if score < self.config.release_threshold {
                    self.state = DetectionState::Idle;
                    self.observe_since_sec = None;
                } else if score >= self.config.trigger_threshold {
                    let since = self.observe_since_sec.unwrap_or(timestamp_sec);
                    if (timestamp_sec - since) * 1000.0 >= self.config.debounce_ms as f64 {
                        self.state = DetectionState::Triggered;
                        self.triggered_count += 1;
                    }
                }
            }
            DetectionState::Triggered => {
                self.state = DetectionState::Cooldown;
                self.cooldown_until_sec = timestamp_sec + self.config.cooldown_ms as f64 / 1000.0;
            }
            DetectionState::Cooldown => {}
        }

        self.event(score, confidence, timestamp_sec, calibration_state)
    }

    fn event(
        &self,
        score: f64,
        confidence: f64,
        timestamp_sec: f64,
        calibration_state: CalibrationState,
    ) -> MotionEvent {
        MotionEvent {
            detection_state: self.state,
            calibration_state,
            score,
            confidence,
            timestamp_sec,
        }
    }
}
