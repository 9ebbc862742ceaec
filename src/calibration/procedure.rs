use crate::calibration::state::CalibrationState;
use crate::config::{CalibrationConfig, DetectionConfig};

/// Robust median+MAD threshold learner. Median and MAD are the middle
/// element of the sorted sample (and sorted deviation) vectors — no
/// averaging of the two middle elements on even-length input, matching the
/// reference behaviour this is ported from.
pub struct AutoTuner {
    config: CalibrationConfig,
    samples: Vec<f64>,
}

impl AutoTuner {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            samples: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }

    pub fn add_sample(&mut self, relative_motion: f64) {
        self.samples.push(relative_motion);
    }

    pub fn ready(&self, min_samples: usize) -> bool {
        self.samples.len() >= min_samples
    }

    /// Computes trigger/release thresholds from the collected samples and
    /// writes them into `detection`. No-op if no samples were collected.
    pub fn apply(&self, detection: &mut DetectionConfig) {
        if self.samples.is_empty() {
            return;
        }
        let mut sorted = self.samples.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let median = sorted[sorted.len() / 2];

        let mut deviations: Vec<f64> = sorted.iter().map(|x| (x - median).abs()).collect();
        deviations.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let mad = deviations[deviations.len() / 2] + 1e-6;

        let trigger = (median + self.config.trigger_k * mad)
            .clamp(self.config.min_threshold, self.config.max_threshold);
        let release = (median + self.config.release_k * mad)
            .clamp(self.config.min_threshold * 0.5, trigger * 0.95);

        detection.trigger_threshold = trigger;
        detection.release_threshold = release;
    }
}

/// Drives the calibration state machine and rewrites the detection config's
/// thresholds once enough samples have been observed.
pub struct CalibrationController {
    config: CalibrationConfig,
    default_detection: DetectionConfig,
    tuner: AutoTuner,
    state: CalibrationState,
}

impl CalibrationController {
    pub fn new(config: CalibrationConfig, default_detection: DetectionConfig) -> Self {
        Self {
            tuner: AutoTuner::new(config),
            config,
            default_detection,
            state: CalibrationState::Init,
        }
    }

    pub fn reset(&mut self) {
        self.state = CalibrationState::Init;
        self.tuner.reset();
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    /// Advances the calibration state machine for one buffer and, when the
    /// calibration window closes, rewrites `detection` in place (starting
    /// from the session's default detection config, per the original
    /// behaviour of resetting non-threshold fields before applying the
    /// learned thresholds).
    pub fn update(&mut self, timestamp_sec: f64, relative_motion: f64, detection: &mut DetectionConfig) {
        if !self.config.enabled {
            self.state = CalibrationState::Armed;
            return;
        }

        if self.state == CalibrationState::Init {
            self.state = CalibrationState::Warmup;
        }
        if self.state == CalibrationState::Warmup && timestamp_sec >= self.config.warmup_seconds {
            self.state = CalibrationState::Calibrating;
        }
        if self.state == CalibrationState::Calibrating {
            self.tuner.add_sample(relative_motion);
            if timestamp_sec >= self.config.warmup_seconds + self.config.calibrate_seconds
                && self.tuner.ready(64)
            {
                *detection = self.default_detection;
                self.tuner.apply(detection);
                self.state = CalibrationState::Armed;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cal_config(enabled: bool) -> CalibrationConfig {
        CalibrationConfig {
            enabled,
            warmup_seconds: 0.2,
            calibrate_seconds: 0.4,
            trigger_k: 6.0,
            release_k: 4.0,
            min_threshold: 0.20,
            max_threshold: 0.95,
        }
    }

    #[test]
    fn disabled_calibration_jumps_to_armed_immediately() {
        let mut controller = CalibrationController::new(cal_config(false), DetectionConfig::default());
        let mut detection = DetectionConfig::default();
        controller.update(0.0, 0.0, &mut detection);
        assert_eq!(controller.state(), CalibrationState::Armed);
    }

    #[test]
    fn progresses_through_states_in_order() {
        let mut controller = CalibrationController::new(cal_config(true), DetectionConfig::default());
        let mut detection = DetectionConfig::default();

        controller.update(0.0, 0.02, &mut detection);
        assert_eq!(controller.state(), CalibrationState::Warmup);

        controller.update(0.1, 0.02, &mut detection);
        assert_eq!(controller.state(), CalibrationState::Warmup);

        controller.update(0.25, 0.02, &mut detection);
        assert_eq!(controller.state(), CalibrationState::Calibrating);
    }

    #[test]
    fn converges_to_armed_with_enough_samples() {
        let mut controller = CalibrationController::new(cal_config(true), DetectionConfig::default());
        let mut detection = DetectionConfig::default();
        let dt = 0.005;
        let mut t = 0.0;
        for k in 0..200 {
            let jitter = if k % 2 == 0 { 0.001 } else { -0.001 };
            controller.update(t, 0.02 + jitter, &mut detection);
            t += dt;
        }
        assert_eq!(controller.state(), CalibrationState::Armed);
        assert!(detection.trigger_threshold >= cal_config(true).min_threshold);
        assert!(detection.trigger_threshold <= cal_config(true).max_threshold);
        assert!(detection.release_threshold < detection.trigger_threshold);
    }

    #[test]
    fn auto_tuner_uses_median_not_average_on_even_length() {
        let config = cal_config(true);
        let mut tuner = AutoTuner::new(config);
        for x in [1.0, 2.0, 3.0, 100.0] {
            tuner.add_sample(x);
        }
        let mut detection = DetectionConfig::default();
        tuner.apply(&mut detection);
        // sorted: [1,2,3,100], middle index len/2=2 -> median element is 3.0
        // (not the average of 2 and 3), so trigger should clamp toward max
        // since median=3 plus a large MAD term saturates the clamp.
        assert!(detection.trigger_threshold <= config.max_threshold);
    }

    #[test]
    fn release_never_exceeds_ninety_five_percent_of_trigger() {
        let config = cal_config(true);
        let mut tuner = AutoTuner::new(config);
        for _ in 0..100 {
            tuner.add_sample(0.3);
        }
        let mut detection = DetectionConfig::default();
        tuner.apply(&mut detection);
        assert!(detection.release_threshold <= detection.trigger_threshold * 0.95 + 1e-9);
    }
}
