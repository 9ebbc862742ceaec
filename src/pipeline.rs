//! Orchestrates the DSP + detection + calibration + action-safety pipeline.
//! Strictly sequential, per-buffer, single-threaded: `process()` runs to
//! completion with no suspension points and no steady-state allocation.

use crate::action::{ActionSafetyController, DefaultActionPolicy, ActionPolicy};
use crate::baseline::BaselineTracker;
use crate::calibration::CalibrationController;
use crate::config::AppConfig;
use crate::detection::DetectionStateMachine;
use crate::dsp::{CarrierGenerator, FeatureExtractor};
use crate::journal::{EventJournal, EventRecord, DEFAULT_CAPACITY};
use crate::metrics::RuntimeMetrics;
use crate::scoring::{confidence, DefaultMotionScorer, MotionScorer};

pub struct SonarPipeline {
    config: AppConfig,
    carrier: CarrierGenerator,
    extractor: FeatureExtractor,
    baseline: BaselineTracker,
    scorer: Box<dyn MotionScorer + Send>,
    calibration: CalibrationController,
    detection: DetectionStateMachine,
    action_policy: Box<dyn ActionPolicy + Send>,
    safety: ActionSafetyController,
    journal: EventJournal,
    metrics: RuntimeMetrics,
    total_frames: usize,
}

impl SonarPipeline {
    /// Constructs all stateful filters, trackers, FSMs and the journal from
    /// an immutable config snapshot. Invalid configs (non-positive sample
    /// rate, zero frames-per-buffer) are rejected by the caller via
    /// `AppConfig::validate` before this is called — the core itself never
    /// fails mid-stream.
    pub fn begin_session(config: AppConfig) -> Self {
        let audio = config.audio;
        let dsp = config.dsp;
        let total_frames = if audio.duration_seconds > 0.0 {
            (audio.duration_seconds * audio.sample_rate_hz).round() as usize
        } else {
            0
        };

        Self {
            carrier: CarrierGenerator::new(audio.sample_rate_hz, audio.f0_hz),
            extractor: FeatureExtractor::new(
                audio.sample_rate_hz,
                audio.f0_hz,
                dsp.lp_cutoff_hz,
                dsp.doppler_band_low_hz,
                dsp.doppler_band_high_hz,
            ),
            baseline: BaselineTracker::new(dsp.baseline_alpha, dsp.baseline_motion_alpha),
            scorer: Box::new(DefaultMotionScorer),
            calibration: CalibrationController::new(config.calibration, config.detection),
            detection: DetectionStateMachine::new(config.detection),
            action_policy: Box::new(DefaultActionPolicy),
            safety: ActionSafetyController::new(config.detection),
            journal: EventJournal::new(DEFAULT_CAPACITY),
            metrics: RuntimeMetrics::new(audio.sample_rate_hz),
            total_frames,
            config,
        }
    }

    /// Preconditions: `input.len() == output.len()`. Postcondition: metrics,
    /// event, and action-request fields updated to reflect samples
    /// `[frame_offset, frame_offset+len)`.
    pub fn process(&mut self, input: &[f32], output: &mut [f32], frame_offset: usize) {
        debug_assert_eq!(input.len(), output.len());
        let len = input.len();

        self.carrier.generate(output, self.total_frames, frame_offset);

        let mut peak = 0.0f64;
        let mut sum = 0.0f64;
        let mut sum_sq = 0.0f64;
        for &sample in input {
            let x = sample as f64;
            peak = peak.max(x.abs());
            sum += x;
            sum_sq += x * x;
        }
        let n = len.max(1) as f64;
        let dc_level = sum / n;
        let rms_level = (sum_sq / n).sqrt();

        let mut features = self.extractor.process(input);

        let previous_detection_state = self.detection.state();
        let (baseline_energy, relative_motion) =
            self.baseline.update(features.doppler_band_energy, previous_detection_state);
        features.baseline_energy = baseline_energy;
        features.relative_motion = relative_motion;

        let score = self.scorer.score(&features);
        let conf = confidence(score);
        let timestamp_sec = (frame_offset + len) as f64 / self.config.audio.sample_rate_hz;

        self.calibration
            .update(timestamp_sec, relative_motion, &mut self.config.detection);
        self.detection.set_config(self.config.detection);
        self.safety.set_config(self.config.detection);

        let event = self
            .detection
            .update(score, conf, timestamp_sec, self.calibration.state());

        let request = self.action_policy.map(&event, self.config.actions.mode);
        let gated = self
            .safety
            .gate(request, self.config.actions.manual_disable, timestamp_sec);

        self.journal.push(EventRecord::new(
            timestamp_sec,
            event.detection_state,
            event.calibration_state,
            score,
            relative_motion,
            gated.action_type,
        ));

        self.metrics.frames_processed += len as u64;
        self.metrics.peak_level = peak;
        self.metrics.rms_level = rms_level;
        self.metrics.dc_level = dc_level;
        self.metrics.latest_features = Some(features);
        self.metrics.latest_event = Some(event);
        self.metrics.triggered_count = self.detection.triggered_count();
        self.metrics.latest_action = Some(gated);
    }

    pub fn metrics(&self) -> RuntimeMetrics {
        self.metrics.clone()
    }

    /// Current detection thresholds, possibly rewritten by calibration since
    /// `begin_session`.
    pub fn detection_config(&self) -> crate::config::DetectionConfig {
        self.config.detection
    }

    pub fn dump_events(&self, n: usize) -> String {
        self.journal.dump_json_array(n)
    }

    pub fn record_xruns(&mut self, xruns: u64) {
        self.metrics.xruns = xruns;
    }
}
