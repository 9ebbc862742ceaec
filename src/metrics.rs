//! Read-only session summary the host pulls at end-of-session (or
//! periodically). A value type: each read is a copy consistent with the
//! most recently completed buffer.

use crate::action::ActionRequest;
use crate::detection::MotionEvent;
use crate::dsp::MotionFeatures;

#[derive(Debug, Clone, Default)]
pub struct RuntimeMetrics {
    pub sample_rate_hz: f64,
    pub frames_processed: u64,
    pub peak_level: f64,
    pub rms_level: f64,
    pub dc_level: f64,
    pub latest_features: Option<MotionFeatures>,
    pub latest_event: Option<MotionEvent>,
    pub latest_action: Option<ActionRequest>,
    pub triggered_count: u64,
    /// Reported by the backend; always 0 for the fake backend.
    pub xruns: u64,
}

impl RuntimeMetrics {
    pub fn new(sample_rate_hz: f64) -> Self {
        Self {
            sample_rate_hz,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_metrics_start_at_zero() {
        let metrics = RuntimeMetrics::new(48_000.0);
        assert_eq!(metrics.sample_rate_hz, 48_000.0);
        assert_eq!(metrics.frames_processed, 0);
        assert_eq!(metrics.triggered_count, 0);
        assert!(metrics.latest_event.is_none());
    }
}
