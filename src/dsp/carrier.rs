//! Outbound-tone generator with linear fade-in/fade-out envelopes.

use std::f64::consts::PI;

const TWO_PI: f64 = 2.0 * PI;

/// Generates the outbound carrier tone into a caller-supplied buffer, with a
/// 20 ms linear fade at session start and (for bounded sessions) at session
/// end.
#[derive(Debug, Clone)]
pub struct CarrierGenerator {
    sample_rate_hz: f64,
    frequency_hz: f64,
    fade_samples: usize,
    phase: f64,
}

impl CarrierGenerator {
    pub fn new(sample_rate_hz: f64, frequency_hz: f64) -> Self {
        let fade_samples = (0.020 * sample_rate_hz).round() as usize;
        Self {
            sample_rate_hz,
            frequency_hz,
            fade_samples,
            phase: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Fills `out` with `out.len()` samples starting at `frame_offset`.
    /// `total_frames == 0` means an unbounded session: the tail fade is
    /// skipped entirely.
    pub fn generate(&mut self, out: &mut [f32], total_frames: usize, frame_offset: usize) {
        let phase_inc = TWO_PI * self.frequency_hz / self.sample_rate_hz;
        for (i, sample) in out.iter_mut().enumerate() {
            let absolute_frame = frame_offset + i;
            let mut env = 1.0;
            if self.fade_samples > 0 {
                if absolute_frame < self.fade_samples {
                    env = absolute_frame as f64 / self.fade_samples as f64;
                }
                if total_frames > 0 {
                    let remaining = total_frames.saturating_sub(absolute_frame);
                    if remaining < self.fade_samples {
                        env = env.min(remaining as f64 / self.fade_samples as f64);
                    }
                }
            }
            *sample = (self.phase.sin() * env) as f32;
            self.phase += phase_inc;
            if self.phase >= TWO_PI {
                self.phase -= TWO_PI;
            }
        }
    }
}
