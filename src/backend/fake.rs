//! Deterministic, seedable synthetic audio source implementing the four
//! test scenarios (Static, Human, Pet, Vibration) used by the end-to-end
//! property tests. Always available; used by `sonarlock run --backend fake`
//! and by integration tests.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::backend::{AudioBackend, DeviceInfo};
use crate::config::{AppConfig, FakeScenario};
use crate::error::CoreError;
use crate::pipeline::SonarPipeline;

const TWO_PI: f64 = 2.0 * PI;

pub struct FakeAudioBackend {
    scenario: FakeScenario,
    seed: u64,
}

impl FakeAudioBackend {
    pub fn new(scenario: FakeScenario, seed: u64) -> Self {
        Self { scenario, seed }
    }
}

impl Default for FakeAudioBackend {
    fn default() -> Self {
        Self::new(FakeScenario::Static, 7)
    }
}

impl AudioBackend for FakeAudioBackend {
    fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>, CoreError> {
        Ok(vec![DeviceInfo {
            id: 0,
            name: "Fake Loopback Device".to_string(),
            max_input_channels: 1,
            max_output_channels: 1,
            default_sample_rate: 48_000.0,
        }])
    }

    fn run_session(
        &mut self,
        config: &AppConfig,
        pipeline: &mut SonarPipeline,
        should_stop: &mut dyn FnMut() -> bool,
    ) -> Result<(), CoreError> {
        let a = config.audio;
        if a.sample_rate_hz <= 0.0 || a.frames_per_buffer == 0 {
            return Err(CoreError::InvalidArgument {
                details: "invalid audio configuration".to_string(),
            });
        }

        let run_sec = if a.duration_seconds <= 0.0 {
            60.0
        } else {
            a.duration_seconds
        };
        let total_frames = (a.sample_rate_hz * run_sec) as usize;

        let mut input = vec![0.0f32; a.frames_per_buffer];
        let mut output = vec![0.0f32; a.frames_per_buffer];

        let seed = if config.seed == 0 { self.seed } else { config.seed };
        let mut rng = StdRng::seed_from_u64(seed);

        let human = config.scenario == FakeScenario::Human || self.scenario == FakeScenario::Human;
        let pet = config.scenario == FakeScenario::Pet || self.scenario == FakeScenario::Pet;
        let vibration =
            config.scenario == FakeScenario::Vibration || self.scenario == FakeScenario::Vibration;

        let mut offset = 0usize;
        let mut phase = 0.0f64;
        while offset < total_frames && !should_stop() {
            let frames = a.frames_per_buffer.min(total_frames - offset);
            for slot in input.iter_mut() {
                *slot = 0.0;
            }
            for i in 0..frames {
                let t = (offset + i) as f64 / a.sample_rate_hz;
                let freq = a.f0_hz;
                let mut amp = 0.25;
                let mut extra = 0.0;

                if human {
                    let gate = if t > 0.80 * run_sec && t < 0.98 * run_sec {
                        1.0
                    } else {
                        0.0
                    };
                    amp = 0.24;
                    extra = gate * 0.45 * (TWO_PI * (a.f0_hz + 120.0) * t).sin();
                } else if pet {
                    amp = 0.08 + 0.02 * (TWO_PI * 7.0 * t).sin();
                    let jitter: f64 = rng.gen_range(-1.0..1.0);
                    extra = 0.04 * (TWO_PI * (a.f0_hz + 25.0 + jitter) * t).sin();
                } else if vibration {
                    amp = 0.28 * (1.0 + 0.35 * (TWO_PI * 8.0 * t).sin());
                }

                phase += TWO_PI * freq / a.sample_rate_hz;
                if phase >= TWO_PI {
                    phase -= TWO_PI;
                }
                let noise: f64 = rng.gen_range(-0.01..0.01);
                input[i] = (amp * phase.sin() + extra + noise) as f32;
            }

            pipeline.process(&input[..frames], &mut output[..frames], offset);
            offset += frames;
        }

        pipeline.record_xruns(0);
        Ok(())
    }
}
