//! The audio-backend collaborator contract: device enumeration and a
//! blocking session loop that feeds the core one buffer at a time.

#[cfg(not(target_os = "android"))]
pub mod cpal_backend;
pub mod fake;

#[cfg(not(target_os = "android"))]
pub use cpal_backend::CpalAudioBackend;
pub use fake::FakeAudioBackend;

use crate::config::AppConfig;
use crate::error::CoreError;
use crate::pipeline::SonarPipeline;

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    pub id: i32,
    pub name: String,
    pub max_input_channels: i32,
    pub max_output_channels: i32,
    pub default_sample_rate: f64,
}

/// Guarantees mono float samples in `[-1, 1]` and in-order buffer delivery.
pub trait AudioBackend {
    fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>, CoreError>;

    /// Runs to completion or until `should_stop` returns true, calling
    /// `pipeline.process()` once per buffer in strict frame-order. Reports
    /// session-level failures; never propagates into the core.
    fn run_session(
        &mut self,
        config: &AppConfig,
        pipeline: &mut SonarPipeline,
        should_stop: &mut dyn FnMut() -> bool,
    ) -> Result<(), CoreError>;
}
