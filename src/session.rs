//! Thin session state holder: the seam between the CLI and a concrete
//! `AudioBackend`. Owns no DSP state itself — construction, validation, and
//! the actual per-buffer loop all live in `SonarPipeline` and the backend.

use crate::backend::AudioBackend;
use crate::config::AppConfig;
use crate::error::CoreError;
use crate::pipeline::SonarPipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Stopped,
    Error,
}

/// Runs one backend session end to end, tracking coarse lifecycle state for
/// the CLI to report (`devices`, `run`, `calibrate` all go through this).
pub struct SessionController {
    state: SessionState,
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Validates `config`, builds a `SonarPipeline`, and runs it against
    /// `backend` until `should_stop` returns true or the backend's own
    /// duration bound is reached. Returns the pipeline so the caller can
    /// read final metrics and dump the event journal.
    pub fn run(
        &mut self,
        config: AppConfig,
        backend: &mut dyn AudioBackend,
        should_stop: &mut dyn FnMut() -> bool,
    ) -> Result<SonarPipeline, CoreError> {
        config.validate()?;
        self.state = SessionState::Running;

        let mut pipeline = SonarPipeline::begin_session(config.clone());
        match backend.run_session(&config, &mut pipeline, should_stop) {
            Ok(()) => {
                self.state = SessionState::Stopped;
                Ok(pipeline)
            }
            Err(err) => {
                self.state = SessionState::Error;
                Err(err)
            }
        }
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}
