// SonarLock core - real-time DSP, detection and calibration pipeline
//
// The core (dsp, baseline, scoring, calibration, detection, action, journal,
// metrics, pipeline) is synchronous and single-threaded: `process()` runs to
// completion on every buffer with no suspension points. Everything in
// `backend`, `platform`, `session` and `config` is a collaborator the host
// binary wires together; see `src/bin/sonarlock.rs`.

pub mod action;
pub mod backend;
pub mod baseline;
pub mod calibration;
pub mod config;
pub mod detection;
pub mod dsp;
pub mod error;
pub mod journal;
pub mod metrics;
pub mod pipeline;
pub mod platform;
pub mod scoring;
pub mod session;

pub fn init_logging() {
    let _ = env_logger::try_init();
}
