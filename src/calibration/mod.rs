//! Learns `trigger_threshold`/`release_threshold` from the empirical
//! distribution of `relative_motion` during a warm-up + calibrate window,
//! using median + MAD (median absolute deviation) statistics that tolerate
//! occasional large spikes without inflating the thresholds.

pub mod procedure;
pub mod state;

pub use procedure::{AutoTuner, CalibrationController};
pub use state::CalibrationState;
