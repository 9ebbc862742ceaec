/// Calibration controller state. Progresses `Init → Warmup → Calibrating →
/// Armed` and never goes backward within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationState {
    Init,
    Warmup,
    Calibrating,
    Armed,
}
