//! Configuration management for the sonar pipeline and its collaborators.
//!
//! Loads from a JSON file, falling back to defaults (with a warning) when the
//! file is missing or malformed, matching the teacher's `AppConfig::load*`
//! pattern.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub audio: AudioConfig,
    pub dsp: DspConfig,
    pub calibration: CalibrationConfig,
    pub detection: DetectionConfig,
    pub actions: ActionsConfig,
    pub logging: LoggingConfig,
    /// Seed for the fake backend's deterministic noise/jitter generation.
    pub seed: u64,
    /// Scenario the fake backend synthesizes when no real device is used.
    pub scenario: FakeScenario,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    pub sample_rate_hz: f64,
    pub frames_per_buffer: usize,
    /// 0 means an unbounded session.
    pub duration_seconds: f64,
    pub f0_hz: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 48_000.0,
            frames_per_buffer: 256,
            duration_seconds: 0.0,
            f0_hz: 19_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DspConfig {
    pub lp_cutoff_hz: f64,
    pub doppler_band_low_hz: f64,
    pub doppler_band_high_hz: f64,
    pub baseline_alpha: f64,
    pub baseline_motion_alpha: f64,
}

impl Default for DspConfig {
    fn default() -> Self {
        Self {
            lp_cutoff_hz: 500.0,
            doppler_band_low_hz: 20.0,
            doppler_band_high_hz: 200.0,
            baseline_alpha: 0.004,
            baseline_motion_alpha: 0.0004,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    pub enabled: bool,
    pub warmup_seconds: f64,
    pub calibrate_seconds: f64,
    pub trigger_k: f64,
    pub release_k: f64,
    pub min_threshold: f64,
    pub max_threshold: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            warmup_seconds: 2.0,
            calibrate_seconds: 6.0,
            trigger_k: 6.0,
            release_k: 4.0,
            min_threshold: 0.20,
            max_threshold: 0.95,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    pub trigger_threshold: f64,
    pub release_threshold: f64,
    pub debounce_ms: u32,
    pub cooldown_ms: u32,
    pub arming_delay_ms: u32,
    pub lock_cooldown_ms: u32,
    pub max_locks_per_minute: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            trigger_threshold: 0.52,
            release_threshold: 0.38,
            debounce_ms: 300,
            cooldown_ms: 3000,
            arming_delay_ms: 2000,
            lock_cooldown_ms: 30_000,
            max_locks_per_minute: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionMode {
    Soft,
    Lock,
    Notify,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionsConfig {
    pub mode: ActionMode,
    pub manual_disable: bool,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            mode: ActionMode::Soft,
            manual_disable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Scenario synthesized by the fake audio backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FakeScenario {
    Static,
    Human,
    Pet,
    Vibration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            audio: AudioConfig::default(),
            dsp: DspConfig::default(),
            calibration: CalibrationConfig::default(),
            detection: DetectionConfig::default(),
            actions: ActionsConfig::default(),
            logging: LoggingConfig::default(),
            seed: 7,
            scenario: FakeScenario::Static,
        }
    }
}

/// `~/.config/sonarlock/config.json` on Unix, `%APPDATA%\sonarlock\config.json`
/// on Windows; falls back to `./sonarlock.json` if no home directory can be
/// resolved.
pub static DEFAULT_CONFIG_PATH: Lazy<PathBuf> = Lazy::new(default_config_path);

fn default_config_path() -> PathBuf {
    if let Some(dir) = dirs_config_dir() {
        dir.join("sonarlock").join("config.json")
    } else {
        PathBuf::from("sonarlock.json")
    }
}

#[cfg(windows)]
fn dirs_config_dir() -> Option<PathBuf> {
    std::env::var_os("APPDATA").map(PathBuf::from)
}

#[cfg(not(windows))]
fn dirs_config_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
}

impl AppConfig {
    /// Load configuration from a JSON file, falling back to `Default` (with a
    /// logged warning) if the file is missing or malformed.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load from the platform-default config path.
    pub fn load() -> Self {
        Self::load_from_file(DEFAULT_CONFIG_PATH.as_path())
    }

    /// Validate the core's pre-session invariants (spec §4.10): non-positive
    /// sample rate or zero `frames_per_buffer` must be rejected before a
    /// session starts.
    pub fn validate(&self) -> Result<(), crate::error::CoreError> {
        if self.audio.sample_rate_hz <= 0.0 {
            return Err(crate::error::CoreError::InvalidArgument {
                details: format!("sample_rate_hz must be > 0, got {}", self.audio.sample_rate_hz),
            });
        }
        if self.audio.frames_per_buffer == 0 {
            return Err(crate::error::CoreError::InvalidArgument {
                details: "frames_per_buffer must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_spec_values() {
        let config = AppConfig::default();
        assert_eq!(config.audio.sample_rate_hz, 48_000.0);
        assert_eq!(config.audio.frames_per_buffer, 256);
        assert_eq!(config.audio.f0_hz, 19_000.0);
        assert_eq!(config.dsp.lp_cutoff_hz, 500.0);
        assert_eq!(config.calibration.warmup_seconds, 2.0);
        assert_eq!(config.detection.trigger_threshold, 0.52);
        assert_eq!(config.detection.release_threshold, 0.38);
        assert_eq!(config.actions.mode, ActionMode::Soft);
    }

    #[test]
    fn json_roundtrip_preserves_values() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.detection.trigger_threshold, config.detection.trigger_threshold);
        assert_eq!(parsed.seed, config.seed);
    }

    #[test]
    fn validate_rejects_non_positive_sample_rate() {
        let mut config = AppConfig::default();
        config.audio.sample_rate_hz = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_frames_per_buffer() {
        let mut config = AppConfig::default();
        config.audio.frames_per_buffer = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from_file("/nonexistent/path/sonarlock.json");
        assert_eq!(config.audio.sample_rate_hz, AppConfig::default().audio.sample_rate_hz);
    }
}
