//! Command-line entry point: device enumeration, running a session against
//! the fake or real backend, standalone calibration, and dumping the event
//! journal.

use std::fs::File;
use std::io::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use sonarlock::action::ActionType;
use sonarlock::backend::{AudioBackend, CpalAudioBackend, FakeAudioBackend};
use sonarlock::config::{AppConfig, FakeScenario};
use sonarlock::error::log_core_error;
use sonarlock::platform::{PlatformActionExecutor, SystemCommandRunner};
use sonarlock::session::SessionController;

#[derive(Parser)]
#[command(name = "sonarlock", about = "Active-sonar presence detection daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List audio devices visible to the real backend.
    Devices,
    /// Run a detection session.
    Run {
        #[arg(long, value_enum, default_value_t = BackendKind::Fake)]
        backend: BackendKind,
        #[arg(long, value_enum, default_value_t = ScenarioArg::Static)]
        scenario: ScenarioArg,
        #[arg(long)]
        duration: Option<f64>,
        #[arg(long)]
        config: Option<std::path::PathBuf>,
        #[arg(long)]
        csv: Option<std::path::PathBuf>,
    },
    /// Run calibration only, then report the tuned thresholds.
    Calibrate {
        #[arg(long)]
        config: Option<std::path::PathBuf>,
    },
    /// Print the last N events from the most recent session's journal dump.
    DumpEvents {
        #[arg(long, default_value_t = 50)]
        count: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendKind {
    Fake,
    Cpal,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScenarioArg {
    Static,
    Human,
    Pet,
    Vibration,
}

impl From<ScenarioArg> for FakeScenario {
    fn from(value: ScenarioArg) -> Self {
        match value {
            ScenarioArg::Static => FakeScenario::Static,
            ScenarioArg::Human => FakeScenario::Human,
            ScenarioArg::Pet => FakeScenario::Pet,
            ScenarioArg::Vibration => FakeScenario::Vibration,
        }
    }
}

const EVENTS_DUMP_PATH: &str = "sonarlock_events.json";

fn main() -> Result<()> {
    sonarlock::init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Devices => run_devices(),
        Command::Run {
            backend,
            scenario,
            duration,
            config,
            csv,
        } => run_session(backend, scenario, duration, config, csv),
        Command::Calibrate { config } => run_calibrate(config),
        Command::DumpEvents { count } => run_dump_events(count),
    }
}

fn load_config(path: Option<std::path::PathBuf>) -> AppConfig {
    match path {
        Some(p) => AppConfig::load_from_file(p),
        None => AppConfig::load(),
    }
}

fn run_devices() -> Result<()> {
    let backend = CpalAudioBackend::new();
    match backend.enumerate_devices() {
        Ok(devices) => {
            for device in devices {
                println!(
                    "[{}] {} (in={}, out={}, rate={}Hz)",
                    device.id,
                    device.name,
                    device.max_input_channels,
                    device.max_output_channels,
                    device.default_sample_rate
                );
            }
            Ok(())
        }
        Err(err) => {
            log_core_error(&err, "devices");
            Err(anyhow::anyhow!(err.to_string()))
        }
    }
}

fn install_ctrlc_handler() -> Arc<AtomicBool> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    }) {
        log::warn!("failed to install Ctrl-C handler: {}", err);
    }
    stop
}

fn run_session(
    backend_kind: BackendKind,
    scenario: ScenarioArg,
    duration: Option<f64>,
    config_path: Option<std::path::PathBuf>,
    csv_path: Option<std::path::PathBuf>,
) -> Result<()> {
    let mut config = load_config(config_path);
    if let Some(d) = duration {
        config.audio.duration_seconds = d;
    }
    config.scenario = scenario.into();

    let stop = install_ctrlc_handler();
    let mut session = SessionController::new();

    let pipeline = match backend_kind {
        BackendKind::Fake => {
            let mut backend = FakeAudioBackend::new(config.scenario, config.seed);
            session
                .run(config.clone(), &mut backend, &mut || {
                    stop.load(Ordering::SeqCst)
                })
                .context("session failed")?
        }
        BackendKind::Cpal => {
            let mut backend = CpalAudioBackend::new();
            session
                .run(config.clone(), &mut backend, &mut || {
                    stop.load(Ordering::SeqCst)
                })
                .context("session failed")?
        }
    };

    let metrics = pipeline.metrics();
    println!(
        "frames={} triggered={} xruns={} peak={:.3} rms={:.3}",
        metrics.frames_processed, metrics.triggered_count, metrics.xruns, metrics.peak_level, metrics.rms_level
    );

    if let Some(action) = &metrics.latest_action {
        if action.action_type != ActionType::None {
            let executor = PlatformActionExecutor::new(SystemCommandRunner);
            let result = executor.execute(action);
            log::info!(
                "executed action {:?}: ok={} detail={}",
                action.action_type,
                result.ok,
                result.detail
            );
        }
    }

    if let Some(path) = csv_path {
        write_csv(&path, &pipeline)?;
    }

    std::fs::write(EVENTS_DUMP_PATH, pipeline.dump_events(usize::MAX))
        .with_context(|| format!("writing {}", EVENTS_DUMP_PATH))?;

    Ok(())
}

fn write_csv(path: &std::path::Path, pipeline: &sonarlock::pipeline::SonarPipeline) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("creating {:?}", path))?;
    writeln!(file, "timestamp,state,score,confidence,relative_motion,baseline,doppler,snr")?;

    let dump = pipeline.dump_events(usize::MAX);
    let records: Vec<serde_json::Value> = serde_json::from_str(&dump).unwrap_or_default();
    for record in records {
        writeln!(
            file,
            "{},{},{},,{},,,",
            record["t"], record["state"], record["score"], record["rel"]
        )?;
    }
    Ok(())
}

fn run_calibrate(config_path: Option<std::path::PathBuf>) -> Result<()> {
    let mut config = load_config(config_path);
    config.calibration.enabled = true;
    config.audio.duration_seconds = config.calibration.warmup_seconds + config.calibration.calibrate_seconds + 1.0;
    config.scenario = FakeScenario::Static;
    config.actions.manual_disable = true;

    let mut backend = FakeAudioBackend::new(config.scenario, config.seed);
    let mut session = SessionController::new();
    let pipeline = session
        .run(config, &mut backend, &mut || false)
        .context("calibration session failed")?;

    let metrics = pipeline.metrics();
    if let Some(event) = metrics.latest_event {
        println!("calibration_state={:?}", event.calibration_state);
    }
    let detection = pipeline.detection_config();
    println!(
        "recommended_trigger={:.4} recommended_release={:.4}",
        detection.trigger_threshold, detection.release_threshold
    );
    println!("frames_processed={}", metrics.frames_processed);
    Ok(())
}

fn run_dump_events(count: usize) -> Result<()> {
    let contents = std::fs::read_to_string(EVENTS_DUMP_PATH)
        .with_context(|| format!("reading {}", EVENTS_DUMP_PATH))?;
    let records: Vec<serde_json::Value> = serde_json::from_str(&contents).unwrap_or_default();
    let start = records.len().saturating_sub(count);
    for record in &records[start..] {
        println!("{}", record);
    }
    Ok(())
}
