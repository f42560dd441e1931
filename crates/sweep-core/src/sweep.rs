use crate::domain::{RunDescriptor, RunResult, SweepError, SweepResult};
use crate::executor::{self, ContainerConfig, DockerLauncher, RunLauncher};
use crate::grid::ParameterGrid;
use crate::naming::{DATA_SUBDIR, format_energy};
use crate::planner::{ConfigSink, DiskConfigSink, materialize_runs};
use crate::template::TemplateDocument;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::info;

pub const DIAGNOSTIC_PREVIEW_CHARS: usize = 240;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SweepConfig {
    pub work_dir: PathBuf,
    pub main_template: PathBuf,
    pub detector_template: PathBuf,
    pub grid: ParameterGrid,
    pub workers: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub container: ContainerConfig,
    pub report_path: Option<PathBuf>,
    pub show_progress: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            main_template: PathBuf::from("spacepix3_main.conf"),
            detector_template: PathBuf::from("spacepix3_detector.conf"),
            grid: ParameterGrid::default(),
            workers: None,
            timeout_secs: None,
            container: ContainerConfig::default(),
            report_path: None,
            show_progress: true,
        }
    }
}

impl SweepConfig {
    pub fn from_file(path: &Path) -> SweepResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| {
            SweepError::io_system(
                "IO.SWEEP_CONFIG_READ",
                format!(
                    "failed to read sweep definition '{}': {}",
                    path.display(),
                    source
                ),
            )
        })?;
        serde_json::from_str(&content).map_err(|source| {
            SweepError::input_validation(
                "INPUT.SWEEP_CONFIG_PARSE",
                format!(
                    "failed to parse sweep definition '{}': {}",
                    path.display(),
                    source
                ),
            )
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    fn resolved_template_path(&self, template: &Path) -> PathBuf {
        if template.is_absolute() {
            template.to_path_buf()
        } else {
            self.work_dir.join(template)
        }
    }
}

/// Loads both templates and materializes every run configuration through the
/// sink, without executing anything.
pub fn plan_sweep(
    config: &SweepConfig,
    sink: &mut dyn ConfigSink,
) -> SweepResult<Vec<RunDescriptor>> {
    let main_template =
        TemplateDocument::load(&config.resolved_template_path(&config.main_template))?;
    let detector_template =
        TemplateDocument::load(&config.resolved_template_path(&config.detector_template))?;
    let data_prefix = format!("{}/{}", config.container.workdir, DATA_SUBDIR);
    materialize_runs(
        &config.grid,
        &main_template,
        &detector_template,
        &data_prefix,
        sink,
    )
}

pub fn run_sweep(config: &SweepConfig) -> SweepResult<SweepReport> {
    let host_dir = fs::canonicalize(&config.work_dir).map_err(|source| {
        SweepError::io_system(
            "IO.WORK_DIR",
            format!(
                "failed to resolve working directory '{}': {}",
                config.work_dir.display(),
                source
            ),
        )
    })?;
    let launcher = DockerLauncher::new(config.container.clone(), host_dir, config.timeout());
    run_sweep_with_launcher(config, &launcher)
}

pub fn run_sweep_with_launcher(
    config: &SweepConfig,
    launcher: &dyn RunLauncher,
) -> SweepResult<SweepReport> {
    let workers = resolve_worker_count(config)?;

    let data_dir = config.work_dir.join(DATA_SUBDIR);
    fs::create_dir_all(&data_dir).map_err(|source| {
        SweepError::io_system(
            "IO.DATA_DIRECTORY",
            format!(
                "failed to create output directory '{}': {}",
                data_dir.display(),
                source
            ),
        )
    })?;

    let mut sink = DiskConfigSink::new(&config.work_dir);
    let descriptors = plan_sweep(config, &mut sink)?;
    info!(
        "launching {} simulation runs on {} workers",
        descriptors.len(),
        workers
    );

    let results = executor::execute_runs(&descriptors, launcher, workers, config.show_progress)?;
    let report = build_report(&descriptors, &results, workers);

    if let Some(report_path) = &config.report_path {
        write_report_file(report_path, &report)?;
    }
    Ok(report)
}

fn resolve_worker_count(config: &SweepConfig) -> SweepResult<usize> {
    match config.workers {
        Some(0) => Err(SweepError::input_validation(
            "INPUT.WORKER_COUNT",
            "worker count must be at least 1",
        )),
        Some(count) => Ok(count),
        None => Ok(executor::default_worker_count()),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub generated_at_unix_seconds: u64,
    pub passed: bool,
    pub total_runs: usize,
    pub succeeded_runs: usize,
    pub failed_runs: usize,
    pub workers: usize,
    pub failures: Vec<RunFailureReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunFailureReport {
    pub run_id: usize,
    pub exit_code: i32,
    pub energy: String,
    pub particle_type: String,
    pub orientation: String,
    pub main_config: String,
    pub diagnostic: String,
}

pub fn build_report(
    descriptors: &[RunDescriptor],
    results: &[RunResult],
    workers: usize,
) -> SweepReport {
    let mut failures = Vec::new();
    for result in results {
        if result.succeeded() {
            continue;
        }
        let descriptor = descriptors
            .iter()
            .find(|descriptor| descriptor.run_id == result.run_id);
        failures.push(RunFailureReport {
            run_id: result.run_id,
            exit_code: result.exit_code,
            energy: descriptor
                .map(|descriptor| format_energy(descriptor.point.energy_gev))
                .unwrap_or_default(),
            particle_type: descriptor
                .map(|descriptor| descriptor.point.particle_type.clone())
                .unwrap_or_default(),
            orientation: descriptor
                .map(|descriptor| descriptor.point.orientation.clone())
                .unwrap_or_default(),
            main_config: descriptor
                .map(|descriptor| descriptor.main_config.display().to_string())
                .unwrap_or_default(),
            diagnostic: diagnostic_preview(&result.diagnostic),
        });
    }

    let total_runs = results.len();
    let failed_runs = failures.len();
    SweepReport {
        generated_at_unix_seconds: current_unix_timestamp_seconds(),
        passed: failed_runs == 0,
        total_runs,
        succeeded_runs: total_runs.saturating_sub(failed_runs),
        failed_runs,
        workers,
        failures,
    }
}

pub fn diagnostic_preview(diagnostic: &str) -> String {
    let trimmed = diagnostic.trim_end();
    match trimmed.char_indices().nth(DIAGNOSTIC_PREVIEW_CHARS) {
        Some((index, _)) => format!("{}...", &trimmed[..index]),
        None => trimmed.to_string(),
    }
}

pub fn render_human_summary(report: &SweepReport) -> String {
    let mut lines = Vec::new();
    let status = if report.passed { "PASS" } else { "FAIL" };
    lines.push(format!("Sweep status: {}", status));
    lines.push(format!(
        "Runs: {} total ({} succeeded, {} failed)",
        report.total_runs, report.succeeded_runs, report.failed_runs
    ));
    for failure in &report.failures {
        lines.push(format!(
            "Run {} failed (exit code {}): energy={} GeV, particle={}, orientation={}",
            failure.run_id,
            failure.exit_code,
            failure.energy,
            failure.particle_type,
            failure.orientation
        ));
        if !failure.diagnostic.is_empty() {
            lines.push(format!("  {}", failure.diagnostic));
        }
    }
    lines.join("\n")
}

fn write_report_file(report_path: &Path, report: &SweepReport) -> SweepResult<()> {
    if let Some(parent) = report_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| {
                SweepError::io_system(
                    "IO.REPORT_DIRECTORY",
                    format!(
                        "failed to create report directory '{}': {}",
                        parent.display(),
                        source
                    ),
                )
            })?;
        }
    }
    let rendered = serde_json::to_string_pretty(report).map_err(|source| {
        SweepError::internal(
            "SYS.REPORT_SERIALIZE",
            format!("failed to serialize sweep report: {}", source),
        )
    })?;
    fs::write(report_path, rendered).map_err(|source| {
        SweepError::io_system(
            "IO.REPORT_WRITE",
            format!(
                "failed to write sweep report '{}': {}",
                report_path.display(),
                source
            ),
        )
    })
}

fn current_unix_timestamp_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs())
}
