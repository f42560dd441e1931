use super::CliError;
use super::helpers::{load_sweep_definition, write_plan_listing};
use clap::Args;
use std::path::PathBuf;
use sweep_core::naming::{
    artifact_names, format_energy, orientation_angles, parse_output_data_name,
};
use sweep_core::planner::{DiskConfigSink, MemoryConfigSink};
use sweep_core::sweep::{SweepConfig, plan_sweep, render_human_summary, run_sweep};

#[derive(Debug, Args)]
pub(super) struct SweepSourceFlags {
    /// Sweep definition JSON file
    #[arg(long)]
    sweep: Option<PathBuf>,
    /// Directory holding the templates and generated configs
    #[arg(long)]
    work_dir: Option<PathBuf>,
    /// Main simulation template file name
    #[arg(long)]
    main_template: Option<PathBuf>,
    /// Detector template file name
    #[arg(long)]
    detector_template: Option<PathBuf>,
}

impl SweepSourceFlags {
    fn into_config(self) -> Result<SweepConfig, CliError> {
        let mut config = match &self.sweep {
            Some(path) => load_sweep_definition(path)?,
            None => SweepConfig::default(),
        };
        if let Some(work_dir) = self.work_dir {
            config.work_dir = work_dir;
        }
        if let Some(main_template) = self.main_template {
            config.main_template = main_template;
        }
        if let Some(detector_template) = self.detector_template {
            config.detector_template = detector_template;
        }
        Ok(config)
    }
}

#[derive(Debug, Args)]
pub(super) struct RunArgs {
    #[command(flatten)]
    source: SweepSourceFlags,
    /// Number of parallel simulation workers (defaults to available cores)
    #[arg(long)]
    workers: Option<usize>,
    /// Kill any run that exceeds this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Container runtime executable
    #[arg(long)]
    runtime: Option<String>,
    /// Simulator container image
    #[arg(long)]
    image: Option<String>,
    /// Write a JSON sweep report to this path
    #[arg(long)]
    report: Option<PathBuf>,
    /// Suppress the progress bar
    #[arg(long)]
    no_progress: bool,
}

impl RunArgs {
    fn into_config(self) -> Result<SweepConfig, CliError> {
        let mut config = self.source.into_config()?;
        if let Some(workers) = self.workers {
            config.workers = Some(workers);
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout_secs = Some(timeout_secs);
        }
        if let Some(runtime) = self.runtime {
            config.container.runtime = runtime;
        }
        if let Some(image) = self.image {
            config.container.image = image;
        }
        if let Some(report) = self.report {
            config.report_path = Some(report);
        }
        if self.no_progress {
            config.show_progress = false;
        }
        Ok(config)
    }
}

#[derive(Debug, Args)]
pub(super) struct PlanArgs {
    #[command(flatten)]
    source: SweepSourceFlags,
    /// List the planned runs without writing any configuration files
    #[arg(long)]
    skip_write: bool,
    /// Write a JSON plan listing to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub(super) struct IdentifyArgs {
    /// Output data file name, e.g. data_auto_5_0_proton_0deg_0deg_0deg.root
    file_name: String,
}

pub(super) fn run_sweep_command(args: RunArgs) -> Result<i32, CliError> {
    let config = args.into_config()?;
    let report = run_sweep(&config).map_err(CliError::Sweep)?;
    println!("{}", render_human_summary(&report));
    if let Some(report_path) = &config.report_path {
        println!("JSON report: {}", report_path.display());
    }
    if report.passed { Ok(0) } else { Ok(1) }
}

pub(super) fn run_plan_command(args: PlanArgs) -> Result<i32, CliError> {
    let PlanArgs {
        source,
        skip_write,
        report,
    } = args;
    let config = source.into_config()?;

    let descriptors = if skip_write {
        plan_sweep(&config, &mut MemoryConfigSink::default()).map_err(CliError::Sweep)?
    } else {
        plan_sweep(&config, &mut DiskConfigSink::new(&config.work_dir)).map_err(CliError::Sweep)?
    };

    println!(
        "Planned {} runs in '{}'.",
        descriptors.len(),
        config.work_dir.display()
    );
    for descriptor in &descriptors {
        println!(
            "  run {:>3}: energy={} GeV particle={} orientation={} main={}",
            descriptor.run_id,
            format_energy(descriptor.point.energy_gev),
            descriptor.point.particle_type,
            descriptor.point.orientation,
            descriptor.main_config.display()
        );
    }
    if let Some(report_path) = report {
        write_plan_listing(&report_path, &descriptors)?;
        println!("JSON plan: {}", report_path.display());
    }
    Ok(0)
}

pub(super) fn run_identify_command(args: IdentifyArgs) -> Result<i32, CliError> {
    let point = parse_output_data_name(&args.file_name).map_err(CliError::Sweep)?;
    println!("energy: {} GeV", format_energy(point.energy_gev));
    println!("particle: {}", point.particle_type);
    println!("orientation: {}", point.orientation);
    if let Some((alpha, beta, gamma)) = orientation_angles(&point.orientation) {
        println!("angles: {}deg {}deg {}deg", alpha, beta, gamma);
    }
    let names = artifact_names(&point);
    println!("main config: {}", names.main_config);
    println!("detector config: {}", names.detector_config);
    Ok(0)
}
