use super::CliError;
use anyhow::Context;
use std::fs;
use std::path::Path;
use sweep_core::domain::RunDescriptor;
use sweep_core::naming::format_energy;
use sweep_core::sweep::SweepConfig;
use tracing::debug;

pub(super) fn load_sweep_definition(path: &Path) -> Result<SweepConfig, CliError> {
    let config = SweepConfig::from_file(path).map_err(CliError::Sweep)?;
    debug!("loaded sweep definition from '{}'", path.display());
    Ok(config)
}

pub(super) fn write_plan_listing(
    path: &Path,
    descriptors: &[RunDescriptor],
) -> Result<(), CliError> {
    let listing: Vec<serde_json::Value> = descriptors
        .iter()
        .map(|descriptor| {
            serde_json::json!({
                "runId": descriptor.run_id,
                "energy": format_energy(descriptor.point.energy_gev),
                "particleType": descriptor.point.particle_type,
                "orientation": descriptor.point.orientation,
                "mainConfig": descriptor.main_config.display().to_string(),
                "detectorConfig": descriptor.detector_config.display().to_string(),
                "outputData": descriptor.output_data,
            })
        })
        .collect();
    let rendered = serde_json::to_string_pretty(&listing)
        .context("failed to serialize plan listing")
        .map_err(CliError::from)?;
    fs::write(path, rendered)
        .with_context(|| format!("failed to write plan listing '{}'", path.display()))
        .map_err(CliError::from)?;
    Ok(())
}
