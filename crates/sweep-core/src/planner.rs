use crate::domain::{RunDescriptor, SweepError, SweepResult};
use crate::grid::ParameterGrid;
use crate::naming::{artifact_names, format_energy};
use crate::template::{SubstitutionOutcome, TemplateDocument, set_parameter};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

pub trait ConfigSink {
    fn write_config(&mut self, name: &str, contents: &str) -> SweepResult<()>;
}

#[derive(Debug, Clone)]
pub struct DiskConfigSink {
    root: PathBuf,
}

impl DiskConfigSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ConfigSink for DiskConfigSink {
    fn write_config(&mut self, name: &str, contents: &str) -> SweepResult<()> {
        let path = self.root.join(name);
        fs::write(&path, contents).map_err(|source| {
            SweepError::io_system(
                "IO.CONFIG_WRITE",
                format!("failed to write config '{}': {}", path.display(), source),
            )
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryConfigSink {
    pub files: BTreeMap<String, String>,
}

impl ConfigSink for MemoryConfigSink {
    fn write_config(&mut self, name: &str, contents: &str) -> SweepResult<()> {
        self.files.insert(name.to_string(), contents.to_string());
        Ok(())
    }
}

/// Renders and writes both configuration files for every grid point, in grid
/// order, and returns the run descriptors with ids assigned by position.
pub fn materialize_runs(
    grid: &ParameterGrid,
    main_template: &TemplateDocument,
    detector_template: &TemplateDocument,
    data_prefix: &str,
    sink: &mut dyn ConfigSink,
) -> SweepResult<Vec<RunDescriptor>> {
    let points = grid.points()?;
    let mut descriptors = Vec::with_capacity(points.len());
    for (run_id, point) in points.into_iter().enumerate() {
        let names = artifact_names(&point);

        let detector_text = apply_parameter(
            detector_template.label(),
            detector_template.text(),
            "orientation",
            &point.orientation,
        );

        let mut main_text = apply_parameter(
            main_template.label(),
            main_template.text(),
            "file_name",
            &format!("\"{}/{}\"", data_prefix, names.output_data),
        );
        main_text = apply_parameter(
            main_template.label(),
            &main_text,
            "source_energy",
            &format!("{}GeV", format_energy(point.energy_gev)),
        );
        main_text = apply_parameter(
            main_template.label(),
            &main_text,
            "particle_type",
            &format!("\"{}\"", point.particle_type),
        );
        main_text = apply_parameter(
            main_template.label(),
            &main_text,
            "detectors_file",
            &format!("\"{}\"", names.detector_config),
        );

        sink.write_config(&names.detector_config, &detector_text)?;
        sink.write_config(&names.main_config, &main_text)?;

        descriptors.push(RunDescriptor {
            run_id,
            main_config: PathBuf::from(&names.main_config),
            detector_config: PathBuf::from(&names.detector_config),
            output_data: names.output_data,
            point,
        });
    }
    Ok(descriptors)
}

fn apply_parameter(template_label: &str, text: &str, key: &str, value: &str) -> String {
    let (rendered, outcome) = set_parameter(text, key, value);
    if outcome == SubstitutionOutcome::KeyMissing {
        warn!(
            "parameter '{}' not found in template '{}'; lines left unchanged",
            key, template_label
        );
    }
    rendered
}
