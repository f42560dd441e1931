pub mod errors;

pub use errors::{SweepError, SweepErrorCategory, SweepResult};

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct GridPoint {
    pub energy_gev: f64,
    pub particle_type: String,
    pub orientation: String,
}

impl GridPoint {
    pub fn new(
        energy_gev: f64,
        particle_type: impl Into<String>,
        orientation: impl Into<String>,
    ) -> Self {
        Self {
            energy_gev,
            particle_type: particle_type.into(),
            orientation: orientation.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunDescriptor {
    pub run_id: usize,
    pub point: GridPoint,
    pub main_config: PathBuf,
    pub detector_config: PathBuf,
    pub output_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub run_id: usize,
    pub exit_code: i32,
    pub diagnostic: String,
}

impl RunResult {
    pub const fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}
