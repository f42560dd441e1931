use crate::domain::{GridPoint, SweepError, SweepResult};
use serde::Deserialize;

// Caps range enumeration so a misconfigured step fails validation instead
// of allocating an enormous grid.
const MAX_ENERGY_VALUES: usize = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct EnergyRange {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl EnergyRange {
    pub const fn new(start: f64, stop: f64, step: f64) -> Self {
        Self { start, stop, step }
    }

    /// Enumerates `start, start + step, ...` up to and including `stop`.
    pub fn values(&self) -> SweepResult<Vec<f64>> {
        if !self.start.is_finite() || !self.stop.is_finite() || !self.step.is_finite() {
            return Err(SweepError::input_validation(
                "INPUT.ENERGY_RANGE",
                format!(
                    "energy range bounds must be finite, got start={} stop={} step={}",
                    self.start, self.stop, self.step
                ),
            ));
        }
        if self.step <= 0.0 {
            return Err(SweepError::input_validation(
                "INPUT.ENERGY_STEP",
                format!("energy step must be positive, got {}", self.step),
            ));
        }
        if self.stop < self.start {
            return Err(SweepError::input_validation(
                "INPUT.ENERGY_RANGE",
                format!(
                    "energy range stop {} lies below start {}",
                    self.stop, self.start
                ),
            ));
        }

        let steps = ((self.stop - self.start) / self.step + 1e-9).floor();
        if steps >= MAX_ENERGY_VALUES as f64 {
            return Err(SweepError::input_validation(
                "INPUT.ENERGY_RANGE",
                format!(
                    "energy range would enumerate {:.0e} values, the supported maximum is {}",
                    steps + 1.0,
                    MAX_ENERGY_VALUES
                ),
            ));
        }
        let count = steps as usize + 1;
        Ok((0..count)
            .map(|index| round_energy(self.start + index as f64 * self.step))
            .collect())
    }
}

impl Default for EnergyRange {
    fn default() -> Self {
        Self::new(5.0, 10.0, 0.1)
    }
}

// Stepping in binary floating point accumulates noise (5.0 + 3 * 0.1 is not
// exactly 5.3); rounding to 1e-6 GeV keeps rendered values stable.
fn round_energy(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParameterGrid {
    pub energies: EnergyRange,
    pub particle_types: Vec<String>,
    pub orientations: Vec<String>,
}

impl ParameterGrid {
    /// Cartesian product in fixed nesting order: energy outermost, particle
    /// type in the middle, orientation innermost.
    pub fn points(&self) -> SweepResult<Vec<GridPoint>> {
        let energies = self.energies.values()?;
        for particle_type in &self.particle_types {
            validate_particle_type(particle_type)?;
        }
        for orientation in &self.orientations {
            validate_orientation(orientation)?;
        }
        let mut points =
            Vec::with_capacity(energies.len() * self.particle_types.len() * self.orientations.len());
        for &energy_gev in &energies {
            for particle_type in &self.particle_types {
                for orientation in &self.orientations {
                    points.push(GridPoint::new(
                        energy_gev,
                        particle_type.clone(),
                        orientation.clone(),
                    ));
                }
            }
        }
        Ok(points)
    }
}

impl Default for ParameterGrid {
    fn default() -> Self {
        Self {
            energies: EnergyRange::default(),
            particle_types: vec!["proton".to_string(), "e-".to_string()],
            orientations: vec![
                "0deg 0deg 0deg".to_string(),
                "15deg 0deg 0deg".to_string(),
                "0deg 15deg 0deg".to_string(),
            ],
        }
    }
}

// Artifact names join energy, particle and orientation with '_', so values
// carrying the separator (or path characters) would let two distinct
// coordinates render the same file name.
fn validate_particle_type(value: &str) -> SweepResult<()> {
    if value.is_empty() || value.contains(['_', '/']) || value.contains(char::is_whitespace) {
        return Err(SweepError::input_validation(
            "INPUT.PARTICLE_TYPE",
            format!(
                "particle type '{}' must be non-empty, without underscores, slashes or whitespace",
                value
            ),
        ));
    }
    Ok(())
}

fn validate_orientation(value: &str) -> SweepResult<()> {
    if value.is_empty() || value.contains(['_', '/']) {
        return Err(SweepError::input_validation(
            "INPUT.ORIENTATION",
            format!(
                "orientation '{}' must be non-empty, without underscores or slashes",
                value
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SweepErrorCategory;

    #[test]
    fn default_range_covers_five_to_ten_gev_inclusive() {
        let values = EnergyRange::default().values().expect("range should enumerate");
        assert_eq!(values.len(), 51);
        assert_eq!(values[0], 5.0);
        assert_eq!(values[50], 10.0);
    }

    #[test]
    fn stepped_values_carry_no_float_noise() {
        let values = EnergyRange::default().values().expect("range should enumerate");
        assert_eq!(values[1], 5.1);
        assert_eq!(values[3], 5.3);
        assert_eq!(values[20], 7.0);
    }

    #[test]
    fn stop_value_is_included_even_when_reached_inexactly() {
        let values = EnergyRange::new(5.0, 5.1, 0.1)
            .values()
            .expect("range should enumerate");
        assert_eq!(values, vec![5.0, 5.1]);
    }

    #[test]
    fn non_positive_step_is_rejected() {
        let error = EnergyRange::new(5.0, 10.0, 0.0)
            .values()
            .expect_err("zero step should fail");
        assert_eq!(error.category(), SweepErrorCategory::InputValidationError);
        assert_eq!(error.code(), "INPUT.ENERGY_STEP");
    }

    #[test]
    fn inverted_range_is_rejected() {
        let error = EnergyRange::new(10.0, 5.0, 0.1)
            .values()
            .expect_err("inverted range should fail");
        assert_eq!(error.code(), "INPUT.ENERGY_RANGE");
    }

    #[test]
    fn non_finite_bounds_are_rejected() {
        let error = EnergyRange::new(f64::NAN, 10.0, 0.1)
            .values()
            .expect_err("nan start should fail");
        assert_eq!(error.code(), "INPUT.ENERGY_RANGE");
    }

    #[test]
    fn absurdly_dense_ranges_are_rejected() {
        let error = EnergyRange::new(0.0, 1e300, 1e-300)
            .values()
            .expect_err("oversized range should fail");
        assert_eq!(error.code(), "INPUT.ENERGY_RANGE");
    }

    #[test]
    fn points_follow_energy_particle_orientation_nesting() {
        let grid = ParameterGrid {
            energies: EnergyRange::new(5.0, 5.1, 0.1),
            particle_types: vec!["proton".to_string(), "e-".to_string()],
            orientations: vec!["0deg 0deg 0deg".to_string(), "15deg 0deg 0deg".to_string()],
        };
        let points = grid.points().expect("grid should enumerate");

        let expected = [
            (5.0, "proton", "0deg 0deg 0deg"),
            (5.0, "proton", "15deg 0deg 0deg"),
            (5.0, "e-", "0deg 0deg 0deg"),
            (5.0, "e-", "15deg 0deg 0deg"),
            (5.1, "proton", "0deg 0deg 0deg"),
            (5.1, "proton", "15deg 0deg 0deg"),
            (5.1, "e-", "0deg 0deg 0deg"),
            (5.1, "e-", "15deg 0deg 0deg"),
        ];
        assert_eq!(points.len(), expected.len());
        for (point, (energy_gev, particle_type, orientation)) in points.iter().zip(expected) {
            assert_eq!(point.energy_gev, energy_gev);
            assert_eq!(point.particle_type, particle_type);
            assert_eq!(point.orientation, orientation);
        }
    }

    #[test]
    fn default_grid_enumerates_all_combinations() {
        let points = ParameterGrid::default().points().expect("grid should enumerate");
        assert_eq!(points.len(), 51 * 2 * 3);
    }

    #[test]
    fn empty_particle_list_yields_an_empty_grid() {
        let grid = ParameterGrid {
            particle_types: Vec::new(),
            ..ParameterGrid::default()
        };
        assert!(grid.points().expect("grid should enumerate").is_empty());
    }

    #[test]
    fn coordinate_spellings_that_collide_in_file_names_are_rejected() {
        // Both spellings would render data_auto_5_0_pi_minus_0deg.root.
        let grid = ParameterGrid {
            energies: EnergyRange::new(5.0, 5.0, 0.1),
            particle_types: vec!["pi".to_string(), "pi_minus".to_string()],
            orientations: vec!["minus 0deg".to_string(), "0deg".to_string()],
        };
        let error = grid.points().expect_err("colliding spellings should fail");
        assert_eq!(error.code(), "INPUT.PARTICLE_TYPE");
    }

    #[test]
    fn particle_types_with_separator_characters_are_rejected() {
        for particle_type in ["pi_minus", "pi minus", "pi/minus", ""] {
            let grid = ParameterGrid {
                particle_types: vec![particle_type.to_string()],
                ..ParameterGrid::default()
            };
            let error = grid.points().expect_err("particle type should be rejected");
            assert_eq!(error.code(), "INPUT.PARTICLE_TYPE", "for '{particle_type}'");
        }
    }

    #[test]
    fn orientations_with_separator_characters_are_rejected() {
        for orientation in ["0deg_0deg 0deg", "0deg/0deg 0deg", ""] {
            let grid = ParameterGrid {
                orientations: vec![orientation.to_string()],
                ..ParameterGrid::default()
            };
            let error = grid.points().expect_err("orientation should be rejected");
            assert_eq!(error.code(), "INPUT.ORIENTATION", "for '{orientation}'");
        }
    }
}
