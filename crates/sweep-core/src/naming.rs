use crate::domain::{GridPoint, SweepError, SweepResult};
use std::path::Path;

/// Subdirectory of the work directory that collects simulation output files.
pub const DATA_SUBDIR: &str = "output_auto";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArtifactNames {
    pub detector_config: String,
    pub main_config: String,
    pub output_data: String,
}

pub fn format_energy(energy_gev: f64) -> String {
    if energy_gev.fract() == 0.0 {
        format!("{energy_gev:.1}")
    } else {
        energy_gev.to_string()
    }
}

pub fn coordinate_fragment(point: &GridPoint) -> String {
    let energy = format_energy(point.energy_gev).replace('.', "_");
    let orientation = point.orientation.replace(' ', "_");
    format!("{}_{}_{}", energy, point.particle_type, orientation)
}

pub fn artifact_names(point: &GridPoint) -> RunArtifactNames {
    let fragment = coordinate_fragment(point);
    RunArtifactNames {
        detector_config: format!("detector_auto_{fragment}.conf"),
        main_config: format!("main_auto_{fragment}.conf"),
        output_data: format!("data_auto_{fragment}.root"),
    }
}

/// Recovers the grid coordinates encoded in a `data_auto_*.root` file name.
pub fn parse_output_data_name(file_name: &str) -> SweepResult<GridPoint> {
    let name = Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file_name);
    let stem = name
        .strip_prefix("data_auto_")
        .and_then(|rest| rest.strip_suffix(".root"))
        .ok_or_else(|| invalid_data_name(name, "expected data_auto_<coordinates>.root"))?;

    let parts: Vec<&str> = stem.split('_').collect();
    if parts.len() < 4 {
        return Err(invalid_data_name(
            name,
            "expected <energy>_<particle>_<orientation> coordinates",
        ));
    }

    let energy_text = format!("{}.{}", parts[0], parts[1]);
    let energy_gev: f64 = energy_text
        .parse()
        .map_err(|_| invalid_data_name(name, "energy coordinate is not numeric"))?;
    let particle_type = parts[2].to_string();
    let orientation = parts[3..].join(" ");
    Ok(GridPoint {
        energy_gev,
        particle_type,
        orientation,
    })
}

/// Splits an orientation string such as `15deg 0deg 0deg` into its three
/// angles; returns `None` for anything else.
pub fn orientation_angles(orientation: &str) -> Option<(f64, f64, f64)> {
    let mut tokens = orientation.split_whitespace();
    let first = parse_degrees(tokens.next()?)?;
    let second = parse_degrees(tokens.next()?)?;
    let third = parse_degrees(tokens.next()?)?;
    if tokens.next().is_some() {
        return None;
    }
    Some((first, second, third))
}

fn parse_degrees(token: &str) -> Option<f64> {
    token.strip_suffix("deg")?.parse().ok()
}

fn invalid_data_name(name: &str, detail: &str) -> SweepError {
    SweepError::input_validation(
        "INPUT.DATA_FILE_NAME",
        format!("cannot identify '{}': {}", name, detail),
    )
}
