use crate::domain::{SweepError, SweepResult};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubstitutionOutcome {
    Applied,
    KeyMissing,
}

/// Replaces the first `key = value` assignment whose left-hand side matches
/// `key` exactly and leaves every other line untouched.
pub fn set_parameter(text: &str, key: &str, value: &str) -> (String, SubstitutionOutcome) {
    let lines: Vec<&str> = text.lines().collect();
    let mut matched_index = None;
    for (index, line) in lines.iter().enumerate() {
        let Some((lhs, _)) = line.split_once('=') else {
            continue;
        };
        if lhs.trim() == key {
            matched_index = Some(index);
            break;
        }
    }

    let Some(matched_index) = matched_index else {
        return (text.to_string(), SubstitutionOutcome::KeyMissing);
    };

    let replacement = format!("{key} = {value}");
    let mut rendered = String::with_capacity(text.len() + replacement.len());
    for (index, line) in lines.iter().enumerate() {
        if index > 0 {
            rendered.push('\n');
        }
        if index == matched_index {
            rendered.push_str(&replacement);
        } else {
            rendered.push_str(line);
        }
    }
    if text.ends_with('\n') {
        rendered.push('\n');
    }
    (rendered, SubstitutionOutcome::Applied)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDocument {
    label: String,
    text: String,
}

impl TemplateDocument {
    pub fn load(path: &Path) -> SweepResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| {
            SweepError::io_system(
                "IO.TEMPLATE_READ",
                format!("failed to read template '{}': {}", path.display(), source),
            )
        })?;
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { label, text })
    }

    pub fn from_text(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn replaces_exactly_one_line_and_keeps_the_rest_verbatim() {
        let (rendered, outcome) = set_parameter(DETECTOR_FIXTURE, "orientation", "15deg 0deg 0deg");
        assert_eq!(outcome, SubstitutionOutcome::Applied);

        let before: Vec<&str> = DETECTOR_FIXTURE.lines().collect();
        let after: Vec<&str> = rendered.lines().collect();
        assert_eq!(before.len(), after.len());
        let changed: Vec<usize> = (0..before.len())
            .filter(|&index| before[index] != after[index])
            .collect();
        assert_eq!(changed.len(), 1);
        assert_eq!(after[changed[0]], "orientation = 15deg 0deg 0deg");
    }

    #[test]
    fn missing_key_returns_text_unchanged() {
        let (rendered, outcome) = set_parameter(DETECTOR_FIXTURE, "beam_energy", "7.5");
        assert_eq!(outcome, SubstitutionOutcome::KeyMissing);
        assert_eq!(rendered, DETECTOR_FIXTURE);
    }

    #[test]
    fn exact_key_match_skips_longer_key_names() {
        let (rendered, outcome) = set_parameter(DETECTOR_FIXTURE, "orientation", "0deg 15deg 0deg");
        assert_eq!(outcome, SubstitutionOutcome::Applied);
        assert!(rendered.contains("orientation_mode = \"xyz\""));
        assert!(rendered.contains("orientation = 0deg 15deg 0deg"));
    }

    #[test]
    fn only_the_first_matching_line_is_replaced() {
        let text = "count = 1\ncount = 2\n";
        let (rendered, outcome) = set_parameter(text, "count", "9");
        assert_eq!(outcome, SubstitutionOutcome::Applied);
        assert_eq!(rendered, "count = 9\ncount = 2\n");
    }

    #[test]
    fn replacement_normalizes_spacing_around_the_assignment() {
        let text = "  source_energy=5GeV\n";
        let (rendered, outcome) = set_parameter(text, "source_energy", "5.1GeV");
        assert_eq!(outcome, SubstitutionOutcome::Applied);
        assert_eq!(rendered, "source_energy = 5.1GeV\n");
    }

    #[test]
    fn lines_without_assignments_never_match() {
        let text = "[orientation]\norientation = 0deg 0deg 0deg\n";
        let (rendered, _) = set_parameter(text, "orientation", "5deg 5deg 5deg");
        assert_eq!(rendered, "[orientation]\norientation = 5deg 5deg 5deg\n");
    }

    #[test]
    fn trailing_newline_presence_is_preserved() {
        let with_newline = "mode = a\n";
        let (rendered, _) = set_parameter(with_newline, "mode", "b");
        assert_eq!(rendered, "mode = b\n");

        let without_newline = "mode = a";
        let (rendered, _) = set_parameter(without_newline, "mode", "b");
        assert_eq!(rendered, "mode = b");
    }

    #[test]
    fn load_reads_text_and_labels_by_file_name() {
        let staging = TempDir::new().expect("tempdir should be created");
        let path = staging.path().join("spacepix3_detector.conf");
        std::fs::write(&path, DETECTOR_FIXTURE).expect("fixture should be staged");

        let document = TemplateDocument::load(&path).expect("template should load");
        assert_eq!(document.label(), "spacepix3_detector.conf");
        assert_eq!(document.text(), DETECTOR_FIXTURE);
    }

    #[test]
    fn load_reports_missing_templates_as_io_errors() {
        let staging = TempDir::new().expect("tempdir should be created");
        let path = staging.path().join("absent.conf");

        let error = TemplateDocument::load(&path).expect_err("load should fail");
        assert_eq!(error.category(), crate::domain::SweepErrorCategory::IoSystemError);
        assert_eq!(error.code(), "IO.TEMPLATE_READ");
    }

    const DETECTOR_FIXTURE: &str = "\
[spacepix3]
type = \"spacepix3\"
position = 0mm 0mm 0mm
orientation_mode = \"xyz\"
orientation = 0deg 0deg 0deg
";
}
