use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SweepResult<T> = Result<T, SweepError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SweepErrorCategory {
    Success,
    InputValidationError,
    IoSystemError,
    ExecutionError,
    InternalError,
}

impl SweepErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ExecutionError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::InputValidationError => "input-validation",
            Self::IoSystemError => "io-system",
            Self::ExecutionError => "execution",
            Self::InternalError => "internal",
        }
    }

    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Success)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepError {
    category: SweepErrorCategory,
    code: &'static str,
    message: String,
}

impl SweepError {
    pub fn new(
        category: SweepErrorCategory,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            code,
            message: message.into(),
        }
    }

    pub fn input_validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(SweepErrorCategory::InputValidationError, code, message)
    }

    pub fn io_system(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(SweepErrorCategory::IoSystemError, code, message)
    }

    pub fn execution(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(SweepErrorCategory::ExecutionError, code, message)
    }

    pub fn internal(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(SweepErrorCategory::InternalError, code, message)
    }

    pub const fn category(&self) -> SweepErrorCategory {
        self.category
    }

    pub const fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        let severity = if self.category.is_fatal() {
            "ERROR"
        } else {
            "INFO"
        };
        format!("{}: [{}] {}", severity, self.code, self.message)
    }

    pub fn fatal_exit_line(&self) -> Option<String> {
        if self.category.is_fatal() {
            Some(format!("FATAL EXIT CODE: {}", self.exit_code()))
        } else {
            None
        }
    }
}

impl Display for SweepError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{} [{}] {}",
            self.category.label(),
            self.code,
            self.message
        )
    }
}

impl Error for SweepError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_stable() {
        let expected = [
            (SweepErrorCategory::Success, 0),
            (SweepErrorCategory::InputValidationError, 2),
            (SweepErrorCategory::IoSystemError, 3),
            (SweepErrorCategory::ExecutionError, 4),
            (SweepErrorCategory::InternalError, 5),
        ];
        for (category, exit_code) in expected {
            assert_eq!(category.exit_code(), exit_code);
        }
    }

    #[test]
    fn only_success_is_non_fatal() {
        assert!(!SweepErrorCategory::Success.is_fatal());
        assert!(SweepErrorCategory::InputValidationError.is_fatal());
        assert!(SweepErrorCategory::IoSystemError.is_fatal());
        assert!(SweepErrorCategory::ExecutionError.is_fatal());
        assert!(SweepErrorCategory::InternalError.is_fatal());
    }

    #[test]
    fn diagnostic_lines_carry_code_and_severity() {
        let error = SweepError::io_system("IO.TEMPLATE_READ", "template vanished");
        assert_eq!(
            error.diagnostic_line(),
            "ERROR: [IO.TEMPLATE_READ] template vanished"
        );
        assert_eq!(error.fatal_exit_line().as_deref(), Some("FATAL EXIT CODE: 3"));

        let note = SweepError::new(SweepErrorCategory::Success, "RUN.NOTE", "all good");
        assert_eq!(note.diagnostic_line(), "INFO: [RUN.NOTE] all good");
        assert_eq!(note.fatal_exit_line(), None);
    }

    #[test]
    fn display_includes_category_label() {
        let error = SweepError::input_validation("INPUT.WORKER_COUNT", "must be at least 1");
        assert_eq!(
            error.to_string(),
            "input-validation [INPUT.WORKER_COUNT] must be at least 1"
        );
    }
}
