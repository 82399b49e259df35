//! Config loading failures and validation findings.
//!
//! Loading stops at the first I/O or TOML failure. Validation instead
//! collects every finding into [`ConfigDiagnostics`] so one run reports all
//! of them; warnings are logged and never fail the load.

use super::FieldPath;
use owo_colors::OwoColorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a config could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("config file is not valid TOML")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Validation(String),

    /// Rendered in full by its own `Display`; carries no source.
    #[error("{0}")]
    Diagnostics(ConfigDiagnostics),
}

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The config is rejected.
    Error,
    /// Logged; the config is still used.
    Warning,
}

/// One finding about one config field.
#[derive(Debug, Clone)]
pub struct ConfigDiagnostic {
    pub severity: Severity,
    pub field: FieldPath,
    pub message: String,
    /// Suggested fix, printed under the message.
    pub hint: Option<String>,
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.severity {
            Severity::Error => "error".red().bold().to_string(),
            Severity::Warning => "warning".yellow().bold().to_string(),
        };
        write!(f, "{marker} {}: {}", self.field, self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, "\n  {} {hint}", "=".dimmed())?;
        }
        Ok(())
    }
}

/// Findings from one validation run, in the order they were reported.
#[derive(Debug, Default)]
pub struct ConfigDiagnostics {
    errors: Vec<ConfigDiagnostic>,
    warnings: Vec<ConfigDiagnostic>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(
        &mut self,
        severity: Severity,
        field: FieldPath,
        message: String,
        hint: Option<String>,
    ) {
        let finding = ConfigDiagnostic {
            severity,
            field,
            message,
            hint,
        };
        match severity {
            Severity::Error => self.errors.push(finding),
            Severity::Warning => self.warnings.push(finding),
        }
    }

    pub fn error(&mut self, field: FieldPath, message: impl Into<String>) {
        self.push(Severity::Error, field, message.into(), None);
    }

    pub fn error_with_hint(
        &mut self,
        field: FieldPath,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.push(Severity::Error, field, message.into(), Some(hint.into()));
    }

    pub fn warn(&mut self, field: FieldPath, message: impl Into<String>) {
        self.push(Severity::Warning, field, message.into(), None);
    }

    /// Log every warning, one line each.
    pub fn print_warnings(&self) {
        for warning in &self.warnings {
            crate::log!("config"; "{warning}");
        }
    }

    /// Number of errors. Warnings are not counted.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ConfigDiagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[ConfigDiagnostic] {
        &self.warnings
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ConfigDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "{error}")?;
        }
        let count = self.errors.len();
        let noun = if count == 1 { "error" } else { "errors" };
        write!(f, "config rejected with {} {noun}", count.to_string().red().bold())
    }
}

impl std::error::Error for ConfigDiagnostics {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_config_error_display() {
        let io_err = ConfigError::Io(
            PathBuf::from("test.toml"),
            Error::new(ErrorKind::NotFound, "file not found"),
        );
        assert_eq!(io_err.to_string(), "cannot read config file `test.toml`");

        let validation_err = ConfigError::Validation("root is empty".to_string());
        assert_eq!(validation_err.to_string(), "invalid config: root is empty");
    }

    #[test]
    fn test_diagnostics_collect_all_errors() {
        let mut diag = ConfigDiagnostics::new();
        diag.error(FieldPath::new("serve.port"), "port must not be 0");
        diag.error_with_hint(FieldPath::new("files.hide"), "bad pattern", "escape the `[`");
        diag.warn(FieldPath::new("extra"), "unknown field");

        assert_eq!(diag.len(), 2);
        assert_eq!(diag.warnings().len(), 1);
        assert_eq!(diag.warnings()[0].severity, Severity::Warning);
        assert_eq!(diag.errors()[1].hint.as_deref(), Some("escape the `[`"));

        let err = diag.into_result().unwrap_err();
        let display = err.to_string();
        assert!(display.contains("serve.port"));
        assert!(display.contains("escape the `[`"));
        assert!(display.contains("2"));
        assert!(!display.contains("unknown field"));
    }

    #[test]
    fn test_warnings_alone_are_ok() {
        let mut diag = ConfigDiagnostics::new();
        diag.warn(FieldPath::new("extra"), "unknown field");
        assert!(diag.is_empty());
        assert!(diag.into_result().is_ok());
    }
}
