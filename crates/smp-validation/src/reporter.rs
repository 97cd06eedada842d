//! Validation reporter

use crate::engine::ValidationResult;
use serde::{Deserialize, Serialize};

/// Output format for rendered reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(crate::Error::Report(format!("Unknown report format: {other}"))),
        }
    }
}

/// Report of one validation run, as emitted in JSON form
#[derive(Debug, Serialize)]
pub struct ValidationReport<'a> {
    /// What was validated (usually the payload source)
    pub subject: &'a str,
    /// Namespace of the profile validated against
    pub profile: &'a str,
    #[serde(flatten)]
    pub result: &'a ValidationResult,
}

/// Renders validation results for people or machines
pub struct ValidationReporter {
    format: ReportFormat,
}

impl ValidationReporter {
    /// Create a new validation reporter
    #[must_use]
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Render a report
    ///
    /// # Errors
    ///
    /// Returns an error when the report cannot be serialized.
    pub fn render(&self, report: &ValidationReport<'_>) -> crate::Result<String> {
        match self.format {
            ReportFormat::Text => Ok(Self::render_text(report)),
            ReportFormat::Json => serde_json::to_string_pretty(report)
                .map_err(|e| crate::Error::Report(e.to_string())),
        }
    }

    fn render_text(report: &ValidationReport<'_>) -> String {
        let result = report.result;
        let mut out = format!("Payload: {}\n", report.subject);

        if !report.profile.is_empty() {
            out.push_str(&format!("Profile: {}\n", report.profile));
        }
        out.push_str(&format!(
            "Errors: {}\nWarnings: {}\n",
            result.errors().len(),
            result.warnings().len()
        ));

        if result.has_errors() {
            out.push_str("\nErrors:\n");
            for error in result.errors() {
                out.push_str(&format!("  - {error}\n"));
            }
        }

        if result.has_warnings() {
            out.push_str("\nWarnings:\n");
            for warning in result.warnings() {
                out.push_str(&format!("  - {warning}\n"));
            }
        }

        let summary = if result.has_errors() {
            format!("Validation failed with {} error(s).", result.errors().len())
        } else if result.has_warnings() {
            format!("Validation passed with {} warning(s).", result.warnings().len())
        } else {
            "Validation passed with no warnings.".to_string()
        };
        out.push('\n');
        out.push_str(&summary);
        out.push('\n');

        out
    }
}

impl Default for ValidationReporter {
    fn default() -> Self {
        Self::new(ReportFormat::Text)
    }
}
