#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # smp-validation
//!
//! Type-directed validation of JSON payloads against Smart Manufacturing
//! profiles.
//!
//! Each field the profile declares is checked against its OPC UA data type,
//! its array-ness, or, when it references another profile, recursively
//! against that profile. Findings are collected with dotted/bracketed paths
//! such as `FeedIngredients[0].ProductNumber`.
//!
//! ## Example Usage
//!
//! ```rust
//! use smp_validation::ProfileValidator;
//! use serde_json::json;
//!
//! let profile = json!({
//!     "@id": "https://example.com/smprofiles/WorkOrderV1",
//!     "cesmii:attributes": [
//!         { "cesmii:browseName": "WorkOrderNumber", "cesmii:dataType": { "@id": "opc:Int32" } }
//!     ]
//! });
//!
//! let validator = ProfileValidator::new(&profile);
//! let result = validator.validate(&json!({ "WorkOrderNumber": "not-a-number" }), "");
//!
//! assert!(!result.is_valid());
//! assert_eq!(result.errors()[0].message(), "Invalid type");
//! ```

pub mod engine;
pub mod reporter;
pub mod rules;

// Re-export main types
pub use engine::{
    DEFAULT_MAX_DEPTH, ProfileValidator, ValidationError, ValidationResult, ValidatorConfig,
};
pub use reporter::{ReportFormat, ValidationReport, ValidationReporter};
pub use rules::{OpcType, type_name, validate_opc_type, validate_timezone};

use serde_json::Value;
use smp_profile::{ProfileLoader, ReferencedProfiles};
use std::sync::Arc;
use thiserror::Error;

/// Errors that abort validation before a result exists
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load profile: {0}")]
    Profile(#[from] smp_profile::Error),

    #[error("Report error: {0}")]
    Report(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Where the profile for [`validate_payload`] comes from
#[derive(Debug, Clone)]
pub enum ProfileSource {
    /// An already parsed profile document
    Document(Value),
    /// A file path or `http(s)://` URL to load the profile from
    Location(String),
}

impl From<Value> for ProfileSource {
    fn from(document: Value) -> Self {
        Self::Document(document)
    }
}

impl From<&str> for ProfileSource {
    fn from(location: &str) -> Self {
        Self::Location(location.to_string())
    }
}

impl From<String> for ProfileSource {
    fn from(location: String) -> Self {
        Self::Location(location)
    }
}

/// Convenience function to load (if needed) a profile and validate a
/// payload against it
///
/// # Errors
///
/// Returns an error when the profile cannot be loaded; validation findings
/// are reported in the returned [`ValidationResult`].
pub fn validate_payload(
    payload: &Value,
    profile: impl Into<ProfileSource>,
    referenced: impl Into<Arc<ReferencedProfiles>>,
) -> Result<ValidationResult> {
    let document = match profile.into() {
        ProfileSource::Document(document) => document,
        ProfileSource::Location(location) => ProfileLoader::default().load(&location)?,
    };

    let validator = ProfileValidator::new(&document).with_referenced_profiles(referenced);
    Ok(validator.validate(payload, ""))
}
