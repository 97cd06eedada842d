//! Validation engine

use crate::rules::{type_name, validate_opc_type};
use serde::Serialize;
use serde_json::{Map, Value};
use smp_profile::{FieldDefinition, Profile, ReferencedProfiles};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Nested profile descents allowed below the root profile
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Maximum nested-profile depth before a branch is reported and skipped
    pub max_depth: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    path: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    actual: Option<String>,
}

impl ValidationError {
    /// Create a finding without type details
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    /// Attach the expected and actual type descriptions
    #[must_use]
    pub fn with_types(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    /// A value that does not satisfy its declared type
    #[must_use]
    pub fn invalid_type(path: impl Into<String>, expected: &str, value: &Value) -> Self {
        Self::new(path, "Invalid type").with_types(expected, type_name(value))
    }

    /// A required structure member that is absent
    #[must_use]
    pub fn missing_field(path: impl Into<String>) -> Self {
        Self::new(path, "Missing required field")
    }

    /// Locator of the offending value, e.g. `FeedIngredients[2].Quantity`
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn expected(&self) -> Option<&str> {
        self.expected.as_deref()
    }

    #[must_use]
    pub fn actual(&self) -> Option<&str> {
        self.actual.as_deref()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)?;
        if let (Some(expected), Some(actual)) = (&self.expected, &self.actual) {
            write!(f, " (expected: {expected}, got: {actual})")?;
        }
        Ok(())
    }
}

/// Outcome of validating one payload.
///
/// `valid` always equals `errors.is_empty()`; the constructors are the only
/// way to build a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    valid: bool,
    errors: Vec<ValidationError>,
    warnings: Vec<String>,
}

impl ValidationResult {
    /// Build a result from accumulated findings
    #[must_use]
    pub fn from_findings(errors: Vec<ValidationError>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// A result carrying a single error that stopped validation early
    #[must_use]
    pub fn rejected(error: ValidationError) -> Self {
        Self::from_findings(vec![error], Vec::new())
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Check if there are any errors
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if there are any warnings
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Split the result into its errors and warnings
    #[must_use]
    pub fn into_parts(self) -> (Vec<ValidationError>, Vec<String>) {
        (self.errors, self.warnings)
    }
}

impl std::fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.valid {
            return write!(f, "Valid");
        }
        write!(f, "Invalid: {} error(s)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

/// Validates payloads against one SM profile
#[derive(Debug, Clone)]
pub struct ProfileValidator {
    profile: Profile,
    referenced: Arc<ReferencedProfiles>,
    config: ValidatorConfig,
    depth: usize,
}

impl ProfileValidator {
    /// Parse a profile document into a validator with no referenced profiles
    #[must_use]
    pub fn new(document: &Value) -> Self {
        Self::from_profile(Profile::from_document(document))
    }

    /// Create a validator over an already parsed profile
    #[must_use]
    pub fn from_profile(profile: Profile) -> Self {
        Self {
            profile,
            referenced: Arc::new(ReferencedProfiles::new()),
            config: ValidatorConfig::default(),
            depth: 0,
        }
    }

    /// Provide the profiles that nested-structure references resolve against
    #[must_use]
    pub fn with_referenced_profiles(mut self, referenced: impl Into<Arc<ReferencedProfiles>>) -> Self {
        self.referenced = referenced.into();
        self
    }

    /// Create with specific configuration
    #[must_use]
    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Validate a payload.
    ///
    /// `path_prefix` roots every reported path; pass `""` for a top-level
    /// payload.
    #[must_use]
    pub fn validate(&self, payload: &Value, path_prefix: &str) -> ValidationResult {
        let Some(object) = payload.as_object() else {
            let path = if path_prefix.is_empty() { "$" } else { path_prefix };
            return ValidationResult::rejected(
                ValidationError::new(path, "Payload must be an object")
                    .with_types("object", type_name(payload)),
            );
        };

        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if let Some(warning) = self.namespace_warning(object) {
            warnings.push(warning);
        }

        for field in &self.profile.fields {
            let path = if path_prefix.is_empty() {
                field.name.clone()
            } else {
                format!("{path_prefix}.{}", field.name)
            };

            // Fields are optional
            let Some(value) = object.get(&field.name) else {
                continue;
            };

            self.validate_field(field, value, &path, &mut errors);
        }

        ValidationResult::from_findings(errors, warnings)
    }

    fn namespace_warning(&self, payload: &Map<String, Value>) -> Option<String> {
        let payload_ns = payload.get("$namespace").and_then(Value::as_str)?;
        let profile_ns = &self.profile.namespace;

        if payload_ns.is_empty() || profile_ns.is_empty() || payload_ns == profile_ns {
            return None;
        }

        Some(format!(
            "Payload namespace '{payload_ns}' doesn't match profile namespace '{profile_ns}'"
        ))
    }

    fn validate_field(
        &self,
        field: &FieldDefinition,
        value: &Value,
        path: &str,
        errors: &mut Vec<ValidationError>,
    ) {
        let opc_type = self.profile.resolved_type(field);
        let profile_ref = field.profile_reference();
        trace!(
            "Validating {} (type: {:?}, reference: {:?}, array: {})",
            path, opc_type, profile_ref, field.is_array
        );

        if !field.is_array {
            self.validate_value(value, opc_type, profile_ref, path, errors);
            return;
        }

        let Some(items) = value.as_array() else {
            errors.push(
                ValidationError::new(path, "Expected array").with_types("array", type_name(value)),
            );
            return;
        };

        for (idx, item) in items.iter().enumerate() {
            let item_path = format!("{path}[{idx}]");
            self.validate_value(item, opc_type, profile_ref, &item_path, errors);
        }
    }

    /// A profile reference takes priority over the primitive type; with
    /// neither the value passes.
    fn validate_value(
        &self,
        value: &Value,
        opc_type: Option<&str>,
        profile_ref: Option<&str>,
        path: &str,
        errors: &mut Vec<ValidationError>,
    ) {
        if let Some(profile_ref) = profile_ref {
            errors.extend(self.validate_nested(value, profile_ref, path));
        } else if let Some(opc_type) = opc_type {
            errors.extend(validate_opc_type(value, opc_type, path));
        }
    }

    fn validate_nested(&self, value: &Value, profile_ref: &str, path: &str) -> Vec<ValidationError> {
        let Some((namespace, document)) = self.referenced.resolve(profile_ref) else {
            debug!("Referenced profile not loaded: {}", profile_ref);
            return vec![ValidationError::new(
                path,
                format!("Could not validate against referenced profile (not loaded): {profile_ref}"),
            )];
        };

        if self.depth >= self.config.max_depth {
            warn!(
                "Profile nesting depth {} exceeded at {} ({})",
                self.config.max_depth, path, profile_ref
            );
            return vec![ValidationError::new(
                path,
                format!(
                    "Maximum profile nesting depth ({}) exceeded: {profile_ref}",
                    self.config.max_depth
                ),
            )];
        }

        debug!("Validating {} against referenced profile {}", path, namespace);
        let nested = Self {
            profile: Profile::from_document(document),
            referenced: Arc::clone(&self.referenced),
            config: self.config.clone(),
            depth: self.depth + 1,
        };

        // Nested warnings are not propagated
        let (nested_errors, _) = nested.validate(value, path).into_parts();
        nested_errors
    }
}
