//! Configuration file for the `smpv` command

use anyhow::Context;
use serde::Deserialize;
use smp_profile::is_remote;
use smp_validation::ReportFormat;
use std::path::Path;

/// Settings that can be kept in a YAML file instead of passed as flags
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Profile to validate against (path or URL)
    pub profile: Option<String>,
    /// Profiles that nested structures reference
    pub references: Vec<ReferenceConfig>,
    /// Maximum nested-profile depth
    pub max_depth: Option<usize>,
    /// Report format
    pub format: Option<ReportFormat>,
}

/// A referenced profile entry
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceConfig {
    /// Namespace to register the profile under; defaults to its `@id`
    #[serde(default)]
    pub namespace: Option<String>,
    /// Path or URL of the profile document
    pub source: String,
}

impl CliConfig {
    /// Read a configuration file; relative sources in it are taken
    /// relative to the file's directory
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to load config '{}': invalid YAML", path.display()))?;

        Ok(match path.parent() {
            Some(dir) => config.relative_to(dir),
            None => config,
        })
    }

    /// Rebase relative local sources onto `dir`
    #[must_use]
    pub fn relative_to(mut self, dir: &Path) -> Self {
        self.profile = self.profile.map(|source| rebase(dir, source));
        for reference in &mut self.references {
            reference.source = rebase(dir, std::mem::take(&mut reference.source));
        }
        self
    }
}

fn rebase(dir: &Path, source: String) -> String {
    if is_remote(&source) || Path::new(&source).is_absolute() {
        source
    } else {
        dir.join(source).to_string_lossy().into_owned()
    }
}

/// Split a `--reference` argument of the form `[<namespace>=]<source>`.
///
/// A `?` before the first `=` means the `=` belongs to a URL query string.
pub fn parse_reference(arg: &str) -> (Option<String>, String) {
    match arg.split_once('=') {
        Some((namespace, source)) if !namespace.is_empty() && !namespace.contains('?') => {
            (Some(namespace.to_string()), source.to_string())
        }
        _ => (None, arg.to_string()),
    }
}
