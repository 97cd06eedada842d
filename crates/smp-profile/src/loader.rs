//! Profile document loader for local files and HTTP(S) URLs

use crate::model::Profile;
use crate::registry::ReferencedProfiles;
use crate::{Error, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, trace};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Loads profile (and payload) documents from disk or over HTTP
#[derive(Debug, Clone)]
pub struct ProfileLoader {
    search_paths: Vec<PathBuf>,
    timeout: Duration,
}

impl ProfileLoader {
    /// Create a loader that resolves relative paths against the given
    /// search paths after trying them as given
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the HTTP request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load a document from a local path or an `http(s)://` URL
    pub fn load(&self, source: &str) -> Result<Value> {
        if is_remote(source) {
            self.load_from_url(source)
        } else {
            let path = self.locate(Path::new(source))?;
            self.load_from_file(&path)
        }
    }

    /// Load a document from a specific file path
    pub fn load_from_file(&self, path: &Path) -> Result<Value> {
        trace!("Loading document from file: {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(path.display().to_string())
            } else {
                Error::Io(e)
            }
        })?;

        Self::parse_by_extension(path, &content)
    }

    /// Fetch a document over HTTP(S)
    pub fn load_from_url(&self, url: &str) -> Result<Value> {
        debug!("Fetching document from {}", url);
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::http(url, e.to_string()))?;

        let response = client
            .get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| Error::http(url, e.to_string()))?;

        // Format follows the path of the final (post-redirect) URL
        let path = PathBuf::from(response.url().path());
        let body = response.text().map_err(|e| Error::http(url, e.to_string()))?;

        Self::parse_by_extension(&path, &body)
    }

    /// Parse YAML for `.yaml`/`.yml` paths, JSON for anything else
    pub fn parse_by_extension(path: &Path, content: &str) -> Result<Value> {
        if path
            .extension()
            .is_some_and(|e| e == "yaml" || e == "yml")
        {
            Self::parse_yaml(content)
        } else {
            Self::parse_json(content)
        }
    }

    /// Parse a JSON (or JSON-LD) document
    pub fn parse_json(content: &str) -> Result<Value> {
        serde_json::from_str(content)
            .map_err(|e| Error::InvalidFormat(format!("JSON parse error: {e}")))
    }

    /// Parse a YAML document into the JSON value model
    pub fn parse_yaml(content: &str) -> Result<Value> {
        serde_yaml::from_str(content)
            .map_err(|e| Error::InvalidFormat(format!("YAML parse error: {e}")))
    }

    /// Load referenced profiles, keyed by the given namespace or, when none
    /// is given, by the loaded document's own `@id`
    pub fn load_referenced(
        &self,
        sources: &[(Option<String>, String)],
    ) -> Result<ReferencedProfiles> {
        let mut profiles = ReferencedProfiles::new();

        for (namespace, source) in sources {
            let document = self.load(source)?;
            let namespace = match namespace {
                Some(ns) => ns.clone(),
                None => Profile::namespace_of(&document)
                    .map(str::to_string)
                    .ok_or_else(|| {
                        Error::InvalidFormat(format!(
                            "Referenced profile '{source}' declares no @id and no namespace was given"
                        ))
                    })?,
            };
            debug!("Registered referenced profile {} from {}", namespace, source);
            profiles.insert(namespace, document);
        }

        Ok(profiles)
    }

    fn locate(&self, path: &Path) -> Result<PathBuf> {
        if path.is_absolute() || path.exists() {
            return Ok(path.to_path_buf());
        }

        for dir in &self.search_paths {
            let candidate = dir.join(path);
            if candidate.exists() {
                trace!("Found document in search path: {:?}", candidate);
                return Ok(candidate);
            }
        }

        Err(Error::NotFound(format!(
            "{} not found in search paths: {:?}",
            path.display(),
            self.search_paths
        )))
    }
}

impl Default for ProfileLoader {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Load a profile document from a file path or URL with default settings
pub fn load_profile(source: &str) -> Result<Value> {
    ProfileLoader::default().load(source)
}

/// Whether a source names an `http(s)://` URL rather than a local path
#[must_use]
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}
