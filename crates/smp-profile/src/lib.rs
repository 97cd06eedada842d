//! # smp-profile
//!
//! Smart Manufacturing profile model, parsing, and document loading.
//!
//! A profile is a JSON-LD document declaring named attributes (ObjectType
//! profiles) or fields (DataType profiles), their OPC UA data types, whether
//! they repeat, and optional references to other profiles for nested
//! structures. This crate turns such a document into a [`Profile`] field
//! table and loads profile documents from disk or over HTTP.

pub mod loader;
pub mod model;
pub mod registry;

pub use loader::{ProfileLoader, is_remote, load_profile};
pub use model::{DataTypeRef, FieldDefinition, Profile};
pub use registry::ReferencedProfiles;

use thiserror::Error;

/// Errors that can occur when loading profile or payload documents
#[derive(Error, Debug)]
pub enum Error {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Invalid document format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error fetching '{url}': {message}")]
    Http { url: String, message: String },
}

impl Error {
    /// Build an HTTP error carrying the requested URL.
    pub fn http(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Http {
            url: url.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
