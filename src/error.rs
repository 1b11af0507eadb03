//! Error type shared by the tokenizer, style resolver and output surfaces.
//!
//! Only configuration and I/O problems end up here. Malformed song content
//! is logged and skipped by the layout engine instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}:{line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },

    #[error("{file}: unsupported encoding '{encoding}'")]
    Encoding { file: String, encoding: String },

    #[error("invalid stylesheet '{}': {source}", path.display())]
    StyleSheet {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("style '{role}': no value for '{attr}' in the role or any of its ancestors")]
    MissingStyle { role: String, attr: &'static str },

    #[error("style '{role}': bad {attr} value '{value}'")]
    BadStyle {
        role: String,
        attr: &'static str,
        value: String,
    },

    #[error("chord library '{name}': {message}")]
    ChordLibrary { name: String, message: String },

    #[error("invalid page size: {0}")]
    PageSize(String),

    #[error("layout serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
