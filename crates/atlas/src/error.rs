//! Error types for Atlas operations.
//!
//! This module provides the main error type [`AtlasError`] which wraps the
//! error conditions that can occur while reading a map document, validating
//! configuration and input, and laying out regions.
//!
//! Overflow is not an error: nodes that do not fit are reported in
//! [`Layout::overflow`](crate::model::Layout::overflow).

use std::{io, ops::Range};

use thiserror::Error;

use atlas_core::{geometry::GeometryError, sizing::SizingError};

/// The main error type for Atlas operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant carries the byte span of the offending TOML and the
/// source text, so that callers can render a labelled snippet.
#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{message}")]
    Parse {
        message: String,
        span: Option<Range<usize>>,
        src: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Sizing error: {0}")]
    Sizing(#[from] SizingError),

    #[error("Region cap of {cap} reached with {remaining} node(s) still unplaced")]
    RegionCapExceeded { cap: usize, remaining: usize },
}

impl AtlasError {
    /// Create a new `Parse` error from a TOML error and its source text.
    pub fn new_parse_error(err: toml::de::Error, src: impl Into<String>) -> Self {
        Self::Parse {
            message: err.message().to_string(),
            span: err.span(),
            src: src.into(),
        }
    }
}
