//! Error adapter for converting AtlasError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI. Parse errors of
//! the map document are rendered with a labelled snippet of the input; every
//! other variant becomes a plain diagnostic with a stable code.

use std::{fmt, ops::Range};

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use atlas::AtlasError;

/// Adapter for a map document parse error.
///
/// This adapter wraps the message, span and source of an
/// [`AtlasError::Parse`] and implements [`MietteDiagnostic`] to point at the
/// offending part of the document.
pub struct ParseAdapter<'a> {
    message: &'a str,
    span: Option<&'a Range<usize>>,
    src: &'a str,
}

impl<'a> ParseAdapter<'a> {
    /// Create a new parse adapter.
    pub fn new(message: &'a str, span: Option<&'a Range<usize>>, src: &'a str) -> Self {
        Self { message, span, src }
    }
}

impl fmt::Debug for ParseAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseAdapter")
            .field("message", &self.message)
            .field("span", &self.span)
            .finish()
    }
}

impl fmt::Display for ParseAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseAdapter<'_> {}

impl MietteDiagnostic for ParseAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("atlas::parse"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(
            "map documents list `[[nodes]]` and optionally `[[regions]]` tables",
        ))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span?;
        let label = LabeledSpan::new_primary_with_span(
            Some("here".to_string()),
            span_to_miette(span),
        );
        Some(Box::new(std::iter::once(label)))
    }
}

/// Adapter for non-diagnostic [`AtlasError`] variants.
///
/// This adapter handles errors that don't have rich diagnostic information,
/// such as I/O errors, configuration errors and invalid input.
pub struct ErrorAdapter<'a>(pub &'a AtlasError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            AtlasError::Io(_) => "atlas::io",
            AtlasError::Parse { .. } => "atlas::parse",
            AtlasError::Config(_) => "atlas::config",
            AtlasError::InvalidInput(_) => "atlas::input",
            AtlasError::Geometry(_) => "atlas::geometry",
            AtlasError::Sizing(_) => "atlas::sizing",
            AtlasError::RegionCapExceeded { .. } => "atlas::region_cap",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            AtlasError::RegionCapExceeded { .. } => Some(Box::new(
                "raise `layout.max_regions` or set `layout.region_cap_policy = \"truncate\"`",
            )),
            _ => None,
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// A reportable error that can be rendered by miette.
///
/// This enum wraps either a parse diagnostic or a non-diagnostic error,
/// providing a uniform interface for error rendering.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A parse error with source location information.
    Parse(ParseAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Parse(p) => fmt::Display::fmt(p, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Parse(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Parse(p) => p.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Parse(p) => p.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Parse(p) => p.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Parse(p) => p.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a byte range to a miette [`SourceSpan`].
fn span_to_miette(span: &Range<usize>) -> SourceSpan {
    SourceSpan::new(span.start.into(), span.len())
}

/// Convert an [`AtlasError`] into a list of reportable errors.
pub fn to_reportables(err: &AtlasError) -> Vec<Reportable<'_>> {
    match err {
        AtlasError::Parse { message, span, src } => vec![Reportable::Parse(ParseAdapter::new(
            message,
            span.as_ref(),
            src,
        ))],
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use atlas::LayoutBuilder;

    use super::*;

    #[test]
    fn test_parse_error_has_label() {
        let builder = LayoutBuilder::default();
        let err = builder.parse("[[nodes]]\nid = 42\n").unwrap_err();

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);

        match &reportables[0] {
            Reportable::Parse(p) => {
                let labels: Vec<_> = p.labels().unwrap().collect();
                assert_eq!(labels.len(), 1);
                assert!(labels[0].primary());
                assert_eq!(p.code().unwrap().to_string(), "atlas::parse");
            }
            Reportable::Error(_) => panic!("Expected Parse"),
        }
    }

    #[test]
    fn test_parse_error_without_span() {
        let err = AtlasError::Parse {
            message: "broken".to_string(),
            span: None,
            src: String::new(),
        };

        let reportables = to_reportables(&err);
        assert_eq!(reportables[0].to_string(), "broken");
        assert!(reportables[0].labels().is_none());
    }

    #[test]
    fn test_non_parse_error() {
        let err = AtlasError::InvalidInput("duplicate node id `a`".to_string());

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 1);
        match &reportables[0] {
            Reportable::Error(e) => {
                assert_eq!(e.to_string(), "Invalid input: duplicate node id `a`");
                assert_eq!(e.code().unwrap().to_string(), "atlas::input");
            }
            Reportable::Parse(_) => panic!("Expected Error"),
        }
    }

    #[test]
    fn test_region_cap_has_help() {
        let err = AtlasError::RegionCapExceeded {
            cap: 2,
            remaining: 7,
        };

        let reportables = to_reportables(&err);
        assert!(reportables[0].help().is_some());
        assert_eq!(
            reportables[0].to_string(),
            "Region cap of 2 reached with 7 node(s) still unplaced"
        );
    }
}
