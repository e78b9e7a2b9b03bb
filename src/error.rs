//! Error types for the invoice rendering pipeline.
//!
//! Three categories the calling layer needs to tell apart – malformed
//! layout structure, missing content inputs, and backend rejection of the
//! composed document – plus an umbrella [`PipelineError`] that everything
//! propagates through. No failure is swallowed inside the crate; a render
//! either fully succeeds or returns one of these.

use thiserror::Error;

/// The layout specification is structurally malformed.
///
/// Missing optional fields are never an error (they resolve to defaults);
/// only shape mismatches land here.
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("layout must be a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error("`columns` must be an array of objects: {0}")]
    BadColumns(String),
    #[error("layout field `{field}` has the wrong shape: {message}")]
    BadField { field: &'static str, message: String },
}

/// Required content inputs are absent or not iterable.
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("invoice record is missing")]
    MissingInvoice,
    #[error("invoice must be a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error("`line_items` must be an array: {0}")]
    BadLineItems(String),
}

/// The rendering backend rejected the composed markup or stylesheet.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid color value `{value}` in property `{property}`")]
    InvalidColor { property: String, value: String },
    #[error("stylesheet error: {0}")]
    Stylesheet(String),
    #[error("document produced no content")]
    EmptyDocument,
    #[error("PDF encoding failed: {0}")]
    Pdf(String),
}

/// The main error enum for all high-level operations in the crate.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("context error: {0}")]
    Context(#[from] ContextError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Other(String),
}

impl PipelineError {
    /// True when the failure maps to a "not found"-style signal for the
    /// calling layer (missing template or invoice data), as opposed to an
    /// "unprocessable" one (malformed layout, backend rejection).
    pub fn is_missing_input(&self) -> bool {
        matches!(self, PipelineError::Context(ContextError::MissingInvoice))
    }
}
