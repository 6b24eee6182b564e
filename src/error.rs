//! Structured error types for the report renderer.
//!
//! Rendering failures ([`RenderError`]) are kept apart from payload decoding
//! failures ([`PayloadError`]) so that a scanning client can tell a damaged
//! QR code from a server-side problem.

use thiserror::Error;

/// The error type returned by every rendering entry point.
///
/// Rendering is all-or-nothing: when one of these is returned, no partial
/// PDF bytes exist.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A font identifier is not one of the registered fonts. This is a
    /// configuration problem, not a data problem, and retrying cannot fix it.
    #[error("unknown font '{font}' (registered: {registered})")]
    UnknownFont { font: String, registered: String },

    /// The QR payload could not be turned into a raster.
    #[error("QR encoding failed: {0}")]
    QrEncoding(String),

    /// An image could not be decoded for embedding.
    #[error("image error: {0}")]
    Image(String),

    /// The PDF serializer failed.
    #[error("PDF generation failed: {0}")]
    Pdf(String),

    /// Report JSON handed to [`crate::render_json`] did not parse.
    #[error("failed to parse report: {0}")]
    Parse(#[from] serde_json::Error),
}

impl RenderError {
    /// True for failures caused by how the renderer is set up rather than by
    /// the record being rendered.
    pub fn is_configuration(&self) -> bool {
        matches!(self, RenderError::UnknownFont { .. })
    }
}

/// A scanned QR payload failed validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    /// Not JSON, not an object, or fields of the wrong type.
    #[error("invalid payload: {0}")]
    Malformed(String),

    /// The payload declares a schema version this build does not know.
    #[error("invalid payload: unsupported version {0}")]
    UnsupportedVersion(u64),

    /// A declared field is present but its value is unusable.
    #[error("invalid payload: field '{field}' {reason}")]
    InvalidField { field: &'static str, reason: String },
}
