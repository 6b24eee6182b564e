//! HTTP-shaped delivery of rendered documents.
//!
//! Framework-agnostic: [`serve_report`] returns the body and headers, and
//! [`ServeError::status_code`] tells the caller which status to send.

use thiserror::Error;
use tracing::{error, warn};

use crate::assembler::DocumentAssembler;
use crate::error::RenderError;
use crate::store::{lookup, ReportStore, StoreError};
use crate::template::DocumentTemplate;

pub const CONTENT_TYPE: &str = "application/pdf";

/// How the browser should treat the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Save as `report-<code>.pdf`.
    Attachment { tracking_code: String },
    /// Display in the browser as `report.pdf`.
    Inline,
}

impl Disposition {
    pub fn header_value(&self) -> String {
        match self {
            Self::Attachment { tracking_code } => {
                format!("attachment; filename=\"report-{}.pdf\"", sanitize_filename(tracking_code))
            }
            Self::Inline => "inline; filename=\"report.pdf\"".to_string(),
        }
    }
}

/// A rendered document and the headers to send with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfResponse {
    pub body: Vec<u8>,
    pub disposition: Disposition,
}

impl PdfResponse {
    pub fn new(body: Vec<u8>, disposition: Disposition) -> Self {
        Self { body, disposition }
    }

    pub fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }

    pub fn content_length(&self) -> usize {
        self.body.len()
    }

    /// Header name/value pairs in a stable order.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Content-Type", CONTENT_TYPE.to_string()),
            ("Content-Disposition", self.disposition.header_value()),
            ("Content-Length", self.content_length().to_string()),
        ]
    }
}

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("report not found")]
    NotFound,

    #[error("failed to generate PDF: {0}")]
    Render(#[from] RenderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServeError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Render(_) => 500,
            Self::Store(_) => 503,
        }
    }
}

/// Look up a report and render it.
///
/// `download` selects an attachment named after the tracking code;
/// otherwise the document is served inline.
pub fn serve_report(
    store: &dyn ReportStore,
    assembler: &DocumentAssembler,
    code: &str,
    template: &DocumentTemplate,
    download: bool,
) -> Result<PdfResponse, ServeError> {
    let report = match lookup(store, code) {
        Ok(Some(report)) => report,
        Ok(None) => {
            warn!(code, "report not found");
            return Err(ServeError::NotFound);
        }
        Err(e) => {
            error!(code, error = %e, "report lookup failed");
            return Err(e.into());
        }
    };

    let body = assembler
        .render_with_template(&report, template)
        .map_err(|e| {
            error!(code, error = %e, "render failed");
            ServeError::from(e)
        })?;

    let disposition = if download {
        Disposition::Attachment {
            tracking_code: report.tracking_code().to_string(),
        }
    } else {
        Disposition::Inline
    };
    Ok(PdfResponse::new(body, disposition))
}

/// Keep header-safe filename characters only.
fn sanitize_filename(code: &str) -> String {
    code.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
