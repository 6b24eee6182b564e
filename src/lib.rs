//! # Report Render
//!
//! Renders incident reports into single-page PDF documents.
//!
//! A report comes in as a borrowed [`model::ReportRecord`]; a PDF comes out
//! as bytes. Rendering is pure: the same report and template always produce
//! byte-identical output, and nothing here touches the clock, the network,
//! or global state. Looking a report up and sending the bytes somewhere are
//! the caller's business ([`store`] and [`dispatch`] show one way to do it).
//!
//! ## Architecture
//!
//! ```text
//! ReportRecord + DocumentTemplate
//!       ↓
//!   [font]      - Standard font metrics, string widths
//!       ↓
//!   [text]      - Greedy word wrapping against a width budget
//!       ↓
//!   [layout]    - Title, separator, fields, QR block on one page
//!       ↓         ↖
//!       ↓          [qr]  - Tracking payload → QR matrix → PNG
//!       ↓
//!   [pdf]       - Serialize to PDF bytes
//! ```
//!
//! [`assembler::DocumentAssembler`] drives the whole pipeline.

pub mod assembler;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod qr;
pub mod retry;
pub mod store;
pub mod template;
pub mod text;

use assembler::DocumentAssembler;
use error::RenderError;
use model::ReportRecord;
use template::DocumentTemplate;

/// Render a report to PDF bytes.
///
/// This is the primary entry point. The template decides the title, the
/// fields shown, and where the tracking QR code points.
pub fn render(report: &ReportRecord, template: &DocumentTemplate) -> Result<Vec<u8>, RenderError> {
    DocumentAssembler::default().render_with_template(report, template)
}

/// Render a report described as JSON to PDF bytes.
pub fn render_json(json: &str, template: &DocumentTemplate) -> Result<Vec<u8>, RenderError> {
    let report: ReportRecord = serde_json::from_str(json)?;
    render(&report, template)
}
