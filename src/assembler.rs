//! # Document Assembly
//!
//! Composes one report document: fonts, layout, optional QR block, PDF bytes.
//! Every step either succeeds or the whole render fails; no partial buffer
//! ever leaves this module.

use tracing::{debug, info, info_span};

use crate::error::RenderError;
use crate::font::FontContext;
use crate::image_loader::decode_png;
use crate::layout::{place_qr_block, LayoutEngine};
use crate::model::{Metadata, ReportRecord};
use crate::pdf::PdfWriter;
use crate::qr::{tracking_url, QrEncoder, TrackingPayload};
use crate::template::{DocumentTemplate, QrContent, RenderMode, DEFAULT_BASE_URL};

/// Renders reports to PDF bytes.
///
/// Holds only immutable configuration, so one assembler can be shared
/// between threads and reused for any number of renders.
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    base_url: String,
    fonts: FontContext,
    qr: QrEncoder,
}

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl DocumentAssembler {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            fonts: FontContext::new(),
            qr: QrEncoder::new(),
        }
    }

    /// Use `fonts` instead of the default Helvetica pair. Templates rendered
    /// by this assembler may only name fonts registered here.
    pub fn with_fonts(mut self, fonts: FontContext) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Render with one of the built-in templates.
    pub fn render(&self, report: &ReportRecord, mode: RenderMode) -> Result<Vec<u8>, RenderError> {
        self.render_with_template(report, &DocumentTemplate::for_mode(mode, &self.base_url))
    }

    pub fn render_with_template(
        &self,
        report: &ReportRecord,
        template: &DocumentTemplate,
    ) -> Result<Vec<u8>, RenderError> {
        let span = info_span!("render", report = report.tracking_code(), title = %template.title);
        let _guard = span.enter();

        let engine = LayoutEngine::new();
        let mut page = engine.layout(report, template, &self.fonts)?;
        debug!(fields = page.fields.len(), elements = page.elements.len(), "laid out page");

        if let Some(placement) = &template.qr {
            let payload = match &placement.content {
                QrContent::TrackingUrl { base_url } => {
                    tracking_url(base_url, report.tracking_code())
                }
                QrContent::RecordPayload => TrackingPayload::from_report(report).encode()?,
            };
            let qr = self.qr.encode(&payload)?;
            let image = decode_png(&qr.png)?;
            place_qr_block(&mut page, image, placement, &template.regular_font, &self.fonts)?;
        }

        let metadata = Metadata {
            title: Some(format!("Report {}", report.tracking_code())),
            subject: Some(template.title.clone()),
        };
        let bytes = PdfWriter::new().write(&[page], &metadata, self.fonts.registry())?;
        info!(bytes = bytes.len(), "rendered report");
        Ok(bytes)
    }
}
