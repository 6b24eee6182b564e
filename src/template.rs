//! Document templates.
//!
//! A [`DocumentTemplate`] describes everything about a report document that
//! is not the report itself: page size, title, which fields appear, the
//! column and spacing geometry, and whether a tracking QR code is placed.
//! The detailed download and the compact QR sheet are two presets of the
//! same template, rendered by the same assembler.

use serde::{Deserialize, Serialize};

use crate::font;
use crate::model::{FieldKind, PageSize};

/// Base URL used when no deployment URL is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Caption drawn beneath the QR code.
pub const QR_CAPTION: &str = "Scan to track report status";

/// Named template presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Full A4 layout with every field and wrapped values.
    #[default]
    Detailed,
    /// Large title, short field list, QR-centric.
    Compact,
}

impl std::str::FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "detailed" => Ok(Self::Detailed),
            "compact" => Ok(Self::Compact),
            other => Err(format!(
                "unknown render mode '{other}' (expected 'detailed' or 'compact')"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleAlign {
    #[default]
    Center,
    /// Flush with the label column.
    Left,
}

/// What the QR code encodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum QrContent {
    /// `<base_url>/track-report?reportId=<code>`
    TrackingUrl { base_url: String },
    /// The versioned compact record payload.
    RecordPayload,
}

/// QR code placement in the bottom-right corner of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPlacement {
    pub content: QrContent,
    /// Applied to the raster's pixel size to get its size in points.
    pub scale: f64,
    /// Distance from the right page edge.
    pub right_margin: f64,
    /// Distance from the bottom page edge to the bottom of the image.
    pub bottom: f64,
    pub caption: Option<String>,
    /// Distance from the bottom page edge to the caption baseline.
    pub caption_baseline: f64,
    pub caption_size: f64,
}

impl QrPlacement {
    pub fn tracking(base_url: &str) -> Self {
        Self {
            content: QrContent::TrackingUrl {
                base_url: base_url.to_string(),
            },
            scale: 0.5,
            right_margin: 50.0,
            bottom: 50.0,
            caption: Some(QR_CAPTION.to_string()),
            caption_baseline: 30.0,
            caption_size: 10.0,
        }
    }
}

/// Everything that shapes a report document apart from the report.
///
/// All vertical positions are measured downward from the top page edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTemplate {
    pub page_size: PageSize,
    pub title: String,
    pub title_size: f64,
    pub title_align: TitleAlign,
    /// Baseline of the title.
    pub title_baseline: f64,
    /// Separator line position, or `None` for no separator.
    pub separator: Option<f64>,
    /// Fields to show. Always drawn in [`FieldKind`] order.
    pub fields: Vec<FieldKind>,
    pub font_size: f64,
    pub label_x: f64,
    pub value_x: f64,
    pub right_margin: f64,
    /// Baseline of the first field.
    pub first_field_top: f64,
    pub line_height: f64,
    pub field_gap: f64,
    pub regular_font: String,
    pub bold_font: String,
    pub qr: Option<QrPlacement>,
}

impl DocumentTemplate {
    pub fn for_mode(mode: RenderMode, base_url: &str) -> Self {
        match mode {
            RenderMode::Detailed => Self::detailed(base_url),
            RenderMode::Compact => Self::compact(base_url),
        }
    }

    /// A4, centered title, every field, wrapped values, tracking QR.
    pub fn detailed(base_url: &str) -> Self {
        Self {
            page_size: PageSize::A4,
            title: "CRIME REPORT DETAILS".to_string(),
            title_size: 16.0,
            title_align: TitleAlign::Center,
            title_baseline: 50.0,
            separator: Some(70.0),
            fields: FieldKind::ALL.to_vec(),
            font_size: 12.0,
            label_x: 50.0,
            value_x: 160.0,
            right_margin: 50.0,
            first_field_top: 100.0,
            line_height: 25.0,
            field_gap: 10.0,
            regular_font: font::REGULAR.to_string(),
            bold_font: font::BOLD.to_string(),
            qr: Some(QrPlacement::tracking(base_url)),
        }
    }

    /// Large left-aligned title, every field on tight lines, tracking QR.
    pub fn compact(base_url: &str) -> Self {
        Self {
            title: "Crime Report".to_string(),
            title_size: 24.0,
            title_align: TitleAlign::Left,
            separator: None,
            fields: vec![
                FieldKind::ReportId,
                FieldKind::Type,
                FieldKind::Status,
                FieldKind::Date,
                FieldKind::Location,
                FieldKind::Description,
            ],
            line_height: 20.0,
            field_gap: 0.0,
            ..Self::detailed(base_url)
        }
    }

    /// The selected fields, deduplicated, in display order.
    pub fn ordered_fields(&self) -> Vec<FieldKind> {
        let mut fields = self.fields.clone();
        fields.sort();
        fields.dedup();
        fields
    }

    /// Width available to a wrapped value.
    pub fn value_width(&self) -> f64 {
        let (page_width, _) = self.page_size.dimensions();
        page_width - self.value_x - self.right_margin
    }

    pub fn without_qr(mut self) -> Self {
        self.qr = None;
        self
    }
}

impl Default for DocumentTemplate {
    fn default() -> Self {
        Self::detailed(DEFAULT_BASE_URL)
    }
}
