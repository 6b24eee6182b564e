//! # Page Layout
//!
//! Places a report onto a single fixed-size page.
//!
//! The engine keeps one piece of state: a vertical cursor, measured downward
//! from the top page edge. The title and separator sit at fixed positions;
//! then each field is drawn at the cursor and the cursor moves down by the
//! field's wrapped height plus the field gap. The cursor never moves up.
//!
//! There is no pagination. A report whose fields run past the bottom edge is
//! laid out below the visible page area rather than continued on a new page.
//!
//! Coordinates here are top-down; the PDF writer flips them into PDF user
//! space (origin at the bottom-left) when it serializes the page.

use crate::error::RenderError;
use crate::font::FontContext;
use crate::image_loader::LoadedImage;
use crate::model::{FieldKind, ReportRecord, RenderField};
use crate::template::{DocumentTemplate, QrPlacement, TitleAlign};
use crate::text::LineWrapper;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
}

/// A fully laid-out page ready for PDF serialization.
#[derive(Debug, Clone)]
pub struct LayoutPage {
    pub width: f64,
    pub height: f64,
    pub elements: Vec<LayoutElement>,
    /// Where each field landed, in drawing order.
    pub fields: Vec<FieldPlacement>,
}

impl LayoutPage {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            elements: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Iterate over every text line on the page.
    pub fn text_lines(&self) -> impl Iterator<Item = &TextLine> {
        self.elements.iter().flat_map(|e| match &e.draw {
            DrawCommand::Text { lines, .. } => lines.as_slice(),
            _ => &[][..],
        })
    }

    pub fn field(&self, kind: FieldKind) -> Option<&FieldPlacement> {
        self.fields.iter().find(|f| f.kind == kind)
    }
}

/// A positioned element on a page.
#[derive(Debug, Clone)]
pub struct LayoutElement {
    /// Top-left corner.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub draw: DrawCommand,
}

/// What to actually draw for this element.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// Draw text. Each line carries its own baseline position.
    Text { lines: Vec<TextLine>, color: Color },
    /// A horizontal rule along the top edge of the element.
    Line { thickness: f64, color: Color },
    /// Draw an image scaled into the element box.
    Image { image_data: LoadedImage },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub x: f64,
    /// Baseline, measured from the top page edge.
    pub y: f64,
    pub text: String,
    pub font: String,
    pub font_size: f64,
    pub width: f64,
}

/// One wrapped line of a field value and its baseline offset.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSpan {
    pub text: String,
    pub offset: f64,
}

/// Where a field landed and how far it moved the cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPlacement {
    pub kind: FieldKind,
    pub label: &'static str,
    pub cursor_before: f64,
    pub cursor_after: f64,
    pub lines: Vec<LineSpan>,
}

pub struct LayoutEngine {
    wrapper: LineWrapper,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self {
            wrapper: LineWrapper::new(),
        }
    }

    /// Lay out the title, separator, and selected fields of `report`.
    pub fn layout(
        &self,
        report: &ReportRecord,
        template: &DocumentTemplate,
        font_context: &FontContext,
    ) -> Result<LayoutPage, RenderError> {
        let (page_width, page_height) = template.page_size.dimensions();
        let mut page = LayoutPage::new(page_width, page_height);

        self.place_title(&mut page, template, font_context)?;

        if let Some(y) = template.separator {
            page.elements.push(LayoutElement {
                x: template.label_x,
                y,
                width: page_width - template.label_x - template.right_margin,
                height: 0.0,
                draw: DrawCommand::Line {
                    thickness: 1.0,
                    color: Color::BLACK,
                },
            });
        }

        let max_width = template.value_width();
        let mut cursor = template.first_field_top;

        for kind in template.ordered_fields() {
            let field = RenderField::from_report(kind, report);
            cursor = self.place_field(&mut page, &field, cursor, max_width, template, font_context)?;
        }

        Ok(page)
    }

    fn place_title(
        &self,
        page: &mut LayoutPage,
        template: &DocumentTemplate,
        font_context: &FontContext,
    ) -> Result<(), RenderError> {
        let width = font_context.measure(&template.title, &template.bold_font, template.title_size)?;
        let x = match template.title_align {
            TitleAlign::Center => (page.width - width) / 2.0,
            TitleAlign::Left => template.label_x,
        };
        page.elements.push(text_element(
            TextLine {
                x,
                y: template.title_baseline,
                text: template.title.clone(),
                font: template.bold_font.clone(),
                font_size: template.title_size,
                width,
            },
            Vec::new(),
        ));
        Ok(())
    }

    /// Draw one field at `cursor` and return the advanced cursor.
    fn place_field(
        &self,
        page: &mut LayoutPage,
        field: &RenderField,
        cursor: f64,
        max_width: f64,
        template: &DocumentTemplate,
        font_context: &FontContext,
    ) -> Result<f64, RenderError> {
        let label_width = font_context.measure(field.label, &template.bold_font, template.font_size)?;
        page.elements.push(text_element(
            TextLine {
                x: template.label_x,
                y: cursor,
                text: field.label.to_string(),
                font: template.bold_font.clone(),
                font_size: template.font_size,
                width: label_width,
            },
            Vec::new(),
        ));

        let wrapped = self.wrapper.wrap(
            font_context,
            &field.value,
            max_width,
            &template.regular_font,
            template.font_size,
        )?;

        let mut spans = Vec::with_capacity(wrapped.len());
        let mut lines = Vec::with_capacity(wrapped.len());
        for (i, line) in wrapped.into_iter().enumerate() {
            let offset = cursor + i as f64 * template.line_height;
            spans.push(LineSpan {
                text: line.text.clone(),
                offset,
            });
            lines.push(TextLine {
                x: template.value_x,
                y: offset,
                text: line.text,
                font: template.regular_font.clone(),
                font_size: template.font_size,
                width: line.width,
            });
        }
        let mut lines = lines.into_iter();
        if let Some(first) = lines.next() {
            page.elements.push(text_element(first, lines.collect()));
        }

        let advanced = cursor + spans.len() as f64 * template.line_height + template.field_gap;
        page.fields.push(FieldPlacement {
            kind: field.kind,
            label: field.label,
            cursor_before: cursor,
            cursor_after: advanced,
            lines: spans,
        });
        Ok(advanced)
    }
}

/// Place a raster in the bottom-right corner with an optional caption below.
pub fn place_qr_block(
    page: &mut LayoutPage,
    image: LoadedImage,
    placement: &QrPlacement,
    caption_font: &str,
    font_context: &FontContext,
) -> Result<(), RenderError> {
    let width = image.width_px as f64 * placement.scale;
    let height = image.height_px as f64 * placement.scale;
    let x = page.width - width - placement.right_margin;
    let y = page.height - placement.bottom - height;

    page.elements.push(LayoutElement {
        x,
        y,
        width,
        height,
        draw: DrawCommand::Image { image_data: image },
    });

    if let Some(caption) = &placement.caption {
        let caption_width = font_context.measure(caption, caption_font, placement.caption_size)?;
        page.elements.push(text_element(
            TextLine {
                x,
                y: page.height - placement.caption_baseline,
                text: caption.clone(),
                font: caption_font.to_string(),
                font_size: placement.caption_size,
                width: caption_width,
            },
            Vec::new(),
        ));
    }
    Ok(())
}

/// Wrap text lines in one element. The first line fixes the element's top.
fn text_element(first: TextLine, rest: Vec<TextLine>) -> LayoutElement {
    let x = first.x;
    let top = first.y - first.font_size;
    let mut lines = Vec::with_capacity(rest.len() + 1);
    lines.push(first);
    lines.extend(rest);
    let width = lines.iter().map(|l| l.width).fold(0.0, f64::max);
    let bottom = lines.iter().map(|l| l.y).fold(f64::MIN, f64::max);
    LayoutElement {
        x,
        y: top,
        width,
        height: bottom - top,
        draw: DrawCommand::Text {
            lines,
            color: Color::BLACK,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::BOLD;
    use crate::model::ReportStatus;
    use crate::template::DEFAULT_BASE_URL;
    use chrono::{TimeZone, Utc};

    fn report(description: Option<&str>) -> ReportRecord {
        ReportRecord {
            id: "cl0001".to_string(),
            report_id: "R1".to_string(),
            report_type: "THEFT".to_string(),
            status: ReportStatus::Pending,
            title: "Stolen bike".to_string(),
            description: description.map(str::to_string),
            location: Some("Market St".to_string()),
            latitude: None,
            longitude: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: None,
            image: None,
        }
    }

    fn layout(r: &ReportRecord, t: &DocumentTemplate) -> LayoutPage {
        LayoutEngine::new().layout(r, t, &FontContext::new()).unwrap()
    }

    #[test]
    fn test_title_is_centered() {
        let t = DocumentTemplate::detailed(DEFAULT_BASE_URL);
        let page = layout(&report(None), &t);
        let title = page.text_lines().next().unwrap();
        assert_eq!(title.text, "CRIME REPORT DETAILS");
        let expected_width = FontContext::new().measure(&title.text, BOLD, 16.0).unwrap();
        assert!((title.x - (595.0 - expected_width) / 2.0).abs() < 1e-9);
        assert!((title.x + title.width / 2.0 - 297.5).abs() < 1e-9);
    }

    #[test]
    fn test_compact_title_is_left_aligned() {
        let t = DocumentTemplate::compact(DEFAULT_BASE_URL);
        let page = layout(&report(None), &t);
        let title = page.text_lines().next().unwrap();
        assert_eq!(title.x, t.label_x);
        assert_eq!(title.font_size, 24.0);
    }

    #[test]
    fn test_separator_below_title() {
        let t = DocumentTemplate::detailed(DEFAULT_BASE_URL);
        let page = layout(&report(None), &t);
        let sep = page
            .elements
            .iter()
            .find(|e| matches!(e.draw, DrawCommand::Line { .. }))
            .expect("separator");
        assert!(sep.y > t.title_baseline);
        assert_eq!(sep.x, 50.0);
        assert_eq!(sep.x + sep.width, 545.0);
    }

    #[test]
    fn test_fields_in_fixed_order() {
        let page = layout(&report(Some("x")), &DocumentTemplate::default());
        let kinds: Vec<_> = page.fields.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, FieldKind::ALL.to_vec());
    }

    #[test]
    fn test_cursor_never_moves_up() {
        let long = "word ".repeat(120);
        let page = layout(&report(Some(&long)), &DocumentTemplate::default());
        let mut last = f64::MIN;
        for f in &page.fields {
            assert!(f.cursor_before >= last);
            assert!(f.cursor_after >= f.cursor_before);
            last = f.cursor_after;
        }
    }

    #[test]
    fn test_cursor_advance_formula() {
        let t = DocumentTemplate::default();
        let page = layout(&report(Some("short")), &t);
        for f in &page.fields {
            let expected = f.cursor_before + f.lines.len() as f64 * t.line_height + t.field_gap;
            assert_eq!(f.cursor_after, expected);
        }
        let first = &page.fields[0];
        assert_eq!(first.cursor_before, t.first_field_top);
        assert_eq!(first.cursor_after, 100.0 + 25.0 + 10.0);
    }

    #[test]
    fn test_empty_description_advances_by_gap_only() {
        let t = DocumentTemplate::default();
        let page = layout(&report(Some("")), &t);
        let desc = page.field(FieldKind::Description).unwrap();
        assert!(desc.lines.is_empty());
        assert_eq!(desc.cursor_after - desc.cursor_before, t.field_gap);
    }

    #[test]
    fn test_line_spans_step_by_line_height() {
        let long = "This description is long enough that it certainly needs more than a single line of text to fit in the value column.";
        let t = DocumentTemplate::default();
        let page = layout(&report(Some(long)), &t);
        let desc = page.field(FieldKind::Description).unwrap();
        assert!(desc.lines.len() >= 2);
        for (i, span) in desc.lines.iter().enumerate() {
            assert_eq!(span.offset, desc.cursor_before + i as f64 * t.line_height);
        }
    }

    #[test]
    fn test_wrapped_value_is_one_element() {
        let long = "This description is long enough that it certainly needs more than a single line of text to fit in the value column.";
        let t = DocumentTemplate::default();
        let page = layout(&report(Some(long)), &t);
        let desc = page.field(FieldKind::Description).unwrap();
        let element = page
            .elements
            .iter()
            .find(|e| match &e.draw {
                DrawCommand::Text { lines, .. } => lines.len() == desc.lines.len() && lines.len() > 1,
                _ => false,
            })
            .expect("description element");
        let last = desc.lines.last().unwrap().offset;
        assert_eq!(element.x, t.value_x);
        assert_eq!(element.y, desc.cursor_before - t.font_size);
        assert_eq!(element.y + element.height, last);
    }

    #[test]
    fn test_overflow_is_not_paginated() {
        let huge = "overflow ".repeat(2000);
        let page = layout(&report(Some(&huge)), &DocumentTemplate::default());
        let desc = page.field(FieldKind::Description).unwrap();
        assert!(desc.cursor_after > page.height);
    }

    #[test]
    fn test_unknown_font_in_template_fails() {
        let mut t = DocumentTemplate::default();
        t.regular_font = "Papyrus".to_string();
        let err = LayoutEngine::new()
            .layout(&report(None), &t, &FontContext::new())
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_qr_block_bottom_right() {
        use crate::image_loader::{ImagePixelData, LoadedImage};
        let mut page = LayoutPage::new(595.0, 842.0);
        let image = LoadedImage {
            pixel_data: ImagePixelData::Gray(vec![255; 200 * 200]),
            width_px: 200,
            height_px: 200,
        };
        let placement = QrPlacement::tracking(DEFAULT_BASE_URL);
        place_qr_block(&mut page, image, &placement, crate::font::REGULAR, &FontContext::new())
            .unwrap();

        let img = &page.elements[0];
        assert_eq!((img.width, img.height), (100.0, 100.0));
        assert_eq!(img.x, 595.0 - 100.0 - 50.0);
        assert_eq!(img.y + img.height, 842.0 - 50.0);

        let caption = page.text_lines().next().unwrap();
        assert_eq!(caption.text, "Scan to track report status");
        assert!(caption.y > img.y + img.height, "caption sits beneath the image");
    }
}
