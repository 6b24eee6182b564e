//! # PDF Serializer
//!
//! Takes laid-out pages and writes a PDF 1.7 file.
//!
//! The writer emits raw bytes itself: the subset of PDF a report document
//! needs (Type1 standard fonts, text, one rule, one raster image) is small,
//! and owning every byte keeps the output deterministic. Nothing here reads
//! the clock, so the Info dictionary carries no creation date.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (catalog, pages, fonts, images, content)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```

use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::RenderError;
use crate::font::FontRegistry;
use crate::image_loader::{ImagePixelData, LoadedImage};
use crate::layout::{DrawCommand, LayoutElement, LayoutPage};
use crate::model::Metadata;

const PRODUCER: &str = concat!("report-render ", env!("CARGO_PKG_VERSION"));

pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    /// Index 0 is a placeholder; PDF object numbers start at 1.
    objects: Vec<Vec<u8>>,
    /// Object ids of font dictionaries, in registry order (/F0, /F1, ...).
    font_objects: Vec<usize>,
}

impl PdfBuilder {
    fn push(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(data);
        self.objects.len() - 1
    }

    fn push_stream(&mut self, dict_entries: &str, payload: &[u8]) -> usize {
        let mut data: Vec<u8> = Vec::new();
        let _ = write!(
            data,
            "<< {} /Length {} >>\nstream\n",
            dict_entries,
            payload.len()
        );
        data.extend_from_slice(payload);
        data.extend_from_slice(b"\nendstream");
        self.push(data)
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write laid-out pages to a PDF byte vector.
    pub fn write(
        &self,
        pages: &[LayoutPage],
        metadata: &Metadata,
        fonts: &FontRegistry,
    ) -> Result<Vec<u8>, RenderError> {
        if fonts.is_empty() {
            return Err(RenderError::Pdf("no fonts registered".to_string()));
        }

        let mut builder = PdfBuilder {
            // 0 = placeholder, 1 = Catalog, 2 = Pages (page tree root)
            objects: vec![Vec::new(), Vec::new(), Vec::new()],
            font_objects: Vec::new(),
        };

        for font in fonts.iter() {
            let font_dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                 /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            let id = builder.push(font_dict.into_bytes());
            builder.font_objects.push(id);
        }

        let mut page_obj_ids: Vec<usize> = Vec::new();

        for page in pages {
            let mut image_ids: Vec<usize> = Vec::new();
            for element in &page.elements {
                if let DrawCommand::Image { image_data } = &element.draw {
                    image_ids.push(Self::write_image_xobject(&mut builder, image_data));
                }
            }

            let content = self.build_content_stream(page, fonts)?;
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);
            let content_obj_id = builder.push_stream("/Filter /FlateDecode", &compressed);

            let font_resources = builder
                .font_objects
                .iter()
                .enumerate()
                .map(|(i, id)| format!("/F{} {} 0 R", i, id))
                .collect::<Vec<_>>()
                .join(" ");
            let resources = if image_ids.is_empty() {
                format!("/Font << {} >>", font_resources)
            } else {
                let xobjects = image_ids
                    .iter()
                    .enumerate()
                    .map(|(i, id)| format!("/Im{} {} 0 R", i, id))
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("/Font << {} >> /XObject << {} >>", font_resources, xobjects)
            };

            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                format_number(page.width),
                format_number(page.height),
                content_obj_id,
                resources
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1] = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let mut info = String::from("<< ");
        if let Some(ref title) = metadata.title {
            let _ = write!(info, "/Title ({}) ", Self::encode_winansi(title));
        }
        if let Some(ref subject) = metadata.subject {
            let _ = write!(info, "/Subject ({}) ", Self::encode_winansi(subject));
        }
        let _ = write!(info, "/Producer ({}) >>", PRODUCER);
        let info_obj_id = builder.push(info.into_bytes());

        Ok(Self::serialize(&builder, info_obj_id))
    }

    /// Build the PDF content stream for a single page.
    fn build_content_stream(
        &self,
        page: &LayoutPage,
        fonts: &FontRegistry,
    ) -> Result<String, RenderError> {
        let mut stream = String::new();
        let mut image_counter = 0usize;
        for element in &page.elements {
            self.write_element(&mut stream, element, page.height, fonts, &mut image_counter)?;
        }
        Ok(stream)
    }

    /// Write a single layout element as PDF operators.
    fn write_element(
        &self,
        stream: &mut String,
        element: &LayoutElement,
        page_height: f64,
        fonts: &FontRegistry,
        image_counter: &mut usize,
    ) -> Result<(), RenderError> {
        match &element.draw {
            DrawCommand::Text { lines, color } => {
                let _ = write!(stream, "BT\n{:.3} {:.3} {:.3} rg\n", color.r, color.g, color.b);
                for line in lines {
                    let font_index = fonts.index_of(&line.font)?;
                    let _ = write!(
                        stream,
                        "/F{} {} Tf\n1 0 0 1 {:.2} {:.2} Tm\n({}) Tj\n",
                        font_index,
                        format_number(line.font_size),
                        line.x,
                        page_height - line.y,
                        Self::encode_winansi(&line.text)
                    );
                }
                let _ = write!(stream, "ET\n");
            }

            DrawCommand::Line { thickness, color } => {
                let y = page_height - element.y;
                let _ = write!(
                    stream,
                    "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                    color.r,
                    color.g,
                    color.b,
                    thickness,
                    element.x,
                    y,
                    element.x + element.width,
                    y
                );
            }

            DrawCommand::Image { .. } => {
                let y = page_height - element.y - element.height;
                let _ = write!(
                    stream,
                    "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                    element.width, element.height, element.x, y, image_counter
                );
                *image_counter += 1;
            }
        }
        Ok(())
    }

    /// Write a single image as one or two XObject PDF objects.
    /// Returns the main XObject ID.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Gray(pixels) => {
                let compressed = compress_to_vec_zlib(pixels, 6);
                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace /DeviceGray /BitsPerComponent 8 /Filter /FlateDecode",
                    image.width_px, image.height_px
                );
                builder.push_stream(&dict, &compressed)
            }
            ImagePixelData::Rgb { rgb, alpha } => {
                // Write SMask first if alpha channel exists
                let smask_id = alpha.as_ref().map(|alpha_data| {
                    let compressed_alpha = compress_to_vec_zlib(alpha_data, 6);
                    let dict = format!(
                        "/Type /XObject /Subtype /Image /Width {} /Height {} \
                         /ColorSpace /DeviceGray /BitsPerComponent 8 /Filter /FlateDecode",
                        image.width_px, image.height_px
                    );
                    builder.push_stream(&dict, &compressed_alpha)
                });
                let compressed_rgb = compress_to_vec_zlib(rgb, 6);
                let smask_ref = smask_id
                    .map(|id| format!(" /SMask {} 0 R", id))
                    .unwrap_or_default();
                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode{}",
                    image.width_px, image.height_px, smask_ref
                );
                builder.push_stream(&dict, &compressed_rgb)
            }
        }
    }

    /// Encode text for a WinAnsi Type1 font as the body of a PDF string.
    fn encode_winansi(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            let b = Self::unicode_to_winansi(ch).unwrap_or(b'?');
            match b {
                b'\\' => out.push_str("\\\\"),
                b'(' => out.push_str("\\("),
                b')' => out.push_str("\\)"),
                0x20..=0x7E => out.push(b as char),
                _ => {
                    // Octal escape for bytes outside the printable ASCII range
                    let _ = write!(out, "\\{:03o}", b);
                }
            }
        }
        out
    }

    /// Map a Unicode codepoint to a WinAnsiEncoding byte value.
    ///
    /// WinAnsiEncoding is based on Windows-1252. Most codepoints in
    /// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
    /// contains special mappings for smart quotes, bullets, dashes, etc.
    fn unicode_to_winansi(ch: char) -> Option<u8> {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
            return Some(cp as u8);
        }
        match cp {
            0x20AC => Some(0x80), // Euro sign
            0x201A => Some(0x82), // Single low-9 quotation mark
            0x0192 => Some(0x83), // Latin small letter f with hook
            0x201E => Some(0x84), // Double low-9 quotation mark
            0x2026 => Some(0x85), // Horizontal ellipsis
            0x2020 => Some(0x86), // Dagger
            0x2021 => Some(0x87), // Double dagger
            0x02C6 => Some(0x88), // Modifier letter circumflex accent
            0x2030 => Some(0x89), // Per mille sign
            0x0160 => Some(0x8A), // Latin capital letter S with caron
            0x2039 => Some(0x8B), // Single left-pointing angle quotation
            0x0152 => Some(0x8C), // Latin capital ligature OE
            0x017D => Some(0x8E), // Latin capital letter Z with caron
            0x2018 => Some(0x91), // Left single quotation mark
            0x2019 => Some(0x92), // Right single quotation mark
            0x201C => Some(0x93), // Left double quotation mark
            0x201D => Some(0x94), // Right double quotation mark
            0x2022 => Some(0x95), // Bullet
            0x2013 => Some(0x96), // En dash
            0x2014 => Some(0x97), // Em dash
            0x02DC => Some(0x98), // Small tilde
            0x2122 => Some(0x99), // Trade mark sign
            0x0161 => Some(0x9A), // Latin small letter s with caron
            0x203A => Some(0x9B), // Single right-pointing angle quotation
            0x0153 => Some(0x9C), // Latin small ligature oe
            0x017E => Some(0x9E), // Latin small letter z with caron
            0x0178 => Some(0x9F), // Latin capital letter Y with diaeresis
            _ => None,
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        // Header
        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(obj);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}

/// Integral values print without a fraction (`595`), others with two places.
fn format_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{:.2}", v)
    }
}
