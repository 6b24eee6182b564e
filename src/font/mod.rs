//! # Font Management
//!
//! The fonts a document may use and the text measurement built on them.
//!
//! Only standard PDF Type1 fonts are supported. They are referenced by name
//! rather than embedded as font programs, and their advance widths are known
//! ahead of time, which keeps measurement exact and independent of the host.
//! There is no substitution: asking for a font that was never registered is a
//! configuration error.

pub mod metrics;

pub use metrics::StandardFontMetrics;

use crate::error::RenderError;

/// Font used for values and captions.
pub const REGULAR: &str = "Helvetica";
/// Font used for titles and labels.
pub const BOLD: &str = "Helvetica-Bold";

/// The standard PDF fonts with built-in metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    Courier,
    CourierBold,
}

impl StandardFont {
    /// The PDF name for this font. Also used as its font id.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica => &metrics::HELVETICA,
            Self::HelveticaBold => &metrics::HELVETICA_BOLD,
            Self::Courier | Self::CourierBold => &metrics::COURIER,
        }
    }
}

/// The fonts registered for one document, in registration order.
///
/// Order matters: the PDF writer names resources `/F0`, `/F1`, ... by
/// position, so two registries built the same way serialize identically.
#[derive(Debug, Clone)]
pub struct FontRegistry {
    fonts: Vec<StandardFont>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    /// The regular + bold pair every report document uses.
    pub fn new() -> Self {
        Self {
            fonts: vec![StandardFont::Helvetica, StandardFont::HelveticaBold],
        }
    }

    pub fn empty() -> Self {
        Self { fonts: Vec::new() }
    }

    /// Register a font. Registering the same font twice is a no-op.
    pub fn register(&mut self, font: StandardFont) {
        if !self.fonts.contains(&font) {
            self.fonts.push(font);
        }
    }

    /// Look up a font by id. No fallback.
    pub fn resolve(&self, font_id: &str) -> Result<StandardFont, RenderError> {
        self.fonts
            .iter()
            .copied()
            .find(|f| f.pdf_name() == font_id)
            .ok_or_else(|| RenderError::UnknownFont {
                font: font_id.to_string(),
                registered: self.names().join(", "),
            })
    }

    /// Position of a font in the registry, i.e. its `/F<n>` resource index.
    pub fn index_of(&self, font_id: &str) -> Result<usize, RenderError> {
        let font = self.resolve(font_id)?;
        Ok(self
            .fonts
            .iter()
            .position(|f| *f == font)
            .unwrap_or_default())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.fonts.iter().map(|f| f.pdf_name()).collect()
    }

    /// Iterate over all registered fonts.
    pub fn iter(&self) -> impl Iterator<Item = &StandardFont> {
        self.fonts.iter()
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

/// Shared font context used by layout and PDF serialization.
/// Provides text measurement with real glyph metrics.
#[derive(Debug, Clone, Default)]
pub struct FontContext {
    registry: FontRegistry,
}

impl FontContext {
    pub fn new() -> Self {
        Self {
            registry: FontRegistry::new(),
        }
    }

    pub fn with_registry(registry: FontRegistry) -> Self {
        Self { registry }
    }

    /// Measure the rendered width of a string in points.
    pub fn measure(&self, text: &str, font_id: &str, font_size: f64) -> Result<f64, RenderError> {
        let font = self.registry.resolve(font_id)?;
        Ok(font.metrics().measure_string(text, font_size))
    }

    pub fn resolve(&self, font_id: &str) -> Result<StandardFont, RenderError> {
        self.registry.resolve(font_id)
    }

    /// Access the underlying font registry.
    pub fn registry(&self) -> &FontRegistry {
        &self.registry
    }
}
