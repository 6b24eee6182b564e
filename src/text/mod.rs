//! # Text Layout
//!
//! Greedy word wrapping on top of the font metrics in [`FontContext`].
//!
//! Lines only ever break between whitespace-separated words. A word that is
//! wider than the available width is placed alone on its own line, unsplit:
//! no hyphenation and no character-level breaking.

use crate::error::RenderError;
use crate::font::FontContext;

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenLine {
    pub text: String,
    /// Measured width in points.
    pub width: f64,
}

pub struct LineWrapper;

impl Default for LineWrapper {
    fn default() -> Self {
        Self::new()
    }
}

impl LineWrapper {
    pub fn new() -> Self {
        Self
    }

    /// Break `text` into lines no wider than `max_width`, where possible.
    ///
    /// Each word is appended to the current line if the candidate line still
    /// fits; otherwise the current line is committed and the word starts a new
    /// one. Empty or whitespace-only text produces no lines.
    pub fn wrap(
        &self,
        font_context: &FontContext,
        text: &str,
        max_width: f64,
        font_id: &str,
        font_size: f64,
    ) -> Result<Vec<BrokenLine>, RenderError> {
        // Resolve up front so an unknown font fails even for empty text.
        font_context.resolve(font_id)?;

        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0;

        for word in text.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            let candidate_width = font_context.measure(&candidate, font_id, font_size)?;

            if candidate_width <= max_width {
                current = candidate;
                current_width = candidate_width;
                continue;
            }

            if !current.is_empty() {
                lines.push(BrokenLine {
                    text: std::mem::take(&mut current),
                    width: current_width,
                });
            }
            current_width = font_context.measure(word, font_id, font_size)?;
            current = word.to_string();
        }

        if !current.is_empty() {
            lines.push(BrokenLine {
                text: current,
                width: current_width,
            });
        }

        Ok(lines)
    }
}

/// Convenience wrapper returning just the line strings.
pub fn wrap(
    font_context: &FontContext,
    text: &str,
    max_width: f64,
    font_id: &str,
    font_size: f64,
) -> Result<Vec<String>, RenderError> {
    Ok(LineWrapper::new()
        .wrap(font_context, text, max_width, font_id, font_size)?
        .into_iter()
        .map(|line| line.text)
        .collect())
}
