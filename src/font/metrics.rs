//! Advance widths for the standard PDF fonts the renderer registers.
//!
//! Values come from the Adobe Font Metrics (AFM) files shipped with the base
//! 14 fonts, in units of 1/1000 em. Only the printable ASCII range is tabled;
//! anything else falls back to the font's default advance.

/// Glyph advance table for one standard font.
#[derive(Debug, Clone, Copy)]
pub struct StandardFontMetrics {
    /// Advances for U+0020..=U+007E.
    widths: &'static [u16; 95],
    /// Advance used for characters outside the table.
    default_width: u16,
}

impl StandardFontMetrics {
    /// Advance of a single character in font units.
    pub fn char_units(&self, ch: char) -> u16 {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) {
            self.widths[(cp - 0x20) as usize]
        } else if cp == 0xA0 {
            // No-break space renders like a space.
            self.widths[0]
        } else {
            self.default_width
        }
    }

    /// Sum of advances in font units. Integer so that the result does not
    /// depend on summation order.
    pub fn string_units(&self, text: &str) -> u64 {
        text.chars().map(|ch| self.char_units(ch) as u64).sum()
    }

    /// Width of a string in points.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        self.string_units(text) as f64 * font_size / 1000.0
    }
}

pub static HELVETICA: StandardFontMetrics = StandardFontMetrics {
    widths: &[
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
        278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
        278, 278, 278, 469, 556, 333, // '['..'`'
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
        334, 260, 334, 584, // '{'..'~'
    ],
    default_width: 556,
};

pub static HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics {
    widths: &[
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
        333, 333, 584, 584, 584, 611, 975, // ':'..'@'
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A'..'M'
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
        333, 278, 333, 584, 556, 333, // '['..'`'
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a'..'m'
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n'..'z'
        389, 280, 389, 584, // '{'..'~'
    ],
    default_width: 611,
};

/// Courier is monospaced; every glyph advances 600 units.
pub static COURIER: StandardFontMetrics = StandardFontMetrics {
    widths: &[600; 95],
    default_width: 600,
};
