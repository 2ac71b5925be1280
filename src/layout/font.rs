//! Font metrics for the text-metrics measurer

/// Glyph advances expressed as fractions of an em
#[derive(Debug, Clone)]
pub struct FontMetrics {
    /// Advance of ASCII characters (0-127)
    pub char_widths: Vec<f32>,
    /// Advance for other narrow characters
    pub default_width: f32,
    /// Advance for wide East Asian characters
    pub wide_width: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        // Rough proportional sans-serif advances
        let mut char_widths = vec![0.55; 128];
        for (c, width) in char_widths.iter_mut().enumerate() {
            *width = match c as u8 {
                b' ' => 0.28,
                b'i' | b'j' | b'l' | b'I' | b'!' | b'.' | b',' | b':' | b';' | b'\'' | b'|' => 0.25,
                b'f' | b't' | b'r' | b'(' | b')' | b'[' | b']' | b'-' => 0.35,
                b'm' | b'w' | b'M' | b'W' | b'@' => 0.85,
                b'A'..=b'Z' => 0.65,
                b'a'..=b'z' => 0.5,
                b'0'..=b'9' => 0.55,
                0..=31 | 127 => 0.0,
                _ => 0.55,
            };
        }

        Self {
            char_widths,
            default_width: 0.6,
            wide_width: 1.0,
        }
    }
}

impl FontMetrics {
    pub fn new(char_widths: Vec<f32>, default_width: f32, wide_width: f32) -> Self {
        Self {
            char_widths,
            default_width,
            wide_width,
        }
    }

    /// Every glyph takes the same advance
    pub fn monospace(width: f32) -> Self {
        let mut char_widths = vec![width; 128];
        for control in char_widths.iter_mut().take(32) {
            *control = 0.0;
        }
        Self {
            char_widths,
            default_width: width,
            wide_width: width * 2.0,
        }
    }

    /// Advance of a character in em
    pub fn width(&self, c: char) -> f32 {
        if c.is_ascii() {
            if let Some(w) = self.char_widths.get(c as usize) {
                return *w;
            }
        }
        if c.is_control() {
            0.0
        } else if is_wide(c) {
            self.wide_width
        } else {
            self.default_width
        }
    }
}

/// CJK ideographs, kana, hangul and full-width forms
pub fn is_wide(c: char) -> bool {
    matches!(
        c as u32,
        0x1100..=0x115F
            | 0x2E80..=0x303E
            | 0x3041..=0x33FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xA000..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
            | 0x20000..=0x3FFFD
    )
}
