//! Helvetica glyph widths and line wrapping

/// Millimetres to PDF points.
pub const MM: f32 = 72.0 / 25.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    /// Resource name used in page dictionaries.
    pub fn resource_name(&self) -> &'static [u8] {
        match self {
            Font::Regular => b"F1",
            Font::Bold => b"F2",
        }
    }

    pub fn base_font(&self) -> &'static [u8] {
        match self {
            Font::Regular => b"Helvetica",
            Font::Bold => b"Helvetica-Bold",
        }
    }

    fn ascii_widths(&self) -> &'static [u16; 95] {
        match self {
            Font::Regular => &HELVETICA,
            Font::Bold => &HELVETICA_BOLD,
        }
    }

    /// Advance width in 1/1000 em of one WinAnsi byte.
    pub fn glyph_width(&self, byte: u8) -> u16 {
        match byte {
            0x20..=0x7E => self.ascii_widths()[(byte - 0x20) as usize],
            _ => match self {
                Font::Regular => 556,
                Font::Bold => 611,
            },
        }
    }

    /// Advance width of encoded text in 1/1000 em.
    pub fn units(&self, text: &[u8]) -> u32 {
        text.iter().map(|b| u32::from(self.glyph_width(*b))).sum()
    }

    /// Width of encoded text in millimetres at `size` points.
    pub fn text_width(&self, text: &[u8], size: f32) -> f32 {
        units_to_mm(self.units(text), size)
    }
}

/// Convert a width in 1/1000 em at `size` points to millimetres.
pub fn units_to_mm(units: u32, size: f32) -> f32 {
    units as f32 * size / 1000.0 / MM
}

// AFM advance widths for 0x20..=0x7E.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Greedy word wrap of one encoded paragraph into lines no wider than `max_width` mm.
/// Words longer than a full line are split between characters.
pub fn wrap(text: &[u8], font: Font, size: f32, max_width: f32) -> Vec<Vec<u8>> {
    let space = u32::from(font.glyph_width(b' '));
    let mut lines = Vec::new();
    let mut line: Vec<u8> = Vec::new();
    // Width of `line` so far, kept alongside it.
    let mut line_units = 0u32;

    for word in text.split(|b| *b == b' ').filter(|w| !w.is_empty()) {
        let word_units = font.units(word);
        let candidate = if line.is_empty() {
            word_units
        } else {
            line_units + space + word_units
        };
        if units_to_mm(candidate, size) <= max_width {
            if !line.is_empty() {
                line.push(b' ');
            }
            line.extend_from_slice(word);
            line_units = candidate;
            continue;
        }

        if !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            line_units = 0;
        }
        for &byte in word {
            let glyph = u32::from(font.glyph_width(byte));
            if units_to_mm(line_units + glyph, size) > max_width && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                line_units = 0;
            }
            line.push(byte);
            line_units += glyph;
        }
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        // "Hello" = 722 + 556 + 222 + 222 + 556 = 2278 units
        let width = Font::Regular.text_width(b"Hello", 10.0);
        assert!((width - 22.78 / MM).abs() < 1e-4);
        assert!(Font::Bold.text_width(b"Hello", 10.0) > width);
    }

    #[test]
    fn test_short_text_single_line() {
        let lines = wrap(b"C57BL/6J", Font::Regular, 10.0, 100.0);
        assert_eq!(lines, vec![b"C57BL/6J".to_vec()]);
    }

    #[test]
    fn test_wrap_breaks_on_spaces() {
        let text = b"ruffled fur reduced mobility hunched posture lack of grooming";
        let lines = wrap(text, Font::Regular, 10.0, 40.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(Font::Regular.text_width(line, 10.0) <= 40.0);
            assert!(!line.starts_with(b" "));
        }
        assert_eq!(lines.join(&b' '), text.to_vec());
    }

    #[test]
    fn test_long_word_split() {
        let word = vec![b'W'; 40];
        let lines = wrap(&word, Font::Regular, 10.0, 30.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn test_very_long_word_splits_into_full_lines() {
        let word = vec![b'a'; 20_000];
        let lines = wrap(&word, Font::Regular, 10.0, 50.0);
        assert_eq!(lines.concat(), word);
        let (last, full) = lines.split_last().expect("lines");
        let per_line = full[0].len();
        assert!(full.iter().all(|line| line.len() == per_line));
        assert!(last.len() <= per_line);
        assert!(Font::Regular.text_width(&full[0], 10.0) <= 50.0);
    }

    #[test]
    fn test_units_match_text_width() {
        let text = b"Signs of Distress";
        assert_eq!(
            units_to_mm(Font::Bold.units(text), 10.0),
            Font::Bold.text_width(text, 10.0)
        );
    }

    #[test]
    fn test_empty_paragraph_keeps_one_line() {
        assert_eq!(wrap(b"", Font::Regular, 10.0, 30.0), vec![Vec::<u8>::new()]);
    }
}
