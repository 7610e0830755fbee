//! Text preparation for the base-14 PDF fonts
//!
//! Values are typed into free-text fields and routinely contain typographic punctuation
//! pasted from word processors. The standard Helvetica faces only cover WinAnsi, so
//! known characters are replaced with ASCII equivalents first and anything left over
//! outside the code page becomes `?`.

/// Characters replaced before encoding, in the order they are applied.
const SUBSTITUTIONS: &[(char, &str)] = &[
    ('\u{2014}', "-"),  // em dash
    ('\u{2013}', "-"),  // en dash
    ('\u{2012}', "-"),  // figure dash
    ('\u{2022}', "-"),  // bullet
    ('\u{00B7}', "-"),  // middle dot
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{2026}', "..."),
    ('\u{00B5}', "u"),  // micro sign
    ('\u{00B2}', "2"),
    ('\u{00B3}', "3"),
    ('\u{2074}', "4"),
];

pub const REPLACEMENT: u8 = b'?';

/// Replace typographic punctuation with plain ASCII.
pub fn substitute(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match SUBSTITUTIONS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => out.push_str(to),
            None => out.push(c),
        }
    }
    out
}

/// WinAnsi code for a character, if the code page has one.
fn win_ansi_byte(c: char) -> Option<u8> {
    let code = c as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => {
            let byte = match c {
                '\u{20AC}' => 0x80,
                '\u{201A}' => 0x82,
                '\u{0192}' => 0x83,
                '\u{201E}' => 0x84,
                '\u{2026}' => 0x85,
                '\u{2020}' => 0x86,
                '\u{2021}' => 0x87,
                '\u{02C6}' => 0x88,
                '\u{2030}' => 0x89,
                '\u{0160}' => 0x8A,
                '\u{2039}' => 0x8B,
                '\u{0152}' => 0x8C,
                '\u{017D}' => 0x8E,
                '\u{2018}' => 0x91,
                '\u{2019}' => 0x92,
                '\u{201C}' => 0x93,
                '\u{201D}' => 0x94,
                '\u{2022}' => 0x95,
                '\u{2013}' => 0x96,
                '\u{2014}' => 0x97,
                '\u{02DC}' => 0x98,
                '\u{2122}' => 0x99,
                '\u{0161}' => 0x9A,
                '\u{203A}' => 0x9B,
                '\u{0153}' => 0x9C,
                '\u{017E}' => 0x9E,
                '\u{0178}' => 0x9F,
                _ => return None,
            };
            Some(byte)
        }
    }
}

/// Substitute, then encode to WinAnsi. Tabs become spaces; other control characters
/// and unsupported characters become [`REPLACEMENT`].
pub fn encode(text: &str) -> Vec<u8> {
    substitute(text)
        .chars()
        .filter(|c| *c != '\r')
        .map(|c| match c {
            '\t' => b' ',
            c => win_ansi_byte(c).unwrap_or(REPLACEMENT),
        })
        .collect()
}
