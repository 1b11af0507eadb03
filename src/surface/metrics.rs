//! Advance widths of the PDF standard-14 fonts.
//!
//! Widths are in thousandths of an em for the printable ASCII range, taken
//! from the Adobe AFM files. Bold and oblique variants reuse the regular
//! widths, and Latin-1 letters are measured as their unaccented base letter.

use super::{FontFamily, FontSpec};

const FIRST: u32 = 0x20;

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
const TIMES: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

const COURIER: u16 = 600;

/// Width used for glyphs outside the tables.
const FALLBACK_HELVETICA: u16 = 556;
const FALLBACK_TIMES: u16 = 500;

/// Map a Latin-1 letter to the ASCII letter with the same advance width.
fn base_letter(c: char) -> char {
    match c {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' => 'Y',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        '\u{a0}' => ' ',
        other => other,
    }
}

/// Advance width of one character in thousandths of an em.
pub fn char_width(c: char, family: FontFamily) -> u16 {
    if family == FontFamily::Courier {
        return COURIER;
    }
    let (table, middle_dot, fallback) = match family {
        FontFamily::Times => (&TIMES, 250, FALLBACK_TIMES),
        _ => (&HELVETICA, 278, FALLBACK_HELVETICA),
    };
    if c == '\u{b7}' {
        return middle_dot;
    }
    let code = base_letter(c) as u32;
    if (FIRST..FIRST + table.len() as u32).contains(&code) {
        table[(code - FIRST) as usize]
    } else {
        fallback
    }
}

/// Width of `text` set in `font`, in points.
pub fn string_width(text: &str, font: &FontSpec) -> f64 {
    let units: u32 = text.chars().map(|c| char_width(c, font.family) as u32).sum();
    units as f64 * font.size / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_widths() {
        assert_eq!(char_width(' ', FontFamily::Helvetica), 278);
        assert_eq!(char_width('W', FontFamily::Helvetica), 944);
        assert_eq!(char_width('~', FontFamily::Times), 541);
        assert_eq!(char_width('m', FontFamily::Courier), 600);
        assert_eq!(char_width('é', FontFamily::Times), char_width('e', FontFamily::Times));
    }

    #[test]
    fn string_width_scales_with_size() {
        let font = FontSpec::new(FontFamily::Courier, 10.0);
        assert_eq!(string_width("abcd", &font), 24.0);
        let helv = FontSpec::new(FontFamily::Helvetica, 10.0);
        assert!((string_width("C", &helv) - 7.22).abs() < 1e-9);
        assert_eq!(string_width("", &helv), 0.0);
    }
}
