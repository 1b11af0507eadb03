//! Lyrics lines — chord symbols interleaved above the lyric text.
//!
//! A chord is drawn at the cursor with the chord style's rise, then the
//! cursor jumps back so the following lyric starts right under the chord.
//! The next chord may not start before the end of the previous one plus a
//! small gap; the lyric row is padded with fill glyphs until it does.

use super::constants::*;
use crate::chords::ChordRegistry;
use crate::model::Segments;
use crate::style::Style;
use crate::surface::Surface;

/// Styles used for one line.
pub(super) struct LineStyles<'a> {
    pub(super) lyric: &'a Style,
    pub(super) chord: &'a Style,
}

/// Vertical space a line takes, baseline to baseline.
pub(super) fn line_advance(segments: &Segments, styles: &LineStyles<'_>, disable_compact: bool) -> f64 {
    if segments.is_chords_only() {
        styles.chord.line_height
    } else if disable_compact || segments.chord_count() > 0 {
        styles.lyric.line_height + styles.chord.line_height
    } else {
        styles.lyric.line_height
    }
}

fn apply<S: Surface + ?Sized>(surface: &mut S, style: &Style) {
    surface.set_font(&style.font);
    surface.set_fill_color(style.color);
}

/// Fill glyph for the gap after `lyric`: a dot inside a word, else a space.
///
/// Only the last character counts, so a lyric such as `"Hi "` that ends a
/// word gets spaces even though it has visible text.
pub(super) fn fill_glyph(lyric: &str) -> &'static str {
    match lyric.chars().last() {
        Some(c) if !c.is_whitespace() => DOT_FILL,
        _ => SPACE_FILL,
    }
}

/// Draw a line with its baseline at `(x, y)`, recording every chord used.
pub(super) fn draw_line<S: Surface + ?Sized>(
    surface: &mut S,
    registry: &mut ChordRegistry,
    styles: &LineStyles<'_>,
    x: f64,
    y: f64,
    segments: &Segments,
) {
    if segments.is_chords_only() {
        draw_chords_only(surface, registry, styles.chord, x, y, segments);
        return;
    }

    surface.begin_text(x, y);
    let mut ok_pos = f64::NEG_INFINITY;
    let mut last_lyric = "";
    for (i, part) in segments.as_slice().iter().enumerate() {
        if i % 2 == 0 {
            apply(surface, styles.lyric);
            surface.set_rise(0.0);
            surface.text_out(part);
            last_lyric = part.as_str();
            continue;
        }

        registry.use_chord(part);

        // Still in the lyric style here, so the fill lands in the lyric row.
        let fill = fill_glyph(last_lyric);
        while surface.text_cursor().0 < ok_pos {
            let before = surface.text_cursor().0;
            surface.text_out(fill);
            if surface.text_cursor().0 <= before {
                break;
            }
        }

        let (cx, cy) = surface.text_cursor();
        apply(surface, styles.chord);
        surface.set_rise(styles.chord.rise);
        surface.text_out(part);
        ok_pos = surface.text_cursor().0 + DOT_FILL_GAP;
        surface.set_text_origin(cx, cy);
    }
    surface.end_text();
}

/// A line with chords but no lyrics: one row of chord symbols at the baseline.
fn draw_chords_only<S: Surface + ?Sized>(
    surface: &mut S,
    registry: &mut ChordRegistry,
    chord: &Style,
    x: f64,
    y: f64,
    segments: &Segments,
) {
    surface.begin_text(x, y);
    apply(surface, chord);
    surface.set_rise(0.0);
    let parts = segments.as_slice();
    for (i, part) in parts.iter().enumerate() {
        if i % 2 == 1 {
            registry.use_chord(part);
            surface.text_out(part);
        } else if i + 1 < parts.len() {
            // gap before the next chord, at least one space
            if i > 0 && part.is_empty() {
                surface.text_out(SPACE_FILL);
            } else {
                surface.text_out(part);
            }
        }
    }
    surface.end_text();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Styles;

    #[test]
    fn fill_depends_on_the_lyric_before_the_gap() {
        assert_eq!(fill_glyph("Hel"), DOT_FILL);
        assert_eq!(fill_glyph("Hello "), SPACE_FILL);
        assert_eq!(fill_glyph(""), SPACE_FILL);
    }

    #[test]
    fn advance_depends_on_compact_mode() {
        let all = Styles::builtin().unwrap();
        let styles = LineStyles {
            lyric: &all.line,
            chord: &all.chord,
        };
        let plain: Segments = ["just words"].into_iter().collect();
        let chorded: Segments = ["", "C", "words"].into_iter().collect();
        let chords: Segments = ["", "C", " ", "G", ""].into_iter().collect();

        assert_eq!(line_advance(&plain, &styles, false), all.line.line_height);
        assert_eq!(
            line_advance(&plain, &styles, true),
            all.line.line_height + all.chord.line_height
        );
        assert_eq!(
            line_advance(&chorded, &styles, false),
            all.line.line_height + all.chord.line_height
        );
        assert_eq!(line_advance(&chords, &styles, false), all.chord.line_height);
    }
}
