//! Chord diagram boxes, tiled right to left above the bottom rule.

use log::debug;

use super::constants::DiagramGeometry;
use super::page::PageFrame;
use crate::chords::ChordRegistry;
use crate::model::{ChordDef, Fret};
use crate::style::Styles;
use crate::surface::{Align, Surface};

/// Draw one box per known chord in `names`, in the given order.
///
/// Returns the number of boxes drawn.
pub(super) fn draw_chord_boxes<S: Surface + ?Sized>(
    surface: &mut S,
    frame: &PageFrame,
    names: &[String],
    registry: &ChordRegistry,
    styles: &Styles,
    geometry: &DiagramGeometry,
) -> usize {
    let g = geometry.scaled(styles.chordbox.scale);
    let start_x = frame.right - g.box_pitch + g.right_offset;
    let mut xpos = start_x;
    let mut ypos = frame.bottom + g.bottom_offset;
    let mut drawn = 0;

    for name in names {
        let Some(def) = registry.lookup(name) else {
            debug!("no diagram for {name}");
            continue;
        };
        draw_chord_box(surface, xpos, ypos, name, def, styles, &g);
        drawn += 1;
        xpos -= g.box_pitch;
        if xpos < frame.left {
            xpos = start_x;
            ypos += g.row_pitch;
        }
    }
    drawn
}

/// One diagram with its lowest grid line at `ypos` and first string at `xpos`.
pub(super) fn draw_chord_box<S: Surface + ?Sized>(
    surface: &mut S,
    xpos: f64,
    ypos: f64,
    name: &str,
    def: &ChordDef,
    styles: &Styles,
    g: &DiagramGeometry,
) {
    let dx = g.string_spacing;
    let dy = g.fret_spacing;
    let strings = def.strings.len().max(1);
    let grid_right = xpos + dx * (strings - 1) as f64;
    let color = styles.chordbox.color;
    let scale = styles.chordbox.scale;

    // ── Grid, clipped to half a fret below and just above the nut ──
    surface.save_state();
    surface.clip_polygon(&[
        (xpos - dx, ypos - dy / 2.0),
        (grid_right + dx, ypos - dy / 2.0),
        (grid_right + dx, ypos + 4.0 * dy + scale),
        (xpos - dx, ypos + 4.0 * dy + scale),
    ]);
    surface.set_stroke_color(color);
    surface.set_line_width(g.grid_width);
    for i in 0..strings {
        let x = xpos + dx * i as f64;
        surface.line(x, ypos - dy, x, ypos + 5.0 * dy);
    }
    for j in -1..=5 {
        let y = ypos + dy * j as f64;
        surface.line(xpos, y, grid_right, y);
    }
    surface.restore_state();

    // ── Name ──
    let font = &styles.chordbox.font;
    surface.set_font(&font.with_size(font.size * scale));
    surface.set_fill_color(color);
    surface.draw_string((xpos + grid_right) / 2.0, ypos + 5.1 * dy, name, Align::Center);

    // ── Nut or base fret ──
    let marks = &styles.chordbox_marks;
    surface.set_font(&marks.font.with_size(marks.font.size * scale));
    surface.set_fill_color(marks.color);
    if def.is_barre() {
        surface.draw_string(
            xpos - 2.0 * dx / 5.0,
            ypos + 3.0 * dy + scale,
            &def.base_fret.to_string(),
            Align::Right,
        );
    } else {
        surface.set_stroke_color(color);
        surface.set_line_width(g.nut_width);
        let y = ypos + 4.0 * dy + 0.5 * scale;
        surface.line(xpos, y, grid_right, y);
    }

    // ── Strings ──
    for (i, fret) in def.strings.iter().enumerate() {
        let x = xpos + dx * i as f64;
        let mark = match fret {
            Fret::Muted => "x",
            Fret::At(0) => "o",
            Fret::At(f) => {
                surface.set_fill_color(color);
                surface.circle(x, ypos + (4.5 - *f as f64) * dy, g.dot_radius * dx, true);
                continue;
            }
        };
        surface.set_fill_color(marks.color);
        surface.draw_string(x, ypos + 4.0 * dy + 1.7 * scale, mark, Align::Center);
    }
}
