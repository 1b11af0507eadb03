//! Numeric layout defaults (all in PDF points).

use serde::Serialize;

// ── Page frame, as factors of the songsheet margin ─────────────────
pub(super) const TOP_MARGIN_FACTOR: f64 = 0.4;
pub(super) const BOTTOM_MARGIN_FACTOR: f64 = 0.62;
pub(super) const INNER_MARGIN_FACTOR: f64 = 0.5;
pub(super) const OUTER_MARGIN_FACTOR: f64 = 1.5;
pub(super) const RULE_WIDTH: f64 = 1.0;

// ── Chorus bracket ──────────────────────────────────────────────────
pub(super) const CHORUS_MARK_INSET: f64 = 5.0; // bracket sits left of the text
pub(super) const CHORUS_CLOSE_DROP: f64 = 5.0; // bracket ends below the last baseline
pub(super) const CHORUS_BAR_WIDTH: f64 = 1.0;

// ── Lines ───────────────────────────────────────────────────────────
pub(super) const DOT_FILL_GAP: f64 = 3.0; // min space after a chord symbol
pub(super) const DOT_FILL: &str = "\u{00B7}";
pub(super) const SPACE_FILL: &str = " ";
pub(super) const LINE_OVERFLOW_SLACK: f64 = 1.1;
pub(super) const TAB_OVERFLOW_SLACK: f64 = 1.33;

/// Chord diagram box geometry, before scaling by the `chordbox` style.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiagramGeometry {
    /// Horizontal distance between neighbouring boxes
    pub box_pitch: f64,
    /// First box x, counted back from the right edge minus one pitch
    pub right_offset: f64,
    /// Grid origin above the bottom rule
    pub bottom_offset: f64,
    /// Vertical distance between rows of boxes
    pub row_pitch: f64,
    pub string_spacing: f64,
    pub fret_spacing: f64,
    /// Finger dot radius, as a fraction of the string spacing
    pub dot_radius: f64,
    pub grid_width: f64,
    pub nut_width: f64,
}

impl Default for DiagramGeometry {
    fn default() -> Self {
        Self {
            box_pitch: 38.0,
            right_offset: 10.0,
            bottom_offset: 8.0,
            row_pitch: 55.0,
            string_spacing: 5.0,
            fret_spacing: 7.0,
            dot_radius: 0.4,
            grid_width: 0.3,
            nut_width: 1.0,
        }
    }
}

impl DiagramGeometry {
    /// Every length multiplied by `scale`; the dot factor is relative already.
    pub fn scaled(&self, scale: f64) -> Self {
        Self {
            box_pitch: self.box_pitch * scale,
            right_offset: self.right_offset * scale,
            bottom_offset: self.bottom_offset * scale,
            row_pitch: self.row_pitch * scale,
            string_spacing: self.string_spacing * scale,
            fret_spacing: self.fret_spacing * scale,
            dot_radius: self.dot_radius,
            grid_width: self.grid_width * scale,
            nut_width: self.nut_width * scale,
        }
    }
}
