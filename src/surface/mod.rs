//! Drawing surfaces — the page canvas the layout engine draws on.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner of
//! the page and y growing upwards. A surface owns fonts and metrics; the
//! engine only asks it how wide a run of text came out.

pub mod metrics;
mod pdf;
mod record;
mod svg;

use serde::Serialize;

use crate::error::Result;

pub use pdf::{DocumentInfo, PdfSurface};
pub use record::{DrawOp, RecordedPage, Recorder};
pub use svg::SvgSurface;

// ═══════════════════════════════════════════════════════════════════════
// Value types
// ═══════════════════════════════════════════════════════════════════════

/// RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb`, `#rrggbb` or a color name.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(hex) = text.strip_prefix('#') {
            let digits: Vec<u32> = hex.chars().map(|c| c.to_digit(16)).collect::<Option<_>>()?;
            return match digits.as_slice() {
                [r, g, b] => Some(Self::rgb(
                    *r as f64 / 15.0,
                    *g as f64 / 15.0,
                    *b as f64 / 15.0,
                )),
                [r1, r2, g1, g2, b1, b2] => Some(Self::rgb(
                    (r1 * 16 + r2) as f64 / 255.0,
                    (g1 * 16 + g2) as f64 / 255.0,
                    (b1 * 16 + b2) as f64 / 255.0,
                )),
                _ => None,
            };
        }

        let (r, g, b) = match text.to_ascii_lowercase().as_str() {
            "black" => (0, 0, 0),
            "white" => (255, 255, 255),
            "red" => (255, 0, 0),
            "green" => (0, 128, 0),
            "blue" => (0, 0, 255),
            "gray" | "grey" => (128, 128, 128),
            "darkgray" | "darkgrey" => (169, 169, 169),
            "dimgray" | "dimgrey" => (105, 105, 105),
            "darkred" | "maroon" => (128, 0, 0),
            "darkgreen" => (0, 100, 0),
            "darkblue" => (0, 0, 139),
            "navy" => (0, 0, 128),
            "purple" => (128, 0, 128),
            "orange" => (255, 165, 0),
            "brown" => (165, 42, 42),
            _ => return None,
        };
        Some(Self::rgb(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0))
    }

    /// `#rrggbb` form, for SVG output.
    pub fn to_hex(self) -> String {
        let c = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", c(self.r), c(self.g), c(self.b))
    }
}

/// Horizontal anchoring of a string relative to its x coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Right,
    Center,
}

impl Align {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Align::Left),
            "right" => Some(Align::Right),
            "center" | "centre" => Some(Align::Center),
            _ => None,
        }
    }

    /// Left edge of a run of `width` anchored at `x`.
    pub fn start_x(self, x: f64, width: f64) -> f64 {
        match self {
            Align::Left => x,
            Align::Right => x - width,
            Align::Center => x - width / 2.0,
        }
    }
}

/// The three PDF standard-14 text families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FontFamily {
    Helvetica,
    Times,
    Courier,
}

/// A concrete font: family, variant and size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontSpec {
    pub family: FontFamily,
    pub bold: bool,
    pub italic: bool,
    pub size: f64,
}

impl FontSpec {
    pub fn new(family: FontFamily, size: f64) -> Self {
        Self {
            family,
            bold: false,
            italic: false,
            size,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn with_size(&self, size: f64) -> Self {
        Self { size, ..self.clone() }
    }

    /// PostScript name of the standard font, e.g. `Helvetica-BoldOblique`.
    pub fn base_font(&self) -> &'static str {
        match (self.family, self.bold, self.italic) {
            (FontFamily::Helvetica, false, false) => "Helvetica",
            (FontFamily::Helvetica, true, false) => "Helvetica-Bold",
            (FontFamily::Helvetica, false, true) => "Helvetica-Oblique",
            (FontFamily::Helvetica, true, true) => "Helvetica-BoldOblique",
            (FontFamily::Times, false, false) => "Times-Roman",
            (FontFamily::Times, true, false) => "Times-Bold",
            (FontFamily::Times, false, true) => "Times-Italic",
            (FontFamily::Times, true, true) => "Times-BoldItalic",
            (FontFamily::Courier, false, false) => "Courier",
            (FontFamily::Courier, true, false) => "Courier-Bold",
            (FontFamily::Courier, false, true) => "Courier-Oblique",
            (FontFamily::Courier, true, true) => "Courier-BoldOblique",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Surface trait
// ═══════════════════════════════════════════════════════════════════════

/// Stateful page canvas.
///
/// Text runs work like a PDF text object: `begin_text` places a cursor,
/// every `text_out` draws at the cursor with the current font, fill color
/// and rise, then advances the cursor by the measured width.
pub trait Surface {
    /// Page width and height in points.
    fn page_size(&self) -> (f64, f64);

    fn start_page(&mut self);
    fn finish_page(&mut self);
    /// Close any open page and write the document out. Safe to call twice.
    fn finalize(&mut self) -> Result<()>;

    fn set_font(&mut self, font: &FontSpec);
    fn set_fill_color(&mut self, color: Color);
    fn set_stroke_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: f64);

    /// Advance width of `text` in `font`.
    fn string_width(&self, text: &str, font: &FontSpec) -> f64 {
        metrics::string_width(text, font)
    }

    /// Draw a single string with the current font and fill color.
    fn draw_string(&mut self, x: f64, y: f64, text: &str, align: Align);

    fn begin_text(&mut self, x: f64, y: f64);
    fn set_rise(&mut self, rise: f64);
    fn text_out(&mut self, text: &str);
    fn text_cursor(&self) -> (f64, f64);
    fn set_text_origin(&mut self, x: f64, y: f64);
    fn end_text(&mut self);

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64);
    fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: bool);
    /// Intersect the clip region with a closed polygon.
    fn clip_polygon(&mut self, points: &[(f64, f64)]);
    fn save_state(&mut self);
    fn restore_state(&mut self);
}

/// Text-run cursor and graphics state shared by the surface backends.
#[derive(Debug, Clone)]
pub(crate) struct PenState {
    pub(crate) font: FontSpec,
    pub(crate) fill: Color,
    pub(crate) stroke: Color,
    pub(crate) line_width: f64,
    pub(crate) rise: f64,
    pub(crate) cursor: (f64, f64),
}

impl Default for PenState {
    fn default() -> Self {
        Self {
            font: FontSpec::new(FontFamily::Helvetica, 12.0),
            fill: Color::BLACK,
            stroke: Color::BLACK,
            line_width: 1.0,
            rise: 0.0,
            cursor: (0.0, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_colors() {
        assert_eq!(Color::parse("#fff"), Some(Color::rgb(1.0, 1.0, 1.0)));
        assert_eq!(Color::parse("#000080"), Some(Color::rgb(0.0, 0.0, 128.0 / 255.0)));
        assert_eq!(Color::parse("Black"), Some(Color::BLACK));
        assert_eq!(Color::parse("#12"), None);
        assert_eq!(Color::parse("chartreuse-ish"), None);
        assert_eq!(Color::rgb(1.0, 0.0, 0.0).to_hex(), "#ff0000");
    }

    #[test]
    fn alignment_offsets() {
        assert_eq!(Align::Left.start_x(100.0, 20.0), 100.0);
        assert_eq!(Align::Right.start_x(100.0, 20.0), 80.0);
        assert_eq!(Align::Center.start_x(100.0, 20.0), 90.0);
        assert_eq!(Align::parse("Centre"), Some(Align::Center));
    }

    #[test]
    fn standard_font_names() {
        let f = FontSpec::new(FontFamily::Times, 9.0);
        assert_eq!(f.base_font(), "Times-Roman");
        assert_eq!(f.clone().bold().italic().base_font(), "Times-BoldItalic");
        assert_eq!(FontSpec::new(FontFamily::Helvetica, 10.0).italic().base_font(), "Helvetica-Oblique");
    }
}
