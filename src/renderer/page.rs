//! Page frame — the printable rectangle of one page and its decorations.
//!
//! In duplex mode odd pages get the wide margin on the left (binding side)
//! and carry the page number on the right; even pages mirror that.

use super::constants::*;
use crate::style::Styles;
use crate::surface::{Align, Surface};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct PageFrame {
    /// 1-based page number
    pub(super) number: usize,
    pub(super) left: f64,
    pub(super) right: f64,
    pub(super) top: f64,
    pub(super) bottom: f64,
    /// Page number on the right, margin gutter on the left
    outer_right: bool,
}

impl PageFrame {
    pub(super) fn new(page_size: (f64, f64), margin: f64, number: usize, duplex: bool) -> Self {
        let (width, height) = page_size;
        let outer_right = duplex && number % 2 == 1;
        let (left, right) = if outer_right {
            (OUTER_MARGIN_FACTOR * margin, width - INNER_MARGIN_FACTOR * margin)
        } else {
            (INNER_MARGIN_FACTOR * margin, width - OUTER_MARGIN_FACTOR * margin)
        };
        Self {
            number,
            left,
            right,
            top: height - TOP_MARGIN_FACTOR * margin,
            bottom: BOTTOM_MARGIN_FACTOR * margin,
            outer_right,
        }
    }

    pub(super) fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Anchor x for a string aligned within the frame.
    pub(super) fn aligned_x(&self, align: Align) -> f64 {
        match align {
            Align::Left => self.left,
            Align::Right => self.right,
            Align::Center => (self.left + self.right) / 2.0,
        }
    }

    /// Page number, header and footer rules, and the optional source name.
    pub(super) fn decorate<S: Surface + ?Sized>(&self, surface: &mut S, styles: &Styles, filename: Option<&str>) {
        let number_style = &styles.page_number;
        let y = self.bottom - number_style.line_height;
        surface.set_font(&number_style.font);
        surface.set_fill_color(number_style.color);
        let number = self.number.to_string();
        if self.outer_right {
            surface.draw_string(self.right, y, &number, Align::Right);
        } else {
            surface.draw_string(self.left, y, &number, Align::Left);
        }

        surface.set_stroke_color(number_style.color);
        surface.set_line_width(RULE_WIDTH);
        surface.line(self.left, self.top, self.right, self.top);
        surface.line(self.left, self.bottom, self.right, self.bottom);

        if let Some(name) = filename {
            let style = &styles.filename;
            surface.set_font(&style.font);
            surface.set_fill_color(style.color);
            if self.outer_right {
                surface.draw_string(self.left, y, name, Align::Left);
            } else {
                surface.draw_string(self.right, y, name, Align::Right);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawOp, Recorder};

    const A4: (f64, f64) = (595.0, 842.0);

    #[test]
    fn duplex_margins_alternate() {
        let odd = PageFrame::new(A4, 50.0, 1, true);
        assert_eq!((odd.left, odd.right), (75.0, 570.0));
        assert_eq!((odd.top, odd.bottom), (822.0, 31.0));

        let even = PageFrame::new(A4, 50.0, 2, true);
        assert_eq!((even.left, even.right), (25.0, 520.0));
        assert_eq!(odd.width(), even.width());
    }

    #[test]
    fn simplex_pages_all_look_even() {
        let first = PageFrame::new(A4, 50.0, 1, false);
        assert_eq!((first.left, first.right), (25.0, 520.0));
        assert!(!first.outer_right);
    }

    #[test]
    fn decorations_follow_the_facing_page_rule() {
        let styles = Styles::builtin().unwrap();
        let mut rec = Recorder::new(A4.0, A4.1);
        rec.start_page();
        let frame = PageFrame::new(A4, 50.0, 3, true);
        frame.decorate(&mut rec, &styles, Some("song.chopro"));

        let ops = &rec.pages()[0].ops;
        let texts: Vec<(&str, f64, f64)> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, x, width, .. } => Some((text.as_str(), *x, *width)),
                _ => None,
            })
            .collect();
        let (number, x, width) = texts[0];
        assert_eq!(number, "3");
        assert!((x + width - frame.right).abs() < 1e-9);
        assert_eq!(texts[1].0, "song.chopro");
        assert_eq!(texts[1].1, frame.left);

        let rules: Vec<_> = ops.iter().filter(|op| matches!(op, DrawOp::Line { .. })).collect();
        assert_eq!(rules.len(), 2);
        for rule in rules {
            if let DrawOp::Line { x1, x2, .. } = rule {
                assert_eq!((*x1, *x2), (frame.left, frame.right));
            }
        }
    }
}
