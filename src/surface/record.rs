//! Recording surface — keeps every draw operation instead of rendering it.
//!
//! Used by the integration tests to check geometry, and by `--dump-layout`
//! to write the layout decisions as JSON.

use serde::Serialize;

use super::{Align, Color, FontSpec, PenState, Surface};
use crate::error::Result;

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Text {
        /// Left edge of the run, after alignment
        x: f64,
        /// Baseline, without rise
        y: f64,
        rise: f64,
        /// Measured advance width
        width: f64,
        text: String,
        font: &'static str,
        size: f64,
        color: Color,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
        color: Color,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: bool,
    },
    Clip {
        points: Vec<(f64, f64)>,
    },
    Save,
    Restore,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedPage {
    /// 1-based page number
    pub number: usize,
    pub ops: Vec<DrawOp>,
}

impl RecordedPage {
    pub fn texts(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Text { .. }))
    }
}

/// A [`Surface`] that records instead of drawing.
#[derive(Debug, Clone)]
pub struct Recorder {
    width: f64,
    height: f64,
    pages: Vec<RecordedPage>,
    open: bool,
    pen: PenState,
    saved: Vec<PenState>,
    finalized: bool,
}

impl Recorder {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            pages: Vec::new(),
            open: false,
            pen: PenState::default(),
            saved: Vec::new(),
            finalized: false,
        }
    }

    pub fn pages(&self) -> &[RecordedPage] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<RecordedPage> {
        self.pages
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn push(&mut self, op: DrawOp) {
        if !self.open {
            log::warn!("draw operation outside of a page: {op:?}");
            return;
        }
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn text_op(&self, x: f64, y: f64, rise: f64, width: f64, text: &str) -> DrawOp {
        DrawOp::Text {
            x,
            y,
            rise,
            width,
            text: text.to_string(),
            font: self.pen.font.base_font(),
            size: self.pen.font.size,
            color: self.pen.fill,
        }
    }
}

impl Surface for Recorder {
    fn page_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn start_page(&mut self) {
        if self.open {
            self.finish_page();
        }
        self.pages.push(RecordedPage {
            number: self.pages.len() + 1,
            ops: Vec::new(),
        });
        self.open = true;
        self.pen = PenState::default();
        self.saved.clear();
    }

    fn finish_page(&mut self) {
        self.open = false;
    }

    fn finalize(&mut self) -> Result<()> {
        if self.open {
            self.finish_page();
        }
        self.finalized = true;
        Ok(())
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.pen.font = font.clone();
    }

    fn set_fill_color(&mut self, color: Color) {
        self.pen.fill = color;
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.pen.stroke = color;
    }

    fn set_line_width(&mut self, width: f64) {
        self.pen.line_width = width;
    }

    fn draw_string(&mut self, x: f64, y: f64, text: &str, align: Align) {
        let width = self.string_width(text, &self.pen.font);
        let op = self.text_op(align.start_x(x, width), y, 0.0, width, text);
        self.push(op);
    }

    fn begin_text(&mut self, x: f64, y: f64) {
        self.pen.cursor = (x, y);
        self.pen.rise = 0.0;
    }

    fn set_rise(&mut self, rise: f64) {
        self.pen.rise = rise;
    }

    fn text_out(&mut self, text: &str) {
        let (x, y) = self.pen.cursor;
        let width = self.string_width(text, &self.pen.font);
        if !text.is_empty() {
            let op = self.text_op(x, y, self.pen.rise, width, text);
            self.push(op);
        }
        self.pen.cursor = (x + width, y);
    }

    fn text_cursor(&self) -> (f64, f64) {
        self.pen.cursor
    }

    fn set_text_origin(&mut self, x: f64, y: f64) {
        self.pen.cursor = (x, y);
    }

    fn end_text(&mut self) {
        self.pen.rise = 0.0;
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let op = DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            width: self.pen.line_width,
            color: self.pen.stroke,
        };
        self.push(op);
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: bool) {
        self.push(DrawOp::Circle { cx, cy, r, fill });
    }

    fn clip_polygon(&mut self, points: &[(f64, f64)]) {
        self.push(DrawOp::Clip {
            points: points.to_vec(),
        });
    }

    fn save_state(&mut self) {
        self.saved.push(self.pen.clone());
        self.push(DrawOp::Save);
    }

    fn restore_state(&mut self) {
        if let Some(pen) = self.saved.pop() {
            // The text cursor is not part of the graphics state.
            let cursor = self.pen.cursor;
            self.pen = pen;
            self.pen.cursor = cursor;
        }
        self.push(DrawOp::Restore);
    }
}
