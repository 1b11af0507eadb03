//! PDF surface — content streams built with `pdf-writer`, standard fonts only.
//!
//! Pages are kept in memory as finished content streams and the document is
//! assembled and written in [`Surface::finalize`].

use std::path::{Path, PathBuf};

use log::{info, warn};
use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str, TextStr};

use super::{Align, Color, FontSpec, PenState, Surface};
use crate::error::{Error, Result};

/// Bezier handle length for a quarter circle.
const KAPPA: f64 = 0.552_284_8;

/// Metadata written into the document information dictionary.
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
}

pub struct PdfSurface {
    path: PathBuf,
    width: f64,
    height: f64,
    info: DocumentInfo,
    pages: Vec<Vec<u8>>,
    content: Option<Content>,
    /// Base fonts in first-use order; resource name is `F<index + 1>`
    fonts: Vec<&'static str>,
    pen: PenState,
    saved: Vec<PenState>,
    finalized: bool,
}

impl std::fmt::Debug for PdfSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfSurface")
            .field("path", &self.path)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("info", &self.info)
            .field("pages", &self.pages.len())
            .field("fonts", &self.fonts)
            .field("pen", &self.pen)
            .field("finalized", &self.finalized)
            .finish_non_exhaustive()
    }
}

impl PdfSurface {
    pub fn new<P: AsRef<Path>>(path: P, width: f64, height: f64, info: DocumentInfo) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            width,
            height,
            info,
            pages: Vec::new(),
            content: None,
            fonts: Vec::new(),
            pen: PenState::default(),
            saved: Vec::new(),
            finalized: false,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len() + usize::from(self.content.is_some())
    }

    fn font_index(&mut self, base_font: &'static str) -> usize {
        match self.fonts.iter().position(|f| *f == base_font) {
            Some(i) => i,
            None => {
                self.fonts.push(base_font);
                self.fonts.len() - 1
            }
        }
    }

    fn content(&mut self) -> Option<&mut Content> {
        if self.content.is_none() {
            warn!("drawing outside of a page is ignored");
        }
        self.content.as_mut()
    }

    fn show(&mut self, x: f64, y: f64, rise: f64, text: &str) {
        let index = self.font_index(self.pen.font.base_font());
        let resource = format!("F{}", index + 1);
        let size = self.pen.font.size as f32;
        let fill = self.pen.fill;
        let bytes = encode_win_ansi(text);
        let Some(content) = self.content() else {
            return;
        };
        content.begin_text();
        content.set_font(Name(resource.as_bytes()), size);
        content.set_fill_rgb(fill.r as f32, fill.g as f32, fill.b as f32);
        content.set_rise(rise as f32);
        content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x as f32, y as f32]);
        content.show(Str(&bytes));
        content.end_text();
    }

    fn write_document(&self) -> Vec<u8> {
        let mut alloc = Ref::new(1);
        let catalog_id = alloc.bump();
        let tree_id = alloc.bump();
        let info_id = alloc.bump();
        let font_ids: Vec<Ref> = self.fonts.iter().map(|_| alloc.bump()).collect();
        let page_ids: Vec<(Ref, Ref)> = self
            .pages
            .iter()
            .map(|_| (alloc.bump(), alloc.bump()))
            .collect();

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(tree_id);
        pdf.pages(tree_id)
            .kids(page_ids.iter().map(|(page, _)| *page))
            .count(page_ids.len() as i32);

        let media_box = Rect::new(0.0, 0.0, self.width as f32, self.height as f32);
        for ((page_id, content_id), data) in page_ids.iter().zip(&self.pages) {
            {
                let mut page = pdf.page(*page_id);
                page.media_box(media_box);
                page.parent(tree_id);
                page.contents(*content_id);
                let mut resources = page.resources();
                let mut fonts = resources.fonts();
                for (i, font_id) in font_ids.iter().enumerate() {
                    fonts.pair(Name(format!("F{}", i + 1).as_bytes()), *font_id);
                }
            }
            pdf.stream(*content_id, data);
        }

        for (base_font, font_id) in self.fonts.iter().zip(&font_ids) {
            pdf.type1_font(*font_id)
                .base_font(Name(base_font.as_bytes()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
        }

        let producer = format!("chordlab {}", env!("CARGO_PKG_VERSION"));
        let title = self.info.title.as_deref().unwrap_or("Songbook");
        {
            let mut info = pdf.document_info(info_id);
            info.title(TextStr(title));
            if let Some(author) = &self.info.author {
                info.author(TextStr(author));
            }
            info.producer(TextStr(&producer));
        }

        pdf.finish()
    }
}

impl Surface for PdfSurface {
    fn page_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn start_page(&mut self) {
        if self.content.is_some() {
            self.finish_page();
        }
        self.content = Some(Content::new());
        self.pen = PenState::default();
        self.saved.clear();
    }

    fn finish_page(&mut self) {
        if let Some(content) = self.content.take() {
            self.pages.push(content.finish().to_vec());
        }
    }

    fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Ok(());
        }
        self.finish_page();
        self.finalized = true;

        let bytes = self.write_document();
        std::fs::write(&self.path, bytes).map_err(|source| Error::Write {
            path: self.path.clone(),
            source,
        })?;
        info!("wrote {} page(s) to {}", self.pages.len(), self.path.display());
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
        self.show(align.start_x(x, width), y, 0.0, text);
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
        if !text.is_empty() {
            self.show(x, y, self.pen.rise, text);
        }
        let width = self.string_width(text, &self.pen.font);
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
        let stroke = self.pen.stroke;
        let width = self.pen.line_width as f32;
        let Some(content) = self.content() else {
            return;
        };
        content.set_stroke_rgb(stroke.r as f32, stroke.g as f32, stroke.b as f32);
        content.set_line_width(width);
        content.move_to(x1 as f32, y1 as f32);
        content.line_to(x2 as f32, y2 as f32);
        content.stroke();
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: bool) {
        let (fill_color, stroke) = (self.pen.fill, self.pen.stroke);
        let width = self.pen.line_width as f32;
        let Some(content) = self.content() else {
            return;
        };
        let k = r * KAPPA;
        let p = |x: f64, y: f64| ((cx + x) as f32, (cy + y) as f32);
        let (x0, y0) = p(r, 0.0);
        content.move_to(x0, y0);
        for [(ax, ay), (bx, by), (ex, ey)] in [
            [(r, k), (k, r), (0.0, r)],
            [(-k, r), (-r, k), (-r, 0.0)],
            [(-r, -k), (-k, -r), (0.0, -r)],
            [(k, -r), (r, -k), (r, 0.0)],
        ] {
            let (x1, y1) = p(ax, ay);
            let (x2, y2) = p(bx, by);
            let (x3, y3) = p(ex, ey);
            content.cubic_to(x1, y1, x2, y2, x3, y3);
        }
        content.close_path();
        if fill {
            content.set_fill_rgb(fill_color.r as f32, fill_color.g as f32, fill_color.b as f32);
            content.fill_nonzero();
        } else {
            content.set_stroke_rgb(stroke.r as f32, stroke.g as f32, stroke.b as f32);
            content.set_line_width(width);
            content.stroke();
        }
    }

    fn clip_polygon(&mut self, points: &[(f64, f64)]) {
        let Some(((x0, y0), rest)) = points.split_first() else {
            return;
        };
        let Some(content) = self.content() else {
            return;
        };
        content.move_to(*x0 as f32, *y0 as f32);
        for (x, y) in rest {
            content.line_to(*x as f32, *y as f32);
        }
        content.close_path();
        content.clip_nonzero();
        content.end_path();
    }

    fn save_state(&mut self) {
        self.saved.push(self.pen.clone());
        if let Some(content) = self.content() {
            content.save_state();
        }
    }

    fn restore_state(&mut self) {
        if let Some(pen) = self.saved.pop() {
            let cursor = self.pen.cursor;
            self.pen = pen;
            self.pen.cursor = cursor;
        }
        if let Some(content) = self.content() {
            content.restore_state();
        }
    }
}

/// Encode text for a WinAnsiEncoding standard font.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7e | 0xa0..=0xff => c as u8,
            0x09 => b' ',
            0x20ac => 0x80,
            0x2026 => 0x85,
            0x2018 => 0x91,
            0x2019 => 0x92,
            0x201c => 0x93,
            0x201d => 0x94,
            0x2022 => 0x95,
            0x2013 => 0x96,
            0x2014 => 0x97,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_ansi_keeps_latin1() {
        assert_eq!(encode_win_ansi("Café ·"), vec![b'C', b'a', b'f', 0xe9, b' ', 0xb7]);
        assert_eq!(encode_win_ansi("\u{2019}\u{4e2d}"), vec![0x92, b'?']);
    }

    #[test]
    fn writes_a_pdf_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        let mut surface = PdfSurface::new(&path, 595.0, 842.0, DocumentInfo::default());
        surface.start_page();
        surface.draw_string(100.0, 700.0, "Hello", Align::Left);
        surface.line(10.0, 10.0, 100.0, 10.0);
        surface.circle(50.0, 50.0, 2.0, true);
        surface.finalize().unwrap();
        surface.finalize().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Helvetica"));
        assert!(text.contains("(Hello) Tj"));
        assert_eq!(surface.page_count(), 1);
    }
}
