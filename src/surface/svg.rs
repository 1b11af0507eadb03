//! SVG surface — one standalone SVG document per page.
//!
//! Elements are accumulated as strings per page, y is flipped so the engine
//! can keep working in PDF coordinates. `finalize` writes `<stem>-<n>.svg`
//! next to the requested output path.

use std::path::{Path, PathBuf};

use log::{info, warn};

use super::{Align, Color, FontFamily, FontSpec, PenState, Surface};
use crate::error::{Error, Result};

pub struct SvgSurface {
    path: PathBuf,
    width: f64,
    height: f64,
    pages: Vec<String>,
    elements: Option<Vec<String>>,
    /// Pen state plus the number of `<g>` groups opened since the save
    saved: Vec<(PenState, usize)>,
    open_groups: usize,
    clip_ids: usize,
    pen: PenState,
    finalized: bool,
}

impl SvgSurface {
    pub fn new<P: AsRef<Path>>(path: P, width: f64, height: f64) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            width,
            height,
            pages: Vec::new(),
            elements: None,
            saved: Vec::new(),
            open_groups: 0,
            clip_ids: 0,
            pen: PenState::default(),
            finalized: false,
        }
    }

    /// File name of page `number` (1-based).
    pub fn page_path(&self, number: usize) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "page".to_string());
        self.path.with_file_name(format!("{stem}-{number}.svg"))
    }

    fn push(&mut self, element: String) {
        match self.elements.as_mut() {
            Some(elements) => elements.push(element),
            None => warn!("drawing outside of a page is ignored"),
        }
    }

    fn flip(&self, y: f64) -> f64 {
        self.height - y
    }

    fn text(&mut self, x: f64, y: f64, rise: f64, text: &str) {
        let font = &self.pen.font;
        let element = format!(
            r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{}" font-weight="{}" font-style="{}" fill="{}" xml:space="preserve">{}</text>"#,
            x,
            self.flip(y + rise),
            css_family(font.family),
            font.size,
            if font.bold { "bold" } else { "normal" },
            if font.italic { "italic" } else { "normal" },
            self.pen.fill.to_hex(),
            escape(text)
        );
        self.push(element);
    }

    fn build_page(&self, elements: &[String]) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" width="{}pt" height="{}pt">"#,
            self.width, self.height, self.width, self.height
        );
        svg.push('\n');
        for el in elements {
            svg.push_str("  ");
            svg.push_str(el);
            svg.push('\n');
        }
        svg.push_str("</svg>\n");
        svg
    }
}

fn css_family(family: FontFamily) -> &'static str {
    match family {
        FontFamily::Helvetica => "Helvetica, Arial, sans-serif",
        FontFamily::Times => "'Times New Roman', Times, serif",
        FontFamily::Courier => "'Courier New', Courier, monospace",
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl Surface for SvgSurface {
    fn page_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn start_page(&mut self) {
        if self.elements.is_some() {
            self.finish_page();
        }
        self.elements = Some(Vec::new());
        self.pen = PenState::default();
        self.saved.clear();
        self.open_groups = 0;
    }

    fn finish_page(&mut self) {
        if let Some(mut elements) = self.elements.take() {
            let unclosed = self.open_groups + self.saved.iter().map(|(_, n)| n + 1).sum::<usize>();
            elements.extend(std::iter::repeat("</g>".to_string()).take(unclosed));
            self.saved.clear();
            self.open_groups = 0;
            let page = self.build_page(&elements);
            self.pages.push(page);
        }
    }

    fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Ok(());
        }
        self.finish_page();
        self.finalized = true;

        for (i, page) in self.pages.iter().enumerate() {
            let path = self.page_path(i + 1);
            std::fs::write(&path, page).map_err(|source| Error::Write { path, source })?;
        }
        info!("wrote {} SVG page(s) next to {}", self.pages.len(), self.path.display());
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
        self.text(align.start_x(x, width), y, 0.0, text);
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
            self.text(x, y, self.pen.rise, text);
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
        let element = format!(
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{}"/>"#,
            x1,
            self.flip(y1),
            x2,
            self.flip(y2),
            self.pen.stroke.to_hex(),
            self.pen.line_width
        );
        self.push(element);
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: bool) {
        let element = if fill {
            format!(
                r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}"/>"#,
                cx,
                self.flip(cy),
                r,
                self.pen.fill.to_hex()
            )
        } else {
            format!(
                r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="none" stroke="{}" stroke-width="{}"/>"#,
                cx,
                self.flip(cy),
                r,
                self.pen.stroke.to_hex(),
                self.pen.line_width
            )
        };
        self.push(element);
    }

    fn clip_polygon(&mut self, points: &[(f64, f64)]) {
        if points.is_empty() {
            return;
        }
        self.clip_ids += 1;
        let id = format!("clip{}", self.clip_ids);
        let points: Vec<String> = points
            .iter()
            .map(|(x, y)| format!("{:.2},{:.2}", x, self.flip(*y)))
            .collect();
        self.push(format!(
            r#"<clipPath id="{id}"><polygon points="{}"/></clipPath>"#,
            points.join(" ")
        ));
        self.push(format!(r#"<g clip-path="url(#{id})">"#));
        self.open_groups += 1;
    }

    fn save_state(&mut self) {
        self.push("<g>".to_string());
        self.saved.push((self.pen.clone(), self.open_groups));
        self.open_groups = 0;
    }

    fn restore_state(&mut self) {
        let Some((pen, outer_groups)) = self.saved.pop() else {
            warn!("restore without a matching save");
            return;
        };
        for _ in 0..=self.open_groups {
            self.push("</g>".to_string());
        }
        self.open_groups = outer_groups;
        let cursor = self.pen.cursor;
        self.pen = pen;
        self.pen.cursor = cursor;
    }
}
