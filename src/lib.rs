//! chordlab — typesets chopro chord/lyrics files as paginated songsheets.
//!
//! Songs are tokenized lazily, laid out in columns with chord symbols above
//! the lyrics, and drawn on a [`Surface`]: a PDF document, one SVG per
//! page, or an in-memory [`Recorder`] used for testing and layout dumps.
//!
//! # Example
//! ```no_run
//! use chordlab::render_files_to_pdf;
//!
//! render_files_to_pdf(&["songs/amazing-grace.chopro"], "songs.pdf").unwrap();
//! ```

pub mod chords;
pub mod error;
pub mod model;
pub mod pagesize;
pub mod parser;
pub mod renderer;
pub mod songbook;
pub mod style;
pub mod surface;
pub mod transpose;

use std::path::{Path, PathBuf};

pub use chords::{ChordLibrary, ChordRegistry};
pub use error::{Error, Result};
pub use model::*;
pub use parser::{ChoproParser, Encoding};
pub use renderer::{DiagramGeometry, LayoutState, RenderOptions, SongRenderer};
pub use songbook::{Input, Songbook};
pub use style::{StyleSheet, Styles};
pub use surface::{DocumentInfo, DrawOp, PdfSurface, RecordedPage, Recorder, Surface, SvgSurface};

/// Songbook with the built-in stylesheet and chord library.
fn default_songbook() -> Result<Songbook> {
    Ok(Songbook::new(
        Styles::builtin()?,
        ChordLibrary::builtin()?,
        RenderOptions::default(),
    ))
}

fn file_inputs<P: AsRef<Path>>(files: &[P]) -> Vec<Input> {
    files
        .iter()
        .map(|p| Input::File(PathBuf::from(p.as_ref())))
        .collect()
}

/// Render chopro files into a single A4 PDF with the default styles.
pub fn render_files_to_pdf<P: AsRef<Path>, Q: AsRef<Path>>(files: &[P], output: Q) -> Result<()> {
    let (width, height) = pagesize::parse("A4")?;
    let surface = PdfSurface::new(output, width, height, DocumentInfo::default());
    default_songbook()?.render(&file_inputs(files), surface)?;
    Ok(())
}

/// Lay chopro files out on pages of the given size and return every draw
/// operation, page by page.
pub fn render_files_to_layout<P: AsRef<Path>>(files: &[P], page_size: (f64, f64)) -> Result<Vec<RecordedPage>> {
    let recorder = Recorder::new(page_size.0, page_size.1);
    let recorder = default_songbook()?.render(&file_inputs(files), recorder)?;
    Ok(recorder.into_pages())
}

/// Convert recorded pages to a JSON string.
pub fn layout_to_json(pages: &[RecordedPage]) -> Result<String> {
    Ok(serde_json::to_string_pretty(pages)?)
}
