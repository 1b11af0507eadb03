//! Songbook driver — renders a list of chopro inputs into one output.
//!
//! Every input becomes at least one song. A tokenizer error in any input
//! ends the run: the pages rendered so far are closed and written out, then
//! the error is returned.

use std::io::{self, BufRead};
use std::path::PathBuf;

use log::{debug, info, warn};

use crate::chords::{ChordLibrary, ChordRegistry};
use crate::error::Result;
use crate::model::Token;
use crate::parser::{ChoproParser, Tokens};
use crate::renderer::{RenderOptions, SongRenderer};
use crate::style::Styles;
use crate::surface::Surface;
use crate::transpose::transpose_token;

/// One chopro source.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    File(PathBuf),
    Stdin,
    /// In-memory text with a display name
    Text { name: String, text: String },
}

impl Input {
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Input::Text {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Name shown in logs and, optionally, in the page footer.
    pub fn name(&self) -> String {
        match self {
            Input::File(path) => path.display().to_string(),
            Input::Stdin => "<stdin>".to_string(),
            Input::Text { name, .. } => name.clone(),
        }
    }
}

impl From<PathBuf> for Input {
    fn from(path: PathBuf) -> Self {
        Input::File(path)
    }
}

/// Resolved configuration for a run.
#[derive(Debug, Clone)]
pub struct Songbook {
    styles: Styles,
    library: ChordLibrary,
    options: RenderOptions,
    transpose: i32,
    parser: ChoproParser,
}

impl Songbook {
    pub fn new(styles: Styles, library: ChordLibrary, options: RenderOptions) -> Self {
        Self {
            styles,
            library,
            options,
            transpose: 0,
            parser: ChoproParser::new(),
        }
    }

    /// Shift every chord by `semitones`.
    pub fn with_transpose(mut self, semitones: i32) -> Self {
        self.transpose = semitones;
        self
    }

    /// Use `parser` for every input, e.g. one with another default encoding.
    pub fn with_parser(mut self, parser: ChoproParser) -> Self {
        self.parser = parser;
        self
    }

    /// Render `inputs` (stdin when empty) onto `surface` and finalize it.
    pub fn render<S: Surface>(&self, inputs: &[Input], surface: S) -> Result<S> {
        let registry = ChordRegistry::new(self.library.clone());
        let mut engine = SongRenderer::new(surface, self.styles.clone(), registry, self.options.clone());

        let stdin_only = [Input::Stdin];
        let inputs = if inputs.is_empty() { &stdin_only[..] } else { inputs };
        for input in inputs {
            info!("rendering {}", input.name());
            if let Err(e) = self.render_input(&mut engine, input) {
                if let Err(close_err) = engine.close() {
                    warn!("could not write partial output: {close_err}");
                }
                return Err(e);
            }
        }

        engine.finish()?;
        Ok(engine.into_surface())
    }

    fn render_input<S: Surface>(&self, engine: &mut SongRenderer<S>, input: &Input) -> Result<()> {
        match input {
            Input::File(path) => self.render_tokens(engine, self.parser.open(path)?),
            Input::Stdin => self.render_tokens(engine, self.parser.from_reader(io::stdin().lock(), input.name())?),
            Input::Text { name, text } => self.render_tokens(engine, self.parser.parse_str(text, name)?),
        }
    }

    fn render_tokens<S: Surface, R: BufRead>(&self, engine: &mut SongRenderer<S>, tokens: Tokens<R>) -> Result<()> {
        let name = tokens.name().to_string();
        debug!("{name}: reading as {:?}", tokens.encoding());
        engine.render_song(&name, shifted(tokens, self.transpose))
    }
}

fn shifted<I>(tokens: I, semitones: i32) -> impl Iterator<Item = Result<Token>>
where
    I: Iterator<Item = Result<Token>>,
{
    tokens.map(move |token| token.map(|t| transpose_token(t, semitones)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::parser::Encoding;
    use crate::surface::{DocumentInfo, DrawOp, PdfSurface, Recorder};

    fn songbook() -> Songbook {
        Songbook::new(
            Styles::builtin().unwrap(),
            ChordLibrary::builtin().unwrap(),
            RenderOptions::default(),
        )
    }

    #[test]
    fn each_input_starts_a_page() {
        let inputs = [
            Input::text("one", "{title: One}\n[C]la\n"),
            Input::text("two", "{title: Two}\n[G]la\n"),
        ];
        let rec = songbook().render(&inputs, Recorder::new(595.0, 842.0)).unwrap();
        assert_eq!(rec.pages().len(), 2);
        assert!(rec.is_finalized());
    }

    #[test]
    fn parse_errors_stop_the_run() {
        let inputs = [
            Input::text("good", "{title: Good}\n"),
            Input::text("bad", "{columns: many}\n"),
        ];
        let err = songbook().render(&inputs, Recorder::new(595.0, 842.0)).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }), "{err}");
    }

    #[test]
    fn partial_pdf_is_written_before_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("partial.pdf");
        let inputs = [
            Input::text("good", "{title: Good}\n[C]la\n"),
            Input::text("bad", "{columns: x}\n"),
        ];
        let surface = PdfSurface::new(&out, 595.0, 842.0, DocumentInfo::default());
        let err = songbook().render(&inputs, surface).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "{err}");

        let bytes = std::fs::read(&out).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(String::from_utf8_lossy(&bytes).contains("(Good) Tj"));
    }

    #[test]
    fn parser_default_encoding_applies_to_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cafe.chopro");
        std::fs::write(&path, b"{title: Caf\xe9}\n").unwrap();

        let book = songbook().with_parser(ChoproParser::new().with_default_encoding(Encoding::Latin1));
        let rec = book.render(&[Input::File(path)], Recorder::new(595.0, 842.0)).unwrap();
        let titled = rec.pages()[0]
            .texts()
            .any(|op| matches!(op, DrawOp::Text { text, .. } if text == "Café"));
        assert!(titled);
    }

    #[test]
    fn missing_files_are_io_errors() {
        let inputs = [Input::File(PathBuf::from("/definitely/not/here.chopro"))];
        let err = songbook().render(&inputs, Recorder::new(595.0, 842.0)).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
