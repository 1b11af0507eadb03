//! `chordlab` command line: chopro files in, one songbook PDF (or SVG pages) out.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{info, LevelFilter};

use chordlab::{
    layout_to_json, pagesize, ChoproParser, ChordLibrary, DiagramGeometry, DocumentInfo, Encoding, Error, Input,
    PdfSurface, Recorder, RenderOptions, Result, Songbook, StyleSheet, SvgSurface,
};

/// Takes a set of chopro files and converts them to a single PDF file.
/// If no file names are given, a single chopro file is read from stdin.
#[derive(Parser, Debug)]
#[command(name = "chordlab")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Chopro files to render
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Output file; a .svg extension writes one SVG per page
    #[arg(short, long, value_name = "FILE", default_value = "chords.pdf")]
    output: PathBuf,

    /// Page size, name (A4, letter, ...) or dimensions (210mm x 297mm)
    #[arg(short, long, value_name = "SZ", default_value = "A4")]
    pagesize: String,

    /// Document title for the PDF metadata
    #[arg(long, value_name = "TITLE")]
    title: Option<String>,

    /// Author name for the PDF metadata
    #[arg(long, value_name = "AUTHOR")]
    author: Option<String>,

    /// Show source file names in the page footer
    #[arg(long)]
    showfilenames: bool,

    /// Make room for chords even on lines without chords
    #[arg(long)]
    no_compact: bool,

    /// Same margins on every page
    #[arg(long)]
    no_duplex: bool,

    /// Additional stylesheet, applied in order
    #[arg(short, long = "style", value_name = "FILE")]
    styles: Vec<PathBuf>,

    /// Additional chord library
    #[arg(long = "chords", value_name = "FILE")]
    chords: Vec<PathBuf>,

    /// Encoding of files without a coding mark (utf-8, latin-1)
    #[arg(short, long, value_name = "NAME", default_value = "utf-8")]
    encoding: String,

    /// Transpose all chords by N semitones
    #[arg(short, long, value_name = "N", default_value_t = 0, allow_hyphen_values = true)]
    transpose: i32,

    /// Also write the computed layout as JSON
    #[arg(long, value_name = "FILE")]
    dump_layout: Option<PathBuf>,

    /// More log output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        LevelFilter::Error
    } else {
        match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn songbook(cli: &Cli) -> Result<Songbook> {
    let mut sheet = StyleSheet::builtin()?;
    for path in &cli.styles {
        sheet.merge(StyleSheet::from_path(path)?);
    }
    let styles = sheet.resolve()?;

    let mut library = ChordLibrary::builtin()?;
    for path in &cli.chords {
        library.merge(ChordLibrary::from_path(path)?);
    }

    let options = RenderOptions {
        disable_compact: cli.no_compact,
        show_filenames: cli.showfilenames,
        duplex: !cli.no_duplex,
        diagram: DiagramGeometry::default(),
    };
    let encoding = Encoding::from_name(&cli.encoding).ok_or_else(|| Error::Encoding {
        file: "--encoding".to_string(),
        encoding: cli.encoding.clone(),
    })?;
    let parser = ChoproParser::new().with_default_encoding(encoding);

    Ok(Songbook::new(styles, library, options)
        .with_transpose(cli.transpose)
        .with_parser(parser))
}

fn is_svg(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

fn run(cli: &Cli) -> Result<()> {
    let (width, height) = pagesize::parse(&cli.pagesize)?;
    let book = songbook(cli)?;
    let inputs: Vec<Input> = cli.files.iter().cloned().map(Input::File).collect();

    if is_svg(&cli.output) {
        book.render(&inputs, SvgSurface::new(&cli.output, width, height))?;
    } else {
        let info = DocumentInfo {
            title: cli.title.clone(),
            author: cli
                .author
                .clone()
                .or_else(|| std::env::var("USER").ok())
                .or_else(|| std::env::var("LOGNAME").ok()),
        };
        book.render(&inputs, PdfSurface::new(&cli.output, width, height, info))?;
    }

    if let Some(path) = &cli.dump_layout {
        // stdin can only be read once
        if inputs.is_empty() {
            log::warn!("--dump-layout needs file arguments, skipping");
        } else {
            let recorder = book.render(&inputs, Recorder::new(width, height))?;
            let json = layout_to_json(recorder.pages())?;
            std::fs::write(path, json).map_err(|source| Error::Write {
                path: path.clone(),
                source,
            })?;
            info!("wrote layout to {}", path.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("chordlab: {e}");
            ExitCode::FAILURE
        }
    }
}
