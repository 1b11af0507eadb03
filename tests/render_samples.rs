//! Rendering tests — render the sample songs to PDF, SVG and JSON layout.

use chordlab::{
    layout_to_json, pagesize, render_files_to_layout, render_files_to_pdf, ChordLibrary, DocumentInfo, DrawOp,
    Input, PdfSurface, RenderOptions, Songbook, Styles, SvgSurface,
};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn song(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("songs").join(name)
}

fn all_songs() -> Vec<PathBuf> {
    ["amazing-grace.chopro", "scarborough-fair.chopro", "tabs.chopro", "latin1.chopro"]
        .into_iter()
        .map(song)
        .collect()
}

fn songbook() -> Songbook {
    Songbook::new(
        Styles::builtin().unwrap(),
        ChordLibrary::builtin().unwrap(),
        RenderOptions::default(),
    )
}

fn texts(pages: &[chordlab::RecordedPage]) -> Vec<String> {
    pages
        .iter()
        .flat_map(|p| p.texts())
        .filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn render_songbook_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("songs.pdf");
    render_files_to_pdf(&all_songs(), &out).expect("failed to render songbook");

    let bytes = std::fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    let body = String::from_utf8_lossy(&bytes);
    assert!(body.contains("(Amazing Grace) Tj"));
    assert!(body.contains("/Helvetica-Bold"));
    assert!(body.contains("/Times-Roman"));
    assert!(body.contains("/Courier"));
    println!("✓ Rendered songs.pdf ({} bytes)", bytes.len());
}

#[test]
fn pdf_page_count_and_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("book.pdf");
    let (w, h) = pagesize::parse("letter").unwrap();
    let info = DocumentInfo {
        title: Some("Campfire".into()),
        author: Some("Somebody".into()),
    };
    let inputs: Vec<Input> = all_songs().into_iter().map(Input::File).collect();
    let surface = songbook()
        .render(&inputs, PdfSurface::new(&out, w, h, info))
        .unwrap();
    // one page each, two for the song with a page break
    assert_eq!(surface.page_count(), 5);

    let body = String::from_utf8_lossy(&std::fs::read(&out).unwrap()).into_owned();
    assert!(body.contains("Campfire"));
    assert!(body.contains("Somebody"));
}

#[test]
fn render_svg_pages() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("grace.svg");
    let (w, h) = pagesize::parse("A4").unwrap();
    let surface = songbook()
        .render(&[Input::File(song("amazing-grace.chopro"))], SvgSurface::new(&out, w, h))
        .unwrap();

    let page = surface.page_path(1);
    assert_eq!(page, dir.path().join("grace-1.svg"));
    let svg = std::fs::read_to_string(&page).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert!(svg.contains("Amazing Grace"));
    assert!(svg.contains("<line"));
    assert!(svg.contains("<circle"));
    assert!(!surface.page_path(2).exists());
}

#[test]
fn layout_of_the_sample_songs() {
    let pages = render_files_to_layout(&all_songs(), pagesize::parse("A4").unwrap()).unwrap();
    assert_eq!(pages.len(), 5);
    let numbers: Vec<usize> = pages.iter().map(|p| p.number).collect();
    assert_eq!(numbers, [1, 2, 3, 4, 5]);

    let all = texts(&pages);
    for expected in ["Amazing Grace", "Scarborough Fair", "Tab Exercise", "After the page break", "Café Song"] {
        assert!(all.iter().any(|t| t == expected), "missing {expected}");
    }
    // decoded from Latin-1
    assert!(all.iter().any(|t| t == "Un café "));
    assert!(all.iter().any(|t| t == "crème"));
}

#[test]
fn no_grid_song_has_no_diagrams() {
    let pages = render_files_to_layout(&[song("tabs.chopro")], pagesize::parse("A4").unwrap()).unwrap();
    assert_eq!(pages.len(), 2);
    let boxes = pages
        .iter()
        .flat_map(|p| p.ops.iter())
        .filter(|op| matches!(op, DrawOp::Clip { .. }))
        .count();
    assert_eq!(boxes, 0);
}

#[test]
fn layout_json_dump() {
    let pages = render_files_to_layout(&[song("scarborough-fair.chopro")], pagesize::parse("A4").unwrap()).unwrap();
    let json = layout_to_json(&pages).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let ops = value[0]["ops"].as_array().unwrap();
    assert!(ops.iter().any(|op| op["op"] == "text" && op["text"] == "Scarborough Fair"));
    assert!(ops.iter().any(|op| op["op"] == "clip"));
}
