//! Integration tests — tokenize the sample songs in the songs/ directory.

use chordlab::{ChoproParser, Segments, Token};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn songs_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("songs")
}

fn tokens(name: &str) -> Vec<Token> {
    ChoproParser::new()
        .open(songs_dir().join(name))
        .unwrap_or_else(|e| panic!("failed to open {name}: {e}"))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| panic!("failed to tokenize {name}: {e}"))
}

fn segments(parts: &[&str]) -> Segments {
    parts.iter().copied().collect()
}

fn lines(tokens: &[Token]) -> Vec<&Segments> {
    tokens
        .iter()
        .filter_map(|t| match t {
            Token::Line(s) => Some(s),
            _ => None,
        })
        .collect()
}

// ─── Amazing Grace ──────────────────────────────────────────────────

#[test]
fn amazing_grace_header() {
    let toks = tokens("amazing-grace.chopro");
    assert_eq!(
        toks[..4].to_vec(),
        vec![
            Token::SourceComment("Traditional, words by John Newton (1779)".into()),
            Token::Title("Amazing Grace".into()),
            Token::SubTitle("John Newton".into()),
            Token::Blank,
        ]
    );
    assert_eq!(toks[4], Token::Comment("Verse 1".into()));
}

#[test]
fn amazing_grace_lines() {
    let toks = tokens("amazing-grace.chopro");
    let lines = lines(&toks);
    assert_eq!(lines.len(), 7);
    assert_eq!(
        *lines[0],
        segments(&["A", "G", "mazing ", "G7", "grace! How ", "C", "sweet the ", "G", "sound"])
    );
    assert!(lines.iter().all(|s| s.as_slice().len() % 2 == 1));

    let last = lines[lines.len() - 1];
    assert!(last.is_chords_only());
    assert_eq!(last.chords().collect::<Vec<_>>(), ["G", "C", "G", "D"]);

    let soc = toks.iter().position(|t| *t == Token::StartOfChorus).unwrap();
    let eoc = toks.iter().position(|t| *t == Token::EndOfChorus).unwrap();
    assert_eq!(eoc - soc, 3);
}

// ─── Scarborough Fair ───────────────────────────────────────────────

#[test]
fn scarborough_fair_directives() {
    let toks = tokens("scarborough-fair.chopro");
    assert_eq!(toks[0], Token::Title("Scarborough Fair".into()));
    assert_eq!(toks[1], Token::SubTitle("Traditional".into()));
    assert_eq!(
        toks[2],
        Token::ChordDefine {
            name: "Am7".into(),
            spec: "base-fret 1 frets x 0 2 0 1 3"
                .split_whitespace()
                .map(String::from)
                .collect(),
        }
    );
    assert_eq!(toks[3], Token::Columns(2));
    assert!(toks.contains(&Token::ColumnBreak));
    assert!(toks.contains(&Token::Comment("Second verse".into())));
    assert_eq!(lines(&toks).len(), 8);
}

// ─── Tabs ───────────────────────────────────────────────────────────

#[test]
fn tab_block_and_unmatched_end() {
    let toks = tokens("tabs.chopro");
    let kinds: Vec<&str> = toks.iter().map(Token::kind).collect();
    assert_eq!(
        kinds,
        [
            "title",
            "no_grid",
            "line",
            "start_of_tab",
            "tab_line",
            "tab_line",
            "tab_line",
            "end_of_tab",
            "new_page",
            "title",
            "line",
        ]
    );
    assert_eq!(toks[4], Token::TabLine("e|-----0---------|".into()));
}

// ─── Encodings ──────────────────────────────────────────────────────

#[test]
fn latin1_coding_mark() {
    let toks = tokens("latin1.chopro");
    assert_eq!(toks[1], Token::Title("Café Song".into()));
    assert_eq!(toks[2], Token::Line(segments(&["", "C", "Un café ", "G", "crème"])));
}
