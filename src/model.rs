//! Data model for a tokenized chopro song.
//!
//! The tokenizer produces a flat stream of [`Token`]s in file order; the
//! layout engine consumes them one at a time.

use serde::{Deserialize, Serialize};

/// One unit of chopro input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "arg", rename_all = "snake_case")]
pub enum Token {
    /// `{title: ...}`
    Title(String),
    /// `{subtitle: ...}`
    SubTitle(String),
    /// `{comment: ...}`
    Comment(String),
    StartOfChorus,
    EndOfChorus,
    StartOfTab,
    EndOfTab,
    /// `{columns: n}`, number of columns for the rest of the page
    Columns(i32),
    ColumnBreak,
    NewPage,
    NewSong,
    /// `{define: NAME base-fret N frets ...}`; `spec` is everything after the name
    ChordDefine { name: String, spec: Vec<String> },
    NoGrid,
    Blank,
    /// `# ...` lines, kept for traceability only
    SourceComment(String),
    /// Raw line inside a tab block
    TabLine(String),
    /// Lyrics with inline chords, see [`Segments`]
    Line(Segments),
}

impl Token {
    /// Short name of the token kind, used in log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Title(_) => "title",
            Token::SubTitle(_) => "subtitle",
            Token::Comment(_) => "comment",
            Token::StartOfChorus => "start_of_chorus",
            Token::EndOfChorus => "end_of_chorus",
            Token::StartOfTab => "start_of_tab",
            Token::EndOfTab => "end_of_tab",
            Token::Columns(_) => "columns",
            Token::ColumnBreak => "column_break",
            Token::NewPage => "new_page",
            Token::NewSong => "new_song",
            Token::ChordDefine { .. } => "define",
            Token::NoGrid => "no_grid",
            Token::Blank => "blank",
            Token::SourceComment(_) => "source_comment",
            Token::TabLine(_) => "tab_line",
            Token::Line(_) => "line",
        }
    }
}

/// Alternating lyric / chord strings of a lyrics line.
///
/// Even indices are lyric text, odd indices chord symbols. The sequence
/// starts and ends with a (possibly empty) lyric, so its length is odd.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Segments(Vec<String>);

impl Segments {
    /// Wrap raw parts. An even-length input gets an empty trailing lyric so
    /// the alternation stays symmetric.
    pub fn new(mut parts: Vec<String>) -> Self {
        if parts.is_empty() || parts.len() % 2 == 0 {
            parts.push(String::new());
        }
        Segments(parts)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Chord symbols, in line order.
    pub fn chords(&self) -> impl Iterator<Item = &str> {
        self.0.iter().skip(1).step_by(2).map(String::as_str)
    }

    /// Lyric texts, in line order.
    pub fn lyrics(&self) -> impl Iterator<Item = &str> {
        self.0.iter().step_by(2).map(String::as_str)
    }

    pub fn chord_count(&self) -> usize {
        self.0.len() / 2
    }

    /// True when there is at least one chord and no visible lyric text.
    pub fn is_chords_only(&self) -> bool {
        self.chord_count() > 0 && self.lyrics().all(|l| l.trim().is_empty())
    }

    pub(crate) fn map_chords(self, mut f: impl FnMut(&str) -> String) -> Self {
        let parts = self
            .0
            .into_iter()
            .enumerate()
            .map(|(i, s)| if i % 2 == 1 { f(&s) } else { s })
            .collect();
        Segments(parts)
    }
}

impl<S: Into<String>> FromIterator<S> for Segments {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Segments::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Finger position on one string of a chord diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fret {
    /// String not played (`x`)
    Muted,
    /// Fret number relative to the base fret; 0 is an open string
    At(u8),
}

/// A chord diagram definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordDef {
    pub name: String,
    /// First fret shown; anything above 1 gets a fret label instead of a nut
    pub base_fret: u8,
    /// One entry per string, lowest string first
    pub strings: Vec<Fret>,
}

impl ChordDef {
    /// True when the diagram starts above the nut.
    pub fn is_barre(&self) -> bool {
        self.base_fret > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_stay_odd() {
        let s = Segments::new(vec!["a".into(), "C".into()]);
        assert_eq!(s.as_slice(), ["a", "C", ""]);
        assert_eq!(s.chord_count(), 1);
        assert_eq!(Segments::new(vec![]).as_slice(), [""]);
    }

    #[test]
    fn chords_only_needs_a_chord() {
        let s: Segments = ["", "C", " ", "G", ""].into_iter().collect();
        assert!(s.is_chords_only());
        let plain: Segments = ["just words"].into_iter().collect();
        assert!(!plain.is_chords_only());
        let mixed: Segments = ["", "C", "Hello"].into_iter().collect();
        assert!(!mixed.is_chords_only());
    }
}
